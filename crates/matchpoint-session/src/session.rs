//! Session types: one paired two-party game and its fixed participants.

use std::fmt;

use matchpoint_protocol::{Color, ConnId, SessionId};

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// The two fixed seats of a session.
///
/// Set once at creation and never swapped. Opponent and color lookups go
/// through this record — participant relationships are structured data,
/// never reconstructed by parsing an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participants {
    pub white: ConnId,
    pub black: ConnId,
}

impl Participants {
    /// Returns `true` if `conn` holds one of the two seats.
    pub fn contains(&self, conn: ConnId) -> bool {
        self.white == conn || self.black == conn
    }

    /// The color seated by `conn`, if any.
    pub fn color_of(&self, conn: ConnId) -> Option<Color> {
        if self.white == conn {
            Some(Color::White)
        } else if self.black == conn {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// The other participant, if `conn` holds a seat.
    pub fn opponent_of(&self, conn: ConnId) -> Option<ConnId> {
        if self.white == conn {
            Some(self.black)
        } else if self.black == conn {
            Some(self.white)
        } else {
            None
        }
    }

    /// Both seats, white first.
    pub fn pair(&self) -> [ConnId; 2] {
        [self.white, self.black]
    }
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a session.
///
/// ```text
/// Active ──(terminal move)──→ Over
///    ↑                          │
///    └──────(replay agreed)─────┘
/// ```
///
/// Moves are only accepted while `Active`. A session in `Over` phase
/// still exists — participants can agree on a replay, which resets the
/// board and returns the session to `Active`. Teardown (quit or
/// disconnect) destroys the session from either phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Over,
}

impl SessionPhase {
    /// Returns `true` if moves are currently accepted.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` if the game reached a terminal position.
    pub fn is_over(&self) -> bool {
        matches!(self, Self::Over)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Over => write!(f, "Over"),
        }
    }
}

// ---------------------------------------------------------------------------
// Seat
// ---------------------------------------------------------------------------

/// A connection's attachment to a session: which session, which color.
///
/// This is a weak back-reference — the store owns the session; a seat
/// only points at it. Absent while a connection waits in the lobby,
/// cleared on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub session_id: SessionId,
    pub color: Color,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// One active two-party game.
///
/// The board is owned exclusively by the session and mutated only
/// through rules-engine-validated moves. A session always has exactly
/// two participants; it is destroyed on quit or disconnect, never left
/// half-populated.
#[derive(Debug)]
pub struct GameSession<B> {
    pub session_id: SessionId,
    pub participants: Participants,
    pub board: B,
    pub phase: SessionPhase,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participants() -> Participants {
        Participants {
            white: ConnId(1),
            black: ConnId(2),
        }
    }

    #[test]
    fn test_participants_color_of() {
        let p = participants();
        assert_eq!(p.color_of(ConnId(1)), Some(Color::White));
        assert_eq!(p.color_of(ConnId(2)), Some(Color::Black));
        assert_eq!(p.color_of(ConnId(3)), None);
    }

    #[test]
    fn test_participants_opponent_of() {
        let p = participants();
        assert_eq!(p.opponent_of(ConnId(1)), Some(ConnId(2)));
        assert_eq!(p.opponent_of(ConnId(2)), Some(ConnId(1)));
        assert_eq!(p.opponent_of(ConnId(3)), None);
    }

    #[test]
    fn test_participants_contains() {
        let p = participants();
        assert!(p.contains(ConnId(1)));
        assert!(p.contains(ConnId(2)));
        assert!(!p.contains(ConnId(7)));
    }

    #[test]
    fn test_participants_pair_is_white_first() {
        assert_eq!(participants().pair(), [ConnId(1), ConnId(2)]);
    }

    #[test]
    fn test_phase_predicates() {
        assert!(SessionPhase::Active.is_active());
        assert!(!SessionPhase::Active.is_over());
        assert!(SessionPhase::Over.is_over());
        assert!(!SessionPhase::Over.is_active());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(SessionPhase::Active.to_string(), "Active");
        assert_eq!(SessionPhase::Over.to_string(), "Over");
    }
}
