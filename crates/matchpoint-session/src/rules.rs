//! The `RulesEngine` trait — the seam between the orchestrator and the
//! game being played.
//!
//! The orchestrator pairs clients, relays moves, and manages lifecycle;
//! it never interprets a move itself. Everything game-specific — board
//! representation, legality (including whose turn it is), terminal
//! detection, the wire encoding of positions — lives behind this trait.
//! The server trusts its verdicts completely.

use matchpoint_protocol::MoveRequest;

/// Validates and applies moves for one game type.
///
/// Each associated item defines a piece of the game's shape:
/// - `Board` — the full position, owned exclusively by the session that
///   holds it and mutated only through [`apply`](RulesEngine::apply).
///
/// Implementations are stateless rule sets; all methods are associated
/// functions operating on a caller-owned board.
pub trait RulesEngine: Send + Sync + 'static {
    /// The full game position.
    type Board: Send + Sync + Clone;

    /// The canonical starting position. Used at session creation and
    /// again on an agreed replay.
    fn initial() -> Self::Board;

    /// Validates `mv` against `board` and applies it when legal.
    ///
    /// On `Err` the board must be left untouched; the reason string is
    /// logged server-side, never sent to clients (they only get the
    /// echoed UCI in an `invalid` payload). Turn order is part of
    /// legality — a well-formed move by the wrong side is an `Err` here.
    fn apply(
        board: &mut Self::Board,
        mv: &MoveRequest,
    ) -> Result<(), String>;

    /// Returns `Some(result)` when the position is terminal.
    ///
    /// The result string is broadcast verbatim in `game_over` (chess
    /// conventions: `"1-0"`, `"0-1"`, `"1/2-1/2"`).
    fn verdict(board: &Self::Board) -> Option<String>;

    /// The opaque wire encoding of `board`, carried in `start`, `move`,
    /// and `replay_start` payloads (FEN for chess-like games).
    fn encode(board: &Self::Board) -> String;
}
