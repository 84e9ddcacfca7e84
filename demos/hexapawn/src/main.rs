//! Hexapawn over Matchpoint: a complete demo server.
//!
//! Hexapawn is the 3×3 pawns-only minichess classic: pawns push one
//! square forward, capture one square diagonally forward, and you win
//! by reaching the far rank, taking every enemy pawn, or leaving your
//! opponent without a legal move. Small enough to read in one sitting,
//! real enough to exercise every part of the pairing protocol.

use matchpoint::prelude::*;

// ---------------------------------------------------------------------------
// Game types
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    White,
    Black,
}

impl Cell {
    fn of(color: Color) -> Self {
        match color {
            Color::White => Cell::White,
            Color::Black => Cell::Black,
        }
    }
}

/// The full position: 3×3 cells, side to move, and the winner once
/// decided. `cells[rank][file]` with rank 0 = rank 1 (white's home).
#[derive(Clone)]
pub struct Board {
    cells: [[Cell; 3]; 3],
    turn: Color,
    winner: Option<Color>,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

struct Hexapawn;

impl RulesEngine for Hexapawn {
    type Board = Board;

    fn initial() -> Board {
        Board {
            cells: [
                [Cell::White; 3],
                [Cell::Empty; 3],
                [Cell::Black; 3],
            ],
            turn: Color::White,
            winner: None,
        }
    }

    fn apply(board: &mut Board, mv: &MoveRequest) -> Result<(), String> {
        if board.winner.is_some() {
            return Err("game is over".into());
        }
        let (ff, fr) = parse_square(&mv.from)?;
        let (tf, tr) = parse_square(&mv.to)?;

        let mover = board.turn;
        if board.cells[fr][ff] != Cell::of(mover) {
            return Err(format!("no {mover} pawn on {}", mv.from));
        }

        let dir: isize = match mover {
            Color::White => 1,
            Color::Black => -1,
        };
        if tr as isize != fr as isize + dir {
            return Err("pawns move one rank forward".into());
        }

        let target = board.cells[tr][tf];
        let legal = if tf == ff {
            // Straight push: destination must be empty.
            target == Cell::Empty
        } else if tf.abs_diff(ff) == 1 {
            // Diagonal step: must capture an enemy pawn.
            target == Cell::of(mover.opposite())
        } else {
            false
        };
        if !legal {
            return Err(format!("{} is not a legal destination", mv.to));
        }

        board.cells[fr][ff] = Cell::Empty;
        board.cells[tr][tf] = Cell::of(mover);

        // Far rank reached, all pawns taken, or opponent frozen — any
        // of the three ends the game in the mover's favor.
        let far_rank = match mover {
            Color::White => 2,
            Color::Black => 0,
        };
        let opponent = mover.opposite();
        if tr == far_rank
            || !has_pawns(board, opponent)
            || !has_moves(board, opponent)
        {
            board.winner = Some(mover);
        } else {
            board.turn = opponent;
        }
        Ok(())
    }

    fn verdict(board: &Board) -> Option<String> {
        board.winner.map(|w| {
            match w {
                Color::White => "1-0",
                Color::Black => "0-1",
            }
            .to_string()
        })
    }

    fn encode(board: &Board) -> String {
        // Mini-FEN: ranks top-down, run-length empties, side to move.
        // Initial position encodes as "ppp/3/PPP w".
        let mut out = String::new();
        for rank in (0..3).rev() {
            let mut empty = 0;
            for file in 0..3 {
                match board.cells[rank][file] {
                    Cell::Empty => empty += 1,
                    piece => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(match piece {
                            Cell::White => 'P',
                            Cell::Black => 'p',
                            Cell::Empty => unreachable!(),
                        });
                    }
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out.push(' ');
        out.push(match board.turn {
            Color::White => 'w',
            Color::Black => 'b',
        });
        out
    }
}

/// Parses `"b2"` into `(file, rank)` indices.
fn parse_square(sq: &str) -> Result<(usize, usize), String> {
    let mut chars = sq.chars();
    let (Some(file), Some(rank), None) =
        (chars.next(), chars.next(), chars.next())
    else {
        return Err(format!("malformed square {sq:?}"));
    };
    let file = (file as usize).wrapping_sub('a' as usize);
    let rank = (rank as usize).wrapping_sub('1' as usize);
    if file > 2 || rank > 2 {
        return Err(format!("square {sq:?} is off the board"));
    }
    Ok((file, rank))
}

fn has_pawns(board: &Board, color: Color) -> bool {
    board
        .cells
        .iter()
        .flatten()
        .any(|c| *c == Cell::of(color))
}

/// Whether `color` has at least one legal move.
fn has_moves(board: &Board, color: Color) -> bool {
    let dir: isize = match color {
        Color::White => 1,
        Color::Black => -1,
    };
    for rank in 0..3usize {
        for file in 0..3usize {
            if board.cells[rank][file] != Cell::of(color) {
                continue;
            }
            let fwd = rank as isize + dir;
            if !(0..3).contains(&fwd) {
                continue;
            }
            let fwd = fwd as usize;
            if board.cells[fwd][file] == Cell::Empty {
                return true;
            }
            for cap in [file.wrapping_sub(1), file + 1] {
                if cap < 3
                    && board.cells[fwd][cap] == Cell::of(color.opposite())
                {
                    return true;
                }
            }
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env(),
        )
        .init();

    let addr = std::env::var("MATCHPOINT_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    tracing::info!(%addr, "starting hexapawn server");

    let server = ServerBuilder::new()
        .bind(&addr)
        .build::<Hexapawn>()
        .await?;

    server.run().await?;
    Ok(())
}
