//! Unbeatable tic-tac-toe: move selection and game sessions.
//!
//! The engine sits behind a presentation layer that renders boards and
//! collects input. [`GameSession`] drives one game at a time against the
//! [`Search`] move selector and keeps the running win/loss/tie tally;
//! `ttt_core` supplies the bit-packed board and the rules.
//!
//! Everything here is synchronous and single-caller: the search space is at
//! most 9 plies deep, so a move computes in microseconds and no operation
//! suspends.

pub mod search;
pub mod session;

pub use search::Search;
pub use session::{GameSession, MoveOutcome, SessionStats};

pub use ttt_core::{Board, GameResult, Player, Square, SquareState};

/// Create a fresh session: empty board, human to move, zeroed tally.
pub fn new_session() -> GameSession {
    GameSession::new()
}
