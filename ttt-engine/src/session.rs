//! Single-game orchestration and the running win/loss/tie tally.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ttt_core::{Board, GameResult, Player, Square};

use crate::search::Search;

/// Aggregate game outcomes from the human player's perspective.
///
/// Updated exactly once per finished game. Survives [`GameSession::reset`];
/// only a fresh session starts the tally over.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

/// Where the session is in its turn cycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    AwaitingHuman,
    AwaitingComputer,
    Finished,
}

/// Result of a move call, shaped for the presentation layer.
///
/// `applied` is `None` when the move was rejected (occupied square, out of
/// range, or not that player's turn); rejection changes no state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveOutcome {
    /// The square that was filled, if the move was accepted.
    pub applied: Option<u8>,
    /// Whether the game has ended (by this move or a previous one).
    pub game_over: bool,
    /// The winner of a finished game; `None` while in progress or on a tie.
    pub winner: Option<Player>,
}

/// One human-versus-computer game plus the tally across games.
///
/// The human always opens a fresh game. Drive it strictly sequentially from
/// a single caller: `human_move`, then `computer_move` while
/// [`GameSession::is_computer_turn`] reports true.
pub struct GameSession<R: Rng = StdRng> {
    board: Board,
    phase: Phase,
    winner: Option<Player>,
    stats: SessionStats,
    search: Search<R>,
}

impl GameSession<StdRng> {
    /// Create a session with OS-seeded move tie-breaking.
    pub fn new() -> Self {
        GameSession::with_search(Search::new())
    }

    /// Create a session whose computer plays reproducibly from `seed`.
    pub fn seeded(seed: u64) -> Self {
        GameSession::with_search(Search::seeded(seed))
    }
}

impl Default for GameSession<StdRng> {
    fn default() -> Self {
        GameSession::new()
    }
}

impl<R: Rng> GameSession<R> {
    /// Create a session around an existing search instance.
    pub fn with_search(search: Search<R>) -> Self {
        GameSession {
            board: Board::new(),
            phase: Phase::AwaitingHuman,
            winner: None,
            stats: SessionStats::default(),
            search,
        }
    }

    /// Apply the human's move to `square` (0-8).
    ///
    /// A no-op unless it is the human's turn and the square is a legal,
    /// empty square.
    pub fn human_move(&mut self, square: u8) -> MoveOutcome {
        if self.phase != Phase::AwaitingHuman {
            return self.rejection();
        }
        let Some(square) = Square::new(square) else {
            return self.rejection();
        };
        if self.board.apply_move(square, Player::Human).is_none() {
            return self.rejection();
        }
        self.advance(Phase::AwaitingComputer);
        self.acceptance(square)
    }

    /// Let the computer take its turn.
    ///
    /// A no-op unless it is the computer's turn.
    pub fn computer_move(&mut self) -> MoveOutcome {
        if self.phase != Phase::AwaitingComputer {
            return self.rejection();
        }
        let square = self
            .search
            .choose_square(self.board)
            .expect("computer to move on a board with no open square");
        let applied = self.board.apply_move(square, Player::Computer);
        debug_assert!(applied.is_some(), "search chose an occupied square");
        self.advance(Phase::AwaitingHuman);
        self.acceptance(square)
    }

    /// Whether the session is waiting on [`GameSession::computer_move`].
    pub fn is_computer_turn(&self) -> bool {
        self.phase == Phase::AwaitingComputer
    }

    /// Whether the current game has finished.
    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// The winner of a finished game, if it wasn't a tie.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// The mark to render for `square`: "O", "X", or "" when empty or out
    /// of range.
    pub fn square_label(&self, square: u8) -> &'static str {
        match Square::new(square) {
            Some(square) => self.board.label(square),
            None => "",
        }
    }

    /// The running tally across games.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Score text for one player's side of the tally: the computer's wins
    /// are the human's losses and vice versa.
    pub fn player_stats(&self, player: Player) -> String {
        let (wins, losses) = match player {
            Player::Human => (self.stats.wins, self.stats.losses),
            Player::Computer => (self.stats.losses, self.stats.wins),
        };
        format!(
            "(Player {})\n\nWins: {}\nLosses: {}\nTies: {}",
            player.symbol(),
            wins,
            losses,
            self.stats.ties
        )
    }

    /// The current board, for rendering or inspection.
    pub fn board(&self) -> Board {
        self.board
    }

    /// Start another game: empty board, human to move, tally untouched.
    pub fn reset(&mut self) {
        debug!("board reset for a new game");
        self.board = Board::new();
        self.phase = Phase::AwaitingHuman;
        self.winner = None;
    }

    /// Classify the board after an applied move and either finish the game
    /// or hand the turn over.
    fn advance(&mut self, next: Phase) {
        match self.board.classify() {
            GameResult::Win(player) => self.finish(Some(player)),
            GameResult::Tie => self.finish(None),
            GameResult::InProgress => self.phase = next,
        }
    }

    fn finish(&mut self, winner: Option<Player>) {
        self.phase = Phase::Finished;
        self.winner = winner;
        match winner {
            Some(Player::Human) => self.stats.wins += 1,
            Some(Player::Computer) => self.stats.losses += 1,
            None => self.stats.ties += 1,
        }
        debug!(?winner, stats = ?self.stats, "game finished");
    }

    fn acceptance(&self, square: Square) -> MoveOutcome {
        MoveOutcome {
            applied: Some(square.index()),
            game_over: self.phase == Phase::Finished,
            winner: self.winner,
        }
    }

    fn rejection(&self) -> MoveOutcome {
        MoveOutcome {
            applied: None,
            game_over: self.phase == Phase::Finished,
            winner: self.winner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(bits: u32, phase: Phase) -> GameSession {
        GameSession {
            board: Board::from_u32(bits),
            phase,
            winner: None,
            stats: SessionStats::default(),
            search: Search::seeded(9),
        }
    }

    #[test]
    fn test_center_opening() {
        let mut session = GameSession::seeded(1);
        let outcome = session.human_move(4);
        assert_eq!(
            outcome,
            MoveOutcome {
                applied: Some(4),
                game_over: false,
                winner: None
            }
        );
        assert_eq!(session.square_label(4), "O");
        for square in (0..9).filter(|&s| s != 4) {
            assert_eq!(session.square_label(square), "");
        }
        assert!(session.is_computer_turn());
    }

    #[test]
    fn test_wrong_turn_is_noop() {
        let mut session = GameSession::seeded(1);

        // Computer cannot open.
        assert_eq!(session.computer_move().applied, None);
        assert_eq!(session.board(), Board::new());

        // Human cannot move twice in a row.
        session.human_move(4);
        let board = session.board();
        assert_eq!(session.human_move(0).applied, None);
        assert_eq!(session.board(), board);
        assert!(session.is_computer_turn());
    }

    #[test]
    fn test_occupied_and_out_of_range_rejected() {
        let mut session = GameSession::seeded(1);
        session.human_move(4);
        session.computer_move();

        let board = session.board();
        let occupied = (0..9).find(|&s| session.square_label(s) != "").unwrap();
        assert_eq!(session.human_move(occupied).applied, None);
        assert_eq!(session.human_move(9).applied, None);
        assert_eq!(session.human_move(200).applied, None);
        assert_eq!(session.board(), board);
    }

    #[test]
    fn test_human_win_updates_tally() {
        // Human holds 8 and 6; square 7 completes the top row. (The engine
        // would have blocked long ago; the session takes the board as-is.)
        let mut session = session_at(0b100010000000000000, Phase::AwaitingHuman);
        let outcome = session.human_move(7);
        assert_eq!(
            outcome,
            MoveOutcome {
                applied: Some(7),
                game_over: true,
                winner: Some(Player::Human)
            }
        );
        assert_eq!(
            session.stats(),
            SessionStats {
                wins: 1,
                losses: 0,
                ties: 0
            }
        );

        // Moves after the game finished are no-ops that still report it.
        let outcome = session.human_move(0);
        assert_eq!(
            outcome,
            MoveOutcome {
                applied: None,
                game_over: true,
                winner: Some(Player::Human)
            }
        );
        assert_eq!(session.computer_move().applied, None);
        assert_eq!(session.stats().wins, 1);
    }

    #[test]
    fn test_computer_win_updates_tally() {
        // Computer holds 8 and 6 with the human scattered below; it must
        // complete the top row and take the game.
        let bits = 0b110011000000101000; // X at 8,6; O at 1,2
        let mut session = session_at(bits, Phase::AwaitingComputer);
        let outcome = session.computer_move();
        assert_eq!(
            outcome,
            MoveOutcome {
                applied: Some(7),
                game_over: true,
                winner: Some(Player::Computer)
            }
        );
        assert_eq!(session.stats().losses, 1);
        assert!(!session.is_computer_turn());
    }

    #[test]
    fn test_tie_updates_tally_and_blocks_moves() {
        // One empty square (the center) away from a board with no line for
        // either player; the human fills it.
        let mut session = session_at(0b101011101111101100, Phase::AwaitingHuman);
        let outcome = session.human_move(0);
        assert_eq!(outcome.applied, Some(0));
        assert!(outcome.game_over);
        assert_eq!(outcome.winner, None);
        assert_eq!(session.stats().ties, 1);
        assert_eq!(session.board().classify(), GameResult::Tie);

        assert_eq!(session.human_move(0).applied, None);
        assert_eq!(session.computer_move().applied, None);
    }

    #[test]
    fn test_reset_keeps_tally() {
        let mut session = session_at(0b100010000000000000, Phase::AwaitingHuman);
        session.human_move(7);
        assert!(session.is_game_over());

        session.reset();
        assert_eq!(session.board(), Board::new());
        assert!(!session.is_game_over());
        assert!(!session.is_computer_turn());
        assert_eq!(session.stats().wins, 1);
        assert_eq!(session.winner(), None);

        // A fresh game plays normally.
        assert_eq!(session.human_move(4).applied, Some(4));
    }

    #[test]
    fn test_player_stats_text() {
        let mut session = GameSession::seeded(1);
        session.stats = SessionStats {
            wins: 1,
            losses: 2,
            ties: 4,
        };
        assert_eq!(
            session.player_stats(Player::Human),
            "(Player O)\n\nWins: 1\nLosses: 2\nTies: 4"
        );
        assert_eq!(
            session.player_stats(Player::Computer),
            "(Player X)\n\nWins: 2\nLosses: 1\nTies: 4"
        );
    }
}
