//! Memoized look-ahead search for the computer's move.
//!
//! The game tree is tiny in board terms (the board fits in 18 bits) but
//! large in move orderings, so identical positions are reached many times
//! over. A transposition table keyed by `(board, player to move)` collapses
//! those repeats; a full evaluation from the empty board touches a few
//! thousand distinct entries instead of hundreds of thousands of paths.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use ttt_core::{Board, GameResult, Player, Square};

/// Score of a board the computer has just won.
pub const WIN_SCORE: i32 = 10;
/// Score of a board the human has just won.
pub const LOSS_SCORE: i32 = -10;
/// Score of a tied board.
pub const TIE_SCORE: i32 = 0;

/// Move scores for one position, in ascending square order.
pub type MoveScores = Vec<(Square, i32)>;

/// Minimax move selector with a per-instance transposition table.
///
/// The randomness source breaks ties among equally scored squares so the
/// computer does not play a visibly repetitive game; inject a seeded RNG
/// (see [`Search::seeded`]) to make selection deterministic in tests.
pub struct Search<R: Rng = StdRng> {
    /// Transposition table: (board, player to move) -> backed-up score.
    table: HashMap<(u32, Player), i32>,
    rng: R,
}

impl Search<StdRng> {
    /// Create a search with an OS-seeded RNG for tie-breaking.
    pub fn new() -> Self {
        Search::with_rng(StdRng::from_os_rng())
    }

    /// Create a search whose tie-breaking is reproducible from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Search::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for Search<StdRng> {
    fn default() -> Self {
        Search::new()
    }
}

impl<R: Rng> Search<R> {
    /// Create a search with the given randomness source.
    pub fn with_rng(rng: R) -> Self {
        Search {
            table: HashMap::new(),
            rng,
        }
    }

    /// Pick the computer's square, or `None` when the board is full.
    ///
    /// Never returns an occupied square: candidates come straight from
    /// [`Board::valid_moves`].
    pub fn choose_square(&mut self, board: Board) -> Option<Square> {
        let scores = self.evaluate(board, Player::Computer);
        let chosen = self.best_move(&scores, Player::Computer);
        if let Some((square, score)) = chosen {
            debug!(square = square.index(), score, "computer move selected");
            trace!(cached_positions = self.table.len(), "transposition table");
        }
        chosen.map(|(square, _)| square)
    }

    /// Score every valid move for `player` from `board`.
    ///
    /// Scores are from the computer's point of view regardless of who is
    /// moving: positive favors the computer, negative the human.
    pub fn evaluate(&mut self, board: Board, player: Player) -> MoveScores {
        board
            .valid_moves()
            .map(|square| {
                let mut next = board;
                let applied = next.apply_move(square, player);
                debug_assert!(applied.is_some());
                (square, self.score_after(next, player))
            })
            .collect()
    }

    /// Pick the extremal-scored square for `player`: maximum for the
    /// computer, minimum for the human, uniformly at random among ties.
    ///
    /// Returns `None` when there are no candidates.
    pub fn best_move(&mut self, scores: &MoveScores, player: Player) -> Option<(Square, i32)> {
        let target = match player {
            Player::Computer => scores.iter().map(|&(_, s)| s).max()?,
            Player::Human => scores.iter().map(|&(_, s)| s).min()?,
        };
        let tied: Vec<(Square, i32)> = scores
            .iter()
            .copied()
            .filter(|&(_, score)| score == target)
            .collect();
        Some(tied[self.rng.random_range(0..tied.len())])
    }

    /// Score of `board` after `mover` has just played.
    ///
    /// Terminal boards score `WIN_SCORE`/`LOSS_SCORE`/`TIE_SCORE`; anything
    /// else recurses one ply from the opponent's side. A backed-up score
    /// decays one step toward zero per ply, so a win now beats a win later
    /// and a loss later beats a loss now.
    fn score_after(&mut self, board: Board, mover: Player) -> i32 {
        match board.classify() {
            GameResult::Win(Player::Computer) => WIN_SCORE,
            GameResult::Win(Player::Human) => LOSS_SCORE,
            GameResult::Tie => TIE_SCORE,
            GameResult::InProgress => {
                let opponent = mover.opponent();
                let key = (board.to_u32(), opponent);
                if let Some(&cached) = self.table.get(&key) {
                    return cached;
                }
                let replies = self.evaluate(board, opponent);
                let (_, reply_score) = self
                    .best_for(&replies, opponent)
                    .expect("in-progress board has at least one move");
                let score = reply_score - reply_score.signum();
                self.table.insert(key, score);
                score
            }
        }
    }

    /// Deterministic extremal pick used inside the recursion, where only
    /// the score matters and tie-breaking would waste RNG draws.
    fn best_for(&self, scores: &MoveScores, player: Player) -> Option<(Square, i32)> {
        match player {
            Player::Computer => scores.iter().copied().max_by_key(|&(_, s)| s),
            Player::Human => scores.iter().copied().min_by_key(|&(_, s)| s),
        }
    }
}
