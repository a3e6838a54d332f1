//! Tic-tac-toe game logic with bit-based board representation.
//!
//! # Board Encoding (18-bit)
//!
//! Each of the nine squares is numbered with the center as 0 and the outer
//! ring 1-8 running clockwise from the middle-left:
//!
//! ```text
//!   8 7 6
//!   1 0 5
//!   2 3 4
//! ```
//!
//! The board packs into the low 18 bits of a `u32`, 2 bits per square at
//! offset `2 * square`:
//!
//! ```text
//!   [8]  [7]  [6]  [5]  [4]  [3]  [2]  [1]  [0]
//!   0 0  0 0  0 0  0 0  0 0  0 0  0 0  0 0  0 0
//! ```
//!
//! The high bit of a pair marks the square as occupied; the low bit carries
//! the owner: `10` = O (the human), `11` = X (the computer). `01` never
//! occurs. For example, X at 8, O at 5 and 0, X at 3:
//!
//! ```text
//!   X . .
//!   . O O      [8]  [7]  [6]  [5]  [4]  [3]  [2]  [1]  [0]
//!   . X .      1 1  0 0  0 0  1 0  0 0  1 1  0 0  0 0  1 0
//! ```
//!
//! encodes as `0x308C2`.
//!
//! The win tables are written for the X pattern only; [`Board::perspective`]
//! relabels a board so either player reads as X, halving the patterns the
//! rules and search have to reason about.

use serde::{Deserialize, Serialize};

/// Player identifier.
///
/// The human always plays O and moves first; the computer plays X.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    Human = 1,
    Computer = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Human => Player::Computer,
            Player::Computer => Player::Human,
        }
    }

    /// The 2-bit square pattern for this player (`0b10` or `0b11`).
    #[inline]
    pub const fn bits(self) -> u32 {
        self as u32 + 1
    }

    /// Convert from a square's 2-bit pattern to the owning player.
    #[inline]
    pub fn from_bits(bits: u32) -> Option<Player> {
        match bits {
            0b10 => Some(Player::Human),
            0b11 => Some(Player::Computer),
            _ => None,
        }
    }

    /// The mark drawn for this player ("O" or "X").
    #[inline]
    pub const fn symbol(self) -> &'static str {
        match self {
            Player::Human => "O",
            Player::Computer => "X",
        }
    }
}

/// A square on the board (0-8).
///
/// Layout (center = 0, ring clockwise):
/// ```text
///   8 7 6
///   1 0 5
///   2 3 4
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Square(pub u8);

impl Square {
    /// Create a square, rejecting indices outside 0-8.
    #[inline]
    pub const fn new(index: u8) -> Option<Square> {
        if index < 9 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Get the square index (0-8).
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Check if this is a valid square (0-8).
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 < 9
    }

    /// Bit offset of this square's pair within the board encoding.
    #[inline]
    fn shift(self) -> u32 {
        debug_assert!(self.is_valid());
        self.0 as u32 * Board::SQUARE_BITS
    }

    /// Iterate over all 9 squares in ascending order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..9).map(Square)
    }
}

/// Contents of a single square.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SquareState {
    Empty,
    Occupied(Player),
}

/// Terminal classification of a board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GameResult {
    InProgress,
    Win(Player),
    Tie,
}

/// Compact board state - fits in a single u32.
///
/// See module documentation for encoding details.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Board(pub u32);

impl Board {
    /// Bits per square.
    const SQUARE_BITS: u32 = 2;
    /// Mask for a single square's pair (0b11).
    const SQUARE_MASK: u32 = 0b11;
    /// Occupancy bits of all 9 squares (the high bit of each pair).
    const OCCUPANCY_MASK: u32 = 0b10_10_10_10_10_10_10_10_10;

    /// The 8 winning lines in the X pattern (0b11 at each of three squares):
    /// 3 rows, 3 columns, 2 diagonals of the physical layout.
    const WIN_MASKS: [u32; 8] = [
        0b11_11_11_00_00_00_00_00_00, // Top row: squares 8,7,6
        0b00_00_00_11_00_00_00_11_11, // Middle row: squares 1,0,5
        0b00_00_00_00_11_11_11_00_00, // Bottom row: squares 2,3,4
        0b11_00_00_00_00_00_11_11_00, // Left column: squares 8,1,2
        0b00_11_00_00_00_11_00_00_11, // Middle column: squares 7,0,3
        0b00_00_11_11_11_00_00_00_00, // Right column: squares 6,5,4
        0b11_00_00_00_11_00_00_00_11, // Diagonal: squares 8,0,4
        0b00_00_11_00_00_00_11_00_11, // Diagonal: squares 6,0,2
    ];

    /// Create a new empty board.
    #[inline]
    pub const fn new() -> Board {
        Board(0)
    }

    /// Create a board from a raw u32 encoding.
    #[inline]
    pub const fn from_u32(bits: u32) -> Board {
        Board(bits)
    }

    /// Get the raw u32 encoding.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    // ========== Codec ==========

    /// The 2-bit pattern for `player` shifted into position for `square`.
    #[inline]
    pub fn encode(square: Square, player: Player) -> u32 {
        player.bits() << square.shift()
    }

    /// Extract and classify the pair at `square`.
    pub fn decode(self, square: Square) -> SquareState {
        let bits = (self.0 >> square.shift()) & Self::SQUARE_MASK;
        debug_assert!(bits != 0b01, "corrupt square pair at {}", square.index());
        match Player::from_bits(bits) {
            Some(player) => SquareState::Occupied(player),
            None => SquareState::Empty,
        }
    }

    /// Relabel the board so `player` reads as the canonical X pattern.
    ///
    /// Identity for the computer (already X); for the human, the low bit of
    /// every occupied square flips, swapping the two labels. Win and cost
    /// tables are computed once for X and reused for either player through
    /// this normalization.
    #[inline]
    pub fn perspective(self, player: Player) -> Board {
        match player {
            Player::Computer => self,
            Player::Human => Board(self.0 ^ ((self.0 & Self::OCCUPANCY_MASK) >> 1)),
        }
    }

    // ========== Rules ==========

    /// Check if a square is empty.
    #[inline]
    pub fn is_empty(self, square: Square) -> bool {
        (self.0 >> square.shift()) & Self::SQUARE_MASK == 0
    }

    /// Check that `square` is in range and currently empty.
    #[inline]
    pub fn is_move_valid(self, square: Square) -> bool {
        square.is_valid() && self.is_empty(square)
    }

    /// Iterate over the empty squares in ascending order.
    ///
    /// Each call starts a fresh iterator over the board value it was called
    /// on, so callers can restart at will.
    pub fn valid_moves(self) -> impl Iterator<Item = Square> {
        Square::all().filter(move |&square| self.is_empty(square))
    }

    /// Place `player` on `square`, returning the applied square.
    ///
    /// Returns `None` and leaves the board untouched when the square is
    /// occupied. The write is a single OR into the pair, so a move is never
    /// partially applied.
    pub fn apply_move(&mut self, square: Square, player: Player) -> Option<Square> {
        if !self.is_move_valid(square) {
            return None;
        }
        self.0 |= Self::encode(square, player);
        Some(square)
    }

    /// Check if every square is occupied.
    #[inline]
    pub fn is_full(self) -> bool {
        self.0 & Self::OCCUPANCY_MASK == Self::OCCUPANCY_MASK
    }

    /// Number of occupied squares.
    #[inline]
    pub fn occupied_count(self) -> u32 {
        (self.0 & Self::OCCUPANCY_MASK).count_ones()
    }

    /// Check if `player` owns any of the 8 winning lines.
    pub fn has_won(self, player: Player) -> bool {
        let normalized = self.perspective(player).0;
        Self::WIN_MASKS
            .iter()
            .any(|&mask| normalized & mask == mask)
    }

    /// Classify the board as won, tied, or still in progress.
    ///
    /// A board where both players hold a completed line is unreachable
    /// through legal play; asserting catches the engine misuse instead of
    /// silently crediting one side.
    pub fn classify(self) -> GameResult {
        let human = self.has_won(Player::Human);
        let computer = self.has_won(Player::Computer);
        assert!(
            !(human && computer),
            "invalid board {:#07x}: both players have a completed line",
            self.0
        );
        if human {
            GameResult::Win(Player::Human)
        } else if computer {
            GameResult::Win(Player::Computer)
        } else if self.is_full() {
            GameResult::Tie
        } else {
            GameResult::InProgress
        }
    }

    /// The mark to render for a square: "O", "X", or "" when empty.
    pub fn label(self, square: Square) -> &'static str {
        match self.decode(square) {
            SquareState::Occupied(player) => player.symbol(),
            SquareState::Empty => "",
        }
    }
}

impl std::fmt::Display for Board {
    /// Render the physical 3x3 grid, empty squares as '.'.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const ROWS: [[u8; 3]; 3] = [[8, 7, 6], [1, 0, 5], [2, 3, 4]];
        for (i, row) in ROWS.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, &idx) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                let mark = self.label(Square(idx));
                write!(f, "{}", if mark.is_empty() { "." } else { mark })?;
            }
        }
        Ok(())
    }
}
