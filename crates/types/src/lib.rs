//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, so they can be used
//! by the core rules, the terminal frontend and the remote-control protocol alike.
//!
//! # Board Dimensions
//!
//! The classic board is 8x8. Any size between [`MIN_BOARD_DIM`] and
//! [`MAX_BOARD_DIM`] (inclusive) in either direction is accepted.
//!
//! - **Rows**: indexed 0 (top) to `rows - 1` (bottom)
//! - **Cols**: indexed 0 (left) to `cols - 1` (right)
//!
//! # Rule Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_MIN_RUN` | 3 | Shortest run that counts as a match |
//! | `DEFAULT_CASCADE_CAP` | 64 | Max resolution iterations per move |
//! | `TICK_MS` | 16 | Frontend frame interval (~60 FPS) |
//!
//! # Examples
//!
//! ```
//! use jewel_match_types::{GameAction, JewelKind, Pos, DEFAULT_COLS, DEFAULT_ROWS};
//!
//! // Parse a kind (case-insensitive)
//! assert_eq!(JewelKind::from_str("red"), Some(JewelKind::Red));
//! assert_eq!(JewelKind::Red.code(), 1);
//!
//! // Adjacency is 4-neighbour
//! assert!(Pos::new(2, 3).is_adjacent(Pos::new(2, 4)));
//! assert!(!Pos::new(0, 0).is_adjacent(Pos::new(1, 1)));
//!
//! let action = GameAction::from_str("select").unwrap();
//! assert_eq!(action, GameAction::Select);
//!
//! assert_eq!(DEFAULT_ROWS, 8);
//! assert_eq!(DEFAULT_COLS, 8);
//! ```

use std::fmt;

/// Default board height (8 rows)
pub const DEFAULT_ROWS: u8 = 8;

/// Default board width (8 columns)
pub const DEFAULT_COLS: u8 = 8;

/// Smallest accepted board dimension
pub const MIN_BOARD_DIM: u8 = 3;

/// Largest accepted board dimension
pub const MAX_BOARD_DIM: u8 = 32;

/// Shortest straight run of equal kinds that forms a match
pub const DEFAULT_MIN_RUN: u8 = 3;

/// Maximum remove/collapse/refill iterations for a single resolution
pub const DEFAULT_CASCADE_CAP: u32 = 64;

/// Fixed frontend frame interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Number of distinct jewel kinds
pub const KIND_COUNT: usize = 7;


/// The seven jewel kinds
///
/// Two jewels match when their kinds are equal. The numeric code (1..=7) is
/// used on the wire and in `u8` board grids, with 0 meaning an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JewelKind {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    White,
}

impl JewelKind {
    /// All kinds in code order.
    pub const ALL: [JewelKind; KIND_COUNT] = [
        JewelKind::Red,
        JewelKind::Orange,
        JewelKind::Yellow,
        JewelKind::Green,
        JewelKind::Blue,
        JewelKind::Purple,
        JewelKind::White,
    ];

    /// Parse kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use jewel_match_types::JewelKind;
    ///
    /// assert_eq!(JewelKind::from_str("Blue"), Some(JewelKind::Blue));
    /// assert_eq!(JewelKind::from_str("w"), Some(JewelKind::White));
    /// assert_eq!(JewelKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" | "r" => Some(JewelKind::Red),
            "orange" | "o" => Some(JewelKind::Orange),
            "yellow" | "y" => Some(JewelKind::Yellow),
            "green" | "g" => Some(JewelKind::Green),
            "blue" | "b" => Some(JewelKind::Blue),
            "purple" | "p" => Some(JewelKind::Purple),
            "white" | "w" => Some(JewelKind::White),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            JewelKind::Red => "red",
            JewelKind::Orange => "orange",
            JewelKind::Yellow => "yellow",
            JewelKind::Green => "green",
            JewelKind::Blue => "blue",
            JewelKind::Purple => "purple",
            JewelKind::White => "white",
        }
    }

    /// Single uppercase letter, used by text fixtures and the side panel.
    pub fn letter(&self) -> char {
        match self {
            JewelKind::Red => 'R',
            JewelKind::Orange => 'O',
            JewelKind::Yellow => 'Y',
            JewelKind::Green => 'G',
            JewelKind::Blue => 'B',
            JewelKind::Purple => 'P',
            JewelKind::White => 'W',
        }
    }

    /// Wire code (1..=7).
    pub fn code(&self) -> u8 {
        match self {
            JewelKind::Red => 1,
            JewelKind::Orange => 2,
            JewelKind::Yellow => 3,
            JewelKind::Green => 4,
            JewelKind::Blue => 5,
            JewelKind::Purple => 6,
            JewelKind::White => 7,
        }
    }

    /// Inverse of [`JewelKind::code`]. Returns `None` for 0 and out-of-range codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=7 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }
}

impl fmt::Display for JewelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid coordinate, zero-indexed, row 0 at the top.
///
/// Ordering is row-major, which is the scan order everywhere in the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// True if `other` shares an edge with `self` (4-neighbour).
    pub fn is_adjacent(&self, other: Pos) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        matches!((dr, dc), (0, 1) | (1, 0))
    }

    /// Neighbour in `dir`, or `None` when it would leave a `rows x cols` grid.
    pub fn step(&self, dir: Direction, rows: u8, cols: u8) -> Option<Pos> {
        let (dr, dc) = dir.delta();
        let r = self.row as i16 + dr as i16;
        let c = self.col as i16 + dc as i16;
        if r < 0 || c < 0 || r >= rows as i16 || c >= cols as i16 {
            return None;
        }
        Some(Pos::new(r as u8, c as u8))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// The four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(d_row, d_col)` offset
    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Parse direction from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "up" | "u", "down" | "d", "left" | "l", "right" | "r"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Player actions produced by the input layer.
///
/// These are frontend actions: cursor movement and selection resolve into swap
/// requests in the input crate before anything reaches the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move the cursor one cell
    Cursor(Direction),
    /// Select the cell under the cursor (second adjacent select swaps)
    Select,
    /// Drop the current selection
    Cancel,
    /// Ask for a suggested move
    Hint,
    /// Start a fresh board
    Restart,
}

impl GameAction {
    /// Parse action from string (for the remote protocol and scripts)
    ///
    /// # Examples
    ///
    /// ```
    /// use jewel_match_types::{Direction, GameAction};
    ///
    /// assert_eq!(GameAction::from_str("cursorUp"), Some(GameAction::Cursor(Direction::Up)));
    /// assert_eq!(GameAction::from_str("hint"), Some(GameAction::Hint));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cursorup" => Some(GameAction::Cursor(Direction::Up)),
            "cursordown" => Some(GameAction::Cursor(Direction::Down)),
            "cursorleft" => Some(GameAction::Cursor(Direction::Left)),
            "cursorright" => Some(GameAction::Cursor(Direction::Right)),
            "select" => Some(GameAction::Select),
            "cancel" => Some(GameAction::Cancel),
            "hint" => Some(GameAction::Hint),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Cursor(Direction::Up) => "cursorUp",
            GameAction::Cursor(Direction::Down) => "cursorDown",
            GameAction::Cursor(Direction::Left) => "cursorLeft",
            GameAction::Cursor(Direction::Right) => "cursorRight",
            GameAction::Select => "select",
            GameAction::Cancel => "cancel",
            GameAction::Hint => "hint",
            GameAction::Restart => "restart",
        }
    }
}
