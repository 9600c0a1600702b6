//! Board module - manages the jewel grid
//!
//! The board is a `rows x cols` grid where each slot holds a tile or is empty.
//! Empty slots only exist while a cascade is being resolved.
//! Uses a flat row-major array for cache locality.
//! Coordinates: `Pos { row, col }`, row 0 at the top, col 0 at the left.

use std::fmt;

use crate::config::KindSet;
use crate::error::GameError;
use crate::rng::RandomSource;
use crate::snapshot::BoardSnapshot;
use crate::tile::Tile;
use crate::types::{JewelKind, Pos, MAX_BOARD_DIM, MIN_BOARD_DIM};

/// One grid slot.
pub type Slot = Option<Tile>;

/// The game board using flat array storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: u8,
    cols: u8,
    /// Flat array of slots, row-major order (row * cols + col)
    cells: Vec<Slot>,
}

impl Board {
    /// Create an all-empty board.
    pub fn new(rows: u8, cols: u8) -> Result<Self, GameError> {
        for (name, v) in [("rows", rows), ("cols", cols)] {
            if !(MIN_BOARD_DIM..=MAX_BOARD_DIM).contains(&v) {
                return Err(GameError::InvalidLayout(format!(
                    "{} must be in {}..={}, got {}",
                    name, MIN_BOARD_DIM, MAX_BOARD_DIM, v
                )));
            }
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![None; rows as usize * cols as usize],
        })
    }

    /// Build a full board from explicit kinds, one slice per row.
    pub fn from_kinds(layout: &[&[JewelKind]]) -> Result<Self, GameError> {
        let rows = layout.len();
        let cols = layout.first().map(|r| r.len()).unwrap_or(0);
        if rows > MAX_BOARD_DIM as usize || cols > MAX_BOARD_DIM as usize {
            return Err(GameError::InvalidLayout(format!(
                "layout {}x{} exceeds {}x{}",
                rows, cols, MAX_BOARD_DIM, MAX_BOARD_DIM
            )));
        }
        let mut board = Self::new(rows as u8, cols as u8)?;
        for (r, row) in layout.iter().enumerate() {
            if row.len() != cols {
                return Err(GameError::InvalidLayout(format!(
                    "row {} has {} cells, expected {}",
                    r,
                    row.len(),
                    cols
                )));
            }
            for (c, &kind) in row.iter().enumerate() {
                board.put(Pos::new(r as u8, c as u8), kind);
            }
        }
        Ok(board)
    }

    /// Parse a board from letter rows (`R O Y G B P W`, `.` for empty).
    ///
    /// ```
    /// use jewel_match_core::Board;
    /// use jewel_match_types::{JewelKind, Pos};
    ///
    /// let board = Board::parse(&["RRG", "GBY", "BYG"]).unwrap();
    /// assert_eq!(board.kind_at(Pos::new(0, 2)), Some(JewelKind::Green));
    /// ```
    pub fn parse(rows: &[&str]) -> Result<Self, GameError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if height > MAX_BOARD_DIM as usize || width > MAX_BOARD_DIM as usize {
            return Err(GameError::InvalidLayout(format!(
                "layout {}x{} exceeds {}x{}",
                height, width, MAX_BOARD_DIM, MAX_BOARD_DIM
            )));
        }
        let mut board = Self::new(height as u8, width as u8)?;
        for (r, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(GameError::InvalidLayout(format!(
                    "row {} has {} cells, expected {}",
                    r,
                    line.chars().count(),
                    width
                )));
            }
            for (c, ch) in line.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                let kind = JewelKind::from_str(&ch.to_string()).ok_or_else(|| {
                    GameError::InvalidLayout(format!("unknown jewel '{}' at ({},{})", ch, r, c))
                })?;
                board.put(Pos::new(r as u8, c as u8), kind);
            }
        }
        Ok(board)
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Pos) -> Option<usize> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return None;
        }
        Some(pos.row as usize * self.cols as usize + pos.col as usize)
    }

    #[inline(always)]
    fn pos_of(&self, idx: usize) -> Pos {
        let cols = self.cols as usize;
        Pos::new((idx / cols) as u8, (idx % cols) as u8)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        self.index(pos).is_some()
    }

    /// Get slot at `pos`.
    /// Returns None if out of bounds
    pub fn get(&self, pos: Pos) -> Option<Slot> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Kind of the tile at `pos`, `None` when empty or out of bounds.
    pub fn kind_at(&self, pos: Pos) -> Option<JewelKind> {
        self.get(pos).flatten().map(|t| t.kind)
    }

    pub fn is_empty_at(&self, pos: Pos) -> bool {
        matches!(self.get(pos), Some(None))
    }

    /// Place a new tile of `kind` at `pos`. Out-of-bounds positions are ignored.
    pub(crate) fn put(&mut self, pos: Pos, kind: JewelKind) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = Some(Tile::new(kind, pos));
        }
    }

    /// Exchange two edge-adjacent tiles.
    ///
    /// Only the swap happens here; matches are resolved by the cascade engine.
    pub fn swap(&mut self, a: Pos, b: Pos) -> Result<(), GameError> {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return Err(GameError::InvalidMove { a, b });
        };
        if !a.is_adjacent(b) {
            return Err(GameError::InvalidMove { a, b });
        }

        self.cells.swap(ia, ib);
        if let Some(t) = self.cells[ia].as_mut() {
            t.place_at(a);
        }
        if let Some(t) = self.cells[ib].as_mut() {
            t.place_at(b);
        }
        Ok(())
    }

    /// Empty the given slots. Returns how many tiles were actually removed.
    ///
    /// Already-empty and out-of-bounds positions are skipped.
    pub fn remove_at<I>(&mut self, positions: I) -> u32
    where
        I: IntoIterator<Item = Pos>,
    {
        let mut removed = 0;
        for pos in positions {
            if let Some(idx) = self.index(pos) {
                if self.cells[idx].take().is_some() {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Let tiles fall to the bottom of each column.
    ///
    /// Relative order within a column is preserved and empties end up at the
    /// top. Uses a two-pointer pass per column. Returns the number of tiles
    /// that moved.
    pub fn collapse(&mut self) -> u32 {
        let cols = self.cols as usize;
        let mut moved = 0;

        for col in 0..cols {
            let mut write_row = self.rows as usize;
            for read_row in (0..self.rows as usize).rev() {
                let read_idx = read_row * cols + col;
                if self.cells[read_idx].is_none() {
                    continue;
                }
                write_row -= 1;
                if write_row != read_row {
                    let write_idx = write_row * cols + col;
                    let mut tile = self.cells[read_idx].take();
                    if let Some(t) = tile.as_mut() {
                        t.place_at(Pos::new(write_row as u8, col as u8));
                    }
                    self.cells[write_idx] = tile;
                    moved += 1;
                }
            }
        }

        moved
    }

    /// Fill every empty slot, top-down and row-major, with kinds drawn from `kinds`.
    /// Returns the filled positions in fill order.
    pub fn refill<R: RandomSource + ?Sized>(&mut self, kinds: &KindSet, rng: &mut R) -> Vec<Pos> {
        let mut filled = Vec::new();
        for idx in 0..self.cells.len() {
            if self.cells[idx].is_none() {
                let pos = self.pos_of(idx);
                self.cells[idx] = Some(Tile::new(kinds.draw(rng), pos));
                filled.push(pos);
            }
        }
        filled
    }

    /// Read-only copy of the grid for renderers.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::new(self.rows, self.cols, self.cells.clone())
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// All tiles currently on the board, row-major.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells.iter().filter_map(|c| c.as_ref())
    }

    /// Get a reference to the internal slot array
    pub fn slots(&self) -> &[Slot] {
        &self.cells
    }

    /// Wire codes (0 = empty, 1..=7 kinds), row-major.
    pub fn codes(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|c| c.map(|t| t.kind.code()).unwrap_or(0))
            .collect()
    }

    /// Replace every tile's kind from `kinds`, row-major, keeping dimensions.
    ///
    /// `kinds` must hold exactly `rows * cols` entries.
    pub(crate) fn refill_from(&mut self, kinds: &[JewelKind]) {
        debug_assert_eq!(kinds.len(), self.cells.len());
        for (idx, &kind) in kinds.iter().enumerate() {
            let pos = self.pos_of(idx);
            self.cells[idx] = Some(Tile::new(kind, pos));
        }
    }

    /// Every slot empty.
    pub(crate) fn clear(&mut self) {
        self.cells.fill(None);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let ch = self
                    .kind_at(Pos::new(row, col))
                    .map(|k| k.letter())
                    .unwrap_or('.');
                write!(f, "{}", ch)?;
            }
            if row + 1 < self.rows {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
