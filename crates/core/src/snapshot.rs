use crate::board::Slot;
use crate::cascade::CascadeReport;
use crate::tile::Tile;
use crate::types::{JewelKind, Pos};

/// Owned, read-only copy of a board for renderers and observers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardSnapshot {
    rows: u8,
    cols: u8,
    slots: Vec<Slot>,
}

impl BoardSnapshot {
    pub(crate) fn new(rows: u8, cols: u8, slots: Vec<Slot>) -> Self {
        Self { rows, cols, slots }
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn get(&self, pos: Pos) -> Option<&Tile> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return None;
        }
        self.slots[pos.row as usize * self.cols as usize + pos.col as usize].as_ref()
    }

    pub fn kind_at(&self, pos: Pos) -> Option<JewelKind> {
        self.get(pos).map(|t| t.kind)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// One slice per row, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Slot]> + '_ {
        self.slots.chunks(self.cols as usize)
    }

    /// Board as a grid of wire codes (0 = empty).
    pub fn code_grid(&self) -> Vec<Vec<u8>> {
        self.rows_iter()
            .map(|row| {
                row.iter()
                    .map(|s| s.map(|t| t.kind.code()).unwrap_or(0))
                    .collect()
            })
            .collect()
    }
}

/// Totals of the most recent resolution, small enough to copy around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CascadeSummary {
    pub steps: u32,
    pub cleared: u32,
    pub score: u32,
}

impl From<&CascadeReport> for CascadeSummary {
    fn from(report: &CascadeReport) -> Self {
        Self {
            steps: report.steps.len() as u32,
            cleared: report.cleared,
            score: report.score,
        }
    }
}

/// Everything a frontend needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub board: BoardSnapshot,
    /// Bumped on every board mutation.
    pub board_id: u32,
    /// Bumped on restart.
    pub episode_id: u32,
    pub seed: u32,
    pub score: u32,
    pub moves: u32,
    pub last_cascade: Option<CascadeSummary>,
    pub has_moves: bool,
}
