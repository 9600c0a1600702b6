//! Tile module - one jewel and where it currently sits.

use crate::types::{JewelKind, Pos};

/// A jewel on the board.
///
/// `row`/`col` always mirror the slot the board keeps the tile in. Only the
/// board relocates tiles, and it rewrites both fields in one step via
/// [`Tile::place_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub kind: JewelKind,
    pub row: u8,
    pub col: u8,
}

impl Tile {
    pub fn new(kind: JewelKind, pos: Pos) -> Self {
        Self {
            kind,
            row: pos.row,
            col: pos.col,
        }
    }

    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }

    /// Same-kind check; the only thing matching cares about.
    pub fn matches(&self, other: &Tile) -> bool {
        self.kind == other.kind
    }

    pub(crate) fn place_at(&mut self, pos: Pos) {
        self.row = pos.row;
        self.col = pos.col;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_matches_by_kind_only() {
        let a = Tile::new(JewelKind::Red, Pos::new(0, 0));
        let b = Tile::new(JewelKind::Red, Pos::new(5, 7));
        let c = Tile::new(JewelKind::Blue, Pos::new(0, 0));
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_place_at_updates_both_coordinates() {
        let mut t = Tile::new(JewelKind::Green, Pos::new(1, 2));
        t.place_at(Pos::new(4, 3));
        assert_eq!(t.pos(), Pos::new(4, 3));
        assert_eq!((t.row, t.col), (4, 3));
    }
}
