//! Board cursor and two-step selection.
//!
//! The first `Select` marks a tile, a second `Select` on an edge-adjacent tile
//! turns the pair into a [`SwapRequest`]. Selecting the marked tile again
//! clears the mark; selecting a far tile moves the mark there.

use crate::types::{GameAction, Pos};

/// Two tiles the player asked to swap. `from` is the tile selected first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRequest {
    pub from: Pos,
    pub to: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    rows: u8,
    cols: u8,
    cursor: Pos,
    selected: Option<Pos>,
}

impl CursorState {
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            rows,
            cols,
            cursor: Pos::new(0, 0),
            selected: None,
        }
    }

    pub fn cursor(&self) -> Pos {
        self.cursor
    }

    pub fn selected(&self) -> Option<Pos> {
        self.selected
    }

    /// Move the cursor without touching the selection (e.g. to show a hint).
    pub fn focus(&mut self, pos: Pos) {
        if pos.row < self.rows && pos.col < self.cols {
            self.cursor = pos;
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Feed one action. Only cursor, select and cancel are handled here.
    pub fn apply(&mut self, action: GameAction) -> Option<SwapRequest> {
        match action {
            GameAction::Cursor(dir) => {
                if let Some(next) = self.cursor.step(dir, self.rows, self.cols) {
                    self.cursor = next;
                }
                None
            }
            GameAction::Select => self.select(),
            GameAction::Cancel => {
                self.selected = None;
                None
            }
            GameAction::Hint | GameAction::Restart => None,
        }
    }

    fn select(&mut self) -> Option<SwapRequest> {
        match self.selected {
            None => {
                self.selected = Some(self.cursor);
                None
            }
            Some(sel) if sel == self.cursor => {
                self.selected = None;
                None
            }
            Some(sel) if sel.is_adjacent(self.cursor) => {
                self.selected = None;
                Some(SwapRequest {
                    from: sel,
                    to: self.cursor,
                })
            }
            Some(_) => {
                self.selected = Some(self.cursor);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut cur = CursorState::new(3, 3);
        cur.apply(GameAction::Cursor(Direction::Up));
        cur.apply(GameAction::Cursor(Direction::Left));
        assert_eq!(cur.cursor(), Pos::new(0, 0));
        for _ in 0..5 {
            cur.apply(GameAction::Cursor(Direction::Right));
            cur.apply(GameAction::Cursor(Direction::Down));
        }
        assert_eq!(cur.cursor(), Pos::new(2, 2));
    }

    #[test]
    fn test_select_adjacent_emits_swap() {
        let mut cur = CursorState::new(8, 8);
        assert_eq!(cur.apply(GameAction::Select), None);
        assert_eq!(cur.selected(), Some(Pos::new(0, 0)));
        cur.apply(GameAction::Cursor(Direction::Right));
        assert_eq!(
            cur.apply(GameAction::Select),
            Some(SwapRequest {
                from: Pos::new(0, 0),
                to: Pos::new(0, 1)
            })
        );
        assert_eq!(cur.selected(), None);
    }

    #[test]
    fn test_reselect_clears_and_far_select_moves_mark() {
        let mut cur = CursorState::new(8, 8);
        cur.apply(GameAction::Select);
        cur.apply(GameAction::Select);
        assert_eq!(cur.selected(), None);

        cur.apply(GameAction::Select);
        cur.focus(Pos::new(4, 4));
        assert_eq!(cur.apply(GameAction::Select), None);
        assert_eq!(cur.selected(), Some(Pos::new(4, 4)));
    }

    #[test]
    fn test_cancel_and_focus() {
        let mut cur = CursorState::new(4, 4);
        cur.apply(GameAction::Select);
        cur.apply(GameAction::Cancel);
        assert_eq!(cur.selected(), None);
        cur.focus(Pos::new(9, 9));
        assert_eq!(cur.cursor(), Pos::new(0, 0));
    }
}
