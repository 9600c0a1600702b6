//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::palette::Palette;
use crate::types::Pos;

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<usize>,
    pub streaming_count: u16,
}

/// Frontend-only state drawn on top of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardOverlay<'a> {
    pub cursor: Option<Pos>,
    pub selected: Option<Pos>,
    pub hint: Option<(Pos, Pos)>,
    /// One-line message under the board (rejected swap, reshuffle...).
    pub message: Option<&'a str>,
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const CURSOR_BG: Rgb = Rgb::new(70, 70, 95);
const SELECTED_BG: Rgb = Rgb::new(120, 100, 40);
const HINT_BG: Rgb = Rgb::new(40, 90, 60);

/// A lightweight terminal renderer for the jewel board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    palette: Palette,
}

impl Default for GameView {
    fn default() -> Self {
        // Glyph centred in three columns keeps cells roughly square.
        Self {
            cell_w: 3,
            palette: Palette::default(),
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, palette: Palette) -> Self {
        Self {
            cell_w: cell_w.max(1),
            palette,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        overlay: &BoardOverlay<'_>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let rows = snap.board.rows() as u16;
        let cols = snap.board.cols() as u16;
        let frame_w = cols * self.cell_w + 2;
        let frame_h = rows + 2;

        let start_x = viewport.width.saturating_sub(frame_w + PANEL_W) / 2;
        let start_y = viewport.height.saturating_sub(frame_h + 2) / 2;

        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::BLACK);
        fb.fill_rect(
            start_x + 1,
            start_y + 1,
            cols * self.cell_w,
            rows,
            ' ',
            CellStyle::new(BOARD_BG, BOARD_BG),
        );
        draw_border(fb, start_x, start_y, frame_w, frame_h, border);

        for row in 0..snap.board.rows() {
            for col in 0..snap.board.cols() {
                let pos = Pos::new(row, col);
                self.draw_slot(fb, snap, overlay, start_x, start_y, pos);
            }
        }

        if let Some(msg) = overlay.message {
            let style = CellStyle::new(Rgb::new(250, 200, 120), Rgb::BLACK);
            fb.put_str(start_x, start_y + frame_h + 1, msg, style);
        }

        self.draw_side_panel(fb, snap, adapter, viewport, start_x + frame_w + 2, start_y);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        snap: &GameSnapshot,
        overlay: &BoardOverlay<'_>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, overlay, adapter, viewport, &mut fb);
        fb
    }

    fn draw_slot(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        overlay: &BoardOverlay<'_>,
        start_x: u16,
        start_y: u16,
        pos: Pos,
    ) {
        let bg = if overlay.selected == Some(pos) {
            SELECTED_BG
        } else if overlay.cursor == Some(pos) {
            CURSOR_BG
        } else if overlay.hint.map_or(false, |(a, b)| a == pos || b == pos) {
            HINT_BG
        } else {
            BOARD_BG
        };

        let px = start_x + 1 + pos.col as u16 * self.cell_w;
        let py = start_y + 1 + pos.row as u16;
        fb.fill_rect(px, py, self.cell_w, 1, ' ', CellStyle::new(BOARD_BG, bg));

        let (glyph, style) = match snap.board.kind_at(pos) {
            Some(kind) => {
                let entry = self.palette.entry(kind);
                (entry.glyph, CellStyle::new(entry.fg, bg).bold())
            }
            None => ('·', CellStyle::new(Rgb::new(90, 90, 100), bg).dim()),
        };
        fb.put_char(px + self.cell_w / 2, py, glyph, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < 10 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::BLACK);
        let dim = value.dim();

        let mut y = start_y;
        fb.put_str(panel_x, y, "SCORE", label);
        fb.put_u32(panel_x, y + 1, snap.score, value);
        y += 3;

        fb.put_str(panel_x, y, "MOVES", label);
        fb.put_u32(panel_x, y + 1, snap.moves, value);
        y += 3;

        fb.put_str(panel_x, y, "CASCADE", label);
        y += 1;
        match snap.last_cascade {
            Some(c) if c.steps > 0 => {
                let x = fb.put_str(panel_x, y, "x", value);
                fb.put_u32(x, y, c.steps, value);
                let x = fb.put_str(panel_x, y + 1, "+", value);
                fb.put_u32(x, y + 1, c.score, value);
            }
            _ => {
                fb.put_str(panel_x, y, "-", dim);
            }
        }
        y += 3;

        fb.put_str(panel_x, y, "GAME", label);
        let x = fb.put_str(panel_x, y + 1, "#", dim);
        fb.put_u32(x, y + 1, snap.episode_id + 1, value);
        y += 3;

        fb.put_str(panel_x, y, "AI", label);
        y += 1;
        match adapter {
            Some(st) if st.enabled => {
                let x = fb.put_str(panel_x, y, "ON ", value);
                fb.put_u32(x, y, st.client_count as u32, value);
                y += 1;
                let x = fb.put_str(panel_x, y, "CTRL ", value);
                match st.controller_id {
                    Some(id) => fb.put_u32(x, y, id as u32, value),
                    None => fb.put_str(x, y, "-", value),
                };
            }
            _ => {
                fb.put_str(panel_x, y, "OFF", value);
            }
        }
    }
}

const PANEL_W: u16 = 12;

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}
