//! TerminalRenderer: presents framebuffers on a real terminal.
//!
//! Frames are encoded into a reusable byte buffer and written with one
//! `write_all`. After the first frame only the changed runs of each row are
//! re-sent.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

/// What one `present` call sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub full: bool,
    pub runs: u32,
    pub bytes: usize,
}

pub struct TerminalRenderer {
    stdout: io::Stdout,
    /// Last frame on screen; `None` forces a full redraw.
    shown: Option<FrameBuffer>,
    out: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            shown: None,
            out: Vec::with_capacity(32 * 1024),
        }
    }

    /// Raw mode, alternate screen, hidden cursor.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.out.clear();
        self.out.queue(terminal::EnterAlternateScreen)?;
        self.out.queue(cursor::Hide)?;
        self.out.queue(terminal::DisableLineWrap)?;
        self.flush()
    }

    /// Undo [`enter`](Self::enter).
    pub fn exit(&mut self) -> Result<()> {
        self.out.clear();
        self.out.queue(ResetColor)?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        self.out.queue(terminal::EnableLineWrap)?;
        self.out.queue(cursor::Show)?;
        self.out.queue(terminal::LeaveAlternateScreen)?;
        self.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next frame to be a full redraw (e.g. after a resize).
    pub fn invalidate(&mut self) {
        self.shown = None;
    }

    /// Show `fb`, sending only what changed since the previous frame.
    pub fn present(&mut self, fb: &FrameBuffer) -> Result<FrameStats> {
        self.out.clear();
        let stats = match self.shown.as_mut() {
            Some(prev) if prev.width() == fb.width() && prev.height() == fb.height() => {
                let runs = encode_diff(prev, fb, &mut self.out)?;
                prev.clone_from(fb);
                FrameStats {
                    full: false,
                    runs,
                    bytes: self.out.len(),
                }
            }
            _ => {
                encode_full(fb, &mut self.out)?;
                self.shown = Some(fb.clone());
                FrameStats {
                    full: true,
                    runs: fb.height() as u32,
                    bytes: self.out.len(),
                }
            }
        };
        if stats.bytes > 0 {
            self.flush()?;
        }
        Ok(stats)
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.write_all(&self.out)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Encode a whole frame into `out`.
pub fn encode_full(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut pen = Pen::default();
    for y in 0..fb.height() {
        out.queue(cursor::MoveTo(0, y))?;
        for x in 0..fb.width() {
            let cell = fb.get(x, y).unwrap_or_default();
            pen.print(out, cell.ch, cell.style)?;
        }
    }
    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// Encode the cells of `next` that differ from `prev` into `out`.
/// Returns the number of changed runs; nothing is written when it is zero.
pub fn encode_diff(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<u32> {
    let mut pen = Pen::default();
    let mut runs = 0;
    for (y, start, len) in changed_runs(prev, next) {
        out.queue(cursor::MoveTo(start, y))?;
        for x in start..start + len {
            let cell = next.get(x, y).unwrap_or_default();
            pen.print(out, cell.ch, cell.style)?;
        }
        runs += 1;
    }
    if runs > 0 {
        out.queue(ResetColor)?;
        out.queue(SetAttribute(Attribute::Reset))?;
    }
    Ok(runs)
}

/// Tracks the active style so attributes are only re-sent on change.
#[derive(Default)]
struct Pen {
    style: Option<CellStyle>,
}

impl Pen {
    fn print(&mut self, out: &mut Vec<u8>, ch: char, style: CellStyle) -> Result<()> {
        if self.style != Some(style) {
            out.queue(SetAttribute(Attribute::Reset))?;
            out.queue(SetForegroundColor(to_color(style.fg)))?;
            out.queue(SetBackgroundColor(to_color(style.bg)))?;
            if style.bold {
                out.queue(SetAttribute(Attribute::Bold))?;
            }
            if style.dim {
                out.queue(SetAttribute(Attribute::Dim))?;
            }
            self.style = Some(style);
        }
        out.queue(Print(ch))?;
        Ok(())
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// `(y, x, len)` for every maximal horizontal run of differing cells.
/// Frames of different sizes count as entirely changed.
fn changed_runs(prev: &FrameBuffer, next: &FrameBuffer) -> Vec<(u16, u16, u16)> {
    let w = next.width();
    if prev.width() != w || prev.height() != next.height() {
        return (0..next.height()).map(|y| (y, 0, w)).collect();
    }

    let mut runs = Vec::new();
    for y in 0..next.height() {
        let mut x = 0;
        while x < w {
            if prev.get(x, y) == next.get(x, y) {
                x += 1;
                continue;
            }
            let start = x;
            while x < w && prev.get(x, y) != next.get(x, y) {
                x += 1;
            }
            runs.push((y, start, x - start));
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_text(w: u16, text: &str) -> FrameBuffer {
        let mut fb = FrameBuffer::new(w, 1);
        fb.put_str(0, 0, text, CellStyle::default());
        fb
    }

    #[test]
    fn changed_runs_coalesce_adjacent_cells() {
        let a = with_text(8, "abcdefgh");
        let b = with_text(8, "aXXdeYgh");
        assert_eq!(changed_runs(&a, &b), vec![(0, 1, 2), (0, 5, 1)]);
    }

    #[test]
    fn size_change_marks_every_row() {
        let a = FrameBuffer::new(4, 2);
        let b = FrameBuffer::new(5, 3);
        assert_eq!(changed_runs(&a, &b), vec![(0, 0, 5), (1, 0, 5), (2, 0, 5)]);
    }

    #[test]
    fn identical_frames_encode_nothing() {
        let a = with_text(4, "same");
        let mut out = Vec::new();
        assert_eq!(encode_diff(&a, &a.clone(), &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn diff_output_contains_only_changed_text() {
        let a = with_text(6, "abcdef");
        let b = with_text(6, "abZdef");
        let mut out = Vec::new();
        assert_eq!(encode_diff(&a, &b, &mut out).unwrap(), 1);
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('Z'));
        assert!(!text.contains("def"));
    }

    #[test]
    fn full_encode_contains_every_row() {
        let mut fb = FrameBuffer::new(3, 2);
        fb.put_str(0, 0, "top", CellStyle::default());
        fb.put_str(0, 1, "bot", CellStyle::default());
        let mut out = Vec::new();
        encode_full(&fb, &mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("top"));
        assert!(text.contains("bot"));
    }
}
