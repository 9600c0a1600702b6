//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: views draw into a plain
//! framebuffer and the renderer flushes it to the terminal with crossterm.
//! No widget toolkit, so the board keeps a fixed aspect ratio.

pub mod fb;
pub mod game_view;
pub mod palette;
pub mod renderer;

pub use jewel_match_core as core;
pub use jewel_match_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AdapterStatusView, BoardOverlay, GameView, Viewport};
pub use palette::{Palette, PaletteEntry};
pub use renderer::{encode_diff, encode_full, FrameStats, TerminalRenderer};
