//! Jewel asset table: how each kind looks on screen.
//!
//! Frontends construct a [`Palette`] and hand it to the view; there is no
//! global lookup.

use crate::fb::Rgb;
use crate::types::{JewelKind, KIND_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub glyph: char,
    pub fg: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: [PaletteEntry; KIND_COUNT],
}

impl Palette {
    /// Filled diamonds in the classic jewel colours.
    pub fn classic() -> Self {
        let e = |r, g, b| PaletteEntry {
            glyph: '◆',
            fg: Rgb::new(r, g, b),
        };
        Self {
            entries: [
                e(230, 70, 70),
                e(255, 160, 40),
                e(245, 225, 80),
                e(90, 210, 110),
                e(80, 140, 240),
                e(190, 110, 230),
                e(235, 235, 235),
            ],
        }
    }

    /// Kind letters, for terminals without the diamond glyph or colour.
    pub fn ascii() -> Self {
        let classic = Self::classic();
        let mut entries = classic.entries;
        for (entry, kind) in entries.iter_mut().zip(JewelKind::ALL) {
            entry.glyph = kind.letter();
        }
        Self { entries }
    }

    pub fn entry(&self, kind: JewelKind) -> PaletteEntry {
        self.entries[kind.code() as usize - 1]
    }

    pub fn with_entry(mut self, kind: JewelKind, entry: PaletteEntry) -> Self {
        self.entries[kind.code() as usize - 1] = entry;
        self
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_colour() {
        let p = Palette::classic();
        for (i, a) in JewelKind::ALL.iter().enumerate() {
            for b in &JewelKind::ALL[i + 1..] {
                assert_ne!(p.entry(*a).fg, p.entry(*b).fg);
            }
        }
    }

    #[test]
    fn ascii_uses_letters() {
        let p = Palette::ascii();
        assert_eq!(p.entry(JewelKind::Purple).glyph, 'P');
        assert_eq!(p.entry(JewelKind::Purple).fg, Palette::classic().entry(JewelKind::Purple).fg);
    }

    #[test]
    fn with_entry_overrides_one_kind() {
        let star = PaletteEntry {
            glyph: '*',
            fg: Rgb::WHITE,
        };
        let p = Palette::classic().with_entry(JewelKind::Red, star);
        assert_eq!(p.entry(JewelKind::Red), star);
        assert_eq!(p.entry(JewelKind::Orange).glyph, '◆');
    }
}
