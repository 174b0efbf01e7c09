//! Fixed 5x7 bitmap font used as the text fallback
//!
//! Each printable ASCII glyph is five column bytes, the least significant
//! bit is the top row. A real outline-font backend plugs in behind
//! [`FontRegistry`]; the registry is passed through the call chain instead
//! of living in process-global state.
use std::{collections::HashMap, sync::Arc};

pub const GLYPH_COLS: usize = 5;
pub const GLYPH_ROWS: usize = 7;
/// Horizontal advance between glyph origins, five columns plus one space
pub const GLYPH_ADVANCE: usize = 6;

#[rustfmt::skip]
static FONT_5X7: [[u8; GLYPH_COLS]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x00, 0x00, 0x5f, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7f, 0x14, 0x7f, 0x14], // #
    [0x24, 0x2a, 0x7f, 0x2a, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1c, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1c, 0x00], // )
    [0x14, 0x08, 0x3e, 0x08, 0x14], // *
    [0x08, 0x08, 0x3e, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3e, 0x51, 0x49, 0x45, 0x3e], // 0
    [0x00, 0x42, 0x7f, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4b, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7f, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3c, 0x4a, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1e], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3e], // @
    [0x7e, 0x11, 0x11, 0x11, 0x7e], // A
    [0x7f, 0x49, 0x49, 0x49, 0x36], // B
    [0x3e, 0x41, 0x41, 0x41, 0x22], // C
    [0x7f, 0x41, 0x41, 0x22, 0x1c], // D
    [0x7f, 0x49, 0x49, 0x49, 0x41], // E
    [0x7f, 0x09, 0x09, 0x09, 0x01], // F
    [0x3e, 0x41, 0x49, 0x49, 0x7a], // G
    [0x7f, 0x08, 0x08, 0x08, 0x7f], // H
    [0x00, 0x41, 0x7f, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3f, 0x01], // J
    [0x7f, 0x08, 0x14, 0x22, 0x41], // K
    [0x7f, 0x40, 0x40, 0x40, 0x40], // L
    [0x7f, 0x02, 0x0c, 0x02, 0x7f], // M
    [0x7f, 0x04, 0x08, 0x10, 0x7f], // N
    [0x3e, 0x41, 0x41, 0x41, 0x3e], // O
    [0x7f, 0x09, 0x09, 0x09, 0x06], // P
    [0x3e, 0x41, 0x51, 0x21, 0x5e], // Q
    [0x7f, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7f, 0x01, 0x01], // T
    [0x3f, 0x40, 0x40, 0x40, 0x3f], // U
    [0x1f, 0x20, 0x40, 0x20, 0x1f], // V
    [0x3f, 0x40, 0x38, 0x40, 0x3f], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x7f, 0x41, 0x41, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x00, 0x41, 0x41, 0x7f, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7f, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7f], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7e, 0x09, 0x01, 0x02], // f
    [0x0c, 0x52, 0x52, 0x52, 0x3e], // g
    [0x7f, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7d, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3d, 0x00], // j
    [0x7f, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7f, 0x40, 0x00], // l
    [0x7c, 0x04, 0x18, 0x04, 0x78], // m
    [0x7c, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7c, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7c], // q
    [0x7c, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3f, 0x44, 0x40, 0x20], // t
    [0x3c, 0x40, 0x40, 0x20, 0x7c], // u
    [0x1c, 0x20, 0x40, 0x20, 0x1c], // v
    [0x3c, 0x40, 0x30, 0x40, 0x3c], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0c, 0x50, 0x50, 0x50, 0x3c], // y
    [0x44, 0x64, 0x54, 0x4c, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7f, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x10, 0x08, 0x08, 0x10, 0x08], // ~
];

/// The built-in 5x7 bitmap face
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitmapFont;

impl BitmapFont {
    /// Column bytes of a printable ASCII glyph
    pub fn glyph(&self, codepoint: char) -> Option<&'static [u8; GLYPH_COLS]> {
        let index = (codepoint as usize).checked_sub(32)?;
        FONT_5X7.get(index)
    }

    pub fn has_glyph(&self, codepoint: char) -> bool {
        self.glyph(codepoint).is_some()
    }

    /// Iterate filled cells of a glyph as `(col, row)` pairs, row 0 on top
    pub fn glyph_cells(
        &self,
        codepoint: char,
    ) -> impl Iterator<Item = (usize, usize)> + 'static {
        let columns = self.glyph(codepoint).copied().unwrap_or_default();
        (0..GLYPH_COLS).flat_map(move |col| {
            (0..GLYPH_ROWS).filter_map(move |row| (columns[col] & (1 << row) != 0).then_some((col, row)))
        })
    }
}

/// Set of loaded font faces keyed by family name
///
/// Lifecycle is load, shared read, unload. Every face currently resolves to
/// the bitmap font; an outline backend would register real faces here.
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    fonts: HashMap<String, Arc<BitmapFont>>,
    default_name: Option<String>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face under `name`, the first loaded face becomes the
    /// default
    pub fn load(&mut self, name: impl Into<String>) -> Arc<BitmapFont> {
        let name = name.into();
        let face = self
            .fonts
            .entry(name.clone())
            .or_insert_with(|| Arc::new(BitmapFont))
            .clone();
        if self.default_name.is_none() {
            self.default_name = Some(name);
        }
        face
    }

    pub fn get(&self, name: &str) -> Option<Arc<BitmapFont>> {
        self.fonts.get(name).cloned()
    }

    /// Face to use when the requested family is not loaded
    pub fn fallback(&self) -> Arc<BitmapFont> {
        self.default_name
            .as_ref()
            .and_then(|name| self.get(name))
            .unwrap_or_else(|| Arc::new(BitmapFont))
    }

    /// Face for the requested family, falling back to the default
    pub fn resolve(&self, name: &str) -> Arc<BitmapFont> {
        self.get(name).unwrap_or_else(|| self.fallback())
    }

    pub fn loaded(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    pub fn unload(&mut self, name: &str) {
        self.fonts.remove(name);
        if self.default_name.as_deref() == Some(name) {
            self.default_name = None;
        }
    }

    pub fn clear(&mut self) {
        self.fonts.clear();
        self.default_name = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_lookup() {
        let font = BitmapFont;
        assert!(font.has_glyph('A'));
        assert!(font.has_glyph(' '));
        assert!(font.has_glyph('~'));
        assert!(!font.has_glyph('\n'));
        assert!(!font.has_glyph('é'));
        // '!' is a single column with five pixels
        assert_eq!(font.glyph('!'), Some(&[0x00, 0x00, 0x5f, 0x00, 0x00]));
    }

    #[test]
    fn test_glyph_cells() {
        let font = BitmapFont;
        // space has no filled cells
        assert_eq!(font.glyph_cells(' ').count(), 0);
        // '|' fills the full center column
        let cells: Vec<_> = font.glyph_cells('|').collect();
        assert_eq!(cells, vec![(2, 0), (2, 1), (2, 2), (2, 3), (2, 4), (2, 5), (2, 6)]);
        // '-' is the middle row of every column
        assert!(font.glyph_cells('-').all(|(_, row)| row == 3));
    }

    #[test]
    fn test_registry_lifecycle() {
        let mut fonts = FontRegistry::new();
        assert!(fonts.get("Arial").is_none());
        fonts.load("Arial");
        fonts.load("Mono");
        assert!(fonts.get("Arial").is_some());
        assert_eq!(fonts.loaded().count(), 2);
        // unknown families resolve to the default face
        let face = fonts.resolve("NoSuchFamily");
        assert!(face.has_glyph('x'));
        fonts.unload("Arial");
        assert!(fonts.get("Arial").is_none());
        fonts.clear();
        assert_eq!(fonts.loaded().count(), 0);
        // an empty registry still provides the bitmap fallback
        assert!(fonts.fallback().has_glyph('x'));
    }
}
