//! Font loading, measurement, and glyph rasterization.
//!
//! Layout code never talks to rusttype directly: it measures through the
//! [`TextMeasurer`] trait so the geometry can be exercised with a
//! fixed-advance stub, while [`LoadedFont`] backs real rendering.

use rusttype::{point, Font, Scale};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Error type for font loading failures
#[derive(Debug, Error)]
pub enum FontError {
    /// File I/O error
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
    /// Font data was rejected by the parser
    #[error("'{0}' is not a usable TrueType/OpenType font")]
    Unsupported(String),
}

/// Measure rendered text width for a given pixel size.
///
/// The seam between layout math and glyph backends: wrapping and curved
/// placement consume this trait, never a concrete font type.
pub trait TextMeasurer {
    /// Advance width of a single character at `px`.
    fn char_advance(&self, ch: char, px: f32) -> f32;

    /// Width of `text` at `px`, with `letter_spacing` added between
    /// consecutive characters (not after the last).
    fn text_width(&self, text: &str, px: f32, letter_spacing: f32) -> f32 {
        let mut width = 0.0;
        let mut chars = 0usize;
        for ch in text.chars() {
            width += self.char_advance(ch, px);
            chars += 1;
        }
        if chars > 1 {
            width += letter_spacing * (chars - 1) as f32;
        }
        width
    }
}

/// A rasterized glyph: coverage bitmap plus placement relative to the pen.
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Offset from the pen position to the bitmap's left edge
    pub left: i32,
    /// Offset from the baseline to the bitmap's top edge (negative above)
    pub top: i32,
    /// Row-major coverage values in `0.0..=1.0`
    pub coverage: Vec<f32>,
}

impl GlyphBitmap {
    /// Coverage at `(x, y)`, zero outside the bitmap.
    pub fn at(&self, x: i32, y: i32) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0.0;
        }
        self.coverage[(y as u32 * self.width + x as u32) as usize]
    }
}

/// A named font loaded into memory.
pub struct LoadedFont {
    name: String,
    font: Font<'static>,
}

impl LoadedFont {
    /// Parse a font from raw TTF/OTF bytes.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, FontError> {
        let name = name.into();
        let font = Font::try_from_vec(bytes).ok_or_else(|| FontError::Unsupported(name.clone()))?;
        Ok(Self { name, font })
    }

    /// The family name this font was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ascent above the baseline at `px`.
    pub fn ascent(&self, px: f32) -> f32 {
        self.font.v_metrics(Scale::uniform(px)).ascent
    }

    /// Descent below the baseline at `px` (negative value).
    pub fn descent(&self, px: f32) -> f32 {
        self.font.v_metrics(Scale::uniform(px)).descent
    }

    /// Rasterize one character at `px` into a coverage bitmap.
    ///
    /// Returns `None` for glyphs with no ink (spaces, unmapped codepoints).
    pub fn rasterize(&self, ch: char, px: f32) -> Option<GlyphBitmap> {
        let scale = Scale::uniform(px);
        let glyph = self.font.glyph(ch).scaled(scale).positioned(point(0.0, 0.0));
        let bb = glyph.pixel_bounding_box()?;
        let width = (bb.max.x - bb.min.x) as u32;
        let height = (bb.max.y - bb.min.y) as u32;
        if width == 0 || height == 0 {
            return None;
        }
        let mut coverage = vec![0.0f32; (width * height) as usize];
        glyph.draw(|gx, gy, v| {
            coverage[(gy * width + gx) as usize] = v;
        });
        Some(GlyphBitmap { width, height, left: bb.min.x, top: bb.min.y, coverage })
    }
}

impl TextMeasurer for LoadedFont {
    fn char_advance(&self, ch: char, px: f32) -> f32 {
        let scale = Scale::uniform(px);
        self.font.glyph(ch).scaled(scale).h_metrics().advance_width
    }
}

/// Registry of loaded fonts, keyed by family name.
///
/// Populated by the driver from the options' `fonts` table; the generator
/// only ever borrows it.
#[derive(Default)]
pub struct FontStore {
    fonts: HashMap<String, Arc<LoadedFont>>,
}

impl FontStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a font file and register it under `family`.
    pub fn load_file(&mut self, family: &str, path: &Path) -> Result<(), FontError> {
        let bytes = fs::read(path)?;
        let font = LoadedFont::from_bytes(family, bytes)?;
        self.fonts.insert(family.to_string(), Arc::new(font));
        Ok(())
    }

    /// Register an already-parsed font.
    pub fn insert(&mut self, font: LoadedFont) {
        self.fonts.insert(font.name.clone(), Arc::new(font));
    }

    /// Look up a font by family name.
    pub fn get(&self, family: &str) -> Option<Arc<LoadedFont>> {
        self.fonts.get(family).cloned()
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether no fonts have been registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::TextMeasurer;

    /// Fixed-advance measurer: every character is `px * factor` wide.
    pub struct FixedAdvance(pub f32);

    impl TextMeasurer for FixedAdvance {
        fn char_advance(&self, _ch: char, px: f32) -> f32 {
            px * self.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FixedAdvance;
    use super::*;

    #[test]
    fn test_text_width_adds_letter_spacing_between_chars() {
        let m = FixedAdvance(0.5);
        // 3 chars at 10px * 0.5 = 15, plus 2 gaps of 2px.
        assert!((m.text_width("abc", 10.0, 2.0) - 19.0).abs() < 1e-5);
        // Single char gets no spacing.
        assert!((m.text_width("a", 10.0, 2.0) - 5.0).abs() < 1e-5);
        assert_eq!(m.text_width("", 10.0, 2.0), 0.0);
    }

    #[test]
    fn test_glyph_bitmap_at_bounds() {
        let bmp = GlyphBitmap {
            width: 2,
            height: 2,
            left: 0,
            top: 0,
            coverage: vec![0.1, 0.2, 0.3, 0.4],
        };
        assert_eq!(bmp.at(1, 1), 0.4);
        assert_eq!(bmp.at(-1, 0), 0.0);
        assert_eq!(bmp.at(0, 2), 0.0);
    }
}
