//! Greedy word wrap against a circular boundary.
//!
//! Each candidate line asks [`crate::geometry::max_half_width`] how much
//! horizontal room exists at its vertical center, shrunk by a padding
//! ratio so text never touches the rim. The same layout result drives
//! both ability-text drawing and icon sizing.

use crate::font::TextMeasurer;
use crate::geometry::max_half_width;

/// One laid-out line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// The line's text content
    pub text: String,
    /// Vertical center of the line, measured from the circle's top edge
    pub y: f32,
    /// Measured width of the line at the layout font size
    pub width: f32,
}

/// Result of wrapping a text block inside a circle.
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    /// Lines in top-to-bottom order
    pub lines: Vec<Line>,
    /// Total vertical extent of the block (line count x line height)
    pub total_height: f32,
}

impl TextLayout {
    /// Vertical center of the first line, `None` for an empty layout.
    pub fn top(&self) -> Option<f32> {
        self.lines.first().map(|l| l.y)
    }

    /// Bottom edge of the block: last line center plus half a line height.
    pub fn bottom(&self, line_height: f32) -> Option<f32> {
        self.lines.last().map(|l| l.y + line_height / 2.0)
    }
}

/// Wrap `text` into lines that fit a circle of `diameter`.
///
/// Lines start at vertical center `start_y` and advance by
/// `px * line_height_mult`. The allowed width at each line is the full
/// chord at its center times `padding_ratio`.
///
/// A single word wider than the available chord is kept alone on its line
/// rather than split mid-word; callers that care can compare `Line::width`
/// against the chord.
pub fn wrap(
    text: &str,
    diameter: f32,
    px: f32,
    line_height_mult: f32,
    start_y: f32,
    padding_ratio: f32,
    measurer: &dyn TextMeasurer,
) -> TextLayout {
    let line_height = px * line_height_mult;
    let mut lines: Vec<Line> = Vec::new();
    let mut current = String::new();
    let mut y = start_y;

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        let candidate_width = measurer.text_width(&candidate, px, 0.0);
        let allowed = 2.0 * max_half_width(diameter, y) * padding_ratio;

        if candidate_width <= allowed || current.is_empty() {
            current = candidate;
        } else {
            let width = measurer.text_width(&current, px, 0.0);
            lines.push(Line { text: std::mem::take(&mut current), y, width });
            y += line_height;
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        let width = measurer.text_width(&current, px, 0.0);
        lines.push(Line { text: current, y, width });
    }

    let total_height = lines.len() as f32 * line_height;
    TextLayout { lines, total_height }
}

/// Computed placement for a square icon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconPlacement {
    /// Side length of the icon square
    pub size: f32,
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
}

/// Size and place an icon inside the vertical band `band_top..band_bottom`
/// of a circle of `diameter`.
///
/// The icon takes `fill_ratio` of the band's height (clamped so it never
/// exceeds the band), is centered horizontally and vertically within the
/// band, then shifted by `offset_y` pixels. Callers derive `band_top` from
/// the wrapped ability text's bottom edge when text is present, or from a
/// fixed top margin when it is not, so icon and text cannot collide.
pub fn icon_band(
    diameter: f32,
    band_top: f32,
    band_bottom: f32,
    fill_ratio: f32,
    offset_y: f32,
) -> IconPlacement {
    let band = (band_bottom - band_top).max(0.0);
    let size = band * fill_ratio.clamp(0.0, 1.0);
    let x = diameter / 2.0 - size / 2.0;
    let y = band_top + (band - size) / 2.0 + offset_y;
    IconPlacement { size, x, y }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::test_support::FixedAdvance;

    // 10px per char at px=10.
    const M: FixedAdvance = FixedAdvance(1.0);

    #[test]
    fn test_empty_text_empty_layout() {
        let layout = wrap("", 200.0, 10.0, 1.2, 40.0, 0.9, &M);
        assert!(layout.lines.is_empty());
        assert_eq!(layout.total_height, 0.0);
        assert_eq!(layout.top(), None);
    }

    #[test]
    fn test_single_short_line() {
        let layout = wrap("ab cd", 400.0, 10.0, 1.2, 200.0, 0.9, &M);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.lines[0].text, "ab cd");
        assert_eq!(layout.lines[0].y, 200.0);
        assert!((layout.total_height - 12.0).abs() < 1e-5);
    }

    #[test]
    fn test_lines_never_exceed_padded_chord() {
        let text = "each of these little words wraps neatly inside the circle boundary here";
        let d = 300.0;
        let layout = wrap(text, d, 10.0, 1.2, 60.0, 0.85, &M);
        assert!(layout.lines.len() > 1);
        for line in &layout.lines {
            let allowed = 2.0 * max_half_width(d, line.y) * 0.85;
            assert!(
                line.width <= allowed + 1e-3,
                "line '{}' width {} exceeds {}",
                line.text,
                line.width,
                allowed
            );
        }
    }

    #[test]
    fn test_overlong_word_kept_whole() {
        // 30 chars * 10px = 300px against a 100px circle: impossible to fit,
        // but the word must not be split.
        let word = "a".repeat(30);
        let layout = wrap(&word, 100.0, 10.0, 1.2, 50.0, 0.9, &M);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.lines[0].text, word);
    }

    #[test]
    fn test_words_preserved_in_order() {
        let text = "one two three four five six seven eight nine ten";
        let layout = wrap(text, 220.0, 10.0, 1.2, 40.0, 0.9, &M);
        let rejoined: Vec<&str> =
            layout.lines.iter().flat_map(|l| l.text.split(' ')).collect();
        assert_eq!(rejoined.join(" "), text);
    }

    #[test]
    fn test_allowed_width_shrinks_away_from_center() {
        // Start near the top: later lines move toward the vertical center,
        // so the first line should be the narrowest capacity-wise.
        let d = 200.0;
        let y0 = 30.0;
        let first = 2.0 * max_half_width(d, y0) * 0.9;
        let second = 2.0 * max_half_width(d, y0 + 12.0) * 0.9;
        assert!(second > first);
    }

    #[test]
    fn test_icon_band_centered() {
        let p = icon_band(200.0, 40.0, 140.0, 0.8, 0.0);
        assert!((p.size - 80.0).abs() < 1e-5);
        assert!((p.x - 60.0).abs() < 1e-5);
        assert!((p.y - 50.0).abs() < 1e-5);
    }

    #[test]
    fn test_icon_band_empty_band_collapses() {
        let p = icon_band(200.0, 150.0, 140.0, 0.8, 0.0);
        assert_eq!(p.size, 0.0);
    }
}
