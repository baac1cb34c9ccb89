//! Text layout and drawing: circular word wrap, curved arcs, and plain
//! horizontal runs.

pub mod curved;
pub mod wrap;

pub use curved::{arc_spans, draw_curved, ArcPosition, CharSpan};
pub use wrap::{icon_band, wrap, IconPlacement, Line, TextLayout};

use image::{Rgba, RgbaImage};

use crate::draw::blend_pixel;
use crate::font::{LoadedFont, TextMeasurer};

/// Draw a straight run of text with its baseline at `baseline_y`,
/// starting at `left_x`.
pub fn draw_text(
    canvas: &mut RgbaImage,
    text: &str,
    left_x: f32,
    baseline_y: f32,
    font: &LoadedFont,
    px: f32,
    color: Rgba<u8>,
    letter_spacing: f32,
) {
    let mut pen_x = left_x;
    for ch in text.chars() {
        if let Some(bitmap) = font.rasterize(ch, px) {
            for gy in 0..bitmap.height {
                for gx in 0..bitmap.width {
                    let cov = bitmap.at(gx as i32, gy as i32);
                    if cov <= 0.0 {
                        continue;
                    }
                    let x = (pen_x + (bitmap.left + gx as i32) as f32).round() as i32;
                    let y = (baseline_y + (bitmap.top + gy as i32) as f32).round() as i32;
                    blend_pixel(canvas, x, y, color, cov);
                }
            }
        }
        pen_x += font.char_advance(ch, px) + letter_spacing;
    }
}

/// Draw a wrapped layout with every line centered on `center_x`.
///
/// Line `y` values are vertical centers; baselines are derived from the
/// font's metrics so the ink is optically centered on each line.
pub fn draw_wrapped(
    canvas: &mut RgbaImage,
    layout: &TextLayout,
    font: &LoadedFont,
    px: f32,
    color: Rgba<u8>,
    center_x: f32,
) {
    let ascent = font.ascent(px);
    let descent = font.descent(px);
    for line in &layout.lines {
        let baseline = line.y + (ascent + descent) / 2.0;
        let left = center_x - line.width / 2.0;
        draw_text(canvas, &line.text, left, baseline, font, px, color, 0.0);
    }
}

/// Draw a single line centered at `(center_x, center_y)`.
pub fn draw_centered(
    canvas: &mut RgbaImage,
    text: &str,
    center_x: f32,
    center_y: f32,
    font: &LoadedFont,
    px: f32,
    color: Rgba<u8>,
    letter_spacing: f32,
) {
    let width = font.text_width(text, px, letter_spacing);
    let baseline = center_y + (font.ascent(px) + font.descent(px)) / 2.0;
    draw_text(canvas, text, center_x - width / 2.0, baseline, font, px, color, letter_spacing);
}
