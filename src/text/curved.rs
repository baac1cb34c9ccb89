//! Text drawn along a circular arc.
//!
//! Layout and rasterization are split: [`arc_spans`] is pure math over
//! measured advances (and is what the tests exercise), while
//! [`draw_curved`] stamps rotated glyph bitmaps along the computed arc.

use image::{Rgba, RgbaImage};

use crate::draw::{blend_pixel, blit_rotated, box_blur};
use crate::font::{LoadedFont, TextMeasurer};
use crate::geometry::point_on_circle;

/// Which half of the circle the text follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcPosition {
    /// Upper arc, glyph tops facing outward
    Top,
    /// Lower arc, mirrored so the text reads left-to-right
    Bottom,
}

/// One character's place on the arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharSpan {
    /// The character
    pub ch: char,
    /// Angle of the character's center, radians clockwise from twelve o'clock
    pub angle: f32,
    /// Clockwise rotation to apply to the upright glyph
    pub rotation: f32,
}

/// Distribute the characters of `text` along an arc of `radius`.
///
/// Each character occupies its measured advance width plus
/// `letter_spacing`, so the arc length consumed matches the straight-line
/// text width; the whole run is centered on the arc's midpoint (twelve
/// o'clock for [`ArcPosition::Top`], six o'clock for
/// [`ArcPosition::Bottom`]). Never assumes monospace.
pub fn arc_spans(
    text: &str,
    radius: f32,
    px: f32,
    letter_spacing: f32,
    position: ArcPosition,
    measurer: &dyn TextMeasurer,
) -> Vec<CharSpan> {
    if radius <= 0.0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    let widths: Vec<f32> = chars.iter().map(|&c| measurer.char_advance(c, px)).collect();
    let total: f32 =
        widths.iter().sum::<f32>() + letter_spacing * (chars.len().saturating_sub(1)) as f32;
    let total_angle = total / radius;

    let mut spans = Vec::with_capacity(chars.len());
    // Arc-length offset of the current character's center from the run start.
    let mut offset = 0.0;
    for (&ch, &w) in chars.iter().zip(widths.iter()) {
        let center = offset + w / 2.0;
        let rel = center / radius - total_angle / 2.0;
        let (angle, rotation) = match position {
            ArcPosition::Top => (rel, rel),
            // Mirror: characters sweep from the lower-left (angle > pi)
            // to the lower-right, glyph tops facing the circle center.
            ArcPosition::Bottom => (std::f32::consts::PI - rel, -rel),
        };
        spans.push(CharSpan { ch, angle, rotation });
        offset += w + letter_spacing;
    }
    spans
}

/// Draw `text` along a circular arc onto `canvas`.
///
/// The baseline follows the circle of `radius` around `(cx, cy)`. With
/// `shadow_blur > 0` a blurred dark copy is composited first.
pub fn draw_curved(
    canvas: &mut RgbaImage,
    text: &str,
    cx: f32,
    cy: f32,
    radius: f32,
    font: &LoadedFont,
    px: f32,
    position: ArcPosition,
    color: Rgba<u8>,
    letter_spacing: f32,
    shadow_blur: u32,
) {
    let spans = arc_spans(text, radius, px, letter_spacing, position, font);
    if spans.is_empty() {
        return;
    }

    if shadow_blur > 0 {
        let mut shadow = RgbaImage::new(canvas.width(), canvas.height());
        stamp_spans(&mut shadow, &spans, cx, cy, radius, font, px, Rgba([0, 0, 0, 200]));
        box_blur(&mut shadow, shadow_blur);
        image::imageops::overlay(canvas, &shadow, 0, 0);
    }
    stamp_spans(canvas, &spans, cx, cy, radius, font, px, color);
}

/// Rasterize each span's glyph into a square stamp anchored at the middle
/// of its advance box on the baseline, then rotate-blit it onto the arc.
fn stamp_spans(
    canvas: &mut RgbaImage,
    spans: &[CharSpan],
    cx: f32,
    cy: f32,
    radius: f32,
    font: &LoadedFont,
    px: f32,
    color: Rgba<u8>,
) {
    let stamp_side = (px * 3.0).ceil() as u32;
    let half = stamp_side as f32 / 2.0;

    for span in spans {
        let Some(bitmap) = font.rasterize(span.ch, px) else {
            continue;
        };
        let advance = font.char_advance(span.ch, px);

        let mut stamp = RgbaImage::new(stamp_side, stamp_side);
        // Pen sits at (half - advance/2, half): the stamp center is then
        // the midpoint of the advance box on the baseline.
        let pen_x = half - advance / 2.0;
        for gy in 0..bitmap.height {
            for gx in 0..bitmap.width {
                let cov = bitmap.at(gx as i32, gy as i32);
                if cov <= 0.0 {
                    continue;
                }
                let sx = (pen_x + (bitmap.left + gx as i32) as f32).round() as i32;
                let sy = (half + (bitmap.top + gy as i32) as f32).round() as i32;
                blend_pixel(&mut stamp, sx, sy, color, cov);
            }
        }

        let (px_on_arc, py_on_arc) = point_on_circle(cx, cy, radius, span.angle);
        blit_rotated(canvas, &stamp, px_on_arc, py_on_arc, span.rotation);
    }
}
