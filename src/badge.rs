//! Reminder-count badge: formatting and drawing.
//!
//! Character tokens can carry a small badge showing how many reminder
//! tokens the character owns, in one of four styles.

use image::{Rgba, RgbaImage};

use crate::config::CountStyle;
use crate::draw::fill_circle;
use crate::font::LoadedFont;
use crate::text::draw_centered;

/// Format a reminder count for the text-based badge styles.
///
/// The `Dots` style has no text form and formats as an empty string;
/// [`draw_count_badge`] renders it geometrically instead.
///
/// # Examples
///
/// ```
/// use tokensmith::badge::format_count;
/// use tokensmith::config::CountStyle;
///
/// assert_eq!(format_count(3, CountStyle::Arabic), "3");
/// assert_eq!(format_count(3, CountStyle::Roman), "III");
/// assert_eq!(format_count(3, CountStyle::Circled), "\u{2462}");
/// ```
pub fn format_count(n: usize, style: CountStyle) -> String {
    match style {
        CountStyle::Arabic => n.to_string(),
        CountStyle::Roman => roman(n),
        CountStyle::Circled => circled(n),
        CountStyle::Dots => String::new(),
    }
}

/// Roman numeral, conventional subtractive form. Zero stays "0".
fn roman(mut n: usize) -> String {
    if n == 0 {
        return "0".to_string();
    }
    const TABLE: [(usize, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// Circled digit (U+2460 block covers 1-20); larger counts fall back to
/// plain digits.
fn circled(n: usize) -> String {
    match n {
        1..=20 => char::from_u32(0x2460 + (n as u32 - 1)).unwrap().to_string(),
        _ => n.to_string(),
    }
}

/// Badge radius for the `Dots` style: grows `growth` of the base radius
/// per extra dot, clamped at twice the base so high counts stay legible.
pub fn dots_badge_radius(base: f32, count: usize, growth: f32) -> f32 {
    if count <= 1 {
        return base;
    }
    (base * (1.0 + growth * (count - 1) as f32)).min(base * 2.0)
}

/// Draw the count badge centered at `(cx, cy)`.
///
/// Text styles render the formatted count over a filled disc; the dots
/// style renders one small dot per reminder, arranged on an inner ring
/// (a single dot sits at the center).
pub fn draw_count_badge(
    canvas: &mut RgbaImage,
    count: usize,
    style: CountStyle,
    cx: f32,
    cy: f32,
    radius: f32,
    growth: f32,
    font: &LoadedFont,
    text_color: Rgba<u8>,
    background: Rgba<u8>,
) {
    if count == 0 {
        return;
    }
    match style {
        CountStyle::Dots => {
            let r = dots_badge_radius(radius, count, growth);
            fill_circle(canvas, cx, cy, r, background);
            let dot_r = r * 0.18;
            if count == 1 {
                fill_circle(canvas, cx, cy, dot_r, text_color);
                return;
            }
            let ring = r * 0.55;
            for i in 0..count {
                let angle = std::f32::consts::TAU * i as f32 / count as f32;
                let dx = cx + ring * angle.sin();
                let dy = cy - ring * angle.cos();
                fill_circle(canvas, dx, dy, dot_r, text_color);
            }
        }
        _ => {
            fill_circle(canvas, cx, cy, radius, background);
            let label = format_count(count, style);
            // Scale down for wide labels like "VIII" so they stay inside.
            let px = (radius * 1.1) / label.chars().count().max(1) as f32 * 1.6;
            let px = px.min(radius * 1.2);
            draw_centered(canvas, &label, cx, cy, font, px, text_color, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arabic() {
        assert_eq!(format_count(3, CountStyle::Arabic), "3");
        assert_eq!(format_count(12, CountStyle::Arabic), "12");
    }

    #[test]
    fn test_roman() {
        assert_eq!(format_count(3, CountStyle::Roman), "III");
        assert_eq!(format_count(4, CountStyle::Roman), "IV");
        assert_eq!(format_count(9, CountStyle::Roman), "IX");
        assert_eq!(format_count(14, CountStyle::Roman), "XIV");
        assert_eq!(format_count(0, CountStyle::Roman), "0");
    }

    #[test]
    fn test_circled() {
        assert_eq!(format_count(1, CountStyle::Circled), "\u{2460}");
        assert_eq!(format_count(20, CountStyle::Circled), "\u{2473}");
        assert_eq!(format_count(21, CountStyle::Circled), "21");
    }

    #[test]
    fn test_dots_has_no_text_form() {
        assert_eq!(format_count(5, CountStyle::Dots), "");
    }

    #[test]
    fn test_dots_radius_growth_capped() {
        assert_eq!(dots_badge_radius(10.0, 1, 0.2), 10.0);
        assert!((dots_badge_radius(10.0, 3, 0.2) - 14.0).abs() < 1e-5);
        // 11 dots at 20% growth would triple the radius; the cap holds it
        // at twice the base.
        assert_eq!(dots_badge_radius(10.0, 11, 0.2), 20.0);
    }
}
