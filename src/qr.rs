//! Styled QR code rendering.
//!
//! The module matrix comes straight from the `qrcode` encoder; everything
//! visual on top of it - module shapes, finder treatments, gradient fills,
//! the center window - is parameterized styling that must never change
//! which modules are dark. Scannability is protected by error correction:
//! level M normally, forced to H whenever a center image is requested.

use image::{Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};
use thiserror::Error;

use crate::color::{parse_color, ColorError};
use crate::config::{FillKind, ModuleShape, QrStyleOptions};
use crate::draw::{blend_pixel, blit_scaled, rounded_rect_sdf};

/// Quiet-zone width in modules on every side.
const QUIET_ZONE: u32 = 2;

/// Error type for QR rendering failures
#[derive(Debug, Error)]
pub enum QrError {
    /// Payload could not be encoded
    #[error("QR encoding failed: {0:?}")]
    Encode(qrcode::types::QrError),
    /// A style color string was invalid
    #[error("invalid QR style color: {0}")]
    Color(#[from] ColorError),
    /// Requested output size too small for the matrix
    #[error("output size {0}px cannot fit a {1}x{1} module matrix")]
    TooSmall(u32, u32),
}

impl From<qrcode::types::QrError> for QrError {
    fn from(e: qrcode::types::QrError) -> Self {
        QrError::Encode(e)
    }
}

/// Render `payload` as a styled QR image of `size_px` x `size_px`.
///
/// `center` is the already-decoded center image, if any; the data modules
/// beneath it are suppressed only when it is actually present, so a failed
/// logo load degrades to a plain (still scannable) code.
pub fn render(
    payload: &str,
    size_px: u32,
    style: &QrStyleOptions,
    center: Option<&RgbaImage>,
) -> Result<RgbaImage, QrError> {
    let ec = if style.center.is_some() { EcLevel::H } else { EcLevel::M };
    let code = QrCode::with_error_correction_level(payload, ec)?;
    let n = code.width() as u32;
    let total_modules = n + 2 * QUIET_ZONE;
    if size_px < total_modules {
        return Err(QrError::TooSmall(size_px, n));
    }
    let colors = code.to_colors();
    let dark = |x: u32, y: u32| colors[(y * n + x) as usize] == Color::Dark;

    let m = size_px as f32 / total_modules as f32;
    let origin = QUIET_ZONE as f32 * m;
    let mut img = RgbaImage::new(size_px, size_px);

    // Background plate.
    if style.background_opacity > 0.0 {
        let mut bg = parse_color(&style.background_color)?;
        bg.0[3] = (bg.0[3] as f32 * style.background_opacity.clamp(0.0, 1.0)).round() as u8;
        for px in img.pixels_mut() {
            *px = bg;
        }
    }

    let fill = FillSampler::new(style, size_px)?;

    // Center suppression window, in module coordinates.
    let window = center.map(|_| {
        let cfg = style.center.as_ref();
        let ratio = cfg.map(|c| c.size_ratio).unwrap_or(0.2).clamp(0.05, 0.4);
        let margin = cfg.map(|c| c.margin_modules).unwrap_or(1.0).max(0.0);
        let half = n as f32 * ratio / 2.0 + margin;
        let mid = n as f32 / 2.0;
        (mid - half, mid + half)
    });
    let suppressed = |x: u32, y: u32| {
        window.map_or(false, |(lo, hi)| {
            let cx = x as f32 + 0.5;
            let cy = y as f32 + 0.5;
            cx > lo && cx < hi && cy > lo && cy < hi
        })
    };

    // Data modules (everything outside the three finder areas).
    for y in 0..n {
        for x in 0..n {
            if in_finder(x, y, n) || !dark(x, y) || suppressed(x, y) {
                continue;
            }
            let cx = origin + (x as f32 + 0.5) * m;
            let cy = origin + (y as f32 + 0.5) * m;
            draw_shape(&mut img, style.data_shape, cx, cy, m / 2.0, &fill);
        }
    }

    // Finder patterns: outer ring (7x7 minus 5x5) and inner dot (3x3),
    // each drawn as one stylized figure per corner.
    for (fx, fy) in finder_origins(n) {
        let cx = origin + (fx as f32 + 3.5) * m;
        let cy = origin + (fy as f32 + 3.5) * m;
        draw_ring(&mut img, style.finder_shape, cx, cy, 3.5 * m, 2.5 * m, &fill);
        draw_shape(&mut img, style.finder_dot_shape, cx, cy, 1.5 * m, &fill);
    }

    // Center image, inset by the configured margin.
    if let (Some(logo), Some((lo, hi))) = (center, window) {
        let margin = style.center.as_ref().map(|c| c.margin_modules).unwrap_or(1.0).max(0.0);
        let inner_lo = origin + (lo + margin) * m;
        let inner_hi = origin + (hi - margin) * m;
        let side = (inner_hi - inner_lo).max(1.0) as u32;
        blit_scaled(&mut img, logo, inner_lo.round() as i64, inner_lo.round() as i64, side, side);
    }

    Ok(img)
}

/// Top-left module coordinates of the three finder patterns.
fn finder_origins(n: u32) -> [(u32, u32); 3] {
    [(0, 0), (n - 7, 0), (0, n - 7)]
}

/// Whether module `(x, y)` belongs to one of the three 7x7 finder areas.
fn in_finder(x: u32, y: u32, n: u32) -> bool {
    let near = |v: u32| v < 7;
    let far = |v: u32| v >= n - 7;
    (near(x) && near(y)) || (far(x) && near(y)) || (near(x) && far(y))
}

/// Per-pixel fill color source, shared by modules and finders.
struct FillSampler {
    kind: FillKind,
    start: Rgba<u8>,
    end: Rgba<u8>,
    axis: (f32, f32),
    size: f32,
}

impl FillSampler {
    fn new(style: &QrStyleOptions, size_px: u32) -> Result<Self, ColorError> {
        let start = parse_color(&style.fill.start)?;
        let end = if style.fill.end.is_empty() {
            start
        } else {
            parse_color(&style.fill.end)?
        };
        let theta = style.fill.rotation_deg.to_radians();
        Ok(Self {
            kind: style.fill.kind,
            start,
            end,
            axis: (theta.cos(), theta.sin()),
            size: size_px as f32,
        })
    }

    fn at(&self, x: f32, y: f32) -> Rgba<u8> {
        let t = match self.kind {
            FillKind::Solid => return self.start,
            FillKind::Linear => {
                let u = x / self.size - 0.5;
                let v = y / self.size - 0.5;
                (u * self.axis.0 + v * self.axis.1) + 0.5
            }
            FillKind::Radial => {
                let dx = x - self.size / 2.0;
                let dy = y - self.size / 2.0;
                (dx * dx + dy * dy).sqrt() / (self.size / 2.0)
            }
        };
        let t = t.clamp(0.0, 1.0);
        let mut out = [0u8; 4];
        for c in 0..4 {
            out[c] =
                (self.start.0[c] as f32 * (1.0 - t) + self.end.0[c] as f32 * t).round() as u8;
        }
        Rgba(out)
    }
}

/// Signed distance for a shape; the classy variant rounds only the
/// top-left and bottom-right corners.
fn shape_sdf(shape: ModuleShape, x: f32, y: f32, cx: f32, cy: f32, half: f32) -> f32 {
    let radius = match shape {
        ModuleShape::Square => 0.0,
        ModuleShape::Rounded => half * 0.35,
        ModuleShape::Dot => half,
        ModuleShape::Classy => {
            let tl = x < cx && y < cy;
            let br = x >= cx && y >= cy;
            if tl || br {
                half * 0.9
            } else {
                0.0
            }
        }
    };
    rounded_rect_sdf(x, y, cx, cy, half, half, radius)
}

/// Fill one stylized figure, antialiased over a one-pixel edge.
fn draw_shape(
    img: &mut RgbaImage,
    shape: ModuleShape,
    cx: f32,
    cy: f32,
    half: f32,
    fill: &FillSampler,
) {
    let x0 = ((cx - half - 1.0).floor().max(0.0)) as u32;
    let y0 = ((cy - half - 1.0).floor().max(0.0)) as u32;
    let x1 = ((cx + half + 1.0).ceil() as u32).min(img.width());
    let y1 = ((cy + half + 1.0).ceil() as u32).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            let cov = (0.5 - shape_sdf(shape, px, py, cx, cy, half)).clamp(0.0, 1.0);
            if cov > 0.0 {
                blend_pixel(img, x as i32, y as i32, fill.at(px, py), cov);
            }
        }
    }
}

/// Fill a stylized ring: the outer figure minus the inner one.
fn draw_ring(
    img: &mut RgbaImage,
    shape: ModuleShape,
    cx: f32,
    cy: f32,
    outer_half: f32,
    inner_half: f32,
    fill: &FillSampler,
) {
    let x0 = ((cx - outer_half - 1.0).floor().max(0.0)) as u32;
    let y0 = ((cy - outer_half - 1.0).floor().max(0.0)) as u32;
    let x1 = ((cx + outer_half + 1.0).ceil() as u32).min(img.width());
    let y1 = ((cy + outer_half + 1.0).ceil() as u32).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            let outer = (0.5 - shape_sdf(shape, px, py, cx, cy, outer_half)).clamp(0.0, 1.0);
            let inner = (0.5 - shape_sdf(shape, px, py, cx, cy, inner_half)).clamp(0.0, 1.0);
            let cov = (outer - inner).max(0.0);
            if cov > 0.0 {
                blend_pixel(img, x as i32, y as i32, fill.at(px, py), cov);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CenterImageOptions, FillStyle};

    fn style() -> QrStyleOptions {
        QrStyleOptions {
            data_shape: ModuleShape::Square,
            finder_shape: ModuleShape::Square,
            finder_dot_shape: ModuleShape::Square,
            fill: FillStyle {
                kind: FillKind::Solid,
                start: "#000000".to_string(),
                end: String::new(),
                rotation_deg: 0.0,
            },
            background_color: "#FFFFFF".to_string(),
            background_opacity: 1.0,
            center: None,
        }
    }

    /// Sample the rendered image at a module's center.
    fn module_center(img: &RgbaImage, n: u32, x: u32, y: u32) -> Rgba<u8> {
        let m = img.width() as f32 / (n + 2 * QUIET_ZONE) as f32;
        let px = (QUIET_ZONE as f32 * m + (x as f32 + 0.5) * m) as u32;
        let py = (QUIET_ZONE as f32 * m + (y as f32 + 0.5) * m) as u32;
        *img.get_pixel(px, py)
    }

    fn is_dark(p: Rgba<u8>) -> bool {
        p.0[0] < 128 && p.0[3] > 128
    }

    #[test]
    fn test_default_style_matches_matrix() {
        let payload = "https://example.com/almanac";
        let code = QrCode::with_error_correction_level(payload, EcLevel::M).unwrap();
        let n = code.width() as u32;
        let colors = code.to_colors();

        let img = render(payload, 512, &style(), None).unwrap();
        for y in 0..n {
            for x in 0..n {
                let expect_dark = colors[(y * n + x) as usize] == Color::Dark;
                let got = is_dark(module_center(&img, n, x, y));
                assert_eq!(got, expect_dark, "module ({}, {}) mismatch", x, y);
            }
        }
    }

    #[test]
    fn test_styling_preserves_data_modules() {
        let payload = "https://example.com/a";
        let code = QrCode::with_error_correction_level(payload, EcLevel::M).unwrap();
        let n = code.width() as u32;
        let colors = code.to_colors();

        let mut styled = style();
        styled.data_shape = ModuleShape::Dot;
        styled.finder_shape = ModuleShape::Rounded;
        styled.finder_dot_shape = ModuleShape::Classy;
        styled.fill = FillStyle {
            kind: FillKind::Linear,
            start: "#200040".to_string(),
            end: "#004020".to_string(),
            rotation_deg: 45.0,
        };

        let img = render(payload, 512, &styled, None).unwrap();
        // Every module center keeps its darkness under any styling.
        for y in 0..n {
            for x in 0..n {
                let expect_dark = colors[(y * n + x) as usize] == Color::Dark;
                assert_eq!(
                    is_dark(module_center(&img, n, x, y)),
                    expect_dark,
                    "styled module ({}, {}) corrupted",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_center_image_suppresses_window_only() {
        let payload = "https://example.com/almanac-long-payload-for-density";
        let mut styled = style();
        styled.center = Some(CenterImageOptions {
            source: "logo".to_string(),
            size_ratio: 0.2,
            margin_modules: 1.0,
        });
        let logo = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255]));
        let img = render(payload, 512, &styled, Some(&logo)).unwrap();

        let code = QrCode::with_error_correction_level(payload, EcLevel::H).unwrap();
        let n = code.width() as u32;
        let colors = code.to_colors();
        // Same window the renderer suppresses: ratio 0.2 plus a 1-module
        // margin around the matrix middle.
        let half = n as f32 * 0.2 / 2.0 + 1.0;
        let mid = n as f32 / 2.0;
        let in_window = |v: u32| {
            let c = v as f32 + 0.5;
            c > mid - half && c < mid + half
        };
        for y in 0..n {
            for x in 0..n {
                if in_finder(x, y, n) || (in_window(x) && in_window(y)) {
                    continue;
                }
                let expect_dark = colors[(y * n + x) as usize] == Color::Dark;
                assert_eq!(is_dark(module_center(&img, n, x, y)), expect_dark);
            }
        }
        // The logo actually landed in the middle.
        let c = img.get_pixel(256, 256);
        assert!(c.0[0] > 200 && c.0[1] < 80);
    }

    #[test]
    fn test_too_small_output_rejected() {
        assert!(matches!(render("x", 10, &style(), None), Err(QrError::TooSmall(_, _))));
    }

    #[test]
    fn test_transparent_background() {
        let mut styled = style();
        styled.background_opacity = 0.0;
        let img = render("https://example.com", 256, &styled, None).unwrap();
        // Quiet-zone corner pixel stays fully transparent.
        assert_eq!(img.get_pixel(1, 1).0[3], 0);
    }
}
