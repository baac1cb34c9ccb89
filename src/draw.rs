//! Low-level raster helpers shared by the token renderers.
//!
//! Everything here composites straight onto `RgbaImage` buffers with
//! source-over blending. Higher layers decide *what* to draw; this module
//! only knows how to put pixels down cleanly.

use image::imageops::FilterType;
use image::{imageops, Rgba, RgbaImage};

/// Source-over blend of `color` onto `img` at `(x, y)`, with the color's
/// alpha additionally scaled by `coverage`.
///
/// Out-of-bounds coordinates are ignored.
pub fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let sa = (color.0[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let s = color.0[c] as f32;
        let d = dst.0[c] as f32;
        dst.0[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round() as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}

/// Antialiased coverage of a circle at pixel center `(x, y)`:
/// 1.0 well inside, 0.0 well outside, a one-pixel ramp at the rim.
fn circle_coverage(cx: f32, cy: f32, radius: f32, x: u32, y: u32) -> f32 {
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;
    let dist = (dx * dx + dy * dy).sqrt();
    (radius - dist + 0.5).clamp(0.0, 1.0)
}

/// Fill a circle with a flat color, antialiased at the rim.
pub fn fill_circle(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let x0 = ((cx - radius - 1.0).floor().max(0.0)) as u32;
    let y0 = ((cy - radius - 1.0).floor().max(0.0)) as u32;
    let x1 = ((cx + radius + 1.0).ceil() as u32).min(img.width());
    let y1 = ((cy + radius + 1.0).ceil() as u32).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let cov = circle_coverage(cx, cy, radius, x, y);
            if cov > 0.0 {
                blend_pixel(img, x as i32, y as i32, color, cov);
            }
        }
    }
}

/// Multiply the image's alpha by circular coverage, erasing everything
/// outside the circle. This is the "release the clip" model: layers that
/// must respect the token boundary are drawn first, then masked once.
pub fn mask_circle(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32) {
    let (w, h) = img.dimensions();
    for y in 0..h {
        for x in 0..w {
            let cov = circle_coverage(cx, cy, radius, x, y);
            if cov < 1.0 {
                let px = img.get_pixel_mut(x, y);
                px.0[3] = (px.0[3] as f32 * cov).round() as u8;
            }
        }
    }
}

/// Blit `src` resized to `w`x`h` with its top-left corner at `(x, y)`,
/// source-over blended.
pub fn blit_scaled(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64, w: u32, h: u32) {
    if w == 0 || h == 0 {
        return;
    }
    let resized = if src.dimensions() == (w, h) {
        src.clone()
    } else {
        imageops::resize(src, w, h, FilterType::CatmullRom)
    };
    imageops::overlay(dst, &resized, x, y);
}

/// Blit `src` centered at `(cx, cy)`, rotated by `rotation` radians
/// (clockwise), source-over blended with bilinear resampling.
///
/// Destination pixels are inverse-mapped into the source; samples outside
/// the source contribute nothing, so edges stay clean.
pub fn blit_rotated(dst: &mut RgbaImage, src: &RgbaImage, cx: f32, cy: f32, rotation: f32) {
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return;
    }
    let half_diag = (sw as f32).hypot(sh as f32) / 2.0 + 1.0;
    let x0 = ((cx - half_diag).floor().max(0.0)) as u32;
    let y0 = ((cy - half_diag).floor().max(0.0)) as u32;
    let x1 = ((cx + half_diag).ceil() as u32).min(dst.width());
    let y1 = ((cy + half_diag).ceil() as u32).min(dst.height());
    let (sin, cos) = rotation.sin_cos();
    let scx = sw as f32 / 2.0;
    let scy = sh as f32 / 2.0;

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            // Inverse rotation back into source space.
            let sx = dx * cos + dy * sin + scx - 0.5;
            let sy = -dx * sin + dy * cos + scy - 0.5;
            if let Some(color) = sample_bilinear(src, sx, sy) {
                blend_pixel(dst, x as i32, y as i32, color, 1.0);
            }
        }
    }
}

/// Bilinear sample at fractional source coordinates; `None` when the
/// sample window falls entirely outside the image.
fn sample_bilinear(src: &RgbaImage, sx: f32, sy: f32) -> Option<Rgba<u8>> {
    let (w, h) = src.dimensions();
    if sx < -1.0 || sy < -1.0 || sx > w as f32 || sy > h as f32 {
        return None;
    }
    let fx = sx.floor();
    let fy = sy.floor();
    let tx = sx - fx;
    let ty = sy - fy;
    let mut acc = [0.0f32; 4];
    let mut weight_sum = 0.0;
    for (ox, oy, wgt) in [
        (0, 0, (1.0 - tx) * (1.0 - ty)),
        (1, 0, tx * (1.0 - ty)),
        (0, 1, (1.0 - tx) * ty),
        (1, 1, tx * ty),
    ] {
        let px = fx as i64 + ox;
        let py = fy as i64 + oy;
        if px < 0 || py < 0 || px >= w as i64 || py >= h as i64 {
            continue;
        }
        let p = src.get_pixel(px as u32, py as u32);
        let a = p.0[3] as f32 / 255.0;
        acc[0] += p.0[0] as f32 * a * wgt;
        acc[1] += p.0[1] as f32 * a * wgt;
        acc[2] += p.0[2] as f32 * a * wgt;
        acc[3] += a * wgt;
        weight_sum += wgt;
    }
    if weight_sum <= 0.0 || acc[3] <= 0.0 {
        return None;
    }
    let a = acc[3];
    Some(Rgba([
        (acc[0] / a).round().clamp(0.0, 255.0) as u8,
        (acc[1] / a).round().clamp(0.0, 255.0) as u8,
        (acc[2] / a).round().clamp(0.0, 255.0) as u8,
        (a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]))
}

/// Center-crop `src` to the aspect ratio of `w`x`h`, then resize to fill.
///
/// Background images use this so arbitrary aspect ratios cover the whole
/// token without distortion.
pub fn cover_crop(src: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 || w == 0 || h == 0 {
        return RgbaImage::new(w, h);
    }
    let src_aspect = sw as f32 / sh as f32;
    let dst_aspect = w as f32 / h as f32;
    let (crop_w, crop_h) = if src_aspect > dst_aspect {
        ((sh as f32 * dst_aspect).round() as u32, sh)
    } else {
        (sw, (sw as f32 / dst_aspect).round() as u32)
    };
    let crop_w = crop_w.clamp(1, sw);
    let crop_h = crop_h.clamp(1, sh);
    let cx = (sw - crop_w) / 2;
    let cy = (sh - crop_h) / 2;
    let cropped = imageops::crop_imm(src, cx, cy, crop_w, crop_h).to_image();
    imageops::resize(&cropped, w, h, FilterType::CatmullRom)
}

/// Signed distance to a rounded rectangle centered at `(cx, cy)`;
/// negative inside, `radius` rounds all corners.
pub fn rounded_rect_sdf(
    x: f32,
    y: f32,
    cx: f32,
    cy: f32,
    half_w: f32,
    half_h: f32,
    radius: f32,
) -> f32 {
    let qx = (x - cx).abs() - (half_w - radius);
    let qy = (y - cy).abs() - (half_h - radius);
    let ox = qx.max(0.0);
    let oy = qy.max(0.0);
    (ox * ox + oy * oy).sqrt() + qx.max(qy).min(0.0) - radius
}

/// Fill a rounded rectangle, antialiased over a one-pixel edge.
pub fn fill_rounded_rect(
    img: &mut RgbaImage,
    cx: f32,
    cy: f32,
    half_w: f32,
    half_h: f32,
    radius: f32,
    color: Rgba<u8>,
) {
    let x0 = ((cx - half_w - 1.0).floor().max(0.0)) as u32;
    let y0 = ((cy - half_h - 1.0).floor().max(0.0)) as u32;
    let x1 = ((cx + half_w + 1.0).ceil() as u32).min(img.width());
    let y1 = ((cy + half_h + 1.0).ceil() as u32).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let d = rounded_rect_sdf(x as f32 + 0.5, y as f32 + 0.5, cx, cy, half_w, half_h, radius);
            let cov = (0.5 - d).clamp(0.0, 1.0);
            if cov > 0.0 {
                blend_pixel(img, x as i32, y as i32, color, cov);
            }
        }
    }
}

/// In-place box blur of all four channels, radius in pixels.
///
/// Used for text shadows; quality needs are modest so a single box pass
/// per axis is enough.
pub fn box_blur(img: &mut RgbaImage, radius: u32) {
    if radius == 0 {
        return;
    }
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let r = radius as i64;
    let norm = (2 * r + 1) as f32;

    // Horizontal pass
    let mut tmp = img.clone();
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for ox in -r..=r {
                let sx = (x as i64 + ox).clamp(0, w as i64 - 1) as u32;
                let p = img.get_pixel(sx, y);
                for c in 0..4 {
                    acc[c] += p.0[c] as f32;
                }
            }
            let p = tmp.get_pixel_mut(x, y);
            for c in 0..4 {
                p.0[c] = (acc[c] / norm).round() as u8;
            }
        }
    }
    // Vertical pass
    for x in 0..w {
        for y in 0..h {
            let mut acc = [0.0f32; 4];
            for oy in -r..=r {
                let sy = (y as i64 + oy).clamp(0, h as i64 - 1) as u32;
                let p = tmp.get_pixel(x, sy);
                for c in 0..4 {
                    acc[c] += p.0[c] as f32;
                }
            }
            let p = img.get_pixel_mut(x, y);
            for c in 0..4 {
                p.0[c] = (acc[c] / norm).round() as u8;
            }
        }
    }
}
