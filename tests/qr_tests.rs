//! Integration tests for styled QR rendering: styling must never change
//! which modules are dark.

use image::{Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};

use tokensmith::config::{FillKind, FillStyle, ModuleShape, QrStyleOptions};
use tokensmith::qr;

const PAYLOAD: &str = "https://example.com/scripts/midnight-garden/almanac";
const QUIET_ZONE: u32 = 2;

fn base_style() -> QrStyleOptions {
    QrStyleOptions::default()
}

fn sample_module(img: &RgbaImage, n: u32, x: u32, y: u32) -> Rgba<u8> {
    let m = img.width() as f32 / (n + 2 * QUIET_ZONE) as f32;
    let px = (QUIET_ZONE as f32 * m + (x as f32 + 0.5) * m) as u32;
    let py = (QUIET_ZONE as f32 * m + (y as f32 + 0.5) * m) as u32;
    *img.get_pixel(px, py)
}

fn is_inked(p: Rgba<u8>) -> bool {
    p.0[3] > 128 && (p.0[0] as u32 + p.0[1] as u32 + p.0[2] as u32) < 384
}

fn assert_matrix_preserved(style: &QrStyleOptions, label: &str) {
    let code = QrCode::with_error_correction_level(PAYLOAD, EcLevel::M).unwrap();
    let n = code.width() as u32;
    let colors = code.to_colors();
    let img = qr::render(PAYLOAD, 640, style, None).unwrap();

    for y in 0..n {
        for x in 0..n {
            let expect = colors[(y * n + x) as usize] == Color::Dark;
            assert_eq!(
                is_inked(sample_module(&img, n, x, y)),
                expect,
                "{}: module ({}, {})",
                label,
                x,
                y
            );
        }
    }
}

#[test]
fn test_every_shape_combination_preserves_payload_modules() {
    let shapes =
        [ModuleShape::Square, ModuleShape::Rounded, ModuleShape::Dot, ModuleShape::Classy];
    for data in shapes {
        for finder in shapes {
            let mut style = base_style();
            style.data_shape = data;
            style.finder_shape = finder;
            style.finder_dot_shape = data;
            assert_matrix_preserved(&style, &format!("{:?}/{:?}", data, finder));
        }
    }
}

#[test]
fn test_gradient_fills_preserve_payload_modules() {
    for kind in [FillKind::Linear, FillKind::Radial] {
        for rotation in [0.0_f32, 45.0, 90.0] {
            let mut style = base_style();
            style.fill = FillStyle {
                kind,
                start: "#1A0B3C".to_string(),
                end: "#0B3C1A".to_string(),
                rotation_deg: rotation,
            };
            assert_matrix_preserved(&style, &format!("{:?}@{}", kind, rotation));
        }
    }
}

#[test]
fn test_same_payload_same_matrix_across_styles() {
    // Two differently styled renders of one payload must disagree only in
    // pixels, never in module darkness.
    let mut a = base_style();
    a.data_shape = ModuleShape::Dot;
    let mut b = base_style();
    b.data_shape = ModuleShape::Classy;
    b.fill.start = "#333366".to_string();

    let code = QrCode::with_error_correction_level(PAYLOAD, EcLevel::M).unwrap();
    let n = code.width() as u32;
    let img_a = qr::render(PAYLOAD, 640, &a, None).unwrap();
    let img_b = qr::render(PAYLOAD, 640, &b, None).unwrap();
    for y in 0..n {
        for x in 0..n {
            assert_eq!(
                is_inked(sample_module(&img_a, n, x, y)),
                is_inked(sample_module(&img_b, n, x, y))
            );
        }
    }
}
