//! Circle and chord math for token layout.
//!
//! Every "how wide can this line be" question in the crate goes through
//! [`max_half_width`]; wrapping and icon sizing must not re-derive the
//! chord formula.

/// Maximum horizontal half-width available inside a circle of `diameter`
/// at a line whose vertical center sits `y_from_top` pixels below the
/// circle's top edge.
///
/// Returns `sqrt(r^2 - (y - r)^2)`, or `0.0` when the line lies outside
/// the circle entirely, which forces callers to wrap (or skip) rather
/// than overflow the boundary.
///
/// # Examples
///
/// ```
/// use tokensmith::geometry::max_half_width;
///
/// // Widest at the vertical center:
/// assert_eq!(max_half_width(100.0, 50.0), 50.0);
/// // Zero above the top edge:
/// assert_eq!(max_half_width(100.0, -5.0), 0.0);
/// ```
pub fn max_half_width(diameter: f32, y_from_top: f32) -> f32 {
    let r = diameter / 2.0;
    let dist = (y_from_top - r).abs();
    if dist > r {
        return 0.0;
    }
    (r * r - dist * dist).sqrt()
}

/// A point on a circle's perimeter, `angle` in radians measured clockwise
/// from twelve o'clock (screen coordinates, y grows downward).
pub fn point_on_circle(cx: f32, cy: f32, radius: f32, angle: f32) -> (f32, f32) {
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}

/// Evenly spaced angles across `span` radians centered on twelve o'clock.
///
/// With a single slot the angle is exactly twelve o'clock; otherwise slots
/// run left to right from `-span / 2` to `span / 2` inclusive.
pub fn arc_slot_angles(span: f32, slots: usize) -> Vec<f32> {
    if slots == 0 {
        return Vec::new();
    }
    if slots == 1 {
        return vec![0.0];
    }
    let step = span / (slots - 1) as f32;
    (0..slots).map(|i| -span / 2.0 + step * i as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_outside_circle() {
        for d in [10.0_f32, 100.0, 512.0] {
            assert_eq!(max_half_width(d, -0.001), 0.0);
            assert_eq!(max_half_width(d, d + 0.001), 0.0);
            assert_eq!(max_half_width(d, d * 2.0), 0.0);
        }
    }

    #[test]
    fn test_full_radius_at_center() {
        assert_eq!(max_half_width(200.0, 100.0), 100.0);
    }

    #[test]
    fn test_zero_at_edges() {
        assert!(max_half_width(100.0, 0.0).abs() < 1e-3);
        assert!(max_half_width(100.0, 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_symmetric_about_center() {
        let d = 300.0;
        for off in [10.0_f32, 42.0, 120.0] {
            let above = max_half_width(d, d / 2.0 - off);
            let below = max_half_width(d, d / 2.0 + off);
            assert!((above - below).abs() < 1e-4);
        }
    }

    #[test]
    fn test_known_chord_value() {
        // 3-4-5 triangle: r = 50, 30 above center -> half-chord 40.
        let w = max_half_width(100.0, 20.0);
        assert!((w - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_point_on_circle_cardinals() {
        let (x, y) = point_on_circle(0.0, 0.0, 10.0, 0.0);
        assert!((x - 0.0).abs() < 1e-5 && (y + 10.0).abs() < 1e-5);
        let (x, y) = point_on_circle(0.0, 0.0, 10.0, std::f32::consts::FRAC_PI_2);
        assert!((x - 10.0).abs() < 1e-5 && y.abs() < 1e-4);
    }

    #[test]
    fn test_arc_slot_angles_span() {
        let angles = arc_slot_angles(1.0, 5);
        assert_eq!(angles.len(), 5);
        assert!((angles[0] + 0.5).abs() < 1e-6);
        assert!((angles[4] - 0.5).abs() < 1e-6);
        assert!(angles[2].abs() < 1e-6);
        assert_eq!(arc_slot_angles(1.0, 0).len(), 0);
        assert_eq!(arc_slot_angles(1.0, 1), vec![0.0]);
    }
}
