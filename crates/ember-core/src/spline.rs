//! Pure spline math: Catmull-Rom interpolation through 2D control points.
//!
//! The curve passes through `p1` at `t = 0` and `p2` at `t = 1`; `p0` and
//! `p3` only shape the tangents.

use crate::Vec2;

/// Catmull-Rom spline interpolation between four points.
pub fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    Vec2::new(
        catmull_rom_scalar(p0.x, p1.x, p2.x, p3.x, t),
        catmull_rom_scalar(p0.y, p1.y, p2.y, p3.y, t),
    )
}

/// Catmull-Rom interpolation for a single scalar value.
pub fn catmull_rom_scalar(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Evaluate a spline segment given its control points as a window.
pub fn catmull_rom_window(points: &[Vec2; 4], t: f32) -> Vec2 {
    catmull_rom(points[0], points[1], points[2], points[3], t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_inner_points() {
        let p0 = Vec2::new(-5.0, 3.0);
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(10.0, 4.0);
        let p3 = Vec2::new(12.0, -8.0);

        let start = catmull_rom(p0, p1, p2, p3, 0.0);
        let end = catmull_rom(p0, p1, p2, p3, 1.0);
        assert!((start - p1).length() < 1e-5);
        assert!((end - p2).length() < 1e-5);
    }

    #[test]
    fn collinear_points_stay_on_line() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 0.0),
        ];
        let mid = catmull_rom_window(&pts, 0.5);
        assert!((mid.x - 1.5).abs() < 1e-5);
        assert!(mid.y.abs() < 1e-6);
    }

    #[test]
    fn scalar_matches_vector_component() {
        let v = catmull_rom(
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(8.0, 0.0),
            0.3,
        );
        let s = catmull_rom_scalar(1.0, 2.0, 4.0, 8.0, 0.3);
        assert!((v.x - s).abs() < 1e-6);
    }
}
