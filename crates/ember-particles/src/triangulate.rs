//! Ear-clipping triangulation of custom emission polygons and
//! area-weighted point sampling inside them.

use crate::rand::ParticleRng;
use ember_core::Vec2;

const MIN_TOTAL_AREA: f32 = 1e-6;

/// A custom emission polygon together with its cached triangulation.
#[derive(Debug, Clone, Default)]
pub struct CustomShape {
    points: Vec<Vec2>,
    triangles: Vec<[usize; 3]>,
    /// Running sum of triangle area / total area, ending at 1.0
    cumulative: Vec<f32>,
}

impl CustomShape {
    pub fn new(points: &[Vec2]) -> Self {
        let mut shape = Self::default();
        shape.refresh(points);
        shape
    }

    /// Re-triangulate if the point count or any position changed.
    /// Returns true when the cache was rebuilt.
    pub fn refresh(&mut self, points: &[Vec2]) -> bool {
        if points.len() < 3 {
            let had_shape = !self.points.is_empty();
            self.points.clear();
            self.triangles.clear();
            self.cumulative.clear();
            return had_shape;
        }
        if self.points == points {
            return false;
        }

        self.points = points.to_vec();
        self.triangles = triangulate(&self.points);
        let areas: Vec<f32> = self
            .triangles
            .iter()
            .map(|&[a, b, c]| triangle_area(self.points[a], self.points[b], self.points[c]))
            .collect();
        let total: f32 = areas.iter().sum();
        let total = total.max(MIN_TOTAL_AREA);
        let mut accum = 0.0;
        self.cumulative = areas
            .iter()
            .map(|area| {
                accum += area / total;
                accum
            })
            .collect();

        if self.triangles.len() + 2 != self.points.len() {
            log::warn!(
                "custom shape with {} points produced {} triangles; polygon is not simple",
                self.points.len(),
                self.triangles.len()
            );
        }
        log::debug!(
            "re-triangulated custom shape: {} points, {} triangles, area {total}",
            self.points.len(),
            self.triangles.len()
        );
        true
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn cumulative_areas(&self) -> &[f32] {
        &self.cumulative
    }

    /// Sum of triangle areas
    pub fn area(&self) -> f32 {
        self.triangles
            .iter()
            .map(|&[a, b, c]| triangle_area(self.points[a], self.points[b], self.points[c]))
            .sum()
    }

    /// Uniform-by-area random point. Returns the origin for a degenerate shape.
    pub fn sample(&self, rng: &mut ParticleRng) -> Vec2 {
        if self.triangles.is_empty() {
            return Vec2::ZERO;
        }
        let r = rng.next_f32();
        let idx = self
            .cumulative
            .iter()
            .position(|&c| r < c)
            .unwrap_or(self.triangles.len() - 1);

        let mut k1 = rng.next_f32();
        let mut k2 = rng.next_f32();
        if k1 + k2 > 1.0 {
            k1 = 1.0 - k1;
            k2 = 1.0 - k2;
        }
        let k3 = 1.0 - k1 - k2;
        let [a, b, c] = self.triangles[idx];
        self.points[a] * k1 + self.points[b] * k2 + self.points[c] * k3
    }
}

/// -1, 0 or 1. Zero stays zero, unlike `f32::signum`.
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Sign of the total turning angle: 1 for counter-clockwise in y-up
/// coordinates (clockwise on a y-down screen), -1 for the opposite.
pub fn winding_sign(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let total: f32 = (0..n)
        .map(|i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            (cur - prev).angle_to(&(next - cur))
        })
        .sum();
    sign(total)
}

/// Triangle area from its edge lengths (Heron's formula)
pub fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    let ab = (b - a).length();
    let bc = (c - b).length();
    let ca = (a - c).length();
    let p = (ab + bc + ca) * 0.5;
    (p * (p - ab) * (p - bc) * (p - ca)).max(0.0).sqrt()
}

/// Ear-clip a simple polygon into index triples.
///
/// Stops early (fewer than `n - 2` triangles) when no ear can be found,
/// which only happens for self-intersecting input.
pub fn triangulate(points: &[Vec2]) -> Vec<[usize; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }
    let winding = winding_sign(points);
    let mut work: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len() - 2);
    while let Some(tri) = clip_ear(points, &mut work, winding) {
        triangles.push(tri);
    }
    triangles
}

fn is_convex(points: &[Vec2], [a, b, c]: [usize; 3], winding: f32) -> bool {
    let (prev, cur, next) = (points[a], points[b], points[c]);
    sign((next - cur).cross(&(prev - cur))) == winding
}

/// True if any of `others` lies strictly inside the triangle
fn contains_any(points: &[Vec2], [a, b, c]: [usize; 3], others: &[usize], winding: f32) -> bool {
    let (v0, v1, v2) = (points[a], points[b], points[c]);
    others.iter().any(|&i| {
        let p = points[i];
        sign((v1 - v0).cross(&(p - v0))) == winding
            && sign((v2 - v1).cross(&(p - v1))) == winding
            && sign((v0 - v2).cross(&(p - v2))) == winding
    })
}

/// Find one ear, remove its tip from `work` and return it.
///
/// The two wrap-around candidates are tried before the interior ones.
fn clip_ear(points: &[Vec2], work: &mut Vec<usize>, winding: f32) -> Option<[usize; 3]> {
    let n = work.len();
    if n < 3 {
        return None;
    }

    let tri = [work[n - 1], work[0], work[1]];
    if is_convex(points, tri, winding) && !contains_any(points, tri, &work[2..n - 1], winding) {
        work.remove(0);
        return Some(tri);
    }

    let tri = [work[n - 2], work[n - 1], work[0]];
    if is_convex(points, tri, winding) && !contains_any(points, tri, &work[1..n - 2], winding) {
        work.remove(n - 1);
        return Some(tri);
    }

    for i in 1..n - 1 {
        let tri = [work[i - 1], work[i], work[i + 1]];
        if is_convex(points, tri, winding)
            && !contains_any(points, tri, &work[..i - 1], winding)
            && !contains_any(points, tri, &work[i + 2..], winding)
        {
            work.remove(i);
            return Some(tri);
        }
    }
    None
}
