//! Polygon triangulation command

use anyhow::{bail, Result};
use ember_core::Vec2;
use ember_particles::triangulate::{triangle_area, triangulate, winding_sign};

pub fn run(points: &[Vec2]) -> Result<()> {
    if points.len() < 3 {
        bail!("a polygon needs at least 3 points, got {}", points.len());
    }

    let winding = match winding_sign(points) {
        w if w > 0.0 => "clockwise (y down)",
        w if w < 0.0 => "counter-clockwise (y down)",
        _ => "degenerate",
    };
    let triangles = triangulate(points);
    println!("Points:    {}", points.len());
    println!("Winding:   {}", winding);
    println!("Triangles: {}", triangles.len());

    let mut total = 0.0;
    for [a, b, c] in &triangles {
        let area = triangle_area(points[*a], points[*b], points[*c]);
        total += area;
        println!("  [{a}, {b}, {c}]  area {area:.3}");
    }
    println!("Total area: {total:.3}");

    if triangles.len() != points.len() - 2 {
        log::warn!(
            "expected {} triangles, found {}; polygon may self-intersect",
            points.len() - 2,
            triangles.len()
        );
    }
    Ok(())
}
