//! Spatial and common types
//!
//! Angles are in degrees and follow screen conventions: 0 points right,
//! 90 points down.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2D vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `degrees`
    pub fn from_angle_deg(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self { x: cos, y: sin }
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product
    pub fn cross(&self, other: &Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Direction of this vector in degrees
    pub fn atan2_deg(&self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Signed angle in radians turning from `self` to `other`
    pub fn angle_to(&self, other: &Self) -> f32 {
        self.cross(other).atan2(self.dot(other))
    }

    /// Perpendicular vector rotated +90 degrees
    pub fn perpendicular(&self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Component-wise product
    pub fn scale(&self, other: Self) -> Self {
        Self {
            x: self.x * other.x,
            y: self.y * other.y,
        }
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    fn mul(self, v: Vec2) -> Vec2 {
        v * self
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;
    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// A 2D affine transform stored as two basis vectors and a translation.
///
/// A point `p` maps to `u * p.x + v * p.y + t`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub u: Vec2,
    pub v: Vec2,
    pub t: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        u: Vec2::new(1.0, 0.0),
        v: Vec2::new(0.0, 1.0),
        t: Vec2::ZERO,
    };

    pub fn from_translation(t: Vec2) -> Self {
        Self {
            t,
            ..Self::IDENTITY
        }
    }

    /// Scale, then rotate (degrees, clockwise on screen), then translate
    pub fn from_scale_rotation_translation(scale: Vec2, rotation_deg: f32, t: Vec2) -> Self {
        let axis = Vec2::from_angle_deg(rotation_deg);
        Self {
            u: axis * scale.x,
            v: axis.perpendicular() * scale.y,
            t,
        }
    }

    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        self.u * p.x + self.v * p.y + self.t
    }

    /// Apply the linear part only
    pub fn transform_vector(&self, p: Vec2) -> Vec2 {
        self.u * p.x + self.v * p.y
    }

    /// Compose: apply `self` first, then `parent`
    pub fn then(&self, parent: &Self) -> Self {
        Self {
            u: parent.transform_vector(self.u),
            v: parent.transform_vector(self.v),
            t: parent.transform_point(self.t),
        }
    }
}

/// RGBA color, components in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Component-wise tint
impl Mul for Color {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Self {
            r: self.r * other.r,
            g: self.g * other.g,
            b: self.b * other.b,
            a: self.a * other.a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_vec2_operations() {
        let v1 = Vec2::new(1.0, 2.0);
        let v2 = Vec2::new(4.0, 6.0);

        assert_eq!(v1 + v2, Vec2::new(5.0, 8.0));
        assert_eq!(v2 - v1, Vec2::new(3.0, 4.0));
        assert_eq!(v1 * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(v1.scale(v2), Vec2::new(4.0, 12.0));
        assert!(((v2 - v1).length() - 5.0).abs() < 1e-6);
        assert_eq!(v1.cross(&v2), 1.0 * 6.0 - 2.0 * 4.0);
    }

    #[test]
    fn test_angles_follow_screen_convention() {
        assert!(close(Vec2::from_angle_deg(0.0), Vec2::new(1.0, 0.0)));
        assert!(close(Vec2::from_angle_deg(90.0), Vec2::new(0.0, 1.0)));
        assert!((Vec2::new(0.0, 1.0).atan2_deg() - 90.0).abs() < 1e-4);
        let turn = Vec2::new(1.0, 0.0).angle_to(&Vec2::new(0.0, 1.0));
        assert!((turn - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_transform_composition() {
        let local = Transform2D::from_scale_rotation_translation(
            Vec2::new(2.0, 2.0),
            90.0,
            Vec2::new(10.0, 0.0),
        );
        let parent = Transform2D::from_translation(Vec2::new(0.0, 5.0));
        let world = local.then(&parent);

        // (1, 0) scaled to (2, 0), rotated to (0, 2), moved by (10, 0) then (0, 5)
        let p = world.transform_point(Vec2::new(1.0, 0.0));
        assert!(close(p, Vec2::new(10.0, 7.0)));
        assert!((world.u.cross(&world.v) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_color_tint() {
        let tinted = Color::new(1.0, 0.5, 0.2, 1.0) * Color::new(0.5, 0.5, 1.0, 0.5);
        assert_eq!(tinted, Color::new(0.5, 0.25, 0.2, 0.5));
        assert_eq!(tinted.to_array(), [0.5, 0.25, 0.2, 0.5]);
    }
}
