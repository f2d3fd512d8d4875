//! Keyframed value tracks with linear interpolation

use ember_core::{Color, Vec2};

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear interpolation between two RGBA colors
pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    Color::new(
        lerp_f32(a.r, b.r, t),
        lerp_f32(a.g, b.g, t),
        lerp_f32(a.b, b.b, t),
        lerp_f32(a.a, b.a, t),
    )
}

/// Values that can be blended between keyframes
pub trait Lerp: Copy {
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        lerp_f32(a, b, t)
    }
}

impl Lerp for Vec2 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Vec2::new(lerp_f32(a.x, b.x, t), lerp_f32(a.y, b.y, t))
    }
}

impl Lerp for Color {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        lerp_color(a, b, t)
    }
}

/// A value at a point in time (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

/// Sorted keyframes sampled with linear interpolation and clamped ends
#[derive(Debug, Clone, PartialEq)]
pub struct Track<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T: Lerp> Track<T> {
    /// Builds a track, sorting keyframes by time
    pub fn new(mut keyframes: Vec<Keyframe<T>>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keyframes }
    }

    /// Time of the last keyframe
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    pub fn sample(&self, time: f32) -> Option<T> {
        let first = self.keyframes.first()?;
        if time <= first.time {
            return Some(first.value);
        }
        for pair in self.keyframes.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if time <= b.time {
                let span = b.time - a.time;
                let t = if span > 0.0 { (time - a.time) / span } else { 1.0 };
                return Some(T::lerp(a.value, b.value, t));
            }
        }
        self.keyframes.last().map(|k| k.value)
    }
}
