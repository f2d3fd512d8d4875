//! Modifiers: per-particle visual profiles (flip-book + animated multipliers)

use crate::curves::{Keyframe, Lerp, Track};
use crate::toml_util::{toml_f32, toml_int, toml_vec2_or};
use ember_core::{Color, EmberError, Result, Vec2};

/// Multipliers a modifier applies to every particle bound to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multipliers {
    pub velocity: f32,
    pub angular_velocity: f32,
    pub spin: f32,
    pub scale: Vec2,
    pub color: Color,
    pub wind: f32,
    pub gravity: f32,
    pub magnet: f32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            velocity: 1.0,
            angular_velocity: 1.0,
            spin: 1.0,
            scale: Vec2::ONE,
            color: Color::WHITE,
            wind: 1.0,
            gravity: 1.0,
            magnet: 1.0,
        }
    }
}

/// Contract for a modifier attached to an emitter.
///
/// Frame numbers are 1-based atlas frames; `first_frame > last_frame` plays
/// the flip-book backwards.
pub trait ParticleModifier {
    fn first_frame(&self) -> i32;
    fn last_frame(&self) -> i32;
    /// Flip-book frames per second
    fn animation_fps(&self) -> f32;
    fn looped_animation(&self) -> bool;
    /// Length of the multiplier timeline in seconds; 0 means not animated
    fn animation_duration(&self) -> f32;
    /// Multipliers used when the timeline is not evaluated
    fn multipliers(&self) -> Multipliers;
    /// Multipliers at `time` seconds into the timeline
    fn multipliers_at(&self, time: f32) -> Multipliers {
        let _ = time;
        self.multipliers()
    }
    /// Base sprite size in pixels
    fn image_size(&self) -> Vec2;
    /// Texture for a 0-based frame index
    fn texture(&self, frame: i32) -> Option<&str>;
}

/// Keyframed multiplier tracks, one per animated property
#[derive(Debug, Clone, Default)]
pub struct MultiplierTracks {
    pub velocity: Option<Track<f32>>,
    pub angular_velocity: Option<Track<f32>>,
    pub spin: Option<Track<f32>>,
    pub scale: Option<Track<Vec2>>,
    pub color: Option<Track<Color>>,
    pub wind: Option<Track<f32>>,
    pub gravity: Option<Track<f32>>,
    pub magnet: Option<Track<f32>>,
}

impl MultiplierTracks {
    fn duration(&self) -> f32 {
        [
            self.velocity.as_ref().map(Track::duration),
            self.angular_velocity.as_ref().map(Track::duration),
            self.spin.as_ref().map(Track::duration),
            self.scale.as_ref().map(Track::duration),
            self.color.as_ref().map(Track::duration),
            self.wind.as_ref().map(Track::duration),
            self.gravity.as_ref().map(Track::duration),
            self.magnet.as_ref().map(Track::duration),
        ]
        .into_iter()
        .flatten()
        .fold(0.0, f32::max)
    }
}

/// A modifier described by static multipliers plus optional keyframe tracks
#[derive(Debug, Clone)]
pub struct ModifierProfile {
    pub first_frame: i32,
    pub last_frame: i32,
    pub animation_fps: f32,
    pub looped_animation: bool,
    pub image_size: Vec2,
    /// One texture per atlas frame; a single entry is shared by all frames
    pub textures: Vec<String>,
    pub base: Multipliers,
    pub tracks: MultiplierTracks,
    /// Timeline length the particle lifetime is mapped onto
    pub(crate) duration: f32,
}

impl Default for ModifierProfile {
    fn default() -> Self {
        Self {
            first_frame: 1,
            last_frame: 1,
            animation_fps: 20.0,
            looped_animation: true,
            image_size: Vec2::new(32.0, 32.0),
            textures: Vec::new(),
            base: Multipliers::default(),
            tracks: MultiplierTracks::default(),
            duration: 0.0,
        }
    }
}

impl ModifierProfile {
    /// Attach tracks; the timeline length becomes the longest track
    pub fn with_tracks(mut self, tracks: MultiplierTracks) -> Self {
        self.duration = tracks.duration();
        self.tracks = tracks;
        self
    }

    /// Override the timeline length
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    /// Parse a `[[emitter.modifier]]` table
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let mut profile = Self::default();

        if let Some(v) = table.get("first_frame") {
            profile.first_frame = toml_int("first_frame", v)?;
        }
        if let Some(v) = table.get("last_frame") {
            profile.last_frame = toml_int("last_frame", v)?;
        } else {
            profile.last_frame = profile.first_frame;
        }
        if let Some(v) = table.get("fps") {
            profile.animation_fps = toml_f32(v, profile.animation_fps);
        }
        if let Some(v) = table.get("looped") {
            profile.looped_animation = v.as_bool().unwrap_or(true);
        }
        if let Some(v) = table.get("size") {
            profile.image_size = toml_vec2_or(v, profile.image_size);
        }
        if let Some(v) = table.get("textures").and_then(|v| v.as_array()) {
            profile.textures = v
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect();
        } else if let Some(t) = table.get("texture").and_then(|v| v.as_str()) {
            profile.textures = vec![t.to_string()];
        }

        if let Some(tracks) = table.get("tracks").and_then(|v| v.as_table()) {
            let parsed = MultiplierTracks {
                velocity: parse_track(tracks, "velocity", scalar_value)?,
                angular_velocity: parse_track(tracks, "angular_velocity", scalar_value)?,
                spin: parse_track(tracks, "spin", scalar_value)?,
                scale: parse_track(tracks, "scale", scale_value)?,
                color: parse_track(tracks, "color", color_value)?,
                wind: parse_track(tracks, "wind", scalar_value)?,
                gravity: parse_track(tracks, "gravity", scalar_value)?,
                magnet: parse_track(tracks, "magnet", scalar_value)?,
            };
            profile = profile.with_tracks(parsed);
        }
        if let Some(v) = table.get("duration") {
            let duration = toml_f32(v, profile.duration);
            profile = profile.with_duration(duration);
        }
        Ok(profile)
    }
}

fn sample_or<T: Lerp>(track: &Option<Track<T>>, time: f32, fallback: T) -> T {
    track
        .as_ref()
        .and_then(|t| t.sample(time))
        .unwrap_or(fallback)
}

impl ParticleModifier for ModifierProfile {
    fn first_frame(&self) -> i32 {
        self.first_frame
    }

    fn last_frame(&self) -> i32 {
        self.last_frame
    }

    fn animation_fps(&self) -> f32 {
        self.animation_fps
    }

    fn looped_animation(&self) -> bool {
        self.looped_animation
    }

    fn animation_duration(&self) -> f32 {
        self.duration
    }

    fn multipliers(&self) -> Multipliers {
        self.base
    }

    fn multipliers_at(&self, time: f32) -> Multipliers {
        let base = self.base;
        let t = &self.tracks;
        Multipliers {
            velocity: sample_or(&t.velocity, time, base.velocity),
            angular_velocity: sample_or(&t.angular_velocity, time, base.angular_velocity),
            spin: sample_or(&t.spin, time, base.spin),
            scale: sample_or(&t.scale, time, base.scale),
            color: sample_or(&t.color, time, base.color),
            wind: sample_or(&t.wind, time, base.wind),
            gravity: sample_or(&t.gravity, time, base.gravity),
            magnet: sample_or(&t.magnet, time, base.magnet),
        }
    }

    fn image_size(&self) -> Vec2 {
        self.image_size
    }

    fn texture(&self, frame: i32) -> Option<&str> {
        match self.textures.as_slice() {
            [] => None,
            [single] => Some(single.as_str()),
            many => usize::try_from(frame)
                .ok()
                .and_then(|i| many.get(i))
                .map(String::as_str),
        }
    }
}

// ── Track decoding ──

fn scalar_value(values: &[f32]) -> Option<f32> {
    match values {
        [v] => Some(*v),
        _ => None,
    }
}

fn scale_value(values: &[f32]) -> Option<Vec2> {
    match values {
        [v] => Some(Vec2::new(*v, *v)),
        [x, y] => Some(Vec2::new(*x, *y)),
        _ => None,
    }
}

fn color_value(values: &[f32]) -> Option<Color> {
    match values {
        [r, g, b] => Some(Color::new(*r, *g, *b, 1.0)),
        [r, g, b, a] => Some(Color::new(*r, *g, *b, *a)),
        _ => None,
    }
}

/// Parse `name = [[time, values...], ...]` into a track
fn parse_track<T: Lerp>(
    tracks: &toml::value::Table,
    name: &str,
    decode: fn(&[f32]) -> Option<T>,
) -> Result<Option<Track<T>>> {
    let Some(value) = tracks.get(name) else {
        return Ok(None);
    };
    let invalid = || EmberError::InvalidFieldType {
        field: format!("tracks.{name}"),
        expected: "array of [time, values...] keyframes".to_string(),
    };
    let rows = value.as_array().ok_or_else(invalid)?;
    let mut keyframes = Vec::with_capacity(rows.len());
    for row in rows {
        let numbers: Vec<f32> = row
            .as_array()
            .ok_or_else(invalid)?
            .iter()
            .map(|n| toml_f32(n, f32::NAN))
            .collect();
        let Some((&time, rest)) = numbers.split_first() else {
            return Err(invalid());
        };
        if numbers.iter().any(|n| n.is_nan()) {
            return Err(invalid());
        }
        let value = decode(rest).ok_or_else(invalid)?;
        keyframes.push(Keyframe { time, value });
    }
    Ok(Some(Track::new(keyframes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_profile_uses_base_multipliers() {
        let profile = ModifierProfile::default();
        assert_eq!(profile.animation_duration(), 0.0);
        assert_eq!(profile.multipliers_at(3.0), Multipliers::default());
        assert_eq!(profile.texture(0), None);
    }

    #[test]
    fn parse_profile_with_tracks() {
        let src = r#"
first_frame = 1
last_frame = 4
fps = 12
looped = false
size = [16, 24]
textures = ["a.png", "b.png", "c.png", "d.png"]

[tracks]
scale = [[0.0, 1.0], [2.0, 0.5, 2.0]]
color = [[0.0, 1, 1, 1, 1], [1.0, 1, 0, 0, 0]]
velocity = [[0, 1], [1, 3]]
"#;
        let table: toml::value::Table = toml::from_str(src).unwrap();
        let profile = ModifierProfile::from_toml(&table).unwrap();

        assert_eq!(profile.last_frame(), 4);
        assert!(!profile.looped_animation());
        assert_eq!(profile.image_size(), Vec2::new(16.0, 24.0));
        assert_eq!(profile.texture(2), Some("c.png"));
        assert_eq!(profile.texture(9), None);
        assert!((profile.animation_duration() - 2.0).abs() < 1e-6);

        let m = profile.multipliers_at(1.0);
        assert!((m.scale.x - 0.75).abs() < 1e-6);
        assert!((m.scale.y - 1.5).abs() < 1e-6);
        assert!((m.velocity - 3.0).abs() < 1e-6);
        assert_eq!(m.color, Color::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(m.spin, 1.0);
    }

    #[test]
    fn duration_key_overrides_track_length() {
        let src = r#"
duration = 4
[tracks]
spin = [[0.0, 1.0], [1.0, 2.0]]
"#;
        let table: toml::value::Table = toml::from_str(src).unwrap();
        let profile = ModifierProfile::from_toml(&table).unwrap();
        assert_eq!(profile.animation_duration(), 4.0);

        let table: toml::value::Table = toml::from_str("duration = -1.0").unwrap();
        let profile = ModifierProfile::from_toml(&table).unwrap();
        assert_eq!(profile.animation_duration(), 0.0);
    }

    #[test]
    fn single_texture_serves_every_frame() {
        let profile = ModifierProfile {
            textures: vec!["spark.png".into()],
            ..Default::default()
        };
        assert_eq!(profile.texture(0), Some("spark.png"));
        assert_eq!(profile.texture(5), Some("spark.png"));
    }

    #[test]
    fn malformed_track_is_rejected() {
        let table: toml::value::Table =
            toml::from_str("[tracks]\ncolor = [[0.0, 1.0]]").unwrap();
        assert!(ModifierProfile::from_toml(&table).is_err());
    }
}
