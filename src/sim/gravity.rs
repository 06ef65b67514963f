//! Device tilt to scene gravity
//!
//! Device frame: x right, y up (toward the top edge in portrait), z toward
//! the viewer. The scene is always drawn upright for the current interface
//! orientation, so the device vector has to be rotated into scene space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY_GAIN;

/// Interface orientation reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    /// Face up/down or not yet known
    Unknown,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::PortraitUpsideDown => "portraitUpsideDown",
            Orientation::LandscapeLeft => "landscapeLeft",
            Orientation::LandscapeRight => "landscapeRight",
            Orientation::Unknown => "unknown",
        }
    }

    /// Lenient parse; anything unrecognized is `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "portrait" => Orientation::Portrait,
            "portraitupsidedown" | "upsidedown" => Orientation::PortraitUpsideDown,
            "landscapeleft" => Orientation::LandscapeLeft,
            "landscaperight" => Orientation::LandscapeRight,
            _ => Orientation::Unknown,
        }
    }
}

/// Map a device gravity reading into scene gravity.
///
/// Upside-down portrait clamps y to be non-positive so lizards never fall
/// toward the top of the screen.
#[inline]
pub fn transform(device: Vec2, orientation: Orientation, gain: f32) -> Vec2 {
    let g = device * gain;
    match orientation {
        Orientation::Portrait | Orientation::Unknown => g,
        Orientation::LandscapeLeft => Vec2::new(g.y, -g.x),
        Orientation::LandscapeRight => Vec2::new(-g.y, g.x),
        Orientation::PortraitUpsideDown => Vec2::new(-g.x, (-g.y).min(0.0)),
    }
}

/// `transform` with a fixed gain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityMapper {
    pub gain: f32,
}

impl Default for GravityMapper {
    fn default() -> Self {
        Self { gain: GRAVITY_GAIN }
    }
}

impl GravityMapper {
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }

    pub fn map(&self, device: Vec2, orientation: Orientation) -> Vec2 {
        transform(device, orientation, self.gain)
    }

    /// Straight down at full gain, used when tilt is off
    pub fn resting(&self) -> Vec2 {
        Vec2::new(0.0, -self.gain)
    }
}
