//! Lizard Drop - tap-to-spawn falling lizards
//!
//! Core modules:
//! - `sim`: Deterministic simulation (particle pool, gravity mapping, physics adapter)
//! - `playground`: Wires taps, holds, rain and tilt into the simulation
//! - `settings`: Tunable knobs and performance presets

pub mod playground;
pub mod settings;
pub mod sim;

pub use playground::Playground;
pub use settings::{PerformancePreset, Settings};

/// Simulation constants
pub mod consts {
    /// Body mass shared by every lizard
    pub const LIZARD_MASS: f32 = 0.08;
    /// Bounciness shared by every lizard
    pub const LIZARD_RESTITUTION: f32 = 0.25;
    /// Surface friction shared by every lizard
    pub const LIZARD_FRICTION: f32 = 0.8;
    /// Linear damping shared by every lizard
    pub const LIZARD_LINEAR_DAMPING: f32 = 0.1;
    /// Collision circle as a fraction of the sprite edge
    pub const COLLISION_RADIUS_FACTOR: f32 = 0.45;

    /// Seconds a lizard lives before it starts fading
    pub const DEFAULT_LIFETIME: f32 = 10.0;
    /// Seconds spent fading out before removal
    pub const FADE_DURATION: f32 = 0.25;

    /// Default live lizard cap
    pub const DEFAULT_MAX_LIZARDS: usize = 300;
    /// Lower bound for the user-facing cap
    pub const MIN_MAX_LIZARDS: usize = 50;
    /// Upper bound for the user-facing cap
    pub const MAX_MAX_LIZARDS: usize = 500;
    /// Rain stops this many slots short of the cap
    pub const RAIN_HEADROOM: usize = 10;

    /// Frame rate below which a frame counts as slow
    pub const LOW_FPS_THRESHOLD: f32 = 45.0;
    /// Slow frames tolerated in a row before bulk eviction
    pub const MAX_CONSECUTIVE_LOW_FPS: u32 = 10;
    /// Bulk eviction never removes more than this per pass
    pub const MAX_LOW_FPS_EVICTIONS: usize = 10;

    /// Scene points per physics meter
    pub const POINTS_PER_METER: f32 = 150.0;

    /// Normalized device gravity to scene acceleration
    pub const GRAVITY_GAIN: f32 = 9.8;
    /// Default motion poll interval (seconds)
    pub const MOTION_INTERVAL: f32 = 1.0 / 60.0;
    /// Exponential smoothing factor for tilt samples
    pub const MOTION_SMOOTHING: f32 = 0.12;
    /// Exponential smoothing factor for the FPS signal
    pub const FPS_SMOOTHING: f32 = 0.15;

    /// Sprite edge in scene points
    pub const BASE_LIZARD_SIZE: f32 = 80.0;
}

/// Collision circle radius for a sprite of `base_size` drawn at `scale`
#[inline]
pub fn collision_radius(base_size: f32, scale: f32) -> f32 {
    base_size * consts::COLLISION_RADIUS_FACTOR * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_radius() {
        assert!((collision_radius(80.0, 1.0) - 36.0).abs() < 1e-5);
        assert!((collision_radius(80.0, 0.5) - 18.0).abs() < 1e-5);
    }
}
