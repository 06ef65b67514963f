//! Lizard particle state and pool configuration

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::BodyHandle;
use crate::consts::*;

/// Stable identity of a spawned lizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u64);

/// Where a lizard is in its life
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticlePhase {
    /// Aging toward its lifetime
    Alive,
    /// Lifetime reached, fading out (seconds into the fade)
    Fading { elapsed: f32 },
}

/// A single live lizard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    /// Physics body backing this lizard
    pub body: BodyHandle,
    /// Spawn point in scene coordinates
    pub position: Vec2,
    /// One-shot impulse applied at spawn
    pub impulse: Vec2,
    /// Visual and collision scale
    pub scale: f32,
    /// Collision circle radius
    pub radius: f32,
    /// Pool clock reading at spawn (seconds)
    pub spawned_at: f64,
    /// Seconds of aging accumulated while not paused
    pub age: f32,
    /// Aging frozen (physics still runs)
    pub aging_paused: bool,
    pub phase: ParticlePhase,
}

impl Particle {
    /// Advance the aging clock. Returns true once the fade has completed.
    pub fn advance(&mut self, dt: f32, lifetime: f32) -> bool {
        if self.aging_paused {
            return false;
        }
        match self.phase {
            ParticlePhase::Alive => {
                self.age += dt;
                if self.age >= lifetime {
                    self.phase = ParticlePhase::Fading { elapsed: 0.0 };
                }
                false
            }
            ParticlePhase::Fading { elapsed } => {
                let elapsed = elapsed + dt;
                self.phase = ParticlePhase::Fading { elapsed };
                elapsed >= FADE_DURATION
            }
        }
    }

    /// Opacity implied by the current phase (1.0 while alive)
    pub fn opacity(&self) -> f32 {
        match self.phase {
            ParticlePhase::Alive => 1.0,
            ParticlePhase::Fading { elapsed } => (1.0 - elapsed / FADE_DURATION).clamp(0.0, 1.0),
        }
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.phase, ParticlePhase::Fading { .. })
    }
}

/// Why a lizard left the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Lifetime and fade completed
    Expired,
    /// Oldest lizard pushed out by a spawn at capacity
    Capacity,
    /// Dropped by bulk eviction under sustained low frame rate
    LowFps,
}

/// Notifications for UI and score layers, pulled with `drain_events`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PoolEvent {
    Spawned { id: ParticleId, position: Vec2 },
    Removed { id: ParticleId, reason: RemovalReason },
}

/// Tuning for a `ParticlePool`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Hard cap on live lizards
    pub max_lizards: usize,
    /// Seconds before a lizard starts fading
    pub lifetime: f32,
    /// Frames below this FPS count as slow
    pub low_fps_threshold: f32,
    /// Slow frames tolerated in a row before bulk eviction
    pub max_consecutive_low_fps: u32,
    /// Rain pauses once the slow-frame streak exceeds this
    pub rain_throttle_streak: u32,
    /// Sprite edge used by rain spawns
    pub rain_base_size: f32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_lizards: DEFAULT_MAX_LIZARDS,
            lifetime: DEFAULT_LIFETIME,
            low_fps_threshold: LOW_FPS_THRESHOLD,
            max_consecutive_low_fps: MAX_CONSECUTIVE_LOW_FPS,
            rain_throttle_streak: MAX_CONSECUTIVE_LOW_FPS / 2,
            rain_base_size: BASE_LIZARD_SIZE,
        }
    }
}
