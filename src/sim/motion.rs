//! Upstream signals: tilt samples and frame rate
//!
//! Both are owned by the host. The pool and the gravity mapper only consume
//! the filtered values.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Raw device gravity, roughly 1g in magnitude
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GravitySample {
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
}

impl GravitySample {
    pub fn new(gx: f32, gy: f32, gz: f32) -> Self {
        Self { gx, gy, gz }
    }

    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.gx, self.gy, self.gz)
    }

    /// In-plane component used for scene gravity
    pub fn planar(&self) -> Vec2 {
        Vec2::new(self.gx, self.gy)
    }
}

/// Exponential smoothing of tilt samples. `alpha = None` passes samples through.
#[derive(Debug, Clone, Default)]
pub struct MotionFilter {
    alpha: Option<f32>,
    smoothed: Option<Vec3>,
}

impl MotionFilter {
    pub fn new(alpha: Option<f32>) -> Self {
        Self {
            alpha: alpha.map(|a| a.clamp(0.0, 1.0)),
            smoothed: None,
        }
    }

    /// Feed a raw sample and get the filtered one back.
    /// The first sample seeds the filter.
    pub fn push(&mut self, sample: GravitySample) -> GravitySample {
        let raw = sample.as_vec3();
        let out = match (self.alpha, self.smoothed) {
            (Some(alpha), Some(prev)) => prev + (raw - prev) * alpha,
            _ => raw,
        };
        self.smoothed = Some(out);
        GravitySample::new(out.x, out.y, out.z)
    }

    pub fn reset(&mut self) {
        self.smoothed = None;
    }
}

/// Exponential moving average of frames per second
#[derive(Debug, Clone)]
pub struct FrameRateMeter {
    alpha: f32,
    fps: f32,
}

impl FrameRateMeter {
    /// Starts optimistic at 60 FPS so a cold start never looks slow
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            fps: 60.0,
        }
    }

    /// Record a frame of `dt` seconds. Non-positive frames are ignored.
    pub fn record(&mut self, dt: f32) -> f32 {
        if dt > 0.0 {
            let instant = 1.0 / dt;
            self.fps += (instant - self.fps) * self.alpha;
        }
        self.fps
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        Self::new(crate::consts::FPS_SMOOTHING)
    }
}
