//! Tunable knobs and performance presets
//!
//! Stored as JSON by the host; this crate only parses and serializes it.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::PoolConfig;

/// Performance preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PerformancePreset {
    Low,
    #[default]
    Medium,
    High,
}

impl PerformancePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformancePreset::Low => "Low",
            PerformancePreset::Medium => "Medium",
            PerformancePreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(PerformancePreset::Low),
            "medium" | "med" => Some(PerformancePreset::Medium),
            "high" => Some(PerformancePreset::High),
            _ => None,
        }
    }

    /// Live lizard cap for this preset
    pub fn max_lizards(&self) -> usize {
        match self {
            PerformancePreset::Low => 100,
            PerformancePreset::Medium => DEFAULT_MAX_LIZARDS,
            PerformancePreset::High => MAX_MAX_LIZARDS,
        }
    }

    /// Whether tilt steering is on by default
    pub fn tilt_enabled(&self) -> bool {
        match self {
            PerformancePreset::Low => false,
            PerformancePreset::Medium => true,
            PerformancePreset::High => true,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preset: PerformancePreset,

    // === Pool ===
    /// Live lizard cap (clamped to 50..=500 when used)
    pub max_physics_lizards: usize,
    /// Seconds before a lizard fades out
    pub lizard_lifetime_secs: f32,
    /// Sprite edge in scene points
    pub base_lizard_size: f32,

    // === Performance ===
    pub low_fps_threshold: f32,
    pub max_consecutive_low_fps: u32,
    /// Slow-frame streak past which rain holds off
    pub rain_throttle_streak: u32,
    /// EMA factor for the FPS signal
    pub fps_smoothing: f32,

    // === Tilt ===
    pub tilt_enabled: bool,
    /// Normalized gravity to scene acceleration
    pub gravity_gain: f32,
    /// Motion poll interval the host should use (seconds)
    pub motion_interval_secs: f32,
    /// EMA factor for tilt samples (None = raw)
    pub motion_smoothing: Option<f32>,

    // === Spawning ===
    pub rain_enabled: bool,
    pub rain_interval_secs: f32,
    /// Spawn cadence while a press is held
    pub hold_interval_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: PerformancePreset::Medium,

            max_physics_lizards: DEFAULT_MAX_LIZARDS,
            lizard_lifetime_secs: DEFAULT_LIFETIME,
            base_lizard_size: BASE_LIZARD_SIZE,

            low_fps_threshold: LOW_FPS_THRESHOLD,
            max_consecutive_low_fps: MAX_CONSECUTIVE_LOW_FPS,
            rain_throttle_streak: MAX_CONSECUTIVE_LOW_FPS / 2,
            fps_smoothing: FPS_SMOOTHING,

            tilt_enabled: true,
            gravity_gain: GRAVITY_GAIN,
            motion_interval_secs: MOTION_INTERVAL,
            motion_smoothing: Some(MOTION_SMOOTHING),

            rain_enabled: false,
            rain_interval_secs: 0.12,
            hold_interval_secs: 0.08,
        }
    }
}

impl Settings {
    /// Create settings from a preset (applies preset defaults)
    pub fn from_preset(preset: PerformancePreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a preset (updates preset-dependent settings)
    pub fn apply_preset(&mut self, preset: PerformancePreset) {
        self.preset = preset;
        self.max_physics_lizards = preset.max_lizards();
        self.tilt_enabled = preset.tilt_enabled();
    }

    /// Cap actually used by the pool
    pub fn effective_max_lizards(&self) -> usize {
        self.max_physics_lizards.clamp(MIN_MAX_LIZARDS, MAX_MAX_LIZARDS)
    }

    /// Pool configuration derived from these settings
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_lizards: self.effective_max_lizards(),
            lifetime: self.lizard_lifetime_secs,
            low_fps_threshold: self.low_fps_threshold,
            max_consecutive_low_fps: self.max_consecutive_low_fps,
            rain_throttle_streak: self.rain_throttle_streak,
            rain_base_size: self.base_lizard_size,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse stored settings, falling back to defaults on bad input
    pub fn load_or_default(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings ({} preset)", settings.preset.as_str());
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring malformed settings: {}", e);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
