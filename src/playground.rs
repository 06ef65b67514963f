//! Input and timing glue around the simulation
//!
//! The UI layer drives a `Playground`: taps and holds spawn lizards, a rain
//! toggle drips them in from the top, tilt samples steer gravity, and one
//! `frame(dt)` call per rendered frame advances everything.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::settings::Settings;
use crate::sim::{
    FrameRateMeter, GravityMapper, GravitySample, MotionFilter, Orientation, ParticleId,
    ParticlePool, PhysicsWorld, PoolEvent,
};

/// Most catch-up spawns a single long frame can trigger per source
const MAX_CATCH_UP: u32 = 4;

/// An active press-and-hold
#[derive(Debug, Clone, Copy)]
struct Hold {
    point: Vec2,
    elapsed: f32,
}

pub struct Playground<W: PhysicsWorld> {
    settings: Settings,
    world: W,
    pool: ParticlePool,
    mapper: GravityMapper,
    motion: MotionFilter,
    frame_rate: FrameRateMeter,
    orientation: Orientation,
    rng: Pcg32,
    hold: Option<Hold>,
    rain_enabled: bool,
    rain_elapsed: f32,
    total_spawned: u64,
}

impl<W: PhysicsWorld> Playground<W> {
    pub fn new(mut world: W, settings: Settings, seed: u64) -> Self {
        let mapper = GravityMapper::new(settings.gravity_gain);
        world.set_gravity(mapper.resting());

        Self {
            pool: ParticlePool::new(settings.pool_config(), seed),
            motion: MotionFilter::new(settings.motion_smoothing),
            frame_rate: FrameRateMeter::new(settings.fps_smoothing),
            rain_enabled: settings.rain_enabled,
            orientation: Orientation::Portrait,
            rng: Pcg32::seed_from_u64(seed.wrapping_add(1)),
            hold: None,
            rain_elapsed: 0.0,
            total_spawned: 0,
            mapper,
            world,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swap in new settings, trimming the pool if the cap shrank
    pub fn apply_settings(&mut self, settings: Settings) {
        self.pool.reconfigure(&mut self.world, settings.pool_config());
        self.mapper = GravityMapper::new(settings.gravity_gain);
        self.motion = MotionFilter::new(settings.motion_smoothing);
        self.frame_rate = FrameRateMeter::new(settings.fps_smoothing);
        self.set_rain(settings.rain_enabled);
        self.settings = settings;
        if !self.settings.tilt_enabled {
            self.world.set_gravity(self.mapper.resting());
        }
    }

    pub fn set_scene_size(&mut self, size: Vec2) {
        self.pool.set_scene_size(size);
    }

    /// Spawn one lizard at a tap point with a small upward kick
    pub fn tap(&mut self, point: Vec2) -> Option<ParticleId> {
        let impulse = Vec2::new(
            self.rng.random_range(-0.1..=0.1),
            self.rng.random_range(0.05..=0.3),
        );
        let scale = self.rng.random_range(0.8..=1.2);
        let base_size = self.settings.base_lizard_size;
        self.pool.spawn(&mut self.world, point, impulse, scale, base_size)
    }

    /// Begin a press: spawns immediately, then keeps spawning while held
    pub fn press(&mut self, point: Vec2) -> Option<ParticleId> {
        self.hold = Some(Hold {
            point,
            elapsed: 0.0,
        });
        self.tap(point)
    }

    /// Move an active press
    pub fn drag(&mut self, point: Vec2) {
        if let Some(hold) = self.hold.as_mut() {
            hold.point = point;
        }
    }

    pub fn release(&mut self) {
        self.hold = None;
    }

    pub fn is_holding(&self) -> bool {
        self.hold.is_some()
    }

    pub fn set_rain(&mut self, enabled: bool) {
        if self.rain_enabled != enabled {
            log::info!("Rain {}", if enabled { "on" } else { "off" });
        }
        self.rain_enabled = enabled;
        self.rain_elapsed = 0.0;
    }

    pub fn rain_enabled(&self) -> bool {
        self.rain_enabled
    }

    /// Turn tilt steering on or off. Off restores straight-down gravity.
    pub fn set_tilt_enabled(&mut self, enabled: bool) {
        self.settings.tilt_enabled = enabled;
        if !enabled {
            self.motion.reset();
            self.world.set_gravity(self.mapper.resting());
        }
    }

    /// Feed one motion sample; returns the gravity now set on the world
    pub fn motion_update(&mut self, sample: GravitySample, orientation: Orientation) -> Vec2 {
        if !self.settings.tilt_enabled {
            return self.world.gravity();
        }
        if orientation != self.orientation {
            log::info!(
                "Orientation {} -> {}",
                self.orientation.as_str(),
                orientation.as_str()
            );
            self.orientation = orientation;
        }

        let filtered = self.motion.push(sample);
        let gravity = self.mapper.map(filtered.planar(), orientation);
        self.world.set_gravity(gravity);
        gravity
    }

    /// Advance one rendered frame of `dt` seconds. Returns the pool events
    /// produced since the previous frame.
    pub fn frame(&mut self, dt: f32) -> Vec<PoolEvent> {
        let fps = self.frame_rate.record(dt);

        if let Some(hold) = self.hold.as_mut() {
            hold.elapsed += dt;
            let interval = self.settings.hold_interval_secs;
            let mut spawns = Vec::new();
            if interval > 0.0 {
                while hold.elapsed >= interval && (spawns.len() as u32) < MAX_CATCH_UP {
                    hold.elapsed -= interval;
                    spawns.push(hold.point);
                }
                hold.elapsed = hold.elapsed.min(interval);
            }
            for point in spawns {
                self.tap(point);
            }
        }

        if self.rain_enabled {
            self.rain_elapsed += dt;
            let interval = self.settings.rain_interval_secs;
            let mut steps = 0;
            if interval > 0.0 {
                while self.rain_elapsed >= interval && steps < MAX_CATCH_UP {
                    self.rain_elapsed -= interval;
                    self.pool.rain_step(&mut self.world);
                    steps += 1;
                }
                self.rain_elapsed = self.rain_elapsed.min(interval);
            }
        }

        self.pool.tick(&mut self.world, dt, fps);

        let events = self.pool.drain_events();
        self.total_spawned += events
            .iter()
            .filter(|e| matches!(e, PoolEvent::Spawned { .. }))
            .count() as u64;
        events
    }

    pub fn set_aging_paused(&mut self, paused: bool) {
        self.pool.set_aging_paused(paused);
    }

    pub fn clear_all(&mut self) {
        self.pool.clear_all(&mut self.world);
    }

    pub fn count(&self) -> usize {
        self.pool.count()
    }

    /// Lizards spawned over the session (score feed)
    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    pub fn fps(&self) -> f32 {
        self.frame_rate.fps()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }
}
