//! Bounded pool of live lizards
//!
//! Owns lizard identities and decides when they leave: natural expiry,
//! FIFO eviction at capacity, and bulk eviction under sustained low FPS.
//! The physics world is passed into each call; the pool only writes into it.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Particle, ParticleId, ParticlePhase, PoolConfig, PoolEvent, RemovalReason};
use super::world::{BodyDesc, PhysicsWorld};
use crate::collision_radius;
use crate::consts::*;

/// Live lizards in spawn order (front = oldest)
#[derive(Debug)]
pub struct ParticlePool {
    config: PoolConfig,
    particles: VecDeque<Particle>,
    events: Vec<PoolEvent>,
    scene_size: Vec2,
    aging_paused: bool,
    low_fps_streak: u32,
    /// Seconds of simulated time seen by `tick`
    clock: f64,
    next_id: u64,
    rng: Pcg32,
}

impl ParticlePool {
    pub fn new(config: PoolConfig, seed: u64) -> Self {
        Self {
            particles: VecDeque::with_capacity(config.max_lizards),
            config,
            events: Vec::new(),
            scene_size: Vec2::ZERO,
            aging_paused: false,
            low_fps_streak: 0,
            clock: 0.0,
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Update the scene bounds spawns are positioned against
    pub fn set_scene_size(&mut self, size: Vec2) {
        self.scene_size = size;
    }

    pub fn scene_size(&self) -> Vec2 {
        self.scene_size
    }

    fn scene_known(&self) -> bool {
        self.scene_size.is_finite() && self.scene_size.x > 0.0 && self.scene_size.y > 0.0
    }

    /// Change the cap, evicting the oldest lizards if now over it
    pub fn set_max_lizards<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, max: usize) {
        self.config.max_lizards = max;
        while self.particles.len() > max {
            self.evict_oldest(world, RemovalReason::Capacity);
        }
    }

    /// Replace all tuning. Live lizards keep their age and pause state.
    pub fn reconfigure<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, config: PoolConfig) {
        let max = config.max_lizards;
        self.config = config;
        self.set_max_lizards(world, max);
    }

    /// Spawn a lizard, evicting the oldest one first if the pool is full.
    ///
    /// Returns `None` (and does nothing) while the scene size is unknown, for a
    /// non-positive scale, or when the cap is zero.
    pub fn spawn<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        at: Vec2,
        impulse: Vec2,
        scale: f32,
        base_size: f32,
    ) -> Option<ParticleId> {
        if !self.scene_known() || scale.is_nan() || scale <= 0.0 || self.config.max_lizards == 0 {
            return None;
        }

        while self.particles.len() >= self.config.max_lizards {
            self.evict_oldest(world, RemovalReason::Capacity);
        }

        let radius = collision_radius(base_size, scale);
        let body = world.create_body(&BodyDesc::lizard(at, radius, impulse));

        let id = ParticleId(self.next_id);
        self.next_id += 1;

        self.particles.push_back(Particle {
            id,
            body,
            position: at,
            impulse,
            scale,
            radius,
            spawned_at: self.clock,
            age: 0.0,
            aging_paused: self.aging_paused,
            phase: ParticlePhase::Alive,
        });
        self.events.push(PoolEvent::Spawned { id, position: at });

        Some(id)
    }

    /// Drop one slow lizard in from above the scene.
    ///
    /// Skipped when the pool is within `RAIN_HEADROOM` of the cap or the
    /// slow-frame streak is past the rain throttle.
    pub fn rain_step<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> Option<ParticleId> {
        if !self.scene_known() {
            return None;
        }
        if self.particles.len() + RAIN_HEADROOM > self.config.max_lizards {
            return None;
        }
        if self.low_fps_streak > self.config.rain_throttle_streak {
            return None;
        }

        let base_size = self.config.rain_base_size;
        let x = self.rng.random_range(0.0..=self.scene_size.x);
        let at = Vec2::new(x, self.scene_size.y + base_size * 0.5);
        let impulse = Vec2::new(self.rng.random_range(-0.05..=0.05), 0.0);
        let scale = self.rng.random_range(0.6..=1.0);

        self.spawn(world, at, impulse, scale, base_size)
    }

    /// Advance aging by `dt` seconds and react to the smoothed frame rate
    pub fn tick<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, dt: f32, current_fps: f32) {
        let dt = dt.max(0.0);
        self.clock += dt as f64;

        // Aging
        let lifetime = self.config.lifetime;
        let mut expired = 0;
        for particle in self.particles.iter_mut() {
            let done = particle.advance(dt, lifetime);
            if particle.is_fading() {
                world.set_body_opacity(particle.body, particle.opacity());
            }
            if done {
                expired += 1;
            }
        }
        if expired > 0 {
            let events = &mut self.events;
            self.particles.retain(|p| {
                let done = matches!(p.phase, ParticlePhase::Fading { elapsed } if elapsed >= FADE_DURATION);
                if done {
                    world.remove_body(p.body);
                    events.push(PoolEvent::Removed {
                        id: p.id,
                        reason: RemovalReason::Expired,
                    });
                }
                !done
            });
            log::debug!("{} lizards expired, {} live", expired, self.particles.len());
        }

        // Frame-rate backpressure
        if current_fps < self.config.low_fps_threshold {
            self.low_fps_streak += 1;
        } else {
            self.low_fps_streak = 0;
        }

        if self.low_fps_streak > self.config.max_consecutive_low_fps {
            let n = (self.particles.len() / 4).min(MAX_LOW_FPS_EVICTIONS);
            for _ in 0..n {
                self.evict_oldest(world, RemovalReason::LowFps);
            }
            if n > 0 {
                log::warn!(
                    "Sustained low FPS ({:.1}), evicted {} lizards, {} live",
                    current_fps,
                    n,
                    self.particles.len()
                );
            }
            self.low_fps_streak = 0;
        }
    }

    /// Freeze or resume the aging clock of every lizard, current and future
    pub fn set_aging_paused(&mut self, paused: bool) {
        self.aging_paused = paused;
        for particle in self.particles.iter_mut() {
            particle.aging_paused = paused;
        }
    }

    pub fn aging_paused(&self) -> bool {
        self.aging_paused
    }

    /// Remove every lizard at once. Emits no events.
    pub fn clear_all<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        if self.particles.is_empty() {
            return;
        }
        let n = self.particles.len();
        for particle in self.particles.drain(..) {
            world.remove_body(particle.body);
        }
        log::info!("Cleared {} lizards", n);
    }

    /// Remove a single lizard by id. Emits no events.
    pub fn remove<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, id: ParticleId) -> bool {
        match self.particles.iter().position(|p| p.id == id) {
            Some(index) => {
                if let Some(particle) = self.particles.remove(index) {
                    world.remove_body(particle.body);
                }
                true
            }
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Live lizards, oldest first
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    /// Consecutive ticks seen below the low-FPS threshold
    pub fn low_fps_streak(&self) -> u32 {
        self.low_fps_streak
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    fn evict_oldest<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, reason: RemovalReason) {
        if let Some(particle) = self.particles.pop_front() {
            world.remove_body(particle.body);
            self.events.push(PoolEvent::Removed {
                id: particle.id,
                reason,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::RecordingWorld;
    use proptest::prelude::*;

    const SCENE: Vec2 = Vec2::new(390.0, 844.0);

    fn pool_with_cap(max_lizards: usize) -> ParticlePool {
        let mut pool = ParticlePool::new(
            PoolConfig {
                max_lizards,
                ..Default::default()
            },
            42,
        );
        pool.set_scene_size(SCENE);
        pool
    }

    fn spawn_n(pool: &mut ParticlePool, world: &mut RecordingWorld, n: usize) -> Vec<ParticleId> {
        (0..n)
            .map(|i| {
                pool.spawn(world, Vec2::new(i as f32, 100.0), Vec2::new(0.0, 1.0), 1.0, 80.0)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_spawn_creates_body_and_event() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(10);

        let id = pool
            .spawn(&mut world, Vec2::new(50.0, 60.0), Vec2::new(1.0, 2.0), 0.5, 80.0)
            .unwrap();

        assert_eq!(pool.count(), 1);
        assert_eq!(world.created.len(), 1);
        let desc = world.created[0].1;
        assert_eq!(desc.position, Vec2::new(50.0, 60.0));
        assert_eq!(desc.impulse, Vec2::new(1.0, 2.0));
        assert!((desc.radius - 18.0).abs() < 1e-5);
        assert_eq!(desc.mass, LIZARD_MASS);
        assert_eq!(desc.restitution, LIZARD_RESTITUTION);
        assert_eq!(desc.friction, LIZARD_FRICTION);
        assert_eq!(desc.linear_damping, LIZARD_LINEAR_DAMPING);

        assert_eq!(
            pool.drain_events(),
            vec![PoolEvent::Spawned {
                id,
                position: Vec2::new(50.0, 60.0)
            }]
        );
        assert!(pool.drain_events().is_empty());
    }

    #[test]
    fn test_spawn_noop_without_scene() {
        let mut world = RecordingWorld::default();
        let mut pool = ParticlePool::new(PoolConfig::default(), 1);

        assert!(pool.spawn(&mut world, Vec2::ZERO, Vec2::ZERO, 1.0, 80.0).is_none());
        assert!(pool.rain_step(&mut world).is_none());
        assert_eq!(pool.count(), 0);
        assert!(world.created.is_empty());
        assert!(pool.drain_events().is_empty());
    }

    #[test]
    fn test_spawn_noop_with_non_finite_scene() {
        let mut world = RecordingWorld::default();
        let mut pool = ParticlePool::new(PoolConfig::default(), 1);

        for size in [
            Vec2::new(f32::INFINITY, 844.0),
            Vec2::new(390.0, f32::INFINITY),
            Vec2::new(f32::NAN, 844.0),
        ] {
            pool.set_scene_size(size);
            assert!(pool.rain_step(&mut world).is_none());
            assert!(pool.spawn(&mut world, Vec2::ZERO, Vec2::ZERO, 1.0, 80.0).is_none());
        }
        assert_eq!(pool.count(), 0);
        assert!(world.created.is_empty());
        assert!(pool.drain_events().is_empty());
    }

    #[test]
    fn test_spawn_rejects_non_positive_scale() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(10);
        assert!(pool.spawn(&mut world, Vec2::ZERO, Vec2::ZERO, 0.0, 80.0).is_none());
        assert!(pool.spawn(&mut world, Vec2::ZERO, Vec2::ZERO, f32::NAN, 80.0).is_none());
        assert_eq!(pool.count(), 0);
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(3);
        let ids = spawn_n(&mut pool, &mut world, 3);
        pool.drain_events();

        let newest = pool
            .spawn(&mut world, Vec2::ZERO, Vec2::ZERO, 1.0, 80.0)
            .unwrap();

        assert_eq!(pool.count(), 3);
        let live: Vec<_> = pool.particles().map(|p| p.id).collect();
        assert_eq!(live, vec![ids[1], ids[2], newest]);
        assert_eq!(world.removed, vec![world.created[0].0]);

        // Exactly one spawn event, even with an eviction
        let events = pool.drain_events();
        assert_eq!(
            events,
            vec![
                PoolEvent::Removed {
                    id: ids[0],
                    reason: RemovalReason::Capacity
                },
                PoolEvent::Spawned {
                    id: newest,
                    position: Vec2::ZERO
                },
            ]
        );
    }

    #[test]
    fn test_aging_expires_after_lifetime_and_fade() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(10);
        let ids = spawn_n(&mut pool, &mut world, 2);
        pool.drain_events();

        pool.tick(&mut world, 9.5, 60.0);
        assert_eq!(pool.count(), 2);
        pool.tick(&mut world, 0.5, 60.0);
        assert!(pool.particles().all(|p| p.is_fading()));
        assert_eq!(pool.count(), 2);

        pool.tick(&mut world, 0.125, 60.0);
        assert_eq!(pool.count(), 2);
        assert!(world.opacity.values().all(|o| (*o - 0.5).abs() < 1e-6));

        pool.tick(&mut world, 0.125, 60.0);
        assert_eq!(pool.count(), 0);
        assert_eq!(world.live(), 0);
        assert_eq!(
            pool.drain_events(),
            vec![
                PoolEvent::Removed {
                    id: ids[0],
                    reason: RemovalReason::Expired
                },
                PoolEvent::Removed {
                    id: ids[1],
                    reason: RemovalReason::Expired
                },
            ]
        );
    }

    #[test]
    fn test_zero_dt_tick_is_idempotent() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(10);
        spawn_n(&mut pool, &mut world, 5);
        pool.tick(&mut world, 3.0, 60.0);
        let before: Vec<_> = pool.particles().map(|p| (p.id, p.age, p.phase)).collect();

        for _ in 0..100 {
            pool.tick(&mut world, 0.0, 60.0);
        }

        let after: Vec<_> = pool.particles().map(|p| (p.id, p.age, p.phase)).collect();
        assert_eq!(before, after);
        assert_eq!(pool.count(), 5);
    }

    #[test]
    fn test_paused_aging_never_expires_and_resumes_in_place() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(10);
        spawn_n(&mut pool, &mut world, 3);

        pool.tick(&mut world, 4.0, 60.0);
        pool.set_aging_paused(true);
        for _ in 0..1000 {
            pool.tick(&mut world, 1.0, 60.0);
        }
        assert_eq!(pool.count(), 3);
        assert!(pool.particles().all(|p| p.age == 4.0));

        // Spawned while paused: inherits the pause
        let late = spawn_n(&mut pool, &mut world, 1)[0];
        assert!(pool.get(late).unwrap().aging_paused);

        pool.set_aging_paused(false);
        pool.tick(&mut world, 1.0, 60.0);
        assert!(pool.particles().take(3).all(|p| p.age == 5.0));
        assert_eq!(pool.get(late).unwrap().age, 1.0);
        assert_eq!(pool.count(), 4);
    }

    #[test]
    fn test_low_fps_bulk_eviction() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(100);
        let ids = spawn_n(&mut pool, &mut world, 20);

        // Threshold is 45, tolerance 10: ten slow ticks are tolerated
        for _ in 0..10 {
            pool.tick(&mut world, 0.0, 30.0);
        }
        assert_eq!(pool.count(), 20);
        assert_eq!(pool.low_fps_streak(), 10);

        pool.tick(&mut world, 0.0, 30.0);
        assert_eq!(pool.count(), 20 - 5);
        assert_eq!(pool.low_fps_streak(), 0);
        assert_eq!(pool.particles().next().unwrap().id, ids[5]);
    }

    #[test]
    fn test_pause_freezes_fade_in_progress() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(10);
        let id = spawn_n(&mut pool, &mut world, 1)[0];
        let body = pool.get(id).unwrap().body;

        pool.tick(&mut world, 10.0, 60.0);
        pool.tick(&mut world, 0.125, 60.0);
        assert!(pool.get(id).unwrap().is_fading());
        assert!((world.opacity[&body] - 0.5).abs() < 1e-6);

        pool.set_aging_paused(true);
        for _ in 0..100 {
            pool.tick(&mut world, 1.0, 60.0);
        }
        assert_eq!(pool.count(), 1);
        assert_eq!(pool.get(id).unwrap().phase, ParticlePhase::Fading { elapsed: 0.125 });
        assert!((world.opacity[&body] - 0.5).abs() < 1e-6);

        // Resumes with the remaining 0.125s of fade
        pool.set_aging_paused(false);
        pool.tick(&mut world, 0.0625, 60.0);
        assert_eq!(pool.count(), 1);
        pool.tick(&mut world, 0.0625, 60.0);
        assert_eq!(pool.count(), 0);
        assert_eq!(world.removed, vec![body]);
    }

    #[test]
    fn test_low_fps_with_near_empty_pool_evicts_nothing() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(100);
        spawn_n(&mut pool, &mut world, 3);
        pool.drain_events();

        for _ in 0..33 {
            pool.tick(&mut world, 0.0, 20.0);
        }
        assert_eq!(pool.count(), 3);
        assert!(world.removed.is_empty());
        assert!(pool.drain_events().is_empty());
        assert_eq!(pool.low_fps_streak(), 0);
    }

    #[test]
    fn test_low_fps_eviction_capped_at_ten() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(300);
        spawn_n(&mut pool, &mut world, 200);

        for _ in 0..11 {
            pool.tick(&mut world, 0.0, 20.0);
        }
        assert_eq!(pool.count(), 190);
    }

    #[test]
    fn test_good_frame_resets_streak() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(100);
        spawn_n(&mut pool, &mut world, 20);

        for _ in 0..10 {
            pool.tick(&mut world, 0.0, 30.0);
        }
        pool.tick(&mut world, 0.0, 60.0);
        assert_eq!(pool.low_fps_streak(), 0);
        pool.tick(&mut world, 0.0, 30.0);
        assert_eq!(pool.count(), 20);
    }

    #[test]
    fn test_rain_spawns_above_scene() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(100);

        let id = pool.rain_step(&mut world).unwrap();
        let p = pool.get(id).unwrap();
        assert!(p.position.x >= 0.0 && p.position.x <= SCENE.x);
        assert!(p.position.y > SCENE.y);
        assert!(p.scale >= 0.6 && p.scale <= 1.0);
        assert!(p.impulse.x.abs() <= 0.05);
    }

    #[test]
    fn test_rain_noop_near_full() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(50);
        spawn_n(&mut pool, &mut world, 41);
        pool.drain_events();

        assert!(pool.rain_step(&mut world).is_none());
        assert_eq!(pool.count(), 41);
        assert!(world.removed.is_empty());
        assert!(pool.drain_events().is_empty());

        // Exactly at cap - 10 still rains
        let mut pool = pool_with_cap(50);
        spawn_n(&mut pool, &mut world, 40);
        assert!(pool.rain_step(&mut world).is_some());
        assert_eq!(pool.count(), 41);
    }

    #[test]
    fn test_rain_noop_when_cap_below_headroom() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(5);

        assert!(pool.rain_step(&mut world).is_none());
        assert_eq!(pool.count(), 0);
        assert!(world.created.is_empty());

        // Direct spawns are unaffected
        assert!(pool.spawn(&mut world, Vec2::ZERO, Vec2::ZERO, 1.0, 80.0).is_some());
    }

    #[test]
    fn test_rain_throttled_by_low_fps_streak() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(100);

        for _ in 0..6 {
            pool.tick(&mut world, 0.0, 30.0);
        }
        assert!(pool.rain_step(&mut world).is_none());
        assert_eq!(pool.count(), 0);

        pool.tick(&mut world, 0.0, 60.0);
        assert!(pool.rain_step(&mut world).is_some());
    }

    #[test]
    fn test_clear_all_then_spawn_fresh() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(5);
        spawn_n(&mut pool, &mut world, 5);
        pool.drain_events();

        pool.clear_all(&mut world);
        assert_eq!(pool.count(), 0);
        assert_eq!(world.live(), 0);
        assert!(pool.drain_events().is_empty());

        pool.clear_all(&mut world);
        assert_eq!(pool.count(), 0);

        let ids = spawn_n(&mut pool, &mut world, 5);
        assert_eq!(pool.count(), 5);
        assert_eq!(world.removed.len(), 5, "no evictions after clear");
        assert_eq!(pool.drain_events().len(), ids.len());
    }

    #[test]
    fn test_remove_by_id() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(5);
        let ids = spawn_n(&mut pool, &mut world, 3);

        assert!(pool.remove(&mut world, ids[1]));
        assert!(!pool.remove(&mut world, ids[1]));
        assert_eq!(pool.count(), 2);
        assert_eq!(world.removed.len(), 1);
    }

    #[test]
    fn test_shrinking_cap_evicts_oldest() {
        let mut world = RecordingWorld::default();
        let mut pool = pool_with_cap(10);
        let ids = spawn_n(&mut pool, &mut world, 8);

        pool.set_max_lizards(&mut world, 5);
        assert_eq!(pool.count(), 5);
        assert_eq!(pool.particles().next().unwrap().id, ids[3]);
    }

    proptest! {
        #[test]
        fn prop_capacity_never_exceeded(
            cap in 1usize..40,
            ops in prop::collection::vec((0u8..4, 0.0f32..3.0, 10.0f32..90.0), 0..200),
        ) {
            let mut world = RecordingWorld::default();
            let mut pool = pool_with_cap(cap);

            for (op, dt, fps) in ops {
                match op {
                    0 | 1 => {
                        pool.spawn(&mut world, Vec2::new(10.0, 10.0), Vec2::ZERO, 1.0, 80.0);
                    }
                    2 => {
                        pool.rain_step(&mut world);
                    }
                    _ => pool.tick(&mut world, dt, fps),
                }
                prop_assert!(pool.count() <= cap);
                prop_assert_eq!(world.live(), pool.count());
            }
        }

        #[test]
        fn prop_full_spawn_evicts_earliest(cap in 1usize..30, extra in 1usize..30) {
            let mut world = RecordingWorld::default();
            let mut pool = pool_with_cap(cap);
            spawn_n(&mut pool, &mut world, cap);

            for _ in 0..extra {
                let oldest = pool
                    .particles()
                    .min_by(|a, b| a.spawned_at.total_cmp(&b.spawned_at).then(a.id.cmp(&b.id)))
                    .map(|p| p.id)
                    .unwrap();
                pool.drain_events();
                pool.tick(&mut world, 0.01, 60.0);
                pool.spawn(&mut world, Vec2::ZERO, Vec2::ZERO, 1.0, 80.0);

                prop_assert!(pool.get(oldest).is_none());
                prop_assert_eq!(pool.count(), cap);
            }
        }
    }
}
