//! Deterministic simulation module
//!
//! All lizard lifecycle and gravity logic lives here. This module must be pure
//! and deterministic:
//! - Time only advances through explicit `tick(dt, fps)` calls
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering or platform dependencies
//!
//! Single-threaded: the pool and the physics world it writes into are not
//! `Sync`-safe by contract. Hosts that share them across threads must wrap
//! them in their own mutex or single-writer queue.

pub mod gravity;
pub mod motion;
pub mod pool;
pub mod state;
pub mod world;

pub use gravity::{GravityMapper, Orientation, transform};
pub use motion::{FrameRateMeter, GravitySample, MotionFilter};
pub use pool::ParticlePool;
pub use state::{Particle, ParticleId, ParticlePhase, PoolConfig, PoolEvent, RemovalReason};
pub use world::{BodyDesc, BodyHandle, PhysicsWorld, SimpleWorld};
