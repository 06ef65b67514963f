//! Physics host adapter
//!
//! The pool only writes into the physics world (create/remove bodies, fade
//! them out). Gravity is set by the tilt pipeline. Stepping is owned by the
//! host; `SimpleWorld` is a small in-memory world for headless runs and tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Opaque handle to a body owned by a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// Everything needed to create a lizard body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub position: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    /// Applied once, right after creation
    pub impulse: Vec2,
}

impl BodyDesc {
    /// Circular lizard body with the shared material constants
    pub fn lizard(position: Vec2, radius: f32, impulse: Vec2) -> Self {
        Self {
            position,
            radius,
            mass: LIZARD_MASS,
            restitution: LIZARD_RESTITUTION,
            friction: LIZARD_FRICTION,
            linear_damping: LIZARD_LINEAR_DAMPING,
            impulse,
        }
    }
}

/// What the simulation needs from a physics/scene-graph host
pub trait PhysicsWorld {
    /// Create a circular body and apply its one-shot impulse
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle;

    /// Remove a body. Unknown handles are ignored.
    fn remove_body(&mut self, handle: BodyHandle);

    fn set_gravity(&mut self, gravity: Vec2);

    fn gravity(&self) -> Vec2;

    /// Visual opacity hook used while a lizard fades out
    fn set_body_opacity(&mut self, _handle: BodyHandle, _opacity: f32) {}
}

/// A body simulated by `SimpleWorld`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleBody {
    pub handle: BodyHandle,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub opacity: f32,
}

/// Minimal rigid-circle world: gravity, damping, floor and side walls.
///
/// Positions are scene points; gravity and impulses are in meters and
/// scaled by `POINTS_PER_METER`. Bodies do not collide with each other. The
/// top edge is open so rain can enter from above the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleWorld {
    pub size: Vec2,
    pub bodies: Vec<SimpleBody>,
    gravity: Vec2,
    next_handle: u64,
}

impl SimpleWorld {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            bodies: Vec::new(),
            gravity: Vec2::new(0.0, -GRAVITY_GAIN),
            next_handle: 1,
        }
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&SimpleBody> {
        self.bodies.iter().find(|b| b.handle == handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Integrate every body by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let gravity = self.gravity * POINTS_PER_METER;
        let size = self.size;

        for body in &mut self.bodies {
            body.vel += gravity * dt;
            // Box2D-style linear damping
            body.vel *= 1.0 / (1.0 + body.linear_damping * dt);
            body.pos += body.vel * dt;

            // Floor
            if body.pos.y - body.radius < 0.0 {
                body.pos.y = body.radius;
                if body.vel.y < 0.0 {
                    body.vel.y = -body.vel.y * body.restitution;
                }
                body.vel.x *= (1.0 - body.friction * dt * 10.0).max(0.0);
            }

            // Side walls
            if size.x > 0.0 {
                if body.pos.x - body.radius < 0.0 {
                    body.pos.x = body.radius;
                    if body.vel.x < 0.0 {
                        body.vel.x = -body.vel.x * body.restitution;
                    }
                } else if body.pos.x + body.radius > size.x {
                    body.pos.x = size.x - body.radius;
                    if body.vel.x > 0.0 {
                        body.vel.x = -body.vel.x * body.restitution;
                    }
                }
            }
        }
    }
}

impl PhysicsWorld for SimpleWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;

        let vel = if desc.mass > 0.0 {
            desc.impulse / desc.mass * POINTS_PER_METER
        } else {
            Vec2::ZERO
        };

        self.bodies.push(SimpleBody {
            handle,
            pos: desc.position,
            vel,
            radius: desc.radius,
            mass: desc.mass,
            restitution: desc.restitution,
            friction: desc.friction,
            linear_damping: desc.linear_damping,
            opacity: 1.0,
        });
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.retain(|b| b.handle != handle);
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn set_body_opacity(&mut self, handle: BodyHandle, opacity: f32) {
        if let Some(body) = self.bodies.iter_mut().find(|b| b.handle == handle) {
            body.opacity = opacity;
        }
    }
}

/// Test double that records every call the simulation makes
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingWorld {
    pub created: Vec<(BodyHandle, BodyDesc)>,
    pub removed: Vec<BodyHandle>,
    pub opacity: std::collections::HashMap<BodyHandle, f32>,
    pub gravity: Vec2,
    next_handle: u64,
}

#[cfg(test)]
impl RecordingWorld {
    pub fn live(&self) -> usize {
        self.created.len() - self.removed.len()
    }
}

#[cfg(test)]
impl PhysicsWorld for RecordingWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        self.next_handle += 1;
        let handle = BodyHandle(self.next_handle);
        self.created.push((handle, *desc));
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.removed.push(handle);
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn set_body_opacity(&mut self, handle: BodyHandle, opacity: f32) {
        self.opacity.insert(handle, opacity);
    }
}
