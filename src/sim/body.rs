//! The dynamic ball and the collection that holds it
//!
//! Only one body is driven at a time, but bodies live in an indexed
//! collection so more can be added without reshaping the state.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};
use crate::horizontal;

/// A simulated ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Acceleration applied on the next tick (gravity plus pending impulses)
    pub acceleration: Vec3,
    pub orientation: Quat,
    pub radius: f32,
    pub mass: f32,
    /// Renderer model selector, ignored by physics
    pub model_id: u32,
}

impl PhysicsBody {
    /// A fresh ball at `position` with the default spawn velocity
    pub fn spawn(position: Vec3, mass: f32) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidMass(mass));
        }
        Ok(Self {
            position,
            velocity: BALL_SPAWN_VELOCITY,
            acceleration: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            radius: BALL_RADIUS,
            mass,
            model_id: 0,
        })
    }

    /// Acceleration change produced by `magnitude` along `direction` (F = m*a)
    #[inline]
    pub fn impulse(&self, direction: Vec3, magnitude: f32) -> Vec3 {
        direction * (magnitude / self.mass)
    }

    /// Queue an impulse for the next tick
    pub fn apply_impulse(&mut self, direction: Vec3, magnitude: f32) {
        self.acceleration += self.impulse(direction, magnitude);
    }

    /// Kick the ball along `forward`, lifted slightly off the ground
    pub fn kick(&mut self, forward: Vec3, strength: f32) {
        let lifted = Vec3::new(forward.x, forward.y + KICK_LIFT, forward.z);
        self.apply_impulse(lifted, strength);
        log::debug!("Kick {:?} strength {}", lifted, strength);
    }

    /// Friction deceleration along `direction`.
    ///
    /// Any axis where the deceleration would carry `velocity` through zero is
    /// zeroed in both the returned deceleration and `velocity`.
    pub fn friction(&self, direction: Vec3, force: f32, velocity: &mut Vec3) -> Vec3 {
        let mut decel = self.impulse(direction, force);
        let next = *velocity + decel;

        for axis in 0..3 {
            if next[axis] * velocity[axis] < 0.0 {
                decel[axis] = 0.0;
                velocity[axis] = 0.0;
            }
        }
        decel
    }

    /// Horizontal distance to a point, ignoring height
    #[inline]
    pub fn horizontal_distance_to(&self, point: Vec3) -> f32 {
        horizontal(self.position - point).length()
    }

    /// Spin the ball as if rolling along its horizontal velocity
    pub fn roll(&mut self, dt: f32) {
        let axis = Vec3::Y.cross(horizontal(self.velocity)).normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        let spin = Quat::from_axis_angle(axis, dt * self.velocity.length());
        self.orientation = (spin * self.orientation).normalize();
    }
}

/// Handle into [`Bodies`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub usize);

/// Every body in the world plus which one is being driven
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bodies {
    bodies: Vec<PhysicsBody>,
    active: usize,
}

impl Bodies {
    pub fn new(initial: PhysicsBody) -> Self {
        Self {
            bodies: vec![initial],
            active: 0,
        }
    }

    /// Replace the driven body with a new ball
    pub fn spawn(&mut self, position: Vec3, mass: f32) -> Result<BodyId> {
        let body = PhysicsBody::spawn(position, mass)?;
        self.bodies[self.active] = body;
        log::info!("Spawned ball at {:?} with mass {}", position, mass);
        Ok(BodyId(self.active))
    }

    #[inline]
    pub fn active_id(&self) -> BodyId {
        BodyId(self.active)
    }

    #[inline]
    pub fn active(&self) -> &PhysicsBody {
        &self.bodies[self.active]
    }

    #[inline]
    pub fn active_mut(&mut self) -> &mut PhysicsBody {
        &mut self.bodies[self.active]
    }

    pub fn get(&self, id: BodyId) -> Option<&PhysicsBody> {
        self.bodies.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &PhysicsBody)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
