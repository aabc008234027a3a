//! Cave Roller - A cellular-automata cave with a ball to kick around
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, cave generation, collisions, ball physics)
//! - `settings`: Live tunables the UI edits between frames
//! - `error`: Precondition failures at the construction boundary
//!
//! Rendering, audio and UI layout live outside this crate. They drive
//! [`sim::tick`] once per frame and read grid/body state back for drawing.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::{PcgParams, PhysicsParams, Tunables};

use glam::Vec3;

/// Engine configuration constants
pub mod consts {
    use glam::Vec3;

    /// Elevation marking a solid wall cell
    pub const WALL_ELEVATION: f32 = 100.0;
    /// Elevation marking an open floor cell
    pub const FLOOR_ELEVATION: f32 = -1.0;

    /// Collectibles placed per generated cave
    pub const COLLECTIBLE_COUNT: usize = 10;
    /// Pickup tolerance on x and z around a collectible
    pub const COLLECTIBLE_LEEWAY: f32 = 2.0;
    /// How far past the grid edge a collected pickup is parked
    pub const COLLECTIBLE_TOMBSTONE_OFFSET: f32 = 10.0;

    /// UV tiling across the grid
    pub const TEXTURE_REPEAT: f32 = 5.0;

    /// Gravitational acceleration before the gravity tunable scales it
    pub const GRAVITY: f32 = 9.8;
    /// Friction coefficient while airborne
    pub const AIR_FRICTION: f32 = 0.02;
    /// Friction coefficient against floor and walls
    pub const FLOOR_FRICTION: f32 = 0.5;
    /// Ball bottom may sink this far below the floor before it counts as contact
    pub const FLOOR_CLEARANCE: f32 = 0.6;

    /// Radius of every spawned ball
    pub const BALL_RADIUS: f32 = 0.5;
    /// Initial velocity of a freshly spawned ball
    pub const BALL_SPAWN_VELOCITY: Vec3 = Vec3::new(1.0, 0.0, 1.0);
    /// Where the startup ball appears
    pub const BALL_START: Vec3 = Vec3::new(10.0, 1.0, 10.0);
    /// Horizontal reach of the player's kick
    pub const KICK_RANGE: f32 = 5.0;
    /// Upward lift added to the kick direction
    pub const KICK_LIFT: f32 = 0.5;
    /// Spawn offset along the player's forward vector
    pub const SPAWN_REACH: Vec3 = Vec3::new(3.0, 0.0, 3.0);

    /// Player defaults
    pub const PLAYER_START: Vec3 = Vec3::new(20.0, 0.0, 20.0);
    /// Units per second
    pub const PLAYER_MOVE_SPEED: f32 = 10.0;
    /// Radians per second
    pub const PLAYER_ROTATION_SPEED: f32 = 3.0;

    /// Default square grid edge
    pub const DEFAULT_GRID_SIZE: usize = 128;
    /// Default frame step for headless runs (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
}

/// Map a world position onto (col, row) grid coordinates.
///
/// Columns come from x and rows from z, both truncated toward zero. Negative
/// or non-finite coordinates have no cell.
#[inline]
pub fn world_to_cell(pos: Vec3) -> Option<(usize, usize)> {
    if !(pos.x >= 0.0 && pos.z >= 0.0) || !pos.x.is_finite() || !pos.z.is_finite() {
        return None;
    }
    Some((pos.x as usize, pos.z as usize))
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Drop the vertical component of a vector
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
