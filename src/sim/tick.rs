//! Per-frame simulation tick
//!
//! The ball is integrated first, then the player moves against the walls and
//! the ball, picks up whatever is underfoot and optionally kicks. Elevations
//! are never modified by a tick, only collectibles are.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::body::PhysicsBody;
use super::collision::{ContactAxis, ball_blocks, floor_blocks, wall_blocks, wall_contact};
use super::grid::HeightGrid;
use super::state::World;
use crate::consts::*;
use crate::settings::{IntegrationMode, PhysicsParams, Tunables};

/// Player intent for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub forward: bool,
    pub back: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Kick the ball if it is within reach
    pub kick: bool,
}

/// What the ball touched this tick, recomputed from geometry every time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    Airborne,
    Wall(ContactAxis),
    Floor,
}

/// Events from one tick, for the caller's HUD and audio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub contact: Contact,
    /// Index of the collectible picked up, if any
    pub collected: Option<usize>,
    /// Player walked into the ball
    pub pushed: bool,
    pub kicked: bool,
}

/// Advance one body by `dt` against the grid.
///
/// Acceleration is rebuilt from gravity each call, so impulses queued since
/// the last call affect exactly one velocity update.
pub fn integrate(body: &mut PhysicsBody, grid: &HeightGrid, physics: &PhysicsParams, dt: f32) -> Contact {
    let gravity_accel = -(physics.gravity * GRAVITY) / body.mass;
    let mut next_acc = Vec3::new(0.0, gravity_accel, 0.0);
    let mut next_vel = match physics.integration {
        IntegrationMode::Legacy => body.velocity + body.acceleration,
        IntegrationMode::Scaled => body.velocity + body.acceleration * dt,
    };
    let mut next_pos = body.position + body.velocity * dt;

    let contact = if let Some(axis) = wall_contact(grid, body, next_pos) {
        Contact::Wall(axis)
    } else if floor_blocks(next_pos.y, body.radius) {
        Contact::Floor
    } else {
        Contact::Airborne
    };

    match contact {
        Contact::Wall(axis) => {
            let k = axis.index();
            next_vel[k] *= -physics.elasticity;

            // No friction along the wall normal
            let mut direction = (-body.velocity).normalize_or_zero();
            direction[k] = 0.0;
            let normal_force = next_acc[k] * body.mass;
            next_acc += body.friction(
                direction,
                physics.friction * FLOOR_FRICTION * normal_force,
                &mut next_vel,
            );

            next_pos[k] = body.position[k];
        }
        Contact::Floor => {
            let mut direction = -body.velocity;
            direction.y = 0.0;
            let direction = direction.normalize_or_zero();
            let normal_force = body.mass * physics.gravity * GRAVITY;
            next_acc += body.friction(
                direction,
                physics.friction * FLOOR_FRICTION * normal_force,
                &mut next_vel,
            );

            next_vel.y *= -physics.elasticity;
            next_pos.y = body.position.y;
        }
        Contact::Airborne => {
            let direction = (-body.velocity).normalize_or_zero();
            next_acc += body.friction(direction, physics.friction * AIR_FRICTION, &mut next_vel);
        }
    }

    body.position = next_pos;
    body.velocity = next_vel;
    body.acceleration = next_acc;
    contact
}

/// Advance the world by one frame
pub fn tick(world: &mut World, input: &TickInput, tunables: &Tunables, dt: f32) -> TickReport {
    let physics = &tunables.physics;
    world.time_ticks += 1;

    let (grid, bodies, player) = world.parts_mut();

    // Ball first, against the cave as it stood at the start of the frame
    let ball = bodies.active_mut();
    let contact = integrate(ball, grid, physics, dt);
    ball.roll(dt);

    // Turn
    if input.turn_left {
        player.turn(player.rotation_speed * dt);
    }
    if input.turn_right {
        player.turn(-player.rotation_speed * dt);
    }

    // Walk
    let forward = player.forward();
    let mut pushed = false;
    let mut collected = None;
    if input.forward || input.back {
        let previous = player.position;
        let mut candidate = previous;
        if input.forward {
            candidate += forward * player.move_speed * dt;
        }
        if input.back {
            candidate -= forward * player.move_speed * dt;
        }

        let candidate = wall_blocks(grid, candidate, previous);
        let bump = ball_blocks(candidate, previous, ball, forward, physics.push_strength);
        bump.apply_to(ball);
        pushed = bump.blocked();
        player.position = bump.position;

        collected = grid.collect_at(player.position);
    }

    // Kick
    let mut kicked = false;
    if input.kick {
        let reach = ball.horizontal_distance_to(player.position);
        if reach <= KICK_RANGE {
            ball.kick(forward, physics.kick_strength);
            kicked = true;
        } else {
            log::debug!("Kick out of range ({:.2} > {})", reach, KICK_RANGE);
        }
    }

    if let Some(index) = collected {
        world.collected += 1;
        log::info!("Collected #{} (total {})", index, world.collected);
    }

    TickReport {
        contact,
        collected,
        pushed,
        kicked,
    }
}
