//! Collision queries against the cave grid and the ball
//!
//! Everything here is a direct grid lookup, there is no broad phase. Queries
//! that have a side effect hand the effect back to the caller instead of
//! applying it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::body::PhysicsBody;
use super::grid::{Collectible, HeightGrid};
use crate::consts::*;

/// Horizontal axis a wall contact was detected on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactAxis {
    X,
    Z,
}

impl ContactAxis {
    /// Component index into a `Vec3`
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ContactAxis::X => 0,
            ContactAxis::Z => 2,
        }
    }
}

/// True if standing at `pos` is not allowed: off-grid, inside a wall, or
/// directly beside one (north, south, east or west).
pub fn is_wall_blocked(grid: &HeightGrid, pos: Vec3) -> bool {
    let Some((col, row)) = grid.cell_coords_of(pos) else {
        return true;
    };
    if grid.is_wall(col, row) {
        return true;
    }

    let neighbours = [
        (Some(col), row.checked_add(1)),
        (Some(col), row.checked_sub(1)),
        (col.checked_add(1), Some(row)),
        (col.checked_sub(1), Some(row)),
    ];
    neighbours.into_iter().any(|n| match n {
        (Some(c), Some(r)) if c < grid.width() && r < grid.height() => grid.is_wall(c, r),
        _ => true,
    })
}

/// Accept a move to `pos`, or fall back if the wall grid rejects it
#[inline]
pub fn wall_blocks(grid: &HeightGrid, pos: Vec3, fallback: Vec3) -> Vec3 {
    if is_wall_blocked(grid, pos) {
        fallback
    } else {
        pos
    }
}

/// True once the bottom of a ball of `radius` at height `y` reaches the floor
#[inline]
pub fn floor_blocks(y: f32, radius: f32) -> bool {
    y - radius <= FLOOR_ELEVATION - FLOOR_CLEARANCE
}

/// First horizontal axis on which the ball's edge would touch a wall at
/// `candidate`. X samples are checked before Z samples.
pub fn wall_contact(grid: &HeightGrid, body: &PhysicsBody, candidate: Vec3) -> Option<ContactAxis> {
    let r = body.radius;
    let samples = [
        (Vec3::new(candidate.x - r, candidate.y, candidate.z), ContactAxis::X),
        (Vec3::new(candidate.x + r, candidate.y, candidate.z), ContactAxis::X),
        (Vec3::new(candidate.x, candidate.y, candidate.z - r), ContactAxis::Z),
        (Vec3::new(candidate.x, candidate.y, candidate.z + r), ContactAxis::Z),
    ];
    samples
        .into_iter()
        .find(|(sample, _)| is_wall_blocked(grid, *sample))
        .map(|(_, axis)| axis)
}

/// Outcome of walking into the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallBlock {
    /// Where the mover ends up
    pub position: Vec3,
    /// Acceleration to add to the ball when the move was rejected
    pub impulse: Option<Vec3>,
}

impl BallBlock {
    #[inline]
    pub fn blocked(&self) -> bool {
        self.impulse.is_some()
    }

    /// Push the ball if the mover bumped into it
    pub fn apply_to(&self, body: &mut PhysicsBody) {
        if let Some(impulse) = self.impulse {
            body.acceleration += impulse;
        }
    }
}

/// Reject a move that lands within two radii of the ball on both x and z.
///
/// A rejected move also yields a push along the mover's `forward` direction.
pub fn ball_blocks(
    candidate: Vec3,
    fallback: Vec3,
    body: &PhysicsBody,
    forward: Vec3,
    push_strength: f32,
) -> BallBlock {
    let reach = body.radius * 2.0;
    let near_x = (candidate.x - body.position.x).abs() <= reach;
    let near_z = (candidate.z - body.position.z).abs() <= reach;

    if near_x && near_z {
        BallBlock {
            position: fallback,
            impulse: Some(body.impulse(forward, push_strength)),
        }
    } else {
        BallBlock {
            position: candidate,
            impulse: None,
        }
    }
}

/// Collect the first live pickup within leeway of `pos`.
///
/// The hit collectible is parked at `tombstone_x` and its index returned.
/// Pickups outside `[0, playable_width)` on x are already collected.
pub fn collectible_hit(
    pos: Vec3,
    collectibles: &mut [Collectible],
    playable_width: f32,
    tombstone_x: f32,
) -> Option<usize> {
    let index = collectibles.iter().position(|c| {
        !c.is_tombstoned(playable_width)
            && (pos.x - c.pos.x).abs() <= COLLECTIBLE_LEEWAY
            && (pos.z - c.pos.z).abs() <= COLLECTIBLE_LEEWAY
    })?;
    collectibles[index].pos.x = tombstone_x;
    Some(index)
}
