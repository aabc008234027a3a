//! Deterministic simulation module
//!
//! All cave and ball logic lives here. This module must be pure and
//! deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (row-major cells, indexed bodies)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod dungeon;
pub mod grid;
pub mod state;
pub mod terrain;
pub mod tick;

pub use body::{Bodies, BodyId, PhysicsBody};
pub use collision::{
    BallBlock, ContactAxis, ball_blocks, collectible_hit, floor_blocks, is_wall_blocked, wall_blocks,
    wall_contact,
};
pub use dungeon::{DungeonGenerator, GenerationReport};
pub use grid::{Cell, Collectible, HeightGrid};
pub use state::{Player, World};
pub use terrain::TerrainShape;
pub use tick::{Contact, TickInput, TickReport, integrate, tick};
