//! World state
//!
//! Everything the simulation mutates lives here: the cave grid, the bodies,
//! the player and the RNG that feeds cave generation.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Bodies, BodyId, PhysicsBody};
use super::dungeon::{DungeonGenerator, GenerationReport, place_collectibles};
use super::grid::HeightGrid;
use super::terrain::TerrainShape;
use crate::consts::*;
use crate::error::Result;
use crate::settings::{PcgParams, Tunables};

/// The walking viewpoint the UI steers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    /// Heading around +y, radians. Zero faces +x.
    pub yaw: f32,
    pub move_speed: f32,
    pub rotation_speed: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            position: PLAYER_START,
            yaw: 0.0,
            move_speed: PLAYER_MOVE_SPEED,
            rotation_speed: PLAYER_ROTATION_SPEED,
        }
    }
}

impl Player {
    /// Unit heading on the horizontal plane
    #[inline]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    pub fn turn(&mut self, radians: f32) {
        self.yaw = crate::normalize_angle(self.yaw + radians);
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    /// Seed the RNG was created from
    pub seed: u64,
    grid: HeightGrid,
    bodies: Bodies,
    pub player: Player,
    /// Collectibles picked up since startup
    pub collected: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    rng: Pcg32,
}

impl World {
    /// Open dungeon with border walls, collectibles placed and the startup
    /// ball dropped at `BALL_START`.
    pub fn new(width: usize, height: usize, seed: u64, tunables: &Tunables) -> Result<Self> {
        tunables.validate()?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut grid = HeightGrid::new(width, height)?;
        grid.flatten_to_dungeon();
        place_collectibles(&mut grid, &mut rng);
        grid.recompute_normals();

        let ball = PhysicsBody::spawn(BALL_START, tunables.physics.spawn_mass)?;

        // Small grids start the player in the middle instead
        let mut player = Player::default();
        let inside = grid
            .cell_coords_of(player.position)
            .is_some_and(|(col, row)| !grid.is_border(col, row));
        if !inside {
            player.position = Vec3::new(width as f32 / 2.0, 0.0, height as f32 / 2.0);
        }
        log::info!("World {}x{} created with seed {}", width, height, seed);

        Ok(Self {
            seed,
            grid,
            bodies: Bodies::new(ball),
            player,
            collected: 0,
            time_ticks: 0,
            rng,
        })
    }

    /// Default-sized square world
    pub fn with_seed(seed: u64, tunables: &Tunables) -> Result<Self> {
        Self::new(DEFAULT_GRID_SIZE, DEFAULT_GRID_SIZE, seed, tunables)
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut HeightGrid {
        &mut self.grid
    }

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    /// The ball being simulated
    pub fn ball(&self) -> &PhysicsBody {
        self.bodies.active()
    }

    pub fn ball_mut(&mut self) -> &mut PhysicsBody {
        self.bodies.active_mut()
    }

    /// Split borrow for the tick
    pub(crate) fn parts_mut(&mut self) -> (&mut HeightGrid, &mut Bodies, &mut Player) {
        (&mut self.grid, &mut self.bodies, &mut self.player)
    }

    /// Rebuild the cave around the player. The ball keeps its state.
    pub fn regenerate(&mut self, params: &PcgParams) -> Result<GenerationReport> {
        params.validate()?;
        let start = self.player.position;
        let report = DungeonGenerator::new(*params).generate(&mut self.grid, start, &mut self.rng);
        self.grid.recompute_normals();
        Ok(report)
    }

    /// Sculpt the height field with one of the non-cave shapers
    pub fn reshape(&mut self, shape: TerrainShape) {
        shape.apply(&mut self.grid, &mut self.rng);
        self.grid.recompute_normals();
    }

    /// Replace the ball with a new one a short way ahead of the player
    pub fn spawn_ball(&mut self, mass: f32) -> Result<BodyId> {
        let at = self.player.position + self.player.forward() * SPAWN_REACH;
        self.bodies.spawn(at, mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_layout() {
        let world = World::new(32, 32, 5, &Tunables::default()).unwrap();
        assert_eq!(world.grid().width(), 32);
        assert!(world.grid().is_wall(0, 0));
        assert!(world.grid().is_floor(20, 20));
        assert_eq!(world.grid().collectibles().len(), COLLECTIBLE_COUNT);
        assert_eq!(world.ball().position, BALL_START);
        assert_eq!(world.ball().mass, 10.0);
        assert_eq!(world.collected, 0);
        assert!((world.grid().cell(5, 5).normal - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_new_world_rejects_bad_config() {
        let mut tunables = Tunables::default();
        tunables.physics.spawn_mass = -1.0;
        assert!(World::new(32, 32, 5, &tunables).is_err());
        assert!(World::new(2, 32, 5, &Tunables::default()).is_err());
    }

    #[test]
    fn test_regenerate_keeps_ball_and_opens_player_cell() {
        let mut world = World::new(48, 48, 11, &Tunables::default()).unwrap();
        world.ball_mut().velocity = Vec3::new(2.0, -1.0, 0.5);
        let before = world.ball().clone();

        let report = world.regenerate(&PcgParams::default()).unwrap();
        assert!(report.start_forced);
        assert_eq!(world.ball(), &before);
        assert!(world.grid().is_floor(20, 20));
        assert!(world.grid().cells().iter().all(|c| c.normal.is_finite()));
    }

    #[test]
    fn test_regenerate_rejects_bad_params() {
        let mut world = World::new(16, 16, 1, &Tunables::default()).unwrap();
        let bad = PcgParams {
            seed_probability: -0.1,
            iterations: 1,
            threshold: 4,
        };
        assert!(world.regenerate(&bad).is_err());
    }

    #[test]
    fn test_spawn_ball_ahead_of_player() {
        let mut world = World::new(32, 32, 3, &Tunables::default()).unwrap();
        world.spawn_ball(30.0).unwrap();
        assert_eq!(world.ball().position, Vec3::new(23.0, 0.0, 20.0));
        assert_eq!(world.ball().mass, 30.0);
        assert_eq!(world.bodies().len(), 1);
    }

    #[test]
    fn test_reshape_refreshes_normals() {
        let mut world = World::new(16, 16, 3, &Tunables::default()).unwrap();
        world.reshape(TerrainShape::Waves {
            amplitude: 2.0,
            wavelength: 1.0,
        });
        assert!(world.grid().cells().iter().any(|c| c.normal.y < 0.999));
    }

    #[test]
    fn test_small_world_centres_player() {
        let world = World::new(12, 12, 3, &Tunables::default()).unwrap();
        assert_eq!(world.player.position, Vec3::new(6.0, 0.0, 6.0));
    }

    #[test]
    fn test_player_turn_and_forward() {
        let mut player = Player::default();
        assert_eq!(player.forward(), Vec3::X);
        player.turn(std::f32::consts::FRAC_PI_2);
        assert!((player.forward() - Vec3::Z).length() < 1e-6);
    }
}
