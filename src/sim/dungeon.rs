//! Cave generation with cellular automata
//!
//! 1. Seed every interior cell as floor with probability `seed_probability`
//! 2. Force the player's cell open
//! 3. Run `iterations` smoothing passes that open any cell with enough open
//!    neighbours
//! 4. Drop collectibles on random open cells
//!
//! Smoothing updates the grid in place in row-major order, so cells later in
//! a pass see neighbours already opened earlier in the same pass. The output
//! depends on that order.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{Collectible, HeightGrid};
use crate::consts::*;
use crate::settings::PcgParams;

/// Summary of one generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Open cells after smoothing
    pub floor_cells: usize,
    pub collectibles_placed: usize,
    /// Whether the start cell was forced open
    pub start_forced: bool,
}

/// Cellular-automata cave generator
#[derive(Debug, Clone, Copy, Default)]
pub struct DungeonGenerator {
    pub params: PcgParams,
}

impl DungeonGenerator {
    pub fn new(params: PcgParams) -> Self {
        Self { params }
    }

    /// Rewrite every elevation in `grid` and rebuild its collectibles.
    ///
    /// Normals are left stale; call [`HeightGrid::recompute_normals`] after.
    pub fn generate<R: Rng>(&self, grid: &mut HeightGrid, start: Vec3, rng: &mut R) -> GenerationReport {
        let PcgParams {
            seed_probability,
            iterations,
            threshold,
        } = self.params;

        seed_cells(grid, seed_probability, rng);
        let start_forced = force_start(grid, start);

        for _ in 0..iterations {
            smooth_pass(grid, threshold);
        }

        let collectibles_placed = place_collectibles(grid, rng);
        let report = GenerationReport {
            floor_cells: grid.traversable_count(),
            collectibles_placed,
            start_forced,
        };

        log::info!(
            "Generated {}x{} cave (seed {:.2}, {} passes, threshold {}): {} open cells, {} collectibles",
            grid.width(),
            grid.height(),
            seed_probability,
            iterations,
            threshold,
            report.floor_cells,
            report.collectibles_placed
        );
        report
    }
}

/// Border cells become walls; interior cells roll against `seed_probability`
pub fn seed_cells<R: Rng>(grid: &mut HeightGrid, seed_probability: f32, rng: &mut R) {
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let elevation = if grid.is_border(col, row) {
                WALL_ELEVATION
            } else {
                let roll: f32 = rng.random();
                if seed_probability > 0.0 && roll <= seed_probability {
                    FLOOR_ELEVATION
                } else {
                    WALL_ELEVATION
                }
            };
            grid.set_elevation(col, row, elevation);
        }
    }
}

/// Open the cell under `start`. Off-grid and border starts are left alone.
pub fn force_start(grid: &mut HeightGrid, start: Vec3) -> bool {
    match grid.cell_coords_of(start) {
        Some((col, row)) if !grid.is_border(col, row) => {
            grid.set_elevation(col, row, FLOOR_ELEVATION);
            true
        }
        Some(_) => {
            log::warn!("Start {:?} lies on the border wall, not opening it", start);
            false
        }
        None => {
            log::warn!("Start {:?} is outside the grid, not opening it", start);
            false
        }
    }
}

/// Open neighbours of an interior cell.
///
/// The ring is narrowed next to the border: the row above is skipped on row
/// 1, the row below on the second-to-last row, and likewise for the columns.
pub fn count_open_neighbours(grid: &HeightGrid, col: usize, row: usize) -> u32 {
    let (w, h) = (grid.width(), grid.height());
    let has_left = col > 1;
    let has_right = col < w - 2;
    let open = |c: usize, r: usize| grid.is_traversable(c, r) as u32;

    let mut count = 0;
    if row > 1 {
        if has_left {
            count += open(col - 1, row - 1);
        }
        if has_right {
            count += open(col + 1, row - 1);
        }
        count += open(col, row - 1);
    }
    if row < h - 2 {
        if has_left {
            count += open(col - 1, row + 1);
        }
        if has_right {
            count += open(col + 1, row + 1);
        }
        count += open(col, row + 1);
    }
    if has_left {
        count += open(col - 1, row);
    }
    if has_right {
        count += open(col + 1, row);
    }
    count
}

/// One in-place smoothing pass over the interior
pub fn smooth_pass(grid: &mut HeightGrid, threshold: u32) {
    for row in 1..grid.height() - 1 {
        for col in 1..grid.width() - 1 {
            if count_open_neighbours(grid, col, row) >= threshold {
                grid.set_elevation(col, row, FLOOR_ELEVATION);
            }
        }
    }
}

/// Drop `COLLECTIBLE_COUNT` pickups on random open cells.
///
/// Two pickups may share a cell. A cave without a single open cell gets none.
pub fn place_collectibles<R: Rng>(grid: &mut HeightGrid, rng: &mut R) -> usize {
    if grid.traversable_count() == 0 {
        log::warn!("No open cells, skipping collectibles");
        grid.set_collectibles(Vec::new());
        return 0;
    }

    let mut placed = Vec::with_capacity(COLLECTIBLE_COUNT);
    while placed.len() < COLLECTIBLE_COUNT {
        let index = rng.random_range(0..grid.len());
        let cell = &grid.cells()[index];
        if cell.is_traversable() {
            placed.push(Collectible::new(cell.position()));
        }
    }

    let count = placed.len();
    grid.set_collectibles(placed);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn params(seed_probability: f32, iterations: u32, threshold: u32) -> PcgParams {
        PcgParams {
            seed_probability,
            iterations,
            threshold,
        }
    }

    #[test]
    fn test_zero_seed_probability_leaves_only_start_open() {
        let mut grid = HeightGrid::new(5, 5).unwrap();
        let mut rng = Pcg32::seed_from_u64(1);
        let report = DungeonGenerator::new(params(0.0, 0, 5)).generate(
            &mut grid,
            Vec3::new(2.0, 0.0, 3.0),
            &mut rng,
        );

        assert!(report.start_forced);
        assert_eq!(report.floor_cells, 1);
        for row in 0..5 {
            for col in 0..5 {
                if (col, row) == (2, 3) {
                    assert!(grid.is_floor(col, row));
                } else {
                    assert!(grid.is_wall(col, row), "({col},{row}) should be wall");
                }
            }
        }
        // Every collectible lands on the one open cell
        assert_eq!(grid.collectibles().len(), COLLECTIBLE_COUNT);
        assert!(
            grid.collectibles()
                .iter()
                .all(|c| c.pos == Vec3::new(2.0, FLOOR_ELEVATION, 3.0))
        );
    }

    #[test]
    fn test_full_seed_probability_opens_interior() {
        let mut grid = HeightGrid::new(5, 5).unwrap();
        let mut rng = Pcg32::seed_from_u64(2);
        DungeonGenerator::new(params(1.0, 0, 5)).generate(&mut grid, Vec3::new(2.0, 0.0, 2.0), &mut rng);

        for row in 0..5 {
            for col in 0..5 {
                assert_eq!(grid.is_wall(col, row), grid.is_border(col, row));
                assert_eq!(grid.is_floor(col, row), !grid.is_border(col, row));
            }
        }
    }

    #[test]
    fn test_smoothing_sees_cells_opened_earlier_in_the_pass() {
        let mut grid = HeightGrid::new(5, 5).unwrap();
        let mut rng = Pcg32::seed_from_u64(3);
        seed_cells(&mut grid, 0.0, &mut rng);
        grid.set_elevation(1, 1, FLOOR_ELEVATION);

        smooth_pass(&mut grid, 1);

        // (3,1) only touches (2,1), which was a wall before the pass started
        assert!(grid.is_floor(2, 1));
        assert!(grid.is_floor(3, 1));
        for row in 1..4 {
            for col in 1..4 {
                assert!(grid.is_floor(col, row), "({col},{row})");
            }
        }
    }

    #[test]
    fn test_neighbour_ring_skips_border() {
        let mut grid = HeightGrid::new(6, 6).unwrap();
        grid.flatten_to_dungeon();
        // Open the border around (1,1); it must not be counted
        grid.set_elevation(0, 0, FLOOR_ELEVATION);
        grid.set_elevation(1, 0, FLOOR_ELEVATION);
        grid.set_elevation(0, 1, FLOOR_ELEVATION);
        grid.set_elevation(2, 0, FLOOR_ELEVATION);
        assert_eq!(count_open_neighbours(&grid, 1, 1), 3);
        // A fully interior cell sees all eight
        assert_eq!(count_open_neighbours(&grid, 2, 2), 8);
        // Second-to-last row and column skip the far side
        assert_eq!(count_open_neighbours(&grid, 4, 4), 3);
    }

    #[test]
    fn test_threshold_never_closes_cells() {
        let mut grid = HeightGrid::new(8, 8).unwrap();
        grid.flatten_to_dungeon();
        smooth_pass(&mut grid, 8);
        assert_eq!(grid.traversable_count(), 36);
    }

    #[test]
    fn test_off_grid_start_is_ignored() {
        let mut grid = HeightGrid::new(6, 6).unwrap();
        assert!(!force_start(&mut grid, Vec3::new(40.0, 0.0, 2.0)));
        assert!(!force_start(&mut grid, Vec3::new(0.0, 0.0, 2.0)));
        assert!(force_start(&mut grid, Vec3::new(2.5, 0.0, 2.5)));
    }

    #[test]
    fn test_no_open_cells_places_nothing() {
        let mut grid = HeightGrid::new(6, 6).unwrap();
        let mut rng = Pcg32::seed_from_u64(4);
        let report = DungeonGenerator::new(params(0.0, 3, 0)).generate(
            &mut grid,
            Vec3::new(-5.0, 0.0, -5.0),
            &mut rng,
        );
        // threshold 0 opens every interior cell even from an all-wall seed
        assert_eq!(report.floor_cells, 16);
        assert_eq!(report.collectibles_placed, COLLECTIBLE_COUNT);

        let mut grid = HeightGrid::new(6, 6).unwrap();
        let report = DungeonGenerator::new(params(0.0, 3, 8)).generate(
            &mut grid,
            Vec3::new(-5.0, 0.0, -5.0),
            &mut rng,
        );
        assert_eq!(report.floor_cells, 0);
        assert_eq!(report.collectibles_placed, 0);
        assert!(grid.collectibles().is_empty());
    }

    #[test]
    fn test_same_seed_same_cave() {
        let generator = DungeonGenerator::new(PcgParams::default());
        let start = Vec3::new(20.0, 0.0, 20.0);

        let mut a = HeightGrid::new(48, 48).unwrap();
        let mut b = HeightGrid::new(48, 48).unwrap();
        generator.generate(&mut a, start, &mut Pcg32::seed_from_u64(77));
        generator.generate(&mut b, start, &mut Pcg32::seed_from_u64(77));
        assert_eq!(a.cells(), b.cells());
        assert_eq!(a.collectibles(), b.collectibles());
    }

    proptest! {
        #[test]
        fn prop_generated_caves_hold_invariants(
            size in 5usize..40,
            seed_probability in 0.0f32..=1.0,
            iterations in 0u32..6,
            threshold in 0u32..=8,
            seed in any::<u64>(),
            sx in 0.0f32..1.0,
            sz in 0.0f32..1.0,
        ) {
            let mut grid = HeightGrid::new(size, size).unwrap();
            let mut rng = Pcg32::seed_from_u64(seed);
            // Keep the start strictly inside the border
            let span = (size - 2) as f32;
            let start = Vec3::new(1.0 + sx * span, 0.0, 1.0 + sz * span);
            let start = start.min(Vec3::splat(size as f32 - 1.5));

            let report = DungeonGenerator::new(params(seed_probability, iterations, threshold))
                .generate(&mut grid, start, &mut rng);

            for row in 0..size {
                for col in 0..size {
                    if grid.is_border(col, row) {
                        prop_assert!(grid.is_wall(col, row));
                    }
                }
            }

            let (col, row) = grid.cell_coords_of(start).unwrap();
            prop_assert!(grid.is_traversable(col, row));
            prop_assert!(report.start_forced);

            prop_assert_eq!(grid.collectibles().len(), COLLECTIBLE_COUNT);
            for c in grid.collectibles() {
                let (col, row) = grid.cell_coords_of(c.pos).unwrap();
                prop_assert!(grid.is_traversable(col, row));
            }
        }
    }
}
