//! Height-field shapers
//!
//! Alternatives to the cave generator that sculpt elevation directly:
//! Perlin noise, jittered noise, sine waves, box smoothing and particle
//! deposition. None of them touch collectibles.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::HeightGrid;

/// A shaping operation the UI can trigger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TerrainShape {
    /// Border walls around an open floor
    FlatDungeon,
    /// Perlin noise scaled by `amplitude`
    Noise { amplitude: f32, seed: u32 },
    /// Uniform jitter modulated by Perlin noise
    Jitter { amplitude: f32, seed: u32 },
    /// Crossed sine waves; a wavelength of 1 spans the grid once
    Waves { amplitude: f32, wavelength: f32 },
    /// One 3x3 box-blur pass
    Smooth,
    /// Drop `count` particles of height `amplitude / 2` at random cells
    Deposit { count: u32, amplitude: f32 },
}

impl TerrainShape {
    pub fn apply<R: Rng>(&self, grid: &mut HeightGrid, rng: &mut R) {
        match *self {
            TerrainShape::FlatDungeon => grid.flatten_to_dungeon(),
            TerrainShape::Noise { amplitude, seed } => noise_heights(grid, amplitude, seed),
            TerrainShape::Jitter { amplitude, seed } => jitter_heights(grid, amplitude, seed, rng),
            TerrainShape::Waves {
                amplitude,
                wavelength,
            } => wave_heights(grid, amplitude, wavelength),
            TerrainShape::Smooth => smooth_heights(grid),
            TerrainShape::Deposit { count, amplitude } => {
                for _ in 0..count {
                    deposit_random_particle(grid, amplitude, rng);
                }
            }
        }
        log::debug!("Applied terrain shape {:?}", self);
    }
}

/// Perlin noise sampled over the unit square
pub fn noise_heights(grid: &mut HeightGrid, amplitude: f32, seed: u32) {
    let perlin = Perlin::new(seed);
    let (w, h) = (grid.width() as f64, grid.height() as f64);
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let n = perlin.get([col as f64 / w, 0.0, row as f64 / h]);
            grid.set_elevation(col, row, n as f32 * amplitude);
        }
    }
}

/// Random heights in `[-amplitude, amplitude)` attenuated by Perlin noise
pub fn jitter_heights<R: Rng>(grid: &mut HeightGrid, amplitude: f32, seed: u32, rng: &mut R) {
    let perlin = Perlin::new(seed);
    let (w, h) = (grid.width() as f64, grid.height() as f64);
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let jitter = (rng.random_range(0..200) as f32 - 100.0) / 100.0;
            let n = perlin.get([col as f64 / w, row as f64 / h, 0.0]) as f32;
            grid.set_elevation(col, row, jitter * amplitude * n);
        }
    }
}

/// `sin(col * f) * A + sin(row * f) * A` with `f = (2π / height) / wavelength`
pub fn wave_heights(grid: &mut HeightGrid, amplitude: f32, wavelength: f32) {
    let frequency = (std::f32::consts::TAU / grid.height() as f32) / wavelength;
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let y = (col as f32 * frequency).sin() * amplitude
                + (row as f32 * frequency).sin() * amplitude;
            grid.set_elevation(col, row, y);
        }
    }
}

/// Average every cell with its in-range 3x3 neighbourhood, in place
pub fn smooth_heights(grid: &mut HeightGrid) {
    let (w, h) = (grid.width(), grid.height());
    for row in 0..h {
        for col in 0..w {
            let mut sum = 0.0;
            let mut count = 0u32;
            for r in row.saturating_sub(1)..=(row + 1).min(h - 1) {
                for c in col.saturating_sub(1)..=(col + 1).min(w - 1) {
                    sum += grid.elevation_at(c, r);
                    count += 1;
                }
            }
            grid.set_elevation(col, row, sum / count as f32);
        }
    }
}

/// Roll a particle downhill from `index` and pile it where it settles.
///
/// Returns the index of the cell that was raised.
pub fn deposit_particle(grid: &mut HeightGrid, index: usize, particle_height: f32) -> usize {
    let (w, h) = (grid.width(), grid.height());
    let mut site = index;

    loop {
        let (col, row) = grid.coords(site);
        let start = site;

        // Scan order: row above, row below, then the same row
        let mut candidates: Vec<(usize, usize)> = Vec::with_capacity(8);
        if row > 0 {
            if col > 0 {
                candidates.push((col - 1, row - 1));
            }
            if col < w - 1 {
                candidates.push((col + 1, row - 1));
            }
            candidates.push((col, row - 1));
        }
        if row < h - 1 {
            if col > 0 {
                candidates.push((col - 1, row + 1));
            }
            if col < w - 1 {
                candidates.push((col + 1, row + 1));
            }
            candidates.push((col, row + 1));
        }
        if col > 0 {
            candidates.push((col - 1, row));
        }
        if col < w - 1 {
            candidates.push((col + 1, row));
        }

        for (c, r) in candidates {
            let here = grid.cells()[site].elevation;
            if grid.elevation_at(c, r) < here {
                site = grid.index(c, r);
            }
        }

        if site == start {
            break;
        }
    }

    let (col, row) = grid.coords(site);
    let raised = grid.elevation_at(col, row) + particle_height;
    grid.set_elevation(col, row, raised);
    site
}

/// Deposit one particle of height `amplitude / 2` at a random cell
pub fn deposit_random_particle<R: Rng>(grid: &mut HeightGrid, amplitude: f32, rng: &mut R) -> usize {
    let index = rng.random_range(0..grid.len());
    deposit_particle(grid, index, amplitude * 0.5)
}
