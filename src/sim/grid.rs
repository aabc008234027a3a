//! Height grid: the cave floor plan and its collectibles
//!
//! Cells are stored row-major with rows along world z and columns along
//! world x. Elevation doubles as the floor/wall discriminator.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::collectible_hit;
use crate::consts::*;
use crate::error::{Error, Result};
use crate::world_to_cell;

/// One grid vertex, laid out for direct upload to a vertex buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Cell {
    /// World x (the column)
    pub x: f32,
    /// Height, also the wall/floor marker
    pub elevation: f32,
    /// World z (the row)
    pub z: f32,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Cell {
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.elevation, self.z)
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.elevation == WALL_ELEVATION
    }

    #[inline]
    pub fn is_floor(&self) -> bool {
        self.elevation == FLOOR_ELEVATION
    }

    /// Anything below zero can be walked on
    #[inline]
    pub fn is_traversable(&self) -> bool {
        self.elevation < 0.0
    }
}

/// A pickup, snapshotted from a floor cell when the cave was generated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec3,
}

impl Collectible {
    pub fn new(pos: Vec3) -> Self {
        Self { pos }
    }

    /// Collected pickups are parked past the far edge instead of removed
    #[inline]
    pub fn is_tombstoned(&self, playable_width: f32) -> bool {
        !(self.pos.x >= 0.0 && self.pos.x < playable_width)
    }
}

/// The cave grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    collectibles: Vec<Collectible>,
}

impl HeightGrid {
    /// Create a flat grid at elevation 0 with texture coordinates filled in.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width < 3 || height < 3 {
            return Err(Error::GridTooSmall { width, height });
        }

        let step = TEXTURE_REPEAT / width as f32;
        let mut cells = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                cells.push(Cell {
                    x: col as f32,
                    elevation: 0.0,
                    z: row as f32,
                    normal: Vec3::ZERO,
                    uv: Vec2::new(col as f32 * step, row as f32 * step),
                });
            }
        }

        Ok(Self {
            width,
            height,
            cells,
            collectibles: Vec::with_capacity(COLLECTIBLE_COUNT),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Storage index of (col, row). Callers keep both in range.
    #[inline]
    pub fn index(&self, col: usize, row: usize) -> usize {
        debug_assert!(col < self.width && row < self.height);
        row * self.width + col
    }

    /// (col, row) of a storage index
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Bounds-checked (col, row) for a world position
    pub fn cell_coords_of(&self, pos: Vec3) -> Option<(usize, usize)> {
        let (col, row) = world_to_cell(pos)?;
        (col < self.width && row < self.height).then_some((col, row))
    }

    /// Bounds-checked storage index for a world position
    pub fn cell_index_of(&self, pos: Vec3) -> Option<usize> {
        self.cell_coords_of(pos)
            .map(|(col, row)| self.index(col, row))
    }

    #[inline]
    pub fn is_border(&self, col: usize, row: usize) -> bool {
        col == 0 || row == 0 || col == self.width - 1 || row == self.height - 1
    }

    #[inline]
    pub fn cell(&self, col: usize, row: usize) -> &Cell {
        &self.cells[self.index(col, row)]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Raw bytes of the cell array for the renderer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }

    #[inline]
    pub fn elevation_at(&self, col: usize, row: usize) -> f32 {
        self.cell(col, row).elevation
    }

    #[inline]
    pub fn set_elevation(&mut self, col: usize, row: usize, elevation: f32) {
        let index = self.index(col, row);
        self.cells[index].elevation = elevation;
    }

    #[inline]
    pub fn is_wall(&self, col: usize, row: usize) -> bool {
        self.cell(col, row).is_wall()
    }

    #[inline]
    pub fn is_floor(&self, col: usize, row: usize) -> bool {
        self.cell(col, row).is_floor()
    }

    #[inline]
    pub fn is_traversable(&self, col: usize, row: usize) -> bool {
        self.cell(col, row).is_traversable()
    }

    /// Number of walkable cells
    pub fn traversable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_traversable()).count()
    }

    /// All collectibles, including collected ones parked off-grid
    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    /// Only the collectibles still waiting to be picked up
    pub fn active_collectibles(&self) -> impl Iterator<Item = &Collectible> {
        let width = self.width as f32;
        self.collectibles
            .iter()
            .filter(move |c| !c.is_tombstoned(width))
    }

    pub(crate) fn set_collectibles(&mut self, collectibles: Vec<Collectible>) {
        self.collectibles = collectibles;
    }

    /// X coordinate a collected pickup is parked at
    #[inline]
    pub fn tombstone_x(&self) -> f32 {
        self.width as f32 + COLLECTIBLE_TOMBSTONE_OFFSET
    }

    /// Pick up whatever collectible is under `pos`.
    ///
    /// Returns the index of the collectible that was tombstoned, if any.
    pub fn collect_at(&mut self, pos: Vec3) -> Option<usize> {
        let width = self.width as f32;
        let tombstone_x = self.tombstone_x();
        collectible_hit(pos, &mut self.collectibles, width, tombstone_x)
    }

    /// Walls on the border, open floor everywhere else
    pub fn flatten_to_dungeon(&mut self) {
        let (width, height) = (self.width, self.height);
        for (index, cell) in self.cells.iter_mut().enumerate() {
            let (col, row) = (index % width, index / width);
            let border = col == 0 || row == 0 || col == width - 1 || row == height - 1;
            cell.elevation = if border {
                WALL_ELEVATION
            } else {
                FLOOR_ELEVATION
            };
        }
    }

    /// Rebuild per-vertex normals from the current elevations.
    ///
    /// Each face is the triangle (col,row) (col+1,row) (col,row+1); a vertex
    /// averages the faces it touches. Zero-length sums yield a zero normal.
    pub fn recompute_normals(&mut self) {
        let (w, h) = (self.width, self.height);
        let face_cols = w - 1;

        let mut faces = Vec::with_capacity(face_cols * (h - 1));
        for row in 0..h - 1 {
            for col in 0..face_cols {
                let v1 = self.cells[self.index(col, row)].position();
                let v2 = self.cells[self.index(col + 1, row)].position();
                let v3 = self.cells[self.index(col, row + 1)].position();
                let e1 = v1 - v3;
                let e2 = v3 - v2;
                faces.push(e1.cross(e2));
            }
        }

        for row in 0..h {
            for col in 0..w {
                let mut sum = Vec3::ZERO;
                let mut count = 0u32;

                // Bottom left
                if col > 0 && row > 0 {
                    sum += faces[(row - 1) * face_cols + (col - 1)];
                    count += 1;
                }
                // Bottom right
                if col < w - 1 && row > 0 {
                    sum += faces[(row - 1) * face_cols + col];
                    count += 1;
                }
                // Upper left
                if col > 0 && row < h - 1 {
                    sum += faces[row * face_cols + (col - 1)];
                    count += 1;
                }
                // Upper right
                if col < w - 1 && row < h - 1 {
                    sum += faces[row * face_cols + col];
                    count += 1;
                }

                let normal = average_normal(sum, count);
                let index = self.index(col, row);
                self.cells[index].normal = normal;
            }
        }
    }
}

/// Mean of `count` accumulated face normals, unit length or zero
#[inline]
fn average_normal(sum: Vec3, count: u32) -> Vec3 {
    if count == 0 {
        return Vec3::ZERO;
    }
    (sum / count as f32).normalize_or_zero()
}
