//! Fractal heightfield
//!
//! A `(width + 1) x (height + 1)` grid of heights generated with the
//! diamond-square algorithm. The smaller side must be a power of two and the
//! larger side a multiple of it, so the grid splits into square blocks that
//! subdivide evenly.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::rng::MinStd;
use crate::consts::{HEIGHT_SCALE, VERTEX_DIST};
use crate::error::SetupError;

/// Fractal roughness; jitter shrinks by 2^-ROUGHNESS per subdivision
pub const ROUGHNESS: f32 = 0.7;
/// Jitter amplitude before the first subdivision
pub const INITIAL_SCALE: f32 = 3.0;
/// Height given to every block corner before subdividing
pub const CORNER_SEED: f32 = 0.5;

/// Orthogonal neighbours, walked in order so consecutive pairs span a quadrant
const NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Grid of terrain heights with per-vertex normals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heightfield {
    width: usize,
    height: usize,
    heights: Vec<f32>,
    normals: Vec<Vec3>,
}

impl Heightfield {
    /// Allocate a flat heightfield of `width x height` cells
    pub fn new(width: usize, height: usize) -> Result<Self, SetupError> {
        let (small, large) = if width <= height {
            (width, height)
        } else {
            (height, width)
        };
        if !small.is_power_of_two() || large % small != 0 {
            return Err(SetupError::InvalidDimensions { width, height });
        }

        let samples = (width + 1) * (height + 1);
        Ok(Self {
            width,
            height,
            heights: vec![0.0; samples],
            normals: vec![Vec3::Y; samples],
        })
    }

    /// Cells along x and along the depth axis
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col <= self.width && row <= self.height).then(|| row * (self.width + 1) + col)
    }

    /// Height at a grid vertex; 0 outside the grid
    #[inline]
    pub fn height(&self, col: usize, row: usize) -> f32 {
        self.index(col, row).map_or(0.0, |i| self.heights[i])
    }

    /// Set the height at a grid vertex; ignored outside the grid
    #[inline]
    pub fn set_height(&mut self, col: usize, row: usize, h: f32) {
        if let Some(i) = self.index(col, row) {
            self.heights[i] = h;
        }
    }

    /// Normal at a grid vertex, as of the last `compute_normals`
    pub fn normal(&self, col: usize, row: usize) -> Vec3 {
        self.index(col, row).map_or(Vec3::Y, |i| self.normals[i])
    }

    /// Raw heights, row-major
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Fill the grid with diamond-square noise drawn from `rng`
    pub fn generate(&mut self, rng: &mut MinStd) {
        let (levels, x_blocks, y_blocks, block) = if self.width <= self.height {
            (
                self.width.trailing_zeros(),
                1,
                self.height / self.width,
                self.width,
            )
        } else {
            (
                self.height.trailing_zeros(),
                self.width / self.height,
                1,
                self.height,
            )
        };

        for i in 0..=y_blocks {
            for j in 0..=x_blocks {
                self.set_height(j * block, i * block, CORNER_SEED);
            }
        }

        let ratio = 2f32.powf(-ROUGHNESS);
        let mut scale = INITIAL_SCALE * ratio;
        let mut dim = 1usize << levels;

        for s in 0..levels {
            scale *= ratio;
            let half = dim >> 1;
            let cols = (1usize << s) * x_blocks;
            let rows = (1usize << s) * y_blocks;

            // Diamond step: cell centers from their four corners
            for i in 0..rows {
                for j in 0..cols {
                    let (x, y) = (j * dim, i * dim);
                    let avg = (self.height(x, y)
                        + self.height(x + dim, y)
                        + self.height(x + dim, y + dim)
                        + self.height(x, y + dim))
                        / 4.0;
                    let jitter = scale * (rng.next_f32() - 0.5);
                    self.set_height(x + half, y + half, avg + jitter);
                }
            }

            // Square step: edge midpoints from their two endpoints
            for i in 0..=rows {
                for j in 0..=cols {
                    let (x, y) = (j * dim, i * dim);

                    if j < cols {
                        let avg = (self.height(x, y) + self.height(x + dim, y)) / 2.0;
                        let jitter = scale * (rng.next_f32() - 0.5);
                        self.set_height(x + half, y, avg + jitter);
                    }

                    if i < rows {
                        let avg = (self.height(x, y) + self.height(x, y + dim)) / 2.0;
                        let jitter = scale * (rng.next_f32() - 0.5);
                        self.set_height(x, y + half, avg + jitter);
                    }
                }
            }

            dim = half;
        }
    }

    /// Rescale heights linearly into [0, 1]; a flat field becomes all zeros
    pub fn normalize(&mut self) {
        let (min, max) = self
            .heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            });

        let range = max - min;
        if !(range > 0.0) {
            self.heights.fill(0.0);
            return;
        }

        for h in &mut self.heights {
            *h = (*h - min) / range;
        }
    }

    /// Ease every column down to zero after `start_row`
    ///
    /// Row `start_row + 1` keeps the column's height scaled by the peak at
    /// `start_row`; the last row reaches the floor. The falloff follows
    /// `1 - t^3`, so it leaves the start row with zero slope.
    pub fn descent(&mut self, start_row: usize) {
        if start_row >= self.height {
            return;
        }

        let floor = 0.0;
        let span = (self.height - start_row - 1).max(1) as f32;

        for col in 0..=self.width {
            let peak = self.height(col, start_row);

            for row in start_row + 1..=self.height {
                let t = (row - start_row - 1) as f32 / span;
                let ease = 1.0 - t * t * t;
                let h = floor + self.height(col, row) * ease * (peak - floor);
                self.set_height(col, row, h);
            }
        }
    }

    /// World-space position of a grid vertex, if it exists
    fn vertex(&self, col: isize, row: isize) -> Option<Vec3> {
        if col < 0 || row < 0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        self.index(col, row).map(|i| {
            Vec3::new(
                col as f32 * VERTEX_DIST,
                self.heights[i] * HEIGHT_SCALE,
                row as f32 * VERTEX_DIST,
            )
        })
    }

    /// Recompute per-vertex normals from the current heights
    pub fn compute_normals(&mut self) {
        let mut normals = Vec::with_capacity(self.normals.len());

        for row in 0..=self.height as isize {
            for col in 0..=self.width as isize {
                let Some(center) = self.vertex(col, row) else {
                    continue;
                };

                let mut sum = Vec3::ZERO;
                for k in 0..NEIGHBOURS.len() {
                    let (dx1, dy1) = NEIGHBOURS[k];
                    let (dx2, dy2) = NEIGHBOURS[(k + 1) % NEIGHBOURS.len()];
                    let (Some(a), Some(b)) = (
                        self.vertex(col + dx1, row + dy1),
                        self.vertex(col + dx2, row + dy2),
                    ) else {
                        continue;
                    };

                    sum += (a - center).cross(b - center).normalize_or_zero();
                }

                normals.push(sum.try_normalize().unwrap_or(Vec3::Y));
            }
        }

        self.normals = normals;
    }
}
