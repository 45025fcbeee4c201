//! Terrain generation and the racing track
//!
//! A level is a seeded diamond-square heightfield plus the single row of it
//! the craft race over. The rows after the descent row fall away to the floor;
//! only the track row takes part in physics.

pub mod heightfield;
pub mod rng;
pub mod track;

use serde::{Deserialize, Serialize};

pub use heightfield::Heightfield;
pub use rng::MinStd;
pub use track::TrackProfile;

use crate::error::SetupError;
use crate::settings::TerrainConfig;

/// Generated terrain and the track profile cut from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    seed: u32,
    terrain: Heightfield,
    track: TrackProfile,
}

impl Level {
    /// Generate a level from a seed
    ///
    /// The same seed and config always give a bit-identical heightfield.
    pub fn generate(seed: u32, config: &TerrainConfig) -> Result<Self, SetupError> {
        let mut terrain = Heightfield::new(config.width, config.height)?;

        if config.track_row == 0 || config.track_row + 1 > config.height {
            return Err(SetupError::TrackRowOutOfRange {
                row: config.track_row,
                height: config.height,
            });
        }
        if config.track_vertices > config.width + 1 {
            return Err(SetupError::TrackTooWide {
                needed: config.track_vertices,
                available: config.width + 1,
            });
        }

        let mut rng = MinStd::new(seed);
        terrain.generate(&mut rng);
        terrain.normalize();
        terrain.descent(config.descent_row);

        // Flatten the track across its depth so the rendered strip matches the profile
        let row = config.track_row;
        for col in 0..config.track_vertices {
            let h = terrain.height(col, row - 1);
            terrain.set_height(col, row, h);
            terrain.set_height(col, row + 1, h);
        }
        terrain.compute_normals();

        let track = TrackProfile::from_row(&terrain, row, config.track_vertices);

        let (min_y, max_y) = track
            .points()
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        log::info!(
            "Generated level: seed={} terrain={}x{} track={} vertices ({:.1} units) heights {:.2}..{:.2}",
            seed,
            config.width,
            config.height,
            track.points().len(),
            track.width(),
            min_y,
            max_y
        );

        Ok(Self {
            seed,
            terrain,
            track,
        })
    }

    /// Seed the level was generated from
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Full heightfield, for rendering
    pub fn terrain(&self) -> &Heightfield {
        &self.terrain
    }

    /// Collision polyline
    pub fn track(&self) -> &TrackProfile {
        &self.track
    }

    /// Track length in world units
    pub fn width(&self) -> f32 {
        self.track.width()
    }

    /// Track height at `x`
    pub fn height_at(&self, x: f32) -> f32 {
        self.track.height_at(x)
    }
}
