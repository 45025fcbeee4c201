//! Race configuration
//!
//! Loaded from a JSON file by the native driver; every field falls back to
//! the stock race when missing.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_CRAFT, TRACK_VERTICES};
use crate::error::ConfigError;

/// Heightfield and track extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Cells along the track direction
    pub width: usize,
    /// Cells across the track
    pub height: usize,
    /// Rows after this one fall away to the floor
    pub descent_row: usize,
    /// Heightfield row the track is cut from
    pub track_row: usize,
    /// Number of track profile vertices
    pub track_vertices: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 32,
            descent_row: 30,
            track_row: 24,
            track_vertices: TRACK_VERTICES,
        }
    }
}

/// Starting grid placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// x of the pole position
    pub base_x: f32,
    /// Gap between consecutive slots, going back down the track
    pub spacing: f32,
    /// Height above the track for even slots
    pub base_height: f32,
    /// Extra height for odd slots
    pub stagger: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            base_x: 15.0,
            spacing: 0.75,
            base_height: 0.75,
            stagger: 0.5,
        }
    }
}

impl GridLayout {
    /// Start position of slot `k`, given the track height under it
    pub fn slot(&self, k: usize, track_height: impl Fn(f32) -> f32) -> Vec2 {
        let x = self.base_x - k as f32 * self.spacing;
        let lift = if k & 1 == 1 { self.stagger } else { 0.0 };
        Vec2::new(x, track_height(x) + self.base_height + lift)
    }
}

/// Everything needed to set up a race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Terrain seed; a random one is drawn when absent
    pub seed: Option<u32>,
    /// Number of craft on the grid
    pub craft_count: usize,
    pub terrain: TerrainConfig,
    pub grid: GridLayout,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            seed: None,
            craft_count: 4,
            terrain: TerrainConfig::default(),
            grid: GridLayout::default(),
        }
    }
}

impl RaceConfig {
    /// Same config with a fixed seed
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Same config with a given craft count
    pub fn with_craft_count(mut self, count: usize) -> Self {
        self.craft_count = count;
        self
    }

    /// Craft count clamped to the grid size
    pub fn effective_craft_count(&self) -> usize {
        if self.craft_count > MAX_CRAFT {
            log::warn!(
                "Requested {} craft, grid holds {}",
                self.craft_count,
                MAX_CRAFT
            );
        }
        self.craft_count.min(MAX_CRAFT)
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded race config from {}", path.display());
        Ok(config)
    }

    /// Write to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Race config saved to {}", path.as_ref().display());
        Ok(())
    }
}
