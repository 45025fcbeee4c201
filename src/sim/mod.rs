//! Deterministic simulation module
//!
//! Everything that moves lives here. Given the same seed, inputs and frame
//! deltas a race replays bit for bit:
//! - Seeded terrain only
//! - Stable iteration order (by craft index)
//! - No rendering or platform dependencies

pub mod craft;
pub mod race;
pub mod rkn;
pub mod state;
pub mod trail;

pub use craft::{
    BeamBlocker, Control, Controls, Craft, CraftUpdate, Reaction, Surroundings,
};
pub use race::{CraftSnapshot, PALETTE, Race, RaceSnapshot};
pub use rkn::integrate_rkn;
pub use state::CraftState;
pub use trail::{TRAIL_CAPACITY, TRAIL_LIFE, TrailMarker, TrailPool, TrailSink};
