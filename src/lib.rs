//! Hover Racer - physics core for hover-craft racing over fractal terrain
//!
//! Core modules:
//! - `geom`: Vector helpers and analytic intersection routines
//! - `terrain`: Seeded diamond-square heightfield and the track profile cut from it
//! - `sim`: Deterministic simulation (integrator, craft dynamics, collisions, world step)
//! - `settings`: Data-driven race configuration
//! - `error`: Setup and configuration failures

pub mod error;
pub mod geom;
pub mod settings;
pub mod sim;
pub mod terrain;

pub use error::{ConfigError, SetupError};
pub use settings::{GridLayout, RaceConfig, TerrainConfig};

/// Simulation configuration constants
pub mod consts {
    /// Default frame delta used by the headless driver (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Maximum number of craft in one race
    pub const MAX_CRAFT: usize = 8;

    /// Horizontal distance between terrain samples (world units)
    pub const VERTEX_DIST: f32 = 0.5;
    /// Vertical scale applied to normalized terrain heights
    pub const HEIGHT_SCALE: f32 = 5.0;
    /// Number of points in the track profile
    pub const TRACK_VERTICES: usize = 512;
    /// Track vertex index of the finish line
    pub const FINISH_LINE: usize = 492;
}

/// Normalize an angle into (-π, π]
///
/// Angles already in range come back untouched; non-finite input is returned
/// as is.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() || (angle > -PI && angle <= PI) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((normalize_angle(PI + 0.5) - (-PI + 0.5)).abs() < 1e-5);
        assert!((normalize_angle(-PI - 0.5) - (PI - 0.5)).abs() < 1e-5);
        assert!((normalize_angle(4.0 * PI + 0.25) - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_angle_keeps_pi() {
        assert_eq!(normalize_angle(PI), PI);
        assert_eq!(normalize_angle(-PI), PI);
    }

    #[test]
    fn test_normalize_angle_far_and_non_finite() {
        let a = normalize_angle(1.0e6);
        assert!(a > -PI && a <= PI);
        let a = normalize_angle(-1.0e6);
        assert!(a > -PI && a <= PI);

        assert_eq!(normalize_angle(f32::INFINITY), f32::INFINITY);
        assert_eq!(normalize_angle(f32::NEG_INFINITY), f32::NEG_INFINITY);
        assert!(normalize_angle(f32::NAN).is_nan());
    }
}
