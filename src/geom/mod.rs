//! Planar geometry
//!
//! `glam::Vec2` is the vector type everywhere; `Vec2Ext` adds the handful of
//! operations the physics needs on top of it. Intersection routines are pure
//! functions returning `None` on a miss.

pub mod intersect;
pub mod vector;

pub use intersect::{EllipseContact, ellipse_segment_intersect, segment_intersect};
pub use vector::Vec2Ext;
