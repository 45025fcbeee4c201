//! Track profile
//!
//! The racing surface is a single row of the heightfield laid out as a
//! polyline with fixed horizontal spacing. Every query culls the polyline to
//! the segments under the query's x-range first; a race track has hundreds of
//! segments and each craft casts several beams per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::heightfield::Heightfield;
use crate::consts::{FINISH_LINE, HEIGHT_SCALE, VERTEX_DIST};
use crate::geom::{EllipseContact, ellipse_segment_intersect, segment_intersect};

/// Ordered polyline forming the collision surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackProfile {
    points: Vec<Vec2>,
    min_y: f32,
    max_y: f32,
}

impl TrackProfile {
    /// Build a profile from explicit heights, one per vertex
    pub fn from_heights(heights: impl IntoIterator<Item = f32>) -> Self {
        let points: Vec<Vec2> = heights
            .into_iter()
            .enumerate()
            .map(|(i, h)| Vec2::new(i as f32 * VERTEX_DIST, h))
            .collect();

        let (min_y, max_y) = points
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });

        Self {
            points,
            min_y: if min_y.is_finite() { min_y } else { 0.0 },
            max_y: if max_y.is_finite() { max_y } else { 0.0 },
        }
    }

    /// Sample `count` vertices of a heightfield row
    pub fn from_row(field: &Heightfield, row: usize, count: usize) -> Self {
        Self::from_heights((0..count).map(|col| field.height(col, row) * HEIGHT_SCALE))
    }

    /// Polyline vertices
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Track length in world units
    pub fn width(&self) -> f32 {
        self.points.len() as f32 * VERTEX_DIST
    }

    /// x coordinate of the finish line
    pub fn finish_x(&self) -> f32 {
        FINISH_LINE.min(self.points.len().saturating_sub(1)) as f32 * VERTEX_DIST
    }

    /// Range of segment indices whose x-extent may overlap `[x1, x2]`
    fn segment_range(&self, x1: f32, x2: f32) -> std::ops::Range<usize> {
        let last = self.points.len().saturating_sub(1) as isize;
        let lo = ((x1.min(x2) / VERTEX_DIST) as isize - 1).max(0);
        let hi = ((x2.max(x1) / VERTEX_DIST) as isize + 2).min(last);
        if hi <= lo {
            return 0..0;
        }
        lo as usize..hi as usize
    }

    /// Intersect segment `p1`-`p2` with the track; the hit nearest `p1` wins
    pub fn ray_intersect(&self, p1: Vec2, p2: Vec2) -> Option<Vec2> {
        self.segment_range(p1.x, p2.x)
            .filter_map(|i| segment_intersect(p1, p2, self.points[i], self.points[i + 1]))
            .fold(None, |best: Option<Vec2>, hit| match best {
                Some(b) if (b - p1).length() <= (hit - p1).length() => Some(b),
                _ => Some(hit),
            })
    }

    /// Height of the track surface at `x`; 0 where the track does not reach
    ///
    /// On a vertex this is the vertex's own height, bit for bit.
    pub fn height_at(&self, x: f32) -> f32 {
        let column = x / VERTEX_DIST;
        if column >= 0.0 && column.fract() == 0.0 {
            if let Some(p) = self.points.get(column as usize) {
                return p.y;
            }
        }

        let top = Vec2::new(x, self.max_y + 1.0);
        let bottom = Vec2::new(x, self.min_y - 1.0);
        self.ray_intersect(top, bottom).map_or(0.0, |p| p.y)
    }

    /// Intersect a rotated ellipse with the track
    ///
    /// Returns the contact with the first segment in x order that touches the
    /// ellipse, which is not necessarily the deepest one.
    pub fn ellipse_intersect(
        &self,
        center: Vec2,
        angle: f32,
        major: f32,
        minor: f32,
    ) -> Option<EllipseContact> {
        self.segment_range(center.x - major, center.x + major)
            .find_map(|i| {
                ellipse_segment_intersect(
                    center,
                    angle,
                    major,
                    minor,
                    self.points[i],
                    self.points[i + 1],
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(height: f32, count: usize) -> TrackProfile {
        TrackProfile::from_heights(std::iter::repeat_n(height, count))
    }

    #[test]
    fn test_height_at_vertex_is_exact() {
        let track = TrackProfile::from_heights([0.0, 1.0, 3.0, 2.0, 4.5, 0.5, 0.337, 2.911, 1.0e-3]);
        for (i, p) in track.points().iter().enumerate() {
            assert_eq!(track.height_at(i as f32 * VERTEX_DIST), p.y, "vertex {i}");
        }
    }

    #[test]
    fn test_height_at_interpolates_between_vertices() {
        let track = TrackProfile::from_heights([0.0, 2.0, 2.0]);
        assert!((track.height_at(0.25) - 1.0).abs() < 1e-4);
        assert!((track.height_at(0.75) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_height_outside_track_is_zero() {
        let track = flat(3.0, 16);
        assert_eq!(track.height_at(-1.0), 0.0);
        assert_eq!(track.height_at(track.width() + 5.0), 0.0);
        assert!((track.height_at(2.0) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_picks_hit_nearest_start() {
        // Zig-zag: a shallow ray from the left crosses several segments
        let track = TrackProfile::from_heights([0.0, 2.0, 0.0, 2.0, 0.0, 2.0]);
        let start = Vec2::new(0.0, 1.0);
        let end = Vec2::new(2.5, 1.0);
        let hit = track.ray_intersect(start, end).expect("ray crosses track");
        assert!((hit - Vec2::new(0.25, 1.0)).length() < 1e-5);

        let reverse = track.ray_intersect(end, start).expect("ray crosses track");
        assert!((reverse - Vec2::new(2.25, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_ray_misses_above_track() {
        let track = flat(1.0, 32);
        assert!(track.ray_intersect(Vec2::new(1.0, 2.0), Vec2::new(6.0, 3.0)).is_none());
    }

    #[test]
    fn test_ellipse_resting_on_flat_track() {
        let track = flat(0.0, 64);
        // Centered over the middle of a segment so the first touching segment holds the foot
        let hit = track.ellipse_intersect(Vec2::new(10.25, 0.05), 0.0, 0.25, 0.075);
        let contact = hit.expect("ellipse dips below the surface");
        assert!(contact.normal.y > 0.0);
        // Correction points down into the track, so subtracting it lifts the craft
        assert!(contact.delta.y < 0.0);
        assert!((contact.delta.y + 0.025).abs() < 1e-4);

        assert!(track.ellipse_intersect(Vec2::new(10.25, 0.5), 0.0, 0.25, 0.075).is_none());
    }

    #[test]
    fn test_ellipse_first_segment_wins() {
        // V-shaped dip: the ellipse touches both walls, the left one comes first
        let track = TrackProfile::from_heights([2.0, 2.0, 0.0, 2.0, 2.0]);
        let center = Vec2::new(1.0, 0.3);
        let contact = track
            .ellipse_intersect(center, 0.0, 0.5, 0.5)
            .expect("ellipse sits in the dip");
        assert!(contact.point.x < center.x);
    }

    #[test]
    fn test_finish_line_clamped_to_track() {
        assert_eq!(flat(0.0, 512).finish_x(), 492.0 * VERTEX_DIST);
        assert_eq!(flat(0.0, 64).finish_x(), 63.0 * VERTEX_DIST);
        assert_eq!(flat(0.0, 512).width(), 256.0);
    }

    #[test]
    fn test_empty_track_queries() {
        let track = TrackProfile::from_heights(std::iter::empty());
        assert_eq!(track.height_at(1.0), 0.0);
        assert!(track.ellipse_intersect(Vec2::ZERO, 0.0, 1.0, 1.0).is_none());
    }
}
