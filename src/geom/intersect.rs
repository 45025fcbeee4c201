//! Analytic intersection routines
//!
//! Segment-vs-segment is used for hover beams and box contacts. The
//! segment-vs-ellipse test works in the ellipse's local frame, where the
//! ellipse becomes the unit circle, so contact against the track stays exact
//! without iterating.

use glam::Vec2;

use super::vector::Vec2Ext;

/// Contact between an ellipse and a segment, in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseContact {
    /// Contact point on the ellipse boundary
    pub point: Vec2,
    /// Contact normal, pointing from the contact toward the ellipse center
    pub normal: Vec2,
    /// Penetration correction; subtracting it from the center resolves overlap
    pub delta: Vec2,
}

/// Intersect segment `a1`-`a2` with segment `b1`-`b2`
///
/// Both segment parameters must lie in [0, 1] (endpoints count). Parallel and
/// collinear segments have no unique solution and are reported as a miss.
pub fn segment_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    let s1 = a2 - a1;
    let s2 = b2 - b1;

    let denom = s1.cross(s2);
    if denom.abs() < f32::EPSILON {
        return None;
    }

    let offset = a1 - b1;
    let s = s1.cross(offset) / denom;
    let t = s2.cross(offset) / denom;

    if !(0.0..=1.0).contains(&s) || !(0.0..=1.0).contains(&t) {
        return None;
    }

    Some(a1 + s1 * t)
}

/// Intersect a segment with a rotated ellipse
///
/// `angle` rotates the ellipse's major axis away from +x. The segment is
/// mapped into the frame where the ellipse is the unit circle. If the foot of
/// the perpendicular from the origin falls strictly inside the segment, that
/// foot is the contact; otherwise the circle equation is solved for the
/// segment parameter.
pub fn ellipse_segment_intersect(
    center: Vec2,
    angle: f32,
    major: f32,
    minor: f32,
    start: Vec2,
    end: Vec2,
) -> Option<EllipseContact> {
    let axes = Vec2::new(major, minor);
    let v1 = (start - center).rotated(-angle) / axes;
    let v2 = (end - center).rotated(-angle) / axes;

    let d = v2 - v1;
    let len_sq = d.length_squared();
    if len_sq < f32::EPSILON {
        return None;
    }

    let foot_t = (-v1).dot(d) / len_sq;

    let (point, delta) = if foot_t > 0.0 && foot_t < 1.0 {
        let foot = v1 + d * foot_t;
        if foot.length() > 1.0 {
            return None;
        }
        let mut surface = foot;
        surface.normalize_in_place();
        (surface, surface - foot)
    } else {
        if v1.length() > 1.0 && v2.length() > 1.0 {
            return None;
        }

        let a = d.dot(d);
        let b = 2.0 * v1.dot(d);
        let c = v1.dot(v1) - 1.0;

        let discr = b * b - 4.0 * a * c;
        if discr < 0.0 {
            return None;
        }
        let root = discr.sqrt();

        let mut t = (-b - root) / (2.0 * a);
        if !(0.0..=1.0).contains(&t) {
            t = (-b + root) / (2.0 * a);
        }
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        let delta = if v2.length() < 1.0 { d * (t - 1.0) } else { d * t };
        (v1 + d * t, delta)
    };

    Some(EllipseContact {
        point: (point * axes).rotated(angle) + center,
        normal: (-point).rotated(angle),
        delta: (delta * axes).rotated(angle),
    })
}
