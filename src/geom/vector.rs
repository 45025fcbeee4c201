//! 2D vector helpers layered over `glam::Vec2`
//!
//! glam already covers addition, subtraction, negation, scalar multiply and
//! divide, and the dot product. This adds the 2D cross product, rotation by an
//! angle, and normalization that leaves zero vectors alone.

use glam::Vec2;

/// Extra 2D operations used by the physics code
pub trait Vec2Ext: Sized {
    /// 2D cross product (z component of the 3D cross product)
    fn cross(self, other: Vec2) -> f32;

    /// Copy rotated counter-clockwise by `theta` radians
    fn rotated(self, theta: f32) -> Vec2;

    /// Rotate in place counter-clockwise by `theta` radians
    fn rotate_by(&mut self, theta: f32) -> &mut Self;

    /// Unit vector with the same direction, or zero for a zero vector
    fn unit(self) -> Vec2;

    /// Counter-clockwise perpendicular of equal length
    fn normal(self) -> Vec2;

    /// Normalize in place; zero-length vectors are left unchanged
    fn normalize_in_place(&mut self) -> &mut Self;

    /// Angle of the vector, `atan2(y, x)`
    fn heading(self) -> f32;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn cross(self, other: Vec2) -> f32 {
        self.perp_dot(other)
    }

    #[inline]
    fn rotated(self, theta: f32) -> Vec2 {
        Vec2::from_angle(theta).rotate(self)
    }

    #[inline]
    fn rotate_by(&mut self, theta: f32) -> &mut Self {
        *self = self.rotated(theta);
        self
    }

    #[inline]
    fn unit(self) -> Vec2 {
        self.normalize_or_zero()
    }

    #[inline]
    fn normal(self) -> Vec2 {
        self.perp()
    }

    #[inline]
    fn normalize_in_place(&mut self) -> &mut Self {
        let len = self.length();
        if len > 0.0 {
            *self /= len;
        }
        self
    }

    #[inline]
    fn heading(self) -> f32 {
        self.y.atan2(self.x)
    }
}
