// Vector utilities
//
// Extends glam::Vec3 with the few operations the tracer needs that glam
// does not provide directly.

use glam::Vec3;

/// Extension trait for Vec3 used by the intersection and scattering code.
pub trait Vec3Ext {
    /// Normalize in place. A zero vector becomes NaN, like `Vec3::normalize`.
    fn normalize_in_place(&mut self);

    /// Component `axis` (0=X, 1=Y, 2=Z).
    fn axis(&self, axis: usize) -> f32;

    /// True if the vector has unit length within `epsilon`.
    fn is_unit(&self, epsilon: f32) -> bool;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn normalize_in_place(&mut self) {
        *self /= self.length();
    }

    #[inline]
    fn axis(&self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    fn is_unit(&self, epsilon: f32) -> bool {
        (self.length() - 1.0).abs() <= epsilon
    }
}
