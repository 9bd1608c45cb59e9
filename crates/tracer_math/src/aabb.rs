use crate::{Interval, Ray, Vec3, Vec3Ext};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Stored as its two corners. `Aabb::EMPTY` (min = +inf, max = -inf) is the
/// only box allowed to have `min > max`; it is the identity for
/// [`Aabb::surrounding`]. Any other inverted box is a bug, caught by debug
/// assertions wherever a box is built or consumed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from its min and max corners.
    ///
    /// The corners must already be ordered.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let aabb = Self { min, max };
        aabb.debug_check();
        aabb
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert!(
            self.is_empty() || self.min.cmple(self.max).all(),
            "malformed AABB: min {:?} exceeds max {:?}",
            self.min,
            self.max
        );
    }

    /// Create an AABB that surrounds two other AABBs.
    #[inline]
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        box0.debug_check();
        box1.debug_check();
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// True only for the [`Aabb::EMPTY`] sentinel.
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Returns true if `other` lies completely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        if other.is_empty() {
            return true;
        }
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Uses the slab method. A zero direction component yields an infinite
    /// inverse, which the comparisons below handle without special cases.
    #[inline]
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        self.debug_check();
        for axis in 0..3 {
            let adinv = 1.0 / r.direction.axis(axis);
            let orig = r.origin.axis(axis);

            let mut t0 = (self.min.axis(axis) - orig) * adinv;
            let mut t1 = (self.max.axis(axis) - orig) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Surface area of the box. The empty box has zero area.
    pub fn area(&self) -> f32 {
        self.debug_check();
        if self.is_empty() {
            return 0.0;
        }
        let size = self.max - self.min;
        2.0 * (size.x * size.y + size.x * size.z + size.y * size.z)
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties prefer X, then Y.
    pub fn longest_axis(&self) -> usize {
        let size = self.max - self.min;

        if size.x >= size.y {
            if size.x >= size.z {
                0
            } else {
                2
            }
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    /// Minimum coordinate along `axis`.
    #[inline]
    pub fn axis_min(&self, axis: usize) -> f32 {
        self.min.axis(axis)
    }

    /// The empty box: identity element for `surrounding`.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::new(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::new(Vec3::new(3.0, -3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.min, Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(surrounding.max, Vec3::splat(10.0));
        assert!(surrounding.contains_box(&box1));
        assert!(surrounding.contains_box(&box2));
    }

    #[test]
    fn test_aabb_surrounding_is_tightest() {
        let box1 = Aabb::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(1.0, 1.0, 3.0));
        let box2 = Aabb::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(4.0, 0.5, 1.0));
        let s = Aabb::surrounding(&box1, &box2);

        // Every face of the union touches one of the inputs.
        for axis in 0..3 {
            assert_eq!(s.min.axis(axis), box1.min.axis(axis).min(box2.min.axis(axis)));
            assert_eq!(s.max.axis(axis), box1.max.axis(axis).max(box2.max.axis(axis)));
        }
    }

    #[test]
    fn test_aabb_empty_is_identity() {
        let b = Aabb::new(Vec3::new(-1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));

        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &b), b);
        assert_eq!(Aabb::surrounding(&b, &Aabb::EMPTY), b);
        assert!(Aabb::EMPTY.is_empty());
        assert!(!b.is_empty());
        assert_eq!(Aabb::EMPTY.area(), 0.0);
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Box lies beyond the interval
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_aabb_hit_axis_parallel_ray() {
        // Zero x/y direction components produce infinite inverses.
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        let inside = Ray::new(Vec3::new(0.5, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(aabb.hit(&inside, Interval::new(0.001, f32::INFINITY)));

        let outside = Ray::new(Vec3::new(2.0, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&outside, Interval::new(0.001, f32::INFINITY)));
    }

    #[test]
    fn test_aabb_hit_zero_direction() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let degenerate = Ray::new(Vec3::new(5.0, 5.0, 5.0), Vec3::ZERO);
        assert!(!aabb.hit(&degenerate, Interval::new(0.001, f32::INFINITY)));
    }

    #[test]
    fn test_aabb_area() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.area(), 2.0 * (2.0 + 3.0 + 6.0));
    }

    #[test]
    fn test_aabb_longest_axis() {
        let aabb_x = Aabb::new(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0));
        assert_eq!(aabb_x.longest_axis(), 0);

        let aabb_y = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0));
        assert_eq!(aabb_y.longest_axis(), 1);

        let aabb_z = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0));
        assert_eq!(aabb_z.longest_axis(), 2);

        let cube = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(cube.longest_axis(), 0);
    }

    #[test]
    fn test_axis_min() {
        let aabb = Aabb::new(Vec3::new(-1.0, 0.5, 2.0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.axis_min(0), -1.0);
        assert_eq!(aabb.axis_min(1), 0.5);
        assert_eq!(aabb.axis_min(2), 2.0);
    }

    #[test]
    #[should_panic(expected = "malformed AABB")]
    #[cfg(debug_assertions)]
    fn test_aabb_new_rejects_inverted_box() {
        let _ = Aabb::new(Vec3::ONE, Vec3::ZERO);
    }

    fn inverted() -> Aabb {
        // Built field by field to get past the checked constructor
        Aabb {
            min: Vec3::new(0.0, 1.0, 0.0),
            max: Vec3::new(1.0, 0.0, 1.0),
        }
    }

    #[test]
    fn test_only_sentinel_is_empty() {
        assert!(Aabb::EMPTY.is_empty());
        assert!(Aabb::default().is_empty());
        assert!(!inverted().is_empty());
        assert!(!Aabb::new(Vec3::ONE, Vec3::ONE).is_empty());
    }

    #[test]
    #[should_panic(expected = "malformed AABB")]
    #[cfg(debug_assertions)]
    fn test_area_rejects_inverted_box() {
        let _ = inverted().area();
    }

    #[test]
    #[should_panic(expected = "malformed AABB")]
    #[cfg(debug_assertions)]
    fn test_hit_rejects_inverted_box() {
        let ray = Ray::new(Vec3::new(0.5, 0.5, -5.0), Vec3::Z);
        let _ = inverted().hit(&ray, Interval::new(0.0, 100.0));
    }

    #[test]
    #[should_panic(expected = "malformed AABB")]
    #[cfg(debug_assertions)]
    fn test_surrounding_rejects_inverted_box() {
        let unit = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let _ = Aabb::surrounding(&inverted(), &unit);
    }
}
