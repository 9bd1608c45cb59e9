//! Closed set of renderable primitives.

use crate::{HitRecord, Hittable, Ray, Sphere};
use tracer_math::{Aabb, Interval};

/// Any primitive the renderer knows how to intersect.
///
/// Dispatch is a match rather than a trait object so BVH leaves stay
/// inline in the primitive arena.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl Hittable for Primitive {
    #[inline]
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
        }
    }
}
