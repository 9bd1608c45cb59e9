//! Sphere primitive for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use std::sync::Arc;
use tracer_math::{Aabb, Interval, Vec3};

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
    bbox: Option<Aabb>,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// A zero, negative or NaN radius is kept as given but never reports a hit.
    /// NaN spheres report no bounding box.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let rvec = Vec3::splat(radius.abs());
        // NaN geometry has no meaningful extent
        let bbox = (!center.is_nan() && !rvec.is_nan())
            .then(|| Aabb::new(center - rvec, center + rvec));

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

impl Hittable for Sphere {
    #[inline]
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        if !(self.radius > 0.0) {
            return None;
        }

        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let half_b = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if !(discriminant > 0.0) {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (-half_b - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (-half_b + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let normal = (p - self.center) / self.radius;
        Some(HitRecord::new(root, p, normal, &self.material))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }
}
