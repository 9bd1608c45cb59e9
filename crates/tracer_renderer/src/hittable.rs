//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Primitive, Ray};
use tracer_math::{Aabb, Interval, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Outward-facing unit surface normal
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
}

impl<'a> HitRecord<'a> {
    pub fn new(t: f32, p: Vec3, normal: Vec3, material: &'a Material) -> Self {
        Self {
            t,
            p,
            normal,
            material,
        }
    }
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("t", &self.t)
            .field("p", &self.p)
            .field("normal", &self.normal)
            .finish_non_exhaustive()
    }
}

/// Trait for objects that can be hit by rays.
///
/// Implementors are shared read-only across render workers.
pub trait Hittable: Send + Sync {
    /// Closest intersection strictly inside `ray_t`, if any.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;

    /// Axis-aligned bounding box, or `None` for unbounded or empty objects.
    fn bounding_box(&self) -> Option<Aabb>;
}

/// A flat list of primitives answering queries by linear scan.
///
/// Used for small scenes and as the reference the BVH must agree with.
#[derive(Default)]
pub struct PrimitiveList {
    objects: Vec<Primitive>,
    bbox: Aabb,
}

impl PrimitiveList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Primitive>) {
        let object = object.into();
        if let Some(b) = object.bounding_box() {
            self.bbox = Aabb::surrounding(&self.bbox, &b);
        }
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Primitive] {
        &self.objects
    }

    /// Hand the primitives over, e.g. to build a BVH.
    pub fn into_objects(self) -> Vec<Primitive> {
        self.objects
    }
}

impl From<Vec<Primitive>> for PrimitiveList {
    fn from(objects: Vec<Primitive>) -> Self {
        let bbox = objects
            .iter()
            .filter_map(Primitive::bounding_box)
            .fold(Aabb::EMPTY, |acc, b| Aabb::surrounding(&acc, &b));
        Self { objects, bbox }
    }
}

impl Hittable for PrimitiveList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let max = closest.map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(max)) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Option<Aabb> {
        (!self.bbox.is_empty()).then_some(self.bbox)
    }
}
