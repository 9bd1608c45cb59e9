//! The single traceable object handed to the integrator.

use crate::{Bvh, BvhResult, HitRecord, Hittable, PrimitiveList, Ray};
use tracer_math::{Aabb, Interval};

/// A renderable world: either a flat list or a BVH over the same primitives.
pub enum Scene {
    /// Linear scan; cheapest to build, fine for a handful of primitives.
    List(PrimitiveList),
    Bvh(Bvh),
}

impl Scene {
    /// Wrap the primitives in a BVH.
    pub fn with_bvh(list: PrimitiveList) -> BvhResult<Self> {
        Ok(Scene::Bvh(Bvh::new(list.into_objects())?))
    }

    /// Keep the primitives as a flat list.
    pub fn flat(list: PrimitiveList) -> Self {
        Scene::List(list)
    }

    /// Number of primitives in the scene.
    pub fn len(&self) -> usize {
        match self {
            Scene::List(list) => list.len(),
            Scene::Bvh(bvh) => bvh.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Scene {
    fn default() -> Self {
        Scene::List(PrimitiveList::new())
    }
}

impl Hittable for Scene {
    #[inline]
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match self {
            Scene::List(list) => list.hit(ray, ray_t),
            Scene::Bvh(bvh) => bvh.hit(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Scene::List(list) => list.bounding_box(),
            Scene::Bvh(bvh) => bvh.bounding_box(),
        }
    }
}
