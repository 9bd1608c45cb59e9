//! Math types for the tracer path tracer.
//!
//! Vectors come straight from glam; this crate adds the ray, interval and
//! bounding-box types the renderer's intersection code is built on.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod vec;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vec::Vec3Ext;
