//! Tracer Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for spheres with diffuse, metal and glass
//! materials. Scenes are accelerated with a SAH-built BVH and rendered in
//! tiles across a pool of worker threads.

pub mod random;
mod hittable;
mod material;
mod sphere;
mod primitive;
mod bvh;
mod scene;
mod camera;
mod renderer;
mod bucket;
mod scheduler;

pub use hittable::{HitRecord, Hittable, PrimitiveList};
pub use material::{reflect, refract, schlick, Color, Dielectric, Lambertian, Material, Metal, Scatter};
pub use sphere::Sphere;
pub use primitive::Primitive;
pub use bvh::{Bvh, BvhChild, BvhError, BvhNode, BvhResult};
pub use scene::Scene;
pub use camera::{Camera, CameraSettings};
pub use renderer::{
    color_to_rgb, decode_gamma, encode_gamma, gamma_to_linear, linear_to_gamma, ray_color,
    render_pixel, sky_gradient, ImageBuffer, PixelSink, RenderConfig, RenderError, RenderResult,
    DEFAULT_MAX_DEPTH, T_MIN,
};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use scheduler::{render, tile_seed, RenderStats};

/// Re-export Vec3 and common math types from tracer_math
pub use tracer_math::{Aabb, Interval, Ray, Vec3, Vec3Ext};
