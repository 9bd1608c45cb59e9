//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a hard depth limit
//! - Sky gradient background
//! - Anti-aliasing via multi-sampling
//! - Gamma correction

use crate::{Camera, Color, Hittable, Ray};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracer_math::Interval;

use crate::random::gen_f32;

/// Bounce limit used unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: u32 = 50;

/// Closest hit distance accepted, to keep rays from re-hitting the surface
/// they were spawned on.
pub const T_MIN: f32 = 0.001;

/// Errors that can occur when starting a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("tile queue closed before all tiles were queued")]
    QueueClosed,
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Worker threads; 0 means one per available CPU
    pub workers: usize,
    /// Edge length of the square tiles handed to workers
    pub tile_size: u32,
    /// Base seed for the per-tile random streams
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            samples_per_pixel: 10,
            max_depth: DEFAULT_MAX_DEPTH,
            workers: 0,
            tile_size: crate::DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Check that the configuration describes a renderable image.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples_per_pixel must be at least 1".into(),
            ));
        }
        if self.tile_size == 0 {
            return Err(RenderError::InvalidConfig(
                "tile_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of worker threads to run, resolving 0 to the CPU count.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism().map_or(1, |n| n.get())
    }

    /// Width / height, for the camera's image plane.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Compute the color seen by a ray.
///
/// Traces the ray through the scene, bouncing off surfaces and multiplying
/// in each material's attenuation. Paths that escape, or that reach
/// `max_depth` bounces, pick up the sky color.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    if let Some(rec) = world.hit(ray, Interval::new(T_MIN, f32::INFINITY)) {
        if depth < max_depth {
            return match rec.material.scatter(ray, &rec, rng) {
                Some(s) => ray_color(&s.scattered, world, depth + 1, max_depth, rng) * s.attenuation,
                // Absorbed
                None => Color::ZERO,
            };
        }
    }

    sky_gradient(ray)
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Inverse of [`linear_to_gamma`].
#[inline]
pub fn gamma_to_linear(gamma: f32) -> f32 {
    gamma * gamma
}

/// Gamma-encode each channel of a linear color.
pub fn encode_gamma(color: Color) -> Color {
    Color::new(
        linear_to_gamma(color.x),
        linear_to_gamma(color.y),
        linear_to_gamma(color.z),
    )
}

/// Undo [`encode_gamma`].
pub fn decode_gamma(color: Color) -> Color {
    color * color
}

/// Convert a gamma-encoded color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (255.0 * c.clamp(0.0, 1.0)).round() as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Render a single pixel with multi-sampling.
///
/// `x`, `y` are image coordinates with row 0 at the top. Returns the
/// averaged linear color.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let width = config.width as f32;
    let height = config.height as f32;
    // Image rows run top-down, camera t runs bottom-up
    let row = (config.height - 1 - y) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (x as f32 + gen_f32(rng)) / width;
        let t = (row + gen_f32(rng)) / height;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += ray_color(&ray, world, 0, config.max_depth, rng);
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as f32
}

/// Receives finished pixels.
///
/// Colors are gamma-encoded with channels in [0, 1]. Each pixel is written
/// exactly once per render.
pub trait PixelSink {
    fn write_pixel(&mut self, x: u32, y: u32, color: Color);
}

impl<F: FnMut(u32, u32, Color)> PixelSink for F {
    fn write_pixel(&mut self, x: u32, y: u32, color: Color) {
        self(x, y, color)
    }
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Convert to packed 8-bit RGB (for display or saving).
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgb(*c)).collect()
    }
}

impl PixelSink for ImageBuffer {
    fn write_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.set(x, y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, PrimitiveList, Scene, Sphere, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn two_sphere_world() -> Scene {
        let mut list = PrimitiveList::new();
        list.add(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Material::lambertian(Color::splat(0.5))),
        ));
        list.add(Sphere::new(
            Vec3::new(0.0, -100.5, -1.0),
            100.0,
            Arc::new(Material::lambertian(Color::splat(0.5))),
        ));
        Scene::with_bvh(list).unwrap()
    }

    #[test]
    fn test_sky_gradient() {
        let up_color = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)));
        let down_color = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)));

        assert!((up_color - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((down_color - Color::ONE).length() < 1e-6);
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_gamma_round_trip() {
        for c in [
            Color::new(0.0, 0.5, 1.0),
            Color::new(0.18, 0.02, 0.75),
            Color::new(0.9, 0.33, 0.001),
        ] {
            let back = decode_gamma(encode_gamma(c));
            assert!((back - c).length() < 1e-6);
            assert!((gamma_to_linear(linear_to_gamma(c.y)) - c.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_color_to_rgb() {
        assert_eq!(color_to_rgb(Color::new(0.0, 0.5, 1.0)), [0, 128, 255]);
        assert_eq!(color_to_rgb(Color::new(-0.2, 1.7, 0.999)), [0, 255, 255]);
    }

    #[test]
    fn test_empty_world_returns_sky() {
        let world = Scene::default();
        let mut rng = StdRng::seed_from_u64(1);

        for dir in [Vec3::X, Vec3::new(0.3, 0.8, -1.0), Vec3::NEG_Y] {
            let ray = Ray::new(Vec3::ZERO, dir);
            assert_eq!(ray_color(&ray, &world, 0, DEFAULT_MAX_DEPTH, &mut rng), sky_gradient(&ray));
        }
    }

    #[test]
    fn test_depth_limit_returns_sky() {
        let world = two_sphere_world();
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        // At the limit the hit is ignored and the background is returned
        let color = ray_color(&ray, &world, DEFAULT_MAX_DEPTH, DEFAULT_MAX_DEPTH, &mut rng);
        assert_eq!(color, sky_gradient(&ray));
    }

    #[test]
    fn test_absorbing_surface_is_black() {
        // A mirror hit from inside reflects into itself and is absorbed
        let mut list = PrimitiveList::new();
        list.add(Sphere::new(
            Vec3::ZERO,
            1.0,
            Arc::new(Material::metal(Color::ONE, 0.0)),
        ));
        let world = Scene::flat(list);
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(ray_color(&ray, &world, 0, DEFAULT_MAX_DEPTH, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_render_pixel_hits_sphere() {
        let world = two_sphere_world();
        let camera = Camera::default();
        let config = RenderConfig {
            width: 20,
            height: 10,
            samples_per_pixel: 4,
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(42);

        // Center pixel looks straight at the small sphere; a diffuse bounce
        // halves the light, so blue drops well below the sky's 1.0
        let color = render_pixel(&camera, &world, 10, 5, &config, &mut rng);
        assert!(color.z < 0.9, "color {color:?}");
        assert!(color.length() > 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(RenderConfig::default().validate().is_ok());

        let zero_width = RenderConfig {
            width: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(zero_width.validate(), Err(RenderError::InvalidConfig(_))));

        let zero_samples = RenderConfig {
            samples_per_pixel: 0,
            ..RenderConfig::default()
        };
        assert!(zero_samples.validate().is_err());

        let zero_tile = RenderConfig {
            tile_size: 0,
            ..RenderConfig::default()
        };
        assert!(zero_tile.validate().is_err());
    }

    #[test]
    fn test_worker_count() {
        let config = RenderConfig {
            workers: 3,
            ..RenderConfig::default()
        };
        assert_eq!(config.worker_count(), 3);
        assert!(RenderConfig::default().worker_count() >= 1);
    }

    #[test]
    fn test_config_from_json() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "width": 200, "height": 100, "seed": 7 }"#).unwrap();

        assert_eq!(config.width, 200);
        assert_eq!(config.height, 100);
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_image_buffer_sink() {
        let mut image = ImageBuffer::new(4, 2);
        image.write_pixel(3, 1, Color::new(1.0, 0.5, 0.0));

        assert_eq!(image.get(3, 1), Color::new(1.0, 0.5, 0.0));
        assert_eq!(image.get(0, 0), Color::ZERO);
        let bytes = image.to_rgb8();
        assert_eq!(bytes.len(), 4 * 2 * 3);
        assert_eq!(&bytes[21..24], &[255, 128, 0]);
    }

    #[test]
    fn test_image_buffer_indexes_past_u32_range() {
        // 70_000 * 70_000 overflows u32; only the index math is exercised
        let image = ImageBuffer {
            width: 70_000,
            height: 70_000,
            pixels: Vec::new(),
        };
        assert_eq!(image.index(69_999, 69_999), 70_000usize * 70_000 - 1);
        assert_eq!(image.index(5, 61_400), 61_400usize * 70_000 + 5);
    }
}
