//! Thin-lens camera for ray generation.

use crate::random::random_in_unit_disk;
use crate::Ray;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracer_math::Vec3;

/// User-facing camera parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    // Camera positioning
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,

    // Lens settings
    pub vfov: f32,         // Vertical field of view in degrees
    pub aspect_ratio: f32, // Width / height of the image plane
    pub aperture: f32,     // Lens diameter; 0 is a pinhole
    pub focus_dist: f32,   // Distance from camera to plane of perfect focus
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aspect_ratio: 2.0,
            aperture: 0.0,
            focus_dist: 1.0,
        }
    }
}

impl CameraSettings {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Set the image plane aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Derive the ray-generation camera.
    pub fn build(&self) -> Camera {
        Camera::new(self)
    }
}

/// Camera for generating rays into the scene.
///
/// Everything is precomputed from [`CameraSettings`] once per render.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    pub fn new(settings: &CameraSettings) -> Self {
        let theta = settings.vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = settings.aspect_ratio * half_height;
        let focus = settings.focus_dist;

        // Calculate camera basis vectors
        let w = (settings.look_from - settings.look_at).normalize();
        let u = settings.vup.cross(w).normalize();
        let v = w.cross(u);

        // The image plane sits on the focus plane so blur and focus agree
        let origin = settings.look_from;
        let lower_left_corner =
            origin - half_width * focus * u - half_height * focus * v - focus * w;

        Self {
            origin,
            lower_left_corner,
            horizontal: 2.0 * half_width * focus * u,
            vertical: 2.0 * half_height * focus * v,
            u,
            v,
            w,
            lens_radius: settings.aperture / 2.0,
        }
    }

    /// Generate a ray through image-plane coordinates `(s, t)`, both in [0, 1]
    /// with `(0, 0)` at the lower left.
    ///
    /// A pinhole camera (aperture 0) consumes no random numbers.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.origin - offset,
        )
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Camera basis: right, up and backward (away from the view direction).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraSettings::default())
    }
}
