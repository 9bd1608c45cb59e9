//! Surface scattering models.
//!
//! The set of materials is closed: `Material` is an enum and scattering
//! dispatches with a match.

use crate::random::{gen_f32, random_in_unit_sphere};
use crate::{hittable::HitRecord, Ray};
use rand::RngCore;
use tracer_math::Vec3;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Outcome of a scattering event that was not absorbed.
#[derive(Debug, Clone, Copy)]
pub struct Scatter {
    /// Per-channel fraction of light carried by the scattered ray
    pub attenuation: Color,
    /// Outgoing ray, starting at the hit point
    pub scattered: Ray,
}

/// Describes how light interacts with a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
}

impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian(Lambertian::new(albedo))
    }

    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal(Metal::new(albedo, fuzz))
    }

    pub fn dielectric(ior: f32) -> Self {
        Material::Dielectric(Dielectric::new(ior))
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    #[inline]
    pub fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        match self {
            Material::Lambertian(m) => m.scatter(ray_in, rec, rng),
            Material::Metal(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => m.scatter(ray_in, rec, rng),
        }
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let direction = rec.normal + random_in_unit_sphere(rng);

        Some(Scatter {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Anything heading into the surface is absorbed
        (direction.dot(rec.normal) > 0.0).then(|| Scatter {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    pub fn ior(&self) -> f32 {
        self.ior
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let direction = ray_in.direction();
        let d_dot_n = direction.dot(rec.normal);

        // Normals point outward, so a positive dot means we are leaving the medium
        let (outward_normal, ratio, cosine) = if d_dot_n > 0.0 {
            (-rec.normal, self.ior, self.ior * d_dot_n / direction.length())
        } else {
            (rec.normal, 1.0 / self.ior, -d_dot_n / direction.length())
        };

        let reflected = reflect(direction, rec.normal);
        let scattered_dir = match refract(direction, outward_normal, ratio) {
            Some(refracted) if gen_f32(rng) >= schlick(cosine, self.ior) => refracted,
            _ => reflected,
        };

        Some(Scatter {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, scattered_dir),
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract `v` through a surface with normal `n` (facing the incoming side).
///
/// Returns `None` on total internal reflection.
#[inline]
pub fn refract(v: Vec3, n: Vec3, ni_over_nt: f32) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}

/// Schlick's approximation for reflectance
#[inline]
pub fn schlick(cosine: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
