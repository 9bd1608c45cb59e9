//! The "random spheres" demo scene.

use rand::Rng;
use std::sync::Arc;
use tracer_math::Vec3;
use tracer_renderer::{Color, Material, PrimitiveList, Sphere};

/// Grid half-extent of the small spheres.
const GRID: i32 = 11;

/// Small spheres are dropped when closer than this to the metal sphere's footprint.
const CLEARANCE: f32 = 0.9;

/// Build the scene: a large ground sphere, a 22x22 grid of small randomly
/// jittered spheres and three large feature spheres.
pub fn random_scene(rng: &mut impl Rng) -> PrimitiveList {
    let mut world = PrimitiveList::new();

    world.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Material::lambertian(Color::splat(0.5))),
    ));

    let keep_out = Vec3::new(4.0, 0.2, 0.0);
    for a in -GRID..GRID {
        for b in -GRID..GRID {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + rng.gen::<f32>(),
            );
            if (center - keep_out).length() > CLEARANCE {
                world.add(Sphere::new(center, 0.2, Arc::new(random_material(rng))));
            }
        }
    }

    world.add(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::dielectric(1.5)),
    ));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::lambertian(Color::new(0.4, 0.2, 0.1))),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    world
}

/// 80% diffuse, 15% metal, 5% glass.
fn random_material(rng: &mut impl Rng) -> Material {
    let choose: f32 = rng.gen();
    if choose < 0.8 {
        let mut channel = || rng.gen::<f32>() * rng.gen::<f32>();
        let albedo = Color::new(channel(), channel(), channel());
        Material::lambertian(albedo)
    } else if choose < 0.95 {
        let mut channel = || 0.5 * (1.0 + rng.gen::<f32>());
        let albedo = Color::new(channel(), channel(), channel());
        Material::metal(albedo, 0.5 * rng.gen::<f32>())
    } else {
        Material::dielectric(1.5)
    }
}
