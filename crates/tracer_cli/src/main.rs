use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracer_math::Vec3;
use tracer_renderer::{
    render, CameraSettings, ImageBuffer, RenderConfig, RenderStats, Scene,
};

mod scene;

/// Render the random spheres scene to a PNG file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image width in pixels.
    #[arg(long, value_name = "PIXELS")]
    width: Option<u32>,

    /// Image height in pixels.
    #[arg(long, value_name = "PIXELS")]
    height: Option<u32>,

    /// Samples per pixel.
    #[arg(long, short = 's', value_name = "NUM")]
    samples: Option<u32>,

    /// Maximum number of bounces per path.
    #[arg(long, value_name = "NUM")]
    max_depth: Option<u32>,

    /// Worker threads; 0 uses every available CPU.
    #[arg(long = "nthreads", short = 't', value_name = "NUM")]
    threads: Option<usize>,

    /// Size in pixels of the square tiles handed to each worker.
    #[arg(long, value_name = "NUM")]
    tile_size: Option<u32>,

    /// Seed for both the scene layout and the sample streams.
    #[arg(long, value_name = "NUM")]
    seed: Option<u64>,

    /// JSON file with `render` and `camera` sections; flags override it.
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Trace against a flat primitive list instead of a BVH.
    #[arg(long)]
    flat: bool,

    /// Write the final image to the given filename.
    #[arg(long = "out", short = 'o', value_name = "FILE", default_value = "image.png")]
    out: PathBuf,
}

/// Settings loaded from `--config`.
///
/// The camera section is kept as raw fields so that a partial section is
/// layered over [`default_camera`] rather than over the bare defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    render: RenderConfig,
    camera: Map<String, Value>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// The demo camera with any fields from the file's camera section applied.
    fn camera_settings(&self) -> Result<CameraSettings> {
        let mut merged = serde_json::to_value(default_camera())?;
        if let Value::Object(fields) = &mut merged {
            fields.extend(self.camera.clone());
        }
        serde_json::from_value(merged).context("Invalid camera section in config file")
    }
}

impl Args {
    /// Apply command-line overrides on top of the file settings.
    fn render_config(&self, mut config: RenderConfig) -> RenderConfig {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(samples) = self.samples {
            config.samples_per_pixel = samples;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(threads) = self.threads {
            config.workers = threads;
        }
        if let Some(tile_size) = self.tile_size {
            config.tile_size = tile_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

/// Camera framing the random spheres scene.
fn default_camera() -> CameraSettings {
    CameraSettings::default()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0)
}

fn save_png(image: &ImageBuffer, path: &Path) -> Result<()> {
    let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8())
        .context("Image buffer does not match its dimensions")?;
    rgb.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let config = args.render_config(file.render.clone());
    config.validate().context("Invalid render settings")?;

    let camera = file
        .camera_settings()?
        .with_aspect_ratio(config.aspect_ratio())
        .build();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let primitives = scene::random_scene(&mut rng);
    log::info!("Generated scene with {} spheres", primitives.len());

    let world = if args.flat {
        Scene::flat(primitives)
    } else {
        Scene::with_bvh(primitives).context("Failed to build BVH")?
    };

    let mut image = ImageBuffer::new(config.width, config.height);
    let RenderStats { elapsed, .. } =
        render(&camera, &world, &config, &mut image).context("Render failed")?;

    save_png(&image, &args.out)?;
    log::info!("Wrote {} in {:.2}s", args.out.display(), elapsed.as_secs_f64());

    Ok(())
}
