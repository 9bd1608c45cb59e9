//! Parallel tile scheduler.
//!
//! Tiles go into a closed work queue; a fixed pool of workers drains it,
//! each with its own random number generator. Finished tiles travel back
//! over a result channel and only the calling thread touches the sink, so
//! every pixel is written exactly once without locking.

use crate::bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
use crate::renderer::{RenderError, RenderResult};
use crate::{Camera, Hittable, PixelSink, RenderConfig};
use crossbeam_channel::unbounded;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Summary of a finished render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub tiles: usize,
    pub workers: usize,
    pub pixels: u64,
    pub samples: u64,
    pub elapsed: Duration,
}

/// Seed for the random stream of one tile.
///
/// Depends only on the base seed and the tile, so the image does not depend
/// on which worker picks the tile up or in what order.
pub fn tile_seed(seed: u64, tile_index: usize) -> u64 {
    seed ^ (tile_index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Render the whole image into `sink` using `config.worker_count()` threads.
pub fn render<S: PixelSink + ?Sized>(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    sink: &mut S,
) -> RenderResult<RenderStats> {
    config.validate()?;

    let start = Instant::now();
    let workers = config.worker_count();
    let buckets = generate_buckets(config.width, config.height, config.tile_size);
    let tiles = buckets.len();

    // Fill and close the queue up front; workers stop once it is drained
    let (work_tx, work_rx) = unbounded::<Bucket>();
    for bucket in buckets {
        work_tx.send(bucket).map_err(|_| RenderError::QueueClosed)?;
    }
    drop(work_tx);

    let (result_tx, result_rx) = unbounded::<BucketResult>();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("tracer-worker-{i}"))
        .build()?;

    log::info!(
        "Rendering {}x{} @ {} spp: {} tiles on {} workers",
        config.width,
        config.height,
        config.samples_per_pixel,
        tiles,
        workers
    );

    let mut pixels = 0u64;
    pool.in_place_scope(|scope| {
        for worker in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();

            scope.spawn(move |_| {
                let mut rendered = 0usize;
                for bucket in work_rx.iter() {
                    let mut rng = StdRng::seed_from_u64(tile_seed(config.seed, bucket.index));
                    let colors = render_bucket(&bucket, camera, world, config, &mut rng);
                    rendered += 1;

                    if result_tx.send(BucketResult::new(bucket, colors)).is_err() {
                        break;
                    }
                }
                log::debug!("worker {worker} finished after {rendered} tiles");
            });
        }
        // Only worker-held senders remain, so the loop below ends with the last tile
        drop(result_tx);

        for result in result_rx.iter() {
            debug_assert_eq!(result.pixels.len(), result.bucket.pixel_count());
            for ((x, y), color) in result.bucket.pixels().zip(result.pixels) {
                sink.write_pixel(x, y, color);
                pixels += 1;
            }
        }
    });

    debug_assert_eq!(pixels, config.width as u64 * config.height as u64);

    let stats = RenderStats {
        tiles,
        workers,
        pixels,
        samples: pixels * config.samples_per_pixel as u64,
        elapsed: start.elapsed(),
    };
    log::info!(
        "Rendered {} pixels ({} samples) in {:?}",
        stats.pixels,
        stats.samples,
        stats.elapsed
    );
    Ok(stats)
}
