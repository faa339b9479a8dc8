//! Worker dispatch and pixel collection.
//!
//! The image is split across K workers by strided interleaving: worker `k`
//! owns global pixels `k, k + K, k + 2K, ...`. Each worker renders its
//! pixels in order and hands them over through its own one-slot channel.
//! The collector polls every unfinished worker without blocking and writes
//! each received pixel at that worker's next expected index.

use std::thread::{self, ScopedJoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use lumen_core::Scene;
use lumen_math::{Color, VectorBackend};

use crate::camera::CameraSampler;
use crate::shading::Tracer;
use crate::{FrameBuffer, RenderConfig, RenderError, RenderResult, ShadingModel};

/// Pixels owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerAssignment {
    pub worker: usize,
    pub worker_count: usize,
    /// Number of pixels this worker renders
    pub pixel_count: usize,
}

impl WorkerAssignment {
    /// Global pixel index of this worker's `local`-th pixel.
    #[inline]
    pub fn global_index(&self, local: usize) -> usize {
        local * self.worker_count + self.worker
    }

    /// Global pixel indices in render order.
    pub fn pixels(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.pixel_count).map(|i| self.global_index(i))
    }
}

/// Split `total` pixels across `workers` workers.
///
/// The first `total % workers` workers get one extra pixel, so counts
/// differ by at most one and sum to `total`.
pub fn partition(total: usize, workers: usize) -> Vec<WorkerAssignment> {
    if workers == 0 {
        return Vec::new();
    }
    let base = total / workers;
    let extra = total % workers;

    (0..workers)
        .map(|k| WorkerAssignment {
            worker: k,
            worker_count: workers,
            pixel_count: base + usize::from(k < extra),
        })
        .collect()
}

/// Computes the final color of one pixel.
///
/// Implementations are shared by reference across all workers.
pub trait PixelRenderer: Sync {
    fn render_pixel(&self, x: u32, y: u32) -> Color;
}

/// The ray tracing pipeline: sampler, then tracer, then box filter.
pub struct SceneRenderer<'a, V: VectorBackend> {
    scene: &'a Scene<V>,
    sampler: CameraSampler<V>,
    max_depth: u32,
    shading: ShadingModel,
}

impl<'a, V: VectorBackend> SceneRenderer<'a, V> {
    pub fn new(scene: &'a Scene<V>, config: &RenderConfig) -> Self {
        Self {
            scene,
            sampler: CameraSampler::new(&scene.camera, config),
            max_depth: config.max_depth,
            shading: config.shading,
        }
    }
}

impl<V: VectorBackend> PixelRenderer for SceneRenderer<'_, V> {
    fn render_pixel(&self, x: u32, y: u32) -> Color {
        let tracer = Tracer::new(self.scene, self.max_depth).with_model(self.shading);
        let samples: Vec<Color> = self.sampler.pixel_rays(x, y).map(|ray| tracer.trace(&ray)).collect();
        Color::average(&samples)
    }
}

/// Runs a [`PixelRenderer`] over a whole image on a pool of threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatcher {
    width: u32,
    height: u32,
    worker_count: usize,
}

struct Worker<'scope> {
    assignment: WorkerAssignment,
    receiver: Receiver<u32>,
    handle: ScopedJoinHandle<'scope, ()>,
    delivered: usize,
}

impl Dispatcher {
    pub fn new(width: u32, height: u32, worker_count: usize) -> Self {
        Self {
            width,
            height,
            worker_count: worker_count.max(1),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.image_width, config.image_height, config.worker_count)
    }

    /// Render every pixel exactly once and return the packed image.
    pub fn run<R: PixelRenderer>(&self, renderer: &R) -> RenderResult<FrameBuffer> {
        let total = self.width as usize * self.height as usize;
        let width = self.width;
        let mut frame = FrameBuffer::new(self.width, self.height);

        thread::scope(|scope| -> RenderResult<()> {
            let mut workers = Vec::with_capacity(self.worker_count);

            for assignment in partition(total, self.worker_count) {
                if assignment.pixel_count == 0 {
                    continue;
                }
                let (sender, receiver) = bounded(1);
                let spawned = thread::Builder::new()
                    .name(format!("lumen-worker-{}", assignment.worker))
                    .spawn_scoped(scope, move || worker_loop(renderer, assignment, width, sender));

                match spawned {
                    Ok(handle) => workers.push(Worker {
                        assignment,
                        receiver,
                        handle,
                        delivered: 0,
                    }),
                    Err(source) => {
                        log::error!("Failed to spawn worker {}: {source}", assignment.worker);
                        // Earlier workers are stopped before the error surfaces
                        let _ = teardown(workers);
                        return Err(RenderError::WorkerSpawn {
                            worker: assignment.worker,
                            source,
                        });
                    }
                }
            }

            log::debug!("Spawned {} render workers", workers.len());

            let collected = collect(&mut workers, &mut frame);
            let joined = teardown(workers);
            joined?;
            collected
        })?;

        Ok(frame)
    }
}

fn worker_loop<R: PixelRenderer>(renderer: &R, assignment: WorkerAssignment, width: u32, sender: Sender<u32>) {
    for index in assignment.pixels() {
        let x = (index % width as usize) as u32;
        let y = (index / width as usize) as u32;
        let argb = renderer.render_pixel(x, y).to_argb();

        // Blocks until the collector has taken the previous pixel
        if sender.send(argb).is_err() {
            log::debug!("Worker {} stopping: collector hung up", assignment.worker);
            return;
        }
    }
    log::debug!("Worker {} rendered {} pixels", assignment.worker, assignment.pixel_count);
}

/// Poll workers until each has delivered its full assignment.
fn collect(workers: &mut [Worker<'_>], frame: &mut FrameBuffer) -> RenderResult<()> {
    let mut active: Vec<usize> = (0..workers.len()).collect();

    while !active.is_empty() {
        let mut progressed = false;

        for &slot in &active {
            let worker = &mut workers[slot];
            match worker.receiver.try_recv() {
                Ok(argb) => {
                    let index = worker.assignment.global_index(worker.delivered);
                    frame.write_once(index, argb)?;
                    worker.delivered += 1;
                    progressed = true;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    return Err(RenderError::WorkerDisconnected {
                        worker: worker.assignment.worker,
                        delivered: worker.delivered,
                        expected: worker.assignment.pixel_count,
                    });
                }
            }
        }

        active.retain(|&slot| workers[slot].delivered < workers[slot].assignment.pixel_count);

        if !progressed {
            thread::yield_now();
        }
    }

    Ok(())
}

/// Hang up on every worker and join it.
fn teardown(workers: Vec<Worker<'_>>) -> RenderResult<()> {
    let mut result = Ok(());

    for Worker {
        assignment,
        receiver,
        handle,
        ..
    } in workers
    {
        // A worker blocked in `send` wakes up with an error once its
        // receiver is gone.
        drop(receiver);
        if handle.join().is_err() {
            log::error!("Render worker {} panicked", assignment.worker);
            if result.is_ok() {
                result = Err(RenderError::WorkerPanicked {
                    worker: assignment.worker,
                });
            }
        }
    }

    result
}

/// Render `scene` with the settings in `config`.
///
/// The scene is only ever borrowed immutably.
pub fn render<V: VectorBackend>(scene: &Scene<V>, config: &RenderConfig) -> RenderResult<FrameBuffer> {
    config.validate()?;

    let renderer = SceneRenderer::new(scene, config);
    let dispatcher = Dispatcher::from_config(config);

    log::info!(
        "Rendering {}x{} ({} pixels) on {} workers ({} samples/pixel, max depth {}, {:?})",
        config.image_width,
        config.image_height,
        config.pixel_count(),
        config.worker_count,
        renderer.sampler.samples_per_pixel(),
        config.max_depth,
        config.shading,
    );

    let start = Instant::now();
    let frame = dispatcher.run(&renderer)?;
    log::info!("Render complete in {:.2?}", start.elapsed());

    Ok(frame)
}
