//! Whole-frame rendering across worker threads
//!
//! The image is split into contiguous column ranges, one per worker. Each
//! worker traces every pixel of its columns on a scoped thread; the strips
//! are written into disjoint slots of a row-major framebuffer once all
//! workers have joined.

use std::ops::Range;
use std::thread;
use std::time::Instant;

use common::CameraFrame;
use glam::Vec3;
use thiserror::Error;

use crate::config::{Scene, TraceSettings};
use crate::tracer::PixelTracer;

/// Reasons a frame cannot be rendered
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("image size {width}x{height} has no pixels")]
    EmptyImage { width: u32, height: u32 },
    #[error("sphere radius must be positive, got {0}")]
    SphereRadius(f32),
    #[error("field of view must lie in (0, pi), got {0}")]
    FieldOfView(f32),
    #[error("camera {0} is not finite")]
    Camera(&'static str),
}

/// Everything one frame needs, rebuilt by the caller every frame
#[derive(Debug, Clone, Copy)]
pub struct FrameConfig {
    pub camera: CameraFrame,
    pub width: u32,
    pub height: u32,
    pub scene: Scene,
    pub settings: TraceSettings,
}

impl FrameConfig {
    pub fn new(camera: CameraFrame, width: u32, height: u32, scene: Scene) -> Self {
        Self {
            camera,
            width,
            height,
            scene,
            settings: TraceSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        let radius = self.scene.sphere_radius;
        if radius.is_nan() || radius <= 0.0 {
            return Err(FrameError::SphereRadius(radius));
        }
        let fov = self.camera.fov;
        if fov.is_nan() || fov <= 0.0 || fov >= std::f32::consts::PI {
            return Err(FrameError::FieldOfView(fov));
        }

        let camera = &self.camera;
        for (name, v) in [
            ("position", camera.position),
            ("forward", camera.forward),
            ("right", camera.right),
            ("up", camera.up),
        ] {
            if !v.is_finite() {
                return Err(FrameError::Camera(name));
            }
        }
        Ok(())
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Split `width` columns into `workers` contiguous ranges.
///
/// Every range gets `width / workers` columns and the first
/// `width % workers` ranges take one extra. Ranges are returned in column
/// order; some are empty when there are more workers than columns.
pub fn column_ranges(width: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let per_worker = width / workers;
    let remainder = width % workers;

    (0..workers)
        .map(|i| {
            let start = i * per_worker + i.min(remainder);
            let end = start + per_worker + usize::from(i < remainder);
            start..end
        })
        .collect()
}

/// Traces full frames on a fixed number of workers
#[derive(Debug, Clone, Copy)]
pub struct ParallelFrameRenderer {
    workers: usize,
}

impl ParallelFrameRenderer {
    /// One worker per unit of available parallelism
    pub fn new() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_workers(workers)
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Render `frame` into a row-major buffer of `width * height` colors
    pub fn render(&self, frame: &FrameConfig) -> Result<Vec<Vec3>, FrameError> {
        frame.validate()?;

        let start = Instant::now();
        let width = frame.width as usize;
        let height = frame.height as usize;
        let ranges = column_ranges(width, self.workers);
        log::debug!("tracing {}x{} over {} column ranges", width, height, ranges.len());

        let tracer = PixelTracer::new(frame.scene, frame.settings);
        let mut framebuffer = vec![Vec3::ZERO; frame.pixel_count()];

        thread::scope(|scope| {
            let handles: Vec<_> = ranges
                .into_iter()
                .map(|columns| {
                    let tracer = &tracer;
                    scope.spawn(move || {
                        trace_columns(tracer, frame, columns.clone()).map(|strip| (columns, strip))
                    })
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(Some((columns, strip))) => write_strip(&mut framebuffer, width, columns, &strip),
                    Ok(None) => {}
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });

        log::debug!("frame traced in {:.1?}", start.elapsed());
        Ok(framebuffer)
    }
}

impl Default for ParallelFrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Trace a column range; the strip is column-major within the range
fn trace_columns(tracer: &PixelTracer, frame: &FrameConfig, columns: Range<usize>) -> Option<Vec<Vec3>> {
    if columns.is_empty() {
        return None;
    }

    let height = frame.height as usize;
    let mut strip = Vec::with_capacity(columns.len() * height);
    for col in columns {
        for row in 0..height {
            strip.push(tracer.pixel(col as u32, row as u32, frame.width, frame.height, &frame.camera));
        }
    }
    Some(strip)
}

fn write_strip(framebuffer: &mut [Vec3], width: usize, columns: Range<usize>, strip: &[Vec3]) {
    let height = framebuffer.len() / width;
    for (i, col) in columns.enumerate() {
        let column = &strip[i * height..(i + 1) * height];
        for (row, &color) in column.iter().enumerate() {
            framebuffer[row * width + col] = color;
        }
    }
}
