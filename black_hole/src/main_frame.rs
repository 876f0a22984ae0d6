//! Offline black hole frame renderer
//!
//! Traces a single frame without opening a window and writes it as PNG.
//!
//! Usage:
//!   black_hole_frame [--width N] [--height N] [--mass M] [--fov DEG]
//!                    [--camera X,Y,Z] [--target X,Y,Z] [--workers N]
//!                    [--output FILE]

use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use black_hole::{to_rgba8, FrameConfig, ParallelFrameRenderer, Scene};
use common::CameraFrame;
use glam::Vec3;
use image::{ImageBuffer, Rgb};

#[derive(Debug, Clone)]
struct RenderParams {
    width: u32,
    height: u32,
    mass: f32,
    fov_degrees: f32,
    camera: Vec3,
    target: Vec3,
    workers: Option<usize>,
    output: String,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            mass: 1.0,
            fov_degrees: 45.0,
            camera: Vec3::new(0.0, 7.0, 7.0),
            target: Vec3::ZERO,
            workers: None,
            output: String::from("black_hole.png"),
        }
    }
}

fn parse_vec3(text: &str) -> Result<Vec3> {
    let parts = text
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid vector '{}'", text))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => bail!("expected three comma-separated components, got '{}'", text),
    }
}

fn parse_args(args: &[String]) -> Result<RenderParams> {
    let mut params = RenderParams::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args
            .get(i + 1)
            .ok_or_else(|| anyhow!("missing value for {}", flag))?;

        match flag {
            "--width" => params.width = value.parse().context("--width")?,
            "--height" => params.height = value.parse().context("--height")?,
            "--mass" => params.mass = value.parse().context("--mass")?,
            "--fov" => params.fov_degrees = value.parse().context("--fov")?,
            "--camera" => params.camera = parse_vec3(value)?,
            "--target" => params.target = parse_vec3(value)?,
            "--workers" => params.workers = Some(value.parse().context("--workers")?),
            "--output" => params.output = value.clone(),
            other => bail!("unknown argument {}", other),
        }
        i += 2;
    }

    if params.mass <= 0.0 {
        bail!("--mass must be positive");
    }
    if params.camera == params.target {
        bail!("camera and target must differ");
    }
    Ok(params)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let params = parse_args(&args)?;

    // Looking straight along the world up would leave the basis undefined
    let view = (params.target - params.camera).normalize();
    let world_up = if view.cross(Vec3::Y).length() < 1e-4 { Vec3::Z } else { Vec3::Y };
    let camera = CameraFrame::look_at(params.camera, params.target, world_up, params.fov_degrees.to_radians());

    let frame = FrameConfig::new(camera, params.width, params.height, Scene::schwarzschild(params.mass));
    let renderer = match params.workers {
        Some(n) => ParallelFrameRenderer::with_workers(n),
        None => ParallelFrameRenderer::new(),
    };

    log::info!(
        "Rendering {}x{} (mass {}, {} workers)",
        frame.width,
        frame.height,
        params.mass,
        renderer.workers()
    );
    let start = Instant::now();
    let framebuffer = renderer.render(&frame)?;
    log::info!("Traced in {:.2?}", start.elapsed());

    let mut img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(frame.width, frame.height);
    for (i, color) in framebuffer.iter().enumerate() {
        let x = i as u32 % frame.width;
        let y = i as u32 / frame.width;
        let [r, g, b, _] = to_rgba8(*color);
        img.put_pixel(x, y, Rgb([r, g, b]));
    }

    img.save(&params.output)
        .with_context(|| format!("failed to write {}", params.output))?;
    log::info!("Saved {}", params.output);

    Ok(())
}
