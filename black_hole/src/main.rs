//! Interactive black hole viewer
//!
//! Every frame is traced on the CPU across all cores and shown as a
//! full-window texture. The rays follow exact Schwarzschild photon orbits,
//! so the accretion disk appears lensed over and under the hole.
//!
//! Controls:
//! - Left mouse drag: Look around
//! - W/A/S/D: Move forward/left/back/right
//! - Space / Left Shift: Move up / down
//! - +/-: Adjust black hole mass
//! - R: Reset view

mod renderer;

use std::collections::HashSet;
use std::time::Instant;

use black_hole::{FrameConfig, ParallelFrameRenderer, Scene};
use common::{FlyCamera, GraphicsContext};
use renderer::FramePresenter;
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

/// Traced resolution, independent of the window size
const TRACE_WIDTH: u32 = 480;
const TRACE_HEIGHT: u32 = 270;

const MOVE_SPEED: f32 = 5.0;
const FPS_INTERVAL: f32 = 5.0;

struct App {
    ctx: GraphicsContext,
    presenter: FramePresenter,
    frame_renderer: ParallelFrameRenderer,
    camera: FlyCamera,
    mass: f32,
    keys_held: HashSet<KeyCode>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    fps_frames: u32,
    fps_since: Instant,
}

impl App {
    fn new(ctx: GraphicsContext) -> Self {
        let presenter = FramePresenter::new(&ctx, TRACE_WIDTH, TRACE_HEIGHT);
        let frame_renderer = ParallelFrameRenderer::new();
        log::info!("Tracing on {} worker threads", frame_renderer.workers());

        Self {
            ctx,
            presenter,
            frame_renderer,
            camera: FlyCamera::default(),
            mass: 1.0,
            keys_held: HashSet::new(),
            mouse_pressed: false,
            last_mouse_pos: None,
            fps_frames: 0,
            fps_since: Instant::now(),
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
    }

    fn update(&mut self, dt: f32) {
        let held = |key: KeyCode| self.keys_held.contains(&key);
        let axis = |pos: KeyCode, neg: KeyCode| (held(pos) as i32 - held(neg) as i32) as f32;

        let forward = axis(KeyCode::KeyW, KeyCode::KeyS);
        let right = axis(KeyCode::KeyD, KeyCode::KeyA);
        let vertical = axis(KeyCode::Space, KeyCode::ShiftLeft);
        if forward != 0.0 || right != 0.0 || vertical != 0.0 {
            self.camera.translate_local(forward, right, vertical, MOVE_SPEED * dt);
        }

        self.fps_frames += 1;
        let elapsed = self.fps_since.elapsed().as_secs_f32();
        if elapsed >= FPS_INTERVAL {
            log::info!("FPS: {:.1}", self.fps_frames as f32 / elapsed);
            self.fps_frames = 0;
            self.fps_since = Instant::now();
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = FrameConfig::new(
            self.camera.frame(),
            TRACE_WIDTH,
            TRACE_HEIGHT,
            Scene::schwarzschild(self.mass),
        );

        match self.frame_renderer.render(&frame) {
            Ok(framebuffer) => self.presenter.upload(
                &self.ctx.device,
                &self.ctx.queue,
                frame.width,
                frame.height,
                &framebuffer,
            ),
            Err(e) => log::error!("Skipping frame: {}", e),
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.presenter.render(&mut encoder, &view);

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            self.keys_held.remove(&key);
            return;
        }
        self.keys_held.insert(key);

        match key {
            KeyCode::KeyR => {
                self.camera = FlyCamera::default();
                self.mass = 1.0;
            }
            KeyCode::Equal | KeyCode::NumpadAdd => {
                self.mass *= 1.2;
                log::info!("Mass: {:.2}", self.mass);
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                self.mass = (self.mass / 1.2).max(0.1);
                log::info!("Mass: {:.2}", self.mass);
            }
            _ => {}
        }
    }

    fn handle_mouse_move(&mut self, x: f64, y: f64) {
        if self.mouse_pressed {
            if let Some((last_x, last_y)) = self.last_mouse_pos {
                self.camera.rotate((x - last_x) as f32, (y - last_y) as f32);
            }
            self.last_mouse_pos = Some((x, y));
        }
    }
}

fn main() {
    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        "Black Hole - Geodesic Ray Tracer",
        960,
        540,
    ));

    let mut app = App::new(ctx);
    let mut last_time = Instant::now();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => app.resize(size),
                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left {
                            app.mouse_pressed = state == ElementState::Pressed;
                            if !app.mouse_pressed {
                                app.last_mouse_pos = None;
                            }
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        app.handle_mouse_move(position.x, position.y);
                    }
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(key),
                                state,
                                ..
                            },
                        ..
                    } => app.handle_key(key, state),
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let dt = (now - last_time).as_secs_f32().min(0.1);
                        last_time = now;

                        app.update(dt);
                        match app.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                            Err(e) => log::error!("Render error: {:?}", e),
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    app.ctx.window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop error");
}
