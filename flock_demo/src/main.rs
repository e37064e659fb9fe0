//! Flock demo - a few thousand boids simulated on the GPU and drawn as cubes
//!
//! Engine logs are forwarded to the `log` facade; set `RUST_LOG=debug` for
//! per-frame timings.

use flock_engine::flock::config::Config;
use flock_engine::flock::log::{LogEntry, LogSeverity, Logger};
use flock_engine::flock::scene::{ImageData, ImageFormat, MeshData, Scene};
use flock_engine::flock::{Engine, Result};
use flock_engine_renderer_vulkan::flock::{VulkanRenderer, COMPILED_SHADER_DIR};
use glam::{Vec2, Vec3};
use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Forwards engine log entries to the `log` facade
struct LogBridge;

impl Logger for LogBridge {
    fn log(&self, entry: &LogEntry) {
        let level = match entry.severity {
            LogSeverity::Trace => log::Level::Trace,
            LogSeverity::Debug => log::Level::Debug,
            LogSeverity::Info => log::Level::Info,
            LogSeverity::Warn => log::Level::Warn,
            LogSeverity::Error => log::Level::Error,
        };
        match (entry.file, entry.line) {
            (Some(file), Some(line)) => {
                log::log!(target: entry.source.as_str(), level, "{} ({}:{})", entry.message, file, line)
            }
            _ => log::log!(target: entry.source.as_str(), level, "{}", entry.message),
        }
    }
}

// ===== PROCEDURAL ASSETS =====

/// Unit cube with per-face normals and UVs
fn cube_mesh() -> Result<MeshData> {
    let faces = [
        (Vec3::X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::Z),
        (Vec3::Z, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y),
    ];
    let corners = [Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, up) in faces {
        let right = up.cross(normal);
        let base = positions.len() as u32;
        for corner in corners {
            positions.push((normal + right * corner.x + up * corner.y) * 0.5);
            normals.push(normal);
            uvs.push(Vec2::new(corner.x * 0.5 + 0.5, 0.5 - corner.y * 0.5));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    MeshData::from_streams(&positions, Some(&normals), Some(&uvs), None, indices)
}

fn checker_texture(size: u32, cell: u32) -> Result<ImageData> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let texel: [u8; 4] = if ((x / cell) + (y / cell)) % 2 == 0 {
                [236, 180, 64, 255]
            } else {
                [48, 64, 96, 255]
            };
            pixels.extend_from_slice(&texel);
        }
    }
    ImageData::new(pixels, size, size, ImageFormat::Rgba8Srgb, true)
}

/// Equirectangular gradient from horizon haze to zenith blue
fn sky_texture(width: u32, height: u32) -> Result<ImageData> {
    let zenith = Vec3::new(0.10, 0.22, 0.55);
    let horizon = Vec3::new(0.75, 0.82, 0.90);
    let ground = Vec3::new(0.18, 0.16, 0.14);

    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        // +1 at the top row, -1 at the bottom
        let elevation = 1.0 - 2.0 * (y as f32 + 0.5) / height as f32;
        let color = if elevation >= 0.0 {
            horizon.lerp(zenith, elevation.powf(0.6))
        } else {
            horizon.lerp(ground, (-elevation).powf(0.3))
        };
        let texel = [
            (color.x * 255.0) as u8,
            (color.y * 255.0) as u8,
            (color.z * 255.0) as u8,
            255,
        ];
        for _ in 0..width {
            pixels.extend_from_slice(&texel);
        }
    }
    ImageData::new(pixels, width, height, ImageFormat::Rgba8Unorm, false)
}

fn build_scene() -> Result<Scene> {
    let mut scene = Scene::new(cube_mesh()?);
    let checker = scene.textures.insert_with("checker", || checker_texture(256, 32))?;
    let sky = scene.textures.insert_with("sky", || sky_texture(512, 256))?;
    scene.material.albedo_texture = checker;
    scene.material.roughness = 0.6;
    scene.material.metalness = 0.0;
    scene.environment = Some(sky);
    Ok(scene)
}

// ===== APPLICATION =====

/// Field order matters: the renderer must drop before the window it presents to
#[derive(Default)]
struct App {
    renderer: Option<VulkanRenderer>,
    scene: Option<Scene>,
    window: Option<Window>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title("Flock")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = event_loop
            .create_window(window_attrs)
            .map_err(|e| flock_engine::flock::Error::InitializationFailed(format!("Window creation failed: {}", e)))?;

        let mut scene = build_scene()?;
        let config = Config {
            app_name: "Flock".to_string(),
            shader_dir: COMPILED_SHADER_DIR.into(),
            ..Config::default()
        };
        let size = window.inner_size();
        let renderer = VulkanRenderer::new(
            &window,
            flock_engine::flock::render::Extent2D::new(size.width, size.height),
            config,
            &mut scene,
        )?;

        info!("Simulating {} boids", scene.instance_count());
        self.renderer = Some(renderer);
        self.scene = Some(scene);
        self.window = Some(window);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(e) = renderer.wait_idle() {
                warn!("wait_idle during shutdown failed: {}", e);
            }
        }
        self.renderer = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            error!("Failed to initialize: {}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(renderer), Some(scene)) = (self.renderer.as_mut(), self.scene.as_mut()) else {
                    return;
                };
                match renderer.render_frame(scene) {
                    Ok(()) => {}
                    Err(e) if e.is_recoverable() => warn!("Frame skipped: {}", e),
                    Err(e) => {
                        error!("Fatal render error: {}", e);
                        self.shutdown(event_loop);
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Engine::set_logger(LogBridge);
    info!("Starting Flock");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Cannot create event loop: {}", e);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("Event loop terminated with an error: {}", e);
    }
}
