use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use stereoview_assets::{CubemapFaces, ModelData};
use stereoview_common::StereoConfig;
use stereoview_input::{Action, InputState, Key, map_actions};
use stereoview_render::{FlyCamera, SplitLayout, StereoFrame};
use stereoview_render_wgpu::{StereoRenderer, request_device};
use stereoview_tools::FrameTimer;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

/// Longest frame step fed to camera movement.
const MAX_FRAME_DT: f32 = 0.1;
/// Pixel-precise scroll deltas are converted to lines at this rate.
const PIXELS_PER_LINE: f64 = 20.0;

#[derive(Parser)]
#[command(name = "stereoview-desktop", about = "Side-by-side stereo viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OBJ model to place in the scene
    #[arg(long)]
    model: Option<PathBuf>,

    /// Directory holding the six skybox faces
    #[arg(long)]
    skybox: Option<PathBuf>,

    /// Half the distance between the eyes, in world units
    #[arg(long)]
    separation: Option<f32>,

    /// Width of one eye's viewport
    #[arg(long)]
    width: Option<u32>,

    /// Window height
    #[arg(long)]
    height: Option<u32>,

    /// Show the statistics overlay at startup
    #[arg(long)]
    hud: bool,
}

impl Cli {
    fn load_config(&self) -> Result<StereoConfig> {
        let mut config = match &self.config {
            Some(path) => StereoConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => StereoConfig::default(),
        };

        if let Some(model) = &self.model {
            config.scene.model = model.clone();
        }
        if let Some(skybox) = &self.skybox {
            config.scene.skybox_dir = skybox.clone();
        }
        if let Some(separation) = self.separation {
            config.projection.half_separation = separation;
        }
        if let Some(width) = self.width {
            config.window.eye_width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        config.show_hud |= self.hud;

        config.validate()?;
        Ok(config)
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::Space => Key::Space,
        KeyCode::ControlLeft => Key::LeftCtrl,
        KeyCode::Escape => Key::Escape,
        KeyCode::F1 => Key::F1,
        _ => return None,
    })
}

/// Viewer state that lives independently of the GPU.
struct AppState {
    config: StereoConfig,
    camera: FlyCamera,
    input: InputState,
    timer: FrameTimer,
    start: Instant,
    /// Seconds since start at the last frame tick.
    time: f32,
    focused: bool,
    show_hud: bool,
}

impl AppState {
    fn new(config: StereoConfig) -> Self {
        Self {
            camera: FlyCamera::from_config(&config.camera),
            input: InputState::new(),
            timer: FrameTimer::default(),
            start: Instant::now(),
            time: 0.0,
            focused: true,
            show_hud: config.show_hud,
            config,
        }
    }

    /// Apply this frame's input. Returns `false` when the viewer should quit.
    fn update(&mut self, dt: f32) -> bool {
        for action in map_actions(&self.input, dt) {
            match action {
                Action::Quit => return false,
                Action::Move(direction, dt) => self.camera.process_keyboard(direction, dt),
                Action::Look { dx, dy } => self.camera.process_mouse_movement(dx, dy),
                Action::Zoom(dy) => self.camera.process_mouse_scroll(dy),
                Action::ToggleHud => self.show_hud = !self.show_hud,
            }
        }
        self.input.end_frame();
        true
    }

    fn frame(&self, aspect: f32) -> StereoFrame {
        StereoFrame::build(
            &self.camera,
            &self.config.projection,
            aspect,
            self.time,
            &self.config.scene.placements,
            &self.config.light,
        )
    }

    fn draw_hud(&self, ctx: &EguiContext) {
        egui::SidePanel::left("hud")
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading("Stereo");
                match self.timer.last_report() {
                    Some(report) => ui.label(format!(
                        "{:.2} ms/frame ({:.0} fps)",
                        report.average_ms,
                        report.fps()
                    )),
                    None => ui.label("measuring..."),
                };

                ui.separator();
                let p = self.camera.position;
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!(
                    "Yaw {:.1}  Pitch {:.1}",
                    self.camera.yaw(),
                    self.camera.pitch()
                ));
                ui.label(format!("FOV {:.1}", self.camera.zoom()));
                ui.label(format!(
                    "Eye separation {:.4}",
                    2.0 * self.config.projection.half_separation
                ));

                ui.separator();
                ui.small("WASD/Space/Ctrl: Move | Mouse: Look | Scroll: Zoom");
                ui.small("F1: Toggle HUD | Esc: Quit");
            });
    }
}

/// Window, surface and everything that renders into it.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: StereoRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        config: &StereoConfig,
        egui_ctx: &EguiContext,
    ) -> Result<Self> {
        let (width, height) = config.window.window_size();
        let attrs = Window::default_attributes()
            .with_title(&config.window.title)
            .with_inner_size(PhysicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let (adapter, device, queue) = request_device(&instance, Some(&surface))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no supported formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if config.window.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let mut renderer = StereoRenderer::new(
            &device,
            surface_format,
            SplitLayout::new(surface_config.width, surface_config.height),
            config.reallocate_on_resize,
        );
        renderer.set_skybox(
            &device,
            &queue,
            &CubemapFaces::load(&config.scene.skybox_faces()),
        );
        match ModelData::load_obj(&config.scene.model) {
            Ok(model) => renderer.set_model(&device, &queue, &model),
            Err(e) => tracing::error!("model unavailable, rendering skybox only: {e}"),
        }

        if config.window.capture_cursor {
            if let Err(e) = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
            {
                tracing::warn!("could not capture cursor: {e}");
            }
            window.set_cursor_visible(false);
        }

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            width = surface_config.width,
            height = surface_config.height,
            format = ?surface_format,
            "window ready"
        );
        Ok(Self {
            window,
            surface,
            device,
            queue,
            config: surface_config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
        tracing::debug!(
            width = self.config.width,
            height = self.config.height,
            "window resized"
        );
    }

    /// Draw an egui overlay on top of the composited frame.
    fn draw_overlay(
        &mut self,
        ctx: &EguiContext,
        view: &wgpu::TextureView,
        run_ui: impl FnMut(&EguiContext),
    ) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = ctx.run(raw_input, run_ui);
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct GpuApp {
    state: AppState,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
    /// Startup failure, returned from `main` once the event loop exits.
    error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: StereoConfig) -> Self {
        Self {
            state: AppState::new(config),
            egui_ctx: EguiContext::default(),
            gpu: None,
            error: None,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.state.start.elapsed().as_secs_f64();
        let tick = self.state.timer.tick(now);
        if let Some(report) = tick.report {
            tracing::info!(
                frame_time_ms = report.average_ms,
                frames = report.frames,
                "frame time"
            );
        }
        self.state.time = now as f32;

        let dt = (tick.delta as f32).min(MAX_FRAME_DT);
        if !self.state.update(dt) {
            tracing::info!("quit requested");
            event_loop.exit();
            return;
        }

        let Self {
            state,
            egui_ctx,
            gpu,
            ..
        } = self;
        let Some(gpu) = gpu.as_mut() else {
            return;
        };

        let frame = state.frame(gpu.renderer.eye_aspect());
        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(&gpu.device, &gpu.queue, &view, &frame);
        if state.show_hud {
            gpu.draw_overlay(egui_ctx, &view, |ctx| state.draw_hud(ctx));
        }
        output.present();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.error.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.state.config, &self.egui_ctx) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.state.show_hud {
            if let Some(gpu) = &mut self.gpu {
                if gpu.egui_winit.on_window_event(&gpu.window, &event).consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
            }
            WindowEvent::Focused(focused) => {
                self.state.focused = focused;
                if !focused {
                    self.state.input.release_all();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    self.state
                        .input
                        .key(key, key_state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                };
                self.state.input.scroll(lines);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.focused {
                self.state
                    .input
                    .mouse_motion(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.load_config()?;
    tracing::info!(
        model = %config.scene.model.display(),
        skybox = %config.scene.skybox_dir.display(),
        "stereoview-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e.context("failed to initialize the renderer")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_are_mapped() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::ControlLeft), Some(Key::LeftCtrl));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn escape_stops_before_moving() {
        let mut state = AppState::new(StereoConfig::default());
        let start = state.camera.position;
        state.input.key(Key::W, true);
        state.input.key(Key::Escape, true);
        assert!(!state.update(0.05));
        assert_eq!(state.camera.position, start);
    }

    #[test]
    fn update_moves_camera_and_toggles_hud() {
        let mut state = AppState::new(StereoConfig::default());
        let start = state.camera.position;
        state.input.key(Key::W, true);
        state.input.key(Key::F1, true);
        assert!(state.update(0.1));
        assert_ne!(state.camera.position, start);
        assert!(state.show_hud);

        // F1 is one-shot; holding it does not toggle again.
        assert!(state.update(0.1));
        assert!(state.show_hud);
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "stereoview-desktop",
            "--separation",
            "0.05",
            "--width",
            "640",
            "--hud",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.projection.half_separation, 0.05);
        assert_eq!(config.window.window_size(), (1280, 600));
        assert!(config.show_hud);
    }
}
