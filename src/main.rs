//! Gearfolio - animated gear backdrop with a project model viewer
//!
//! Gears, scattered primitive shapes and a hovering drone animate behind
//! everything; `V` opens a viewer for a glTF model.

use std::time::Instant;

use glam::Vec3;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use gearfolio::config::AppConfig;
use gearfolio::input::{InputAction, InputMapper};
use gearfolio::scene::configured_scene;
use gearfolio::systems::{BackdropSystem, RenderSystem, TitleStatus, ViewerSystem, WindowSystem};
use gearfolio_core::SceneBuildError;
use gearfolio_input::OrbitController;
use gearfolio_render::{OrbitCamera, RenderError};

/// Main application state
struct App {
    config: AppConfig,
    window: Option<WindowSystem>,
    render: Option<RenderSystem>,
    backdrop: BackdropSystem,
    viewer: ViewerSystem,
    camera: OrbitCamera,
    start_camera: OrbitCamera,
    controller: OrbitController,
    frame_start: Instant,
    frame_ms: f32,
}

impl App {
    fn new(config: AppConfig) -> Result<Self, SceneBuildError> {
        let scene = configured_scene(&config.backdrop);
        let backdrop = BackdropSystem::new_or_showcase(&scene, &config.backdrop)?;

        let cam = &config.camera;
        let eye = scene.camera_position.unwrap_or(cam.start_position);
        let camera = OrbitCamera::looking_at(Vec3::from(eye), Vec3::from(cam.target))
            .with_projection(cam.fov, cam.near, cam.far)
            .with_distance_limits(cam.min_distance, cam.max_distance);

        let input = &config.input;
        let mut controller = OrbitController::new()
            .with_rotate_sensitivity(input.rotate_sensitivity)
            .with_zoom_sensitivity(input.zoom_sensitivity)
            .with_auto_rotate(input.auto_rotate_speed, input.auto_rotate_delay)
            .with_smoothing(input.smoothing_enabled);
        controller.smoothing_half_life = input.smoothing_half_life;

        let mut viewer = ViewerSystem::new(config.viewer.clone());
        *viewer.camera_mut() = viewer.camera().clone().with_projection(cam.fov, cam.near, cam.far);

        Ok(Self {
            window: None,
            render: None,
            backdrop,
            viewer,
            start_camera: camera.clone(),
            camera,
            controller,
            frame_start: Instant::now(),
            frame_ms: 0.0,
            config,
        })
    }

    /// Create window and GPU resources; false on a fatal error
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let window = match WindowSystem::create(event_loop, &self.config.window) {
            Ok(window) => window,
            Err(e) => {
                log::error!("{}", e);
                return false;
            }
        };

        let mut render = match RenderSystem::new(
            window.window().clone(),
            self.config.rendering.clone(),
            self.config.window.vsync,
        ) {
            Ok(render) => render,
            Err(e) => {
                log::error!("{}", e);
                return false;
            }
        };

        if let Err(e) = render.upload_backdrop(self.backdrop.backdrop()) {
            log::error!("Failed to upload backdrop: {}", e);
            return false;
        }
        self.backdrop.attach();

        if self.config.viewer.open_on_start {
            self.viewer.open();
        }

        self.window = Some(window);
        self.render = Some(render);
        true
    }

    /// Release everything that references GPU or loader state, then exit
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.backdrop.detach();
        self.viewer.close();
        self.render = None;
        event_loop.exit();
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::ToggleViewer => {
                self.viewer.toggle();
            }
            InputAction::CloseViewer => self.viewer.close(),
            InputAction::Exit => self.shutdown(event_loop),
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    window.toggle_fullscreen();
                }
            }
            InputAction::TogglePause => {
                self.backdrop.toggle_pause();
            }
            InputAction::ResetCamera => {
                self.camera = self.start_camera.clone();
                log::info!("Camera reset to starting position");
            }
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let frame_ms = (now - self.frame_start).as_secs_f32() * 1000.0;
        self.frame_ms += (frame_ms - self.frame_ms) * 0.1;
        self.frame_start = now;

        // 1. Animate the backdrop
        let dt = self.backdrop.update();

        // 2. Orbit input drives whichever camera is in front
        if self.viewer.is_open() {
            self.controller.update(self.viewer.camera_mut(), dt);
        } else {
            self.controller.update(&mut self.camera, dt);
        }

        // 3. Viewer: collect loads, spin
        let model_changed = self.viewer.poll();
        self.viewer.update(dt);

        // 4. Upload and draw
        if let Some(render) = &mut self.render {
            if let Err(e) = render.sync_backdrop(self.backdrop.backdrop_mut()) {
                log::warn!("Backdrop upload failed: {}", e);
            }

            if model_changed {
                if let Err(e) = render.set_viewer_model(self.viewer.model().map(|m| m.as_ref())) {
                    log::warn!("Model upload failed: {}", e);
                }
            }
            if let Some(model) = self.viewer.model() {
                if let Err(e) = render.write_viewer_instances(model, &self.viewer.instances()) {
                    log::warn!("Model instance upload failed: {}", e);
                }
            }

            let viewer_camera = self.viewer.is_open().then(|| self.viewer.camera());
            match render.render_frame(&self.camera, viewer_camera) {
                Ok(()) => {}
                Err(RenderError::SurfaceLost) => render.reconfigure(),
                Err(RenderError::OutOfMemory) => {
                    log::error!("GPU out of memory");
                    self.shutdown(event_loop);
                    return;
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        // 5. Title shows the viewer placeholder
        if let Some(window) = &mut self.window {
            let stats = self
                .config
                .debug
                .show_stats
                .then(|| (self.frame_ms, self.backdrop.backdrop().instance_count()));
            window.update_title(&TitleStatus {
                placeholder: self.viewer.placeholder(),
                viewer_open: self.viewer.is_open(),
                paused: self.backdrop.clock().is_paused(),
                stats,
            });
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() && !self.init_graphics(event_loop) {
            self.shutdown(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(size) => {
                if let Some(render) = &mut self.render {
                    render.resize(size.width, size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match InputMapper::map_keyboard(key, event.state, self.viewer.is_open()) {
                        Some(action) => self.handle_action(action, event_loop),
                        None => {
                            self.controller.process_keyboard(key, event.state);
                        }
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.controller.process_mouse_button(button, state);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.controller.process_scroll(delta);
            }

            WindowEvent::Focused(false) => {
                // A release outside the window never arrives
                self.controller.process_mouse_button(winit::event::MouseButton::Left, ElementState::Released);
            }

            WindowEvent::RedrawRequested => self.frame(event_loop),

            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.controller.process_mouse_motion(delta.0, delta.1);
        }
    }
}

fn main() {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    // RUST_LOG takes precedence over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.debug.log_level)).init();
    log::info!("Starting Gearfolio");

    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to build backdrop: {}", e);
            std::process::exit(1);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
}
