mod input;
mod overlay;
mod state;

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{WindowAttributes, WindowId},
};

use fbm_terrain::terrain::TerrainSettings;

pub use state::AppState;

/// Configuration for the app from CLI arguments.
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub terrain: TerrainSettings,
    /// Attach the parameter overlay.
    pub overlay: bool,
}

pub struct App {
    pub state: Option<AppState>,
    pub config: AppConfig,
    /// Set when startup failed; the loop exits without rendering.
    pub init_error: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: None,
            config,
            init_error: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState> {
        use anyhow::Context;

        let window = Arc::new(
            event_loop
                .create_window(
                    WindowAttributes::default()
                        .with_title("fBm terrain")
                        .with_inner_size(PhysicalSize::new(self.config.width, self.config.height)),
                )
                .context("failed to create window")?,
        );

        pollster::block_on(AppState::new(window, &self.config))
            .context("failed to initialize renderer")
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.init_error.is_some() {
            return;
        }

        match self.init(event_loop) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("Fatal: {:#}", e);
                self.init_error = Some(e);
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
        let state = match &mut self.state {
            Some(s) => s,
            None => return,
        };

        let consumed = input::route_event(
            state.overlay.as_deref_mut(),
            &event,
            &mut state.camera_controller,
            &mut state.camera,
        );

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => state.resize(new_size),
            WindowEvent::RedrawRequested => {
                if !state.render() {
                    event_loop.exit();
                }
            }
            WindowEvent::KeyboardInput { event, .. } if !consumed => {
                if event.state == ElementState::Pressed && !event.repeat {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::KeyW) => state.toggle_wireframe(),
                        PhysicalKey::Code(KeyCode::KeyF) => state.toggle_fullscreen(),
                        PhysicalKey::Code(KeyCode::KeyP) => state.request_capture(),
                        PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.take() {
            state.teardown();
        }
    }
}
