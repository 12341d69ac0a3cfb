use std::path::PathBuf;
use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::{Fullscreen, Window};

use fbm_terrain::render::{
    capture, Camera, CameraController, FrameOptions, GpuContext, RenderError, Renderer,
    TerrainBuffers,
};
use fbm_terrain::terrain::TerrainScene;
use fbm_terrain::util::FpsCounter;

use super::overlay::{EguiOverlay, Overlay};
use super::AppConfig;

/// Everything the running demo owns. Dropped in order by [`AppState::teardown`].
pub struct AppState {
    pub window: Arc<Window>,
    pub gpu: GpuContext,
    pub renderer: Renderer,
    pub camera: Camera,
    pub camera_controller: CameraController,
    pub scene: TerrainScene<TerrainBuffers>,
    pub overlay: Option<Box<dyn Overlay>>,

    capture_requested: bool,
    capture_count: u32,
    fps: FpsCounter,
}

impl AppState {
    pub async fn new(window: Arc<Window>, config: &AppConfig) -> Result<Self, RenderError> {
        let gpu = GpuContext::new(window.clone()).await?;
        gpu.begin_error_scope();

        let buffers = TerrainBuffers::new(&gpu.device, &gpu.queue);
        let scene = TerrainScene::new(buffers, config.terrain);
        let renderer = Renderer::new(&gpu, scene.target());

        let overlay = config.overlay.then(|| {
            let overlay = EguiOverlay::new(window.clone(), &gpu.device, gpu.format);
            Box::new(overlay) as Box<dyn Overlay>
        });

        let mut camera = Camera::new();
        camera.set_aspect(gpu.aspect());

        gpu.check_errors("init");

        log::info!(
            "Ready: grid {}x{}, {} octaves",
            scene.grid_resolution(),
            scene.grid_resolution(),
            scene.octaves()
        );
        log::info!("  Left drag: orbit | Right drag: pan | Wheel: dolly");
        log::info!("  W: wireframe | F: fullscreen | P: screenshot | Esc: quit");

        Ok(Self {
            window,
            gpu,
            renderer,
            camera,
            camera_controller: CameraController::new(),
            scene,
            overlay,
            capture_requested: false,
            capture_count: 0,
            fps: FpsCounter::default(),
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.begin_error_scope();
        self.gpu.resize(new_size);
        self.renderer
            .resize(&self.gpu.device, self.gpu.size.width, self.gpu.size.height);
        self.gpu.check_errors("resize");
    }

    pub fn toggle_wireframe(&mut self) {
        self.scene.toggles.wireframe = !self.scene.toggles.wireframe;
        if self.scene.toggles.wireframe && !self.gpu.line_mode {
            log::warn!("Wireframe unsupported on this adapter");
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        let fullscreen = match self.window.fullscreen() {
            Some(_) => None,
            None => Some(Fullscreen::Borderless(None)),
        };
        self.window.set_fullscreen(fullscreen);
    }

    pub fn request_capture(&mut self) {
        if self.gpu.can_capture {
            self.capture_requested = true;
        } else {
            log::warn!("Frame capture unsupported by this surface");
        }
    }

    /// Draw one frame. Returns false if rendering cannot continue.
    pub fn render(&mut self) -> bool {
        self.gpu.begin_error_scope();

        if let Some(overlay) = self.overlay.as_mut() {
            overlay.prepare(&mut self.scene);
        }

        self.scene.prepare_frame(
            &mut self.camera,
            self.gpu.config.width,
            self.gpu.config.height,
        );

        let options = FrameOptions {
            wireframe: self.scene.toggles.wireframe,
            capture: std::mem::take(&mut self.capture_requested),
        };
        let result = self.renderer.render(
            &mut self.gpu,
            self.scene.target(),
            options,
            self.overlay.as_mut().map(|o| o.pass()),
        );

        self.gpu.check_errors("frame");

        match result {
            Ok(output) => {
                if let Some(capture) = output.capture {
                    self.save_capture(capture);
                }
                if output.presented {
                    self.update_fps();
                }
                true
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                false
            }
        }
    }

    /// Release GPU objects and overlay resources, overlay first.
    pub fn teardown(self) {
        let Self {
            window,
            gpu,
            renderer,
            scene,
            overlay,
            ..
        } = self;

        gpu.begin_error_scope();
        drop(overlay);
        drop(renderer);
        drop(scene);
        gpu.check_errors("teardown");
        drop(gpu);
        drop(window);
        log::info!("Teardown complete");
    }

    fn save_capture(&mut self, capture: fbm_terrain::render::Result<image::RgbaImage>) {
        let path = PathBuf::from(format!("terrain_{:04}.png", self.capture_count));
        let result = capture.and_then(|image| capture::write_png(&path, &image));
        match result {
            Ok(()) => {
                self.capture_count += 1;
                log::info!("Saved {}", path.display());
            }
            Err(e) => log::error!("{}", e),
        }
    }

    fn update_fps(&mut self) {
        let Some(fps) = self.fps.tick() else {
            return;
        };
        self.window.set_title(&format!(
            "fBm terrain | {}x{} grid | {:.0} FPS",
            self.scene.grid_resolution(),
            self.scene.grid_resolution(),
            fps
        ));
    }
}
