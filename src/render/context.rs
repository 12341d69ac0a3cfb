use std::sync::Arc;
use wgpu::{
    Backends, Device, DeviceDescriptor, ErrorFilter, Features, Instance, InstanceDescriptor,
    Limits, PowerPreference, PresentMode, Queue, RequestAdapterOptions, Surface,
    SurfaceConfiguration, TextureFormat, TextureUsages, UncapturedErrorHandler,
};
use winit::{dpi::PhysicalSize, window::Window};

use super::{RenderError, Result};

/// GPU context holding all wgpu resources.
pub struct GpuContext {
    pub surface: Surface<'static>,
    pub device: Device,
    pub queue: Queue,
    pub config: SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub format: TextureFormat,
    /// Adapter supports `PolygonMode::Line`.
    pub line_mode: bool,
    /// Surface textures can be copied out (frame capture).
    pub can_capture: bool,
}

impl GpuContext {
    /// Create a new GPU context for the given window.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = Instance::new(&InstanceDescriptor {
            backends: Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);

        let line_mode = adapter.features().contains(Features::POLYGON_MODE_LINE);
        let required_features = if line_mode {
            Features::POLYGON_MODE_LINE
        } else {
            log::warn!("Adapter lacks POLYGON_MODE_LINE; wireframe will draw filled");
            Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("terrain_device"),
                required_features,
                required_limits: Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;
        device.on_uncaptured_error(uncaptured_error_handler());

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(RenderError::UnsupportedSurface(TextureFormat::Bgra8UnormSrgb))?;

        let can_capture = surface_caps.usages.contains(TextureUsages::COPY_SRC)
            && matches!(
                format,
                TextureFormat::Bgra8Unorm
                    | TextureFormat::Bgra8UnormSrgb
                    | TextureFormat::Rgba8Unorm
                    | TextureFormat::Rgba8UnormSrgb
            );
        let usage = if can_capture {
            TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC
        } else {
            TextureUsages::RENDER_ATTACHMENT
        };
        log::info!("Surface format {:?} (capture: {})", format, can_capture);

        let config = SurfaceConfiguration {
            usage,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: PresentMode::AutoNoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            format,
            line_mode,
            can_capture,
        })
    }

    /// Resize the surface.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure the surface at its current size (after `Lost`/`Outdated`).
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Get aspect ratio.
    pub fn aspect(&self) -> f32 {
        self.size.width as f32 / self.size.height.max(1) as f32
    }

    /// Start capturing validation errors until the next [`check_errors`](Self::check_errors).
    pub fn begin_error_scope(&self) {
        self.device.push_error_scope(ErrorFilter::Validation);
    }

    /// Close the current error scope and log whatever it caught.
    /// Returns true if an error was logged.
    pub fn check_errors(&self, checkpoint: &str) -> bool {
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(error) => {
                log::error!("{}", describe_gpu_error(checkpoint, &error));
                true
            }
            None => false,
        }
    }
}

/// Logs GPU errors raised outside any error scope. The wgpu default panics.
pub fn uncaptured_error_handler() -> Arc<dyn UncapturedErrorHandler> {
    Arc::new(|error: wgpu::Error| {
        log::error!("{}", describe_gpu_error("uncaptured", &error));
    })
}

fn describe_gpu_error(checkpoint: &str, error: &wgpu::Error) -> String {
    let kind = match error {
        wgpu::Error::OutOfMemory { .. } => "out of memory",
        wgpu::Error::Validation { .. } => "validation",
        wgpu::Error::Internal { .. } => "internal",
    };
    format!("GPU {} error at {}: {}", kind, checkpoint, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_error(description: &str) -> wgpu::Error {
        wgpu::Error::Validation {
            source: Box::new(std::io::Error::other(description.to_string())),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_uncaptured_errors_are_logged_not_fatal() {
        let handler = uncaptured_error_handler();
        handler(validation_error("depth texture of size 0"));
        handler(wgpu::Error::OutOfMemory {
            source: Box::new(std::io::Error::other("oom")),
        });
    }

    #[test]
    fn test_error_message_names_kind_and_checkpoint() {
        let message = describe_gpu_error("resize", &validation_error("bad extent"));
        assert_eq!(message, "GPU validation error at resize: bad extent");
    }
}
