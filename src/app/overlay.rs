//! Parameter panel drawn over the terrain.

use std::sync::Arc;

use egui_wgpu::ScreenDescriptor;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{event::WindowEvent, window::Window};

use fbm_terrain::render::OverlayPass;
use fbm_terrain::terrain::{ParamBindings, ParamId, ParamValue};

/// An overlay gets every window event before the camera and draws last.
pub trait Overlay {
    /// Returns true if the overlay consumed the event.
    fn on_window_event(&mut self, event: &WindowEvent) -> bool;

    /// Run the UI for this frame, reading and writing through `bindings`.
    fn prepare(&mut self, bindings: &mut dyn ParamBindings);

    fn pass(&mut self) -> &mut dyn OverlayPass;
}

struct PendingPaint {
    jobs: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    pixels_per_point: f32,
}

pub struct EguiOverlay {
    window: Arc<Window>,
    context: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    pending: Option<PendingPaint>,
}

impl EguiOverlay {
    pub fn new(window: Arc<Window>, device: &Device, format: TextureFormat) -> Self {
        let context = egui::Context::default();
        let state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            &*window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );
        let renderer =
            egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            window,
            context,
            state,
            renderer,
            pending: None,
        }
    }
}

impl Overlay for EguiOverlay {
    fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        self.state.on_window_event(&self.window, event).consumed
    }

    fn prepare(&mut self, bindings: &mut dyn ParamBindings) {
        let raw_input = self.state.take_egui_input(&self.window);
        let output = self.context.run(raw_input, |ctx| draw_panel(ctx, bindings));
        self.state
            .handle_platform_output(&self.window, output.platform_output);

        let jobs = self
            .context
            .tessellate(output.shapes, output.pixels_per_point);
        self.pending = Some(PendingPaint {
            jobs,
            textures: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        });
    }

    fn pass(&mut self) -> &mut dyn OverlayPass {
        self
    }
}

impl OverlayPass for EguiOverlay {
    fn paint(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        size: [u32; 2],
    ) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        for (id, delta) in &pending.textures.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let screen = ScreenDescriptor {
            size_in_pixels: size,
            pixels_per_point: pending.pixels_per_point,
        };
        let prepare = self
            .renderer
            .update_buffers(device, queue, encoder, &pending.jobs, &screen);
        if !prepare.is_empty() {
            queue.submit(prepare);
        }

        {
            // No depth attachment: the panel always sits on top of the terrain.
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("overlay_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            let mut pass = pass.forget_lifetime();
            self.renderer.render(&mut pass, &pending.jobs, &screen);
        }

        for id in &pending.textures.free {
            self.renderer.free_texture(id);
        }
    }
}

fn draw_panel(ctx: &egui::Context, bindings: &mut dyn ParamBindings) {
    egui::Window::new("menu")
        .default_size([175.0, 260.0])
        .resizable(false)
        .show(ctx, |ui| {
            for id in ParamId::ALL.into_iter().filter(|id| id.group().is_none()) {
                param_widget(ui, bindings, id);
            }
            for group in ["light", "fBm"] {
                egui::CollapsingHeader::new(group)
                    .default_open(true)
                    .show(ui, |ui| {
                        for id in ParamId::ALL
                            .into_iter()
                            .filter(|id| id.group() == Some(group))
                        {
                            param_widget(ui, bindings, id);
                        }
                    });
            }
        });
}

fn param_widget(ui: &mut egui::Ui, bindings: &mut dyn ParamBindings, id: ParamId) {
    let value = bindings.get(id);
    match (value, id.range()) {
        (ParamValue::Bool(mut on), _) => {
            if ui.checkbox(&mut on, id.label()).changed() {
                bindings.set(id, ParamValue::Bool(on));
            }
        }
        (value, Some(range)) => {
            let Some(mut v) = value.as_f32() else {
                return;
            };
            let slider = egui::Slider::new(&mut v, range.min..=range.max)
                .step_by(range.step as f64)
                .text(id.label());
            if ui.add(slider).changed() {
                bindings.set(id, value.with_f32(v));
            }
        }
        (_, None) => {}
    }
}
