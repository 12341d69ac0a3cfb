use image::RgbaImage;
use wgpu::{
    include_wgsl, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, BufferBindingType, CommandEncoder, Device, PolygonMode,
    Queue, RenderPipeline, ShaderStages, SurfaceError, TextureView,
};

use super::{create_depth_view, FrameCapture, GpuContext, PipelineBuilder, TerrainBuffers};
use crate::terrain::GridVertex;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.25,
    g: 0.25,
    b: 0.25,
    a: 1.0,
};

/// Something drawn over the terrain after the main pass, without depth testing.
pub trait OverlayPass {
    fn paint(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        size: [u32; 2],
    );
}

/// Per-frame draw options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOptions {
    pub wireframe: bool,
    pub capture: bool,
}

/// Result of one frame.
#[derive(Default)]
pub struct FrameOutput {
    pub presented: bool,
    /// Present when a capture was requested and the surface supports it.
    pub capture: Option<super::Result<RgbaImage>>,
}

pub struct Renderer {
    fill_pipeline: RenderPipeline,
    /// `None` when the adapter cannot rasterize lines.
    line_pipeline: Option<RenderPipeline>,
    bind_group: BindGroup,
    depth_view: TextureView,
}

impl Renderer {
    pub fn new(gpu: &GpuContext, terrain: &TerrainBuffers) -> Self {
        let shader = gpu
            .device
            .create_shader_module(include_wgsl!("../shaders/terrain.wgsl"));

        let bind_group_layout = gpu
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("terrain_bind_group_layout"),
                entries: &[BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group = gpu.device.create_bind_group(&BindGroupDescriptor {
            label: Some("terrain_bind_group"),
            layout: &bind_group_layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: terrain.uniform_buffer.as_entire_binding(),
            }],
        });

        let fill_pipeline = PipelineBuilder::new(&gpu.device, &shader, gpu.format)
            .vertex_layout(GridVertex::desc())
            .bind_group_layout(&bind_group_layout)
            .label("terrain_fill_pipeline")
            .build();

        let line_pipeline = gpu.line_mode.then(|| {
            PipelineBuilder::new(&gpu.device, &shader, gpu.format)
                .vertex_layout(GridVertex::desc())
                .bind_group_layout(&bind_group_layout)
                .polygon_mode(PolygonMode::Line)
                .label("terrain_line_pipeline")
                .build()
        });

        let depth_view = create_depth_view(&gpu.device, gpu.size.width, gpu.size.height);

        Self {
            fill_pipeline,
            line_pipeline,
            bind_group,
            depth_view,
        }
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        self.depth_view = create_depth_view(device, width, height);
    }

    pub fn render(
        &mut self,
        gpu: &mut GpuContext,
        terrain: &TerrainBuffers,
        options: FrameOptions,
        overlay: Option<&mut dyn OverlayPass>,
    ) -> Result<FrameOutput, SurfaceError> {
        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                gpu.reconfigure();
                self.resize(&gpu.device, gpu.size.width, gpu.size.height);
                return Ok(FrameOutput::default());
            }
            Err(SurfaceError::OutOfMemory) => return Err(SurfaceError::OutOfMemory),
            Err(e) => {
                log::warn!("Surface error: {:?}", e);
                return Ok(FrameOutput::default());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("terrain_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Line mode applies to this draw only; the next frame starts from fill again.
            let pipeline = match (&self.line_pipeline, options.wireframe) {
                (Some(line), true) => line,
                _ => &self.fill_pipeline,
            };

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.set_vertex_buffer(0, terrain.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(terrain.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..terrain.index_count, 0, 0..1);
        }

        if let Some(overlay) = overlay {
            overlay.paint(
                &gpu.device,
                &gpu.queue,
                &mut encoder,
                &view,
                [gpu.config.width, gpu.config.height],
            );
        }

        let capture = (options.capture && gpu.can_capture)
            .then(|| FrameCapture::encode(&gpu.device, &mut encoder, &output.texture));

        gpu.queue.submit(std::iter::once(encoder.finish()));

        let capture = capture.map(|c| c.read(&gpu.device));
        output.present();

        Ok(FrameOutput {
            presented: true,
            capture,
        })
    }
}
