use wgpu::{
    BindGroupLayout, BlendState, ColorTargetState, ColorWrites, CompareFunction,
    DepthStencilState, Device, FragmentState, FrontFace, MultisampleState,
    PipelineLayoutDescriptor, PolygonMode, PrimitiveState, PrimitiveTopology, RenderPipeline,
    RenderPipelineDescriptor, ShaderModule, StencilState, TextureFormat, TextureView,
    VertexBufferLayout, VertexState,
};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Builder for triangle-list render pipelines over one shader module
/// (`vs_main` / `fs_main`).
pub struct PipelineBuilder<'a> {
    device: &'a Device,
    shader: &'a ShaderModule,
    vertex_layouts: Vec<VertexBufferLayout<'a>>,
    bind_group_layouts: Vec<&'a BindGroupLayout>,
    format: TextureFormat,
    polygon_mode: PolygonMode,
    label: Option<&'a str>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(device: &'a Device, shader: &'a ShaderModule, format: TextureFormat) -> Self {
        Self {
            device,
            shader,
            vertex_layouts: Vec::new(),
            bind_group_layouts: Vec::new(),
            format,
            polygon_mode: PolygonMode::Fill,
            label: None,
        }
    }

    pub fn vertex_layout(mut self, layout: VertexBufferLayout<'a>) -> Self {
        self.vertex_layouts.push(layout);
        self
    }

    pub fn bind_group_layout(mut self, layout: &'a BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    /// Requires `Features::POLYGON_MODE_LINE` for `PolygonMode::Line`.
    pub fn polygon_mode(mut self, mode: PolygonMode) -> Self {
        self.polygon_mode = mode;
        self
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn build(self) -> RenderPipeline {
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: self.label,
                bind_group_layouts: &self.bind_group_layouts,
                push_constant_ranges: &[],
            });

        self.device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: self.label,
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: self.shader,
                    entry_point: Some("vs_main"),
                    buffers: &self.vertex_layouts,
                    compilation_options: Default::default(),
                },
                fragment: Some(FragmentState {
                    module: self.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(ColorTargetState {
                        format: self.format,
                        blend: Some(BlendState::REPLACE),
                        write_mask: ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: PrimitiveState {
                    topology: PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: self.polygon_mode,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: CompareFunction::Less,
                    stencil: StencilState::default(),
                    bias: Default::default(),
                }),
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }
}

/// Create a depth attachment matching the surface size.
pub fn create_depth_view(device: &Device, width: u32, height: u32) -> TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
