use wgpu::{util::DeviceExt, Buffer, BufferAddress, BufferUsages, Device, Queue};

use super::{TerrainUniforms, Uniform, UniformValue};
use crate::terrain::{GridMesh, GridVertex, TerrainTarget, MAX_INDEX_COUNT, MAX_VERTEX_COUNT};

/// Create an empty buffer of `size` bytes that accepts queue writes.
pub fn create_writable_buffer(
    device: &Device,
    size: BufferAddress,
    usage: BufferUsages,
    label: &str,
) -> Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: usage | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Create a uniform buffer from data.
pub fn create_uniform_buffer<T: bytemuck::Pod>(device: &Device, data: &T, label: &str) -> Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(data),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    })
}

/// GPU storage for the terrain: grid buffers sized for the largest grid, plus
/// the uniform block with a CPU shadow copy.
pub struct TerrainBuffers {
    queue: Queue,
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub uniform_buffer: Buffer,
    pub index_count: u32,
    shadow: TerrainUniforms,
}

impl TerrainBuffers {
    pub fn new(device: &Device, queue: &Queue) -> Self {
        let vertex_bytes = (MAX_VERTEX_COUNT * std::mem::size_of::<GridVertex>()) as BufferAddress;
        let index_bytes = (MAX_INDEX_COUNT * std::mem::size_of::<u16>()) as BufferAddress;
        let shadow = TerrainUniforms::default();

        Self {
            queue: queue.clone(),
            vertex_buffer: create_writable_buffer(
                device,
                vertex_bytes,
                BufferUsages::VERTEX,
                "grid_vertices",
            ),
            index_buffer: create_writable_buffer(
                device,
                index_bytes,
                BufferUsages::INDEX,
                "grid_indices",
            ),
            uniform_buffer: create_uniform_buffer(device, &shadow, "terrain_uniforms"),
            index_count: 0,
            shadow,
        }
    }
}

impl TerrainTarget for TerrainBuffers {
    fn write_uniform(&mut self, uniform: Uniform, value: UniformValue) {
        self.shadow.apply(uniform, value);
        self.queue.write_buffer(
            &self.uniform_buffer,
            uniform.offset() as BufferAddress,
            self.shadow.member_bytes(uniform),
        );
    }

    fn upload_mesh(&mut self, mesh: &GridMesh) {
        // Sub-range writes into the presized buffers; the tail past the new
        // counts keeps stale data that the draw range never reaches.
        self.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&mesh.vertices));
        self.queue
            .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&mesh.indices));
        self.index_count = mesh.index_count();
    }

    fn uniforms(&self) -> &TerrainUniforms {
        &self.shadow
    }
}
