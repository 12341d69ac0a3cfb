use crate::render::{TerrainUniforms, Uniform, UniformValue};

use super::GridMesh;

/// Where terrain state lands: the bound shader program's uniforms and the grid buffers.
///
/// Writes are synchronous from the caller's point of view; the next frame
/// observes them without any further flush.
pub trait TerrainTarget {
    fn write_uniform(&mut self, uniform: Uniform, value: UniformValue);

    /// Replace the grid geometry. The previous contents are fully overwritten.
    fn upload_mesh(&mut self, mesh: &GridMesh);

    /// CPU view of the uniform block as last written.
    fn uniforms(&self) -> &TerrainUniforms;
}

/// In-memory target that records every write. Used when no GPU is attached.
#[derive(Clone, Debug, Default)]
pub struct CpuTarget {
    pub uniforms: TerrainUniforms,
    pub uniform_writes: Vec<Uniform>,
    pub mesh_uploads: usize,
    pub index_count: u32,
    pub vertex_count: usize,
}

impl CpuTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes recorded for `uniform`.
    pub fn writes_of(&self, uniform: Uniform) -> usize {
        self.uniform_writes.iter().filter(|&&u| u == uniform).count()
    }
}

impl TerrainTarget for CpuTarget {
    fn write_uniform(&mut self, uniform: Uniform, value: UniformValue) {
        self.uniforms.apply(uniform, value);
        self.uniform_writes.push(uniform);
    }

    fn upload_mesh(&mut self, mesh: &GridMesh) {
        self.mesh_uploads += 1;
        self.index_count = mesh.index_count();
        self.vertex_count = mesh.vertex_count();
    }

    fn uniforms(&self) -> &TerrainUniforms {
        &self.uniforms
    }
}
