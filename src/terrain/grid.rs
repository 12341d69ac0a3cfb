use glam::Vec2;

/// Smallest tessellation level; a 0x0 grid has no triangles.
pub const MIN_RESOLUTION: u32 = 1;

/// Largest tessellation level. `(255 + 1)^2` vertices is exactly the `u16` index space.
pub const MAX_RESOLUTION: u32 = 255;

/// Vertex capacity of the GPU buffers (sized once for `MAX_RESOLUTION`).
pub const MAX_VERTEX_COUNT: usize = ((MAX_RESOLUTION + 1) * (MAX_RESOLUTION + 1)) as usize;

/// Index capacity of the GPU buffers (sized once for `MAX_RESOLUTION`).
pub const MAX_INDEX_COUNT: usize = (MAX_RESOLUTION * MAX_RESOLUTION * 6) as usize;

/// A grid vertex: position on the unit square. Height and normal come from the shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridVertex {
    pub position: [f32; 2],
}

impl GridVertex {
    pub fn new(position: Vec2) -> Self {
        Self {
            position: position.to_array(),
        }
    }
}

/// Tessellated unit square centered at the origin.
///
/// Vertices are laid out x-major: the vertex at grid coordinate `(x, y)` lives at
/// index `x * (N + 1) + y`. Each cell contributes two triangles sharing the
/// `(x+1, y+1)` - `(x, y)` diagonal.
#[derive(Clone, Debug)]
pub struct GridMesh {
    resolution: u32,
    pub vertices: Vec<GridVertex>,
    pub indices: Vec<u16>,
}

impl GridMesh {
    /// Build a grid with `resolution` subdivisions per axis.
    /// Out-of-range resolutions are clamped to `[MIN_RESOLUTION, MAX_RESOLUTION]`.
    pub fn new(resolution: u32) -> Self {
        let n = clamp_resolution(resolution);
        let stride = n + 1;
        let inv_n = 1.0 / n as f32;

        let mut vertices = Vec::with_capacity((stride * stride) as usize);
        for x in 0..stride {
            for y in 0..stride {
                vertices.push(GridVertex::new(Vec2::new(
                    -0.5 + x as f32 * inv_n,
                    -0.5 + y as f32 * inv_n,
                )));
            }
        }

        let index = |x: u32, y: u32| (x * stride + y) as u16;
        let mut indices = Vec::with_capacity((n * n * 6) as usize);
        for x in 0..n {
            for y in 0..n {
                // upper triangle
                indices.extend_from_slice(&[index(x + 1, y + 1), index(x + 1, y), index(x, y)]);
                // lower triangle
                indices.extend_from_slice(&[index(x + 1, y + 1), index(x, y), index(x, y + 1)]);
            }
        }

        Self {
            resolution: n,
            vertices,
            indices,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec2; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                Vec2::from(self.vertices[tri[0] as usize].position),
                Vec2::from(self.vertices[tri[1] as usize].position),
                Vec2::from(self.vertices[tri[2] as usize].position),
            ]
        })
    }
}

pub fn clamp_resolution(resolution: u32) -> u32 {
    resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(tri: [Vec2; 3]) -> f32 {
        0.5 * (tri[1] - tri[0]).perp_dot(tri[2] - tri[0])
    }

    #[test]
    fn test_counts_for_all_resolutions() {
        for n in MIN_RESOLUTION..=MAX_RESOLUTION {
            let mesh = GridMesh::new(n);
            let stride = (n + 1) as usize;
            assert_eq!(mesh.vertex_count(), stride * stride, "vertices at N={}", n);
            assert_eq!(mesh.indices.len(), (n * n * 6) as usize, "indices at N={}", n);

            let vertex_count = mesh.vertex_count();
            assert!(
                mesh.indices.iter().all(|&i| (i as usize) < vertex_count),
                "index out of range at N={}",
                n
            );
        }
    }

    #[test]
    fn test_single_cell() {
        let mesh = GridMesh::new(1);
        let positions: Vec<[f32; 2]> = mesh.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![[-0.5, -0.5], [-0.5, 0.5], [0.5, -0.5], [0.5, 0.5]]
        );
        assert_eq!(mesh.indices, vec![3, 2, 0, 3, 0, 1]);
    }

    #[test]
    fn test_consistent_winding_and_full_coverage() {
        let mesh = GridMesh::new(7);
        let areas: Vec<f32> = mesh.triangles().map(signed_area).collect();

        let first_sign = areas[0].signum();
        assert!(areas.iter().all(|a| a.signum() == first_sign));

        let total: f32 = areas.iter().map(|a| a.abs()).sum();
        assert!((total - 1.0).abs() < 1e-4, "covered area {}", total);
    }

    #[test]
    fn test_zero_resolution_is_clamped() {
        let mesh = GridMesh::new(0);
        assert_eq!(mesh.resolution(), 1);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_oversized_resolution_fits_buffers() {
        let mesh = GridMesh::new(4096);
        assert_eq!(mesh.resolution(), MAX_RESOLUTION);
        assert_eq!(mesh.vertex_count(), MAX_VERTEX_COUNT);
        assert_eq!(mesh.indices.len(), MAX_INDEX_COUNT);
        assert_eq!(mesh.indices.iter().copied().max(), Some(u16::MAX));
    }

    #[test]
    fn test_vertices_span_unit_square() {
        let mesh = GridMesh::new(16);
        let first = mesh.vertices.first().unwrap().position;
        let last = mesh.vertices.last().unwrap().position;
        assert_eq!(first, [-0.5, -0.5]);
        assert!((last[0] - 0.5).abs() < 1e-6 && (last[1] - 0.5).abs() < 1e-6);
    }
}
