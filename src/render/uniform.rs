use std::mem::{offset_of, size_of};

use glam::{Mat4, Vec3};

/// Uniform block of the terrain shader.
///
/// Mirrors `struct Uniforms` in `terrain.wgsl` (WGSL uniform layout rules):
/// - `vec3<f32>` followed by a scalar packs into 16 bytes
/// - the struct is padded to a 16-byte multiple
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainUniforms {
    pub model_view_projection: [[f32; 4]; 4], // offset 0
    pub light_pos: [f32; 3],                  // offset 64
    pub grid_scale: f32,                      // offset 76
    pub eye_pos: [f32; 3],                    // offset 80
    pub h: f32,                               // offset 92
    pub lacunarity: f32,                      // offset 96
    pub octaves: i32,                         // offset 100
    pub _padding: [f32; 2],
}

const _: () = assert!(size_of::<TerrainUniforms>() == 112);

impl Default for TerrainUniforms {
    fn default() -> Self {
        Self {
            model_view_projection: Mat4::IDENTITY.to_cols_array_2d(),
            light_pos: [0.0; 3],
            grid_scale: 1.0,
            eye_pos: [0.0; 3],
            h: 1.0,
            lacunarity: 2.0,
            octaves: 1,
            _padding: [0.0; 2],
        }
    }
}

/// A named member of the terrain uniform block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Uniform {
    ModelViewProjection,
    LightPos,
    EyePos,
    GridScale,
    H,
    Lacunarity,
    Octaves,
}

impl Uniform {
    pub const ALL: [Uniform; 7] = [
        Uniform::ModelViewProjection,
        Uniform::LightPos,
        Uniform::EyePos,
        Uniform::GridScale,
        Uniform::H,
        Uniform::Lacunarity,
        Uniform::Octaves,
    ];

    /// Member name in the shader source.
    pub fn name(self) -> &'static str {
        match self {
            Self::ModelViewProjection => "uModelViewProjection",
            Self::LightPos => "uLightPos",
            Self::EyePos => "uEyePos",
            Self::GridScale => "uGridScale",
            Self::H => "uH",
            Self::Lacunarity => "uLacunarity",
            Self::Octaves => "uOctaves",
        }
    }

    /// Byte offset of the member inside `TerrainUniforms`.
    pub fn offset(self) -> usize {
        match self {
            Self::ModelViewProjection => offset_of!(TerrainUniforms, model_view_projection),
            Self::LightPos => offset_of!(TerrainUniforms, light_pos),
            Self::EyePos => offset_of!(TerrainUniforms, eye_pos),
            Self::GridScale => offset_of!(TerrainUniforms, grid_scale),
            Self::H => offset_of!(TerrainUniforms, h),
            Self::Lacunarity => offset_of!(TerrainUniforms, lacunarity),
            Self::Octaves => offset_of!(TerrainUniforms, octaves),
        }
    }

    /// Byte size of the member.
    pub fn size(self) -> usize {
        match self {
            Self::ModelViewProjection => size_of::<[[f32; 4]; 4]>(),
            Self::LightPos | Self::EyePos => size_of::<[f32; 3]>(),
            Self::GridScale | Self::H | Self::Lacunarity => size_of::<f32>(),
            Self::Octaves => size_of::<i32>(),
        }
    }
}

/// A typed value for one uniform member.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec3(Vec3),
    Float(f32),
    Int(i32),
}

impl TerrainUniforms {
    /// Store `value` into the member named by `uniform`.
    ///
    /// Panics if the value type does not match the member type; that is a
    /// programming error, not runtime input.
    pub fn apply(&mut self, uniform: Uniform, value: UniformValue) {
        match (uniform, value) {
            (Uniform::ModelViewProjection, UniformValue::Mat4(m)) => {
                self.model_view_projection = m.to_cols_array_2d()
            }
            (Uniform::LightPos, UniformValue::Vec3(v)) => self.light_pos = v.to_array(),
            (Uniform::EyePos, UniformValue::Vec3(v)) => self.eye_pos = v.to_array(),
            (Uniform::GridScale, UniformValue::Float(f)) => self.grid_scale = f,
            (Uniform::H, UniformValue::Float(f)) => self.h = f,
            (Uniform::Lacunarity, UniformValue::Float(f)) => self.lacunarity = f,
            (Uniform::Octaves, UniformValue::Int(i)) => self.octaves = i,
            (uniform, value) => panic!(
                "type mismatch: {} cannot hold {:?}",
                uniform.name(),
                value
            ),
        }
    }

    /// Bytes of a single member, for partial buffer writes.
    pub fn member_bytes(&self, uniform: Uniform) -> &[u8] {
        let start = uniform.offset();
        &bytemuck::bytes_of(self)[start..start + uniform.size()]
    }
}
