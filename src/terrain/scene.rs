use std::time::Instant;

use glam::{Mat4, Vec3};

use crate::render::{Camera, TerrainUniforms, Uniform, UniformValue};

use super::params::{clamp_grid_scale, clamp_h, clamp_lacunarity, clamp_octaves};
use super::{GridMesh, LightState, TerrainParameters, TerrainTarget};

/// Initial state of a terrain scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainSettings {
    pub resolution: u32,
    pub params: TerrainParameters,
    pub light: LightState,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            resolution: super::MAX_RESOLUTION,
            params: TerrainParameters::default(),
            light: LightState::default(),
        }
    }
}

/// View toggles driven by keys and the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ToggleState {
    pub wireframe: bool,
    /// Overlay-only flag; the terrain shader has no normals view.
    pub normals: bool,
}

/// Per-frame values derived from camera and light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameState {
    pub model_view_projection: Mat4,
    pub eye_pos: Vec3,
    pub light_pos: Vec3,
}

/// Grid mesh, fBm parameters and light, bound to a shader target.
///
/// Every setter clamps its input, stores it and writes the matching uniform
/// before returning, so the next frame never sees stale values.
pub struct TerrainScene<T: TerrainTarget> {
    target: T,
    mesh: GridMesh,
    params: TerrainParameters,
    pub light: LightState,
    pub toggles: ToggleState,
}

impl<T: TerrainTarget> TerrainScene<T> {
    pub fn new(target: T, settings: TerrainSettings) -> Self {
        let mut scene = Self {
            target,
            mesh: GridMesh::new(settings.resolution),
            params: settings.params.clamped(),
            light: settings.light,
            toggles: ToggleState::default(),
        };
        scene.target.upload_mesh(&scene.mesh);
        scene.push_parameters();
        scene
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    pub fn mesh(&self) -> &GridMesh {
        &self.mesh
    }

    pub fn index_count(&self) -> u32 {
        self.mesh.index_count()
    }

    pub fn uniforms(&self) -> &TerrainUniforms {
        self.target.uniforms()
    }

    pub fn parameters(&self) -> TerrainParameters {
        self.params
    }

    /// Apply every field of `params` through its setter.
    pub fn restore(&mut self, params: TerrainParameters) {
        self.set_grid_scale(params.grid_scale);
        self.set_h(params.h);
        self.set_lacunarity(params.lacunarity);
        self.set_octaves(params.octaves);
    }

    pub fn grid_resolution(&self) -> u32 {
        self.mesh.resolution()
    }

    /// Regenerate and upload the grid. Returns the clamped resolution.
    pub fn set_grid_resolution(&mut self, resolution: u32) -> u32 {
        let start = Instant::now();
        self.mesh = GridMesh::new(resolution);
        self.target.upload_mesh(&self.mesh);
        log::debug!(
            "Grid mesh N={}: {} vertices, {} indices ({:.2?})",
            self.mesh.resolution(),
            self.mesh.vertex_count(),
            self.mesh.index_count(),
            start.elapsed()
        );
        self.mesh.resolution()
    }

    pub fn grid_scale(&self) -> f32 {
        self.params.grid_scale
    }

    pub fn set_grid_scale(&mut self, value: f32) -> f32 {
        self.params.grid_scale = clamp_grid_scale(value, self.params.grid_scale);
        self.write_float(Uniform::GridScale, self.params.grid_scale);
        self.params.grid_scale
    }

    pub fn h(&self) -> f32 {
        self.params.h
    }

    pub fn set_h(&mut self, value: f32) -> f32 {
        self.params.h = clamp_h(value, self.params.h);
        self.write_float(Uniform::H, self.params.h);
        self.params.h
    }

    pub fn lacunarity(&self) -> f32 {
        self.params.lacunarity
    }

    pub fn set_lacunarity(&mut self, value: f32) -> f32 {
        self.params.lacunarity = clamp_lacunarity(value, self.params.lacunarity);
        self.write_float(Uniform::Lacunarity, self.params.lacunarity);
        self.params.lacunarity
    }

    pub fn octaves(&self) -> i32 {
        self.params.octaves
    }

    pub fn set_octaves(&mut self, value: i32) -> i32 {
        self.params.octaves = clamp_octaves(value);
        self.target
            .write_uniform(Uniform::Octaves, UniformValue::Int(self.params.octaves));
        log::debug!("{} = {}", Uniform::Octaves.name(), self.params.octaves);
        self.params.octaves
    }

    /// Derive this frame's transforms for a `width` x `height` viewport and push them.
    pub fn prepare_frame(&mut self, camera: &mut Camera, width: u32, height: u32) -> FrameState {
        if width > 0 && height > 0 {
            camera.set_aspect(width as f32 / height as f32);
        }

        let frame = FrameState {
            model_view_projection: camera.model_view_projection(),
            eye_pos: camera.eye_position(),
            light_pos: self.light.position(),
        };

        self.target.write_uniform(
            Uniform::ModelViewProjection,
            UniformValue::Mat4(frame.model_view_projection),
        );
        self.target
            .write_uniform(Uniform::LightPos, UniformValue::Vec3(frame.light_pos));
        self.target
            .write_uniform(Uniform::EyePos, UniformValue::Vec3(frame.eye_pos));
        frame
    }

    fn push_parameters(&mut self) {
        self.write_float(Uniform::GridScale, self.params.grid_scale);
        self.write_float(Uniform::H, self.params.h);
        self.write_float(Uniform::Lacunarity, self.params.lacunarity);
        self.target
            .write_uniform(Uniform::Octaves, UniformValue::Int(self.params.octaves));
    }

    fn write_float(&mut self, uniform: Uniform, value: f32) {
        self.target.write_uniform(uniform, UniformValue::Float(value));
        log::debug!("{} = {}", uniform.name(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{CpuTarget, MAX_OCTAVES, MIN_LACUNARITY};

    fn scene() -> TerrainScene<CpuTarget> {
        TerrainScene::new(
            CpuTarget::new(),
            TerrainSettings {
                resolution: 8,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_new_pushes_everything() {
        let scene = scene();
        let target = scene.target();
        assert_eq!(target.mesh_uploads, 1);
        assert_eq!(target.index_count, 8 * 8 * 6);

        let uniforms = scene.uniforms();
        let defaults = TerrainParameters::default();
        assert_eq!(uniforms.grid_scale, defaults.grid_scale);
        assert_eq!(uniforms.h, defaults.h);
        assert_eq!(uniforms.lacunarity, defaults.lacunarity);
        assert_eq!(uniforms.octaves, defaults.octaves);
    }

    #[test]
    fn test_setters_write_through() {
        let mut scene = scene();
        scene.set_h(0.3);
        assert_eq!(scene.uniforms().h, 0.3);
        scene.set_lacunarity(2.5);
        assert_eq!(scene.uniforms().lacunarity, 2.5);
        scene.set_grid_scale(4.0);
        assert_eq!(scene.uniforms().grid_scale, 4.0);
        scene.set_octaves(3);
        assert_eq!(scene.uniforms().octaves, 3);
    }

    #[test]
    fn test_setter_idempotent() {
        let mut scene = scene();
        scene.set_h(0.42);
        let once = *scene.uniforms();
        scene.set_h(0.42);
        assert_eq!(*scene.uniforms(), once);
        assert_eq!(scene.h(), 0.42);
    }

    #[test]
    fn test_setters_clamp() {
        let mut scene = scene();
        assert_eq!(scene.set_octaves(50), MAX_OCTAVES);
        assert_eq!(scene.uniforms().octaves, 20);

        let lacunarity = scene.set_lacunarity(-1.0);
        assert_eq!(lacunarity, MIN_LACUNARITY);
        assert!(scene.uniforms().lacunarity > 0.0);

        assert_eq!(scene.set_h(7.0), 1.0);
    }

    #[test]
    fn test_resolution_change_regenerates() {
        let mut scene = scene();
        assert_eq!(scene.set_grid_resolution(0), 1);
        assert_eq!(scene.target().mesh_uploads, 2);
        assert_eq!(scene.index_count(), 6);
        assert_eq!(scene.target().vertex_count, 4);
    }

    #[test]
    fn test_prepare_frame() {
        let mut scene = scene();
        let mut camera = Camera::new();
        let frame = scene.prepare_frame(&mut camera, 1024, 768);

        assert!((camera.projection.aspect - 1024.0 / 768.0).abs() < 1e-6);
        assert!(frame.eye_pos.abs_diff_eq(Vec3::new(0.0, 1.0, 8.0), 1e-5));
        assert_eq!(frame.light_pos, scene.light.position());

        let uniforms = scene.uniforms();
        assert_eq!(
            uniforms.model_view_projection,
            frame.model_view_projection.to_cols_array_2d()
        );
        assert_eq!(uniforms.eye_pos, frame.eye_pos.to_array());
        assert_eq!(uniforms.light_pos, frame.light_pos.to_array());
    }

    #[test]
    fn test_zero_height_viewport_keeps_aspect() {
        let mut scene = scene();
        let mut camera = Camera::new();
        scene.prepare_frame(&mut camera, 800, 400);
        scene.prepare_frame(&mut camera, 800, 0);
        assert_eq!(camera.projection.aspect, 2.0);
    }
}
