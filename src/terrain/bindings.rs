//! Typed parameter registry shared by the overlay and the terrain scene.
//!
//! The overlay never touches scene fields directly: it enumerates
//! [`ParamId::ALL`], reads through [`ParamBindings::get`] and writes back
//! through [`ParamBindings::set`], which routes to the clamping setters.

use super::{TerrainScene, TerrainTarget};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamId {
    Wireframe,
    Normals,
    GridTessellation,
    GridScale,
    LightTheta,
    LightRadius,
    FbmH,
    FbmLacunarity,
    FbmOctaves,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    UInt(u32),
    Int(i32),
    Float(f32),
}

impl ParamValue {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Numeric value as f32 (bools are not numeric).
    pub fn as_f32(self) -> Option<f32> {
        match self {
            Self::UInt(u) => Some(u as f32),
            Self::Int(i) => Some(i as f32),
            Self::Float(f) => Some(f),
            Self::Bool(_) => None,
        }
    }

    /// Same variant as `self`, carrying `value` (rounded for integer variants).
    pub fn with_f32(self, value: f32) -> Self {
        match self {
            Self::Bool(b) => Self::Bool(b),
            Self::UInt(_) => Self::UInt(value.round().max(0.0) as u32),
            Self::Int(_) => Self::Int(value.round() as i32),
            Self::Float(_) => Self::Float(value),
        }
    }
}

/// Widget range for a numeric parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamId {
    pub const ALL: [ParamId; 9] = [
        ParamId::Wireframe,
        ParamId::Normals,
        ParamId::GridTessellation,
        ParamId::GridScale,
        ParamId::LightTheta,
        ParamId::LightRadius,
        ParamId::FbmH,
        ParamId::FbmLacunarity,
        ParamId::FbmOctaves,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Wireframe => "wireframe",
            Self::Normals => "normals",
            Self::GridTessellation => "grid tess",
            Self::GridScale => "grid scale",
            Self::LightTheta => "theta",
            Self::LightRadius => "radius",
            Self::FbmH => "H",
            Self::FbmLacunarity => "Lacunarity",
            Self::FbmOctaves => "Octaves",
        }
    }

    /// Panel group, `None` for top-level entries.
    pub fn group(self) -> Option<&'static str> {
        match self {
            Self::LightTheta | Self::LightRadius => Some("light"),
            Self::FbmH | Self::FbmLacunarity | Self::FbmOctaves => Some("fBm"),
            _ => None,
        }
    }

    /// Slider range, `None` for toggles.
    pub fn range(self) -> Option<ParamRange> {
        let range = |min, max, step| Some(ParamRange { min, max, step });
        match self {
            Self::Wireframe | Self::Normals => None,
            Self::GridTessellation => range(1.0, 255.0, 1.0),
            Self::GridScale => range(1.0, 255.0, 1.0),
            Self::LightTheta => range(0.1, 180.0, 1.0),
            Self::LightRadius => range(0.0, 100.0, 0.1),
            Self::FbmH => range(0.0, 1.0, 0.01),
            Self::FbmLacunarity => range(0.0, 5.0, 0.01),
            Self::FbmOctaves => range(1.0, 20.0, 1.0),
        }
    }
}

/// Read/write access to tunable parameters by id.
pub trait ParamBindings {
    fn get(&self, id: ParamId) -> ParamValue;

    /// Write a value. Returns false if the value type does not fit the parameter.
    fn set(&mut self, id: ParamId, value: ParamValue) -> bool;
}

impl<T: TerrainTarget> ParamBindings for TerrainScene<T> {
    fn get(&self, id: ParamId) -> ParamValue {
        match id {
            ParamId::Wireframe => ParamValue::Bool(self.toggles.wireframe),
            ParamId::Normals => ParamValue::Bool(self.toggles.normals),
            ParamId::GridTessellation => ParamValue::UInt(self.grid_resolution()),
            ParamId::GridScale => ParamValue::Float(self.grid_scale()),
            ParamId::LightTheta => ParamValue::Float(self.light.theta),
            ParamId::LightRadius => ParamValue::Float(self.light.radius),
            ParamId::FbmH => ParamValue::Float(self.h()),
            ParamId::FbmLacunarity => ParamValue::Float(self.lacunarity()),
            ParamId::FbmOctaves => ParamValue::Int(self.octaves()),
        }
    }

    fn set(&mut self, id: ParamId, value: ParamValue) -> bool {
        match (id, value) {
            (ParamId::Wireframe, ParamValue::Bool(b)) => self.toggles.wireframe = b,
            (ParamId::Normals, ParamValue::Bool(b)) => self.toggles.normals = b,
            (ParamId::GridTessellation, value) => match value.as_f32() {
                Some(v) if v.is_finite() => {
                    self.set_grid_resolution(v.round().max(0.0) as u32);
                }
                _ => return false,
            },
            (ParamId::FbmOctaves, value) => match value.as_f32() {
                Some(v) if v.is_finite() => {
                    self.set_octaves(v.round() as i32);
                }
                _ => return false,
            },
            (id, value) => {
                let Some(v) = value.as_f32() else {
                    return false;
                };
                match id {
                    ParamId::GridScale => {
                        self.set_grid_scale(v);
                    }
                    ParamId::LightTheta => self.light.theta = v,
                    ParamId::LightRadius => self.light.radius = v,
                    ParamId::FbmH => {
                        self.set_h(v);
                    }
                    ParamId::FbmLacunarity => {
                        self.set_lacunarity(v);
                    }
                    _ => return false,
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{CpuTarget, TerrainSettings};

    fn scene() -> TerrainScene<CpuTarget> {
        TerrainScene::new(
            CpuTarget::new(),
            TerrainSettings {
                resolution: 4,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_every_param_round_trips_its_own_value() {
        let mut scene = scene();
        for id in ParamId::ALL {
            let value = scene.get(id);
            assert!(scene.set(id, value), "{:?} rejected its own value", id);
            assert_eq!(scene.get(id), value, "{:?}", id);
        }
    }

    #[test]
    fn test_tessellation_regenerates_mesh() {
        let mut scene = scene();
        let uploads = scene.target().mesh_uploads;
        assert!(scene.set(ParamId::GridTessellation, ParamValue::UInt(32)));
        assert_eq!(scene.target().mesh_uploads, uploads + 1);
        assert_eq!(scene.index_count(), 32 * 32 * 6);
    }

    #[test]
    fn test_fbm_bindings_reach_uniforms() {
        let mut scene = scene();
        scene.set(ParamId::FbmH, ParamValue::Float(0.5));
        scene.set(ParamId::FbmOctaves, ParamValue::Float(6.4));
        scene.set(ParamId::FbmLacunarity, ParamValue::Float(3.0));
        let uniforms = scene.uniforms();
        assert_eq!(uniforms.h, 0.5);
        assert_eq!(uniforms.octaves, 6);
        assert_eq!(uniforms.lacunarity, 3.0);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut scene = scene();
        assert!(!scene.set(ParamId::Wireframe, ParamValue::Float(1.0)));
        assert!(!scene.set(ParamId::FbmH, ParamValue::Bool(true)));
        assert_eq!(scene.get(ParamId::Wireframe), ParamValue::Bool(false));
    }

    #[test]
    fn test_with_f32_keeps_variant() {
        assert_eq!(ParamValue::UInt(3).with_f32(7.6), ParamValue::UInt(8));
        assert_eq!(ParamValue::UInt(3).with_f32(-2.0), ParamValue::UInt(0));
        assert_eq!(ParamValue::Int(3).with_f32(-2.4), ParamValue::Int(-2));
        assert_eq!(ParamValue::Float(0.0).with_f32(0.25), ParamValue::Float(0.25));
        assert_eq!(ParamValue::Bool(true).with_f32(0.0), ParamValue::Bool(true));
    }

    #[test]
    fn test_ranges_and_groups() {
        assert_eq!(ParamId::Wireframe.range(), None);
        assert_eq!(ParamId::FbmOctaves.range().map(|r| r.max), Some(20.0));
        assert_eq!(ParamId::LightTheta.group(), Some("light"));
        assert_eq!(ParamId::FbmLacunarity.group(), Some("fBm"));
        assert_eq!(ParamId::GridScale.group(), None);
    }
}
