//! fBm height-field parameters and their valid ranges.

use serde::{Deserialize, Serialize};

pub const MIN_GRID_SCALE: f32 = 0.01;
pub const MIN_H: f32 = 0.0;
pub const MAX_H: f32 = 1.0;
pub const MIN_LACUNARITY: f32 = 0.01;
pub const MIN_OCTAVES: i32 = 1;
pub const MAX_OCTAVES: i32 = 20;

/// Parameters of the shader-side fBm displacement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParameters {
    /// Horizontal extent of the grid in world units.
    pub grid_scale: f32,
    /// Roughness exponent: octave amplitude falls off as `lacunarity^-h`.
    pub h: f32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
    pub octaves: i32,
}

impl Default for TerrainParameters {
    fn default() -> Self {
        Self {
            grid_scale: 2.0,
            h: 1.0,
            lacunarity: 2.0,
            octaves: 10,
        }
    }
}

impl TerrainParameters {
    /// Copy with every field clamped into its valid range.
    pub fn clamped(self) -> Self {
        let fallback = Self::default();
        Self {
            grid_scale: clamp_grid_scale(self.grid_scale, fallback.grid_scale),
            h: clamp_h(self.h, fallback.h),
            lacunarity: clamp_lacunarity(self.lacunarity, fallback.lacunarity),
            octaves: clamp_octaves(self.octaves),
        }
    }
}

/// NaN and `+inf` keep `current`; `-inf` lands on the minimum.
pub fn clamp_grid_scale(value: f32, current: f32) -> f32 {
    clamp_min(value, current, MIN_GRID_SCALE, "grid scale")
}

/// NaN keeps `current`; infinities land on the nearest bound.
pub fn clamp_h(value: f32, current: f32) -> f32 {
    if value.is_nan() {
        reject(value, current, "H")
    } else {
        value.clamp(MIN_H, MAX_H)
    }
}

pub fn clamp_lacunarity(value: f32, current: f32) -> f32 {
    clamp_min(value, current, MIN_LACUNARITY, "lacunarity")
}

pub fn clamp_octaves(value: i32) -> i32 {
    value.clamp(MIN_OCTAVES, MAX_OCTAVES)
}

// No upper bound, so +inf has no nearest valid value.
fn clamp_min(value: f32, current: f32, min: f32, what: &str) -> f32 {
    if value.is_nan() || value == f32::INFINITY {
        reject(value, current, what)
    } else {
        value.max(min)
    }
}

fn reject(value: f32, current: f32, what: &str) -> f32 {
    log::warn!("Ignoring {} = {}, keeping {}", what, value, current);
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp_octaves(50), MAX_OCTAVES);
        assert_eq!(clamp_octaves(0), MIN_OCTAVES);
        assert_eq!(clamp_lacunarity(-1.0, 2.0), MIN_LACUNARITY);
        assert_eq!(clamp_h(1.5, 0.5), 1.0);
        assert_eq!(clamp_h(-0.2, 0.5), 0.0);
        assert_eq!(clamp_grid_scale(-3.0, 2.0), MIN_GRID_SCALE);
    }

    #[test]
    fn test_non_finite_keeps_current() {
        assert_eq!(clamp_h(f32::NAN, 0.25), 0.25);
        assert_eq!(clamp_lacunarity(f32::NAN, 3.0), 3.0);
        assert_eq!(clamp_lacunarity(f32::INFINITY, 3.0), 3.0);
        assert_eq!(clamp_grid_scale(f32::INFINITY, 2.0), 2.0);
    }

    #[test]
    fn test_infinities_clamp_to_nearest_bound() {
        assert_eq!(clamp_h(f32::INFINITY, 0.3), MAX_H);
        assert_eq!(clamp_h(f32::NEG_INFINITY, 0.3), MIN_H);
        assert_eq!(clamp_lacunarity(f32::NEG_INFINITY, 2.0), MIN_LACUNARITY);
        assert_eq!(clamp_grid_scale(f32::NEG_INFINITY, 2.0), MIN_GRID_SCALE);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: TerrainParameters = serde_json::from_str(r#"{"octaves": 4}"#).unwrap();
        assert_eq!(params.octaves, 4);
        assert_eq!(params.h, TerrainParameters::default().h);
    }

    #[test]
    fn test_clamped() {
        let params = TerrainParameters {
            grid_scale: 0.0,
            h: 2.0,
            lacunarity: -1.0,
            octaves: 99,
        }
        .clamped();
        assert_eq!(params.grid_scale, MIN_GRID_SCALE);
        assert_eq!(params.h, MAX_H);
        assert!(params.lacunarity > 0.0);
        assert_eq!(params.octaves, MAX_OCTAVES);
    }
}
