//! CPU side of the terrain: grid tessellation, fBm parameters, light and
//! the typed parameter bindings that the overlay drives.

pub mod bindings;
mod grid;
mod light;
pub mod params;
mod scene;
mod target;

pub use bindings::{ParamBindings, ParamId, ParamRange, ParamValue};
pub use grid::*;
pub use light::*;
pub use params::{TerrainParameters, MAX_H, MAX_OCTAVES, MIN_GRID_SCALE, MIN_LACUNARITY};
pub use scene::*;
pub use target::*;
