//! fBm terrain viewer.
//!
//! A unit-square grid is tessellated on the CPU ([`terrain::GridMesh`]) and
//! displaced on the GPU by a fractal Brownian motion height function whose
//! parameters live in [`terrain::TerrainParameters`]. [`terrain::TerrainScene`]
//! keeps those parameters, the mesh and the light in sync with the shader's
//! uniform block through a [`terrain::TerrainTarget`]; [`render`] supplies the
//! wgpu side (camera, buffers, pipelines, frame capture).

pub mod render;
pub mod terrain;
pub mod util;
