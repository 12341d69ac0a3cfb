mod buffer;
mod camera;
pub mod capture;
mod context;
mod error;
mod pipeline;
mod renderer;
mod uniform;
mod vertex;

pub use buffer::*;
pub use camera::*;
pub use capture::FrameCapture;
pub use context::*;
pub use error::*;
pub use pipeline::*;
pub use renderer::*;
pub use uniform::*;
