//! Rendering system and GPU interfaces

pub mod geometry;
pub mod pipeline;
pub mod texture;

pub use geometry::FurGeometry;
pub use pipeline::{FurPipeline, FurUniforms};
pub use texture::{DensityTexture, ImageTexture};
