//! Render pipelines

pub mod fur;

pub use fur::{FurPipeline, FurUniforms};
