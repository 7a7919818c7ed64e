//! Shader stage/program lifecycle and reflection

pub mod program;
pub mod stage;

pub use program::{ShaderProgram, UniformBinding};
pub use stage::{ShaderStage, StageKind};
