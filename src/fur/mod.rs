//! Procedural fur generation: density textures and shell geometry

pub mod config;
pub mod density;
pub mod shell;

pub use config::FurConfig;
pub use density::FurDensityMap;
pub use shell::{expand_shells, ShellVertex, SurfaceVertex};
