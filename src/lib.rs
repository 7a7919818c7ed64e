//! Furshell - a shell-textured fur rendering library
//!
//! Fur is drawn as a stack of concentric copies of a base mesh, each
//! offset along the vertex normals; a procedurally generated density
//! texture decides, per texel and per layer, whether a fragment shows a
//! hair strand. This crate covers the setup side of that technique:
//! density map generation ([`fur::density`]), shell expansion
//! ([`fur::shell`]), validated shader compilation and reflection
//! ([`shader`]), PNG decode with exact pixel sampling ([`texture`]),
//! and the GPU upload/draw surface ([`render`]). Window and context
//! creation, input, and the frame loop belong to the driver.

pub mod core;
pub mod fur;
pub mod render;
pub mod shader;
pub mod texture;
