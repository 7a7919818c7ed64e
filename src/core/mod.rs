//! Core library infrastructure

pub mod error;
pub mod logging;

pub use error::Error;
