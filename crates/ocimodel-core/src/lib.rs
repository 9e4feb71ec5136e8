//! ocimodel-core: Core types for ocimodel
//!
//! This crate provides the types shared by the other ocimodel crates:
//! - Error handling
//! - Configuration (file, environment and defaults)
//! - Model kind and registry credentials

pub mod config;
pub mod error;
pub mod model;

pub use config::*;
pub use error::*;
pub use model::*;
