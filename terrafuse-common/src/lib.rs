//! # TerraFuse Common Library
//!
//! Shared code for the TerraFuse crates including:
//! - Error types
//! - Geographic coordinates and range validation
//! - Configuration file resolution and logging configuration

pub mod config;
pub mod error;
pub mod geo;

pub use error::{Error, Result};
pub use geo::Coordinates;
