//! # shelfscan Common Library
//!
//! Shared code for the shelfscan crates:
//! - Error type
//! - Configuration loading (TOML file, environment overrides, defaults)

pub mod config;
pub mod error;

pub use error::{Error, Result};
