//! shelfscan-id library interface
//!
//! Identifies books from OCR text of a bookshelf photograph:
//! - `models`: spines, fragments and the shelf arena that indexes them
//! - `services`: normalisation, spine extraction, scoring, catalogue search
//! - `engine`: phased identification with broken-spine healing
//! - `report`: OCR input loading and JSON report output

pub mod engine;
pub mod error;
pub mod models;
pub mod report;
pub mod services;

pub use crate::engine::{EngineSettings, IdentificationEngine};
pub use crate::error::{Error, Result};
pub use crate::models::Shelf;
