//! Test Helper Utilities
//!
//! Shared utilities for testing shelfscan-id

#![allow(dead_code)]

pub mod fake_catalogue;
pub mod log_capture;

pub use fake_catalogue::FakeCatalogue;
pub use log_capture::{capture_logs, LogCapture};

use shelfscan_id::engine::{EngineSettings, IdentificationEngine};
use shelfscan_id::models::{BoundingPoly, Fragment, Shelf, Spine, Vertex};
use shelfscan_id::services::{SearchClient, SearchSettings};
use std::sync::Arc;

/// Shelf with one fragment per word, all of the same size
pub fn shelf_from_lines(lines: &[&str]) -> Shelf {
    let poly = BoundingPoly {
        vertices: vec![
            Vertex { x: 0, y: 0 },
            Vertex { x: 20, y: 0 },
            Vertex { x: 20, y: 60 },
            Vertex { x: 0, y: 60 },
        ],
    };

    let mut fragments = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        for word in line.split_whitespace() {
            let mut fragment = Fragment::new(word, poly.clone());
            fragment.spine_index = i;
            fragments.push(fragment);
        }
    }

    Shelf::new(lines.iter().map(|l| Spine::new(*l)).collect(), fragments)
}

pub fn fragment_indices(shelf: &Shelf) -> Vec<usize> {
    shelf.fragments.iter().map(|f| f.spine_index).collect()
}

/// Client and engine over `catalogue` with default settings
pub fn engine_for(catalogue: Arc<FakeCatalogue>) -> (Arc<SearchClient>, IdentificationEngine) {
    engine_with_settings(catalogue, EngineSettings::default())
}

pub fn engine_with_settings(
    catalogue: Arc<FakeCatalogue>,
    settings: EngineSettings,
) -> (Arc<SearchClient>, IdentificationEngine) {
    let client = Arc::new(SearchClient::new(catalogue, SearchSettings::default()));
    let engine = IdentificationEngine::new(Arc::clone(&client), settings);
    (client, engine)
}
