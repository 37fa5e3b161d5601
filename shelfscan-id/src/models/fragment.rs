//! OCR word fragments

use serde::{Deserialize, Serialize};

/// One corner of a bounding polygon, in image pixels
///
/// The OCR provider omits coordinates that are zero, hence the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

/// Four-point polygon around a detected word
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

impl BoundingPoly {
    /// Largest axis-aligned extent between the two diagonal corners (0 and 3)
    ///
    /// Text on a spine may run horizontally or vertically, so the larger of
    /// the two spans approximates letter height either way. Polygons with
    /// fewer than four corners have no extent.
    pub fn max_dimension(&self) -> i32 {
        match (self.vertices.first(), self.vertices.get(3)) {
            (Some(a), Some(b)) => (a.x - b.x).abs().max((a.y - b.y).abs()),
            _ => 0,
        }
    }
}

/// A single OCR-detected word and the spine that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Detected text
    pub text: String,
    /// Pixel polygon around the text
    pub bounding_poly: BoundingPoly,
    /// Index into the shelf's spine array
    pub spine_index: usize,
    /// Set once the owning spine has been identified
    pub consumed: bool,
}

impl Fragment {
    pub fn new(text: impl Into<String>, bounding_poly: BoundingPoly) -> Self {
        Self {
            text: text.into(),
            bounding_poly,
            spine_index: 0,
            consumed: false,
        }
    }
}
