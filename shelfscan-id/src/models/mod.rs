//! Data models for spine identification

pub mod fragment;
pub mod ocr;
pub mod shelf;
pub mod spine;

pub use fragment::{BoundingPoly, Fragment, Vertex};
pub use ocr::{parse_ocr_json, OcrError};
pub use shelf::Shelf;
pub use spine::Spine;
