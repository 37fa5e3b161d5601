//! OCR input parsing
//!
//! The OCR provider returns a JSON array of text annotations. Element 0 is a
//! summary whose description holds every detected line separated by `\n`;
//! the remaining elements are individual words with their bounding polygons.

use super::{BoundingPoly, Fragment};
use serde::Deserialize;
use thiserror::Error;

/// OCR input errors
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Malformed OCR JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OCR input contains no annotations")]
    Empty,
}

/// One annotation as emitted by the OCR provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    bounding_poly: BoundingPoly,
}

/// Split raw OCR JSON into summary lines and word fragments
///
/// Fragments come back unconsumed with spine index 0; the spine extractor
/// assigns real indices.
pub fn parse_ocr_json(input: &str) -> Result<(Vec<String>, Vec<Fragment>), OcrError> {
    let annotations: Vec<TextAnnotation> = serde_json::from_str(input)?;

    let mut iter = annotations.into_iter();
    let summary = iter.next().ok_or(OcrError::Empty)?;

    let lines: Vec<String> = summary.description.split('\n').map(str::to_string).collect();
    tracing::debug!(lines = lines.len(), first = ?lines.first(), "Parsed OCR summary");

    let fragments = iter
        .map(|a| Fragment::new(a.description, a.bounding_poly))
        .collect();

    Ok((lines, fragments))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"locale": "en", "description": "PMC\nWalter Scott THE TALISMAN\n",
         "boundingPoly": {"vertices": [{"x": 97, "y": 660}, {"x": 3865, "y": 660}, {"x": 3865, "y": 2667}, {"x": 97, "y": 2667}]}},
        {"description": "PMC", "boundingPoly": {"vertices": [{"x": 333, "y": 688}, {"x": 423, "y": 690}, {"x": 422, "y": 726}, {"x": 332, "y": 724}]}},
        {"description": "Walter", "boundingPoly": {"vertices": [{"y": 692}, {"x": 3849, "y": 899}, {"x": 3798, "y": 899}, {"x": 3797, "y": 692}]}}
    ]"#;

    #[test]
    fn test_parse_lines_and_fragments() {
        let (lines, fragments) = parse_ocr_json(SAMPLE).unwrap();
        assert_eq!(lines, vec!["PMC", "Walter Scott THE TALISMAN", ""]);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "PMC");
        assert_eq!(fragments[0].bounding_poly.vertices[0].x, 333);
        assert!(!fragments[0].consumed);
    }

    #[test]
    fn test_missing_coordinate_defaults_to_zero() {
        let (_, fragments) = parse_ocr_json(SAMPLE).unwrap();
        assert_eq!(fragments[1].bounding_poly.vertices[0].x, 0);
        assert_eq!(fragments[1].bounding_poly.vertices[0].y, 692);
    }

    #[test]
    fn test_empty_array_rejected() {
        assert!(matches!(parse_ocr_json("[]"), Err(OcrError::Empty)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(parse_ocr_json("{not json"), Err(OcrError::Json(_))));
    }
}
