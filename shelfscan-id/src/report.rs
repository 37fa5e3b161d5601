//! Reading OCR input and writing the identification report

use crate::error::{Error, Result};
use crate::models::{parse_ocr_json, Shelf};
use crate::services::extract_spines;
use std::path::Path;
use tracing::info;

/// Read an OCR result file and extract its spines
pub fn load_shelf(path: &Path, prune_ratio: u32) -> Result<Shelf> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;

    let (lines, fragments) = parse_ocr_json(&content)?;
    info!(lines = lines.len(), fragments = fragments.len(), "Read OCR input");

    let shelf = extract_spines(&lines, fragments, prune_ratio)?;
    info!(spines = shelf.len(), "Extracted spines");

    Ok(shelf)
}

/// Pretty-printed `{ "spines": [...], "fragments": [...] }`
pub fn render_report(shelf: &Shelf) -> Result<String> {
    Ok(serde_json::to_string_pretty(shelf)?)
}

pub fn write_report(path: &Path, shelf: &Shelf) -> Result<()> {
    let report = render_report(shelf)?;

    std::fs::write(path, report).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), resolved = shelf.resolved_count(), "Wrote report");
    Ok(())
}
