use std::path::Path;

use serde::Deserialize;

use crate::error::TableError;
use crate::model::Detection;

#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionDocument {
    List(Vec<Detection>),
    Wrapped { detections: Vec<Detection> },
}

/// Parses detections from either a bare JSON array or `{"detections": [...]}`.
///
/// Each entry may be an object with `bbox`, `text` and `confidence`, or a
/// PaddleOCR line `[[[x, y], ...], ["text", confidence]]`.
pub fn parse_detections_json(input: &str) -> Result<Vec<Detection>, TableError> {
    let document = serde_json::from_str::<DetectionDocument>(input)?;
    Ok(match document {
        DetectionDocument::List(detections) | DetectionDocument::Wrapped { detections } => {
            detections
        }
    })
}

pub fn read_detections(path: &Path) -> Result<Vec<Detection>, TableError> {
    let raw = std::fs::read_to_string(path)?;
    parse_detections_json(&raw)
}
