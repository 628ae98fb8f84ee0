use chrono::{DateTime, SecondsFormat, Utc};
use ocr_table_core::{Detection, TableReconstruction};
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "paddleocr";
pub const SERVICE_VERSION: &str = "1.0.0";

pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff", "tif"];
pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/bmp",
    "image/webp",
    "image/tiff",
];

pub const DETECTIONS_CACHE_KEY_PREFIX: &str = "detections:v1:";
pub const DETECTIONS_CACHE_TTL_SECONDS: u32 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: Some(SERVICE_VERSION.to_string()),
            error: None,
        }
    }

    #[must_use]
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BlockSummary {
    pub text: String,
    pub confidence: f64,
    pub bbox: [[f64; 2]; 4],
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CellSummary {
    pub row: usize,
    pub column: usize,
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OcrResponse {
    pub success: bool,
    pub text: String,
    pub confidence: f64,
    pub block_count: usize,
    pub row_count: usize,
    pub column_count: usize,
    pub blocks: Vec<BlockSummary>,
    pub table: Vec<Vec<String>>,
    pub row_confidences: Vec<Vec<f64>>,
    pub cells: Vec<CellSummary>,
    pub diagnostics: Vec<String>,
    pub processed_at: String,
    pub cached: bool,
}

/// Rounds a confidence to four decimals for the response body.
#[must_use]
pub fn round_confidence(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

impl OcrResponse {
    /// `detections` must be the input the table was reconstructed from.
    #[must_use]
    pub fn from_reconstruction(
        detections: &[Detection],
        table: &TableReconstruction,
        cached: bool,
        processed_at: DateTime<Utc>,
    ) -> Self {
        let blocks = table
            .blocks
            .iter()
            .zip(detections)
            .map(|(block, detection)| BlockSummary {
                text: block.text.clone(),
                confidence: round_confidence(block.confidence),
                bbox: detection.bbox.map(<[f64; 2]>::from),
            })
            .collect();

        Self {
            success: true,
            text: table.text.clone(),
            confidence: round_confidence(table.average_confidence),
            block_count: table.block_count(),
            row_count: table.row_count(),
            column_count: table.column_count,
            blocks,
            table: table
                .rows
                .iter()
                .map(|row| row.texts().into_iter().map(str::to_string).collect())
                .collect(),
            row_confidences: table
                .rows
                .iter()
                .map(|row| row.confidences().into_iter().map(round_confidence).collect())
                .collect(),
            cells: table
                .cells
                .iter()
                .map(|cell| CellSummary {
                    row: cell.row,
                    column: cell.column,
                    text: cell.text.clone(),
                    confidence: round_confidence(cell.confidence),
                })
                .collect(),
            diagnostics: table.diagnostics.lines(),
            processed_at: processed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            cached,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
