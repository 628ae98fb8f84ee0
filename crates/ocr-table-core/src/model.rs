use serde::{Deserialize, Serialize};

use crate::diagnostics::RunLog;

/// A corner of a detection quadrilateral, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// One recognized text fragment as produced by the OCR engine.
///
/// `bbox` holds the corners in reading order: top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDetection")]
pub struct Detection {
    pub bbox: [Point; 4],
    pub text: String,
    pub confidence: f64,
}

impl Detection {
    #[must_use]
    pub fn new(bbox: [Point; 4], text: impl Into<String>, confidence: f64) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }

    /// Axis-aligned detection spanning `x..x+width` and `y..y+height`.
    #[must_use]
    pub fn from_rect(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        text: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self::new(
            [
                Point::new(x, y),
                Point::new(x + width, y),
                Point::new(x + width, y + height),
                Point::new(x, y + height),
            ],
            text,
            confidence,
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDetection {
    Object {
        bbox: [Point; 4],
        text: String,
        confidence: f64,
    },
    // PaddleOCR line layout: [[box], [text, confidence]]
    Line([Point; 4], (String, f64)),
}

impl From<RawDetection> for Detection {
    fn from(raw: RawDetection) -> Self {
        match raw {
            RawDetection::Object {
                bbox,
                text,
                confidence,
            }
            | RawDetection::Line(bbox, (text, confidence)) => Self {
                bbox,
                text,
                confidence,
            },
        }
    }
}

/// A detection enriched with its axis-aligned extent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Position of the source detection in the input list.
    pub index: usize,
    pub text: String,
    pub confidence: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

/// Blocks sharing one visual line, ordered left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row<'a> {
    pub blocks: Vec<&'a Block>,
}

impl Row<'_> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableCell {
    pub text: String,
    pub confidence: f64,
}

impl TableCell {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One table row; always `column_count` cells wide.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    #[must_use]
    pub fn with_width(width: usize) -> Self {
        Self {
            cells: vec![TableCell::default(); width],
        }
    }

    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|cell| cell.text.as_str()).collect()
    }

    /// Per-column confidences, parallel to `cells`.
    #[must_use]
    pub fn confidences(&self) -> Vec<f64> {
        self.cells.iter().map(|cell| cell.confidence).collect()
    }
}

/// A non-empty cell tagged with its grid position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatCell {
    pub row: usize,
    pub column: usize,
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableReconstruction {
    pub rows: Vec<TableRow>,
    pub cells: Vec<FlatCell>,
    pub text: String,
    pub average_confidence: f64,
    pub column_count: usize,
    pub boundaries: Vec<f64>,
    pub blocks: Vec<Block>,
    pub diagnostics: RunLog,
}

impl TableReconstruction {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}
