use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostics::{Diagnostic, DiagnosticCode, RunLog, Stage};
use crate::model::{Block, Detection, Point};
use crate::options::ReconstructOptions;

static LOWER_THEN_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])(\d)").expect("hardcoded respacing regex is valid"));
static LOWER_THEN_UPPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("hardcoded respacing regex is valid"));

/// Splits glued OCR tokens: `abc123` becomes `abc 123` and `totalAmount`
/// becomes `total Amount`.
#[must_use]
pub fn respace_text(text: &str) -> String {
    let spaced = LOWER_THEN_DIGIT_RE.replace_all(text, "$1 $2");
    LOWER_THEN_UPPER_RE.replace_all(&spaced, "$1 $2").into_owned()
}

fn finite_or_zero(value: f64) -> (f64, bool) {
    if value.is_finite() {
        (value, false)
    } else {
        (0.0, true)
    }
}

fn sanitize_corners(bbox: &[Point; 4]) -> ([Point; 4], bool) {
    let mut replaced = false;
    let corners = bbox.map(|point| {
        let (x, bad_x) = finite_or_zero(point.x);
        let (y, bad_y) = finite_or_zero(point.y);
        replaced |= bad_x || bad_y;
        Point::new(x, y)
    });
    (corners, replaced)
}

fn block_from_detection(
    index: usize,
    detection: &Detection,
    options: &ReconstructOptions,
    log: &mut RunLog,
) -> Block {
    let (corners, replaced) = sanitize_corners(&detection.bbox);
    if replaced {
        log.record(
            Diagnostic::new(
                Stage::Normalize,
                DiagnosticCode::NonFiniteGeometry,
                "non-finite coordinate replaced by 0",
            )
            .with_block(index),
        );
    }
    let [top_left, top_right, bottom_right, bottom_left] = corners;

    let x_min = top_left.x.min(bottom_left.x);
    let raw_x_max = top_right.x.max(bottom_right.x);
    let y_min = top_left.y.min(top_right.y);
    let raw_y_max = bottom_left.y.max(bottom_right.y);

    if raw_x_max < x_min || raw_y_max < y_min {
        log.record(
            Diagnostic::new(
                Stage::Normalize,
                DiagnosticCode::ClampedGeometry,
                "inverted quadrilateral clamped to zero extent",
            )
            .with_block(index),
        );
    }
    let x_max = raw_x_max.max(x_min);
    let y_max = raw_y_max.max(y_min);

    let text = if options.respace_text {
        respace_text(&detection.text)
    } else {
        detection.text.clone()
    };

    Block {
        index,
        text,
        confidence: detection.confidence,
        x_min,
        x_max,
        y_min,
        y_max,
        x_center: (x_min + x_max) / 2.0,
        y_center: (y_min + y_max) / 2.0,
        width: x_max - x_min,
        height: y_max - y_min,
    }
}

/// Builds exactly one block per detection, preserving input order.
pub fn normalize_detections(
    detections: &[Detection],
    options: &ReconstructOptions,
    log: &mut RunLog,
) -> Vec<Block> {
    let blocks = detections
        .iter()
        .enumerate()
        .map(|(index, detection)| block_from_detection(index, detection, options, log))
        .collect::<Vec<_>>();

    log.summary(
        Stage::Normalize,
        format!("normalized {} detection(s) into blocks", blocks.len()),
    );
    blocks
}
