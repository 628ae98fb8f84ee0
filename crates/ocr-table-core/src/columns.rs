use crate::diagnostics::{RunLog, Stage};
use crate::model::Block;
use crate::options::ReconstructOptions;
use crate::rows::lower_median;

/// Horizontal tolerance shared by boundary detection and cell assignment.
#[must_use]
pub fn gap_threshold(blocks: &[Block], options: &ReconstructOptions) -> f64 {
    let median_width = lower_median(blocks.iter().map(|block| block.width).collect())
        .unwrap_or(options.default_median_width);
    median_width * options.gap_threshold_ratio
}

/// Derives global column start positions from every block's left edge.
///
/// A left edge opens a new column only when it is at least the gap threshold
/// away from every boundary accepted so far.
pub fn detect_column_boundaries(
    blocks: &[Block],
    options: &ReconstructOptions,
    log: &mut RunLog,
) -> Vec<f64> {
    let threshold = gap_threshold(blocks, options);

    let mut edges = blocks.iter().map(|block| block.x_min).collect::<Vec<_>>();
    edges.sort_by(f64::total_cmp);

    let mut boundaries: Vec<f64> = Vec::new();
    for x in edges {
        if boundaries
            .iter()
            .all(|boundary| (x - boundary).abs() >= threshold)
        {
            boundaries.push(x);
        }
    }
    boundaries.sort_by(f64::total_cmp);

    log.summary(
        Stage::ColumnDetect,
        format!(
            "gap threshold {threshold:.2}; detected {} column boundary(ies)",
            boundaries.len()
        ),
    );
    boundaries
}
