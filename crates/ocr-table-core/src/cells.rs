use crate::diagnostics::{Diagnostic, DiagnosticCode, RunLog, Stage};
use crate::model::{Row, TableRow};

/// Column of the rightmost boundary `b` with `x_min >= b - gap_threshold`.
///
/// `boundaries` must be ascending, which makes the predicate true for a
/// prefix, so a binary search finds the last qualifying index. Equal
/// boundaries resolve to the highest index. A left edge that passes no
/// boundary falls back to column 0.
#[must_use]
pub fn column_index(x_min: f64, boundaries: &[f64], gap_threshold: f64) -> usize {
    boundaries
        .partition_point(|&boundary| x_min >= boundary - gap_threshold)
        .saturating_sub(1)
}

/// Places every block of every row into its column cell.
///
/// Blocks landing in an occupied cell are appended after a single space;
/// the cell keeps the highest confidence seen.
pub fn assign_cells(
    rows: &[Row<'_>],
    boundaries: &[f64],
    gap_threshold: f64,
    log: &mut RunLog,
) -> Vec<TableRow> {
    let width = boundaries.len();
    let mut merged = 0_usize;

    let table_rows = rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let mut table_row = TableRow::with_width(width);
            if width == 0 {
                return table_row;
            }

            for block in &row.blocks {
                let column = column_index(block.x_min, boundaries, gap_threshold);
                let cell = &mut table_row.cells[column];
                if cell.text.is_empty() {
                    cell.text.clone_from(&block.text);
                } else {
                    cell.text.push(' ');
                    cell.text.push_str(&block.text);
                    merged += 1;
                    log.record(
                        Diagnostic::new(
                            Stage::CellAssign,
                            DiagnosticCode::CellMerged,
                            format!("block {} merged into occupied cell", block.index),
                        )
                        .with_block(block.index)
                        .with_row(row_index)
                        .with_column(column),
                    );
                }
                cell.confidence = cell.confidence.max(block.confidence);
            }
            table_row
        })
        .collect::<Vec<_>>();

    log.summary(
        Stage::CellAssign,
        format!(
            "assigned cells for {} row(s) x {width} column(s); {merged} merge(s)",
            table_rows.len()
        ),
    );
    table_rows
}

#[cfg(test)]
mod tests {
    use super::{assign_cells, column_index};
    use crate::columns::{detect_column_boundaries, gap_threshold};
    use crate::diagnostics::{DiagnosticCode, RunLog};
    use crate::model::{Block, Detection};
    use crate::normalize::normalize_detections;
    use crate::options::ReconstructOptions;
    use crate::rows::cluster_rows;

    fn blocks(items: &[(f64, f64, &str, f64)]) -> Vec<Block> {
        let detections = items
            .iter()
            .map(|&(x, y, text, confidence)| Detection::from_rect(x, y, 80.0, 20.0, text, confidence))
            .collect::<Vec<_>>();
        normalize_detections(&detections, &ReconstructOptions::default(), &mut RunLog::new())
    }

    #[test]
    fn picks_last_boundary_within_tolerance() {
        let boundaries = [0.0, 100.0, 200.0];
        assert_eq!(column_index(0.0, &boundaries, 10.0), 0);
        assert_eq!(column_index(95.0, &boundaries, 10.0), 1);
        assert_eq!(column_index(89.0, &boundaries, 10.0), 0);
        assert_eq!(column_index(500.0, &boundaries, 10.0), 2);
        assert_eq!(column_index(-50.0, &boundaries, 10.0), 0);
        assert_eq!(column_index(50.0, &[0.0, 50.0, 50.0], 0.0), 2);
    }

    #[test]
    fn merges_colliding_blocks_in_left_to_right_order() {
        let input = blocks(&[
            (10.0, 0.0, "World", 0.6),
            (0.0, 0.0, "Hello", 0.9),
            (200.0, 0.0, "Qty", 0.7),
        ]);
        let options = ReconstructOptions::default();
        let mut log = RunLog::new();
        let rows = cluster_rows(&input, options.row_threshold_ratio, &mut log);
        let boundaries = detect_column_boundaries(&input, &options, &mut log);
        let table = assign_cells(&rows, &boundaries, gap_threshold(&input, &options), &mut log);

        assert_eq!(boundaries.len(), 2);
        assert_eq!(table[0].texts(), vec!["Hello World", "Qty"]);
        assert_eq!(table[0].confidences(), vec![0.9, 0.7]);
        assert_eq!(log.count(DiagnosticCode::CellMerged), 1);
    }

    #[test]
    fn missing_cells_stay_empty_with_zero_confidence() {
        let input = blocks(&[
            (0.0, 0.0, "a", 0.9),
            (200.0, 0.0, "b", 0.9),
            (200.0, 50.0, "c", 0.8),
        ]);
        let options = ReconstructOptions::default();
        let mut log = RunLog::new();
        let rows = cluster_rows(&input, options.row_threshold_ratio, &mut log);
        let boundaries = detect_column_boundaries(&input, &options, &mut log);
        let table = assign_cells(&rows, &boundaries, gap_threshold(&input, &options), &mut log);

        assert_eq!(table.len(), 2);
        assert_eq!(table[1].texts(), vec!["", "c"]);
        assert_eq!(table[1].confidences(), vec![0.0, 0.8]);
    }

    #[test]
    fn assignment_is_idempotent() {
        let input = blocks(&[
            (0.0, 0.0, "a", 0.5),
            (15.0, 0.0, "b", 0.6),
            (200.0, 0.0, "c", 0.7),
            (0.0, 60.0, "d", 0.8),
        ]);
        let options = ReconstructOptions::default();
        let mut log = RunLog::new();
        let rows = cluster_rows(&input, options.row_threshold_ratio, &mut log);
        let boundaries = detect_column_boundaries(&input, &options, &mut log);
        let gap = gap_threshold(&input, &options);

        let first = assign_cells(&rows, &boundaries, gap, &mut log);
        let second = assign_cells(&rows, &boundaries, gap, &mut log);
        assert_eq!(first, second);
    }
}
