use crate::diagnostics::{Diagnostic, DiagnosticCode, RunLog, Stage};
use crate::model::{Block, Row};

/// Element at index `n / 2` of the sorted values, `None` when empty.
pub(crate) fn lower_median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(values[values.len() / 2])
}

#[must_use]
pub fn row_threshold(blocks: &[Block], ratio: f64) -> Option<f64> {
    lower_median(blocks.iter().map(|block| block.height).collect()).map(|median| median * ratio)
}

/// Groups blocks into top-to-bottom rows.
///
/// Each block is compared with the last block appended to the current row,
/// so a row may drift beyond the threshold over several blocks.
pub fn cluster_rows<'a>(blocks: &'a [Block], ratio: f64, log: &mut RunLog) -> Vec<Row<'a>> {
    let Some(threshold) = row_threshold(blocks, ratio) else {
        log.record(Diagnostic::new(
            Stage::RowCluster,
            DiagnosticCode::EmptyInput,
            "no blocks; row clustering skipped",
        ));
        return Vec::new();
    };

    let mut sorted = blocks.iter().collect::<Vec<_>>();
    sorted.sort_by(|left, right| left.y_center.total_cmp(&right.y_center));

    let mut rows = Vec::new();
    let mut current: Vec<&Block> = Vec::new();
    for block in sorted {
        if let Some(last) = current.last()
            && (block.y_center - last.y_center).abs() >= threshold
        {
            rows.push(Row {
                blocks: std::mem::take(&mut current),
            });
        }
        current.push(block);
    }
    if !current.is_empty() {
        rows.push(Row { blocks: current });
    }

    for row in &mut rows {
        row.blocks
            .sort_by(|left, right| left.x_min.total_cmp(&right.x_min));
    }

    log.summary(
        Stage::RowCluster,
        format!(
            "row threshold {threshold:.2}; clustered {} block(s) into {} row(s)",
            blocks.len(),
            rows.len()
        ),
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::{cluster_rows, lower_median};
    use crate::diagnostics::{DiagnosticCode, RunLog};
    use crate::model::{Block, Detection};
    use crate::normalize::normalize_detections;
    use crate::options::ReconstructOptions;

    fn blocks(rects: &[(f64, f64, f64, f64)]) -> Vec<Block> {
        let detections = rects
            .iter()
            .enumerate()
            .map(|(index, &(x, y, w, h))| Detection::from_rect(x, y, w, h, format!("b{index}"), 0.9))
            .collect::<Vec<_>>();
        let options = ReconstructOptions {
            respace_text: false,
            ..ReconstructOptions::default()
        };
        normalize_detections(&detections, &options, &mut RunLog::new())
    }

    fn row_texts(rows: &[crate::model::Row<'_>]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.blocks.iter().map(|block| block.text.clone()).collect())
            .collect()
    }

    #[test]
    fn lower_median_picks_index_half_len() {
        assert_eq!(lower_median(vec![]), None);
        assert_eq!(lower_median(vec![3.0]), Some(3.0));
        assert_eq!(lower_median(vec![4.0, 1.0, 3.0, 2.0]), Some(3.0));
        assert_eq!(lower_median(vec![5.0, 1.0, 3.0]), Some(3.0));
    }

    #[test]
    fn empty_input_yields_no_rows() {
        let mut log = RunLog::new();
        assert!(cluster_rows(&[], 0.7, &mut log).is_empty());
        assert_eq!(log.len(), 1);
        assert_eq!(log.count(DiagnosticCode::EmptyInput), 1);
    }

    #[test]
    fn groups_two_lines_and_orders_left_to_right() {
        let input = blocks(&[
            (200.0, 42.0, 80.0, 20.0),
            (0.0, 0.0, 80.0, 20.0),
            (200.0, 2.0, 80.0, 20.0),
            (0.0, 40.0, 80.0, 20.0),
        ]);
        let rows = cluster_rows(&input, 0.7, &mut RunLog::new());

        assert_eq!(
            row_texts(&rows),
            vec![vec!["b1", "b2"], vec!["b3", "b0"]]
        );
    }

    #[test]
    fn chains_against_last_block_not_row_anchor() {
        // threshold 14; each step is 10 but the total span is 30
        let input = blocks(&[
            (0.0, 0.0, 50.0, 20.0),
            (100.0, 10.0, 50.0, 20.0),
            (200.0, 20.0, 50.0, 20.0),
            (300.0, 30.0, 50.0, 20.0),
        ]);
        let rows = cluster_rows(&input, 0.7, &mut RunLog::new());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 4);
    }

    #[test]
    fn difference_equal_to_threshold_starts_new_row() {
        // heights 10 -> threshold 5; centers 5 and 10
        let input = blocks(&[(0.0, 0.0, 50.0, 10.0), (100.0, 5.0, 50.0, 10.0)]);
        let rows = cluster_rows(&input, 0.5, &mut RunLog::new());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn row_count_does_not_decrease_with_vertical_spread() {
        let mut previous = 0;
        for step in 0..=12 {
            #[allow(clippy::cast_precision_loss)]
            let spread = step as f64 * 4.0;
            let input = blocks(&[
                (0.0, 0.0, 50.0, 20.0),
                (100.0, spread, 50.0, 20.0),
                (200.0, spread * 2.0, 50.0, 20.0),
            ]);
            let count = cluster_rows(&input, 0.7, &mut RunLog::new()).len();
            assert!(count >= previous, "spread {spread}: {count} < {previous}");
            previous = count;
        }
        assert_eq!(previous, 3);
    }

    #[test]
    fn every_block_lands_in_exactly_one_row() {
        let input = blocks(&[
            (0.0, 0.0, 10.0, 12.0),
            (30.0, 3.0, 10.0, 12.0),
            (60.0, 50.0, 10.0, 12.0),
            (0.0, 90.0, 10.0, 12.0),
            (30.0, 91.0, 10.0, 12.0),
        ]);
        let rows = cluster_rows(&input, 0.7, &mut RunLog::new());

        let mut seen = rows
            .iter()
            .flat_map(|row| row.blocks.iter().map(|block| block.index))
            .collect::<Vec<_>>();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(rows.len(), 3);
    }
}
