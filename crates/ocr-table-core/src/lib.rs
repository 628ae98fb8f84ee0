mod cells;
mod columns;
mod csv_out;
mod diagnostics;
mod error;
mod input;
mod model;
mod normalize;
mod options;
mod rows;
mod serialize;

use std::path::Path;

use crate::cells::assign_cells;
use crate::columns::{detect_column_boundaries, gap_threshold};
use crate::csv_out::write_csv;
use crate::normalize::normalize_detections;
use crate::rows::cluster_rows;
use crate::serialize::build_reconstruction;

pub use cells::column_index;
pub use diagnostics::{Diagnostic, DiagnosticCode, RunLog, Stage};
pub use error::TableError;
pub use input::{parse_detections_json, read_detections};
pub use model::{Block, Detection, FlatCell, Point, Row, TableCell, TableReconstruction, TableRow};
pub use normalize::respace_text;
pub use options::{
    DEFAULT_GAP_THRESHOLD_RATIO, DEFAULT_MEDIAN_WIDTH, DEFAULT_ROW_THRESHOLD_RATIO, OutputFormat,
    ReconstructOptions,
};
pub use serialize::{average_confidence, render, table_text};

/// Rebuilds the table layout of one document from its detections.
///
/// Never fails: empty or degenerate input produces an empty or degenerate
/// table. Each call owns its intermediate state, so concurrent calls are
/// independent.
#[must_use]
pub fn reconstruct_table(
    detections: &[Detection],
    options: &ReconstructOptions,
) -> TableReconstruction {
    let mut log = RunLog::new();
    let blocks = normalize_detections(detections, options, &mut log);

    let (table_rows, boundaries) = {
        let rows = cluster_rows(&blocks, options.row_threshold_ratio, &mut log);
        let boundaries = detect_column_boundaries(&blocks, options, &mut log);
        let gap = gap_threshold(&blocks, options);
        (assign_cells(&rows, &boundaries, gap, &mut log), boundaries)
    };

    build_reconstruction(blocks, table_rows, boundaries, log)
}

/// Parses detections JSON and reconstructs the table.
pub fn reconstruct_json(
    input: &str,
    options: &ReconstructOptions,
) -> Result<TableReconstruction, TableError> {
    options.validate()?;
    let detections = parse_detections_json(input)?;
    Ok(reconstruct_table(&detections, options))
}

/// Reads a detections file, reconstructs the table and writes it to `output`.
pub fn reconstruct_file(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    options: &ReconstructOptions,
) -> Result<TableReconstruction, TableError> {
    options.validate()?;
    let detections = read_detections(input)?;
    let table = reconstruct_table(&detections, options);

    match format {
        OutputFormat::Csv => write_csv(output, &table.rows, options.delimiter)?,
        OutputFormat::Tsv => write_csv(output, &table.rows, b'\t')?,
        OutputFormat::Json | OutputFormat::Text => {
            std::fs::write(output, render(&table, format, options.delimiter)?)?;
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::reconstruct_table;
    use crate::model::Detection;
    use crate::options::ReconstructOptions;

    #[test]
    fn empty_input_produces_empty_table() {
        let table = reconstruct_table(&[], &ReconstructOptions::default());
        assert!(table.rows.is_empty());
        assert!(table.cells.is_empty());
        assert_eq!(table.column_count, 0);
        assert_eq!(table.average_confidence, 0.0);
        assert_eq!(table.text, "");
    }

    #[test]
    fn single_block_produces_one_by_one_table() {
        let detection = Detection::from_rect(12.0, 30.0, 60.0, 18.0, "Invoice", 0.87);
        let table = reconstruct_table(&[detection], &ReconstructOptions::default());

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count, 1);
        assert_eq!(table.rows[0].cells[0].text, "Invoice");
        assert_eq!(table.rows[0].cells[0].confidence, 0.87);
        assert_eq!(table.average_confidence, 0.87);
        assert_eq!(table.text, "Invoice");
    }

    #[test]
    fn two_rows_of_three_columns() {
        let layout = [
            (0.0, 0.0, "Item", 0.91),
            (200.0, 0.0, "Qty", 0.82),
            (400.0, 0.0, "Price", 0.95),
            (0.0, 40.0, "Pen", 0.77),
            (200.0, 40.0, "3", 0.66),
            (400.0, 40.0, "1.50", 0.89),
        ];
        let detections = layout
            .iter()
            .rev()
            .map(|&(x, y, text, confidence)| Detection::from_rect(x, y, 80.0, 20.0, text, confidence))
            .collect::<Vec<_>>();

        let table = reconstruct_table(&detections, &ReconstructOptions::default());

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count, 3);
        assert_eq!(table.rows[0].texts(), vec!["Item", "Qty", "Price"]);
        assert_eq!(table.rows[1].texts(), vec!["Pen", "3", "1.50"]);
        assert_eq!(table.cells.len(), 6);
        assert_eq!(table.text, "Item\tQty\tPrice\nPen\t3\t1.50");

        let expected = layout.iter().map(|entry| entry.3).sum::<f64>() / 6.0;
        assert!((table.average_confidence - expected).abs() < 1e-6);
    }

    #[test]
    fn close_blocks_in_one_row_share_a_cell() {
        let detections = vec![
            Detection::from_rect(0.0, 0.0, 80.0, 20.0, "Unit", 0.7),
            Detection::from_rect(15.0, 1.0, 80.0, 20.0, "price", 0.9),
            Detection::from_rect(200.0, 0.0, 80.0, 20.0, "Total", 0.8),
        ];
        let table = reconstruct_table(&detections, &ReconstructOptions::default());

        assert_eq!(table.column_count, 2);
        assert_eq!(table.rows[0].cells[0].text, "Unit price");
        assert_eq!(table.rows[0].cells[0].confidence, 0.9);
        assert_eq!(table.cells.len(), 2);
        assert_eq!(table.block_count(), 3);
    }
}
