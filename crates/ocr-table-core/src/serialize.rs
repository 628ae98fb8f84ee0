use crate::csv_out::write_csv_to_string;
use crate::diagnostics::{RunLog, Stage};
use crate::error::TableError;
use crate::model::{Block, FlatCell, TableReconstruction, TableRow};
use crate::options::OutputFormat;

/// Cells joined by tabs, rows joined by newlines. Empty cells keep their slot.
#[must_use]
pub fn table_text(rows: &[TableRow]) -> String {
    rows.iter()
        .map(|row| row.texts().join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn flatten_cells(rows: &[TableRow]) -> Vec<FlatCell> {
    rows.iter()
        .enumerate()
        .flat_map(|(row_index, row)| {
            row.cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .map(move |(column, cell)| FlatCell {
                    row: row_index,
                    column,
                    text: cell.text.clone(),
                    confidence: cell.confidence,
                })
        })
        .collect()
}

/// Unweighted mean over the original blocks, 0 when there are none.
#[must_use]
pub fn average_confidence(blocks: &[Block]) -> f64 {
    if blocks.is_empty() {
        return 0.0;
    }
    let sum = blocks.iter().map(|block| block.confidence).sum::<f64>();
    #[allow(clippy::cast_precision_loss)]
    let count = blocks.len() as f64;
    sum / count
}

pub(crate) fn build_reconstruction(
    blocks: Vec<Block>,
    rows: Vec<TableRow>,
    boundaries: Vec<f64>,
    mut log: RunLog,
) -> TableReconstruction {
    let cells = flatten_cells(&rows);
    let text = table_text(&rows);
    let average_confidence = average_confidence(&blocks);

    log.summary(
        Stage::Serialize,
        format!(
            "table {}x{} with {} non-empty cell(s), average confidence {average_confidence:.4}",
            rows.len(),
            boundaries.len(),
            cells.len()
        ),
    );

    TableReconstruction {
        column_count: boundaries.len(),
        rows,
        cells,
        text,
        average_confidence,
        boundaries,
        blocks,
        diagnostics: log,
    }
}

/// Renders a reconstructed table in the requested format.
///
/// `delimiter` only applies to CSV; TSV always uses a tab.
pub fn render(
    table: &TableReconstruction,
    format: OutputFormat,
    delimiter: u8,
) -> Result<String, TableError> {
    match format {
        OutputFormat::Csv => write_csv_to_string(&table.rows, delimiter),
        OutputFormat::Tsv => write_csv_to_string(&table.rows, b'\t'),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(table)?),
        OutputFormat::Text => Ok(table.text.clone()),
    }
}
