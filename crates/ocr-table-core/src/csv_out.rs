use std::path::Path;

use csv::WriterBuilder;

use crate::error::TableError;
use crate::model::TableRow;

pub(crate) fn write_csv(path: &Path, rows: &[TableRow], delimiter: u8) -> Result<(), TableError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_path(path)?;
    for row in rows {
        writer.write_record(row.texts())?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv_to_string(rows: &[TableRow], delimiter: u8) -> Result<String, TableError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(Vec::<u8>::new());
    for row in rows {
        writer.write_record(row.texts())?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| TableError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| TableError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

#[cfg(test)]
mod tests {
    use super::write_csv_to_string;
    use crate::model::{TableCell, TableRow};

    #[test]
    fn quotes_cells_containing_the_delimiter() {
        let rows = vec![TableRow {
            cells: vec![
                TableCell {
                    text: "1,5".to_string(),
                    confidence: 0.9,
                },
                TableCell::default(),
            ],
        }];
        let csv = write_csv_to_string(&rows, b',').expect("csv should render");
        assert_eq!(csv, "\"1,5\",\n");
    }
}
