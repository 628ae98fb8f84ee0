use std::str::FromStr;

use crate::error::TableError;

pub const DEFAULT_ROW_THRESHOLD_RATIO: f64 = 0.7;
pub const DEFAULT_GAP_THRESHOLD_RATIO: f64 = 0.3;
pub const DEFAULT_MEDIAN_WIDTH: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!(
                "unknown output format '{other}', expected csv, tsv, json or text"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructOptions {
    /// Multiplier on the median block height giving the row threshold.
    pub row_threshold_ratio: f64,
    /// Multiplier on the median block width giving the column gap threshold.
    pub gap_threshold_ratio: f64,
    /// Median width used when there are no blocks to measure.
    pub default_median_width: f64,
    pub respace_text: bool,
    pub delimiter: u8,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            row_threshold_ratio: DEFAULT_ROW_THRESHOLD_RATIO,
            gap_threshold_ratio: DEFAULT_GAP_THRESHOLD_RATIO,
            default_median_width: DEFAULT_MEDIAN_WIDTH,
            respace_text: true,
            delimiter: b',',
        }
    }
}

impl ReconstructOptions {
    pub fn validate(&self) -> Result<(), TableError> {
        let positive = [
            ("row_threshold_ratio", self.row_threshold_ratio),
            ("gap_threshold_ratio", self.gap_threshold_ratio),
            ("default_median_width", self.default_median_width),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TableError::InvalidOption(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }

        if !self.delimiter.is_ascii() {
            return Err(TableError::InvalidOption(
                "delimiter must be a single ASCII character".to_string(),
            ));
        }

        Ok(())
    }
}
