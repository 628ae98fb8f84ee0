use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Normalize,
    RowCluster,
    ColumnDetect,
    CellAssign,
    Serialize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    StageSummary,
    EmptyInput,
    NonFiniteGeometry,
    ClampedGeometry,
    CellMerged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(stage: Stage, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            stage,
            code,
            message: message.into(),
            block: None,
            row: None,
            column: None,
        }
    }

    #[must_use]
    pub fn with_block(mut self, block: usize) -> Self {
        self.block = Some(block);
        self
    }

    #[must_use]
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}

/// Diagnostic trail of a single reconstruction run.
///
/// Each stage receives the log explicitly; it is returned alongside the
/// table so concurrent runs never share entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RunLog {
    entries: Vec<Diagnostic>,
}

impl RunLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        match diagnostic.code {
            DiagnosticCode::NonFiniteGeometry | DiagnosticCode::ClampedGeometry => {
                tracing::warn!(
                    stage = ?diagnostic.stage,
                    block = ?diagnostic.block,
                    "{}",
                    diagnostic.message
                );
            }
            _ => {
                tracing::debug!(
                    stage = ?diagnostic.stage,
                    code = ?diagnostic.code,
                    "{}",
                    diagnostic.message
                );
            }
        }
        self.entries.push(diagnostic);
    }

    pub fn summary(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(Diagnostic::new(stage, DiagnosticCode::StageSummary, message));
    }

    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.entries.iter().filter(|entry| entry.code == code).count()
    }

    /// One human readable line per entry.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| {
                let mut line = format!("[{:?}] {}", entry.stage, entry.message);
                if let Some(row) = entry.row {
                    line.push_str(&format!(" row={row}"));
                }
                if let Some(column) = entry.column {
                    line.push_str(&format!(" column={column}"));
                }
                line
            })
            .collect()
    }
}
