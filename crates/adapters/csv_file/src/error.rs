//! CSV adapter error types.

use cardtrail_domain::error::TrackerError;

/// Errors reading or appending the CSV output.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("CSV I/O failed")]
    Io(#[from] std::io::Error),

    #[error("CSV parse failed")]
    Csv(#[from] csv::Error),

    /// A row has fewer than the four expected columns.
    #[error("row at line {line} has {found} columns, expected 4")]
    ShortRow { line: u64, found: usize },

    /// The blocking file task panicked or was cancelled.
    #[error("CSV task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl From<CsvError> for TrackerError {
    fn from(err: CsvError) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_to_storage_error() {
        let err: TrackerError = CsvError::ShortRow { line: 3, found: 2 }.into();
        assert!(matches!(err, TrackerError::Storage(_)));
    }

    #[test]
    fn should_display_short_row() {
        let err = CsvError::ShortRow { line: 3, found: 2 };
        assert_eq!(err.to_string(), "row at line 3 has 2 columns, expected 4");
    }
}
