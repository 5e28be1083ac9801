//! Ingestion and state error types.
//!
//! Every failure in the parse/validate phase is an [`IngestError`]. Its
//! `Display` string is the single message shown to the user for the upload
//! that failed; nothing is retried and previously accepted data is untouched.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while reading, parsing or validating one uploaded file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file name does not end in `.csv`.
    #[error("please upload a CSV file (got '{0}')")]
    InvalidExtension(String),

    /// The text is empty after trimming.
    #[error("the file is empty")]
    EmptyInput,

    /// A header was found but no data rows follow it.
    #[error("CSV file is empty: no data rows after the header")]
    EmptyData,

    /// Too few rows for the selected header layout.
    #[error("exam uploads need at least {required} rows (metadata, totals, headers, data); found {found}")]
    MalformedLayout { required: usize, found: usize },

    /// General upload without any name-like or student_id-like column.
    #[error("CSV must contain student name and ID columns")]
    MissingRequiredColumns,

    /// Exam upload without a name-like column.
    #[error("could not find a student name column (expected a header containing 'name')")]
    MissingNameColumn,

    /// Exam upload without a score column (a header containing 'score' but not '%').
    #[error("could not find a score column (expected a header containing 'score' without '%')")]
    MissingScoreColumn,

    /// Exam upload without any id column while synthesized ids are disabled.
    #[error("could not find a student id column (expected 'SIS ID', 'Student Number' or 'Username')")]
    MissingIdColumn,

    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::InvalidExtension(_) => "invalid_extension",
            IngestError::EmptyInput => "empty_input",
            IngestError::EmptyData => "empty_data",
            IngestError::MalformedLayout { .. } => "malformed_layout",
            IngestError::MissingRequiredColumns => "missing_required_columns",
            IngestError::MissingNameColumn => "missing_name_column",
            IngestError::MissingScoreColumn => "missing_score_column",
            IngestError::MissingIdColumn => "missing_id_column",
            IngestError::Io { .. } => "io",
        }
    }
}

/// Errors raised by [`crate::state::Dashboard`] transitions.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("exam set not found: {0}")]
    UnknownExamSet(Uuid),

    #[error("please fill in exam name and date")]
    MissingExamDetails,

    #[error("please fill in student name and ID")]
    MissingStudentDetails,

    #[error("no dataset loaded")]
    NoDataset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_layout_states_minimum() {
        let err = IngestError::MalformedLayout {
            required: 4,
            found: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("at least 4 rows"), "{msg}");
        assert!(msg.contains("found 2"));
        assert_eq!(err.code(), "malformed_layout");
    }
}
