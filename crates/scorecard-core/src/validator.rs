//! Upload validation profiles.
//!
//! Checks run in a fixed order and the first failure is returned. The empty
//! check always comes first.

use crate::error::IngestError;
use crate::mapper::FieldMap;

const GENERAL_REQUIRED_TOKENS: [&str; 2] = ["name", "student_id"];

/// Validate a general upload: data present and some identity column.
pub fn validate_general(headers: &[String], data_rows: usize) -> Result<(), IngestError> {
    if data_rows == 0 {
        return Err(IngestError::EmptyData);
    }

    let has_identity = headers.iter().any(|h| {
        let lower = h.to_lowercase();
        GENERAL_REQUIRED_TOKENS.iter().any(|t| lower.contains(t))
    });
    if !has_identity {
        return Err(IngestError::MissingRequiredColumns);
    }

    Ok(())
}

/// Validate an exam-subject upload against its [`FieldMap`].
pub fn validate_exam(data_rows: usize, map: &FieldMap) -> Result<(), IngestError> {
    if data_rows == 0 {
        return Err(IngestError::EmptyData);
    }
    if map.student_name.is_none() {
        return Err(IngestError::MissingNameColumn);
    }
    if map.score.is_none() {
        return Err(IngestError::MissingScoreColumn);
    }
    Ok(())
}
