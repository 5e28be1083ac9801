//! Delimited-text tokenizer.
//!
//! Splits raw upload text into rows and cells. Lines are split by hand so
//! blank lines keep their row position; each line's cells come from a
//! `csv` reader with quoting off. Quoted cells containing the delimiter are
//! therefore split, and only surrounding quote characters are stripped.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::IngestError;
use crate::model::{Delimiter, RawTable};

/// Physical lines of `text` after trimming the whole input.
pub fn split_lines(text: &str) -> Result<Vec<&str>, IngestError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(IngestError::EmptyInput);
    }
    Ok(trimmed.split('\n').collect())
}

/// Tab when the probe line contains a tab character, otherwise comma.
pub fn detect_delimiter(probe: &str) -> Delimiter {
    if probe.contains('\t') {
        Delimiter::Tab
    } else {
        Delimiter::Comma
    }
}

/// Split one line into cleaned cells.
pub fn split_cells(line: &str, delimiter: Delimiter) -> Vec<String> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter.as_byte())
        .quoting(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record.iter().map(clean_cell).collect(),
        // A blank line is one empty cell. With quoting off the reader can
        // only fail on invalid UTF-8, which a `&str` never holds.
        Ok(false) | Err(_) => vec![String::new()],
    }
}

fn clean_cell(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

/// Tokenize `text` into a [`RawTable`].
pub fn tokenize(text: &str, delimiter: Delimiter) -> Result<RawTable, IngestError> {
    Ok(split_lines(text)?
        .into_iter()
        .map(|line| split_cells(line, delimiter))
        .collect())
}
