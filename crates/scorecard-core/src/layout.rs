//! Header resolution for the supported source layouts.
//!
//! General uploads put headers on the first line. Exam-subject uploads are
//! gradebook exports with a metadata line and a totals line ahead of the
//! headers; the totals line may carry the number of questions in the test.

use crate::error::IngestError;
use crate::model::{HeaderLayout, RawTable};
use crate::tokenizer::{detect_delimiter, split_cells, split_lines};

/// Which upload path produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    General,
    Exam,
}

/// A table split into its header row and data rows.
#[derive(Debug, Clone)]
pub struct ResolvedTable {
    pub layout: HeaderLayout,
    pub headers: Vec<String>,
    pub rows: RawTable,
    /// Row 1 as it appeared in the file, for offset layouts.
    pub totals_line: Option<String>,
}

/// Pick the layout for `mode`, check the row count and tokenize.
pub fn resolve(text: &str, mode: UploadMode) -> Result<ResolvedTable, IngestError> {
    let lines = split_lines(text)?;

    let header_row_index = match mode {
        UploadMode::General => 0,
        UploadMode::Exam => 2,
    };
    let probe = lines.get(header_row_index).copied().unwrap_or_default();
    let delimiter = detect_delimiter(probe);
    let layout = match mode {
        UploadMode::General => HeaderLayout::simple(delimiter),
        UploadMode::Exam => HeaderLayout::offset(delimiter),
    };
    layout.check(lines.len())?;

    tracing::debug!(
        header_row = layout.header_row_index,
        data_start = layout.data_start_index,
        delimiter = ?layout.delimiter,
        lines = lines.len(),
        "resolved header layout"
    );

    let headers = split_cells(lines[layout.header_row_index], delimiter);
    let rows = lines[layout.data_start_index..]
        .iter()
        .map(|line| split_cells(line, delimiter))
        .collect();
    let totals_line = (layout.header_row_index > 1).then(|| lines[1].to_string());

    Ok(ResolvedTable {
        layout,
        headers,
        rows,
        totals_line,
    })
}

/// Look for a lone integer in `1..=100` on the totals line.
///
/// Tries a tab split first and falls back to commas when that yields fewer
/// than four fields. Returns the first qualifying value from the left.
pub fn scan_total_questions(line: &str) -> Option<u32> {
    let mut fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 4 {
        fields = line.split(',').collect();
    }
    fields
        .iter()
        .map(|f| f.trim().trim_matches('"').trim())
        .filter_map(|f| f.parse::<u32>().ok())
        .find(|n| (1..=100).contains(n))
}
