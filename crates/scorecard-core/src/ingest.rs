//! Upload ingestion pipeline.
//!
//! Wires tokenizing, header resolution, field mapping, validation and
//! normalization together for both upload modes, and owns the async
//! boundary where upload text is read.

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};

use crate::config::{MissingIdPolicy, ScorecardConfig};
use crate::error::IngestError;
use crate::layout::{resolve, scan_total_questions, UploadMode};
use crate::mapper::FieldMap;
use crate::model::{Dataset, StudentRecord, Subject};
use crate::normalizer::{normalize_exam_row, normalize_general, ExamContext};
use crate::traits::UploadSource;
use crate::validator::{validate_exam, validate_general};

/// A validated general upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralUpload {
    pub headers: Vec<String>,
    pub field_map: FieldMap,
    pub records: Vec<StudentRecord>,
}

impl GeneralUpload {
    pub fn into_dataset(self, name: impl Into<String>) -> Dataset {
        Dataset {
            name: name.into(),
            headers: self.headers,
            records: self.records,
        }
    }
}

/// Where an exam upload's total question count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalSource {
    /// Found on the file's totals row.
    Scanned,
    /// The caller's existing value.
    Configured,
}

/// A validated exam-subject upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamUpload {
    pub subject: Subject,
    pub total_questions: u32,
    pub total_source: TotalSource,
    pub field_map: FieldMap,
    pub records: Vec<StudentRecord>,
}

/// Caller-side settings for one exam upload.
#[derive(Debug, Clone, Copy)]
pub struct ExamOptions {
    /// Kept when the totals row carries no usable value.
    pub total_questions: u32,
    pub missing_id_policy: MissingIdPolicy,
}

impl ExamOptions {
    pub fn from_config(config: &ScorecardConfig, subject: Subject) -> Self {
        Self {
            total_questions: config.total_questions_for(subject),
            missing_id_policy: config.missing_id_policy,
        }
    }
}

/// Parse and validate a general upload.
pub fn parse_general(text: &str) -> Result<GeneralUpload, IngestError> {
    let table = resolve(text, UploadMode::General)?;
    validate_general(&table.headers, table.rows.len())?;

    let field_map = FieldMap::from_headers(&table.headers);
    let records = normalize_general(&table.headers, &table.rows);
    Ok(GeneralUpload {
        headers: table.headers,
        field_map,
        records,
    })
}

/// Parse and validate an exam-subject upload.
pub fn parse_exam(
    text: &str,
    subject: Subject,
    options: &ExamOptions,
) -> Result<ExamUpload, IngestError> {
    let table = resolve(text, UploadMode::Exam)?;

    let scanned = table.totals_line.as_deref().and_then(scan_total_questions);
    let (total_questions, total_source) = match scanned {
        Some(n) => (n, TotalSource::Scanned),
        None => (options.total_questions, TotalSource::Configured),
    };

    let field_map = FieldMap::from_headers(&table.headers);
    validate_exam(table.rows.len(), &field_map)?;
    if options.missing_id_policy == MissingIdPolicy::Reject && field_map.student_id.is_none() {
        return Err(IngestError::MissingIdColumn);
    }

    if total_questions == 0 {
        tracing::warn!(%subject, "no total question count, percentages will be 0");
    }

    let ctx = ExamContext {
        subject,
        total_questions,
    };
    let records = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, cells)| normalize_exam_row(i, &table.headers, cells, &field_map, &ctx))
        .collect();

    Ok(ExamUpload {
        subject,
        total_questions,
        total_source,
        field_map,
        records,
    })
}

/// Check the extension and read an upload's text.
///
/// The extension check happens before anything is read. Files above
/// `max_upload_bytes` are logged and processed anyway.
pub async fn read_upload(
    source: &dyn UploadSource,
    max_upload_bytes: u64,
) -> Result<String, IngestError> {
    let name = source.file_name();
    if !has_csv_extension(name) {
        return Err(IngestError::InvalidExtension(name.to_string()));
    }

    if let Some(size) = source.size_hint().await {
        if size > max_upload_bytes {
            tracing::warn!(file = name, size, limit = max_upload_bytes, "upload is larger than recommended");
        }
    }

    source.read_text().await
}

fn has_csv_extension(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".csv")
}

/// Read and parse a general upload.
pub async fn ingest_general(
    source: &dyn UploadSource,
    config: &ScorecardConfig,
) -> Result<GeneralUpload, IngestError> {
    let text = read_upload(source, config.max_upload_bytes).await?;
    let upload = parse_general(&text)?;
    tracing::info!(
        file = source.file_name(),
        records = upload.records.len(),
        "parsed general upload"
    );
    Ok(upload)
}

/// Read and parse one exam-subject upload.
pub async fn ingest_exam(
    source: &dyn UploadSource,
    subject: Subject,
    options: &ExamOptions,
    max_upload_bytes: u64,
) -> Result<ExamUpload, IngestError> {
    let text = read_upload(source, max_upload_bytes).await?;
    let upload = parse_exam(&text, subject, options)?;
    tracing::info!(
        file = source.file_name(),
        %subject,
        records = upload.records.len(),
        total_questions = upload.total_questions,
        "parsed exam upload"
    );
    Ok(upload)
}

/// Read and parse several subject uploads concurrently.
///
/// Each upload succeeds or fails on its own; results come back in subject
/// order regardless of completion order.
pub async fn ingest_exam_uploads(
    config: &ScorecardConfig,
    uploads: Vec<(Subject, Box<dyn UploadSource>)>,
) -> Vec<(Subject, Result<ExamUpload, IngestError>)> {
    let mut futures = FuturesUnordered::new();
    for (subject, source) in &uploads {
        let options = ExamOptions::from_config(config, *subject);
        let subject = *subject;
        futures.push(async move {
            let result =
                ingest_exam(source.as_ref(), subject, &options, config.max_upload_bytes).await;
            (subject, result)
        });
    }

    let mut results = Vec::with_capacity(uploads.len());
    while let Some(outcome) = futures.next().await {
        if let (subject, Err(e)) = &outcome {
            tracing::warn!(%subject, "upload failed: {e}");
        }
        results.push(outcome);
    }
    results.sort_by_key(|(subject, _)| *subject);
    results
}
