//! Core data model types for scorecard.
//!
//! These are the canonical types every stage of the pipeline produces or
//! consumes: raw tables, header layouts, student records and exam sets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::IngestError;

/// Rows × cells produced by the tokenizer. Untyped and transient.
pub type RawTable = Vec<Vec<String>>;

/// Cell delimiter of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

/// Where headers and data begin in a source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderLayout {
    pub header_row_index: usize,
    pub data_start_index: usize,
    pub delimiter: Delimiter,
}

impl HeaderLayout {
    /// Plain CSV: headers on row 0, data from row 1.
    pub fn simple(delimiter: Delimiter) -> Self {
        Self {
            header_row_index: 0,
            data_start_index: 1,
            delimiter,
        }
    }

    /// Gradebook export: metadata on row 0, totals on row 1, headers on
    /// row 2, data from row 3.
    pub fn offset(delimiter: Delimiter) -> Self {
        Self {
            header_row_index: 2,
            data_start_index: 3,
            delimiter,
        }
    }

    /// Minimum number of physical rows a table needs for this layout.
    ///
    /// The simple layout accepts a header-only table; the empty data set is
    /// rejected later by validation.
    pub fn min_rows(&self) -> usize {
        if self.header_row_index == 0 {
            1
        } else {
            self.data_start_index + 1
        }
    }

    /// Reject tables that are too short for this layout.
    pub fn check(&self, row_count: usize) -> Result<(), IngestError> {
        debug_assert!(self.data_start_index > self.header_row_index);
        if row_count < self.min_rows() {
            return Err(IngestError::MalformedLayout {
                required: self.min_rows(),
                found: row_count,
            });
        }
        Ok(())
    }
}

/// Ordered `(header, value)` pairs of one source row.
///
/// Serializes as a JSON object in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns(Vec<(String, String)>);

impl Columns {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Pair each header with the cell at the same position; missing cells
    /// become empty strings and surplus cells are dropped.
    pub fn from_row(headers: &[String], cells: &[String]) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), cells.get(i).cloned().unwrap_or_default()))
                .collect(),
        )
    }

    /// First value stored under exactly `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Columns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Columns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnsVisitor;

        impl<'de> Visitor<'de> for ColumnsVisitor {
            type Value = Columns;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Columns, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    pairs.push((k, v));
                }
                Ok(Columns(pairs))
            }
        }

        deserializer.deserialize_map(ColumnsVisitor)
    }
}

/// The four subjects tracked per exam set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Verbal,
    Numerical,
    Maths,
    Reading,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Verbal,
        Subject::Numerical,
        Subject::Maths,
        Subject::Reading,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Subject::Verbal => "verbal",
            Subject::Numerical => "numerical",
            Subject::Maths => "maths",
            Subject::Reading => "reading",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subject::Verbal => "Verbal Reasoning",
            Subject::Numerical => "Numerical Reasoning",
            Subject::Maths => "Mathematics",
            Subject::Reading => "Reading Comprehension",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verbal" => Ok(Subject::Verbal),
            "numerical" => Ok(Subject::Numerical),
            "maths" | "math" => Ok(Subject::Maths),
            "reading" => Ok(Subject::Reading),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// Canonical exam-mode fields of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamScore {
    pub score: i64,
    pub total_questions: u32,
    pub percentage: f64,
    pub subject: Subject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RecordKind {
    /// Grades live in the raw source columns.
    General,
    Exam(ExamScore),
}

/// One normalized row of an uploaded table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub kind: RecordKind,
    /// Every original source column, in source order.
    pub columns: Columns,
}

impl StudentRecord {
    pub fn exam_score(&self) -> Option<&ExamScore> {
        match &self.kind {
            RecordKind::Exam(score) => Some(score),
            RecordKind::General => None,
        }
    }

    /// Flatten into a single row: canonical fields first, then original
    /// columns whose names do not collide with them.
    pub fn to_row(&self) -> Columns {
        match &self.kind {
            RecordKind::General => self.columns.clone(),
            RecordKind::Exam(exam) => {
                let mut row = Columns::new();
                row.push("name", self.name.clone());
                row.push("student_id", self.id.clone());
                row.push("score", exam.score.to_string());
                row.push("total_questions", exam.total_questions.to_string());
                row.push("percentage", exam.percentage.to_string());
                row.push("subject", exam.subject.key());
                for (k, v) in self.columns.iter() {
                    if !row.contains_key(k) {
                        row.push(k, v);
                    }
                }
                row
            }
        }
    }
}

/// The currently displayed general-mode table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<StudentRecord>,
}

impl Dataset {
    pub fn rows(&self) -> Vec<Columns> {
        self.records.iter().map(StudentRecord::to_row).collect()
    }
}

/// A named exam sitting with one upload slot per subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSet {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub uploads: BTreeMap<Subject, Arc<[StudentRecord]>>,
    #[serde(default)]
    pub student_count: usize,
}

impl ExamSet {
    pub fn new(name: impl Into<String>, date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            description: description.into(),
            uploads: BTreeMap::new(),
            student_count: 0,
        }
    }

    pub fn upload(&self, subject: Subject) -> Option<&[StudentRecord]> {
        self.uploads.get(&subject).map(|r| &r[..])
    }

    /// Number of subjects holding at least one record.
    pub fn uploaded_subject_count(&self) -> usize {
        self.uploads.values().filter(|r| !r.is_empty()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.uploaded_subject_count() == Subject::ALL.len()
    }
}
