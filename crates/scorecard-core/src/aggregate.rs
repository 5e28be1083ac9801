//! Record aggregation: unique students, exam-set merging and per-student
//! summaries.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::mapper::is_identity_header;
use crate::model::{Columns, ExamSet, StudentRecord, Subject};
use crate::statistics::{parse_grade, round_to, GradeBand};

/// Overall average at or above which a student is trending up.
const TRENDING_UP_FROM: f64 = 75.0;

/// One distinct student and every row recorded for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    /// All rows sharing this id, in file order, including the first.
    pub grades: Vec<StudentRecord>,
}

/// Group records by id. Students appear in order of the first row that
/// carries both an id and a name; every row sharing that id, named or not,
/// lands in `grades` in file order.
pub fn unique_students(records: &[StudentRecord]) -> Vec<Student> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut students: Vec<Student> = Vec::new();

    for record in records {
        if record.id.is_empty()
            || record.name.is_empty()
            || index.contains_key(record.id.as_str())
        {
            continue;
        }
        index.insert(record.id.as_str(), students.len());
        students.push(Student {
            id: record.id.clone(),
            name: record.name.clone(),
            grades: Vec::new(),
        });
    }

    for record in records {
        if let Some(&i) = index.get(record.id.as_str()) {
            students[i].grades.push(record.clone());
        }
    }

    students
}

/// Number of distinct ids across every subject upload of a set.
pub fn distinct_student_count<'a, I>(uploads: I) -> usize
where
    I: IntoIterator<Item = &'a Arc<[StudentRecord]>>,
{
    uploads
        .into_iter()
        .flat_map(|records| records.iter().map(|r| r.id.as_str()))
        .collect::<HashSet<_>>()
        .len()
}

/// A copy of `set` with `subject`'s upload replaced by `records` and the
/// student count recomputed from scratch.
pub fn with_subject_upload(set: &ExamSet, subject: Subject, records: Vec<StudentRecord>) -> ExamSet {
    let mut next = set.clone();
    next.uploads.insert(subject, Arc::from(records));
    next.student_count = distinct_student_count(next.uploads.values());
    next
}

/// Flatten every subject upload of `set` into one table, tagging each row
/// with its subject key and the exam-set name.
pub fn combine_exam_set(set: &ExamSet) -> Vec<Columns> {
    Subject::ALL
        .iter()
        .filter_map(|subject| set.upload(*subject).map(|records| (*subject, records)))
        .flat_map(|(subject, records)| {
            records.iter().map(move |record| {
                let mut row = record.to_row();
                if !row.contains_key("subject") {
                    row.push("subject", subject.key());
                }
                row.push("exam_set", set.name.clone());
                row
            })
        })
        .collect()
}

/// Non-identity fields of a student's rows, taken from the first row.
fn grade_fields(grades: &[StudentRecord]) -> Vec<String> {
    grades
        .first()
        .map(|r| {
            r.to_row()
                .keys()
                .filter(|k| !is_identity_header(k))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Row in the student list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub record_count: usize,
    /// Mean of every numeric grade across all rows, one decimal.
    pub average: Option<f64>,
}

impl StudentSummary {
    pub fn average_label(&self) -> String {
        self.average
            .map(|a| format!("{a:.1}"))
            .unwrap_or_else(|| "N/A".to_string())
    }
}

pub fn summarize(student: &Student) -> StudentSummary {
    let fields = grade_fields(&student.grades);
    let values: Vec<f64> = student
        .grades
        .iter()
        .flat_map(|record| {
            let row = record.to_row();
            fields
                .iter()
                .filter_map(|f| row.get(f).and_then(parse_grade))
                .collect::<Vec<_>>()
        })
        .collect();

    StudentSummary {
        id: student.id.clone(),
        name: student.name.clone(),
        record_count: student.grades.len(),
        average: (!values.is_empty())
            .then(|| round_to(values.iter().sum::<f64>() / values.len() as f64, 1)),
    }
}

/// Students whose name contains `term` (ignoring case) or whose id contains it.
pub fn search_students<'a>(students: &'a [Student], term: &str) -> Vec<&'a Student> {
    let lowered = term.to_lowercase();
    students
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&lowered) || s.id.contains(term))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

/// One record's values for the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub label: String,
    /// Value per grade field; non-numeric values read as 0.
    pub values: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub field: String,
    pub subject: String,
    pub average: f64,
    pub count: usize,
    pub band: Option<GradeBand>,
}

/// Everything shown for a single student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDetail {
    pub id: String,
    pub name: String,
    pub subjects: Vec<SubjectSummary>,
    /// Mean of the subject averages that have at least one value.
    pub overall_average: f64,
    pub overall_band: Option<GradeBand>,
    pub trend: Trend,
    pub history: Vec<TrendPoint>,
}

pub fn student_detail(student: &Student) -> StudentDetail {
    let fields = grade_fields(&student.grades);
    let rows: Vec<Columns> = student.grades.iter().map(StudentRecord::to_row).collect();

    let subjects: Vec<SubjectSummary> = fields
        .iter()
        .map(|field| {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.get(field).and_then(parse_grade))
                .collect();
            let average = if values.is_empty() {
                0.0
            } else {
                round_to(values.iter().sum::<f64>() / values.len() as f64, 1)
            };
            SubjectSummary {
                field: field.clone(),
                subject: field.replace('_', " ").to_uppercase(),
                average,
                count: values.len(),
                band: (!values.is_empty()).then(|| GradeBand::for_value(average)).flatten(),
            }
        })
        .collect();

    // Deliberately the mean of per-subject means over subjects that have
    // values, not a flat mean of every cell.
    let scored: Vec<f64> = subjects
        .iter()
        .filter(|s| s.count > 0)
        .map(|s| s.average)
        .collect();
    let overall_average = if scored.is_empty() {
        0.0
    } else {
        scored.iter().sum::<f64>() / scored.len() as f64
    };

    let history = rows
        .iter()
        .enumerate()
        .map(|(i, row)| TrendPoint {
            label: format!("Exam {}", i + 1),
            values: fields
                .iter()
                .map(|f| (f.clone(), row.get(f).and_then(parse_grade).unwrap_or(0.0)))
                .collect(),
        })
        .collect();

    StudentDetail {
        id: student.id.clone(),
        name: student.name.clone(),
        subjects,
        overall_average,
        overall_band: GradeBand::for_value(overall_average),
        trend: if overall_average >= TRENDING_UP_FROM {
            Trend::Up
        } else {
            Trend::Down
        },
        history,
    }
}
