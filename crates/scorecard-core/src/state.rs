//! Dashboard state.
//!
//! [`Dashboard`] owns every exam set and the current general dataset. It is
//! only mutated through the transition methods below; callers read snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::with_subject_upload;
use crate::error::StateError;
use crate::mapper::is_identity_header;
use crate::model::{Columns, Dataset, ExamSet, RecordKind, StudentRecord, Subject};

const RECENT_SETS: usize = 3;

/// A student entered by hand into the current dataset.
#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub name: String,
    pub id: String,
    /// Grade per subject column; columns not listed are left blank.
    pub grades: Vec<(String, String)>,
}

/// Summary numbers for the exam-set screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub total_exam_sets: usize,
    /// Sum of each set's distinct student count.
    pub total_students: usize,
    /// Subject uploads across all sets.
    pub total_uploads: usize,
    pub sets_with_uploads: usize,
    /// Up to three sets, most recent date first.
    pub recent: Vec<RecentExamSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentExamSet {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub uploaded_subjects: usize,
    pub student_count: usize,
}

#[derive(Debug, Default)]
pub struct Dashboard {
    exam_sets: Vec<ExamSet>,
    selected: Option<Uuid>,
    current: Option<Dataset>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exam_sets(&self) -> &[ExamSet] {
        &self.exam_sets
    }

    pub fn exam_set(&self, id: Uuid) -> Option<&ExamSet> {
        self.exam_sets.iter().find(|s| s.id == id)
    }

    pub fn selected(&self) -> Option<&ExamSet> {
        self.selected.and_then(|id| self.exam_set(id))
    }

    pub fn current(&self) -> Option<&Dataset> {
        self.current.as_ref()
    }

    /// Add an empty exam set. The name must not be blank.
    pub fn create_exam_set(
        &mut self,
        name: &str,
        date: NaiveDate,
        description: &str,
    ) -> Result<Uuid, StateError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StateError::MissingExamDetails);
        }
        let set = ExamSet::new(name, date, description.trim());
        let id = set.id;
        tracing::info!(%id, name, %date, "created exam set");
        self.exam_sets.push(set);
        Ok(id)
    }

    /// Replace `subject`'s upload in an exam set and return the set's new
    /// distinct student count.
    ///
    /// The set is rebuilt and swapped in as a whole, so snapshots taken
    /// earlier keep seeing the old uploads.
    pub fn record_subject_upload(
        &mut self,
        exam_id: Uuid,
        subject: Subject,
        records: Vec<StudentRecord>,
    ) -> Result<usize, StateError> {
        let slot = self
            .exam_sets
            .iter_mut()
            .find(|s| s.id == exam_id)
            .ok_or(StateError::UnknownExamSet(exam_id))?;

        let record_count = records.len();
        let next = with_subject_upload(slot, subject, records);
        let student_count = next.student_count;
        *slot = next;

        tracing::info!(
            exam_set = %exam_id,
            %subject,
            records = record_count,
            students = student_count,
            "recorded subject upload"
        );
        Ok(student_count)
    }

    /// Mark an exam set as selected and return a snapshot of it.
    pub fn select_exam_set(&mut self, id: Uuid) -> Result<ExamSet, StateError> {
        let set = self
            .exam_set(id)
            .cloned()
            .ok_or(StateError::UnknownExamSet(id))?;
        self.selected = Some(id);
        Ok(set)
    }

    /// Replace the current general dataset.
    pub fn load_dataset(&mut self, dataset: Dataset) {
        tracing::info!(name = %dataset.name, records = dataset.records.len(), "loaded dataset");
        self.current = Some(dataset);
    }

    /// Drop the current dataset.
    pub fn reset_dataset(&mut self) {
        self.current = None;
    }

    /// Append a hand-entered student to the current dataset.
    pub fn add_student(&mut self, student: NewStudent) -> Result<&StudentRecord, StateError> {
        let name = student.name.trim();
        let id = student.id.trim();
        if name.is_empty() || id.is_empty() {
            return Err(StateError::MissingStudentDetails);
        }
        let dataset = self.current.as_mut().ok_or(StateError::NoDataset)?;

        let mut columns = Columns::new();
        columns.push("name", name);
        columns.push("student_id", id);
        for header in dataset.headers.iter().filter(|h| !is_identity_header(h)) {
            let grade = student
                .grades
                .iter()
                .find(|(k, _)| k == header)
                .map(|(_, v)| v.trim())
                .unwrap_or_default();
            columns.push(header.clone(), grade);
        }

        dataset.records.push(StudentRecord {
            id: id.to_string(),
            name: name.to_string(),
            kind: RecordKind::General,
            columns,
        });
        tracing::info!(id, name, "added student");
        Ok(&dataset.records[dataset.records.len() - 1])
    }

    pub fn overview(&self) -> DashboardOverview {
        let mut recent: Vec<&ExamSet> = self.exam_sets.iter().collect();
        recent.sort_by(|a, b| b.date.cmp(&a.date));

        DashboardOverview {
            total_exam_sets: self.exam_sets.len(),
            total_students: self.exam_sets.iter().map(|s| s.student_count).sum(),
            total_uploads: self
                .exam_sets
                .iter()
                .map(ExamSet::uploaded_subject_count)
                .sum(),
            sets_with_uploads: self
                .exam_sets
                .iter()
                .filter(|s| s.uploaded_subject_count() > 0)
                .count(),
            recent: recent
                .into_iter()
                .take(RECENT_SETS)
                .map(|s| RecentExamSet {
                    id: s.id,
                    name: s.name.clone(),
                    date: s.date,
                    uploaded_subjects: s.uploaded_subject_count(),
                    student_count: s.student_count,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExamScore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn exam_record(id: &str, subject: Subject) -> StudentRecord {
        StudentRecord {
            id: id.into(),
            name: format!("Student {id}"),
            kind: RecordKind::Exam(ExamScore {
                score: 10,
                total_questions: 20,
                percentage: 50.0,
                subject,
            }),
            columns: Columns::new(),
        }
    }

    #[test]
    fn blank_exam_name_is_rejected() {
        let mut dash = Dashboard::new();
        let err = dash.create_exam_set("  ", date(2024, 5, 1), "").unwrap_err();
        assert!(matches!(err, StateError::MissingExamDetails));
        assert!(dash.exam_sets().is_empty());
    }

    #[test]
    fn student_count_is_union_of_subject_ids() {
        let mut dash = Dashboard::new();
        let id = dash.create_exam_set("Mock 1", date(2024, 5, 1), "").unwrap();

        let verbal = vec![exam_record("1", Subject::Verbal), exam_record("2", Subject::Verbal)];
        assert_eq!(dash.record_subject_upload(id, Subject::Verbal, verbal).unwrap(), 2);

        let maths = vec![exam_record("2", Subject::Maths), exam_record("3", Subject::Maths)];
        assert_eq!(dash.record_subject_upload(id, Subject::Maths, maths).unwrap(), 3);

        // re-upload replaces, not appends
        let verbal = vec![exam_record("2", Subject::Verbal)];
        assert_eq!(dash.record_subject_upload(id, Subject::Verbal, verbal).unwrap(), 2);
        assert_eq!(dash.exam_set(id).unwrap().uploaded_subject_count(), 2);
    }

    #[test]
    fn snapshots_are_unaffected_by_later_uploads() {
        let mut dash = Dashboard::new();
        let id = dash.create_exam_set("Mock 1", date(2024, 5, 1), "").unwrap();
        dash.record_subject_upload(id, Subject::Reading, vec![exam_record("1", Subject::Reading)])
            .unwrap();

        let snapshot = dash.select_exam_set(id).unwrap();
        dash.record_subject_upload(id, Subject::Reading, vec![]).unwrap();

        assert_eq!(snapshot.upload(Subject::Reading).unwrap().len(), 1);
        assert_eq!(dash.selected().unwrap().upload(Subject::Reading).unwrap().len(), 0);
    }

    #[test]
    fn unknown_exam_set() {
        let mut dash = Dashboard::new();
        let missing = Uuid::new_v4();
        assert!(matches!(
            dash.record_subject_upload(missing, Subject::Maths, vec![]),
            Err(StateError::UnknownExamSet(id)) if id == missing
        ));
        assert!(dash.select_exam_set(missing).is_err());
    }

    #[test]
    fn add_student_fills_subject_columns() {
        let mut dash = Dashboard::new();
        dash.load_dataset(Dataset {
            name: "class.csv".into(),
            headers: vec!["name".into(), "student_id".into(), "math".into(), "english".into()],
            records: vec![],
        });

        let record = dash
            .add_student(NewStudent {
                name: "Ann".into(),
                id: "7".into(),
                grades: vec![("math".into(), "91".into())],
            })
            .unwrap();
        assert_eq!(record.columns.get("math"), Some("91"));
        assert_eq!(record.columns.get("english"), Some(""));
        assert_eq!(dash.current().unwrap().records.len(), 1);
    }

    #[test]
    fn add_student_requires_details_and_dataset() {
        let mut dash = Dashboard::new();
        let ann = NewStudent {
            name: "Ann".into(),
            id: "7".into(),
            grades: vec![],
        };
        assert!(matches!(
            dash.add_student(ann.clone()),
            Err(StateError::NoDataset)
        ));

        dash.load_dataset(Dataset::default());
        assert!(matches!(
            dash.add_student(NewStudent { id: String::new(), ..ann }),
            Err(StateError::MissingStudentDetails)
        ));

        dash.reset_dataset();
        assert!(dash.current().is_none());
    }

    #[test]
    fn overview_counts_and_recent_order() {
        let mut dash = Dashboard::new();
        let a = dash.create_exam_set("Jan", date(2024, 1, 10), "").unwrap();
        dash.create_exam_set("Mar", date(2024, 3, 10), "").unwrap();
        dash.create_exam_set("Feb", date(2024, 2, 10), "").unwrap();
        dash.create_exam_set("Apr", date(2024, 4, 10), "").unwrap();
        dash.record_subject_upload(a, Subject::Maths, vec![exam_record("1", Subject::Maths)])
            .unwrap();

        let overview = dash.overview();
        assert_eq!(overview.total_exam_sets, 4);
        assert_eq!(overview.total_students, 1);
        assert_eq!(overview.total_uploads, 1);
        assert_eq!(overview.sets_with_uploads, 1);
        let names: Vec<&str> = overview.recent.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Apr", "Mar", "Feb"]);
    }
}
