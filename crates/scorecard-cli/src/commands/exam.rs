//! The `scorecard exam` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use scorecard_core::aggregate::{combine_exam_set, summarize, unique_students};
use scorecard_core::config::load_config_from;
use scorecard_core::ingest::ingest_exam_uploads;
use scorecard_core::model::{StudentRecord, Subject};
use scorecard_core::report::{AnalyticsReport, ReportSource};
use scorecard_core::state::Dashboard;
use scorecard_core::statistics::compute_analytics;
use scorecard_core::traits::{FileUpload, UploadSource};

use super::print_analytics;

pub struct ExamArgs {
    pub name: String,
    pub date: NaiveDate,
    pub description: String,
    pub files: Vec<(Subject, PathBuf)>,
    pub json: bool,
}

pub async fn execute(args: ExamArgs, config_path: Option<PathBuf>) -> Result<()> {
    anyhow::ensure!(
        !args.files.is_empty(),
        "provide at least one subject file (--verbal, --numerical, --maths, --reading)"
    );
    let config = load_config_from(config_path.as_deref())?;

    let mut dashboard = Dashboard::new();
    let exam_id = dashboard.create_exam_set(&args.name, args.date, &args.description)?;
    tracing::debug!(exam_set = %exam_id, subjects = args.files.len(), "reading subject uploads");

    let uploads: Vec<(Subject, Box<dyn UploadSource>)> = args
        .files
        .iter()
        .map(|(subject, path)| {
            (*subject, Box::new(FileUpload::new(path)) as Box<dyn UploadSource>)
        })
        .collect();

    let mut failed = 0usize;
    for (subject, result) in ingest_exam_uploads(&config, uploads).await {
        match result {
            Ok(upload) => {
                let records = upload.records.len();
                let total = upload.total_questions;
                let students = dashboard.record_subject_upload(exam_id, subject, upload.records)?;
                eprintln!(
                    "  {}: {records} records, {total} questions ({students} students in set)",
                    subject.label()
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("  {}: {e}", subject.label());
            }
        }
    }

    let set = dashboard.select_exam_set(exam_id)?;
    anyhow::ensure!(
        set.uploaded_subject_count() > 0,
        "no subject upload was accepted for '{}'",
        set.name
    );

    let rows = combine_exam_set(&set);
    let analytics = compute_analytics(&rows);
    let records: Vec<StudentRecord> = set
        .uploads
        .values()
        .flat_map(|records| records.iter().cloned())
        .collect();
    let students = unique_students(&records).iter().map(summarize).collect();
    let report = AnalyticsReport::new(
        ReportSource::ExamSet {
            id: set.id,
            name: set.name.clone(),
        },
        analytics,
        students,
    );

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!(
            "Exam set: {} ({}) {}/{} subjects, {} students",
            set.name,
            set.date,
            set.uploaded_subject_count(),
            Subject::ALL.len(),
            set.student_count
        );
        if !set.description.is_empty() {
            println!("{}", set.description);
        }
        print_analytics(&report.analytics);
    }

    if failed > 0 {
        eprintln!("{failed} subject upload(s) rejected");
    }

    Ok(())
}
