pub mod analyze;
pub mod exam;
pub mod init;
pub mod student;
pub mod students;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use scorecard_core::config::ScorecardConfig;
use scorecard_core::ingest::{ingest_general, GeneralUpload};
use scorecard_core::statistics::Analytics;
use scorecard_core::traits::FileUpload;

/// Read and validate a general upload from disk.
pub(crate) async fn load_general(path: &Path, config: &ScorecardConfig) -> Result<GeneralUpload> {
    let source = FileUpload::new(path);
    ingest_general(&source, config)
        .await
        .with_context(|| format!("{} was not accepted", path.display()))
}

pub(crate) fn print_analytics(analytics: &Analytics) {
    println!("Students: {}", analytics.total_students);
    println!("Average grade: {:.2}", analytics.average_grade);
    println!("Pass rate: {}%", analytics.pass_rate);
    if analytics.grade_columns.is_empty() {
        println!("No grade columns detected.");
        return;
    }
    println!("Grade columns: {}", analytics.grade_columns.join(", "));

    let mut bands = Table::new();
    bands.set_header(vec!["Band", "Count"]);
    for band in analytics.non_empty_bands() {
        bands.add_row(vec![Cell::new(&band.range), Cell::new(band.count)]);
    }
    println!("\nGrade distribution\n{bands}");

    if !analytics.subject_performance.is_empty() {
        let mut subjects = Table::new();
        subjects.set_header(vec!["Subject", "Average", "Values"]);
        for s in &analytics.subject_performance {
            subjects.add_row(vec![
                Cell::new(&s.subject),
                Cell::new(format!("{:.2}", s.average)),
                Cell::new(s.students),
            ]);
        }
        println!("\nSubject performance\n{subjects}");
    }

    for (title, list) in [
        ("Top students", &analytics.top_students),
        ("Struggling students", &analytics.struggling_students),
    ] {
        if list.is_empty() {
            continue;
        }
        let mut table = Table::new();
        table.set_header(vec!["Name", "Average", "Grades"]);
        for s in list {
            table.add_row(vec![
                Cell::new(&s.name),
                Cell::new(format!("{:.2}", s.average)),
                Cell::new(s.grades_count),
            ]);
        }
        println!("\n{title}\n{table}");
    }
}
