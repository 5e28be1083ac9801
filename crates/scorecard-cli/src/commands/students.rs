//! The `scorecard students` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use scorecard_core::aggregate::{search_students, summarize, unique_students};
use scorecard_core::config::load_config_from;

use super::load_general;

pub async fn execute(
    file: PathBuf,
    search: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let upload = load_general(&file, &config).await?;
    let students = unique_students(&upload.records);

    let matches = match search.as_deref() {
        Some(term) => search_students(&students, term),
        None => students.iter().collect(),
    };

    if matches.is_empty() {
        println!("No students found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Records", "Average"]);
    for student in &matches {
        let summary = summarize(student);
        table.add_row(vec![
            Cell::new(&summary.id),
            Cell::new(&summary.name),
            Cell::new(summary.record_count),
            Cell::new(summary.average_label()),
        ]);
    }
    println!("{table}");
    println!("{} of {} students", matches.len(), students.len());

    Ok(())
}
