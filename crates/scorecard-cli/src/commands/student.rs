//! The `scorecard student` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use scorecard_core::aggregate::{student_detail, unique_students, Trend};
use scorecard_core::config::load_config_from;

use super::load_general;

pub async fn execute(file: PathBuf, id: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let upload = load_general(&file, &config).await?;
    let students = unique_students(&upload.records);

    let Some(student) = students.iter().find(|s| s.id == id) else {
        anyhow::bail!("student not found: {id}");
    };
    let detail = student_detail(student);

    println!("{} ({})", detail.name, detail.id);
    println!(
        "Overall average: {:.1} [{}] trending {}",
        detail.overall_average,
        detail.overall_band.map(|b| b.label()).unwrap_or("-"),
        match detail.trend {
            Trend::Up => "up",
            Trend::Down => "down",
        }
    );

    let mut subjects = Table::new();
    subjects.set_header(vec!["Subject", "Average", "Values", "Band"]);
    for s in &detail.subjects {
        subjects.add_row(vec![
            Cell::new(&s.subject),
            Cell::new(format!("{:.1}", s.average)),
            Cell::new(s.count),
            Cell::new(s.band.map(|b| b.label()).unwrap_or("-")),
        ]);
    }
    println!("\n{subjects}");

    if detail.history.len() > 1 {
        let mut history = Table::new();
        let mut header = vec!["Record".to_string()];
        header.extend(detail.subjects.iter().map(|s| s.subject.clone()));
        history.set_header(header);
        for point in &detail.history {
            let mut row = vec![Cell::new(&point.label)];
            row.extend(point.values.iter().map(|(_, v)| Cell::new(v)));
            history.add_row(row);
        }
        println!("\n{history}");
    }

    Ok(())
}
