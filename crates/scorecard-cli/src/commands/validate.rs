//! The `scorecard validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use scorecard_core::config::load_config_from;
use scorecard_core::ingest::{ingest_exam, ExamOptions, TotalSource};
use scorecard_core::model::Subject;
use scorecard_core::traits::FileUpload;

use super::load_general;

/// Validate `file` as a general upload, or as an exam upload for `subject`.
pub async fn execute(
    file: PathBuf,
    subject: Option<Subject>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let Some(subject) = subject else {
        let upload = load_general(&file, &config).await?;
        println!(
            "{}: {} records, {} columns",
            file.display(),
            upload.records.len(),
            upload.headers.len()
        );
        if !upload.field_map.subject_columns.is_empty() {
            println!("Subject columns: {}", upload.field_map.subject_columns.join(", "));
        }
        println!("Valid general upload.");
        return Ok(());
    };

    let options = ExamOptions::from_config(&config, subject);
    let upload = ingest_exam(&FileUpload::new(&file), subject, &options, config.max_upload_bytes)
        .await
        .with_context(|| format!("{} was not accepted", file.display()))?;

    let map = &upload.field_map;
    println!("{}: {} records ({})", file.display(), upload.records.len(), subject.label());
    println!("Name column: {}", map.student_name.as_deref().unwrap_or("-"));
    println!("Score column: {}", map.score.as_deref().unwrap_or("-"));
    match map.student_id.as_deref() {
        Some(id) => println!("ID column: {id}"),
        None => println!("ID column: none (ids will be derived)"),
    }
    println!(
        "Total questions: {} ({})",
        upload.total_questions,
        match upload.total_source {
            TotalSource::Scanned => "from file",
            TotalSource::Configured => "from config",
        }
    );
    println!("Valid exam upload.");

    Ok(())
}
