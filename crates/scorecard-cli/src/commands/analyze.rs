//! The `scorecard analyze` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use scorecard_core::aggregate::{summarize, unique_students};
use scorecard_core::config::load_config_from;
use scorecard_core::report::{AnalyticsReport, ReportSource};
use scorecard_core::state::Dashboard;
use scorecard_core::statistics::compute_analytics;

use super::{load_general, print_analytics};

pub async fn execute(
    file: PathBuf,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let upload = load_general(&file, &config).await?;

    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut dashboard = Dashboard::new();
    dashboard.load_dataset(upload.into_dataset(name.clone()));
    let dataset = dashboard.current().context("dataset was not loaded")?;

    let analytics = compute_analytics(&dataset.rows());
    let students = unique_students(&dataset.records)
        .iter()
        .map(summarize)
        .collect();
    let report = AnalyticsReport::new(ReportSource::Dataset { name }, analytics, students);

    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("Dataset: {} ({} records)", dataset.name, dataset.records.len());
        print_analytics(&report.analytics);
    }

    Ok(())
}
