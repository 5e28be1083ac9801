//! scorecard CLI — class gradebook analytics from CSV exports.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use scorecard_core::model::Subject;

mod commands;

#[derive(Parser)]
#[command(
    name = "scorecard",
    version,
    about = "Student score analytics from gradebook CSV exports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    General,
    Exam,
}

#[derive(Subcommand)]
enum Commands {
    /// Show class analytics for a general grades CSV
    Analyze {
        /// Grades CSV with a header row
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the distinct students in a grades CSV
    Students {
        file: PathBuf,

        /// Only students whose name or id matches
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show one student's subject averages and history
    Student {
        file: PathBuf,

        /// Student id
        #[arg(long)]
        id: String,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Build an exam set from per-subject gradebook exports
    Exam {
        /// Exam set name
        #[arg(long)]
        name: String,

        /// Exam date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        #[arg(long, default_value = "")]
        description: String,

        /// Verbal reasoning export
        #[arg(long)]
        verbal: Option<PathBuf>,

        /// Numerical reasoning export
        #[arg(long)]
        numerical: Option<PathBuf>,

        /// Mathematics export
        #[arg(long)]
        maths: Option<PathBuf>,

        /// Reading comprehension export
        #[arg(long)]
        reading: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check that a CSV would be accepted
    Validate {
        file: PathBuf,

        /// Upload mode
        #[arg(long, value_enum, default_value = "general")]
        mode: Mode,

        /// Subject for exam mode
        #[arg(long)]
        subject: Option<Subject>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample CSVs
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scorecard=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            file,
            json,
            config,
        } => commands::analyze::execute(file, json, config).await,
        Commands::Students {
            file,
            search,
            config,
        } => commands::students::execute(file, search, config).await,
        Commands::Student { file, id, config } => {
            commands::student::execute(file, id, config).await
        }
        Commands::Exam {
            name,
            date,
            description,
            verbal,
            numerical,
            maths,
            reading,
            json,
            config,
        } => {
            let files = [
                (Subject::Verbal, verbal),
                (Subject::Numerical, numerical),
                (Subject::Maths, maths),
                (Subject::Reading, reading),
            ]
            .into_iter()
            .filter_map(|(subject, path)| path.map(|p| (subject, p)))
            .collect();
            commands::exam::execute(
                commands::exam::ExamArgs {
                    name,
                    date,
                    description,
                    files,
                    json,
                },
                config,
            )
            .await
        }
        Commands::Validate {
            file,
            mode,
            subject,
            config,
        } => {
            let subject = match mode {
                Mode::General => None,
                Mode::Exam => Some(subject.unwrap_or(Subject::Maths)),
            };
            commands::validate::execute(file, subject, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
