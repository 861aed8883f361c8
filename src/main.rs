use std::path::PathBuf;
use std::sync::Arc;

use academic_records::config::{EngineArgs, EngineConfig};
use academic_records::db::{self, PgRecordSource};
use academic_records::import::read_records_from_path;
use academic_records::models::ExternalCounts;
use academic_records::source::{InMemorySource, RecordFilter, RecordSource};
use academic_records::{programs, report, AcademicEngine};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "academic-records")]
#[command(
    about = "Rosters, transcripts and dashboards from flat academic records",
    long_about = None
)]
struct Cli {
    /// Read records from a spreadsheet-export CSV instead of Postgres
    #[arg(long, global = true)]
    records: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Scope {
    #[arg(long)]
    program: Option<String>,
    #[arg(long)]
    course: Option<String>,
    #[arg(long)]
    academic_year: Option<String>,
    #[arg(long)]
    term: Option<String>,
    /// Print JSON instead of one line per row
    #[arg(long)]
    json: bool,
}

impl Scope {
    fn filter(&self) -> RecordFilter {
        RecordFilter {
            identifier: None,
            course_code: self.course.clone(),
            program_code: self.program.clone(),
            academic_year: self.academic_year.clone(),
            term: self.term.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import records from a spreadsheet-export CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Classify a numeric score
    Classify {
        #[arg(long, allow_negative_numbers = true)]
        score: f64,
    },
    /// Resolve the program of a student identifier
    Resolve {
        #[arg(long)]
        id: String,
    },
    /// List students with their program and mean score
    Students(Scope),
    /// List courses with enrollment and mean score
    Courses(Scope),
    /// List programs with enrollment and capacity utilization
    Programs(Scope),
    /// Show the transcript of one student
    Transcript {
        #[arg(long)]
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the dashboard snapshot
    Dashboard {
        #[arg(long, env = "ACADEMIC_FACULTY_COUNT", default_value_t = 0)]
        faculty: usize,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown summary report
    Report {
        #[arg(long, env = "ACADEMIC_FACULTY_COUNT", default_value_t = 0)]
        faculty: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set unless --records points at a CSV file")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn open_source(records: Option<&PathBuf>) -> anyhow::Result<Arc<dyn RecordSource>> {
    let source: Arc<dyn RecordSource> = match records {
        Some(path) => {
            let outcome = read_records_from_path(path)?;
            info!(
                records = outcome.records.len(),
                skipped = outcome.skipped,
                path = %path.display(),
                "loaded records from CSV"
            );
            Arc::new(InMemorySource::new(outcome.records))
        }
        None => Arc::new(PgRecordSource::new(connect().await?)),
    };
    Ok(source)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::from(cli.engine);

    match cli.command {
        Commands::InitDb => {
            db::init_db(&connect().await?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let inserted = db::seed(&connect().await?).await?;
            println!("Seed data inserted ({inserted} new records).");
        }
        Commands::Import { csv } => {
            let outcome = read_records_from_path(&csv)?;
            let inserted = db::insert_records(&connect().await?, &outcome.records).await?;
            println!(
                "Inserted {inserted} records from {} ({} rows skipped).",
                csv.display(),
                outcome.skipped
            );
        }
        Commands::Classify { score } => {
            let grade = config.scale.classify(score);
            println!("{score} -> {} ({:.1} GPA)", grade.letter, grade.gpa);
        }
        Commands::Resolve { id } => {
            print_json(&programs::resolve(&id))?;
        }
        Commands::Students(scope) => {
            let engine = AcademicEngine::new(open_source(cli.records.as_ref()).await?, config);
            let students = engine.students(&scope.filter()).await?;
            if scope.json {
                return print_json(&students);
            }
            if students.is_empty() {
                println!("No students found.");
            }
            for student in students.values() {
                println!(
                    "- {} {} ({}, {}) mean {:.1} across {} courses",
                    student.identifier,
                    student.name,
                    student.program.code,
                    student.email,
                    student.mean_score,
                    student.course_count
                );
            }
        }
        Commands::Courses(scope) => {
            let engine = AcademicEngine::new(open_source(cli.records.as_ref()).await?, config);
            let courses = engine.courses(&scope.filter()).await?;
            if scope.json {
                return print_json(&courses);
            }
            if courses.is_empty() {
                println!("No courses found.");
            }
            for course in courses.values() {
                println!(
                    "- {} {} ({}) {} students, mean {:.1}",
                    course.code,
                    course.title,
                    course.department,
                    course.enrolled_count,
                    course.mean_score
                );
            }
        }
        Commands::Programs(scope) => {
            let engine = AcademicEngine::new(open_source(cli.records.as_ref()).await?, config);
            let programs = engine.programs(&scope.filter()).await?;
            if scope.json {
                return print_json(&programs);
            }
            if programs.is_empty() {
                println!("No programs found.");
            }
            for program in programs.values() {
                println!(
                    "- {} {} {} students ({}% of capacity), mean {:.1}",
                    program.code,
                    program.info.name,
                    program.enrolled_count,
                    program.capacity_utilization,
                    program.mean_score
                );
            }
        }
        Commands::Transcript { id, json } => {
            let engine = AcademicEngine::new(open_source(cli.records.as_ref()).await?, config);
            let Some(transcript) = engine.transcript(&id).await? else {
                println!("No records found for {id}.");
                return Ok(());
            };
            if json {
                return print_json(&transcript);
            }
            println!(
                "{} {} ({}) cumulative GPA {:.2}",
                transcript.student.identifier,
                transcript.student.name,
                transcript.student.program.name,
                transcript.cumulative_gpa
            );
            for entry in &transcript.entries {
                println!(
                    "- {} {} {} {}: {:.0} {}",
                    entry.academic_year,
                    entry.term,
                    entry.course_code,
                    entry.course_title,
                    entry.score,
                    entry.letter
                );
            }
        }
        Commands::Dashboard { faculty, json } => {
            let engine = AcademicEngine::new(open_source(cli.records.as_ref()).await?, config);
            let snapshot = engine.dashboard(ExternalCounts { faculty }).await;
            if json {
                return print_json(&snapshot);
            }
            print!("{}", report::build_report(&snapshot, engine.config()));
        }
        Commands::Report { faculty, out } => {
            let engine = AcademicEngine::new(open_source(cli.records.as_ref()).await?, config);
            let snapshot = engine.dashboard(ExternalCounts { faculty }).await;
            let report = report::build_report(&snapshot, engine.config());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
