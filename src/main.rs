use chrono::Local;
use clap::{Args, Parser, Subcommand};
use placement_engine::config::AppConfig;
use placement_engine::error::AppError;
use placement_engine::telemetry;
use placement_engine::workflows::placement::domain::Assignment;
use placement_engine::workflows::placement::report::{
    self, FieldAverage, SiteCapacityRow, SummaryRow,
};
use placement_engine::workflows::placement::{allocate, CapRelaxation, PlacementIntake};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Internship Placement Engine",
    about = "Match internship students to placement sites from CSV exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a full allocation and print the result as JSON
    Allocate(AllocateArgs),
}

#[derive(Args, Debug)]
struct AllocateArgs {
    /// CSV export of the student questionnaire
    #[arg(long)]
    students: PathBuf,
    /// CSV export of placement sites
    #[arg(long)]
    sites: PathBuf,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct AllocateResponse {
    generated_at: String,
    students: usize,
    sites: usize,
    assignments: Vec<Assignment>,
    capacity_report: Vec<SiteCapacityRow>,
    supervisor_summary: Vec<SummaryRow>,
    relaxations: Vec<CapRelaxation>,
    field_averages: Vec<FieldAverage>,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Allocate(args) => run_allocation(args, &config),
    }
}

fn run_allocation(args: AllocateArgs, config: &AppConfig) -> Result<(), AppError> {
    let students = PlacementIntake::students_from_path(&args.students)?;
    let sites = PlacementIntake::sites_from_path(&args.sites)?;
    info!(
        students = students.len(),
        sites = sites.len(),
        "placement inputs loaded"
    );

    let outcome = allocate(&students, &sites, &config.weights);
    let rows = report::result_rows(&sites, &outcome.assignments);

    let response = AllocateResponse {
        generated_at: Local::now().to_rfc3339(),
        students: students.len(),
        sites: sites.len(),
        capacity_report: report::capacity_report(&sites, &outcome.assignments),
        supervisor_summary: report::supervisor_summary(&sites, &outcome.assignments),
        field_averages: report::field_breakdown(&rows),
        assignments: outcome.assignments,
        relaxations: outcome.relaxations,
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{rendered}");

    Ok(())
}
