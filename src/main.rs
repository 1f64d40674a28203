//! crew-schedule CLI.
//!
//! Loads a task CSV and a JSON config, runs one scenario and prints the
//! result as pretty JSON on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crew_schedule::config::ConfigFile;
use crew_schedule::ingest::CsvCatalogSource;
use crew_schedule::logging;
use crew_schedule::models::StaffingConfig;
use crew_schedule::scenario::{OptimizationParams, StaffingBounds, TargetLatenessParams};
use crew_schedule::service::{PlanningService, ScenarioRequest};

#[derive(Parser)]
#[command(name = "crew-schedule")]
#[command(about = "Production scheduling with staffing scenario search", long_about = None)]
struct Cli {
    /// Task table (CSV)
    #[arg(long)]
    tasks: PathBuf,
    /// Engine and plant settings (JSON)
    #[arg(long)]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule under the current roster
    Baseline,
    /// Fixed staffing from the config, or each pool's roster headcount
    Scenario1,
    /// Target-lateness search with the config defaults
    Scenario2,
    /// Optimization search with the config defaults
    Scenario3,
    /// Schedule with an explicit headcount
    Fixed {
        #[arg(long)]
        mechanics: u32,
        #[arg(long)]
        quality: u32,
    },
    /// Smallest staffing whose lateness lands near a target
    Target {
        #[command(flatten)]
        bounds: BoundsArgs,
        /// Target lateness in minutes
        #[arg(long, allow_hyphen_values = true)]
        target: i64,
        /// Accepted distance from the target in minutes
        #[arg(long)]
        tolerance: i64,
    },
    /// Minimize lateness within a trial budget
    Optimize {
        #[command(flatten)]
        bounds: BoundsArgs,
        #[arg(long, default_value = "300")]
        max_iterations: usize,
    },
    /// List crew pools with headcount and task load
    Teams,
    /// Assign present mechanics to a team's tasks for one day
    Assign {
        #[arg(long)]
        team: String,
        #[arg(long, default_value = "baseline")]
        scenario: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Present mechanic, repeatable
        #[arg(long = "mechanic")]
        mechanics: Vec<String>,
    },
}

#[derive(Args)]
struct BoundsArgs {
    #[arg(long, default_value = "1")]
    min_mechanics: u32,
    #[arg(long, default_value = "30")]
    max_mechanics: u32,
    #[arg(long, default_value = "1")]
    min_quality: u32,
    #[arg(long, default_value = "10")]
    max_quality: u32,
}

impl BoundsArgs {
    fn bounds(&self) -> StaffingBounds {
        StaffingBounds::new(
            (self.min_mechanics, self.max_mechanics),
            (self.min_quality, self.max_quality),
        )
    }
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let file = ConfigFile::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let source = CsvCatalogSource::new(&cli.tasks, file.plant);
    let service = PlanningService::new(source, file.engine);
    info!(tasks = %cli.tasks.display(), "crew-schedule starting");

    match cli.command {
        Commands::Baseline => print(&service.compute_baseline()?),
        Commands::Scenario1 => print(&service.refresh("scenario1")?),
        Commands::Scenario2 => print(&service.refresh("scenario2")?),
        Commands::Scenario3 => print(&service.refresh("scenario3")?),
        Commands::Fixed { mechanics, quality } => print(
            &service.run_scenario(ScenarioRequest::Fixed(StaffingConfig::new(mechanics, quality)))?,
        ),
        Commands::Target {
            bounds,
            target,
            tolerance,
        } => print(&service.run_scenario(ScenarioRequest::TargetLateness(TargetLatenessParams {
            bounds: bounds.bounds(),
            target_lateness: target,
            tolerance,
        }))?),
        Commands::Optimize {
            bounds,
            max_iterations,
        } => print(&service.run_scenario(ScenarioRequest::Optimize(OptimizationParams {
            bounds: bounds.bounds(),
            max_iterations,
        }))?),
        Commands::Teams => print(&service.all_teams()?),
        Commands::Assign {
            team,
            scenario,
            date,
            mechanics,
        } => print(&service.generate_assignments(&team, &scenario, date, &mechanics)?),
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
