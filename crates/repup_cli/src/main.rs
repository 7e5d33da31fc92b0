//! Operator CLI for the workout store.
//!
//! # Responsibility
//! - Load `.env`, start logging, open the pool from environment settings.
//! - Expose the diagnostics service as subcommands with JSON output.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::info;
use repup_core::{
    db, default_log_level, init_logging, open_pool, DbConfig, DiagnosticsService, RecordId,
    SqliteWorkoutRepository,
};

#[derive(Parser, Debug)]
#[command(version, about = "Workout store diagnostics", long_about = None)]
struct Args {
    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Write rolling log files here instead of stderr.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a liveness probe against the database.
    Ping,
    /// Print a health report.
    Health,
    /// List schema tables.
    Tables,
    /// Create a sample workout and print it.
    Seed {
        #[arg(long, default_value_t = 1)]
        user_id: RecordId,
        /// Exercise id for one entry; repeat for more entries.
        #[arg(long = "exercise", value_name = "ID")]
        exercises: Vec<RecordId>,
    },
}

fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let level = args.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, args.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    let config = DbConfig::from_env().context("loading database settings")?;
    let pool = open_pool(&config)
        .with_context(|| format!("opening database `{}`", config.database_path.display()))?;
    info!(
        "event=cli_start module=cli status=ok command={:?}",
        args.command
    );

    let diagnostics = DiagnosticsService::new(&pool, SqliteWorkoutRepository::new(&pool));
    match args.command {
        Commands::Ping => {
            db::ping(&pool).context("database ping")?;
            println!("pong");
        }
        Commands::Health => {
            let report = diagnostics.health();
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_healthy() {
                anyhow::bail!("database is unhealthy");
            }
        }
        Commands::Tables => {
            for table in diagnostics.list_tables()? {
                println!("{table}");
            }
        }
        Commands::Seed { user_id, exercises } => {
            let workout = diagnostics
                .seed_sample_workout(user_id, &exercises)
                .context("seeding sample workout")?;
            println!("{}", serde_json::to_string_pretty(&workout)?);
        }
    }
    Ok(())
}
