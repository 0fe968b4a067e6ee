//! Healthlog CLI - Command-line interface for the health journal engine
//!
//! Commands:
//! - log: Record manual observations for a day
//! - import: Merge device-sourced fields into a day record
//! - summary: Print the risk-flag summary for a day
//! - similar: List past days sharing risk flags with a target day
//! - patterns: Recompute and print the global patterns snapshot
//! - event: Append a subjective event
//! - events: List subjective events for a day

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use healthlog::{
    compute_patterns, find_similar, summarize, Config, DayStore, FitbitMetrics, InsightError,
    JsonStore, ManualMetrics, HEALTHLOG_VERSION,
};

/// Healthlog - local-first health journal engine
#[derive(Parser)]
#[command(name = "healthlog")]
#[command(version = HEALTHLOG_VERSION)]
#[command(about = "Track daily health data and surface risk patterns", long_about = None)]
struct Cli {
    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record manual observations for a day
    Log {
        /// Date to log against (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Subjective stress level (0-10)
        #[arg(long)]
        stress: Option<f64>,

        /// Subjective anxiety level (0-10)
        #[arg(long)]
        anxiety: Option<f64>,

        /// Time of last caffeine intake (HH:MM)
        #[arg(long)]
        caffeine_time: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Merge device-sourced fields into a day record
    Import {
        /// Date the data belongs to (YYYY-MM-DD)
        date: String,

        /// JSON file with the fitbit fragment (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the risk-flag summary for a day
    Summary {
        /// Target date (YYYY-MM-DD)
        date: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List past days sharing risk flags with a target day
    Similar {
        /// Target date (YYYY-MM-DD)
        date: String,

        /// Maximum number of days returned
        #[arg(long, default_value = "5")]
        top_n: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recompute and print the global patterns snapshot
    Patterns {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append a subjective event for a day
    Event {
        /// Date the event belongs to (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Event description
        note: String,
    },

    /// List subjective events for a day
    Events {
        /// Target date (YYYY-MM-DD)
        date: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HealthlogCliError> {
    let store = open_store(cli.data_dir)?;

    match cli.command {
        Commands::Log {
            date,
            stress,
            anxiety,
            caffeine_time,
            notes,
        } => {
            let date = date.unwrap_or_else(today);
            let fragment = ManualMetrics {
                stress,
                anxiety,
                caffeine_time,
                notes,
                ..Default::default()
            };
            let record = store.write_manual(&date, fragment)?;
            println!("Logged {}", record.date);
            Ok(())
        }

        Commands::Import { date, input } => {
            let raw = read_input(&input)?;
            let fragment: FitbitMetrics = serde_json::from_str(&raw)?;
            let record = store.write_fitbit(&date, fragment)?;
            println!("Imported fitbit data for {}", record.date);
            Ok(())
        }

        Commands::Summary { date, json } => cmd_summary(&store, &date, json),

        Commands::Similar { date, top_n, json } => cmd_similar(&store, &date, top_n, json),

        Commands::Patterns { json } => {
            let snapshot = compute_patterns(&store)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("Global Patterns ({})", snapshot.last_computed);
                println!("================");
                println!("Sleep avg:   {}", fmt_opt(snapshot.sleep_avg));
                println!("HRV avg:     {}", fmt_opt(snapshot.hrv_avg));
                println!("Stress avg:  {}", fmt_opt(snapshot.stress_avg));
                println!(
                    "Caffeine/sleep corr: {}",
                    fmt_opt(snapshot.caffeine_sleep_corr)
                );
                if snapshot.stress_triggers.is_empty() {
                    println!("Stress triggers: none");
                } else {
                    println!("Stress triggers: {}", snapshot.stress_triggers.join(", "));
                }
            }
            Ok(())
        }

        Commands::Event { date, note } => {
            let date = date.unwrap_or_else(today);
            let details =
                HashMap::from([("note".to_string(), serde_json::Value::String(note))]);
            let event = store.record_event(&date, details)?;
            println!("Recorded event {} on {}", event.id, event.date);
            Ok(())
        }

        Commands::Events { date } => {
            let events = store.events_for(&date)?;
            if events.is_empty() {
                println!("No events for {date}");
            } else {
                for event in events {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }
            Ok(())
        }
    }
}

fn cmd_summary(store: &JsonStore, date: &str, json: bool) -> Result<(), HealthlogCliError> {
    let Some(record) = store.day(date)? else {
        return Err(HealthlogCliError::NoRecord(date.to_string()));
    };
    let summary = summarize(&record);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Summary for {date}");
        println!("================");
        for (name, raised) in summary.flags() {
            println!("  {:14} {}", name, if raised { "yes" } else { "no" });
        }
        println!("  {:14} {:.3}", "score", summary.score);
    }
    Ok(())
}

fn cmd_similar(
    store: &JsonStore,
    date: &str,
    top_n: usize,
    json: bool,
) -> Result<(), HealthlogCliError> {
    let similar = find_similar(store, date, top_n)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&similar)?);
    } else if similar.is_empty() {
        println!("No similar days found for {date}");
    } else {
        println!("Days similar to {date}");
        println!("================");
        for scored in similar {
            println!(
                "  {}  ({} shared flags)",
                scored.day.date, scored.similarity_score
            );
        }
    }
    Ok(())
}

// Helper functions

fn open_store(data_dir: Option<PathBuf>) -> Result<JsonStore, HealthlogCliError> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => Config::load()?.data_dir,
    };
    Ok(JsonStore::new(data_dir))
}

fn today() -> String {
    chrono::Local::now().date_naive().to_string()
}

fn read_input(input: &PathBuf) -> Result<String, HealthlogCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "n/a".to_string(),
    }
}

// Error types

#[derive(Debug)]
enum HealthlogCliError {
    Io(io::Error),
    Json(serde_json::Error),
    Insight(InsightError),
    NoRecord(String),
}

impl From<io::Error> for HealthlogCliError {
    fn from(e: io::Error) -> Self {
        HealthlogCliError::Io(e)
    }
}

impl From<serde_json::Error> for HealthlogCliError {
    fn from(e: serde_json::Error) -> Self {
        HealthlogCliError::Json(e)
    }
}

impl From<InsightError> for HealthlogCliError {
    fn from(e: InsightError) -> Self {
        HealthlogCliError::Insight(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HealthlogCliError> for CliError {
    fn from(e: HealthlogCliError) -> Self {
        match e {
            HealthlogCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HealthlogCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HealthlogCliError::Insight(e) => CliError {
                code: "STORE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the data directory and date format".to_string()),
            },
            HealthlogCliError::NoRecord(date) => CliError {
                code: "NO_RECORD".to_string(),
                message: format!("No record found for {date}"),
                hint: Some("Log or import data for this date first".to_string()),
            },
        }
    }
}
