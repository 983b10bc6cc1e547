use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod adherence;
mod config;
mod db;
mod error;
mod insights;
mod models;
mod report;
mod tags;
mod trend;
mod window;

use db::{MemoryStore, PgRecordStore, RecordStore};
use models::{parse_medication, RecordDraft, PROTECTIVE_TAGS, TRIGGER_TAGS};

#[derive(Parser)]
#[command(name = "mood-tracker")]
#[command(about = "Daily mood check-ins and personal trend insights", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load two weeks of sample check-ins for an owner
    Seed {
        #[arg(long)]
        owner: String,
    },
    /// Import check-ins from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Record a check-in and show this week's alert
    Log {
        #[arg(long)]
        owner: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        score: i64,
        /// Repeat or comma-separate
        #[arg(long, value_delimiter = ',')]
        tag: Vec<String>,
        #[arg(long)]
        note: Option<String>,
        /// Up to three entries
        #[arg(long)]
        grateful: Vec<String>,
        /// yes / no; omit when medication is not tracked
        #[arg(long)]
        medication: Option<String>,
    },
    /// Print weekly comparison, tag stats, insights and adherence
    Summary {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print a report for sample data without touching the database
    Demo {
        #[arg(long, default_value = "demo@example.com")]
        owner: String,
    },
    /// List the tag vocabulary
    Tags,
}

fn init_tracing() {
    let log_env = std::env::var("MOOD_TRACKER_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn print_tags() {
    println!("Triggers:");
    for tag in TRIGGER_TAGS {
        println!("- {tag}");
    }
    println!("Protective:");
    for tag in PROTECTIVE_TAGS {
        println!("- {tag}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let today = Utc::now().date_naive();

    match &cli.command {
        Commands::Tags => {
            print_tags();
            return Ok(());
        }
        Commands::Demo { owner } => {
            let store = MemoryStore::default();
            db::seed(&store, owner, today).await?;
            let records = store.list_records(owner).await?;
            let summary = report::build_summary(owner, &records, today);
            print!("{}", report::build_report(&summary, &records));
            return Ok(());
        }
        _ => {}
    }

    let config = config::Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    let store = PgRecordStore::new(pool.clone());

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed { owner } => {
            let inserted = db::seed(&store, &owner, today).await?;
            println!("Inserted {inserted} sample check-ins for {owner}.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&store, &csv, config.scale).await?;
            println!("Inserted {inserted} check-ins from {}.", csv.display());
        }
        Commands::Log {
            owner,
            date,
            score,
            tag,
            note,
            grateful,
            medication,
        } => {
            let draft = RecordDraft {
                owner: owner.clone(),
                date: date.unwrap_or_else(|| today.to_string()),
                score,
                tags: tag,
                note,
                gratitude: grateful,
                medication_taken: match medication {
                    Some(value) => parse_medication(&value)?,
                    None => None,
                },
            };
            let record = draft.validate(config.scale)?;
            store.append_record(&record).await?;
            println!("Saved. You're doing great.");

            // A just-appended row may not be visible yet; the comparison
            // simply reflects whatever the store returns.
            let records = store.list_records(&owner).await?;
            let comparison = trend::compare(&records, today);
            if let Some(alert) = trend::weekly_alert(&comparison) {
                println!("{alert}");
            }
        }
        Commands::Summary {
            owner,
            as_of,
            json,
        } => {
            let as_of = as_of.unwrap_or(today);
            let records = store.list_records(&owner).await?;
            let summary = report::build_summary(&owner, &records, as_of);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            print!("{}", report::build_report(&summary, &records));
        }
        Commands::Report { owner, as_of, out } => {
            let as_of = as_of.unwrap_or(today);
            let records = store.list_records(&owner).await?;
            let summary = report::build_summary(&owner, &records, as_of);
            std::fs::write(&out, report::build_report(&summary, &records))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Tags | Commands::Demo { .. } => {}
    }

    Ok(())
}
