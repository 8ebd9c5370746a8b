//! `sched` CLI — project court schedules and validate reservations against an
//! exported `GET /reservations` snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Free/occupied blocks of court 1 on a day (snapshot on stdin)
//! curl -s $API/reservations | sched project --resource 1 --date 2024-06-01
//!
//! # Same, from a file, as JSON
//! sched project -i reservations.json --resource 1 --date 2024-06-01 --format json
//!
//! # Check a draft before submitting it (exit 2 when rejected)
//! sched validate -i reservations.json --resource 1 --date 2024-06-01 \
//!     --start 08:30 --end 09:30 --occupant Ana
//!
//! # Audit a snapshot for overlapping reservations
//! sched conflicts -i reservations.json --date 2024-06-01
//!
//! # First free block of at least 90 minutes
//! sched first-free -i reservations.json --resource 1 --date 2024-06-01 --min-minutes 90
//! ```

mod config;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use schedule_engine::projector::{first_free_block, DaySummary, IntervalBlock};
use schedule_engine::{clock, BlockKind, Reservation, ReservationDraft, ValidationResult};
use tracing_subscriber::EnvFilter;

use config::Settings;

/// Exit status for a rejected draft or a missing free block.
const EXIT_NEGATIVE: i32 = 2;

#[derive(Parser)]
#[command(
    name = "sched",
    version,
    about = "Court schedule projection and reservation validation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to ./sched.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the free and occupied blocks of a resource on a day
    Project {
        /// Reservation snapshot (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        resource: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Check a reservation draft against the snapshot
    Validate {
        /// Reservation snapshot (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        resource: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// HH:MM
        #[arg(long)]
        start: Option<String>,
        /// HH:MM
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        occupant: Option<String>,
        /// Id of the reservation being edited
        #[arg(long)]
        exclude_id: Option<String>,
        /// Treat this YYYY-MM-DDTHH:MM[:SS] local instant as now
        #[arg(long)]
        now: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List overlapping reservations in the snapshot
    Conflicts {
        /// Reservation snapshot (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        resource: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Find the first free block of at least the given length
    FirstFree {
        /// Reservation snapshot (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        resource: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        min_minutes: u16,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_tracing(cli.verbose, settings.log_level.as_deref());

    match cli.command {
        Commands::Project {
            input,
            resource,
            date,
            format,
        } => {
            let reservations = load_snapshot(input.as_deref(), &settings)?;
            let blocks = schedule_engine::project(&reservations, &resource, &date)
                .context("Failed to project schedule")?;

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&blocks)?),
                Format::Text => {
                    for block in &blocks {
                        println!("{}", describe_block(block));
                    }
                    let summary = DaySummary::from_blocks(&blocks);
                    println!(
                        "{} reservation(s), {} min free, {} min occupied",
                        summary.reservations, summary.free_minutes, summary.occupied_minutes
                    );
                }
            }
        }
        Commands::Validate {
            input,
            resource,
            date,
            start,
            end,
            occupant,
            exclude_id,
            now,
            format,
        } => {
            let reservations = load_snapshot(input.as_deref(), &settings)?;
            let candidate = ReservationDraft {
                resource,
                date,
                start_time: start,
                end_time: end,
                occupant,
            };

            let result = match now.or_else(|| settings.now.clone()) {
                Some(now) => {
                    let now = config::parse_now(&now)?;
                    schedule_engine::validate_at(&candidate, &reservations, exclude_id.as_deref(), now)
                }
                None => schedule_engine::validate(&candidate, &reservations, exclude_id.as_deref()),
            }
            .context("Failed to validate reservation")?;

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                Format::Text => match &result {
                    ValidationResult::Accepted => println!("accepted"),
                    ValidationResult::Rejected(rejection) => println!("rejected: {}", rejection),
                },
            }
            if !result.is_accepted() {
                process::exit(EXIT_NEGATIVE);
            }
        }
        Commands::Conflicts {
            input,
            resource,
            date,
            format,
        } => {
            let mut reservations = load_snapshot(input.as_deref(), &settings)?;
            if let Some(resource) = &resource {
                reservations.retain(|r| &r.resource == resource);
            }
            if let Some(date) = &date {
                let day = clock::date_key(date)?;
                reservations.retain(|r| clock::date_prefix(&r.date) == day);
            }

            let conflicts = schedule_engine::find_conflicts(&reservations)
                .context("Failed to check for conflicts")?;

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&conflicts)?),
                Format::Text if conflicts.is_empty() => println!("no conflicts"),
                Format::Text => {
                    for c in &conflicts {
                        println!(
                            "resource {} on {}: #{} {}-{} overlaps #{} {}-{} by {} min",
                            c.first.resource,
                            clock::date_prefix(&c.first.date),
                            c.first.id,
                            short_time(&c.first.start_time),
                            short_time(&c.first.end_time),
                            c.second.id,
                            short_time(&c.second.start_time),
                            short_time(&c.second.end_time),
                            c.overlap_minutes
                        );
                    }
                }
            }
        }
        Commands::FirstFree {
            input,
            resource,
            date,
            min_minutes,
        } => {
            let reservations = load_snapshot(input.as_deref(), &settings)?;
            let blocks = schedule_engine::project(&reservations, &resource, &date)
                .context("Failed to project schedule")?;

            match first_free_block(&blocks, min_minutes) {
                Some(block) => println!(
                    "{}-{} ({} min)",
                    block.from_minute,
                    block.to_minute,
                    block.duration_minutes()
                ),
                None => {
                    println!("no free block of at least {} min", min_minutes);
                    process::exit(EXIT_NEGATIVE);
                }
            }
        }
    }

    Ok(())
}

/// Install a stderr `tracing` subscriber. `RUST_LOG` wins, then `-v`, then the
/// configured level.
fn init_tracing(verbose: u8, configured: Option<&str>) {
    let fallback = match verbose {
        0 => configured.unwrap_or("warn"),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read and decode the reservation snapshot: `-i`, then the configured input,
/// then stdin.
fn load_snapshot(input: Option<&str>, settings: &Settings) -> Result<Vec<Reservation>> {
    let path = input.or(settings.input.as_deref());
    let json = read_input(path)?;
    let reservations = schedule_engine::parse_reservations(&json)
        .with_context(|| format!("Failed to parse reservations from {}", path.unwrap_or("stdin")))?;
    tracing::debug!(count = reservations.len(), "loaded reservation snapshot");
    Ok(reservations)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn describe_block(block: &IntervalBlock) -> String {
    let range = format!("{}-{}", block.from_minute, block.to_minute);
    match block.kind {
        BlockKind::Free => format!("{range}  free"),
        BlockKind::Occupied => {
            let mut line = format!(
                "{range}  occupied  {} (#{})",
                block.occupant.as_deref().unwrap_or(""),
                block.source_reservation.as_deref().unwrap_or("?")
            );
            if block.wraps {
                line.push_str("  wraps past midnight");
            }
            line
        }
    }
}

/// `HH:MM` part of a wire time, for display.
fn short_time(s: &str) -> &str {
    s.get(..5).unwrap_or(s)
}
