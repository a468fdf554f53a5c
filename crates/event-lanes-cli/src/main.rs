//! `lanes` CLI — normalize, process, and validate calendar event JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Collapse legacy alias fields into canonical events (stdin → stdout)
//! cat events.json | lanes normalize
//!
//! # Naive timestamps are wall-clock time in the given zone
//! lanes normalize -i events.json --timezone Europe/Helsinki
//!
//! # Split events per person and clamp them to a visible window
//! lanes process -i events.json --persons persons.json \
//!   --from 2026-03-16T08:00:00Z --to 2026-03-16T17:00:00Z -o processed.json
//!
//! # Check raw or processed records against their contracts
//! lanes validate -i events.json
//! lanes validate --processed -i processed.json
//!
//! # List records that share time on the same person's row
//! lanes overlaps -i processed.json
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=event_lanes=debug`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use event_lanes::timestamp::{parse_timestamp, parse_timezone};
use event_lanes::{
    check_raw_event, find_overlaps, normalize_all, normalize_event, process_raw, NormalizeOptions,
    Person, ProcessOptions, ProcessedEvent, RawCalendarEvent, UnknownPersonPolicy, Window,
};
use std::io::{self, Read, Write};
use std::process;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "event_lanes=warn,lanes=warn";

#[derive(Parser)]
#[command(
    name = "lanes",
    version,
    about = "Calendar event normalization and per-person timeline processing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert raw events (any field naming) into canonical events
    Normalize {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// IANA timezone for timestamps without an offset
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },
    /// Produce render-ready records: one per person, clamped to a window
    Process {
        /// Input file of raw events (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// JSON file with the person directory
        #[arg(long)]
        persons: Option<String>,
        /// Visible window start
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Visible window end
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// IANA timezone for timestamps without an offset
        #[arg(long, default_value = "UTC")]
        timezone: String,
        /// Color for events that have none
        #[arg(long, default_value = event_lanes::process::DEFAULT_COLOR)]
        default_color: String,
        /// Row key for events attributed to nobody
        #[arg(long, default_value = event_lanes::process::DEFAULT_UNASSIGNED_KEY)]
        unassigned_key: String,
        /// Handling of person ids missing from the directory
        #[arg(long, value_enum, default_value_t = UnknownPersons::Keep)]
        unknown_persons: UnknownPersons,
        /// Fail instead of skipping events that cannot be normalized
        #[arg(long)]
        strict: bool,
    },
    /// Report contract violations (exit code 1 when any are found)
    Validate {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Treat the input as processed records instead of raw events
        #[arg(long)]
        processed: bool,
        /// IANA timezone for timestamps without an offset
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },
    /// List overlapping processed records on the same row
    Overlaps {
        /// Input file of processed records (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum UnknownPersons {
    Keep,
    Drop,
    Reject,
}

impl From<UnknownPersons> for UnknownPersonPolicy {
    fn from(value: UnknownPersons) -> Self {
        match value {
            UnknownPersons::Keep => UnknownPersonPolicy::Keep,
            UnknownPersons::Drop => UnknownPersonPolicy::Drop,
            UnknownPersons::Reject => UnknownPersonPolicy::Reject,
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize {
            input,
            output,
            timezone,
        } => {
            let raws = read_raw_events(input.as_deref())?;
            let opts = normalize_options(&timezone)?;
            let report = normalize_all(&raws, &opts);

            write_json(output.as_deref(), &report.events)?;
            if !report.rejected.is_empty() {
                for rejected in &report.rejected {
                    eprintln!("{}", rejected.error);
                }
                process::exit(1);
            }
        }
        Commands::Process {
            input,
            output,
            persons,
            from,
            to,
            timezone,
            default_color,
            unassigned_key,
            unknown_persons,
            strict,
        } => {
            let raws = read_raw_events(input.as_deref())?;
            let directory: Vec<Person> = match persons.as_deref() {
                Some(path) => {
                    let json = read_input(Some(path))?;
                    serde_json::from_str(&json)
                        .with_context(|| format!("Failed to parse persons file: {}", path))?
                }
                None => Vec::new(),
            };

            let normalize = normalize_options(&timezone)?;
            let window = match (from.as_deref(), to.as_deref()) {
                (Some(from), Some(to)) => {
                    let start = parse_timestamp(from, normalize.timezone)
                        .context("Invalid --from timestamp")?;
                    let end = parse_timestamp(to, normalize.timezone)
                        .context("Invalid --to timestamp")?;
                    Some(Window::new(start, end)?)
                }
                _ => None,
            };

            let opts = ProcessOptions {
                window,
                default_color,
                unassigned_key,
                unknown_persons: unknown_persons.into(),
                normalize,
            };

            let outcome =
                process_raw(&raws, &directory, &opts).context("Failed to process events")?;
            if strict && !outcome.rejected.is_empty() {
                let reasons: Vec<String> = outcome
                    .rejected
                    .iter()
                    .map(|r| r.error.to_string())
                    .collect();
                anyhow::bail!(
                    "{} event(s) could not be normalized:\n{}",
                    reasons.len(),
                    reasons.join("\n")
                );
            }
            for rejected in &outcome.rejected {
                warn!(event_id = rejected.id, error = %rejected.error, "skipping event");
            }

            info!(
                records = outcome.report.events.len(),
                hidden = outcome.report.hidden,
                rejected = outcome.rejected.len(),
                "processing finished"
            );
            write_json(output.as_deref(), &outcome.report.events)?;
        }
        Commands::Validate {
            input,
            processed,
            timezone,
        } => {
            let json = read_input(input.as_deref())?;
            let problems = if processed {
                validate_processed(&json)?
            } else {
                validate_raw(&json, &normalize_options(&timezone)?)?
            };

            for problem in &problems {
                println!("{}", problem);
            }
            if !problems.is_empty() {
                process::exit(1);
            }
            println!("OK");
        }
        Commands::Overlaps { input, output } => {
            let json = read_input(input.as_deref())?;
            let records: Vec<ProcessedEvent> =
                serde_json::from_str(&json).context("Failed to parse processed records")?;
            let overlaps = find_overlaps(&records);
            write_json(output.as_deref(), &overlaps)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default of warnings from the
/// library and this binary.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();
}

fn normalize_options(timezone: &str) -> Result<NormalizeOptions> {
    let timezone = parse_timezone(timezone)?;
    Ok(NormalizeOptions { timezone })
}

/// One line per problem: records that do not deserialize, missing concepts,
/// then anything that stops an otherwise complete event from normalizing.
fn validate_raw(json: &str, opts: &NormalizeOptions) -> Result<Vec<String>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).context("Failed to parse raw events")?;
    let record_count = values.len();
    let mut problems = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        let raw: RawCalendarEvent = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                problems.push(format!("Record #{}: {}", index + 1, e));
                continue;
            }
        };
        let violations = check_raw_event(&raw);
        if violations.is_empty() {
            if let Err(e) = normalize_event(&raw, opts) {
                problems.push(e.to_string());
            }
        } else {
            problems.extend(
                violations
                    .iter()
                    .map(|v| format!("Event {}: {}", raw.id, v)),
            );
        }
    }
    debug!(
        events = record_count,
        problems = problems.len(),
        "validated raw events"
    );
    Ok(problems)
}

/// Records are checked one at a time so a single bad record does not hide
/// the rest.
fn validate_processed(json: &str) -> Result<Vec<String>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).context("Failed to parse processed records")?;
    let problems = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            serde_json::from_value::<ProcessedEvent>(value)
                .err()
                .map(|e| format!("Record #{}: {}", index + 1, e))
        })
        .collect();
    Ok(problems)
}

fn read_raw_events(path: Option<&str>) -> Result<Vec<RawCalendarEvent>> {
    let json = read_input(path)?;
    serde_json::from_str(&json).context("Failed to parse raw events")
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

fn write_json<T: serde::Serialize + ?Sized>(path: Option<&str>, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    write_output(path, &content)
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
