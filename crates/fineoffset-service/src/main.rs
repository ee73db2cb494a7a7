//! Fine Offset Service - station table administration.
//!
//! Run with: `cargo run -p fineoffset-service -- list`

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fineoffset_core::LoadOutcome;
use fineoffset_core::upload::fresh_salt;
use fineoffset_service::{Config, open_registry, parse_code, read_json_arg, station_table};
use fineoffset_types::StationId;

/// Fine Offset Service - manage the persisted weather station table.
#[derive(Parser, Debug)]
#[command(name = "fineoffset-service")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Station table path (overrides config).
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the station table, creating an empty one if needed.
    Init,

    /// List all station slots.
    List,

    /// Print a station's settings as JSON.
    Show {
        /// Station type code (decimal or 0x hex).
        #[arg(value_parser = parse_code)]
        station_type: u16,
        /// Unit id (decimal or 0x hex).
        #[arg(value_parser = parse_code)]
        id: u16,
    },

    /// Add or replace a station from a JSON settings object ("-" reads stdin).
    Add { json: String },

    /// Remove the station named by a JSON object with wsType and wsID ("-" reads stdin).
    Remove { json: String },

    /// Print the upload request templates for a station.
    ///
    /// The service does not receive packets, so measurement values are those
    /// of an empty reading. Use this to check hosts, indices and credentials.
    Urls {
        /// Station type code (decimal or 0x hex).
        #[arg(value_parser = parse_code)]
        station_type: u16,
        /// Unit id (decimal or 0x hex).
        #[arg(value_parser = parse_code)]
        id: u16,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("fineoffset_core={}", level).parse()?)
                .add_directive(format!("fineoffset_service={}", level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    };
    if let Some(store) = args.store {
        config.storage.path = store;
    }
    config.validate()?;

    let (mut registry, outcome) = open_registry(&config)
        .with_context(|| format!("Failed to open station table {:?}", config.storage.path))?;

    match args.command {
        Command::Init => match outcome {
            LoadOutcome::Loaded { stations } => {
                println!("Station table holds {} station(s)", stations)
            }
            LoadOutcome::Initialized => println!("Created empty station table"),
            LoadOutcome::Recovered => println!("Station table was corrupt and has been reset"),
        },
        Command::List => print!("{}", station_table(&registry)),
        Command::Show { station_type, id } => {
            let station = registry
                .get(station_type, id)
                .with_context(|| {
                    format!("Station {} is not registered", StationId::new(station_type, id))
                })?;
            println!("{}", serde_json::to_string_pretty(station.settings())?);
        }
        Command::Add { json } => {
            let json = read_json_arg(&json, std::io::stdin())?;
            let slot = registry.add(&json)?;
            println!("Station stored in slot {}", slot);
        }
        Command::Remove { json } => {
            let json = read_json_arg(&json, std::io::stdin())?;
            match registry.remove(&json)? {
                Some(slot) => println!("Station removed from slot {}", slot),
                None => println!("No matching station registered"),
            }
        }
        Command::Urls { station_type, id } => {
            let station = registry
                .get(station_type, id)
                .with_context(|| {
                    format!("Station {} is not registered", StationId::new(station_type, id))
                })?;
            let requests = station.upload_requests(&fresh_salt());
            if requests.is_empty() {
                info!("No upload service enabled for {}", station.identity());
            }
            for request in requests {
                println!("{:<12} {}", request.service.to_string(), request.url());
            }
        }
    }

    Ok(())
}
