//! Skywatch CLI
//!
//! Local harness for the observation registry. The embedding environment
//! normally supplies the caller identity; here `--as` stands in for it.
//!
//! ## Usage
//!
//! ```bash
//! # Write a default config into the storage directory
//! skywatch init
//!
//! # Register an observer handle
//! skywatch --as alice register "AstroWizard"
//!
//! # Submit an observation
//! skywatch --as alice submit --target "Andromeda Galaxy" --category Galaxy \
//!     --right-ascension "00h 42m 44s" --declination "+41 16" \
//!     --site "Dark Sky Site" --notes "Clear spiral structure"
//!
//! # Validate someone else's record
//! skywatch --as bob validate 1
//!
//! # Inspect state
//! skywatch observer alice
//! skywatch record 1
//! skywatch stats alice Galaxy
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use skywatch::{Config, ObservationInput, Registry, RegistryError};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "skywatch")]
#[command(about = "Peer-attested sky observation registry")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage directory override
    #[arg(long, env = "SKYWATCH_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Administrative identity override
    #[arg(long, env = "SKYWATCH_ADMIN_ID")]
    admin_id: Option<String>,

    /// Caller identity for mutating commands
    #[arg(long = "as", value_name = "IDENTITY", env = "SKYWATCH_IDENTITY", default_value = "local")]
    identity: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config file into the storage directory
    Init,
    /// Register an observer handle (or update an existing one)
    Register { handle: String },
    /// Submit an observation record
    Submit {
        #[arg(long)]
        target: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        right_ascension: String,
        #[arg(long, default_value = "")]
        declination: String,
        #[arg(long, default_value = "")]
        site: String,
        #[arg(long, default_value = "")]
        sky_quality: String,
        #[arg(long, default_value = "")]
        weather: String,
        #[arg(long, default_value = "")]
        equipment: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// ID of a related prior record
        #[arg(long)]
        related: Option<i64>,
    },
    /// Validate another observer's record
    Validate { record_id: i64 },
    /// Create an honor type (admin only)
    CreateHonor {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        criteria: String,
        #[arg(long, default_value = "")]
        rarity: String,
    },
    /// Show an observer profile
    Observer { id: String },
    /// Show an observation record
    Record { id: i64 },
    /// Show an honor type definition
    HonorType { id: i64 },
    /// Show an observer's submission count in a category
    Stats { observer: String, category: String },
    /// Show registry-wide statistics
    Status,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skywatch=info")),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error[{}]: {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), RegistryError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = args.storage_dir {
        config.storage_dir = dir;
    }
    if let Some(admin_id) = args.admin_id {
        config.admin_id = admin_id;
    }

    if let Command::Init = args.command {
        std::fs::create_dir_all(&config.storage_dir)?;
        let path = config.config_path();
        config.save(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let registry = Registry::open(&config)?;
    let caller = args.identity.as_str();

    match args.command {
        Command::Init => unreachable!(),
        Command::Register { handle } => {
            registry.establish_observer_account(caller, &handle)?;
            print_json(&json!({ "registered": caller, "handle": handle }));
        }
        Command::Submit {
            target,
            category,
            right_ascension,
            declination,
            site,
            sky_quality,
            weather,
            equipment,
            notes,
            related,
        } => {
            let record_id = registry.submit_celestial_observation(
                caller,
                ObservationInput {
                    target,
                    category,
                    right_ascension,
                    declination,
                    site,
                    sky_quality,
                    weather,
                    equipment,
                    notes,
                    related_record: related,
                },
            )?;
            print_json(&json!({ "record_id": record_id }));
        }
        Command::Validate { record_id } => {
            registry.validate_celestial_record(caller, record_id)?;
            let record = registry.fetch_record(record_id)?;
            print_json(&json!({
                "record_id": record_id,
                "confirmations": record.confirmation_count,
            }));
        }
        Command::CreateHonor {
            name,
            description,
            criteria,
            rarity,
        } => {
            let id =
                registry.establish_honor_type(caller, &name, &description, &criteria, &rarity)?;
            print_json(&json!({ "honor_type_id": id }));
        }
        Command::Observer { id } => {
            let profile = registry.fetch_observer(&id)?;
            print_value(&profile);
        }
        Command::Record { id } => {
            let record = registry.fetch_record(id)?;
            print_value(&record);
        }
        Command::HonorType { id } => {
            let honor_type = registry.fetch_honor_type(id)?;
            print_value(&honor_type);
        }
        Command::Stats { observer, category } => {
            let count = registry.fetch_category_stats(&observer, &category)?;
            print_json(&json!({ "observer": observer, "category": category, "count": count }));
        }
        Command::Status => {
            let stats = registry.db_stats()?;
            print_value(&stats);
        }
    }

    Ok(())
}

fn print_value<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("error: {}", e),
    }
}

fn print_json(value: &serde_json::Value) {
    print_value(value)
}
