//! gaspump - load scraped gas stations into the database, or browse the
//! station API from the terminal.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gaspump_core::views;
use gaspump_core::{
    CacheConfig, DatabaseConfig, LoaderConfig, StationApiClient, StationCache, StationLoader,
    StationSource,
};

// ============================================================================
// Constants
// ============================================================================

/// Scraper output read when no file is given.
const DEFAULT_INPUT_FILE: &str = "./gas_stations.json";

/// Seconds between polls in `stations --watch`.
const WATCH_INTERVAL_SECS: u64 = 180;

#[derive(Parser, Debug)]
#[command(name = "gaspump")]
#[command(about = "Gas station loader and station API browser")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upsert a scraped station file into the database in one transaction
    Load {
        /// Scraped JSON file (an array of station objects)
        #[arg(value_name = "FILE", default_value = DEFAULT_INPUT_FILE)]
        file: PathBuf,

        /// Operator the stations belong to (overrides GASPUMP_OPERATOR_ID)
        #[arg(long)]
        operator_id: Option<i64>,
    },

    /// Fetch stations from the API and print them
    Stations {
        /// Only show stations in this municipality
        #[arg(short, long)]
        municipality: Option<String>,

        /// Report where the map would centre for this address
        #[arg(short, long)]
        address: Option<String>,

        /// Keep polling until interrupted
        #[arg(short, long)]
        watch: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: bool) {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Load { file, operator_id } => run_load(file, operator_id).await,
        Command::Stations {
            municipality,
            address,
            watch,
        } => run_stations(municipality, address, watch).await,
    }
}

// ===== Load =====

async fn run_load(file: PathBuf, operator_id: Option<i64>) -> Result<()> {
    // Validate the input before opening a connection.
    let stations = gaspump_core::loader::load_scraped_stations(&file)
        .with_context(|| format!("Failed to read scraped stations from {}", file.display()))?;

    let mut loader_config = LoaderConfig::from_env()?;
    if let Some(id) = operator_id {
        loader_config.operator_id = id;
    }
    let database = DatabaseConfig::from_env()?;

    info!(
        file = %file.display(),
        count = stations.len(),
        operator_id = loader_config.operator_id,
        "Loading scraped stations"
    );

    let loader = StationLoader::connect(&database, loader_config)
        .await
        .context("Failed to connect to the database")?;
    let result = loader.load(&stations).await;
    loader.close().await;

    let summary = result.context("Station batch rolled back")?;
    println!(
        "Loaded {} stations: {} inserted, {} updated, {} skipped, {} new municipalities",
        stations.len(),
        summary.inserted,
        summary.updated,
        summary.skipped,
        summary.municipalities_created
    );
    Ok(())
}

// ===== Stations =====

async fn run_stations(municipality: Option<String>, address: Option<String>, watch: bool) -> Result<()> {
    let config = CacheConfig::from_env();
    let client = StationApiClient::new(&config).context("Failed to create API client")?;
    info!(url = client.url(), "Using station API");
    let mut cache = StationCache::new(client, &config);

    if !watch {
        print_stations(&mut cache, municipality.as_deref(), address.as_deref()).await;
        return Ok(());
    }

    watch_stations(
        &mut cache,
        municipality.as_deref(),
        address.as_deref(),
        Duration::from_secs(WATCH_INTERVAL_SECS),
        tokio::signal::ctrl_c(),
    )
    .await;
    Ok(())
}

/// Poll and print every `period` until `shutdown` resolves.
///
/// The shutdown future lives for the whole watch and is raced against the
/// tick and the fetch together, so it also interrupts a fetch in progress.
async fn watch_stations<S: StationSource>(
    cache: &mut StationCache<S>,
    municipality: Option<&str>,
    address: Option<&str>,
    period: Duration,
    shutdown: impl Future,
) {
    tokio::pin!(shutdown);
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Interrupted, stopping watch");
                return;
            }
            _ = async {
                interval.tick().await;
                print_stations(&mut *cache, municipality, address).await;
            } => {}
        }
    }
}

async fn print_stations<S: StationSource>(
    cache: &mut StationCache<S>,
    municipality: Option<&str>,
    address: Option<&str>,
) {
    let outcome = cache.get_stations().await;
    if let Some(error) = outcome.error() {
        eprintln!("{}", error);
    }

    let records = outcome.records();
    let shown = views::filter_by_municipality(records, municipality);
    if shown.is_empty() {
        println!("No stations to show");
    } else {
        println!("{}", views::render_rows(&shown));
    }

    if let Some(snapshot) = cache.snapshot() {
        eprintln!(
            "{} of {} stations, updated {}",
            shown.len(),
            records.len(),
            snapshot.age_display()
        );
    }

    if let Some(address) = address {
        let focus = views::map_focus(records, Some(address));
        match focus.center {
            Some((lat, lon)) => println!("Map centre: {:.5}, {:.5} (zoom {})", lat, lon, focus.zoom),
            None => println!("Address not found; overview zoom {}", focus.zoom),
        }
    }
}
