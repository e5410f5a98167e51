//! CLI interface for Freight.
//!
//! Each subcommand is non-interactive: arguments in, plain text out.
//! Tracking ids accept the full id or an unambiguous, case-insensitive prefix.

mod booking;
mod format;
mod handling;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jiff::Timestamp;

use crate::config::Config;
use crate::inmem::{InMemoryLocationRepository, InMemoryVoyageRepository};
use crate::model::{Leg, TrackingId};
use crate::repository::CargoRepository;
use crate::service::{
    BookingService, CargoLocks, HandlingEventFactory, HandlingService, InspectionService,
    LoggingEventHandler, TrackingService,
};
use crate::storage::Storage;

use format::parse_leg;

/// Freight: book, route and track cargo.
#[derive(Debug, Parser)]
#[command(name = "freight", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Database path. Overrides `FREIGHT_DATABASE` and the config file.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` or `log-filter` say otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: Hongkong to Stockholm
  1. freight book --origin CNHKG --destination SESTO --deadline 2009-03-18T00:00:00Z
     → prints a tracking id (e.g. 3F2A9C1B)
  2. freight route --cargo 3f2 \
       --leg V100,CNHKG,USNYC,2009-03-03T00:00:00Z,2009-03-09T00:00:00Z \
       --leg V200,USNYC,SESTO,2009-03-10T00:00:00Z,2009-03-16T00:00:00Z
  3. freight handle --cargo 3f2 --event receive --location CNHKG --completed 2009-03-01T00:00:00Z
  4. freight handle --cargo 3f2 --event load --voyage V100 --location CNHKG
  5. freight track 3f2";

#[derive(Debug, Subcommand)]
enum Command {
    /// Book a new cargo. Prints the tracking id.
    Book {
        /// UN/LOCODE of the origin (e.g. `CNHKG`).
        #[arg(long)]
        origin: String,

        /// UN/LOCODE of the destination.
        #[arg(long)]
        destination: String,

        /// Latest acceptable arrival (RFC 3339).
        #[arg(long)]
        deadline: Timestamp,
    },

    /// List booked cargos.
    List,

    /// List known locations.
    Locations,

    /// Assign an itinerary to a cargo.
    ///
    /// Legs are given in travel order. The itinerary is accepted even if it
    /// does not match the cargo's route specification.
    Route {
        /// Tracking id or prefix.
        #[arg(long)]
        cargo: String,

        /// `<voyage>,<from>,<to>,<load-time>,<unload-time>`. Repeat per leg.
        #[arg(long = "leg", required = true, value_parser = parse_leg)]
        legs: Vec<Leg>,
    },

    /// Change a cargo's destination.
    ///
    /// The current itinerary is kept; assign a new one with `route`.
    Reroute {
        /// Tracking id or prefix.
        #[arg(long)]
        cargo: String,

        /// UN/LOCODE of the new destination.
        #[arg(long)]
        destination: String,
    },

    /// Register a handling event.
    Handle {
        /// Tracking id or prefix.
        #[arg(long)]
        cargo: String,

        /// One of receive, load, unload, customs, claim.
        #[arg(long)]
        event: String,

        /// UN/LOCODE where it happened.
        #[arg(long)]
        location: String,

        /// Voyage number. Required for load and unload.
        #[arg(long)]
        voyage: Option<String>,

        /// When it happened (RFC 3339). Defaults to now.
        #[arg(long)]
        completed: Option<Timestamp>,
    },

    /// Show where a cargo is and what should happen next.
    Track {
        /// Tracking id or prefix.
        cargo: String,

        /// Print the tracking read model as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Services wired over the `SQLite` store and the built-in reference data.
struct App {
    cargos: Arc<Storage>,
    booking: BookingService,
    handling: HandlingService,
    tracking: TrackingService,
}

impl App {
    fn new(storage: Storage) -> Self {
        let storage = Arc::new(storage);
        let locations = Arc::new(InMemoryLocationRepository::with_samples());
        let voyages = Arc::new(InMemoryVoyageRepository::with_samples());
        let locks = Arc::new(CargoLocks::new());

        let inspection = Arc::new(InspectionService::new(
            storage.clone(),
            storage.clone(),
            Arc::new(LoggingEventHandler),
            locks.clone(),
        ));
        let factory = HandlingEventFactory::new(storage.clone(), voyages, locations.clone());

        Self {
            booking: BookingService::new(storage.clone(), locations, locks),
            handling: HandlingService::new(factory, inspection),
            tracking: TrackingService::new(storage.clone(), storage.clone()),
            cargos: storage,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(cli: Cli, config: &Config) -> Result<(), String> {
    let path = config.resolve_database(cli.database.as_deref())?;
    let storage = Storage::open(&path)
        .map_err(|e| format!("failed to open database {}: {e}", path.display()))?;
    let app = App::new(storage);

    match cli.command {
        Command::Book {
            origin,
            destination,
            deadline,
        } => booking::cmd_book(&app, &origin, &destination, deadline),
        Command::List => booking::cmd_list(&app),
        Command::Locations => booking::cmd_locations(&app),
        Command::Route { cargo, legs } => {
            let id = resolve_cargo(app.cargos.as_ref(), &cargo)?;
            booking::cmd_route(&app, &id, legs)
        }
        Command::Reroute { cargo, destination } => {
            let id = resolve_cargo(app.cargos.as_ref(), &cargo)?;
            booking::cmd_reroute(&app, &id, &destination)
        }
        Command::Handle {
            cargo,
            event,
            location,
            voyage,
            completed,
        } => {
            let id = resolve_cargo(app.cargos.as_ref(), &cargo)?;
            handling::cmd_handle(
                &app,
                &id,
                &event,
                &location,
                voyage.as_deref(),
                completed.unwrap_or_else(Timestamp::now),
            )
        }
        Command::Track { cargo, json } => {
            let id = resolve_cargo(app.cargos.as_ref(), &cargo)?;
            handling::cmd_track(&app, &id, json)
        }
    }
}

/// Resolve a tracking id from a full id or an unambiguous prefix.
/// Matching ignores case.
fn resolve_cargo(cargos: &dyn CargoRepository, reference: &str) -> Result<TrackingId, String> {
    let reference = reference.trim().to_ascii_uppercase();
    if reference.is_empty() {
        return Err("tracking id is empty".to_string());
    }

    let ids = cargos
        .tracking_ids()
        .map_err(|e| format!("failed to list cargos: {e}"))?;

    if let Some(exact) = ids.iter().find(|id| id.as_str() == reference) {
        return Ok(exact.clone());
    }

    let matches: Vec<&TrackingId> = ids
        .iter()
        .filter(|id| id.as_str().to_ascii_uppercase().starts_with(&reference))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no cargo matching '{reference}'")),
        [id] => Ok((*id).clone()),
        _ => {
            let ids: Vec<&str> = matches.iter().map(|id| id.as_str()).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} cargos: {}",
                matches.len(),
                ids.join(", ")
            ))
        }
    }
}
