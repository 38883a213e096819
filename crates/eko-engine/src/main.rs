//! Simulation engine binary for Eko.
//!
//! Wires configuration, the species catalogue and the store into the
//! scheduler, then runs until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `EKO_CONFIG` or `eko-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the species catalogue (reloaded when the file changes)
//! 4. Connect the store (`PostgreSQL` with migrations, or in-memory)
//! 5. Seed a starting terrain into an empty store
//! 6. Run an initial season check so a season always exists
//! 7. Start the scheduler and wait for Ctrl-C
//! 8. Stop the scheduler, letting in-flight jobs finish

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use eko_core::config::LoggingConfig;
use eko_core::{
    FileSpeciesSource, Job, Scheduler, Simulation, SimulationConfig, SpeciesSource, StoreBackend,
};
use eko_db::{MemoryStore, PgStore, PostgresConfig, SimulationStore};
use eko_types::PlayerId;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "eko-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, the store connection or the signal
/// handler fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let config = load_config()?;
    init_tracing(&config.logging);
    info!(
        store = ?config.infrastructure.store,
        time_scale_factor = config.world.time_scale_factor,
        propagation_factor = config.world.propagation_factor,
        season_duration_days = config.world.season_duration_days,
        "eko-engine starting"
    );

    let species: Arc<dyn SpeciesSource> = Arc::new(FileSpeciesSource::new(
        config.species.path.clone(),
        config.world.time_scale_factor,
    ));
    match species.snapshot() {
        Ok(catalog) => info!(
            species = catalog.len(),
            path = %config.species.path.display(),
            "Species catalogue loaded"
        ),
        Err(err) => tracing::warn!(
            error = %err,
            "Species catalogue unavailable, lifecycle ticks fail until it loads"
        ),
    }

    match config.infrastructure.store {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            run(MemoryStore::new(), species, config).await
        }
        StoreBackend::Postgres => {
            let pg_config = PostgresConfig::new(&config.infrastructure.postgres_url)
                .with_max_connections(config.infrastructure.max_connections);
            let store = PgStore::connect(&pg_config).await?;
            store.run_migrations().await?;
            info!(max_connections = pg_config.max_connections, "PostgreSQL store ready");
            let result = run(store.clone(), species, config).await;
            store.close().await;
            result
        }
    }
}

/// Run the scheduler over `store` until Ctrl-C. An empty store gets one
/// terrain so the jobs have rows to work on.
async fn run<S: SimulationStore>(
    store: S,
    species: Arc<dyn SpeciesSource>,
    config: SimulationConfig,
) -> Result<(), EngineError> {
    let simulation = Simulation::new(store, Arc::clone(&species), config);
    if simulation.store().terrain_ids().await?.is_empty() {
        let (terrain, quadrants) = simulation.create_terrain(PlayerId::new()).await?;
        info!(
            terrain_id = %terrain.terrain_id,
            quadrants = quadrants.len(),
            "Seeded starting terrain"
        );
    }

    let scheduler = Scheduler::new(
        simulation.store().clone(),
        species,
        simulation.scheduler_settings(),
    );
    scheduler.run_now(Job::SeasonCheck).await?;
    scheduler.start();

    let signal = tokio::signal::ctrl_c().await;
    info!("Shutdown requested");
    scheduler.shutdown().await;
    signal.map_err(EngineError::Signal)?;

    info!("eko-engine shutdown complete");
    Ok(())
}

/// Load the configuration from `EKO_CONFIG`, falling back to
/// `eko-config.yaml`, and defaults when neither file exists.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let path = std::env::var_os("EKO_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = if path.exists() {
        SimulationConfig::from_file(&path)?
    } else {
        SimulationConfig::parse("")?
    };
    config.validate()?;
    Ok(config)
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
