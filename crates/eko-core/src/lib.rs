//! Simulation services for Eko: terrain and planting management, input
//! application, the periodic tick jobs and the scheduler that drives them.
//!
//! Every service is generic over the store traits in `eko-db`, so the same
//! code runs against [`eko_db::MemoryStore`] in tests and
//! [`eko_db::PgStore`] in production.
//!
//! ```text
//! Scheduler ──► tick::{lifecycle, deterioration, climate, season}
//!                  │
//! actions ─────────┼──► eko-world rules ──► store traits
//! inputs ──────────┤
//! terrain ─────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`species`] -- Species catalogue and hot-reloading sources
//! - [`terrain`] -- Terrain creation, planting, harvest, removal, health queries
//! - [`inputs`] -- Applying water, fertilizer, compost, lime and mulch
//! - [`propagate`] -- Spreading quadrant deltas to neighbours
//! - [`tick`] -- Lifecycle, deterioration, climate and season jobs
//! - [`actions`] -- Named player actions behind a handler registry
//! - [`cadence`] -- Wall-clock firing times
//! - [`scheduler`] -- Background job loops with graceful shutdown
//! - [`service`] -- Facade binding the services to one store and configuration
//! - [`error`] -- Service error type

pub mod actions;
pub mod cadence;
pub mod config;
pub mod error;
pub mod inputs;
pub mod propagate;
pub mod scheduler;
pub mod service;
pub mod species;
pub mod terrain;
pub mod tick;

#[cfg(test)]
mod testing;

pub use actions::{
    ActionContext, ActionHandler, ActionOutcome, ActionRegistry, ActionReply,
    register_default_actions,
};
pub use cadence::Cadence;
pub use config::{ConfigError, SimulationConfig, StoreBackend};
pub use error::ServiceError;
pub use inputs::{EffectsReport, NewInput, apply_input, record_input};
pub use scheduler::{Job, Scheduler, SchedulerSettings};
pub use service::Simulation;
pub use species::{FileSpeciesSource, SpeciesCatalog, SpeciesSource, StaticSpeciesSource};
pub use terrain::{
    NewPlanting, create_planting, create_terrain, harvest_planting, quadrant_health,
    remove_planting, terrain_health,
};
