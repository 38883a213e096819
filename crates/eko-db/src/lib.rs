//! Persistence for the Eko simulation.
//!
//! The simulation services never talk to a database directly; they are
//! generic over the traits in [`store`]. Two implementations ship here:
//!
//! ```text
//! eko-core services
//!     |
//!     +-- ParameterStore / PlantingStore / HistoryStore / WateringHistory / InputStore
//!         |-- MemoryStore  (tests, single-process runs)
//!         +-- PgStore      (PostgreSQL, row locks per read-modify-write)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The store traits and the combined [`SimulationStore`] bound
//! - [`memory`] -- Mutex-guarded in-memory store
//! - [`postgres`] -- `PostgreSQL` pool, configuration and store
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use memory::MemoryStore;
pub use postgres::{PgStore, PostgresConfig};
pub use store::{
    HistoryStore, InputScope, InputStore, ParameterStore, PlantingStore, SimulationStore,
    WateringHistory,
};
