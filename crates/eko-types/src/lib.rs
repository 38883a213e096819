//! Shared type definitions for the Eko agricultural simulation.
//!
//! This crate is the single source of truth for the entities every other
//! crate in the workspace passes around.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Plant states, seasons, input types, soil parameters
//! - [`params`] -- The bounded soil parameter set
//! - [`structs`] -- Terrains, quadrants, plantings and history records

pub mod enums;
pub mod ids;
pub mod params;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DroughtTolerance, InputType, PlantState, SeasonKind, SoilParameter};
pub use ids::{
    ClimateConditionId, InputId, PlantingId, PlayerId, QuadrantId, SeasonId, StateLogId,
    TerrainId,
};
pub use params::{ParameterChange, SoilParameters};
pub use structs::{
    ClimateCondition, InputRecord, PlantStateLog, Planting, Quadrant, SeasonFactors,
    SeasonRecord, Species, TerrainParameters, WateringEvent,
};
