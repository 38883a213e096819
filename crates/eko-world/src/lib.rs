//! Soil, climate, season and plant-growth rules for the Eko simulation.
//!
//! Everything in this crate is a pure calculation over the types in
//! `eko-types`: no I/O, no clocks, no storage. The async services in
//! `eko-core` load rows, call into these functions and write results back.
//!
//! # Modules
//!
//! - [`effects`] -- Linear input effects (water, fertilizer, compost, lime, mulch).
//! - [`grid`] -- Quadrant labels, the standard `A1..C5` grid and 4-connected adjacency.
//! - [`propagation`] -- Fractional spread of deltas to neighbouring quadrants.
//! - [`deterioration`] -- Daily season-adjusted decay with per-parameter floors.
//! - [`climate`] -- Climate event catalogue, weighted rolls and application.
//! - [`seasons`] -- Four-season cycle, factors and rollover decisions.
//! - [`lifecycle`] -- Daily plant state machine.
//! - [`health`] -- Soil health index, categories and alerts.
//! - [`error`] -- Error types for the calculations above.

pub mod climate;
pub mod deterioration;
pub mod effects;
pub mod error;
pub mod grid;
pub mod health;
pub mod lifecycle;
pub mod propagation;
pub mod seasons;

// Re-export primary types at crate root.
pub use climate::{CLIMATE_EVENTS, ClimateEvent, ClimateRoller, apply_event, event_by_name};
pub use deterioration::{DEFAULT_DECAY_RULES, DecayRule, decay, season_adjusted};
pub use effects::{RequestedEffect, apply_effects, calculate_effects, resets_drought_counter};
pub use error::WorldError;
pub use grid::{GridLabel, resolve_neighbours, standard_grid};
pub use health::{HealthCategory, SoilHealthReport, analyze, health_index};
pub use lifecycle::{GrowthThresholds, advance_day};
pub use propagation::{DEFAULT_PROPAGATION_FACTOR, ParameterDelta, apply_to_neighbour};
pub use seasons::{SEASON_DURATION_DAYS, SeasonDecision, current_factors, decide, new_record};
