//! Core entity structs for the Eko simulation.
//!
//! Terrains and quadrants carry [`SoilParameters`]; plantings occupy a
//! quadrant slot and move through [`PlantState`]. Everything else here is
//! append-only history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{DroughtTolerance, InputType, PlantState, SeasonKind};
use crate::ids::{
    ClimateConditionId, InputId, PlantingId, PlayerId, QuadrantId, SeasonId, StateLogId,
    TerrainId,
};
use crate::params::SoilParameters;

// ---------------------------------------------------------------------------
// Terrain and quadrants
// ---------------------------------------------------------------------------

/// Terrain-level soil state, owned 1:1 by a terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainParameters {
    /// The terrain these parameters belong to.
    pub terrain_id: TerrainId,
    /// The player who owns the terrain.
    pub owner_id: PlayerId,
    /// Current soil values.
    pub soil: SoilParameters,
    /// Last time any value changed.
    pub updated_at: DateTime<Utc>,
}

/// One grid cell of a terrain with its own soil state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quadrant {
    /// Unique quadrant identifier.
    pub id: QuadrantId,
    /// The terrain this quadrant belongs to.
    pub terrain_id: TerrainId,
    /// Grid label such as `"B3"`, unique within the terrain.
    pub label: String,
    /// Current soil values.
    pub soil: SoilParameters,
    /// Last time any value changed.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Species and plantings
// ---------------------------------------------------------------------------

/// Reference data for one plant species.
///
/// Day counts are unscaled; the lifecycle divides them by the world's
/// time-scale factor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    /// Catalogue key, e.g. `"alface"`.
    #[serde(default)]
    pub key: String,
    /// Display name.
    #[serde(alias = "nome_comum", default)]
    pub common_name: String,
    /// Days from seed to seedling.
    #[serde(alias = "germinacao_dias")]
    pub germination_days: u32,
    /// Days from planting to maturity.
    #[serde(alias = "maturidade_dias")]
    pub maturation_days: u32,
    /// Drought-tolerance tier.
    #[serde(alias = "tolerancia_seca")]
    pub drought_tolerance: DroughtTolerance,
}

/// A plant occupying one (quadrant, slot) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planting {
    /// Unique planting identifier.
    pub id: PlantingId,
    /// Species catalogue key.
    pub species_key: String,
    /// The player who planted it.
    pub player_id: PlayerId,
    /// The terrain the quadrant belongs to.
    pub terrain_id: TerrainId,
    /// The quadrant holding the planting.
    pub quadrant_id: QuadrantId,
    /// Slot within the quadrant.
    pub slot_index: u32,
    /// Current growth state.
    pub state: PlantState,
    /// Whole days elapsed since planting.
    pub days_since_planting: u32,
    /// Consecutive days without watering.
    pub days_sem_rega: u32,
    /// When the planting was created.
    pub planted_at: DateTime<Utc>,
}

/// Immutable record of one state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantStateLog {
    /// Unique log entry identifier.
    pub id: StateLogId,
    /// The planting that transitioned.
    pub planting_id: PlantingId,
    /// State before the transition.
    pub from_state: PlantState,
    /// State after the transition.
    pub to_state: PlantState,
    /// When the transition happened.
    pub at: DateTime<Utc>,
}

impl PlantStateLog {
    /// Build a log entry for `planting_id` moving `from -> to` at `at`.
    pub fn transition(
        planting_id: PlantingId,
        from_state: PlantState,
        to_state: PlantState,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: StateLogId::new(),
            planting_id,
            from_state,
            to_state,
            at,
        }
    }
}

// ---------------------------------------------------------------------------
// Climate and seasons
// ---------------------------------------------------------------------------

/// One applied climate event, recorded once per application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateCondition {
    /// Unique record identifier.
    pub id: ClimateConditionId,
    /// Event name, e.g. `"chuva_forte"`.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// When the event was applied.
    pub recorded_at: DateTime<Utc>,
}

/// Multiplicative modifiers a season imposes on the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonFactors {
    /// Moisture-loss multiplier.
    pub soil_moisture: f64,
    /// Organic-matter-loss multiplier.
    pub organic_matter: f64,
    /// Biodiversity-loss multiplier.
    pub biodiversity: f64,
    /// Fertility-loss multiplier.
    pub fertility: f64,
    /// Germination-period multiplier.
    pub germination: f64,
    /// Maturation-period multiplier.
    pub maturation: f64,
}

impl SeasonFactors {
    /// All factors at 1.0, used when no season has been recorded yet.
    pub const NEUTRAL: Self = Self {
        soil_moisture: 1.0,
        organic_matter: 1.0,
        biodiversity: 1.0,
        fertility: 1.0,
        germination: 1.0,
        maturation: 1.0,
    };
}

impl Default for SeasonFactors {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// One season in the append-only season log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    /// Unique record identifier.
    pub id: SeasonId,
    /// Which season this is.
    pub kind: SeasonKind,
    /// Human-readable description.
    pub description: String,
    /// When the season started.
    pub start_date: DateTime<Utc>,
    /// Modifiers in effect during the season.
    pub factors: SeasonFactors,
}

// ---------------------------------------------------------------------------
// Inputs and watering
// ---------------------------------------------------------------------------

/// An applied resource, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Unique input identifier.
    pub id: InputId,
    /// The planting the input was applied to.
    pub planting_id: PlantingId,
    /// What was applied.
    pub input_type: InputType,
    /// How much was applied.
    pub quantity: f64,
    /// When it was applied.
    pub applied_at: DateTime<Utc>,
}

/// A watering by a player on a terrain. The lifecycle looks these up to
/// decide whether a planting was watered in the last 24 hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WateringEvent {
    /// Who watered.
    pub player_id: PlayerId,
    /// Which terrain was watered.
    pub terrain_id: TerrainId,
    /// When.
    pub at: DateTime<Utc>,
}
