//! Data-access traits consumed by the simulation services.
//!
//! Every mutation of a terrain or quadrant row goes through a closure that
//! the store runs while holding that row exclusively (a mutex in memory,
//! `SELECT ... FOR UPDATE` in `PostgreSQL`). The store clamps every soil
//! parameter after the closure returns, so no caller can persist an
//! out-of-range value.
//!
//! Recording an input touches several rows at once; [`InputStore`] locks
//! all of them and commits the input together with its effects.

use std::future::Future;

use chrono::{DateTime, Utc};

use eko_types::{
    ClimateCondition, InputRecord, PlantStateLog, Planting, PlantingId, PlayerId, Quadrant,
    QuadrantId, SeasonRecord, SoilParameters, TerrainId, TerrainParameters, WateringEvent,
};

use crate::error::DbError;

/// Terrain and quadrant soil rows.
pub trait ParameterStore: Send + Sync {
    /// Insert a terrain's parameter row together with its quadrants.
    ///
    /// Fails with [`DbError::Duplicate`] if the terrain exists or two
    /// quadrants share a label.
    fn insert_terrain(
        &self,
        terrain: TerrainParameters,
        quadrants: Vec<Quadrant>,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Fetch a terrain's parameter row.
    fn terrain_parameters(
        &self,
        terrain_id: TerrainId,
    ) -> impl Future<Output = Result<TerrainParameters, DbError>> + Send;

    /// Every terrain with a parameter row.
    fn terrain_ids(&self) -> impl Future<Output = Result<Vec<TerrainId>, DbError>> + Send;

    /// Read-modify-write one terrain row. The closure's return value is
    /// passed through; the row is clamped and stamped with `now`.
    fn update_terrain_parameters<F, T>(
        &self,
        terrain_id: TerrainId,
        now: DateTime<Utc>,
        f: F,
    ) -> impl Future<Output = Result<T, DbError>> + Send
    where
        F: FnOnce(&mut SoilParameters) -> T + Send,
        T: Send;

    /// Fetch one quadrant.
    fn quadrant(
        &self,
        quadrant_id: QuadrantId,
    ) -> impl Future<Output = Result<Quadrant, DbError>> + Send;

    /// All quadrants of a terrain, ordered by label.
    fn quadrants_for_terrain(
        &self,
        terrain_id: TerrainId,
    ) -> impl Future<Output = Result<Vec<Quadrant>, DbError>> + Send;

    /// Every quadrant id.
    fn quadrant_ids(&self) -> impl Future<Output = Result<Vec<QuadrantId>, DbError>> + Send;

    /// Read-modify-write one quadrant row, like
    /// [`update_terrain_parameters`](Self::update_terrain_parameters).
    fn update_quadrant<F, T>(
        &self,
        quadrant_id: QuadrantId,
        now: DateTime<Utc>,
        f: F,
    ) -> impl Future<Output = Result<T, DbError>> + Send
    where
        F: FnOnce(&mut SoilParameters) -> T + Send,
        T: Send;
}

/// Plantings and their state history.
pub trait PlantingStore: Send + Sync {
    /// Insert a new planting. Fails with [`DbError::SlotOccupied`] when the
    /// (quadrant, slot) pair is taken; the check and the insert are atomic.
    fn insert_planting(&self, planting: Planting)
    -> impl Future<Output = Result<(), DbError>> + Send;

    /// Fetch one planting.
    fn planting(
        &self,
        planting_id: PlantingId,
    ) -> impl Future<Output = Result<Planting, DbError>> + Send;

    /// Every planting not in a terminal state.
    fn active_plantings(&self) -> impl Future<Output = Result<Vec<Planting>, DbError>> + Send;

    /// Read-modify-write one planting. The log entries returned by the
    /// closure are appended in the same transaction and returned.
    fn update_planting<F>(
        &self,
        planting_id: PlantingId,
        f: F,
    ) -> impl Future<Output = Result<Vec<PlantStateLog>, DbError>> + Send
    where
        F: FnOnce(&mut Planting) -> Vec<PlantStateLog> + Send;

    /// Remove a planting, freeing its slot. Its state log is kept.
    fn delete_planting(
        &self,
        planting_id: PlantingId,
    ) -> impl Future<Output = Result<Planting, DbError>> + Send;

    /// State log of one planting, oldest first.
    fn state_logs(
        &self,
        planting_id: PlantingId,
    ) -> impl Future<Output = Result<Vec<PlantStateLog>, DbError>> + Send;
}

/// Append-only history: seasons, climate conditions and inputs.
pub trait HistoryStore: Send + Sync {
    /// Append a season record.
    fn append_season(&self, season: SeasonRecord)
    -> impl Future<Output = Result<(), DbError>> + Send;

    /// The latest season by start date, if any.
    fn current_season(&self)
    -> impl Future<Output = Result<Option<SeasonRecord>, DbError>> + Send;

    /// All seasons, oldest first.
    fn seasons(&self) -> impl Future<Output = Result<Vec<SeasonRecord>, DbError>> + Send;

    /// Append a climate condition.
    fn append_climate_condition(
        &self,
        condition: ClimateCondition,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// The newest climate condition, ties on timestamp broken by id.
    fn latest_climate_condition(
        &self,
    ) -> impl Future<Output = Result<Option<ClimateCondition>, DbError>> + Send;

    /// Up to `limit` climate conditions, newest first.
    fn climate_conditions(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ClimateCondition>, DbError>> + Send;

    /// Inputs applied to one planting, oldest first.
    fn inputs_for_planting(
        &self,
        planting_id: PlantingId,
    ) -> impl Future<Output = Result<Vec<InputRecord>, DbError>> + Send;
}

/// Watering actions, consulted by the daily lifecycle tick.
pub trait WateringHistory: Send + Sync {
    /// Record that `player` watered `terrain`.
    fn record_watering(
        &self,
        event: WateringEvent,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Whether `player` watered `terrain` at or after `since`.
    fn watered_since(
        &self,
        player_id: PlayerId,
        terrain_id: TerrainId,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;
}

/// The rows one input touches, handed to the closure of
/// [`InputStore::commit_input`] while they are locked.
#[derive(Debug, Clone, PartialEq)]
pub struct InputScope {
    /// The target planting. Only its drought counter is written back.
    pub planting: Planting,
    /// Soil of the planting's terrain row.
    pub terrain: SoilParameters,
    /// Every quadrant of that terrain, ordered by label.
    pub quadrants: Vec<Quadrant>,
    /// Watering to record with the input, if any.
    pub watering: Option<WateringEvent>,
}

/// Inputs and their effects, written as one unit.
pub trait InputStore: Send + Sync {
    /// Lock the input's planting, its terrain row and every quadrant of that
    /// terrain, run `f` over them, then write the input record, the changed
    /// rows and the watering in one transaction.
    ///
    /// If `f` or any write fails, nothing is stored. Soil rows are clamped
    /// and stamped with `now` before writing.
    fn commit_input<F, T>(
        &self,
        input: InputRecord,
        now: DateTime<Utc>,
        f: F,
    ) -> impl Future<Output = Result<T, DbError>> + Send
    where
        F: FnOnce(&mut InputScope) -> Result<T, DbError> + Send,
        T: Send;
}

/// Everything the simulation needs from storage, in one bound.
pub trait SimulationStore:
    ParameterStore + PlantingStore + HistoryStore + WateringHistory + InputStore + Clone + 'static
{
}

impl<S> SimulationStore for S where
    S: ParameterStore
        + PlantingStore
        + HistoryStore
        + WateringHistory
        + InputStore
        + Clone
        + 'static
{
}
