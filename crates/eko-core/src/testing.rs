//! A store wrapper that fails or panics on chosen rows, for exercising how
//! the services and jobs behave when storage misbehaves.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use eko_db::{
    DbError, HistoryStore, InputScope, InputStore, MemoryStore, ParameterStore, PlantingStore,
    WateringHistory,
};
use eko_types::{
    ClimateCondition, InputRecord, PlantStateLog, Planting, PlantingId, PlayerId, Quadrant,
    QuadrantId, SeasonRecord, SoilParameters, TerrainId, TerrainParameters, WateringEvent,
};

#[derive(Debug, Default)]
struct Faults {
    terrains: Mutex<HashSet<TerrainId>>,
    quadrants: Mutex<HashSet<QuadrantId>>,
    plantings: Mutex<HashSet<PlantingId>>,
    row_writes: AtomicBool,
    input_commits: AtomicBool,
    season_reads: AtomicBool,
    season_panics: AtomicBool,
    season_read_count: AtomicUsize,
}

/// [`MemoryStore`] with switchable faults. Clones share the faults.
#[derive(Debug, Clone, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    faults: Arc<Faults>,
}

fn outage() -> DbError {
    DbError::Postgres(sqlx::Error::PoolTimedOut)
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_terrain(&self, id: TerrainId) {
        self.faults.terrains.lock().unwrap().insert(id);
    }

    pub fn fail_quadrant(&self, id: QuadrantId) {
        self.faults.quadrants.lock().unwrap().insert(id);
    }

    pub fn fail_planting(&self, id: PlantingId) {
        self.faults.plantings.lock().unwrap().insert(id);
    }

    /// Fail every single-row update of terrains, quadrants and plantings.
    pub fn fail_row_writes(&self, on: bool) {
        self.faults.row_writes.store(on, Ordering::SeqCst);
    }

    /// Let the input closure run, then fail the commit.
    pub fn fail_input_commits(&self, on: bool) {
        self.faults.input_commits.store(on, Ordering::SeqCst);
    }

    pub fn fail_season_reads(&self, on: bool) {
        self.faults.season_reads.store(on, Ordering::SeqCst);
    }

    pub fn panic_on_season_reads(&self, on: bool) {
        self.faults.season_panics.store(on, Ordering::SeqCst);
    }

    /// How many times the current season has been asked for.
    pub fn season_reads(&self) -> usize {
        self.faults.season_read_count.load(Ordering::SeqCst)
    }

    pub fn clear_faults(&self) {
        self.faults.terrains.lock().unwrap().clear();
        self.faults.quadrants.lock().unwrap().clear();
        self.faults.plantings.lock().unwrap().clear();
        for flag in [
            &self.faults.row_writes,
            &self.faults.input_commits,
            &self.faults.season_reads,
            &self.faults.season_panics,
        ] {
            flag.store(false, Ordering::SeqCst);
        }
    }

    fn check_terrain(&self, id: TerrainId) -> Result<(), DbError> {
        let failing = self.faults.row_writes.load(Ordering::SeqCst)
            || self.faults.terrains.lock().unwrap().contains(&id);
        if failing { Err(outage()) } else { Ok(()) }
    }

    fn check_quadrant(&self, id: QuadrantId) -> Result<(), DbError> {
        let failing = self.faults.row_writes.load(Ordering::SeqCst)
            || self.faults.quadrants.lock().unwrap().contains(&id);
        if failing { Err(outage()) } else { Ok(()) }
    }

    fn check_planting(&self, id: PlantingId) -> Result<(), DbError> {
        let failing = self.faults.row_writes.load(Ordering::SeqCst)
            || self.faults.plantings.lock().unwrap().contains(&id);
        if failing { Err(outage()) } else { Ok(()) }
    }

    fn check_season_read(&self) -> Result<(), DbError> {
        self.faults.season_read_count.fetch_add(1, Ordering::SeqCst);
        if self.faults.season_panics.load(Ordering::SeqCst) {
            panic!("season table unreadable");
        }
        if self.faults.season_reads.load(Ordering::SeqCst) {
            return Err(outage());
        }
        Ok(())
    }
}

impl ParameterStore for FaultyStore {
    async fn insert_terrain(
        &self,
        terrain: TerrainParameters,
        quadrants: Vec<Quadrant>,
    ) -> Result<(), DbError> {
        self.inner.insert_terrain(terrain, quadrants).await
    }

    async fn terrain_parameters(&self, terrain_id: TerrainId) -> Result<TerrainParameters, DbError> {
        self.inner.terrain_parameters(terrain_id).await
    }

    async fn terrain_ids(&self) -> Result<Vec<TerrainId>, DbError> {
        self.inner.terrain_ids().await
    }

    async fn update_terrain_parameters<F, T>(
        &self,
        terrain_id: TerrainId,
        now: DateTime<Utc>,
        f: F,
    ) -> Result<T, DbError>
    where
        F: FnOnce(&mut SoilParameters) -> T + Send,
        T: Send,
    {
        self.check_terrain(terrain_id)?;
        self.inner.update_terrain_parameters(terrain_id, now, f).await
    }

    async fn quadrant(&self, quadrant_id: QuadrantId) -> Result<Quadrant, DbError> {
        self.inner.quadrant(quadrant_id).await
    }

    async fn quadrants_for_terrain(&self, terrain_id: TerrainId) -> Result<Vec<Quadrant>, DbError> {
        self.inner.quadrants_for_terrain(terrain_id).await
    }

    async fn quadrant_ids(&self) -> Result<Vec<QuadrantId>, DbError> {
        self.inner.quadrant_ids().await
    }

    async fn update_quadrant<F, T>(
        &self,
        quadrant_id: QuadrantId,
        now: DateTime<Utc>,
        f: F,
    ) -> Result<T, DbError>
    where
        F: FnOnce(&mut SoilParameters) -> T + Send,
        T: Send,
    {
        self.check_quadrant(quadrant_id)?;
        self.inner.update_quadrant(quadrant_id, now, f).await
    }
}

impl PlantingStore for FaultyStore {
    async fn insert_planting(&self, planting: Planting) -> Result<(), DbError> {
        self.inner.insert_planting(planting).await
    }

    async fn planting(&self, planting_id: PlantingId) -> Result<Planting, DbError> {
        self.inner.planting(planting_id).await
    }

    async fn active_plantings(&self) -> Result<Vec<Planting>, DbError> {
        self.inner.active_plantings().await
    }

    async fn update_planting<F>(
        &self,
        planting_id: PlantingId,
        f: F,
    ) -> Result<Vec<PlantStateLog>, DbError>
    where
        F: FnOnce(&mut Planting) -> Vec<PlantStateLog> + Send,
    {
        self.check_planting(planting_id)?;
        self.inner.update_planting(planting_id, f).await
    }

    async fn delete_planting(&self, planting_id: PlantingId) -> Result<Planting, DbError> {
        self.inner.delete_planting(planting_id).await
    }

    async fn state_logs(&self, planting_id: PlantingId) -> Result<Vec<PlantStateLog>, DbError> {
        self.inner.state_logs(planting_id).await
    }
}

impl HistoryStore for FaultyStore {
    async fn append_season(&self, season: SeasonRecord) -> Result<(), DbError> {
        self.inner.append_season(season).await
    }

    async fn current_season(&self) -> Result<Option<SeasonRecord>, DbError> {
        self.check_season_read()?;
        self.inner.current_season().await
    }

    async fn seasons(&self) -> Result<Vec<SeasonRecord>, DbError> {
        self.inner.seasons().await
    }

    async fn append_climate_condition(&self, condition: ClimateCondition) -> Result<(), DbError> {
        self.inner.append_climate_condition(condition).await
    }

    async fn latest_climate_condition(&self) -> Result<Option<ClimateCondition>, DbError> {
        self.inner.latest_climate_condition().await
    }

    async fn climate_conditions(&self, limit: usize) -> Result<Vec<ClimateCondition>, DbError> {
        self.inner.climate_conditions(limit).await
    }

    async fn inputs_for_planting(&self, planting_id: PlantingId) -> Result<Vec<InputRecord>, DbError> {
        self.inner.inputs_for_planting(planting_id).await
    }
}

impl WateringHistory for FaultyStore {
    async fn record_watering(&self, event: WateringEvent) -> Result<(), DbError> {
        self.inner.record_watering(event).await
    }

    async fn watered_since(
        &self,
        player_id: PlayerId,
        terrain_id: TerrainId,
        since: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        self.inner.watered_since(player_id, terrain_id, since).await
    }
}

impl InputStore for FaultyStore {
    async fn commit_input<F, T>(
        &self,
        input: InputRecord,
        now: DateTime<Utc>,
        f: F,
    ) -> Result<T, DbError>
    where
        F: FnOnce(&mut InputScope) -> Result<T, DbError> + Send,
        T: Send,
    {
        let fail = self.faults.input_commits.load(Ordering::SeqCst);
        self.inner
            .commit_input(input, now, move |scope| {
                let out = f(scope)?;
                if fail { Err(outage()) } else { Ok(out) }
            })
            .await
    }
}
