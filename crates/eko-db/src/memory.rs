//! In-memory implementation of every store trait.
//!
//! All state lives behind one [`tokio::sync::Mutex`], held for the whole of
//! each read-modify-write, so concurrent jobs never interleave on a row.
//! Cloning a [`MemoryStore`] yields another handle to the same state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use eko_types::{
    ClimateCondition, InputRecord, PlantStateLog, Planting, PlantingId, PlayerId, Quadrant,
    QuadrantId, SeasonRecord, SoilParameters, TerrainId, TerrainParameters, WateringEvent,
};

use crate::error::DbError;
use crate::store::{
    HistoryStore, InputScope, InputStore, ParameterStore, PlantingStore, WateringHistory,
};

#[derive(Debug, Default)]
struct Inner {
    terrains: BTreeMap<TerrainId, TerrainParameters>,
    quadrants: BTreeMap<QuadrantId, Quadrant>,
    plantings: BTreeMap<PlantingId, Planting>,
    slots: HashMap<(QuadrantId, u32), PlantingId>,
    state_logs: Vec<PlantStateLog>,
    seasons: Vec<SeasonRecord>,
    climate: Vec<ClimateCondition>,
    inputs: Vec<InputRecord>,
    waterings: Vec<WateringEvent>,
}

/// Shared in-memory store, used by tests and single-process runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParameterStore for MemoryStore {
    async fn insert_terrain(
        &self,
        terrain: TerrainParameters,
        quadrants: Vec<Quadrant>,
    ) -> Result<(), DbError> {
        let mut inner = self.inner.lock().await;
        let terrain_id = terrain.terrain_id;
        if inner.terrains.contains_key(&terrain_id) {
            return Err(DbError::Duplicate {
                terrain_id,
                what: "a parameter row".to_owned(),
            });
        }
        let mut labels: Vec<&str> = quadrants.iter().map(|q| q.label.as_str()).collect();
        labels.sort_unstable();
        if let Some(pair) = labels.windows(2).find(|pair| pair.first() == pair.get(1)) {
            return Err(DbError::Duplicate {
                terrain_id,
                what: format!("quadrant {}", pair.first().copied().unwrap_or_default()),
            });
        }
        let mut terrain = terrain;
        terrain.soil.clamp_all();
        inner.terrains.insert(terrain_id, terrain);
        for mut quadrant in quadrants {
            quadrant.soil.clamp_all();
            inner.quadrants.insert(quadrant.id, quadrant);
        }
        Ok(())
    }

    async fn terrain_parameters(&self, terrain_id: TerrainId) -> Result<TerrainParameters, DbError> {
        self.inner
            .lock()
            .await
            .terrains
            .get(&terrain_id)
            .cloned()
            .ok_or_else(|| DbError::not_found("terrain parameters", terrain_id))
    }

    async fn terrain_ids(&self) -> Result<Vec<TerrainId>, DbError> {
        Ok(self.inner.lock().await.terrains.keys().copied().collect())
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
        let mut inner = self.inner.lock().await;
        let row = inner
            .terrains
            .get_mut(&terrain_id)
            .ok_or_else(|| DbError::not_found("terrain parameters", terrain_id))?;
        let out = f(&mut row.soil);
        row.soil.clamp_all();
        row.updated_at = now;
        Ok(out)
    }

    async fn quadrant(&self, quadrant_id: QuadrantId) -> Result<Quadrant, DbError> {
        self.inner
            .lock()
            .await
            .quadrants
            .get(&quadrant_id)
            .cloned()
            .ok_or_else(|| DbError::not_found("quadrant", quadrant_id))
    }

    async fn quadrants_for_terrain(&self, terrain_id: TerrainId) -> Result<Vec<Quadrant>, DbError> {
        let inner = self.inner.lock().await;
        let mut quadrants: Vec<Quadrant> = inner
            .quadrants
            .values()
            .filter(|q| q.terrain_id == terrain_id)
            .cloned()
            .collect();
        quadrants.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(quadrants)
    }

    async fn quadrant_ids(&self) -> Result<Vec<QuadrantId>, DbError> {
        Ok(self.inner.lock().await.quadrants.keys().copied().collect())
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
        let mut inner = self.inner.lock().await;
        let row = inner
            .quadrants
            .get_mut(&quadrant_id)
            .ok_or_else(|| DbError::not_found("quadrant", quadrant_id))?;
        let out = f(&mut row.soil);
        row.soil.clamp_all();
        row.updated_at = now;
        Ok(out)
    }
}

impl PlantingStore for MemoryStore {
    async fn insert_planting(&self, planting: Planting) -> Result<(), DbError> {
        let mut inner = self.inner.lock().await;
        let slot = (planting.quadrant_id, planting.slot_index);
        if inner.slots.contains_key(&slot) {
            return Err(DbError::SlotOccupied {
                quadrant_id: planting.quadrant_id,
                slot_index: planting.slot_index,
            });
        }
        if !inner.quadrants.contains_key(&planting.quadrant_id) {
            return Err(DbError::not_found("quadrant", planting.quadrant_id));
        }
        inner.slots.insert(slot, planting.id);
        inner.plantings.insert(planting.id, planting);
        Ok(())
    }

    async fn planting(&self, planting_id: PlantingId) -> Result<Planting, DbError> {
        self.inner
            .lock()
            .await
            .plantings
            .get(&planting_id)
            .cloned()
            .ok_or_else(|| DbError::not_found("planting", planting_id))
    }

    async fn active_plantings(&self) -> Result<Vec<Planting>, DbError> {
        Ok(self
            .inner
            .lock()
            .await
            .plantings
            .values()
            .filter(|p| !p.state.is_terminal())
            .cloned()
            .collect())
    }

    async fn update_planting<F>(
        &self,
        planting_id: PlantingId,
        f: F,
    ) -> Result<Vec<PlantStateLog>, DbError>
    where
        F: FnOnce(&mut Planting) -> Vec<PlantStateLog> + Send,
    {
        let mut inner = self.inner.lock().await;
        let planting = inner
            .plantings
            .get_mut(&planting_id)
            .ok_or_else(|| DbError::not_found("planting", planting_id))?;
        let logs = f(planting);
        inner.state_logs.extend(logs.iter().cloned());
        Ok(logs)
    }

    async fn delete_planting(&self, planting_id: PlantingId) -> Result<Planting, DbError> {
        let mut inner = self.inner.lock().await;
        let planting = inner
            .plantings
            .remove(&planting_id)
            .ok_or_else(|| DbError::not_found("planting", planting_id))?;
        inner
            .slots
            .remove(&(planting.quadrant_id, planting.slot_index));
        Ok(planting)
    }

    async fn state_logs(&self, planting_id: PlantingId) -> Result<Vec<PlantStateLog>, DbError> {
        Ok(self
            .inner
            .lock()
            .await
            .state_logs
            .iter()
            .filter(|log| log.planting_id == planting_id)
            .cloned()
            .collect())
    }
}

impl HistoryStore for MemoryStore {
    async fn append_season(&self, season: SeasonRecord) -> Result<(), DbError> {
        self.inner.lock().await.seasons.push(season);
        Ok(())
    }

    async fn current_season(&self) -> Result<Option<SeasonRecord>, DbError> {
        Ok(self
            .inner
            .lock()
            .await
            .seasons
            .iter()
            .max_by_key(|s| (s.start_date, s.id))
            .cloned())
    }

    async fn seasons(&self) -> Result<Vec<SeasonRecord>, DbError> {
        let mut seasons = self.inner.lock().await.seasons.clone();
        seasons.sort_by_key(|s| (s.start_date, s.id));
        Ok(seasons)
    }

    async fn append_climate_condition(&self, condition: ClimateCondition) -> Result<(), DbError> {
        self.inner.lock().await.climate.push(condition);
        Ok(())
    }

    async fn latest_climate_condition(&self) -> Result<Option<ClimateCondition>, DbError> {
        Ok(self
            .inner
            .lock()
            .await
            .climate
            .iter()
            .max_by_key(|c| (c.recorded_at, c.id))
            .cloned())
    }

    async fn climate_conditions(&self, limit: usize) -> Result<Vec<ClimateCondition>, DbError> {
        let mut conditions = self.inner.lock().await.climate.clone();
        conditions.sort_by_key(|c| std::cmp::Reverse((c.recorded_at, c.id)));
        conditions.truncate(limit);
        Ok(conditions)
    }

    async fn inputs_for_planting(&self, planting_id: PlantingId) -> Result<Vec<InputRecord>, DbError> {
        Ok(self
            .inner
            .lock()
            .await
            .inputs
            .iter()
            .filter(|i| i.planting_id == planting_id)
            .cloned()
            .collect())
    }
}

impl WateringHistory for MemoryStore {
    async fn record_watering(&self, event: WateringEvent) -> Result<(), DbError> {
        self.inner.lock().await.waterings.push(event);
        Ok(())
    }

    async fn watered_since(
        &self,
        player_id: PlayerId,
        terrain_id: TerrainId,
        since: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        Ok(self
            .inner
            .lock()
            .await
            .waterings
            .iter()
            .any(|w| w.player_id == player_id && w.terrain_id == terrain_id && w.at >= since))
    }
}

impl InputStore for MemoryStore {
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
        let mut inner = self.inner.lock().await;
        let planting = inner
            .plantings
            .get(&input.planting_id)
            .cloned()
            .ok_or_else(|| DbError::not_found("planting", input.planting_id))?;
        let terrain_id = planting.terrain_id;
        let terrain = inner
            .terrains
            .get(&terrain_id)
            .map(|row| row.soil.clone())
            .ok_or_else(|| DbError::not_found("terrain parameters", terrain_id))?;
        let mut quadrants: Vec<Quadrant> = inner
            .quadrants
            .values()
            .filter(|q| q.terrain_id == terrain_id)
            .cloned()
            .collect();
        quadrants.sort_by(|a, b| a.label.cmp(&b.label));

        let mut scope = InputScope {
            planting,
            terrain,
            quadrants,
            watering: None,
        };
        // Nothing has been written yet, so an error here leaves no trace.
        let out = f(&mut scope)?;

        if let Some(row) = inner.terrains.get_mut(&terrain_id) {
            row.soil = scope.terrain;
            row.soil.clamp_all();
            row.updated_at = now;
        }
        for quadrant in scope.quadrants {
            let Some(row) = inner.quadrants.get_mut(&quadrant.id) else {
                continue;
            };
            if row.terrain_id == terrain_id && row.soil != quadrant.soil {
                row.soil = quadrant.soil;
                row.soil.clamp_all();
                row.updated_at = now;
            }
        }
        if let Some(row) = inner.plantings.get_mut(&input.planting_id) {
            row.days_sem_rega = scope.planting.days_sem_rega;
        }
        if let Some(watering) = scope.watering {
            inner.waterings.push(watering);
        }
        inner.inputs.push(input);
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use eko_types::{ClimateConditionId, InputId, InputType, PlantState};

    use super::*;

    fn terrain() -> (TerrainParameters, Vec<Quadrant>) {
        let terrain_id = TerrainId::new();
        let now = Utc::now();
        let params = TerrainParameters {
            terrain_id,
            owner_id: PlayerId::new(),
            soil: SoilParameters::default(),
            updated_at: now,
        };
        let quadrants = ["A1", "A2"]
            .iter()
            .map(|label| Quadrant {
                id: QuadrantId::new(),
                terrain_id,
                label: (*label).to_owned(),
                soil: SoilParameters::default(),
                updated_at: now,
            })
            .collect();
        (params, quadrants)
    }

    fn planting(quadrant: &Quadrant, slot_index: u32) -> Planting {
        Planting {
            id: PlantingId::new(),
            species_key: "alface".to_owned(),
            player_id: PlayerId::new(),
            terrain_id: quadrant.terrain_id,
            quadrant_id: quadrant.id,
            slot_index,
            state: PlantState::Semente,
            days_since_planting: 0,
            days_sem_rega: 0,
            planted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn update_clamps_after_closure() {
        let store = MemoryStore::new();
        let (params, quadrants) = terrain();
        let id = params.terrain_id;
        store.insert_terrain(params, quadrants).await.unwrap();

        store
            .update_terrain_parameters(id, Utc::now(), |soil| soil.soil_moisture = 250.0)
            .await
            .unwrap();
        let row = store.terrain_parameters(id).await.unwrap();
        assert!((row.soil.soil_moisture - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn duplicate_labels_are_rejected() {
        let store = MemoryStore::new();
        let (params, mut quadrants) = terrain();
        quadrants[1].label = "A1".to_owned();
        let err = store.insert_terrain(params, quadrants).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn second_planting_in_same_slot_fails() {
        let store = MemoryStore::new();
        let (params, quadrants) = terrain();
        let quadrant = quadrants[0].clone();
        store.insert_terrain(params, quadrants).await.unwrap();

        store.insert_planting(planting(&quadrant, 1)).await.unwrap();
        let err = store.insert_planting(planting(&quadrant, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::SlotOccupied { slot_index: 1, .. }));
        assert_eq!(store.active_plantings().await.unwrap().len(), 1);

        store.insert_planting(planting(&quadrant, 2)).await.unwrap();
        assert_eq!(store.active_plantings().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_frees_slot_and_keeps_logs() {
        let store = MemoryStore::new();
        let (params, quadrants) = terrain();
        let quadrant = quadrants[0].clone();
        store.insert_terrain(params, quadrants).await.unwrap();

        let p = planting(&quadrant, 1);
        let id = p.id;
        store.insert_planting(p).await.unwrap();
        store
            .update_planting(id, |p| {
                let log = PlantStateLog::transition(p.id, p.state, PlantState::Morta, Utc::now());
                p.state = PlantState::Morta;
                vec![log]
            })
            .await
            .unwrap();
        assert!(store.active_plantings().await.unwrap().is_empty());

        store.delete_planting(id).await.unwrap();
        assert!(store.planting(id).await.unwrap_err().is_not_found());
        assert_eq!(store.state_logs(id).await.unwrap().len(), 1);
        store.insert_planting(planting(&quadrant, 1)).await.unwrap();
    }

    #[tokio::test]
    async fn latest_climate_breaks_timestamp_ties_by_id() {
        let store = MemoryStore::new();
        let at = Utc::now();
        let first = ClimateCondition {
            id: ClimateConditionId::new(),
            name: "seca".to_owned(),
            description: String::new(),
            recorded_at: at,
        };
        let second = ClimateCondition {
            id: ClimateConditionId::new(),
            name: "neblina".to_owned(),
            description: String::new(),
            recorded_at: at,
        };
        let expected = first.id.max(second.id);
        store.append_climate_condition(second).await.unwrap();
        store.append_climate_condition(first).await.unwrap();
        let latest = store.latest_climate_condition().await.unwrap().unwrap();
        assert_eq!(latest.id, expected);
    }

    #[tokio::test]
    async fn watering_window_is_per_player_and_terrain() {
        let store = MemoryStore::new();
        let player = PlayerId::new();
        let terrain = TerrainId::new();
        let now = Utc::now();
        store
            .record_watering(WateringEvent {
                player_id: player,
                terrain_id: terrain,
                at: now - Duration::hours(2),
            })
            .await
            .unwrap();

        let since = now - Duration::hours(24);
        assert!(store.watered_since(player, terrain, since).await.unwrap());
        assert!(!store.watered_since(PlayerId::new(), terrain, since).await.unwrap());
        assert!(!store.watered_since(player, TerrainId::new(), since).await.unwrap());
        assert!(!store.watered_since(player, terrain, now).await.unwrap());
    }

    fn input_for(planting: &Planting) -> InputRecord {
        InputRecord {
            id: InputId::new(),
            planting_id: planting.id,
            input_type: InputType::Water,
            quantity: 10.0,
            applied_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn committed_input_writes_every_row_together() {
        let store = MemoryStore::new();
        let (params, quadrants) = terrain();
        let terrain_id = params.terrain_id;
        let quadrant = quadrants[0].clone();
        store.insert_terrain(params, quadrants).await.unwrap();
        let mut p = planting(&quadrant, 0);
        p.days_sem_rega = 4;
        store.insert_planting(p.clone()).await.unwrap();

        let labels = store
            .commit_input(input_for(&p), Utc::now(), |scope| {
                scope.terrain.soil_moisture = 8.0;
                for q in &mut scope.quadrants {
                    q.soil.soil_moisture = 150.0;
                }
                scope.planting.days_sem_rega = 0;
                scope.watering = Some(WateringEvent {
                    player_id: scope.planting.player_id,
                    terrain_id: scope.planting.terrain_id,
                    at: Utc::now(),
                });
                Ok(scope.quadrants.iter().map(|q| q.label.clone()).collect::<Vec<_>>())
            })
            .await
            .unwrap();
        assert_eq!(labels, ["A1", "A2"]);

        let terrain = store.terrain_parameters(terrain_id).await.unwrap();
        assert!((terrain.soil.soil_moisture - 8.0).abs() < f64::EPSILON);
        for q in store.quadrants_for_terrain(terrain_id).await.unwrap() {
            assert!((q.soil.soil_moisture - 100.0).abs() < f64::EPSILON);
        }
        assert_eq!(store.planting(p.id).await.unwrap().days_sem_rega, 0);
        assert_eq!(store.inputs_for_planting(p.id).await.unwrap().len(), 1);
        let since = Utc::now() - Duration::hours(1);
        assert!(store.watered_since(p.player_id, terrain_id, since).await.unwrap());
    }

    #[tokio::test]
    async fn failed_commit_writes_nothing() {
        let store = MemoryStore::new();
        let (params, quadrants) = terrain();
        let terrain_id = params.terrain_id;
        let quadrant = quadrants[0].clone();
        store.insert_terrain(params, quadrants).await.unwrap();
        let mut p = planting(&quadrant, 0);
        p.days_sem_rega = 4;
        store.insert_planting(p.clone()).await.unwrap();

        let err = store
            .commit_input(input_for(&p), Utc::now(), |scope| -> Result<(), DbError> {
                scope.terrain.soil_moisture = 48.0;
                scope.planting.days_sem_rega = 0;
                Err(DbError::not_found("quadrant", QuadrantId::new()))
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let terrain = store.terrain_parameters(terrain_id).await.unwrap();
        assert_eq!(terrain.soil, SoilParameters::default());
        assert_eq!(store.planting(p.id).await.unwrap().days_sem_rega, 4);
        assert!(store.inputs_for_planting(p.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_for_missing_planting_is_not_found() {
        let store = MemoryStore::new();
        let (params, quadrants) = terrain();
        let quadrant = quadrants[0].clone();
        store.insert_terrain(params, quadrants).await.unwrap();
        let orphan = planting(&quadrant, 0);
        let err = store
            .commit_input(input_for(&orphan), Utc::now(), |_| Ok(()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.inputs_for_planting(orphan.id).await.unwrap().is_empty());
    }
}
