//! The four scheduled jobs: plant lifecycle, soil deterioration, climate
//! events and the season check.
//!
//! Each job walks its rows one at a time, every row in its own store
//! transaction. A row that fails is logged at `warn` with the job name and
//! counted in the summary; the rest of the batch still runs. Only failures
//! that make the whole run meaningless (no species snapshot, no row list)
//! are returned as errors.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

use eko_db::{HistoryStore, ParameterStore, PlantingStore, WateringHistory};
use eko_types::{ClimateCondition, ClimateConditionId, PlantState, SeasonFactors, SeasonRecord};
use eko_world::climate::{ClimateEvent, ClimateRoller};
use eko_world::{
    DEFAULT_DECAY_RULES, DecayRule, GrowthThresholds, SeasonDecision, advance_day, apply_event,
    current_factors, decay, decide, new_record, season_adjusted,
};

use crate::error::ServiceError;
use crate::propagate::{deltas_of, propagate_from};
use crate::species::SpeciesSource;

/// How far back a watering still counts for the drought check.
pub const WATERING_WINDOW_HOURS: i64 = 24;

// =============================================================================
// Season queries
// =============================================================================

/// The latest season record, if any.
pub async fn current_season<S: HistoryStore>(store: &S) -> Result<Option<SeasonRecord>, ServiceError> {
    Ok(store.current_season().await?)
}

/// Factors of the latest season, neutral when none exists.
pub async fn current_season_factors<S: HistoryStore>(
    store: &S,
) -> Result<SeasonFactors, ServiceError> {
    let season = store.current_season().await?;
    Ok(current_factors(season.as_ref()))
}

/// Daily decay rules scaled by the current season.
pub async fn season_adjusted_decay_rates<S: HistoryStore>(
    store: &S,
) -> Result<Vec<DecayRule>, ServiceError> {
    let factors = current_season_factors(store).await?;
    Ok(season_adjusted(&DEFAULT_DECAY_RULES, &factors))
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Outcome of one lifecycle run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleSummary {
    /// Plantings advanced by one day.
    pub advanced: usize,
    /// State log entries written.
    pub transitions: usize,
    /// Plantings that died of drought.
    pub deaths: usize,
    /// Plantings skipped because their species is not in the catalogue.
    pub unknown_species: usize,
    /// Plantings whose update failed.
    pub failures: usize,
}

/// Advance every active planting by one day.
///
/// Species thresholds come from a single snapshot taken at the start of the
/// run, scaled by the catalogue's time factor and the current season.
pub async fn run_daily_tick<S>(
    store: &S,
    species: &dyn SpeciesSource,
    now: DateTime<Utc>,
) -> Result<LifecycleSummary, ServiceError>
where
    S: PlantingStore + HistoryStore + WateringHistory,
{
    let catalog = species.snapshot()?;
    let factors = current_season_factors(store).await?;
    let plantings = store.active_plantings().await?;
    let since = now - Duration::hours(WATERING_WINDOW_HOURS);

    let mut summary = LifecycleSummary::default();
    for planting in plantings {
        let Some(plant_species) = catalog.get(&planting.species_key) else {
            tracing::warn!(
                job = "lifecycle",
                planting_id = %planting.id,
                species = %planting.species_key,
                "Species missing from catalogue, planting skipped"
            );
            summary.unknown_species = summary.unknown_species.saturating_add(1);
            continue;
        };
        let thresholds = GrowthThresholds::for_species(plant_species, catalog.time_scale_factor(), &factors)?;

        let watered = match store
            .watered_since(planting.player_id, planting.terrain_id, since)
            .await
        {
            Ok(watered) => watered,
            Err(err) => {
                tracing::warn!(job = "lifecycle", planting_id = %planting.id, error = %err, "Watering lookup failed");
                summary.failures = summary.failures.saturating_add(1);
                continue;
            }
        };

        let result = store
            .update_planting(planting.id, |p| advance_day(p, watered, &thresholds, now))
            .await;
        match result {
            Ok(logs) => {
                summary.advanced = summary.advanced.saturating_add(1);
                summary.transitions = summary.transitions.saturating_add(logs.len());
                for log in &logs {
                    tracing::debug!(
                        planting_id = %planting.id,
                        from = %log.from_state,
                        to = %log.to_state,
                        "Planting transitioned"
                    );
                    if log.to_state == PlantState::Morta {
                        summary.deaths = summary.deaths.saturating_add(1);
                    }
                }
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!(job = "lifecycle", planting_id = %planting.id, "Planting removed during tick");
            }
            Err(err) => {
                tracing::warn!(job = "lifecycle", planting_id = %planting.id, error = %err, "Planting update failed");
                summary.failures = summary.failures.saturating_add(1);
            }
        }
    }

    tracing::info!(
        advanced = summary.advanced,
        transitions = summary.transitions,
        deaths = summary.deaths,
        unknown_species = summary.unknown_species,
        failures = summary.failures,
        "Lifecycle tick completed"
    );
    Ok(summary)
}

// =============================================================================
// Deterioration
// =============================================================================

/// Outcome of one deterioration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeteriorationSummary {
    /// Terrain rows decayed.
    pub terrains: usize,
    /// Quadrant rows decayed.
    pub quadrants: usize,
    /// Neighbour updates caused by quadrant decay.
    pub propagated: usize,
    /// Rows whose update failed.
    pub failures: usize,
}

/// Decay every terrain and quadrant row by one day.
///
/// Each quadrant's decay is spread to its neighbours at
/// `propagation_factor`.
pub async fn run_deterioration_tick<S>(
    store: &S,
    propagation_factor: f64,
    now: DateTime<Utc>,
) -> Result<DeteriorationSummary, ServiceError>
where
    S: ParameterStore + HistoryStore,
{
    let rules = season_adjusted_decay_rates(store).await?;
    let mut summary = DeteriorationSummary::default();

    for terrain_id in store.terrain_ids().await? {
        match store
            .update_terrain_parameters(terrain_id, now, |soil| decay(soil, &rules))
            .await
        {
            Ok(_) => summary.terrains = summary.terrains.saturating_add(1),
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                tracing::warn!(job = "deterioration", terrain_id = %terrain_id, error = %err, "Terrain decay failed");
                summary.failures = summary.failures.saturating_add(1);
            }
        }
    }

    for quadrant_id in store.quadrant_ids().await? {
        let changes = match store
            .update_quadrant(quadrant_id, now, |soil| decay(soil, &rules))
            .await
        {
            Ok(changes) => changes,
            Err(err) if err.is_not_found() => continue,
            Err(err) => {
                tracing::warn!(job = "deterioration", quadrant_id = %quadrant_id, error = %err, "Quadrant decay failed");
                summary.failures = summary.failures.saturating_add(1);
                continue;
            }
        };
        summary.quadrants = summary.quadrants.saturating_add(1);

        let deltas = deltas_of(&changes);
        match propagate_from(store, quadrant_id, &deltas, propagation_factor, now).await {
            Ok(neighbours) => {
                summary.propagated = summary.propagated.saturating_add(neighbours.len());
            }
            Err(err) => {
                tracing::warn!(job = "deterioration", quadrant_id = %quadrant_id, error = %err, "Decay propagation failed");
                summary.failures = summary.failures.saturating_add(1);
            }
        }
    }

    tracing::info!(
        terrains = summary.terrains,
        quadrants = summary.quadrants,
        propagated = summary.propagated,
        failures = summary.failures,
        "Deterioration tick completed"
    );
    Ok(summary)
}

// =============================================================================
// Climate
// =============================================================================

/// Outcome of one climate run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClimateSummary {
    /// The event applied, if the roll produced one.
    pub event: Option<&'static str>,
    /// Terrain and quadrant rows updated.
    pub rows: usize,
    /// Rows whose update failed.
    pub failures: usize,
}

/// Roll for a climate event and apply it if one comes up.
pub async fn run_climate_tick<S, R>(
    store: &S,
    roller: &ClimateRoller,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<ClimateSummary, ServiceError>
where
    S: ParameterStore + HistoryStore,
    R: Rng + Send + ?Sized,
{
    match roller.roll(rng) {
        Some(event) => apply_climate_event(store, event, now).await,
        None => {
            tracing::info!("Climate roll: no event");
            Ok(ClimateSummary::default())
        }
    }
}

/// Apply `event` to every terrain and quadrant row, then record it once.
///
/// Climate deltas are not propagated; every row already receives them.
pub async fn apply_climate_event<S>(
    store: &S,
    event: &'static ClimateEvent,
    now: DateTime<Utc>,
) -> Result<ClimateSummary, ServiceError>
where
    S: ParameterStore + HistoryStore,
{
    let mut summary = ClimateSummary {
        event: Some(event.name),
        ..ClimateSummary::default()
    };

    for terrain_id in store.terrain_ids().await? {
        match store
            .update_terrain_parameters(terrain_id, now, |soil| apply_event(soil, event))
            .await
        {
            Ok(_) => summary.rows = summary.rows.saturating_add(1),
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                tracing::warn!(job = "climate", terrain_id = %terrain_id, error = %err, "Climate update failed");
                summary.failures = summary.failures.saturating_add(1);
            }
        }
    }
    for quadrant_id in store.quadrant_ids().await? {
        match store
            .update_quadrant(quadrant_id, now, |soil| apply_event(soil, event))
            .await
        {
            Ok(_) => summary.rows = summary.rows.saturating_add(1),
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                tracing::warn!(job = "climate", quadrant_id = %quadrant_id, error = %err, "Climate update failed");
                summary.failures = summary.failures.saturating_add(1);
            }
        }
    }

    store
        .append_climate_condition(ClimateCondition {
            id: ClimateConditionId::new(),
            name: event.name.to_owned(),
            description: event.description.to_owned(),
            recorded_at: now,
        })
        .await?;

    tracing::info!(
        event = event.name,
        rows = summary.rows,
        failures = summary.failures,
        "Climate event applied"
    );
    Ok(summary)
}

// =============================================================================
// Seasons
// =============================================================================

/// Append the first season or roll over to the next one when due.
///
/// Prior season records are never modified.
pub async fn run_season_check<S: HistoryStore>(
    store: &S,
    duration: Duration,
    now: DateTime<Utc>,
) -> Result<SeasonDecision, ServiceError> {
    let current = store.current_season().await?;
    let decision = decide(current.as_ref(), now, duration);
    match decision {
        SeasonDecision::CreateFirst(kind) => {
            store.append_season(new_record(kind, now)).await?;
            tracing::info!(season = %kind, "First season created");
        }
        SeasonDecision::Rollover { from, to } => {
            store.append_season(new_record(to, now)).await?;
            tracing::info!(from = %from, to = %to, "Season rolled over");
        }
        SeasonDecision::Unchanged => {
            tracing::debug!("Season unchanged");
        }
    }
    Ok(decision)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use eko_db::MemoryStore;
    use eko_types::{
        DroughtTolerance, PlayerId, SeasonKind, SoilParameters, Species, WateringEvent,
    };
    use eko_world::climate::event_by_name;
    use eko_world::seasons::standard_duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::species::{SpeciesCatalog, StaticSpeciesSource};
    use crate::terrain::{NewPlanting, create_planting, create_terrain};
    use crate::testing::FaultyStore;

    fn source(tolerance: DroughtTolerance) -> StaticSpeciesSource {
        StaticSpeciesSource::new(
            SpeciesCatalog::new(
                [Species {
                    key: "alface".to_owned(),
                    common_name: "Alface".to_owned(),
                    germination_days: 7,
                    maturation_days: 30,
                    drought_tolerance: tolerance,
                }],
                1.0,
            )
            .unwrap(),
        )
    }

    async fn planted(tolerance: DroughtTolerance) -> (MemoryStore, StaticSpeciesSource, eko_types::Planting) {
        let store = MemoryStore::new();
        let species = source(tolerance);
        let (_, quadrants) =
            create_terrain(&store, PlayerId::new(), &SoilParameters::default(), Utc::now())
                .await
                .unwrap();
        let planting = create_planting(
            &store,
            &species.snapshot().unwrap(),
            NewPlanting {
                player_id: PlayerId::new(),
                quadrant_id: quadrants[0].id,
                slot_index: 0,
                species_key: "alface".to_owned(),
            },
            Utc::now(),
        )
        .await
        .unwrap();
        (store, species, planting)
    }

    #[tokio::test]
    async fn unwatered_day_increments_drought_counter_by_one() {
        let (store, species, planting) = planted(DroughtTolerance::Alta).await;
        run_daily_tick(&store, &species, Utc::now()).await.unwrap();
        let after = store.planting(planting.id).await.unwrap();
        assert_eq!(after.days_sem_rega, 1);
        assert_eq!(after.days_since_planting, 1);
    }

    #[tokio::test]
    async fn drought_kills_seedling_and_it_stays_dead() {
        let (store, species, planting) = planted(DroughtTolerance::Baixa).await;
        store
            .update_planting(planting.id, |p| {
                p.state = PlantState::Mudinha;
                p.days_sem_rega = 3;
                Vec::new()
            })
            .await
            .unwrap();

        let summary = run_daily_tick(&store, &species, Utc::now()).await.unwrap();
        assert_eq!(summary.deaths, 1);
        let dead = store.planting(planting.id).await.unwrap();
        assert_eq!(dead.state, PlantState::Morta);

        let summary = run_daily_tick(&store, &species, Utc::now()).await.unwrap();
        assert_eq!(summary.advanced, 0);
        assert_eq!(store.planting(planting.id).await.unwrap(), dead);
        assert_eq!(store.state_logs(planting.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn watering_within_window_resets_counter() {
        let (store, species, planting) = planted(DroughtTolerance::Media).await;
        store
            .update_planting(planting.id, |p| {
                p.days_sem_rega = 2;
                Vec::new()
            })
            .await
            .unwrap();
        let now = Utc::now();
        store
            .record_watering(WateringEvent {
                player_id: planting.player_id,
                terrain_id: planting.terrain_id,
                at: now - Duration::hours(3),
            })
            .await
            .unwrap();
        run_daily_tick(&store, &species, now).await.unwrap();
        assert_eq!(store.planting(planting.id).await.unwrap().days_sem_rega, 0);
    }

    #[tokio::test]
    async fn unknown_species_is_skipped_not_killed() {
        let (store, _, planting) = planted(DroughtTolerance::Baixa).await;
        let empty = StaticSpeciesSource::new(SpeciesCatalog::new([], 1.0).unwrap());
        let summary = run_daily_tick(&store, &empty, Utc::now()).await.unwrap();
        assert_eq!(summary.unknown_species, 1);
        let after = store.planting(planting.id).await.unwrap();
        assert_eq!(after.state, PlantState::Semente);
        assert_eq!(after.days_since_planting, 0);
    }

    #[tokio::test]
    async fn deterioration_respects_floor_and_never_increases() {
        let store = MemoryStore::new();
        let initial = SoilParameters {
            soil_moisture: 80.0,
            organic_matter: 3.0,
            biodiversity: 1.0,
            fertility: 50.0,
            ..SoilParameters::default()
        };
        let (terrain, _) = create_terrain(&store, PlayerId::new(), &initial, Utc::now())
            .await
            .unwrap();

        let summary = run_deterioration_tick(&store, 0.15, Utc::now()).await.unwrap();
        assert_eq!(summary.terrains, 1);
        assert_eq!(summary.quadrants, 15);

        let after = store.terrain_parameters(terrain.terrain_id).await.unwrap();
        assert!((after.soil.soil_moisture - 78.0).abs() < 1e-9);
        assert!((after.soil.organic_matter - 3.0).abs() < f64::EPSILON);
        assert!((after.soil.biodiversity - 1.0).abs() < f64::EPSILON);
        assert!((after.soil.fertility - 50.0).abs() < f64::EPSILON);

        for q in store.quadrants_for_terrain(terrain.terrain_id).await.unwrap() {
            assert!(q.soil.soil_moisture < 80.0);
            assert!(q.soil.soil_moisture >= 5.0);
            assert!(q.soil.organic_matter <= 3.0);
        }
    }

    #[tokio::test]
    async fn summer_speeds_up_moisture_loss() {
        let store = MemoryStore::new();
        let initial = SoilParameters {
            soil_moisture: 80.0,
            ..SoilParameters::default()
        };
        let (terrain, _) = create_terrain(&store, PlayerId::new(), &initial, Utc::now())
            .await
            .unwrap();
        store
            .append_season(new_record(SeasonKind::Verao, Utc::now()))
            .await
            .unwrap();
        run_deterioration_tick(&store, 0.0, Utc::now()).await.unwrap();
        let after = store.terrain_parameters(terrain.terrain_id).await.unwrap();
        // 2.5% x 1.5 of 80.
        assert!((after.soil.soil_moisture - 77.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn climate_event_hits_every_row_and_is_recorded_once() {
        let store = MemoryStore::new();
        let initial = SoilParameters {
            soil_moisture: 50.0,
            ..SoilParameters::default()
        };
        let (terrain, _) = create_terrain(&store, PlayerId::new(), &initial, Utc::now())
            .await
            .unwrap();

        let event = event_by_name("chuva_forte").unwrap();
        let summary = apply_climate_event(&store, event, Utc::now()).await.unwrap();
        assert_eq!(summary.rows, 16);
        assert_eq!(summary.failures, 0);

        let after = store.terrain_parameters(terrain.terrain_id).await.unwrap();
        assert!((after.soil.soil_moisture - 62.0).abs() < 1e-9);
        assert!(after.soil.fertility.abs() < f64::EPSILON);
        for q in store.quadrants_for_terrain(terrain.terrain_id).await.unwrap() {
            assert!((q.soil.soil_moisture - 62.0).abs() < 1e-9);
        }

        let history = store.climate_conditions(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "chuva_forte");
    }

    #[tokio::test]
    async fn certain_no_event_roll_changes_nothing() {
        let store = MemoryStore::new();
        create_terrain(&store, PlayerId::new(), &SoilParameters::default(), Utc::now())
            .await
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let summary = run_climate_tick(&store, &ClimateRoller::new(1.0), &mut rng, Utc::now())
            .await
            .unwrap();
        assert_eq!(summary.event, None);
        assert!(store.latest_climate_condition().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn season_check_creates_then_rolls_over() {
        let store = MemoryStore::new();
        let start = Utc::now();

        let decision = run_season_check(&store, standard_duration(), start).await.unwrap();
        assert_eq!(decision, SeasonDecision::CreateFirst(SeasonKind::Verao));

        let decision = run_season_check(&store, standard_duration(), start + Duration::days(27))
            .await
            .unwrap();
        assert_eq!(decision, SeasonDecision::Unchanged);

        let decision = run_season_check(&store, standard_duration(), start + Duration::days(28))
            .await
            .unwrap();
        assert_eq!(
            decision,
            SeasonDecision::Rollover {
                from: SeasonKind::Verao,
                to: SeasonKind::Outono
            }
        );

        let seasons = store.seasons().await.unwrap();
        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons[0].kind, SeasonKind::Verao);
        assert_eq!(seasons[0].start_date, start);
        assert_eq!(seasons[1].kind, SeasonKind::Outono);

        let factors = current_season_factors(&store).await.unwrap();
        assert!((factors.maturation - 1.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn no_season_means_neutral_decay_rates() {
        let store = MemoryStore::new();
        let rules = season_adjusted_decay_rates(&store).await.unwrap();
        assert_eq!(rules, DEFAULT_DECAY_RULES.to_vec());
    }

    async fn plant_in(
        store: &FaultyStore,
        species: &StaticSpeciesSource,
        quadrant_id: eko_types::QuadrantId,
    ) -> eko_types::Planting {
        create_planting(
            store,
            &species.snapshot().unwrap(),
            NewPlanting {
                player_id: PlayerId::new(),
                quadrant_id,
                slot_index: 0,
                species_key: "alface".to_owned(),
            },
            Utc::now(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn failing_planting_does_not_stop_the_lifecycle_batch() {
        let store = FaultyStore::new();
        let species = source(DroughtTolerance::Alta);
        let (_, quadrants) =
            create_terrain(&store, PlayerId::new(), &SoilParameters::default(), Utc::now())
                .await
                .unwrap();
        let broken = plant_in(&store, &species, quadrants[0].id).await;
        let healthy = plant_in(&store, &species, quadrants[1].id).await;
        store.fail_planting(broken.id);

        let summary = run_daily_tick(&store, &species, Utc::now()).await.unwrap();
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.advanced, 1);
        assert_eq!(store.planting(broken.id).await.unwrap().days_since_planting, 0);
        assert_eq!(store.planting(healthy.id).await.unwrap().days_since_planting, 1);

        store.clear_faults();
        let summary = run_daily_tick(&store, &species, Utc::now()).await.unwrap();
        assert_eq!(summary.failures, 0);
        assert_eq!(summary.advanced, 2);
    }

    #[tokio::test]
    async fn failing_quadrant_does_not_stop_the_deterioration_batch() {
        let store = FaultyStore::new();
        let initial = SoilParameters {
            soil_moisture: 80.0,
            ..SoilParameters::default()
        };
        let (terrain, quadrants) = create_terrain(&store, PlayerId::new(), &initial, Utc::now())
            .await
            .unwrap();
        let broken = quadrants[7].id;
        store.fail_quadrant(broken);

        let summary = run_deterioration_tick(&store, 0.15, Utc::now()).await.unwrap();
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.terrains, 1);
        assert_eq!(summary.quadrants, 14);

        let after = store.terrain_parameters(terrain.terrain_id).await.unwrap();
        assert!((after.soil.soil_moisture - 78.0).abs() < 1e-9);
        for q in store.quadrants_for_terrain(terrain.terrain_id).await.unwrap() {
            if q.id == broken {
                assert!((q.soil.soil_moisture - 80.0).abs() < f64::EPSILON);
            } else {
                assert!(q.soil.soil_moisture < 80.0, "{}", q.label);
            }
        }
    }

    #[tokio::test]
    async fn failing_terrain_does_not_stop_the_climate_event() {
        let store = FaultyStore::new();
        let initial = SoilParameters {
            soil_moisture: 50.0,
            ..SoilParameters::default()
        };
        let (terrain, _) = create_terrain(&store, PlayerId::new(), &initial, Utc::now())
            .await
            .unwrap();
        store.fail_terrain(terrain.terrain_id);

        let event = event_by_name("chuva_forte").unwrap();
        let summary = apply_climate_event(&store, event, Utc::now()).await.unwrap();
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.rows, 15);

        let after = store.terrain_parameters(terrain.terrain_id).await.unwrap();
        assert!((after.soil.soil_moisture - 50.0).abs() < f64::EPSILON);
        for q in store.quadrants_for_terrain(terrain.terrain_id).await.unwrap() {
            assert!((q.soil.soil_moisture - 62.0).abs() < 1e-9);
        }
        assert_eq!(store.climate_conditions(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreadable_season_aborts_the_run_without_writing() {
        let store = FaultyStore::new();
        let species = source(DroughtTolerance::Alta);
        let (_, quadrants) =
            create_terrain(&store, PlayerId::new(), &SoilParameters::default(), Utc::now())
                .await
                .unwrap();
        let planting = plant_in(&store, &species, quadrants[0].id).await;
        store.fail_season_reads(true);

        assert!(run_daily_tick(&store, &species, Utc::now()).await.is_err());
        assert_eq!(store.planting(planting.id).await.unwrap().days_since_planting, 0);
    }
}
