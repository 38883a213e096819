//! One handle over a store, the species source and the configured
//! tunables, so callers do not thread factors and prices through every call.

use std::sync::Arc;

use chrono::Utc;

use eko_db::SimulationStore;
use eko_types::{PlantingId, PlayerId, Quadrant, TerrainId, TerrainParameters};
use eko_world::SoilHealthReport;

use crate::actions::{ActionContext, ActionRegistry, ActionReply, register_default_actions};
use crate::config::SimulationConfig;
use crate::error::ServiceError;
use crate::inputs::{EffectsReport, NewInput, record_input};
use crate::scheduler::SchedulerSettings;
use crate::species::SpeciesSource;
use crate::terrain::{self, Harvest, NewPlanting};

/// Services bound to one store and configuration.
pub struct Simulation<S> {
    store: S,
    species: Arc<dyn SpeciesSource>,
    config: SimulationConfig,
    actions: ActionRegistry<S>,
}

impl<S> std::fmt::Debug for Simulation<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

impl<S: SimulationStore> Simulation<S> {
    /// Bind `store` and `species` to `config`, with the default actions
    /// registered.
    pub fn new(store: S, species: Arc<dyn SpeciesSource>, config: SimulationConfig) -> Self {
        let mut actions = ActionRegistry::new();
        register_default_actions(&mut actions, config.actions.harvest_unit_price);
        Self {
            store,
            species,
            config,
            actions,
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The action registry, for registering extra handlers.
    pub const fn actions_mut(&mut self) -> &mut ActionRegistry<S> {
        &mut self.actions
    }

    /// Scheduler settings derived from the configuration.
    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings::from_config(&self.config)
    }

    /// Create a terrain for `owner` seeded with the configured initial soil.
    pub async fn create_terrain(
        &self,
        owner: PlayerId,
    ) -> Result<(TerrainParameters, Vec<Quadrant>), ServiceError> {
        terrain::create_terrain(&self.store, owner, &self.config.terrain.initial_soil, Utc::now())
            .await
    }

    /// Plant a seed, checked against the current species snapshot.
    pub async fn plant(&self, request: NewPlanting) -> Result<eko_types::Planting, ServiceError> {
        let catalog = self.species.snapshot()?;
        terrain::create_planting(&self.store, &catalog, request, Utc::now()).await
    }

    /// Harvest a COLHIVEL planting.
    pub async fn harvest(&self, planting_id: PlantingId) -> Result<Harvest, ServiceError> {
        terrain::harvest_planting(&self.store, planting_id, Utc::now()).await
    }

    /// Apply an input at the configured propagation factor.
    pub async fn apply_input(&self, request: NewInput) -> Result<EffectsReport, ServiceError> {
        record_input(
            &self.store,
            request,
            self.config.world.propagation_factor,
            Utc::now(),
        )
        .await
    }

    /// Dispatch a named action for `player_id` on `terrain_id`.
    pub async fn act(
        &self,
        action: &str,
        terrain_id: TerrainId,
        player_id: PlayerId,
    ) -> Result<ActionReply, ServiceError> {
        let ctx = ActionContext {
            terrain_id,
            player_id,
            now: Utc::now(),
        };
        self.actions.handle(action, &self.store, ctx).await
    }

    /// Health of a terrain's parameter row.
    pub async fn terrain_health(&self, terrain_id: TerrainId) -> Result<SoilHealthReport, ServiceError> {
        terrain::terrain_health(&self.store, terrain_id).await
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::arithmetic_side_effects,
)]
mod tests {
    use super::*;
    use eko_db::{MemoryStore, ParameterStore};
    use eko_types::{InputType, PlantState, SoilParameters};

    use crate::species::{SpeciesCatalog, StaticSpeciesSource};

    const SPECIES: &str = "
alface:
  nome_comum: Alface
  germinacao_dias: 7
  maturidade_dias: 30
  tolerancia_seca: média
";

    fn simulation(config: SimulationConfig) -> Simulation<MemoryStore> {
        let catalog = SpeciesCatalog::from_yaml(SPECIES, 1.0).unwrap();
        Simulation::new(
            MemoryStore::new(),
            Arc::new(StaticSpeciesSource::new(catalog)),
            config,
        )
    }

    #[tokio::test]
    async fn terrains_start_from_configured_soil() {
        let mut config = SimulationConfig::default();
        config.terrain.initial_soil = SoilParameters {
            soil_moisture: 55.0,
            ..SoilParameters::default()
        };
        let sim = simulation(config);
        let (terrain, quadrants) = sim.create_terrain(PlayerId::new()).await.unwrap();
        assert!((terrain.soil.soil_moisture - 55.0).abs() < f64::EPSILON);
        assert!(quadrants.iter().all(|q| q.soil == terrain.soil));
    }

    #[tokio::test]
    async fn harvest_action_uses_configured_price() {
        let mut config = SimulationConfig::default();
        config.actions.harvest_unit_price = 3.0;
        let sim = simulation(config);
        let owner = PlayerId::new();
        let (terrain, _) = sim.create_terrain(owner).await.unwrap();

        sim.act("plantar", terrain.terrain_id, owner).await.unwrap();
        let ActionReply::Handled(outcome) =
            sim.act("colher", terrain.terrain_id, owner).await.unwrap()
        else {
            panic!("colher should be handled");
        };
        assert_eq!(outcome.harvested_value, Some(30.0));
    }

    #[tokio::test]
    async fn plant_and_water_through_the_facade() {
        let sim = simulation(SimulationConfig::default());
        let owner = PlayerId::new();
        let (terrain, quadrants) = sim.create_terrain(owner).await.unwrap();
        let planting = sim
            .plant(NewPlanting {
                player_id: owner,
                quadrant_id: quadrants[0].id,
                slot_index: 0,
                species_key: "alface".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(planting.state, PlantState::Semente);

        let report = sim
            .apply_input(NewInput {
                planting_id: planting.id,
                input_type: InputType::Water,
                quantity: 10.0,
            })
            .await
            .unwrap();
        assert!(report.drought_counter_reset);
        let soil = sim.store().terrain_parameters(terrain.terrain_id).await.unwrap().soil;
        assert!((soil.soil_moisture - 8.0).abs() < 1e-9);

        let err = sim.harvest(planting.id).await.unwrap_err();
        assert!(err.is_validation());
        assert!(sim.terrain_health(terrain.terrain_id).await.is_ok());
    }
}
