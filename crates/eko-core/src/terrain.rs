//! Terrain creation and the planting lifecycle outside the daily tick:
//! planting, harvest and removal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eko_db::{ParameterStore, PlantingStore};
use eko_types::{
    PlantState, PlantStateLog, Planting, PlantingId, PlayerId, Quadrant, QuadrantId,
    SoilParameters, TerrainId, TerrainParameters,
};
use eko_world::{SoilHealthReport, analyze, standard_grid};

use crate::error::ServiceError;
use crate::species::SpeciesCatalog;

/// Create a terrain with its parameter row and the standard 15-quadrant grid.
///
/// Every quadrant starts with the same soil as the terrain.
pub async fn create_terrain<S: ParameterStore>(
    store: &S,
    owner_id: PlayerId,
    initial: &SoilParameters,
    now: DateTime<Utc>,
) -> Result<(TerrainParameters, Vec<Quadrant>), ServiceError> {
    let terrain_id = TerrainId::new();
    let mut soil = initial.clone();
    soil.clamp_all();

    let terrain = TerrainParameters {
        terrain_id,
        owner_id,
        soil: soil.clone(),
        updated_at: now,
    };
    let quadrants: Vec<Quadrant> = standard_grid()
        .into_iter()
        .map(|label| Quadrant {
            id: QuadrantId::new(),
            terrain_id,
            label: label.to_string(),
            soil: soil.clone(),
            updated_at: now,
        })
        .collect();

    store
        .insert_terrain(terrain.clone(), quadrants.clone())
        .await?;
    tracing::info!(
        terrain_id = %terrain_id,
        owner_id = %owner_id,
        quadrants = quadrants.len(),
        "Terrain created"
    );
    Ok((terrain, quadrants))
}

/// A request to plant one seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlanting {
    /// Who is planting.
    pub player_id: PlayerId,
    /// Target quadrant.
    pub quadrant_id: QuadrantId,
    /// Target slot within the quadrant.
    pub slot_index: u32,
    /// Species catalogue key.
    pub species_key: String,
}

/// Plant a seed in a free slot. The planting starts as SEMENTE with both
/// counters at zero; no state log entry is written.
///
/// Fails on an unknown species, a missing quadrant, or an occupied slot.
/// The slot check and the insert happen atomically in the store.
pub async fn create_planting<S: ParameterStore + PlantingStore>(
    store: &S,
    catalog: &SpeciesCatalog,
    request: NewPlanting,
    now: DateTime<Utc>,
) -> Result<Planting, ServiceError> {
    if !catalog.contains(&request.species_key) {
        return Err(ServiceError::UnknownSpecies(request.species_key));
    }
    let quadrant = store.quadrant(request.quadrant_id).await?;

    let planting = Planting {
        id: PlantingId::new(),
        species_key: request.species_key,
        player_id: request.player_id,
        terrain_id: quadrant.terrain_id,
        quadrant_id: quadrant.id,
        slot_index: request.slot_index,
        state: PlantState::Semente,
        days_since_planting: 0,
        days_sem_rega: 0,
        planted_at: now,
    };
    store.insert_planting(planting.clone()).await?;

    tracing::info!(
        planting_id = %planting.id,
        species = %planting.species_key,
        quadrant = %quadrant.label,
        slot = planting.slot_index,
        "Planting created"
    );
    Ok(planting)
}

/// Result of a successful harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    /// The planting as it was removed, in state COLHIDA.
    pub planting: Planting,
    /// The COLHIVEL to COLHIDA log entry.
    pub log: PlantStateLog,
}

/// Harvest a COLHIVEL planting: log COLHIVEL to COLHIDA, then remove it so
/// its slot is free again.
pub async fn harvest_planting<S: PlantingStore>(
    store: &S,
    planting_id: PlantingId,
    now: DateTime<Utc>,
) -> Result<Harvest, ServiceError> {
    let mut logs = store
        .update_planting(planting_id, |planting| {
            if planting.state != PlantState::Colhivel {
                return Vec::new();
            }
            let log = PlantStateLog::transition(
                planting.id,
                planting.state,
                PlantState::Colhida,
                now,
            );
            planting.state = PlantState::Colhida;
            vec![log]
        })
        .await?;

    let Some(log) = logs.pop() else {
        let planting = store.planting(planting_id).await?;
        return Err(ServiceError::NotHarvestable {
            planting_id,
            state: planting.state,
        });
    };

    let planting = store.delete_planting(planting_id).await?;
    tracing::info!(planting_id = %planting_id, species = %planting.species_key, "Planting harvested");
    Ok(Harvest { planting, log })
}

/// Remove a planting in any state, freeing its slot.
pub async fn remove_planting<S: PlantingStore>(
    store: &S,
    planting_id: PlantingId,
) -> Result<Planting, ServiceError> {
    let planting = store.delete_planting(planting_id).await?;
    tracing::info!(
        planting_id = %planting_id,
        state = %planting.state,
        "Planting removed"
    );
    Ok(planting)
}

/// Health analysis of a terrain's parameter row.
pub async fn terrain_health<S: ParameterStore>(
    store: &S,
    terrain_id: TerrainId,
) -> Result<SoilHealthReport, ServiceError> {
    let terrain = store.terrain_parameters(terrain_id).await?;
    Ok(analyze(&terrain.soil))
}

/// Health analysis of every quadrant of a terrain, keyed by label.
pub async fn quadrant_health<S: ParameterStore>(
    store: &S,
    terrain_id: TerrainId,
) -> Result<Vec<(String, SoilHealthReport)>, ServiceError> {
    let quadrants = store.quadrants_for_terrain(terrain_id).await?;
    Ok(quadrants
        .into_iter()
        .map(|q| {
            let report = analyze(&q.soil);
            (q.label, report)
        })
        .collect())
}
