//! Applying resources (water, fertilizer, compost, lime, mulch) to a
//! planting's soil.
//!
//! An input's effect is computed and written exactly once, when the input
//! is recorded. The input row, the terrain and quadrant deltas, the spread
//! to neighbours, the drought counter reset and the watering event are
//! committed in one store transaction: if any part fails, neither the input
//! nor any of its effects is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eko_db::{DbError, InputScope, InputStore};
use eko_types::{
    InputId, InputRecord, InputType, ParameterChange, PlantingId, QuadrantId, TerrainId,
    WateringEvent,
};
use eko_world::{RequestedEffect, apply_effects, calculate_effects, resets_drought_counter};

use crate::error::ServiceError;
use crate::propagate::{NeighbourChanges, deltas_of, propagate_within};

/// A request to apply an input to a planting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewInput {
    /// Target planting.
    pub planting_id: PlantingId,
    /// What is applied.
    pub input_type: InputType,
    /// How much.
    pub quantity: f64,
}

/// Everything an input changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectsReport {
    /// The recorded input.
    pub input: InputRecord,
    /// Terrain the planting belongs to.
    pub terrain_id: TerrainId,
    /// Quadrant the planting sits in.
    pub quadrant_id: QuadrantId,
    /// Before/after per parameter on the terrain row.
    pub terrain_changes: Vec<ParameterChange>,
    /// Before/after per parameter on the quadrant row.
    pub quadrant_changes: Vec<ParameterChange>,
    /// What each neighbouring quadrant received.
    pub neighbour_changes: Vec<NeighbourChanges>,
    /// Whether the planting's drought counter was reset.
    pub drought_counter_reset: bool,
}

/// Validate the request, then store the input together with its effects.
///
/// Nothing is written if the planting does not exist, the quantity is
/// negative or not finite, or any write fails.
pub async fn record_input<S: InputStore>(
    store: &S,
    request: NewInput,
    propagation_factor: f64,
    now: DateTime<Utc>,
) -> Result<EffectsReport, ServiceError> {
    let input = InputRecord {
        id: InputId::new(),
        planting_id: request.planting_id,
        input_type: request.input_type,
        quantity: request.quantity,
        applied_at: now,
    };
    apply_input(store, input, propagation_factor, now).await
}

/// Store `input` and apply its effects to the soil of its planting, as one
/// unit of work.
pub async fn apply_input<S: InputStore>(
    store: &S,
    input: InputRecord,
    propagation_factor: f64,
    now: DateTime<Utc>,
) -> Result<EffectsReport, ServiceError> {
    let effects = calculate_effects(input.input_type, input.quantity)?;
    let drought_counter_reset = resets_drought_counter(input.input_type);

    let applied = store
        .commit_input(input.clone(), now, move |scope| {
            apply_within(scope, &effects, propagation_factor, drought_counter_reset, now)
        })
        .await?;

    tracing::info!(
        input_id = %input.id,
        planting_id = %input.planting_id,
        input_type = %input.input_type,
        quantity = input.quantity,
        neighbours = applied.neighbour_changes.len(),
        "Input applied"
    );

    Ok(EffectsReport {
        input,
        terrain_id: applied.terrain_id,
        quadrant_id: applied.quadrant_id,
        terrain_changes: applied.terrain_changes,
        quadrant_changes: applied.quadrant_changes,
        neighbour_changes: applied.neighbour_changes,
        drought_counter_reset,
    })
}

struct Applied {
    terrain_id: TerrainId,
    quadrant_id: QuadrantId,
    terrain_changes: Vec<ParameterChange>,
    quadrant_changes: Vec<ParameterChange>,
    neighbour_changes: Vec<NeighbourChanges>,
}

fn apply_within(
    scope: &mut InputScope,
    effects: &[RequestedEffect],
    propagation_factor: f64,
    reset_drought_counter: bool,
    now: DateTime<Utc>,
) -> Result<Applied, DbError> {
    let terrain_id = scope.planting.terrain_id;
    let quadrant_id = scope.planting.quadrant_id;

    let terrain_changes = apply_effects(&mut scope.terrain, effects);
    let quadrant = scope
        .quadrants
        .iter_mut()
        .find(|q| q.id == quadrant_id)
        .ok_or_else(|| DbError::not_found("quadrant", quadrant_id))?;
    let quadrant_changes = apply_effects(&mut quadrant.soil, effects);

    let deltas = deltas_of(&quadrant_changes);
    let neighbour_changes =
        propagate_within(&mut scope.quadrants, quadrant_id, &deltas, propagation_factor);

    if reset_drought_counter {
        scope.planting.days_sem_rega = 0;
        scope.watering = Some(WateringEvent {
            player_id: scope.planting.player_id,
            terrain_id,
            at: now,
        });
    }

    Ok(Applied {
        terrain_id,
        quadrant_id,
        terrain_changes,
        quadrant_changes,
        neighbour_changes,
    })
}
