//! Spreading a quadrant's change to its grid neighbours.

use chrono::{DateTime, Utc};
use serde::Serialize;

use eko_db::ParameterStore;
use eko_types::{ParameterChange, Quadrant, QuadrantId};
use eko_world::{ParameterDelta, apply_to_neighbour, resolve_neighbours};

use crate::error::ServiceError;

/// What one neighbour received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighbourChanges {
    /// The neighbour.
    pub quadrant_id: QuadrantId,
    /// Its grid label.
    pub label: String,
    /// Changes applied to it.
    pub changes: Vec<ParameterChange>,
}

/// Non-zero deltas from a set of applied changes.
pub fn deltas_of(changes: &[ParameterChange]) -> Vec<ParameterDelta> {
    changes
        .iter()
        .map(ParameterDelta::from)
        .filter(|d| d.delta.abs() > f64::EPSILON)
        .collect()
}

/// Push `deltas × factor` into every quadrant adjacent to `source`.
///
/// Each neighbour is updated in its own store transaction. A neighbour that
/// fails to update is logged and skipped; the others still receive their
/// share.
pub async fn propagate_from<S: ParameterStore>(
    store: &S,
    source: QuadrantId,
    deltas: &[ParameterDelta],
    factor: f64,
    now: DateTime<Utc>,
) -> Result<Vec<NeighbourChanges>, ServiceError> {
    if deltas.is_empty() || factor <= 0.0 {
        return Ok(Vec::new());
    }

    let quadrant = store.quadrant(source).await?;
    let siblings = store.quadrants_for_terrain(quadrant.terrain_id).await?;

    let mut applied = Vec::new();
    for neighbour in resolve_neighbours(&quadrant, &siblings) {
        let result = store
            .update_quadrant(neighbour.id, now, |soil| {
                apply_to_neighbour(soil, deltas, factor)
            })
            .await;
        match result {
            Ok(changes) => applied.push(NeighbourChanges {
                quadrant_id: neighbour.id,
                label: neighbour.label.clone(),
                changes,
            }),
            Err(err) => tracing::warn!(
                source = %source,
                neighbour = %neighbour.id,
                error = %err,
                "Propagation to neighbour failed"
            ),
        }
    }

    tracing::debug!(
        source = %source,
        label = %quadrant.label,
        neighbours = applied.len(),
        "Propagated quadrant deltas"
    );
    Ok(applied)
}

/// Push `deltas × factor` into the neighbours of `source` among
/// `quadrants`, in place. Used when the caller already holds every quadrant
/// of the terrain inside one store transaction.
pub fn propagate_within(
    quadrants: &mut [Quadrant],
    source: QuadrantId,
    deltas: &[ParameterDelta],
    factor: f64,
) -> Vec<NeighbourChanges> {
    if deltas.is_empty() || factor <= 0.0 {
        return Vec::new();
    }
    let Some(origin) = quadrants.iter().find(|q| q.id == source).cloned() else {
        return Vec::new();
    };
    let neighbour_ids: Vec<QuadrantId> = resolve_neighbours(&origin, quadrants)
        .iter()
        .map(|q| q.id)
        .collect();

    quadrants
        .iter_mut()
        .filter(|q| neighbour_ids.contains(&q.id))
        .map(|q| NeighbourChanges {
            quadrant_id: q.id,
            label: q.label.clone(),
            changes: apply_to_neighbour(&mut q.soil, deltas, factor),
        })
        .collect()
}
