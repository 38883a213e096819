//! Named player actions dispatched to pluggable handlers.
//!
//! The registry maps lower-cased names to handlers; one handler can sit
//! behind several aliases (`regar` and `water`). Dispatching an unknown
//! name is not an error: it logs and returns [`ActionReply::Unrecognized`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;

use eko_db::{ParameterStore, WateringHistory};
use eko_types::{ParameterChange, PlayerId, SoilParameter, TerrainId, WateringEvent};

use crate::error::ServiceError;

/// Who is acting, where, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionContext {
    /// The terrain acted on.
    pub terrain_id: TerrainId,
    /// The acting player.
    pub player_id: PlayerId,
    /// Time of the action.
    pub now: DateTime<Utc>,
}

/// What a handler did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    /// Canonical action name.
    pub action: &'static str,
    /// Terrain parameters the action changed.
    pub changes: Vec<ParameterChange>,
    /// Value produced by a harvest (coverage times unit price).
    pub harvested_value: Option<f64>,
}

/// Reply to a dispatched action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionReply {
    /// A handler ran.
    Handled(ActionOutcome),
    /// No handler is registered under this name.
    Unrecognized {
        /// The name as received.
        action: String,
    },
}

/// One registered action.
pub trait ActionHandler<S>: Send + Sync {
    /// Run the action against `store`.
    fn handle<'a>(
        &'a self,
        store: &'a S,
        ctx: ActionContext,
    ) -> BoxFuture<'a, Result<ActionOutcome, ServiceError>>;
}

/// Name to handler map.
pub struct ActionRegistry<S> {
    handlers: HashMap<String, Arc<dyn ActionHandler<S>>>,
}

impl<S> Default for ActionRegistry<S> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<S> std::fmt::Debug for ActionRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

impl<S> ActionRegistry<S> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under every name in `names`. A later registration
    /// of the same name replaces the earlier one.
    pub fn register(&mut self, names: &[&str], handler: Arc<dyn ActionHandler<S>>) {
        for name in names {
            self.handlers
                .insert(normalize(name), Arc::clone(&handler));
        }
    }

    /// Whether a handler exists for `name`, ignoring case.
    pub fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(&normalize(name))
    }

    /// Every registered name, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Dispatch `name`. Handler errors propagate; an unknown name does not.
    pub async fn handle(
        &self,
        name: &str,
        store: &S,
        ctx: ActionContext,
    ) -> Result<ActionReply, ServiceError> {
        let Some(handler) = self.handlers.get(&normalize(name)) else {
            tracing::warn!(action = name, terrain_id = %ctx.terrain_id, "No handler registered for action");
            return Ok(ActionReply::Unrecognized {
                action: name.to_owned(),
            });
        };
        let outcome = handler.handle(store, ctx).await?;
        tracing::info!(
            action = outcome.action,
            terrain_id = %ctx.terrain_id,
            player_id = %ctx.player_id,
            changes = outcome.changes.len(),
            "Action handled"
        );
        Ok(ActionReply::Handled(outcome))
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// `plantar`: coverage +10 and one more regeneration cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlantAction;

/// Coverage added by one planting action.
pub const PLANT_COVERAGE_GAIN: f64 = 10.0;

impl<S: ParameterStore> ActionHandler<S> for PlantAction {
    fn handle<'a>(
        &'a self,
        store: &'a S,
        ctx: ActionContext,
    ) -> BoxFuture<'a, Result<ActionOutcome, ServiceError>> {
        Box::pin(async move {
            let changes = store
                .update_terrain_parameters(ctx.terrain_id, ctx.now, |soil| {
                    soil.regeneration_cycles = soil.regeneration_cycles.saturating_add(1);
                    vec![soil.apply_delta(SoilParameter::Coverage, PLANT_COVERAGE_GAIN)]
                })
                .await?;
            Ok(ActionOutcome {
                action: "plantar",
                changes,
                harvested_value: None,
            })
        })
    }
}

/// `regar` / `water`: one more regeneration cycle, and the watering is
/// remembered for the drought check.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterAction;

impl<S: ParameterStore + WateringHistory> ActionHandler<S> for WaterAction {
    fn handle<'a>(
        &'a self,
        store: &'a S,
        ctx: ActionContext,
    ) -> BoxFuture<'a, Result<ActionOutcome, ServiceError>> {
        Box::pin(async move {
            store
                .update_terrain_parameters(ctx.terrain_id, ctx.now, |soil| {
                    soil.regeneration_cycles = soil.regeneration_cycles.saturating_add(1);
                })
                .await?;
            store
                .record_watering(WateringEvent {
                    player_id: ctx.player_id,
                    terrain_id: ctx.terrain_id,
                    at: ctx.now,
                })
                .await?;
            Ok(ActionOutcome {
                action: "regar",
                changes: Vec::new(),
                harvested_value: None,
            })
        })
    }
}

/// `colher` / `harvest`: values the coverage and clears it. Paying the
/// player is left to the caller.
#[derive(Debug, Clone, Copy)]
pub struct HarvestAction {
    /// Value of one unit of coverage.
    pub unit_price: f64,
}

impl<S: ParameterStore> ActionHandler<S> for HarvestAction {
    fn handle<'a>(
        &'a self,
        store: &'a S,
        ctx: ActionContext,
    ) -> BoxFuture<'a, Result<ActionOutcome, ServiceError>> {
        Box::pin(async move {
            let change = store
                .update_terrain_parameters(ctx.terrain_id, ctx.now, |soil| {
                    let coverage = soil.get(SoilParameter::Coverage);
                    soil.apply_delta(SoilParameter::Coverage, -coverage)
                })
                .await?;
            Ok(ActionOutcome {
                action: "colher",
                changes: vec![change],
                harvested_value: Some(change.before * self.unit_price),
            })
        })
    }
}

/// Register `plantar`, `regar`/`water` and `colher`/`harvest`.
pub fn register_default_actions<S>(registry: &mut ActionRegistry<S>, harvest_unit_price: f64)
where
    S: ParameterStore + WateringHistory + 'static,
{
    registry.register(&["plantar"], Arc::new(PlantAction));
    registry.register(&["regar", "water"], Arc::new(WaterAction));
    registry.register(
        &["colher", "harvest"],
        Arc::new(HarvestAction {
            unit_price: harvest_unit_price,
        }),
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use chrono::Duration;
    use eko_db::MemoryStore;
    use eko_types::SoilParameters;

    use crate::terrain::create_terrain;

    async fn setup() -> (MemoryStore, ActionRegistry<MemoryStore>, ActionContext) {
        let store = MemoryStore::new();
        let owner = PlayerId::new();
        let (terrain, _) = create_terrain(&store, owner, &SoilParameters::default(), Utc::now())
            .await
            .unwrap();
        let mut registry = ActionRegistry::new();
        register_default_actions(&mut registry, 2.0);
        let ctx = ActionContext {
            terrain_id: terrain.terrain_id,
            player_id: owner,
            now: Utc::now(),
        };
        (store, registry, ctx)
    }

    #[tokio::test]
    async fn aliases_are_case_insensitive() {
        let (_, registry, _) = setup().await;
        for name in ["plantar", "REGAR", "Water", "colher", "harvest "] {
            assert!(registry.has(name), "{name}");
        }
        assert!(!registry.has("dance"));
    }

    #[tokio::test]
    async fn unknown_action_is_a_soft_reply() {
        let (store, registry, ctx) = setup().await;
        let reply = registry.handle("dance", &store, ctx).await.unwrap();
        assert_eq!(
            reply,
            ActionReply::Unrecognized {
                action: "dance".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn plant_then_harvest() {
        let (store, registry, ctx) = setup().await;
        registry.handle("plantar", &store, ctx).await.unwrap();
        registry.handle("plantar", &store, ctx).await.unwrap();

        let soil = store.terrain_parameters(ctx.terrain_id).await.unwrap().soil;
        assert!((soil.coverage - 20.0).abs() < f64::EPSILON);
        assert_eq!(soil.regeneration_cycles, 2);

        let ActionReply::Handled(outcome) = registry.handle("Harvest", &store, ctx).await.unwrap()
        else {
            panic!("harvest should be handled");
        };
        assert_eq!(outcome.harvested_value, Some(40.0));
        let soil = store.terrain_parameters(ctx.terrain_id).await.unwrap().soil;
        assert!(soil.coverage.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn water_records_a_watering() {
        let (store, registry, ctx) = setup().await;
        registry.handle("water", &store, ctx).await.unwrap();
        let soil = store.terrain_parameters(ctx.terrain_id).await.unwrap().soil;
        assert_eq!(soil.regeneration_cycles, 1);
        assert!(
            store
                .watered_since(ctx.player_id, ctx.terrain_id, ctx.now - Duration::minutes(1))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn handler_errors_propagate() {
        let (store, registry, mut ctx) = setup().await;
        ctx.terrain_id = TerrainId::new();
        let err = registry.handle("plantar", &store, ctx).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
