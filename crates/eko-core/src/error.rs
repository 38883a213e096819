//! Error type for the simulation services.

use eko_db::DbError;
use eko_types::{PlantState, PlantingId};
use eko_world::WorldError;

use crate::species::SpeciesError;

/// Errors returned by services, ticks and action handlers.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A store operation failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: DbError,
    },

    /// A domain calculation rejected its input.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The species catalogue could not be loaded.
    #[error("species error: {source}")]
    Species {
        /// The underlying species error.
        #[from]
        source: SpeciesError,
    },

    /// The species key is not in the current catalogue.
    #[error("unknown species: {0}")]
    UnknownSpecies(String),

    /// Only COLHIVEL plantings can be harvested.
    #[error("planting {planting_id} is {state}, not ready to harvest")]
    NotHarvestable {
        /// The planting.
        planting_id: PlantingId,
        /// Its current state.
        state: PlantState,
    },
}

impl ServiceError {
    /// Whether the caller sent something invalid, as opposed to an
    /// infrastructure failure.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::World { .. }
                | Self::UnknownSpecies(_)
                | Self::NotHarvestable { .. }
                | Self::Store {
                    source: DbError::NotFound { .. }
                        | DbError::SlotOccupied { .. }
                        | DbError::Duplicate { .. }
                }
        )
    }

    /// Whether the referenced row does not exist.
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Store {
                source: DbError::NotFound { .. }
            }
        )
    }
}
