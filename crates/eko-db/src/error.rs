//! Error types for the data layer.
//!
//! Every store operation returns [`DbError`]. Domain-level conflicts (a
//! missing row, an occupied slot) get their own variants so callers can
//! tell them apart from infrastructure failures.

use eko_types::{QuadrantId, TerrainId};

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The requested row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of row, e.g. `"planting"`.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A planting already occupies this quadrant slot.
    #[error("slot {slot_index} of quadrant {quadrant_id} is already occupied")]
    SlotOccupied {
        /// The quadrant.
        quadrant_id: QuadrantId,
        /// The occupied slot.
        slot_index: u32,
    },

    /// A terrain already has a quadrant with this label, or the terrain
    /// itself already exists.
    #[error("terrain {terrain_id} already has {what}")]
    Duplicate {
        /// The terrain.
        terrain_id: TerrainId,
        /// What was duplicated, e.g. `"quadrant B3"`.
        what: String,
    },

    /// A stored row could not be mapped back to a domain type.
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow {
        /// The table read from.
        table: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Shorthand for [`DbError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether the row simply does not exist.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether retrying the same operation later could succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Postgres(
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
                    | sqlx::Error::Database(_)
            )
        )
    }
}
