//! Error types for the `eko-world` crate.

use eko_types::InputType;

/// Errors raised by the pure domain calculations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// An input quantity was negative, NaN or infinite.
    #[error("invalid quantity {quantity} for input {input}")]
    InvalidQuantity {
        /// The input being applied.
        input: InputType,
        /// The rejected quantity.
        quantity: f64,
    },

    /// A quadrant label did not match `<letter><number>`.
    #[error("invalid quadrant label: {0:?}")]
    InvalidLabel(String),

    /// No climate event with this name exists in the catalogue.
    #[error("unknown climate event: {0}")]
    UnknownClimateEvent(String),

    /// The time-scale factor must be finite and strictly positive.
    #[error("invalid time scale factor: {0}")]
    InvalidTimeScale(f64),
}
