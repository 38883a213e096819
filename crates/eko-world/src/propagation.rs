//! Neighbour propagation of soil deltas.
//!
//! When a quadrant changes, each adjacent quadrant receives a fraction of
//! the same delta, sign preserved and clamped to the neighbour's bounds.
//! Propagation is one hop only; neighbours do not re-propagate.

use eko_types::{ParameterChange, SoilParameter, SoilParameters};

/// Fraction of a delta radiated to each neighbour by default.
pub const DEFAULT_PROPAGATION_FACTOR: f64 = 0.15;

/// A signed change to one soil parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDelta {
    /// The parameter that moved.
    pub parameter: SoilParameter,
    /// Signed amount.
    pub delta: f64,
}

impl From<&ParameterChange> for ParameterDelta {
    fn from(change: &ParameterChange) -> Self {
        Self {
            parameter: change.parameter,
            delta: change.applied(),
        }
    }
}

/// Scale `deltas` by `factor`, dropping entries that become zero.
pub fn scaled_deltas(deltas: &[ParameterDelta], factor: f64) -> Vec<ParameterDelta> {
    deltas
        .iter()
        .map(|d| ParameterDelta {
            parameter: d.parameter,
            delta: d.delta * factor,
        })
        .filter(|d| d.delta.is_finite() && d.delta.abs() > f64::EPSILON)
        .collect()
}

/// Apply the scaled deltas to a neighbour's soil, clamping each parameter.
pub fn apply_to_neighbour(
    soil: &mut SoilParameters,
    deltas: &[ParameterDelta],
    factor: f64,
) -> Vec<ParameterChange> {
    scaled_deltas(deltas, factor)
        .into_iter()
        .map(|d| soil.apply_delta(d.parameter, d.delta))
        .collect()
}
