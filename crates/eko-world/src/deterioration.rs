//! Natural daily decay of soil parameters.
//!
//! Moisture, organic matter and biodiversity lose a fixed percentage of
//! their current value each day, scaled by the active season, and never
//! drop below a per-parameter floor. Values already at or below the floor
//! are left alone.

use serde::{Deserialize, Serialize};

use eko_types::{ParameterChange, SeasonFactors, SoilParameter, SoilParameters};

/// Decay applied to one parameter each day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayRule {
    /// The parameter that decays.
    pub parameter: SoilParameter,
    /// Percentage of the current value lost per day.
    pub daily_rate_pct: f64,
    /// Value below which decay never pushes the parameter.
    pub floor: f64,
}

/// Built-in decay rules.
pub const DEFAULT_DECAY_RULES: [DecayRule; 3] = [
    DecayRule {
        parameter: SoilParameter::SoilMoisture,
        daily_rate_pct: 2.5,
        floor: 5.0,
    },
    DecayRule {
        parameter: SoilParameter::OrganicMatter,
        daily_rate_pct: 0.8,
        floor: 3.0,
    },
    DecayRule {
        parameter: SoilParameter::Biodiversity,
        daily_rate_pct: 0.5,
        floor: 2.0,
    },
];

/// The season multiplier that applies to decay of `parameter`.
pub const fn season_factor(factors: &SeasonFactors, parameter: SoilParameter) -> f64 {
    match parameter {
        SoilParameter::SoilMoisture => factors.soil_moisture,
        SoilParameter::OrganicMatter => factors.organic_matter,
        SoilParameter::Biodiversity => factors.biodiversity,
        SoilParameter::Fertility => factors.fertility,
        SoilParameter::SoilPh | SoilParameter::Compaction | SoilParameter::Coverage => 1.0,
    }
}

/// Scale each rule's rate by the current season.
pub fn season_adjusted(rules: &[DecayRule], factors: &SeasonFactors) -> Vec<DecayRule> {
    rules
        .iter()
        .map(|r| DecayRule {
            daily_rate_pct: r.daily_rate_pct * season_factor(factors, r.parameter),
            ..*r
        })
        .collect()
}

/// Apply one day of decay to `soil`, returning only parameters that moved.
pub fn decay(soil: &mut SoilParameters, rules: &[DecayRule]) -> Vec<ParameterChange> {
    let mut changes = Vec::new();
    for r in rules {
        let current = soil.get(r.parameter);
        if current <= r.floor {
            continue;
        }
        let loss = (current * r.daily_rate_pct / 100.0).max(0.0);
        let target = (current - loss).max(r.floor);
        let change = soil.apply_delta(r.parameter, target - current);
        if change.applied().abs() > f64::EPSILON {
            changes.push(change);
        }
    }
    changes
}
