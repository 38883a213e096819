//! Daily plant growth state machine.
//!
//! Each day a planting ages by one day and either has its drought counter
//! reset (it was watered in the last 24 hours) or incremented. A planting
//! dry for longer than its species tolerates dies. Otherwise it may grow:
//!
//! ```text
//! SEMENTE --(germination days)--> MUDINHA --(maturation days)--> MADURA --> COLHIVEL
//! ```
//!
//! At most one of the two day-based steps happens per day. A planting that
//! reaches MADURA becomes COLHIVEL in the same day. COLHIDA and MORTA are
//! terminal and never change again.

use chrono::{DateTime, Utc};

use eko_types::{PlantState, PlantStateLog, Planting, SeasonFactors, Species};

use crate::error::WorldError;

/// Day thresholds for one species under the current time scale and season.
///
/// A species with a period of zero days has no threshold for that step:
/// the planting stays in SEMENTE (or MUDINHA) until it is harvested, dies
/// or is removed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthThresholds {
    /// `days_since_planting` needed for SEMENTE to become MUDINHA.
    pub germination_days: Option<f64>,
    /// `days_since_planting` needed for MUDINHA to become MADURA.
    pub maturation_days: Option<f64>,
    /// Highest `days_sem_rega` the planting survives.
    pub drought_limit: u32,
}

impl GrowthThresholds {
    /// Scale the species' day counts: `days / time_scale_factor * season`.
    pub fn for_species(
        species: &Species,
        time_scale_factor: f64,
        season: &SeasonFactors,
    ) -> Result<Self, WorldError> {
        if !time_scale_factor.is_finite() || time_scale_factor <= 0.0 {
            return Err(WorldError::InvalidTimeScale(time_scale_factor));
        }
        let scale = |days: u32, season_factor: f64| {
            (days > 0).then(|| f64::from(days) / time_scale_factor * season_factor)
        };
        Ok(Self {
            germination_days: scale(species.germination_days, season.germination),
            maturation_days: scale(species.maturation_days, season.maturation),
            drought_limit: species.drought_tolerance.limit_days(),
        })
    }
}

/// Advance `planting` by one day and return the transitions it made, in
/// order. Terminal plantings are left untouched.
pub fn advance_day(
    planting: &mut Planting,
    watered: bool,
    thresholds: &GrowthThresholds,
    now: DateTime<Utc>,
) -> Vec<PlantStateLog> {
    let mut transitions = Vec::new();
    if planting.state.is_terminal() {
        return transitions;
    }

    planting.days_since_planting = planting.days_since_planting.saturating_add(1);
    planting.days_sem_rega = if watered {
        0
    } else {
        planting.days_sem_rega.saturating_add(1)
    };

    if planting.days_sem_rega > thresholds.drought_limit {
        move_to(planting, PlantState::Morta, now, &mut transitions);
        return transitions;
    }

    let age = f64::from(planting.days_since_planting);
    match planting.state {
        PlantState::Semente if reached(age, thresholds.germination_days) => {
            move_to(planting, PlantState::Mudinha, now, &mut transitions);
        }
        PlantState::Mudinha if reached(age, thresholds.maturation_days) => {
            move_to(planting, PlantState::Madura, now, &mut transitions);
        }
        _ => {}
    }

    if planting.state == PlantState::Madura {
        move_to(planting, PlantState::Colhivel, now, &mut transitions);
    }

    transitions
}

fn reached(age: f64, threshold: Option<f64>) -> bool {
    threshold.is_some_and(|days| age >= days)
}

fn move_to(
    planting: &mut Planting,
    to: PlantState,
    now: DateTime<Utc>,
    transitions: &mut Vec<PlantStateLog>,
) {
    transitions.push(PlantStateLog::transition(planting.id, planting.state, to, now));
    planting.state = to;
}
