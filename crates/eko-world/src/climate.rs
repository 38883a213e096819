//! Stochastic climate events.
//!
//! Twice a day the simulation first rolls whether anything happens at all
//! (40% chance of a quiet half-day by default). If something does, one
//! event is drawn from the catalogue below with the listed weights
//! renormalised to sum to 1:
//!
//! | Event           | Weight | Effects                            |
//! |-----------------|--------|------------------------------------|
//! | `chuva_leve`    | 0.25   | moisture +5                        |
//! | `chuva_forte`   | 0.10   | moisture +12, fertility -1         |
//! | `seca`          | 0.15   | moisture -10, biodiversity -2      |
//! | `calor_intenso` | 0.12   | moisture -8, organic matter -1     |
//! | `clima_ameno`   | 0.30   | biodiversity +1                    |
//! | `neblina`       | 0.08   | moisture +2                        |
//!
//! Effects are fixed shifts, not scaled by anything, and are applied to
//! every terrain and quadrant row without neighbour propagation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use eko_types::{ParameterChange, SoilParameter, SoilParameters};

use crate::error::WorldError;

/// Default probability that a roll produces no event.
pub const DEFAULT_NO_EVENT_PROBABILITY: f64 = 0.4;

/// Whether an effect raises or lowers its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Adds the magnitude.
    Increase,
    /// Subtracts the magnitude.
    Decrease,
}

/// A fixed shift of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateEffect {
    /// The parameter affected.
    pub parameter: SoilParameter,
    /// Size of the shift.
    pub magnitude: f64,
    /// Sign of the shift.
    pub direction: Direction,
}

impl ClimateEffect {
    /// The shift as a signed delta.
    pub fn signed(&self) -> f64 {
        match self.direction {
            Direction::Increase => self.magnitude,
            Direction::Decrease => -self.magnitude,
        }
    }
}

/// One entry of the climate catalogue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateEvent {
    /// Event key, recorded in the climate history.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Relative selection weight.
    pub weight: f64,
    /// Shifts applied to every soil row.
    pub effects: &'static [ClimateEffect],
}

const fn up(parameter: SoilParameter, magnitude: f64) -> ClimateEffect {
    ClimateEffect {
        parameter,
        magnitude,
        direction: Direction::Increase,
    }
}

const fn down(parameter: SoilParameter, magnitude: f64) -> ClimateEffect {
    ClimateEffect {
        parameter,
        magnitude,
        direction: Direction::Decrease,
    }
}

/// The fixed climate catalogue.
pub static CLIMATE_EVENTS: [ClimateEvent; 6] = [
    ClimateEvent {
        name: "chuva_leve",
        description: "Chuva leve caindo sobre a região",
        weight: 0.25,
        effects: &[up(SoilParameter::SoilMoisture, 5.0)],
    },
    ClimateEvent {
        name: "chuva_forte",
        description: "Fortes chuvas atingindo a região",
        weight: 0.10,
        effects: &[
            up(SoilParameter::SoilMoisture, 12.0),
            down(SoilParameter::Fertility, 1.0),
        ],
    },
    ClimateEvent {
        name: "seca",
        description: "Período de seca na região",
        weight: 0.15,
        effects: &[
            down(SoilParameter::SoilMoisture, 10.0),
            down(SoilParameter::Biodiversity, 2.0),
        ],
    },
    ClimateEvent {
        name: "calor_intenso",
        description: "Onda de calor atingindo a região",
        weight: 0.12,
        effects: &[
            down(SoilParameter::SoilMoisture, 8.0),
            down(SoilParameter::OrganicMatter, 1.0),
        ],
    },
    ClimateEvent {
        name: "clima_ameno",
        description: "Clima agradável e ameno na região",
        weight: 0.30,
        effects: &[up(SoilParameter::Biodiversity, 1.0)],
    },
    ClimateEvent {
        name: "neblina",
        description: "Neblina cobrindo a região",
        weight: 0.08,
        effects: &[up(SoilParameter::SoilMoisture, 2.0)],
    },
];

/// Look up a catalogue event by name.
pub fn event_by_name(name: &str) -> Result<&'static ClimateEvent, WorldError> {
    CLIMATE_EVENTS
        .iter()
        .find(|event| event.name == name)
        .ok_or_else(|| WorldError::UnknownClimateEvent(name.to_owned()))
}

/// Rolls climate events from the catalogue.
#[derive(Debug, Clone, Copy)]
pub struct ClimateRoller {
    no_event_probability: f64,
}

impl Default for ClimateRoller {
    fn default() -> Self {
        Self::new(DEFAULT_NO_EVENT_PROBABILITY)
    }
}

impl ClimateRoller {
    /// Create a roller. The probability is clamped into `[0, 1]`.
    pub fn new(no_event_probability: f64) -> Self {
        Self {
            no_event_probability: no_event_probability.clamp(0.0, 1.0),
        }
    }

    /// Probability that [`roll`](Self::roll) returns `None`.
    pub const fn no_event_probability(&self) -> f64 {
        self.no_event_probability
    }

    /// Roll for this half-day. `None` means the weather stays quiet.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'static ClimateEvent> {
        if rng.random::<f64>() < self.no_event_probability {
            return None;
        }
        select_event(rng.random::<f64>())
    }
}

/// Pick an event for a uniform draw `u` in `[0, 1]` using the
/// renormalised catalogue weights.
pub fn select_event(u: f64) -> Option<&'static ClimateEvent> {
    let total: f64 = CLIMATE_EVENTS.iter().map(|e| e.weight).sum();
    let target = u.clamp(0.0, 1.0) * total;
    let mut cumulative = 0.0;
    CLIMATE_EVENTS
        .iter()
        .find(|event| {
            cumulative += event.weight;
            target < cumulative
        })
        // u == 1.0 falls past the last bucket.
        .or_else(|| CLIMATE_EVENTS.last())
}

/// Apply an event's shifts to one soil row, clamped to bounds.
pub fn apply_event(soil: &mut SoilParameters, event: &ClimateEvent) -> Vec<ParameterChange> {
    event
        .effects
        .iter()
        .map(|effect| soil.apply_delta(effect.parameter, effect.signed()))
        .collect()
}
