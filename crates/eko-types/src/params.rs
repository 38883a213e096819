//! The bounded soil parameter set shared by terrains and quadrants.

use serde::{Deserialize, Serialize};

use crate::enums::SoilParameter;

/// Soil state of one terrain or one quadrant.
///
/// Every continuous field lives inside [`SoilParameter::bounds`]. Mutators
/// on this type clamp, so a value obtained through them is always in range;
/// direct field writes are followed by [`SoilParameters::clamp_all`] in the
/// stores. Missing fields deserialize to their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilParameters {
    /// Soil moisture, 0-100.
    pub soil_moisture: f64,
    /// Fertility, 0-100.
    pub fertility: f64,
    /// Soil pH, 4.0-9.0.
    pub soil_ph: f64,
    /// Organic matter, 0-100.
    pub organic_matter: f64,
    /// Compaction, 0-100.
    pub compaction: f64,
    /// Biodiversity, 0-100.
    pub biodiversity: f64,
    /// Vegetation coverage, 0-100.
    pub coverage: f64,
    /// Number of regenerative actions (plantings, waterings) performed.
    pub regeneration_cycles: u32,
    /// Number of species that appeared without being planted.
    pub spontaneous_species_count: u32,
}

impl Default for SoilParameters {
    fn default() -> Self {
        Self {
            soil_moisture: 0.0,
            fertility: 0.0,
            soil_ph: 7.0,
            organic_matter: 0.0,
            compaction: 0.0,
            biodiversity: 0.0,
            coverage: 0.0,
            regeneration_cycles: 0,
            spontaneous_species_count: 0,
        }
    }
}

/// A single parameter mutation, as reported back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterChange {
    /// Which parameter changed.
    pub parameter: SoilParameter,
    /// Value before the change.
    pub before: f64,
    /// Value after the (clamped) change.
    pub after: f64,
}

impl ParameterChange {
    /// The delta that actually landed (`after - before`).
    pub fn applied(&self) -> f64 {
        self.after - self.before
    }
}

impl SoilParameters {
    /// Read one continuous parameter.
    pub const fn get(&self, parameter: SoilParameter) -> f64 {
        match parameter {
            SoilParameter::SoilMoisture => self.soil_moisture,
            SoilParameter::Fertility => self.fertility,
            SoilParameter::SoilPh => self.soil_ph,
            SoilParameter::OrganicMatter => self.organic_matter,
            SoilParameter::Compaction => self.compaction,
            SoilParameter::Biodiversity => self.biodiversity,
            SoilParameter::Coverage => self.coverage,
        }
    }

    fn slot_mut(&mut self, parameter: SoilParameter) -> &mut f64 {
        match parameter {
            SoilParameter::SoilMoisture => &mut self.soil_moisture,
            SoilParameter::Fertility => &mut self.fertility,
            SoilParameter::SoilPh => &mut self.soil_ph,
            SoilParameter::OrganicMatter => &mut self.organic_matter,
            SoilParameter::Compaction => &mut self.compaction,
            SoilParameter::Biodiversity => &mut self.biodiversity,
            SoilParameter::Coverage => &mut self.coverage,
        }
    }

    /// Overwrite one parameter, clamped to its bounds.
    pub fn set_clamped(&mut self, parameter: SoilParameter, value: f64) {
        *self.slot_mut(parameter) = parameter.clamp(value);
    }

    /// Add `delta` to one parameter, clamping the result, and report what
    /// actually changed.
    pub fn apply_delta(&mut self, parameter: SoilParameter, delta: f64) -> ParameterChange {
        let before = self.get(parameter);
        let after = parameter.clamp(before + delta);
        *self.slot_mut(parameter) = after;
        ParameterChange {
            parameter,
            before,
            after,
        }
    }

    /// Force every continuous field back inside its bounds.
    pub fn clamp_all(&mut self) {
        for parameter in SoilParameter::ALL {
            let value = self.get(parameter);
            self.set_clamped(parameter, value);
        }
    }

    /// Whether every continuous field is finite and inside its bounds.
    pub fn is_within_bounds(&self) -> bool {
        SoilParameter::ALL.into_iter().all(|parameter| {
            let value = self.get(parameter);
            let (lo, hi) = parameter.bounds();
            value.is_finite() && value >= lo && value <= hi
        })
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn default_is_in_bounds_with_neutral_ph() {
        let soil = SoilParameters::default();
        assert!(soil.is_within_bounds());
        assert!((soil.soil_ph - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_delta_clamps_and_reports() {
        let mut soil = SoilParameters {
            soil_moisture: 95.0,
            ..SoilParameters::default()
        };
        let change = soil.apply_delta(SoilParameter::SoilMoisture, 20.0);
        assert!((change.before - 95.0).abs() < f64::EPSILON);
        assert!((change.after - 100.0).abs() < f64::EPSILON);
        assert!((change.applied() - 5.0).abs() < f64::EPSILON);
        assert!((soil.soil_moisture - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_negative_delta_stops_at_zero() {
        let mut soil = SoilParameters {
            biodiversity: 1.0,
            ..SoilParameters::default()
        };
        let change = soil.apply_delta(SoilParameter::Biodiversity, -2.0);
        assert!(change.after.abs() < f64::EPSILON);
        assert!(soil.is_within_bounds());
    }

    #[test]
    fn clamp_all_repairs_direct_writes() {
        let mut soil = SoilParameters {
            soil_ph: 11.0,
            coverage: -3.0,
            fertility: f64::NAN,
            ..SoilParameters::default()
        };
        assert!(!soil.is_within_bounds());
        soil.clamp_all();
        assert!(soil.is_within_bounds());
        assert!((soil.soil_ph - 9.0).abs() < f64::EPSILON);
    }
}
