//! Resource-effect calculator.
//!
//! Each [`InputType`] maps to a small table of linear rules. Applying
//! `quantity` units of an input shifts each affected parameter by
//! `base + factor * quantity`, clamped to the parameter's bounds:
//!
//! | Input        | Parameter        | Base | Factor |
//! |--------------|------------------|------|--------|
//! | water        | `soil_moisture`  | 0    | 0.8    |
//! | fertilizer   | `fertility`      | 1    | 0.5    |
//! | compost      | `organic_matter` | 1    | 0.7    |
//! | compost      | `fertility`      | 0    | 0.2    |
//! | lime         | `soil_ph`        | 0.1  | 0.05   |
//! | mulch        | `soil_moisture`  | 0    | 0.3    |
//! | mulch        | `organic_matter` | 0    | 0.2    |
//!
//! Water also resets the target planting's drought counter, which is a
//! planting-level effect handled by the caller.

use serde::{Deserialize, Serialize};

use eko_types::{InputType, ParameterChange, SoilParameter, SoilParameters};

use crate::error::WorldError;

/// One linear effect of an input on a soil parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectRule {
    /// The parameter affected.
    pub parameter: SoilParameter,
    /// Fixed shift applied regardless of quantity.
    pub base: f64,
    /// Shift per unit of quantity.
    pub quantity_factor: f64,
}

const fn rule(parameter: SoilParameter, base: f64, quantity_factor: f64) -> EffectRule {
    EffectRule {
        parameter,
        base,
        quantity_factor,
    }
}

static WATER: [EffectRule; 1] = [rule(SoilParameter::SoilMoisture, 0.0, 0.8)];
static FERTILIZER: [EffectRule; 1] = [rule(SoilParameter::Fertility, 1.0, 0.5)];
static COMPOST: [EffectRule; 2] = [
    rule(SoilParameter::OrganicMatter, 1.0, 0.7),
    rule(SoilParameter::Fertility, 0.0, 0.2),
];
static LIME: [EffectRule; 1] = [rule(SoilParameter::SoilPh, 0.1, 0.05)];
static MULCH: [EffectRule; 2] = [
    rule(SoilParameter::SoilMoisture, 0.0, 0.3),
    rule(SoilParameter::OrganicMatter, 0.0, 0.2),
];

/// The effect rules for an input type.
pub fn rules_for(input: InputType) -> &'static [EffectRule] {
    match input {
        InputType::Water => &WATER,
        InputType::Fertilizer => &FERTILIZER,
        InputType::Compost => &COMPOST,
        InputType::Lime => &LIME,
        InputType::Mulch => &MULCH,
    }
}

/// Whether applying this input resets the planting's `days_sem_rega`.
pub const fn resets_drought_counter(input: InputType) -> bool {
    matches!(input, InputType::Water)
}

/// The unclamped shift an input asks for on one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestedEffect {
    /// The parameter affected.
    pub parameter: SoilParameter,
    /// `base + factor * quantity`.
    pub requested: f64,
}

/// Compute the requested shifts for `quantity` units of `input`.
///
/// Rejects negative and non-finite quantities.
pub fn calculate_effects(
    input: InputType,
    quantity: f64,
) -> Result<Vec<RequestedEffect>, WorldError> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(WorldError::InvalidQuantity { input, quantity });
    }
    Ok(rules_for(input)
        .iter()
        .map(|r| RequestedEffect {
            parameter: r.parameter,
            requested: r.quantity_factor.mul_add(quantity, r.base),
        })
        .collect())
}

/// Apply previously calculated effects to a soil row, clamping each result.
pub fn apply_effects(soil: &mut SoilParameters, effects: &[RequestedEffect]) -> Vec<ParameterChange> {
    effects
        .iter()
        .map(|effect| soil.apply_delta(effect.parameter, effect.requested))
        .collect()
}
