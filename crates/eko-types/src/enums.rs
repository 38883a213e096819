//! Enumeration types for the Eko simulation.
//!
//! The persisted spellings (`SEMENTE`, `VERAO`, `alta`, ...) are the ones
//! the game data has always used, so serde names and [`as_str`] values keep
//! them verbatim while the Rust variant names stay descriptive.
//!
//! [`as_str`]: PlantState::as_str

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Plant states
// ---------------------------------------------------------------------------

/// Growth state of a planting.
///
/// `Semente → Mudinha → Madura → Colhivel → Colhida`, with `Morta`
/// reachable from any non-terminal state. `Colhida` and `Morta` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlantState {
    /// Freshly planted seed.
    Semente,
    /// Germinated seedling.
    Mudinha,
    /// Mature plant.
    Madura,
    /// Ready to harvest.
    Colhivel,
    /// Harvested (terminal).
    Colhida,
    /// Dead (terminal).
    Morta,
}

impl PlantState {
    /// Every state, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Semente,
        Self::Mudinha,
        Self::Madura,
        Self::Colhivel,
        Self::Colhida,
        Self::Morta,
    ];

    /// Whether no further transitions can happen from this state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Colhida | Self::Morta)
    }

    /// The persisted spelling of this state.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Semente => "SEMENTE",
            Self::Mudinha => "MUDINHA",
            Self::Madura => "MADURA",
            Self::Colhivel => "COLHIVEL",
            Self::Colhida => "COLHIDA",
            Self::Morta => "MORTA",
        }
    }

    /// Parse a persisted spelling (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for PlantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Drought tolerance
// ---------------------------------------------------------------------------

/// How many consecutive days without water a species survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DroughtTolerance {
    /// Survives up to 7 dry days.
    Alta,
    /// Survives up to 4 dry days.
    #[serde(alias = "média")]
    Media,
    /// Survives up to 2 dry days.
    Baixa,
}

impl DroughtTolerance {
    /// Maximum `days_sem_rega` a planting of this tier survives; one more
    /// dry day kills it.
    pub const fn limit_days(self) -> u32 {
        match self {
            Self::Alta => 7,
            Self::Media => 4,
            Self::Baixa => 2,
        }
    }

    /// The persisted spelling of this tier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alta => "alta",
            Self::Media => "media",
            Self::Baixa => "baixa",
        }
    }
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// One of the four seasons of the agricultural year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonKind {
    /// Summer: hot and dry.
    Verao,
    /// Autumn: mild, increasing rain.
    Outono,
    /// Winter: cold and humid.
    Inverno,
    /// Spring: renewal and growth.
    Primavera,
}

impl SeasonKind {
    /// The fixed annual cycle, starting with the first season ever created.
    pub const CYCLE: [Self; 4] = [Self::Verao, Self::Outono, Self::Inverno, Self::Primavera];

    /// The season that follows this one in the cycle.
    pub const fn next(self) -> Self {
        match self {
            Self::Verao => Self::Outono,
            Self::Outono => Self::Inverno,
            Self::Inverno => Self::Primavera,
            Self::Primavera => Self::Verao,
        }
    }

    /// The persisted spelling of this season.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verao => "VERAO",
            Self::Outono => "OUTONO",
            Self::Inverno => "INVERNO",
            Self::Primavera => "PRIMAVERA",
        }
    }

    /// Parse a persisted spelling (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        Self::CYCLE
            .into_iter()
            .find(|season| season.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for SeasonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A resource a player applies to a planting's soil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Water. Raises moisture and resets the drought counter.
    #[serde(alias = "água", alias = "agua")]
    Water,
    /// Mineral fertilizer. Raises fertility.
    #[serde(alias = "fertilizante")]
    Fertilizer,
    /// Compost. Raises organic matter, with a secondary fertility effect.
    #[serde(alias = "composto")]
    Compost,
    /// Agricultural lime. Raises soil pH.
    #[serde(alias = "calcário", alias = "calcario")]
    Lime,
    /// Mulch / ground cover. Retains moisture and adds organic matter.
    #[serde(alias = "cobertura vegetal", alias = "cobertura_vegetal")]
    Mulch,
}

impl InputType {
    /// Every input type.
    pub const ALL: [Self; 5] = [
        Self::Water,
        Self::Fertilizer,
        Self::Compost,
        Self::Lime,
        Self::Mulch,
    ];

    /// The canonical (English) spelling of this input type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Fertilizer => "fertilizer",
            Self::Compost => "compost",
            Self::Lime => "lime",
            Self::Mulch => "mulch",
        }
    }

    /// The Portuguese name players and shop items use.
    pub const fn local_name(self) -> &'static str {
        match self {
            Self::Water => "água",
            Self::Fertilizer => "fertilizante",
            Self::Compost => "composto",
            Self::Lime => "calcário",
            Self::Mulch => "cobertura vegetal",
        }
    }

    /// Parse either the English or the Portuguese name (case-insensitive,
    /// accents optional for the common spellings).
    pub fn from_name(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_lowercase();
        match needle.as_str() {
            "agua" => Some(Self::Water),
            "calcario" => Some(Self::Lime),
            "cobertura_vegetal" => Some(Self::Mulch),
            other => Self::ALL
                .into_iter()
                .find(|input| input.as_str() == other || input.local_name() == other),
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Soil parameters
// ---------------------------------------------------------------------------

/// A continuous, bounded soil parameter carried by terrains and quadrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilParameter {
    /// Soil moisture, percent.
    SoilMoisture,
    /// Fertility index.
    Fertility,
    /// Soil pH.
    SoilPh,
    /// Organic matter index.
    OrganicMatter,
    /// Compaction index (lower is better).
    Compaction,
    /// Biodiversity index.
    Biodiversity,
    /// Vegetation coverage, percent.
    Coverage,
}

impl SoilParameter {
    /// Every bounded soil parameter.
    pub const ALL: [Self; 7] = [
        Self::SoilMoisture,
        Self::Fertility,
        Self::SoilPh,
        Self::OrganicMatter,
        Self::Compaction,
        Self::Biodiversity,
        Self::Coverage,
    ];

    /// The inclusive domain `(lo, hi)` of this parameter.
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Self::SoilPh => (4.0, 9.0),
            Self::SoilMoisture
            | Self::Fertility
            | Self::OrganicMatter
            | Self::Compaction
            | Self::Biodiversity
            | Self::Coverage => (0.0, 100.0),
        }
    }

    /// Clamp `value` into this parameter's domain. NaN collapses to the
    /// lower bound.
    pub fn clamp(self, value: f64) -> f64 {
        let (lo, hi) = self.bounds();
        if value.is_nan() {
            return lo;
        }
        value.clamp(lo, hi)
    }

    /// The column / field name of this parameter.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SoilMoisture => "soil_moisture",
            Self::Fertility => "fertility",
            Self::SoilPh => "soil_ph",
            Self::OrganicMatter => "organic_matter",
            Self::Compaction => "compaction",
            Self::Biodiversity => "biodiversity",
            Self::Coverage => "coverage",
        }
    }
}

impl fmt::Display for SoilParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
