//! Soil health index, category and alerts.
//!
//! Six parameters are scored 0-100 against an ideal range and a wider
//! warning range, then combined as a weighted mean:
//!
//! - inside the ideal range: 100
//! - between ideal and warning: linear from 100 down to 50
//! - outside the warning range: linear from 50 down to 0 at the domain edge
//!
//! Compaction's ranges already sit at the low end of its domain, so low
//! compaction scores high without any inversion.

use std::fmt;

use serde::{Deserialize, Serialize};

use eko_types::{SoilParameter, SoilParameters};

/// Ideal and warning ranges for one scored parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthRange {
    /// The parameter scored.
    pub parameter: SoilParameter,
    /// Weight in the overall index.
    pub weight: f64,
    /// Lower edge of the ideal range.
    pub ideal_min: f64,
    /// Upper edge of the ideal range.
    pub ideal_max: f64,
    /// Below this the parameter is critical.
    pub warning_min: f64,
    /// Above this the parameter is critical.
    pub warning_max: f64,
}

const fn range(
    parameter: SoilParameter,
    weight: f64,
    ideal: (f64, f64),
    warning: (f64, f64),
) -> HealthRange {
    HealthRange {
        parameter,
        weight,
        ideal_min: ideal.0,
        ideal_max: ideal.1,
        warning_min: warning.0,
        warning_max: warning.1,
    }
}

/// The scored parameters with their weights and ranges.
pub const HEALTH_RANGES: [HealthRange; 6] = [
    range(SoilParameter::SoilMoisture, 1.0, (30.0, 70.0), (15.0, 85.0)),
    range(SoilParameter::Fertility, 1.2, (40.0, 80.0), (20.0, 90.0)),
    range(SoilParameter::SoilPh, 0.8, (5.5, 7.0), (5.0, 8.0)),
    range(SoilParameter::OrganicMatter, 1.1, (30.0, 70.0), (10.0, 90.0)),
    range(SoilParameter::Biodiversity, 0.9, (40.0, 100.0), (20.0, 100.0)),
    range(SoilParameter::Compaction, 0.7, (0.0, 40.0), (0.0, 70.0)),
];

impl HealthRange {
    /// Score `value` from 0 to 100.
    pub fn score(&self, value: f64) -> f64 {
        let (lo, hi) = self.parameter.bounds();
        let score = if (self.ideal_min..=self.ideal_max).contains(&value) {
            100.0
        } else if value < self.warning_min {
            ratio(value - lo, self.warning_min - lo) * 50.0
        } else if value > self.warning_max {
            (1.0 - ratio(value - self.warning_max, hi - self.warning_max)) * 50.0
        } else if value < self.ideal_min {
            ratio(value - self.warning_min, self.ideal_min - self.warning_min).mul_add(50.0, 50.0)
        } else {
            100.0 - ratio(value - self.ideal_max, self.warning_max - self.ideal_max) * 50.0
        };
        score.clamp(0.0, 100.0)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        (numerator / denominator).clamp(0.0, 1.0)
    }
}

/// Weighted soil health index, 0-100, rounded to one decimal.
pub fn health_index(soil: &SoilParameters) -> f64 {
    let (total, weights) = HEALTH_RANGES.iter().fold((0.0, 0.0), |(total, weights), r| {
        (
            r.score(soil.get(r.parameter)).mul_add(r.weight, total),
            weights + r.weight,
        )
    });
    if weights <= 0.0 {
        return 0.0;
    }
    (total / weights * 10.0).round() / 10.0
}

/// Qualitative bucket for a health index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCategory {
    /// 90 and above.
    Excelente,
    /// 75 to 90.
    MuitoBom,
    /// 60 to 75.
    Bom,
    /// 45 to 60.
    Regular,
    /// 30 to 45.
    Pobre,
    /// 15 to 30.
    MuitoPobre,
    /// Below 15.
    Critico,
}

impl HealthCategory {
    /// Bucket an index.
    pub fn from_index(index: f64) -> Self {
        match index {
            i if i >= 90.0 => Self::Excelente,
            i if i >= 75.0 => Self::MuitoBom,
            i if i >= 60.0 => Self::Bom,
            i if i >= 45.0 => Self::Regular,
            i if i >= 30.0 => Self::Pobre,
            i if i >= 15.0 => Self::MuitoPobre,
            _ => Self::Critico,
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excelente => "Excelente",
            Self::MuitoBom => "Muito Bom",
            Self::Bom => "Bom",
            Self::Regular => "Regular",
            Self::Pobre => "Pobre",
            Self::MuitoPobre => "Muito Pobre",
            Self::Critico => "Crítico",
        }
    }
}

impl fmt::Display for HealthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How far outside its warning range a parameter is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Outside the warning range.
    Alerta,
    /// Far outside the warning range.
    Critico,
}

/// A parameter outside its warning range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilAlert {
    /// The offending parameter.
    pub parameter: SoilParameter,
    /// Its current value.
    pub value: f64,
    /// The ideal range it should be in.
    pub ideal_range: (f64, f64),
    /// How bad it is.
    pub severity: AlertSeverity,
    /// Player-facing message.
    pub message: String,
}

/// Full health analysis of one soil row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilHealthReport {
    /// Weighted index, 0-100.
    pub index: f64,
    /// Bucket for the index.
    pub category: HealthCategory,
    /// Parameters outside their warning range.
    pub alerts: Vec<SoilAlert>,
    /// Suggested corrective actions.
    pub recommendations: Vec<String>,
}

const fn display_name(parameter: SoilParameter) -> &'static str {
    match parameter {
        SoilParameter::SoilMoisture => "Umidade do Solo",
        SoilParameter::Fertility => "Fertilidade",
        SoilParameter::SoilPh => "pH do Solo",
        SoilParameter::OrganicMatter => "Matéria Orgânica",
        SoilParameter::Biodiversity => "Biodiversidade",
        SoilParameter::Compaction => "Compactação",
        SoilParameter::Coverage => "Cobertura",
    }
}

fn low_recommendation(parameter: SoilParameter, value: f64) -> Option<&'static str> {
    match parameter {
        SoilParameter::SoilMoisture => Some("Aplicar água para aumentar a umidade do solo"),
        SoilParameter::Fertility => Some("Aplicar fertilizante para aumentar a fertilidade"),
        SoilParameter::SoilPh if value < 5.5 => Some("Aplicar calcário para aumentar o pH do solo"),
        SoilParameter::OrganicMatter => Some("Aplicar composto para aumentar a matéria orgânica"),
        _ => None,
    }
}

fn high_recommendation(parameter: SoilParameter, value: f64) -> Option<&'static str> {
    match parameter {
        SoilParameter::SoilMoisture => Some("Reduzir rega e melhorar drenagem do solo"),
        SoilParameter::SoilPh if value > 7.5 => {
            Some("O solo está muito alcalino, considere aplicar enxofre")
        }
        SoilParameter::Compaction => {
            Some("O solo está muito compactado, considere aerar ou revolver")
        }
        _ => None,
    }
}

/// Score `soil`, bucket it and list alerts with recommendations.
pub fn analyze(soil: &SoilParameters) -> SoilHealthReport {
    let index = health_index(soil);
    let mut alerts = Vec::new();
    let mut recommendations = Vec::new();

    for r in &HEALTH_RANGES {
        let value = soil.get(r.parameter);
        let name = display_name(r.parameter);
        let (severity, message, recommendation) = if value < r.warning_min {
            let severity = if value < r.warning_min * 0.5 {
                AlertSeverity::Critico
            } else {
                AlertSeverity::Alerta
            };
            (
                severity,
                format!("{name} está muito baixo ({value:.1})"),
                low_recommendation(r.parameter, value),
            )
        } else if value > r.warning_max {
            let severity = if value > r.warning_max * 1.5 {
                AlertSeverity::Critico
            } else {
                AlertSeverity::Alerta
            };
            (
                severity,
                format!("{name} está muito alto ({value:.1})"),
                high_recommendation(r.parameter, value),
            )
        } else {
            continue;
        };
        alerts.push(SoilAlert {
            parameter: r.parameter,
            value,
            ideal_range: (r.ideal_min, r.ideal_max),
            severity,
            message,
        });
        if let Some(text) = recommendation {
            recommendations.push(text.to_owned());
        }
    }

    SoilHealthReport {
        index,
        category: HealthCategory::from_index(index),
        alerts,
        recommendations,
    }
}
