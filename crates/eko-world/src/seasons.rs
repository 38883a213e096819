//! The four-season cycle and its multiplicative factors.
//!
//! Seasons are an append-only log. The current season is the latest
//! record; once it has lasted [`SEASON_DURATION_DAYS`] the next season in
//! the cycle is appended. With no record at all every factor is neutral.
//!
//! | Season    | Moisture | Organic | Bio | Fertility | Germination | Maturation |
//! |-----------|----------|---------|-----|-----------|-------------|------------|
//! | VERAO     | 1.5      | 1.2     | 1.1 | 0.9       | 0.85        | 0.8        |
//! | OUTONO    | 0.9      | 1.3     | 0.9 | 1.1       | 1.05        | 1.1        |
//! | INVERNO   | 0.7      | 0.8     | 1.2 | 1.0       | 1.3         | 1.4        |
//! | PRIMAVERA | 1.0      | 1.0     | 0.7 | 0.8       | 0.9         | 0.95       |

use chrono::{DateTime, Duration, Utc};

use eko_types::{SeasonFactors, SeasonId, SeasonKind, SeasonRecord};

/// Length of every season.
pub const SEASON_DURATION_DAYS: i64 = 28;

/// The season created when the log is empty.
pub const FIRST_SEASON: SeasonKind = SeasonKind::Verao;

/// Factors in effect during `kind`.
pub const fn factors_for(kind: SeasonKind) -> SeasonFactors {
    match kind {
        SeasonKind::Verao => SeasonFactors {
            soil_moisture: 1.5,
            organic_matter: 1.2,
            biodiversity: 1.1,
            fertility: 0.9,
            germination: 0.85,
            maturation: 0.8,
        },
        SeasonKind::Outono => SeasonFactors {
            soil_moisture: 0.9,
            organic_matter: 1.3,
            biodiversity: 0.9,
            fertility: 1.1,
            germination: 1.05,
            maturation: 1.1,
        },
        SeasonKind::Inverno => SeasonFactors {
            soil_moisture: 0.7,
            organic_matter: 0.8,
            biodiversity: 1.2,
            fertility: 1.0,
            germination: 1.3,
            maturation: 1.4,
        },
        SeasonKind::Primavera => SeasonFactors {
            soil_moisture: 1.0,
            organic_matter: 1.0,
            biodiversity: 0.7,
            fertility: 0.8,
            germination: 0.9,
            maturation: 0.95,
        },
    }
}

/// Human-readable description of `kind`.
pub const fn description_for(kind: SeasonKind) -> &'static str {
    match kind {
        SeasonKind::Verao => "Período quente e seco. Aumento da evaporação de água.",
        SeasonKind::Outono => "Temperaturas amenas com aumento gradual de precipitação.",
        SeasonKind::Inverno => "Período mais frio e úmido. Redução no metabolismo vegetal.",
        SeasonKind::Primavera => {
            "Período de renovação e crescimento. Condições ideais para plantas."
        }
    }
}

/// Build a fresh record for `kind` starting at `start_date`.
pub fn new_record(kind: SeasonKind, start_date: DateTime<Utc>) -> SeasonRecord {
    SeasonRecord {
        id: SeasonId::new(),
        kind,
        description: description_for(kind).to_owned(),
        start_date,
        factors: factors_for(kind),
    }
}

/// Factors of the current season, or neutral when none exists.
pub fn current_factors(current: Option<&SeasonRecord>) -> SeasonFactors {
    current.map_or(SeasonFactors::NEUTRAL, |season| season.factors)
}

/// What the daily season check should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonDecision {
    /// The log is empty; create the first season.
    CreateFirst(SeasonKind),
    /// The current season has run its course; append the next one.
    Rollover {
        /// The season that ended.
        from: SeasonKind,
        /// The season to append.
        to: SeasonKind,
    },
    /// Nothing to do yet.
    Unchanged,
}

/// Decide whether the season log needs a new record at `now`.
pub fn decide(current: Option<&SeasonRecord>, now: DateTime<Utc>, duration: Duration) -> SeasonDecision {
    match current {
        None => SeasonDecision::CreateFirst(FIRST_SEASON),
        Some(season) if now.signed_duration_since(season.start_date) >= duration => {
            SeasonDecision::Rollover {
                from: season.kind,
                to: season.kind.next(),
            }
        }
        Some(_) => SeasonDecision::Unchanged,
    }
}

/// The standard season length as a [`Duration`].
pub fn standard_duration() -> Duration {
    Duration::days(SEASON_DURATION_DAYS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_log_creates_summer() {
        assert_eq!(
            decide(None, at(1), standard_duration()),
            SeasonDecision::CreateFirst(SeasonKind::Verao)
        );
    }

    #[test]
    fn season_rolls_over_at_exactly_28_days() {
        let summer = new_record(SeasonKind::Verao, at(1));
        assert_eq!(decide(Some(&summer), at(28), standard_duration()), SeasonDecision::Unchanged);
        assert_eq!(
            decide(Some(&summer), at(29), standard_duration()),
            SeasonDecision::Rollover {
                from: SeasonKind::Verao,
                to: SeasonKind::Outono
            }
        );
    }

    #[test]
    fn spring_rolls_back_to_summer() {
        let spring = new_record(SeasonKind::Primavera, at(1));
        assert_eq!(
            decide(Some(&spring), at(30), standard_duration()),
            SeasonDecision::Rollover {
                from: SeasonKind::Primavera,
                to: SeasonKind::Verao
            }
        );
    }

    #[test]
    fn factors_default_to_neutral() {
        assert_eq!(current_factors(None), SeasonFactors::NEUTRAL);
        let winter = new_record(SeasonKind::Inverno, at(1));
        assert!((current_factors(Some(&winter)).maturation - 1.4).abs() < f64::EPSILON);
    }
}
