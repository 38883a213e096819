//! Wall-clock firing times for scheduled jobs.

use chrono::{DateTime, Days, NaiveTime, Utc};

/// Fires at minute zero of the listed UTC hours, every day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cadence {
    hours: Vec<u32>,
}

impl Cadence {
    /// Fire at each hour in `hours`. Hours outside `0..24` are dropped.
    pub fn at_hours(hours: impl IntoIterator<Item = u32>) -> Self {
        let mut hours: Vec<u32> = hours.into_iter().filter(|h| *h < 24).collect();
        hours.sort_unstable();
        hours.dedup();
        Self { hours }
    }

    /// Fire every `step` hours starting at midnight.
    pub fn every_hours(step: u32) -> Self {
        let step = usize::try_from(step.max(1)).unwrap_or(1);
        Self::at_hours((0..24).step_by(step))
    }

    /// Fire once a day at `hour`.
    pub fn daily_at(hour: u32) -> Self {
        Self::at_hours([hour])
    }

    /// The configured hours, ascending.
    pub fn hours(&self) -> &[u32] {
        &self.hours
    }

    /// The first firing strictly after `now`, or `None` when no hours are
    /// configured.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        [Some(today), today.checked_add_days(Days::new(1))]
            .into_iter()
            .flatten()
            .flat_map(|day| {
                self.hours.iter().filter_map(move |hour| {
                    NaiveTime::from_hms_opt(*hour, 0, 0).map(|t| day.and_time(t).and_utc())
                })
            })
            .find(|candidate| *candidate > now)
    }
}
