//! Bucketing observations onto calendar months.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use tracing::warn;

use crate::domain::{AlignPolicy, Month, MonthlySeries, Observation, SeriesRole};

/// Align a series according to its role's policy.
pub fn align(role: SeriesRole, observations: &[Observation]) -> MonthlySeries {
    match role.policy() {
        AlignPolicy::Shift => align_shift(observations),
        AlignPolicy::Mean => align_mean(observations),
    }
}

/// Advance a date by one calendar month, clamping to the month end
/// (Jan 31 -> Feb 28/29).
pub fn shift_one_month(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(1))
}

/// Key each observation by the month after its date, keeping the value as-is.
///
/// Observations are expected in ascending date order; when two land in the
/// same month the later one wins.
pub fn align_shift(observations: &[Observation]) -> MonthlySeries {
    let mut out = MonthlySeries::new();
    let mut collisions = 0usize;
    for obs in observations {
        let Some(shifted) = shift_one_month(obs.date) else {
            continue;
        };
        if out.insert(Month::of(shifted), obs.value).is_some() {
            collisions += 1;
        }
    }
    if collisions > 0 {
        warn!(collisions, "several survey observations mapped to the same month; kept the latest");
    }
    out
}

/// Average all observations falling in each calendar month.
pub fn align_mean(observations: &[Observation]) -> MonthlySeries {
    let mut acc: BTreeMap<Month, (f64, usize)> = BTreeMap::new();
    for obs in observations {
        let entry = acc.entry(Month::of(obs.date)).or_insert((0.0, 0));
        entry.0 += obs.value;
        entry.1 += 1;
    }
    acc.into_iter()
        .map(|(month, (sum, n))| (month, sum / n as f64))
        .collect()
}
