//! Shared domain types.
//!
//! Everything here is derived in memory and recomputed on every run; nothing
//! is persisted between invocations.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::AppError;

/// Number of remaining policy decisions in the current cycle.
///
/// Known simplification: the real meeting calendar varies over time, this is
/// a fixed count rather than something derived from it.
pub const MEETING_COUNT: u32 = 5;

/// Neutral real-rate reference bands (percentage points) drawn on the chart.
pub const NEUTRAL_RATE_BANDS: [f64; 3] = [1.8, 2.6, 3.4];

/// A single (date, value) point returned by a series source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A calendar month, keyed by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn from_ymd(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Inverse of [`Month::ordinal`].
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        let year = ordinal.div_euclid(12);
        let month0 = ordinal.rem_euclid(12) as u32;
        Self::from_ymd(year, month0 + 1)
    }

    pub fn first_day(self) -> NaiveDate {
        self.0
    }

    /// Months since year 0; consecutive months differ by exactly 1.
    pub fn ordinal(self) -> i32 {
        self.0.year() * 12 + self.0.month0() as i32
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

/// One value per calendar month, iterated in ascending month order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    values: BTreeMap<Month, f64>,
}

impl MonthlySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one for that month if any.
    pub fn insert(&mut self, month: Month, value: f64) -> Option<f64> {
        self.values.insert(month, value)
    }

    pub fn get(&self, month: Month) -> Option<f64> {
        self.values.get(&month).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Month, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    pub fn first_month(&self) -> Option<Month> {
        self.values.keys().next().copied()
    }

    pub fn last_month(&self) -> Option<Month> {
        self.values.keys().next_back().copied()
    }
}

impl FromIterator<(Month, f64)> for MonthlySeries {
    fn from_iter<I: IntoIterator<Item = (Month, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// How raw observations are bucketed onto months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignPolicy {
    /// Attribute each observation to the following month (survey/lag series).
    Shift,
    /// Average all observations within a month.
    Mean,
}

/// The four fixed input series and their semantic role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesRole {
    /// 12-month-ahead inflation expectation (survey).
    InflationExpectation,
    /// Overnight interbank funding rate.
    OvernightRate,
    /// Central bank policy target rate.
    PolicyTarget,
    /// Survey forecast of the policy rate at year end.
    YearEndForecast,
}

impl SeriesRole {
    pub const ALL: [SeriesRole; 4] = [
        SeriesRole::InflationExpectation,
        SeriesRole::OvernightRate,
        SeriesRole::PolicyTarget,
        SeriesRole::YearEndForecast,
    ];

    /// Banxico SIE series identifier.
    pub fn series_id(self) -> &'static str {
        match self {
            SeriesRole::InflationExpectation => "SR14194",
            SeriesRole::OvernightRate => "SF331451",
            SeriesRole::PolicyTarget => "SF61745",
            SeriesRole::YearEndForecast => "SR14680",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SeriesRole::InflationExpectation => "inflation expectation 12m",
            SeriesRole::OvernightRate => "overnight rate",
            SeriesRole::PolicyTarget => "policy target",
            SeriesRole::YearEndForecast => "year-end rate forecast",
        }
    }

    pub fn policy(self) -> AlignPolicy {
        match self {
            SeriesRole::InflationExpectation | SeriesRole::YearEndForecast => AlignPolicy::Shift,
            SeriesRole::OvernightRate | SeriesRole::PolicyTarget => AlignPolicy::Mean,
        }
    }
}

/// Inclusive calendar date range for fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::config(format!(
                "Invalid date range: start {start} is after end {end}."
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// One month of the merged rate frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateRow {
    pub month: Month,
    /// Monthly mean of the overnight rate.
    pub overnight_rate: f64,
    /// Inflation expectation attributed to this month (possibly carried forward).
    pub expectation: f64,
    /// `overnight_rate - expectation`.
    pub ex_ante: f64,
    /// True when `expectation` was carried forward from an earlier month.
    pub expectation_filled: bool,
}

/// Bookkeeping about the merge, reported for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Months present in the overnight-rate series.
    pub driving_months: usize,
    /// Months whose expectation was forward-filled.
    pub filled_months: usize,
    /// Leading months with no prior expectation (dropped).
    pub unfilled_months: usize,
}

/// Ex-ante real rate by month, ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateFrame {
    pub rows: Vec<RateRow>,
    pub stats: MergeStats,
}

impl RateFrame {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&RateRow> {
        self.rows.last()
    }
}

/// Expected average policy-rate reduction per remaining meeting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReductionEstimate {
    pub month: Month,
    pub policy_target: f64,
    pub year_end_forecast: f64,
    /// `policy_target - year_end_forecast`.
    pub gap: f64,
    pub meeting_count: u32,
    /// `gap / meeting_count`.
    pub average_reduction_per_meeting: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_normalizes_to_first_day() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        let m = Month::of(d);
        assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(m.to_string(), "2024-03");
    }

    #[test]
    fn month_ordinal_round_trips_across_year_boundary() {
        let dec = Month::from_ymd(2023, 12).unwrap();
        let jan = Month::from_ymd(2024, 1).unwrap();
        assert_eq!(jan.ordinal() - dec.ordinal(), 1);
        assert_eq!(Month::from_ordinal(jan.ordinal()), Some(jan));
        assert_eq!(Month::from_ordinal(dec.ordinal()), Some(dec));
    }

    #[test]
    fn survey_roles_use_shift_policy() {
        assert_eq!(SeriesRole::InflationExpectation.policy(), AlignPolicy::Shift);
        assert_eq!(SeriesRole::YearEndForecast.policy(), AlignPolicy::Shift);
        assert_eq!(SeriesRole::OvernightRate.policy(), AlignPolicy::Mean);
        assert_eq!(SeriesRole::PolicyTarget.policy(), AlignPolicy::Mean);
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(DateRange::new(a, b).is_err());
        let r = DateRange::new(b, a).unwrap();
        assert!(r.contains(a));
        assert!(r.contains(b));
        assert!(!r.contains(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
    }
}
