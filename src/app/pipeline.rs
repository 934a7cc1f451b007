//! Shared pipeline logic used by the batch report, the CSV export and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch (4 series) -> monthly alignment -> ex-ante merge + reduction estimate
//!
//! Front-ends only decide how to present a [`RunOutput`] and what to do with
//! an error.

use tracing::info;

use crate::calc::{align, estimate_reduction, merge_rates};
use crate::data::{FetchedSeries, SeriesSource};
use crate::domain::{DateRange, MEETING_COUNT, RateFrame, ReductionEstimate, SeriesRole};
use crate::error::AppError;

/// The four fetched input series.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedInputs {
    pub inflation_expectation: FetchedSeries,
    pub overnight_rate: FetchedSeries,
    pub policy_target: FetchedSeries,
    pub year_end_forecast: FetchedSeries,
}

impl FetchedInputs {
    pub fn get(&self, role: SeriesRole) -> &FetchedSeries {
        match role {
            SeriesRole::InflationExpectation => &self.inflation_expectation,
            SeriesRole::OvernightRate => &self.overnight_rate,
            SeriesRole::PolicyTarget => &self.policy_target,
            SeriesRole::YearEndForecast => &self.year_end_forecast,
        }
    }
}

/// Derived outputs of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub rates: RateFrame,
    pub reduction: Option<ReductionEstimate>,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub range: DateRange,
    pub inputs: FetchedInputs,
    pub analysis: Analysis,
}

/// Fetch the four series sequentially. The first failure aborts the run.
pub fn fetch_inputs(source: &dyn SeriesSource, range: &DateRange) -> Result<FetchedInputs, AppError> {
    let fetch = |role: SeriesRole| -> Result<FetchedSeries, AppError> {
        let series = source.fetch_series(role.series_id(), range)?;
        info!(
            role = role.display_name(),
            series_id = role.series_id(),
            records = series.len(),
            "fetched series"
        );
        Ok(series)
    };

    Ok(FetchedInputs {
        inflation_expectation: fetch(SeriesRole::InflationExpectation)?,
        overnight_rate: fetch(SeriesRole::OvernightRate)?,
        policy_target: fetch(SeriesRole::PolicyTarget)?,
        year_end_forecast: fetch(SeriesRole::YearEndForecast)?,
    })
}

/// Pure part of the pipeline: alignment, merge and estimate.
pub fn analyze(inputs: &FetchedInputs) -> Analysis {
    let monthly = |role: SeriesRole| align(role, &inputs.get(role).observations);

    let rates = merge_rates(
        &monthly(SeriesRole::OvernightRate),
        &monthly(SeriesRole::InflationExpectation),
    );
    let reduction = estimate_reduction(
        &monthly(SeriesRole::PolicyTarget),
        &monthly(SeriesRole::YearEndForecast),
        MEETING_COUNT,
    );

    Analysis { rates, reduction }
}

/// Execute the full pipeline against `source`.
pub fn run(source: &dyn SeriesSource, range: DateRange) -> Result<RunOutput, AppError> {
    let inputs = fetch_inputs(source, &range)?;
    let analysis = analyze(&inputs);
    Ok(RunOutput {
        range,
        inputs,
        analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FixtureSource, sie_body};
    use crate::domain::Month;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap()
    }

    fn source() -> FixtureSource {
        FixtureSource::new()
            // Survey published in Dec/Feb, attributed to Jan/Mar.
            .with_body("SR14194", sie_body("SR14194", &[("01/12/2023", "4.0"), ("01/02/2024", "3.8")]))
            .with_body(
                "SF331451",
                sie_body(
                    "SF331451",
                    &[
                        ("02/01/2024", "11.20"),
                        ("03/01/2024", "11.30"),
                        ("01/02/2024", "11.25"),
                        ("01/03/2024", "N/E"),
                        ("04/03/2024", "11.00"),
                    ],
                ),
            )
            .with_body("SF61745", sie_body("SF61745", &[("03/06/2024", "11.00"), ("28/06/2024", "11.00")]))
            .with_body("SR14680", sie_body("SR14680", &[("01/05/2024", "9.50")]))
    }

    #[test]
    fn end_to_end_from_fixtures() {
        let out = run(&source(), range()).unwrap();

        assert_eq!(out.inputs.overnight_rate.dropped_unparseable, 1);

        let rows = &out.analysis.rates.rows;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].month, Month::from_ymd(2024, 1).unwrap());
        assert!((rows[0].ex_ante - 7.25).abs() < 1e-12);
        assert!((rows[1].ex_ante - 7.25).abs() < 1e-12);
        assert!(rows[1].expectation_filled);
        assert!((rows[2].ex_ante - 7.20).abs() < 1e-12);

        let est = out.analysis.reduction.unwrap();
        assert_eq!(est.month, Month::from_ymd(2024, 6).unwrap());
        assert!((est.gap - 1.5).abs() < 1e-12);
        assert!((est.average_reduction_per_meeting - 0.3).abs() < 1e-12);
    }

    #[test]
    fn rerunning_on_same_inputs_is_identical() {
        let inputs = fetch_inputs(&source(), &range()).unwrap();
        let a = analyze(&inputs);
        let b = analyze(&inputs);
        assert_eq!(a, b);
        for (ra, rb) in a.rates.rows.iter().zip(&b.rates.rows) {
            assert_eq!(ra.ex_ante.to_bits(), rb.ex_ante.to_bits());
        }
    }

    #[test]
    fn missing_series_aborts_whole_run() {
        let partial = FixtureSource::new()
            .with_body("SR14194", sie_body("SR14194", &[("01/12/2023", "4.0")]))
            .with_body("SF331451", sie_body("SF331451", &[("02/01/2024", "11.0")]));
        let err = run(&partial, range()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }

    #[test]
    fn expectations_outside_range_give_empty_frame_not_error() {
        let src = FixtureSource::new()
            .with_body("SR14194", sie_body("SR14194", &[("01/06/2024", "4.0")]))
            .with_body("SF331451", sie_body("SF331451", &[("02/01/2024", "11.0"), ("01/02/2024", "11.0")]))
            .with_body("SF61745", sie_body("SF61745", &[]))
            .with_body("SR14680", sie_body("SR14680", &[]));
        let out = run(&src, range()).unwrap();
        assert!(out.analysis.rates.is_empty());
        assert!(out.analysis.reduction.is_none());
    }
}
