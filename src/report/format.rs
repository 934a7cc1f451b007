//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the calc code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::{FetchedInputs, RunOutput};
use crate::domain::{RateFrame, ReductionEstimate, SeriesRole};

/// One line per fetched series with its record count.
pub fn format_fetch_summary(inputs: &FetchedInputs) -> String {
    let mut out = String::new();
    for role in SeriesRole::ALL {
        let series = inputs.get(role);
        out.push_str(&format!(
            "{} ({}): {} records",
            role.display_name(),
            role.series_id(),
            series.len()
        ));
        if series.dropped_unparseable > 0 || series.dropped_out_of_range > 0 {
            out.push_str(&format!(
                " (dropped {} unparseable, {} out of range)",
                series.dropped_unparseable, series.dropped_out_of_range
            ));
        }
        out.push('\n');
    }
    out
}

/// Range, frame bookkeeping and the latest ex-ante value.
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== exante - Short-Term Ex-Ante Real Rate (Banxico SIE) ===\n");
    out.push_str(&format!("Range: {}\n", run.range));
    out.push_str(&format!("Fetched:\n{}", indent(&format_fetch_summary(&run.inputs))));
    out.push_str(&format_frame_stats(&run.analysis.rates));
    out.push('\n');

    out
}

fn format_frame_stats(frame: &RateFrame) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Ex-ante: {} months | overnight months={} | expectation filled={} | unfilled={}\n",
        frame.rows.len(),
        frame.stats.driving_months,
        frame.stats.filled_months,
        frame.stats.unfilled_months,
    ));
    match frame.latest() {
        Some(row) => out.push_str(&format!(
            "Latest: {} | overnight={:.2}% | expectation={:.2}% | ex-ante={:.2}%\n",
            row.month, row.overnight_rate, row.expectation, row.ex_ante
        )),
        None => out.push_str("Latest: (no overlapping data)\n"),
    }
    out
}

/// Single-row table of the reduction estimate.
pub fn format_reduction_table(estimate: Option<&ReductionEstimate>) -> String {
    let mut out = String::new();
    out.push_str("Expected average reduction per meeting:\n");

    let Some(est) = estimate else {
        out.push_str("(no overlapping data)\n");
        return out;
    };

    out.push_str(
        format!(
            "{:<8} {:>13} {:>17} {:>8} {:>13} {:>13}",
            "month", "policy_target", "year_end_forecast", "gap", "meeting_count", "avg_reduction"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<8} {:-<13} {:-<17} {:-<8} {:-<13} {:-<13}",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:<8} {:>13.2} {:>17.2} {:>8.2} {:>13} {:>13.2}",
            est.month.to_string(),
            est.policy_target,
            est.year_end_forecast,
            est.gap,
            est.meeting_count,
            est.average_reduction_per_meeting,
        )
        .trim_end(),
    );
    out.push('\n');
    out
}

fn indent(s: &str) -> String {
    s.lines().map(|l| format!("  {l}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FetchedSeries;
    use crate::domain::{Month, Observation};
    use chrono::NaiveDate;

    fn fetched(id: &str, n: usize, dropped: usize) -> FetchedSeries {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        FetchedSeries {
            series_id: id.to_string(),
            observations: vec![Observation::new(date, 1.0); n],
            dropped_unparseable: dropped,
            dropped_out_of_range: 0,
        }
    }

    #[test]
    fn reduction_table_row_values() {
        let est = ReductionEstimate {
            month: Month::from_ymd(2024, 6).unwrap(),
            policy_target: 11.0,
            year_end_forecast: 9.5,
            gap: 1.5,
            meeting_count: 5,
            average_reduction_per_meeting: 0.3,
        };
        let txt = format_reduction_table(Some(&est));
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("month"));
        let row: Vec<&str> = lines[3].split_whitespace().collect();
        assert_eq!(row, vec!["2024-06", "11.00", "9.50", "1.50", "5", "0.30"]);
    }

    #[test]
    fn reduction_table_without_estimate() {
        let txt = format_reduction_table(None);
        assert!(txt.contains("(no overlapping data)"));
    }

    #[test]
    fn fetch_summary_lists_counts_and_drops() {
        let inputs = FetchedInputs {
            inflation_expectation: fetched("SR14194", 3, 0),
            overnight_rate: fetched("SF331451", 20, 2),
            policy_target: fetched("SF61745", 20, 0),
            year_end_forecast: fetched("SR14680", 4, 0),
        };
        let txt = format_fetch_summary(&inputs);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "inflation expectation 12m (SR14194): 3 records");
        assert_eq!(
            lines[1],
            "overnight rate (SF331451): 20 records (dropped 2 unparseable, 0 out of range)"
        );
    }
}
