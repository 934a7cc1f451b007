//! Expected average policy-rate reduction per remaining meeting.

use tracing::warn;

use crate::domain::{MonthlySeries, ReductionEstimate};

/// Gap between the policy target and the year-end forecast for the most
/// recent month where both exist, spread over `meeting_count` meetings.
///
/// Unlike [`crate::calc::merge_rates`] there is no forward-fill: a month
/// without a forecast simply has no gap. Returns `None` when no month has one.
pub fn estimate_reduction(
    policy_target: &MonthlySeries,
    year_end_forecast: &MonthlySeries,
    meeting_count: u32,
) -> Option<ReductionEstimate> {
    if meeting_count == 0 {
        warn!("meeting count is zero; no reduction estimate");
        return None;
    }

    let latest = policy_target
        .iter()
        .rev()
        .find_map(|(month, target)| {
            let forecast = year_end_forecast.get(month)?;
            let gap = target - forecast;
            gap.is_finite().then_some((month, target, forecast, gap))
        });

    let Some((month, policy_target, year_end_forecast, gap)) = latest else {
        warn!("no month with both policy target and year-end forecast; no reduction estimate");
        return None;
    };

    Some(ReductionEstimate {
        month,
        policy_target,
        year_end_forecast,
        gap,
        meeting_count,
        average_reduction_per_meeting: gap / f64::from(meeting_count),
    })
}
