//! Ex-ante real rate: overnight rate minus inflation expectation.

use tracing::{debug, warn};

use crate::domain::{MergeStats, MonthlySeries, RateFrame, RateRow};

/// Left-join `expectation` onto the months of `overnight`, forward-filling
/// missing expectations, and compute the ex-ante real rate.
///
/// Months before the first available expectation cannot be filled and are
/// dropped. An empty overlap yields an empty frame.
pub fn merge_rates(overnight: &MonthlySeries, expectation: &MonthlySeries) -> RateFrame {
    let mut stats = MergeStats {
        driving_months: overnight.len(),
        ..MergeStats::default()
    };
    let mut rows = Vec::with_capacity(overnight.len());
    let mut carried: Option<f64> = None;

    // `MonthlySeries` iterates in ascending month order, which the fill relies on.
    for (month, rate) in overnight.iter() {
        let (value, filled) = match expectation.get(month) {
            Some(v) => {
                carried = Some(v);
                (v, false)
            }
            None => match carried {
                Some(v) => (v, true),
                None => {
                    stats.unfilled_months += 1;
                    continue;
                }
            },
        };

        let ex_ante = rate - value;
        if !ex_ante.is_finite() {
            continue;
        }
        if filled {
            stats.filled_months += 1;
        }
        rows.push(RateRow {
            month,
            overnight_rate: rate,
            expectation: value,
            ex_ante,
            expectation_filled: filled,
        });
    }

    if rows.is_empty() {
        warn!(
            overnight_months = overnight.len(),
            expectation_months = expectation.len(),
            "no overlap between overnight rate and expectations; ex-ante frame is empty"
        );
    } else {
        debug!(
            rows = rows.len(),
            filled = stats.filled_months,
            unfilled = stats.unfilled_months,
            "merged ex-ante frame"
        );
    }

    RateFrame { rows, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Month;

    fn month(y: i32, m: u32) -> Month {
        Month::from_ymd(y, m).unwrap()
    }

    fn series(points: &[((i32, u32), f64)]) -> MonthlySeries {
        points.iter().map(|&((y, m), v)| (month(y, m), v)).collect()
    }

    #[test]
    fn fills_forward_from_latest_prior_expectation() {
        let overnight = series(&[
            ((2024, 1), 11.0),
            ((2024, 2), 11.0),
            ((2024, 3), 11.0),
            ((2024, 4), 11.0),
            ((2024, 5), 11.0),
        ]);
        let expectation = series(&[((2024, 1), 4.0), ((2024, 3), 3.5)]);
        let frame = merge_rates(&overnight, &expectation);

        let exp: Vec<f64> = frame.rows.iter().map(|r| r.expectation).collect();
        assert_eq!(exp, vec![4.0, 4.0, 3.5, 3.5, 3.5]);
        let filled: Vec<bool> = frame.rows.iter().map(|r| r.expectation_filled).collect();
        assert_eq!(filled, vec![false, true, false, true, true]);
        assert_eq!(frame.rows[4].ex_ante, 11.0 - 3.5);
        assert_eq!(frame.stats.filled_months, 3);
    }

    #[test]
    fn documented_three_month_scenario() {
        let overnight = series(&[((2024, 1), 11.25), ((2024, 2), 11.25), ((2024, 3), 11.00)]);
        let expectation = series(&[((2024, 1), 4.0), ((2024, 3), 3.8)]);
        let frame = merge_rates(&overnight, &expectation);

        assert_eq!(frame.rows.len(), 3);
        assert!((frame.rows[0].ex_ante - 7.25).abs() < 1e-12);
        assert!((frame.rows[1].ex_ante - 7.25).abs() < 1e-12);
        assert!(frame.rows[1].expectation_filled);
        assert!((frame.rows[2].ex_ante - 7.20).abs() < 1e-12);
    }

    #[test]
    fn leading_months_without_expectation_are_dropped() {
        let overnight = series(&[((2024, 1), 11.0), ((2024, 2), 11.0), ((2024, 3), 10.5)]);
        let expectation = series(&[((2024, 2), 4.0)]);
        let frame = merge_rates(&overnight, &expectation);

        assert_eq!(frame.rows.len(), 2);
        assert_eq!(frame.rows[0].month, month(2024, 2));
        assert_eq!(frame.stats.unfilled_months, 1);
        assert_eq!(frame.stats.driving_months, 3);
    }

    #[test]
    fn expectation_months_outside_driver_are_ignored() {
        // Only driving months take part in the fill.
        let overnight = series(&[((2024, 3), 11.0)]);
        let expectation = series(&[((2024, 1), 4.0), ((2024, 5), 3.5)]);
        let frame = merge_rates(&overnight, &expectation);
        assert!(frame.is_empty());
    }

    #[test]
    fn empty_overlap_returns_empty_frame() {
        let overnight = series(&[((2024, 1), 11.0), ((2024, 2), 11.0)]);
        let expectation = series(&[((2025, 1), 4.0)]);
        let frame = merge_rates(&overnight, &expectation);
        assert!(frame.is_empty());
        assert_eq!(frame.stats.unfilled_months, 2);
    }

    #[test]
    fn rows_are_in_ascending_month_order() {
        let overnight = series(&[((2024, 3), 1.0), ((2023, 12), 2.0), ((2024, 1), 3.0)]);
        let expectation = series(&[((2023, 12), 0.5)]);
        let frame = merge_rates(&overnight, &expectation);
        let months: Vec<Month> = frame.rows.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![month(2023, 12), month(2024, 1), month(2024, 3)]);
    }
}
