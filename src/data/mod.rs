//! Series retrieval.
//!
//! A [`SeriesSource`] turns a series id and a date range into a cleaned,
//! date-ordered list of observations. Two sources exist:
//!
//! - [`BanxicoClient`]: the live SIE REST API
//! - [`FixtureSource`]: recorded API bodies (offline runs, tests)
//!
//! Both share the response parsing below, so fixture runs exercise exactly
//! the same cleaning rules as live runs.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::domain::{DateRange, Observation};

pub mod banxico;
pub mod fixture;

pub use banxico::{BanxicoClient, BanxicoConfig};
pub use fixture::FixtureSource;

/// Day-first date format used by the SIE API (`dd/mm/yyyy`).
const SIE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Value published for "not available" observations.
const NOT_AVAILABLE: &str = "N/E";

/// Failure to retrieve a series. Always aborts the run.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Request for series {series_id} failed: {source}")]
    Transport {
        series_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Token rejected while fetching series {series_id}. Check BANXICO_TOKEN.")]
    Unauthorized { series_id: String },

    #[error("Request for series {series_id} failed with status {status}.")]
    Status { series_id: String, status: u16 },

    #[error("Malformed response for series {series_id}: {message}")]
    Malformed { series_id: String, message: String },

    #[error("No fixture available for series {series_id}.")]
    MissingFixture { series_id: String },

    #[error("Failed to read fixture '{}': {source}", .path.display())]
    FixtureIo {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can produce observations for a series id.
pub trait SeriesSource {
    fn fetch_series(&self, series_id: &str, range: &DateRange) -> Result<FetchedSeries, RetrievalError>;
}

/// Cleaned observations for one series plus what was discarded on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedSeries {
    pub series_id: String,
    /// Ascending by date.
    pub observations: Vec<Observation>,
    /// Records whose date or value failed to parse.
    pub dropped_unparseable: usize,
    /// Parsed records dated outside the requested range.
    pub dropped_out_of_range: usize,
}

impl FetchedSeries {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct SieResponse {
    bmx: SieBody,
}

#[derive(Debug, Deserialize)]
struct SieBody {
    #[serde(default)]
    series: Vec<SieSeries>,
}

#[derive(Debug, Deserialize)]
struct SieSeries {
    #[serde(default)]
    datos: Vec<SieRecord>,
}

#[derive(Debug, Deserialize)]
struct SieRecord {
    #[serde(default)]
    fecha: Option<String>,
    #[serde(default)]
    dato: Option<String>,
}

/// Parse an SIE JSON body into cleaned observations.
///
/// Records from every series in the body are concatenated. Unparseable
/// records and records outside `range` are dropped (and counted), never
/// reported as errors.
pub fn parse_body(series_id: &str, body: &str, range: &DateRange) -> Result<FetchedSeries, RetrievalError> {
    let parsed: SieResponse = serde_json::from_str(body).map_err(|e| RetrievalError::Malformed {
        series_id: series_id.to_string(),
        message: e.to_string(),
    })?;

    let mut out = FetchedSeries {
        series_id: series_id.to_string(),
        ..FetchedSeries::default()
    };

    for record in parsed.bmx.series.into_iter().flat_map(|s| s.datos) {
        let date = record.fecha.as_deref().and_then(parse_date);
        let value = record.dato.as_deref().and_then(parse_value);
        let (Some(date), Some(value)) = (date, value) else {
            out.dropped_unparseable += 1;
            continue;
        };
        if !range.contains(date) {
            out.dropped_out_of_range += 1;
            continue;
        }
        out.observations.push(Observation::new(date, value));
    }

    out.observations.sort_by_key(|o| o.date);

    if out.dropped_unparseable > 0 {
        warn!(
            series_id,
            dropped = out.dropped_unparseable,
            "dropped records with unparseable date or value"
        );
    }
    if out.dropped_out_of_range > 0 {
        warn!(
            series_id,
            dropped = out.dropped_out_of_range,
            "dropped records outside the requested range"
        );
    }

    Ok(out)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), SIE_DATE_FORMAT).ok()
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Build an SIE-shaped body from `(fecha, dato)` pairs.
#[cfg(test)]
pub(crate) fn sie_body(series_id: &str, records: &[(&str, &str)]) -> String {
    let datos: Vec<serde_json::Value> = records
        .iter()
        .map(|(fecha, dato)| serde_json::json!({ "fecha": fecha, "dato": dato }))
        .collect();
    serde_json::json!({
        "bmx": { "series": [ { "idSerie": series_id, "titulo": "test", "datos": datos } ] }
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn parses_day_first_dates_and_sorts() {
        let body = sie_body("SF61745", &[("03/02/2024", "11.25"), ("01/02/2024", "11.00")]);
        let out = parse_body("SF61745", &body, &range((2024, 1, 1), (2024, 12, 31))).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.observations[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(out.observations[0].value, 11.00);
        assert_eq!(out.observations[1].date, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
    }

    #[test]
    fn not_available_and_garbage_are_dropped_not_errors() {
        let body = sie_body(
            "SR14194",
            &[("01/01/2024", "N/E"), ("bad", "4.1"), ("01/02/2024", "abc"), ("01/03/2024", "3.9")],
        );
        let out = parse_body("SR14194", &body, &range((2024, 1, 1), (2024, 12, 31))).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.dropped_unparseable, 3);
        assert_eq!(out.observations[0].value, 3.9);
    }

    #[test]
    fn observations_stay_within_requested_range() {
        let body = sie_body(
            "SF331451",
            &[("31/12/2023", "11.0"), ("01/01/2024", "11.1"), ("31/01/2024", "11.2"), ("01/02/2024", "11.3")],
        );
        let r = range((2024, 1, 1), (2024, 1, 31));
        let out = parse_body("SF331451", &body, &r).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.dropped_out_of_range, 2);
        assert!(out.observations.iter().all(|o| r.contains(o.date)));
        assert!(out.observations.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn records_from_all_series_in_body_are_concatenated() {
        let body = r#"{"bmx":{"series":[
            {"idSerie":"A","datos":[{"fecha":"02/01/2024","dato":"1.0"}]},
            {"idSerie":"A","datos":[{"fecha":"01/01/2024","dato":"2.0"}]},
            {"idSerie":"A"}
        ]}}"#;
        let out = parse_body("A", body, &range((2024, 1, 1), (2024, 1, 31))).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.observations[0].value, 2.0);
    }

    #[test]
    fn malformed_body_is_a_retrieval_error() {
        let err = parse_body("A", "{\"error\": 1}", &range((2024, 1, 1), (2024, 1, 31))).unwrap_err();
        assert!(matches!(err, RetrievalError::Malformed { .. }));
    }
}
