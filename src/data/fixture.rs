//! Recorded SIE responses as a series source.
//!
//! Bodies are either registered in memory or read from `{dir}/{series_id}.json`.
//! They go through the same [`parse_body`] as live responses.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::info;

use crate::data::{FetchedSeries, RetrievalError, SeriesSource, parse_body};
use crate::domain::DateRange;

#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    dir: Option<PathBuf>,
    bodies: HashMap<String, String>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            bodies: HashMap::new(),
        }
    }

    pub fn with_body(mut self, series_id: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(series_id.into(), body.into());
        self
    }

    fn load(&self, series_id: &str) -> Result<String, RetrievalError> {
        if let Some(body) = self.bodies.get(series_id) {
            return Ok(body.clone());
        }
        let Some(dir) = &self.dir else {
            return Err(RetrievalError::MissingFixture {
                series_id: series_id.to_string(),
            });
        };
        let path = dir.join(format!("{series_id}.json"));
        match std::fs::read_to_string(&path) {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RetrievalError::MissingFixture {
                series_id: series_id.to_string(),
            }),
            Err(source) => Err(RetrievalError::FixtureIo { path, source }),
        }
    }
}

impl SeriesSource for FixtureSource {
    fn fetch_series(&self, series_id: &str, range: &DateRange) -> Result<FetchedSeries, RetrievalError> {
        let body = self.load(series_id)?;
        let series = parse_body(series_id, &body, range)?;
        info!(series_id, records = series.len(), "series loaded from fixture");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sie_body;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn registered_body_is_parsed() {
        let source = FixtureSource::new().with_body("SF61745", sie_body("SF61745", &[("01/06/2024", "11.00")]));
        let out = source.fetch_series("SF61745", &range()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.series_id, "SF61745");
    }

    #[test]
    fn unknown_series_is_missing_fixture() {
        let err = FixtureSource::new().fetch_series("SR14680", &range()).unwrap_err();
        assert!(matches!(err, RetrievalError::MissingFixture { .. }));
    }

    #[test]
    fn missing_file_in_dir_is_missing_fixture() {
        let dir = std::env::temp_dir().join("exante-fixture-test-does-not-exist");
        let err = FixtureSource::from_dir(dir).fetch_series("SR14680", &range()).unwrap_err();
        assert!(matches!(err, RetrievalError::MissingFixture { .. }));
    }
}
