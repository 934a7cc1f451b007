//! Banxico SIE REST API integration.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, info};

use crate::data::{FetchedSeries, RetrievalError, SeriesSource, parse_body};
use crate::domain::DateRange;
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://www.banxico.org.mx/SieAPIRest/service/v1";

const TOKEN_HEADER: &str = "Bmx-Token";
const TOKEN_ENV: &str = "BANXICO_TOKEN";
const BASE_URL_ENV: &str = "BANXICO_BASE_URL";

/// Connection settings for the SIE API.
#[derive(Clone)]
pub struct BanxicoConfig {
    pub token: String,
    pub base_url: String,
}

impl BanxicoConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Read `BANXICO_TOKEN` (and optionally `BANXICO_BASE_URL`), honouring `.env`.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::config(format!("Missing {TOKEN_ENV} in environment (.env).")))?;
        let mut config = Self::new(token.trim());
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url.trim().to_string();
            }
        }
        Ok(config)
    }
}

impl std::fmt::Debug for BanxicoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BanxicoConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub struct BanxicoClient {
    client: Client,
    config: BanxicoConfig,
}

impl BanxicoClient {
    pub fn new(config: BanxicoConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn series_url(&self, series_id: &str, range: &DateRange) -> String {
        format!(
            "{}/series/{series_id}/datos/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d"),
        )
    }
}

impl SeriesSource for BanxicoClient {
    fn fetch_series(&self, series_id: &str, range: &DateRange) -> Result<FetchedSeries, RetrievalError> {
        let url = self.series_url(series_id, range);
        debug!(%url, "requesting series");

        let resp = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.config.token)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|source| RetrievalError::Transport {
                series_id: series_id.to_string(),
                source,
            })?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RetrievalError::Unauthorized {
                series_id: series_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(RetrievalError::Status {
                series_id: series_id.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|source| RetrievalError::Transport {
            series_id: series_id.to_string(),
            source,
        })?;

        let series = parse_body(series_id, &body, range)?;
        info!(series_id, records = series.len(), "series downloaded");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 13).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn series_url_uses_iso_dates() {
        let client = BanxicoClient::new(BanxicoConfig::new("t"));
        assert_eq!(
            client.series_url("SF61745", &range()),
            "https://www.banxico.org.mx/SieAPIRest/service/v1/series/SF61745/datos/2020-01-01/2024-06-13"
        );
    }

    #[test]
    fn series_url_tolerates_trailing_slash_in_base_url() {
        let mut config = BanxicoConfig::new("t");
        config.base_url = "http://localhost:8080/v1/".to_string();
        let client = BanxicoClient::new(config);
        assert_eq!(
            client.series_url("SR14194", &range()),
            "http://localhost:8080/v1/series/SR14194/datos/2020-01-01/2024-06-13"
        );
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = BanxicoConfig::new("secret-token");
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("secret-token"));
    }
}
