//! Open-Meteo geocoding and historical archive client
//!
//! Both services are free and need no API key. Every request is bounded by the
//! configured timeout and is never retried; any transport problem surfaces as
//! [`TempcastError::Transport`].

use super::{Geocoder, HistoryArchive};
use crate::config::WeatherConfig;
use crate::models::{HistoryBuilder, HistoryReport, Place};
use crate::{Result, TempcastError};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

const USER_AGENT: &str = concat!("tempcast/", env!("CARGO_PKG_VERSION"));

/// Daily metrics requested from the archive
const DAILY_METRICS: &str = "temperature_2m_max,temperature_2m_min";

/// HTTP client for the Open-Meteo geocoding and archive APIs
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    geocoding_url: String,
    archive_url: String,
}

impl OpenMeteoClient {
    /// Create a new client from the weather configuration
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TempcastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            geocoding_url: config.geocoding_url.clone(),
            archive_url: config.archive_url.clone(),
        })
    }

    fn geocoding_request_url(&self, name: &str, count: u32) -> String {
        format!(
            "{}?name={}&count={}&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(name),
            count
        )
    }

    fn archive_request_url(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
        timezone: &str,
    ) -> String {
        format!(
            "{}?latitude={}&longitude={}&start_date={}&end_date={}&daily={}&timezone={}",
            self.archive_url,
            latitude,
            longitude,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            DAILY_METRICS,
            urlencoding::encode(timezone)
        )
    }

    /// Send a GET request and fail on anything but a 2xx status
    async fn send(&self, url: &str, service: &str) -> Result<Response> {
        let start_time = Instant::now();
        debug!("{} request URL: {}", service, url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("{} request failed: {}", service, e);
            TempcastError::from(e)
        })?;

        let status = response.status();
        debug!(
            "{} responded {} in {:.3}s",
            service,
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            error!("{} request failed with status {}", service, status);
            return Err(TempcastError::transport(format!(
                "{service} request failed with status: {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, service: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse {} response: {}", service, e);
            TempcastError::transport(format!("Invalid data received from {service}: {e}"))
        })
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn search(&self, name: &str, count: u32) -> Result<Vec<Place>> {
        info!("Geocoding location: '{}'", name);
        let start_time = Instant::now();

        let url = self.geocoding_request_url(name, count);
        let response = self.send(&url, "geocoding").await?;
        let body: wire::GeocodingResponse = Self::decode(response, "geocoding").await?;

        let places: Vec<Place> = body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(Place::from)
            .collect();

        if places.is_empty() {
            warn!("No results found for location '{}'", name);
        } else {
            info!(
                "Found {} geocoding results for '{}' in {:.3}s",
                places.len(),
                name,
                start_time.elapsed().as_secs_f64()
            );
        }

        Ok(places)
    }
}

#[async_trait]
impl HistoryArchive for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
        timezone: &str,
    ) -> Result<HistoryReport> {
        if start > end {
            return Err(TempcastError::validation(format!(
                "history start {start} is after end {end}"
            )));
        }

        info!(
            "Fetching daily history for {:.4}, {:.4} from {} to {}",
            latitude, longitude, start, end
        );
        let start_time = Instant::now();

        let url = self.archive_request_url(latitude, longitude, start, end, timezone);
        let response = self.send(&url, "archive").await?;
        let body: wire::ArchiveResponse = Self::decode(response, "archive").await?;

        let report = body.into_report(start, end);

        for rejection in &report.rejected {
            debug!(
                "Dropped archive row {} ({}): {}",
                rejection.row, rejection.date, rejection.reason
            );
        }
        if report.dropped() > 0 {
            warn!(
                "Dropped {} of {} archive rows",
                report.dropped(),
                report.dropped() + report.series.len()
            );
        }

        info!(
            "Retrieved {} daily observations in {:.3}s",
            report.series.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(report)
    }
}

/// Open-Meteo response structures
mod wire {
    use super::{HistoryBuilder, HistoryReport, NaiveDate, Place};
    use serde::Deserialize;
    use serde_json::Value;

    /// Geocoding response from Open-Meteo
    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub timezone: Option<String>,
        pub country: Option<String>,
        pub admin1: Option<String>,
    }

    impl From<GeocodingResult> for Place {
        fn from(result: GeocodingResult) -> Self {
            Place {
                name: result.name,
                latitude: result.latitude,
                longitude: result.longitude,
                timezone: result.timezone,
                country: result.country,
                admin_region: result.admin1,
            }
        }
    }

    /// Archive response; only the daily block is consumed
    #[derive(Debug, Deserialize)]
    pub struct ArchiveResponse {
        pub daily: Option<DailyData>,
    }

    /// Daily columns. Cells stay untyped so each row can be validated on its own.
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Option<Vec<Value>>,
        pub temperature_2m_max: Option<Vec<Value>>,
        pub temperature_2m_min: Option<Vec<Value>>,
    }

    impl ArchiveResponse {
        /// Pair the columns by row index and validate every row
        pub fn into_report(self, start: NaiveDate, end: NaiveDate) -> HistoryReport {
            let Some(daily) = self.daily else {
                return HistoryReport::empty();
            };
            let Some(time) = daily.time else {
                return HistoryReport::empty();
            };

            let max = daily.temperature_2m_max.unwrap_or_default();
            let min = daily.temperature_2m_min.unwrap_or_default();

            let mut builder = HistoryBuilder::new(start, end);
            for (row, day) in time.iter().enumerate() {
                builder.push_row(row, day.as_str().unwrap_or_default(), max.get(row), min.get(row));
            }
            builder.finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RejectionReason;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn client() -> OpenMeteoClient {
        OpenMeteoClient::new(&WeatherConfig::default()).unwrap()
    }

    #[test]
    fn test_geocoding_url_encodes_name() {
        let url = client().geocoding_request_url("São Paulo", 1);
        assert_eq!(
            url,
            "https://geocoding-api.open-meteo.com/v1/search?name=S%C3%A3o%20Paulo&count=1&language=en&format=json"
        );
    }

    #[test]
    fn test_archive_url_contains_window_and_metrics() {
        let url = client().archive_request_url(
            22.57,
            88.36,
            date("2024-01-01"),
            date("2024-04-29"),
            "Asia/Kolkata",
        );
        assert!(url.starts_with("https://archive-api.open-meteo.com/v1/archive?"));
        assert!(url.contains("latitude=22.57&longitude=88.36"));
        assert!(url.contains("start_date=2024-01-01&end_date=2024-04-29"));
        assert!(url.contains("daily=temperature_2m_max,temperature_2m_min"));
        assert!(url.contains("timezone=Asia%2FKolkata"));
    }

    #[test]
    fn test_missing_daily_block_is_empty_report() {
        let response: wire::ArchiveResponse = serde_json::from_value(json!({})).unwrap();
        let report = response.into_report(date("2024-01-01"), date("2024-01-31"));
        assert!(report.series.is_empty());
        assert_eq!(report.dropped(), 0);
    }

    #[test]
    fn test_missing_time_axis_is_empty_report() {
        let response: wire::ArchiveResponse = serde_json::from_value(json!({
            "daily": { "temperature_2m_max": [30.0], "temperature_2m_min": [20.0] }
        }))
        .unwrap();
        let report = response.into_report(date("2024-01-01"), date("2024-01-31"));
        assert!(report.series.is_empty());
    }

    #[test]
    fn test_short_columns_count_as_missing() {
        let response: wire::ArchiveResponse = serde_json::from_value(json!({
            "daily": {
                "time": ["2024-01-01", "2024-01-02"],
                "temperature_2m_max": [30.0, 31.0],
                "temperature_2m_min": [20.0]
            }
        }))
        .unwrap();
        let report = response.into_report(date("2024-01-01"), date("2024-01-31"));
        assert_eq!(report.series.len(), 1);
        assert_eq!(report.rejected[0].reason, RejectionReason::MissingMin);
    }

    #[test]
    fn test_geocoding_result_to_place() {
        let result: wire::GeocodingResult = serde_json::from_value(json!({
            "name": "Kolkata",
            "latitude": 22.57,
            "longitude": 88.36,
            "timezone": "Asia/Kolkata",
            "country": "India",
            "admin1": "West Bengal"
        }))
        .unwrap();

        let place = Place::from(result);
        assert_eq!(place.name, "Kolkata");
        assert_eq!(place.timezone.as_deref(), Some("Asia/Kolkata"));
        assert_eq!(place.admin_region.as_deref(), Some("West Bengal"));
    }
}
