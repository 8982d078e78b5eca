//! Temperature Prediction Service
//!
//! Runs the request pipeline: resolve the city, fetch the recent daily
//! history for it, fit the cubic trend and evaluate it at the target date.
//! Each step awaits the previous one; errors propagate unchanged.

use crate::config::ForecastConfig;
use crate::location_resolver::LocationResolver;
use crate::models::{Outlook, OutlookThresholds, PredictionReport, PredictionResult};
use crate::trend::TrendModel;
use crate::weather::{Geocoder, HistoryArchive};
use crate::{Result, TempcastError};
use chrono::{Duration, Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Service producing temperature predictions for a city
#[derive(Clone)]
pub struct PredictionService {
    geocoder: Arc<dyn Geocoder>,
    archive: Arc<dyn HistoryArchive>,
    config: ForecastConfig,
    thresholds: OutlookThresholds,
}

impl PredictionService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        archive: Arc<dyn HistoryArchive>,
        config: ForecastConfig,
        thresholds: OutlookThresholds,
    ) -> Self {
        Self {
            geocoder,
            archive,
            config,
            thresholds,
        }
    }

    /// History window ending yesterday relative to `today`
    #[must_use]
    pub fn history_window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today - Duration::days(i64::from(self.config.history_days));
        let end = today - Duration::days(1);
        (start, end)
    }

    /// Predict the mean temperature of `city` on `target_date`, using the
    /// local calendar date as today.
    pub async fn predict(&self, city: &str, target_date: NaiveDate) -> Result<PredictionReport> {
        self.predict_on(city, target_date, Local::now().date_naive())
            .await
    }

    /// Predict with an explicit notion of today
    #[instrument(skip(self))]
    pub async fn predict_on(
        &self,
        city: &str,
        target_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<PredictionReport> {
        let place = LocationResolver::resolve(self.geocoder.as_ref(), city).await?;

        let (window_start, window_end) = self.history_window(today);
        let report = self
            .archive
            .fetch(
                place.latitude,
                place.longitude,
                window_start,
                window_end,
                place.timezone_or_auto(),
            )
            .await?;

        if report.series.is_empty() {
            warn!("No historical data available for {}", place.display_name());
            return Err(TempcastError::NoHistory);
        }

        let model = TrendModel::fit(&report.series)?;
        let prediction = PredictionResult {
            target_date,
            predicted_temp_mean: model.predict(target_date),
        };
        let outlook = Outlook::classify(prediction.predicted_temp_mean, &self.thresholds);

        info!(
            "Predicted {} for {} on {} from {} days of history",
            prediction.format_temperature(),
            place.display_name(),
            target_date,
            report.series.len()
        );

        Ok(PredictionReport {
            city: city.trim().to_string(),
            place,
            window_start,
            window_end,
            prediction,
            outlook,
            message: outlook.message().to_string(),
            icon: outlook.icon_name().to_string(),
            history: report.series,
            rejected_rows: report.rejected,
        })
    }
}
