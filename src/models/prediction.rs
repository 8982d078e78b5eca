//! Prediction results and the outlook shown alongside them

use super::{HistorySeries, Place, RowRejection};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Predicted mean temperature for one day
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub target_date: NaiveDate,
    /// Predicted mean temperature in Celsius
    pub predicted_temp_mean: f64,
}

impl PredictionResult {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.2}°C", self.predicted_temp_mean)
    }
}

/// Temperature bands used to pick an outlook
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct OutlookThresholds {
    /// Below this the day is chilly
    #[serde(default = "default_chilly_below")]
    pub chilly_below: f64,
    /// Below this (and not chilly) the day is pleasant, otherwise hot
    #[serde(default = "default_hot_from")]
    pub hot_from: f64,
}

fn default_chilly_below() -> f64 {
    20.0
}

fn default_hot_from() -> f64 {
    30.0
}

impl Default for OutlookThresholds {
    fn default() -> Self {
        Self {
            chilly_below: default_chilly_below(),
            hot_from: default_hot_from(),
        }
    }
}

/// Qualitative outlook for a predicted temperature
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    Chilly,
    Pleasant,
    Hot,
}

impl Outlook {
    #[must_use]
    pub fn classify(temperature: f64, thresholds: &OutlookThresholds) -> Self {
        if temperature < thresholds.chilly_below {
            Self::Chilly
        } else if temperature < thresholds.hot_from {
            Self::Pleasant
        } else {
            Self::Hot
        }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Chilly => "It's going to be quite chilly!",
            Self::Pleasant => "Pleasant weather ahead!",
            Self::Hot => "It's going to be hot, stay hydrated!",
        }
    }

    /// Icon name for the page
    #[must_use]
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Chilly => "snowflake",
            Self::Pleasant => "sun-behind-cloud",
            Self::Hot => "sun",
        }
    }
}

/// Everything the shell needs to render a successful prediction
#[derive(Debug, Serialize, Clone)]
pub struct PredictionReport {
    /// City as selected by the user
    pub city: String,
    pub place: Place,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub prediction: PredictionResult,
    pub outlook: Outlook,
    pub message: String,
    pub icon: String,
    pub history: HistorySeries,
    pub rejected_rows: Vec<RowRejection>,
}
