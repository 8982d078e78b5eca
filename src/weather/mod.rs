//! External weather services
//!
//! The pipeline talks to the geocoder and the history archive only through the
//! [`Geocoder`] and [`HistoryArchive`] traits; [`open_meteo::OpenMeteoClient`]
//! implements both against the public Open-Meteo APIs.

use crate::Result;
use crate::models::{HistoryReport, Place};
use async_trait::async_trait;
use chrono::NaiveDate;

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Resolves place names to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Search for up to `count` places matching `name`, best match first.
    /// An empty result is not an error at this level.
    async fn search(&self, name: &str, count: u32) -> Result<Vec<Place>>;
}

/// Provides past daily temperatures for a coordinate pair
#[async_trait]
pub trait HistoryArchive: Send + Sync {
    /// Fetch daily min/max temperatures for the closed range `[start, end]`.
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
        timezone: &str,
    ) -> Result<HistoryReport>;
}
