//! `tempcast` - Predict a future day's mean temperature for a city
//!
//! This library geocodes a city, fetches its recent daily temperature history
//! from the Open-Meteo archive and fits a cubic trend over it. A small axum
//! application exposes the pipeline as a single-page prediction form.

pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod location_resolver;
pub mod models;
pub mod trend;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::TempcastConfig;
pub use error::TempcastError;
pub use forecast::PredictionService;
pub use location_resolver::LocationResolver;
pub use models::{DailyObservation, HistoryReport, HistorySeries, Place, PredictionResult};
pub use trend::TrendModel;
pub use weather::{Geocoder, HistoryArchive, OpenMeteoClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TempcastError>;
