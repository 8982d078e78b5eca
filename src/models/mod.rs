//! Data models for tempcast
//!
//! This module contains the core domain models organized by concern:
//! - Place: Geocoded coordinates and metadata
//! - History: Daily observations, row validation and the ordered series
//! - Prediction: Predicted temperature, outlook and the full report

pub mod history;
pub mod place;
pub mod prediction;

// Re-export all public types for convenient access
pub use history::{
    DailyObservation, HistoryBuilder, HistoryReport, HistorySeries, RejectionReason, RowRejection,
};
pub use place::Place;
pub use prediction::{Outlook, OutlookThresholds, PredictionReport, PredictionResult};
