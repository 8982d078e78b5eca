//! Place model for geocoded cities

use serde::{Deserialize, Serialize};

/// Timezone sent to the archive when the geocoder did not report one
pub const AUTO_TIMEZONE: &str = "auto";

/// A geocoded place
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Place {
    /// Place name as reported by the geocoding service
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// IANA timezone name (e.g. "Asia/Kolkata")
    pub timezone: Option<String>,
    /// Country name
    pub country: Option<String>,
    /// First-level administrative region (state, province)
    pub admin_region: Option<String>,
}

impl Place {
    /// Create a new place with only a name and coordinates
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            name,
            latitude,
            longitude,
            timezone: None,
            country: None,
            admin_region: None,
        }
    }

    /// Set the timezone
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Timezone to request history in
    #[must_use]
    pub fn timezone_or_auto(&self) -> &str {
        self.timezone
            .as_deref()
            .filter(|tz| !tz.is_empty())
            .unwrap_or(AUTO_TIMEZONE)
    }

    /// Format place as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Name with region and country, e.g. "Kolkata, West Bengal, India"
    #[must_use]
    pub fn display_name(&self) -> String {
        [
            Some(self.name.as_str()),
            self.admin_region.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}
