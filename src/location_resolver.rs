//! Location Resolution Module
//!
//! Resolves a city name into a single [`Place`] through a [`Geocoder`].

use crate::models::Place;
use crate::weather::Geocoder;
use crate::{Result, TempcastError};
use tracing::debug;

/// Service for resolving city names
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a city name to its best geocoding match.
    ///
    /// # Errors
    /// `Validation` for an empty name, `NotFound` when the geocoder has no
    /// match, and whatever transport error the geocoder reports.
    pub async fn resolve(geocoder: &dyn Geocoder, city_name: &str) -> Result<Place> {
        let name = city_name.trim();
        if name.is_empty() {
            return Err(TempcastError::validation("City name cannot be empty"));
        }

        debug!("Geocoding location name: {}", name);

        let place = geocoder
            .search(name, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TempcastError::not_found(name))?;

        debug!(
            "Resolved location: {} at ({})",
            place.name,
            place.format_coordinates()
        );

        Ok(place)
    }
}
