//! Choosing which place to look up.

use crate::types::{Coordinates, LocationError};

/// What to ask the provider about
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    City(String),
}

/// Candidate locations, from most to least specific.
#[derive(Debug, Clone, Default)]
pub struct LocationSources {
    pub coordinates: Option<(f64, f64)>,
    pub city: Option<String>,
    pub default_city: Option<String>,
    pub default_coordinates: Option<(f64, f64)>,
}

impl LocationSources {
    /// Pick the first usable source: explicit coordinates, explicit city,
    /// default city, default coordinates.
    pub fn resolve(&self) -> Result<LocationQuery, LocationError> {
        if let Some((lat, lon)) = self.coordinates {
            return Coordinates::new(lat, lon).map(LocationQuery::Coordinates);
        }

        let city = [self.city.as_deref(), self.default_city.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|c| !c.is_empty());
        if let Some(city) = city {
            return Ok(LocationQuery::City(city.to_string()));
        }

        match self.default_coordinates {
            Some((lat, lon)) => Coordinates::new(lat, lon).map(LocationQuery::Coordinates),
            None => Err(LocationError::Unavailable),
        }
    }
}
