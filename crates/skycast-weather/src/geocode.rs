//! City-name autocomplete via the OpenWeatherMap direct geocoding endpoint.

use tracing::instrument;

use crate::api::GeoEntry;
use crate::provider::WeatherProvider;
use crate::types::{CitySuggestion, WeatherError};

const GEOCODE_PATH: &str = "/geo/1.0/direct";

/// The endpoint caps results at this many matches.
pub const MAX_SUGGESTIONS: usize = 5;

impl WeatherProvider {
    /// Cities whose name matches `query`, best match first.
    ///
    /// A blank query or a zero limit returns no suggestions without touching
    /// the network.
    #[instrument(skip(self), level = "debug")]
    pub async fn suggest_cities(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CitySuggestion>, WeatherError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let params = [
            ("q", query.to_string()),
            ("limit", limit.min(MAX_SUGGESTIONS).to_string()),
        ];

        let entries: Vec<GeoEntry> = self.get_json(GEOCODE_PATH, &params, query).await?;
        tracing::debug!(
            "Geocoding returned {} matches for {:?}",
            entries.len(),
            query
        );

        Ok(entries.into_iter().map(GeoEntry::into_suggestion).collect())
    }
}
