//! OpenWeatherMap HTTP client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::aggregate::{build_report, ReportOptions};
use crate::api::{CurrentResponse, ForecastResponse};
use crate::types::{Coordinates, CurrentWeather, Forecast, ForecastReport, Units, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("skycast/", env!("CARGO_PKG_VERSION"));

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

#[derive(Clone)]
pub struct WeatherProvider {
    pub(crate) client: Arc<Client>,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) units: Units,
}

impl std::fmt::Debug for WeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherProvider")
            .field("base_url", &self.base_url)
            .field("units", &self.units)
            .finish_non_exhaustive()
    }
}

impl WeatherProvider {
    pub fn new(api_key: &str, units: Units) -> Result<Self, WeatherError> {
        Self::with_base_url(
            api_key,
            units,
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_base_url(
        api_key: &str,
        units: Units,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            units,
        })
    }

    /// Current conditions at the given coordinates.
    #[instrument(skip(self), level = "debug")]
    pub async fn current_by_coords(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentWeather, WeatherError> {
        let query = self.coordinate_query(coordinates);
        let subject = coordinate_subject(coordinates);

        let response: CurrentResponse = self.get_json(CURRENT_PATH, &query, &subject).await?;
        let current = response.into_current()?;
        tracing::info!("Fetched current weather for {}", current.city);
        Ok(current)
    }

    /// Current conditions for a city name.
    #[instrument(skip(self), level = "debug")]
    pub async fn current_by_city(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let query = self.city_query(city);

        let response: CurrentResponse = self.get_json(CURRENT_PATH, &query, city).await?;
        let current = response.into_current()?;
        tracing::info!("Fetched current weather for {}", current.city);
        Ok(current)
    }

    /// Raw 5-day / 3-hour forecast samples for a city name.
    #[instrument(skip(self), level = "debug")]
    pub async fn forecast_by_city(&self, city: &str) -> Result<Forecast, WeatherError> {
        let query = self.city_query(city);
        self.fetch_forecast(&query, city).await
    }

    /// Raw 5-day / 3-hour forecast samples at the given coordinates.
    #[instrument(skip(self), level = "debug")]
    pub async fn forecast_by_coords(
        &self,
        coordinates: Coordinates,
    ) -> Result<Forecast, WeatherError> {
        let query = self.coordinate_query(coordinates);
        let subject = coordinate_subject(coordinates);
        self.fetch_forecast(&query, &subject).await
    }

    /// Fetch the forecast for `city` and derive the hourly and daily views.
    pub async fn report(
        &self,
        city: &str,
        options: &ReportOptions,
    ) -> Result<ForecastReport, WeatherError> {
        let forecast = self.forecast_by_city(city).await?;
        Ok(build_report(&forecast, options))
    }

    /// Fetch the forecast at `coordinates` and derive the hourly and daily views.
    pub async fn report_by_coords(
        &self,
        coordinates: Coordinates,
        options: &ReportOptions,
    ) -> Result<ForecastReport, WeatherError> {
        let forecast = self.forecast_by_coords(coordinates).await?;
        Ok(build_report(&forecast, options))
    }

    async fn fetch_forecast(
        &self,
        query: &[(&str, String)],
        subject: &str,
    ) -> Result<Forecast, WeatherError> {
        let response: ForecastResponse = self.get_json(FORECAST_PATH, query, subject).await?;
        let forecast = response.into_forecast()?;
        tracing::info!(
            "Fetched {} forecast samples for {}",
            forecast.samples.len(),
            subject
        );
        Ok(forecast)
    }

    fn city_query(&self, city: &str) -> [(&'static str, String); 2] {
        [
            ("q", city.to_string()),
            ("units", self.units.as_query().to_string()),
        ]
    }

    fn coordinate_query(&self, coordinates: Coordinates) -> [(&'static str, String); 3] {
        [
            ("lat", coordinates.latitude.to_string()),
            ("lon", coordinates.longitude.to_string()),
            ("units", self.units.as_query().to_string()),
        ]
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        subject: &str,
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        self.handle_response(response, subject).await
    }

    /// Map HTTP status codes onto `WeatherError` and decode successful bodies.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        subject: &str,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)))
        } else if status == StatusCode::UNAUTHORIZED {
            Err(WeatherError::InvalidApiKey)
        } else if status == StatusCode::NOT_FOUND {
            Err(WeatherError::CityNotFound(subject.to_string()))
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Err(WeatherError::RateLimited)
        } else {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API returned {}: {}", status, text);
            Err(WeatherError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

fn coordinate_subject(coordinates: Coordinates) -> String {
    format!("{}, {}", coordinates.latitude, coordinates.longitude)
}
