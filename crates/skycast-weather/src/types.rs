use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Measurement system requested from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    /// Value of the `units` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
            Self::Standard => "standard",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
            Self::Standard => "K",
        }
    }

    pub fn wind_speed_symbol(&self) -> &'static str {
        match self {
            Self::Metric | Self::Standard => "m/s",
            Self::Imperial => "mph",
        }
    }
}

/// Convert a provider UTC offset in seconds to a chrono offset.
/// Out-of-range values fall back to UTC.
pub fn utc_offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

/// Unix timestamp rendered in the given offset.
pub fn local_datetime(timestamp: i64, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
}

/// Build the URL of a condition icon, e.g. `.../img/wn/04d.png`.
pub fn icon_url(base_url: &str, icon: &str) -> String {
    format!("{}/{}.png", base_url.trim_end_matches('/'), icon)
}

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// One forecast data point, as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub temperature: f64,
    /// Primary condition label, e.g. "Clouds"
    pub condition: String,
    /// Provider icon code, e.g. "04d"
    pub icon: String,
}

impl Sample {
    pub fn local_time(&self, offset: FixedOffset) -> DateTime<FixedOffset> {
        local_datetime(self.timestamp, offset)
    }
}

/// Hourly chart entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    /// Local time label, "HH:MM"
    pub time: String,
    pub temperature: f64,
}

/// Aggregate for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// Weekday name, e.g. "Tuesday"
    pub day: String,
    pub min_temp: i32,
    pub max_temp: i32,
    /// Condition of the first sample seen for this day
    pub condition: String,
    /// Icon of the first sample seen for this day
    pub icon: String,
}

impl DaySummary {
    /// Midpoint of the day's range, shown as the card's headline temperature.
    pub fn average_temp(&self) -> f64 {
        (f64::from(self.max_temp) + f64::from(self.min_temp)) / 2.0
    }
}

/// Current conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    /// Observation time, seconds since the Unix epoch
    pub observed_at: i64,
    /// Location's offset from UTC in seconds
    pub utc_offset_secs: i32,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

impl CurrentWeather {
    pub fn offset(&self) -> FixedOffset {
        utc_offset(self.utc_offset_secs)
    }

    pub fn observed_local(&self) -> DateTime<FixedOffset> {
        local_datetime(self.observed_at, self.offset())
    }

    pub fn sunrise_local(&self) -> Option<DateTime<FixedOffset>> {
        self.sunrise.map(|ts| local_datetime(ts, self.offset()))
    }

    pub fn sunset_local(&self) -> Option<DateTime<FixedOffset>> {
        self.sunset.map(|ts| local_datetime(ts, self.offset()))
    }
}

/// Raw forecast series for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: Option<String>,
    pub utc_offset_secs: i32,
    pub samples: Vec<Sample>,
}

impl Forecast {
    pub fn offset(&self) -> FixedOffset {
        utc_offset(self.utc_offset_secs)
    }
}

/// Derived views of a forecast, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub city: Option<String>,
    pub hourly: Vec<HourlyPoint>,
    pub chart: Vec<HourlyPoint>,
    pub days: Vec<DaySummary>,
}

/// City matched by the geocoding endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub name: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub coordinates: Coordinates,
}

impl CitySuggestion {
    /// "Name, State, Country" with missing parts left out
    pub fn label(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.state.as_deref())
            .chain(self.country.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Location resolution errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("No location given and no default configured")]
    Unavailable,
    #[error("Coordinates out of range: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Rate limited by weather API")]
    RateLimited,
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
}
