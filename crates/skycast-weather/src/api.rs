//! OpenWeatherMap response payloads and their conversion into domain types.
//!
//! Only the fields Skycast reads are declared; everything else in the
//! payload is ignored by serde.

use serde::Deserialize;

use crate::types::{CitySuggestion, Coordinates, CurrentWeather, Forecast, Sample, WeatherError};

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub list: Vec<ForecastEntry>,
    pub city: Option<ForecastCity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastCity {
    pub name: String,
    /// Shift in seconds from UTC
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastEntry {
    pub dt: i64,
    pub main: MainReadings,
    pub weather: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MainReadings {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConditionEntry {
    pub main: String,
    #[serde(default)]
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    pub name: String,
    pub dt: i64,
    #[serde(default)]
    pub timezone: i32,
    pub main: MainReadings,
    pub weather: Vec<ConditionEntry>,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub sys: Sys,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Wind {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Sys {
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeoEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
    pub state: Option<String>,
}

impl ForecastEntry {
    /// Keep the primary condition; an entry without one is malformed.
    pub(crate) fn into_sample(self) -> Result<Sample, WeatherError> {
        let condition = self.weather.into_iter().next().ok_or_else(|| {
            WeatherError::Parse(format!(
                "forecast entry at {} has no weather condition",
                self.dt
            ))
        })?;

        Ok(Sample {
            timestamp: self.dt,
            temperature: self.main.temp,
            condition: condition.main,
            icon: condition.icon,
        })
    }
}

impl ForecastResponse {
    pub(crate) fn into_forecast(self) -> Result<Forecast, WeatherError> {
        let samples = self
            .list
            .into_iter()
            .map(ForecastEntry::into_sample)
            .collect::<Result<Vec<_>, _>>()?;

        let (city, utc_offset_secs) = match self.city {
            Some(c) => (Some(c.name), c.timezone),
            None => (None, 0),
        };

        Ok(Forecast {
            city,
            utc_offset_secs,
            samples,
        })
    }
}

impl CurrentResponse {
    pub(crate) fn into_current(self) -> Result<CurrentWeather, WeatherError> {
        let condition = self.weather.into_iter().next().ok_or_else(|| {
            WeatherError::Parse(format!(
                "current weather for {} has no condition",
                self.name
            ))
        })?;
        let main = self.main;

        Ok(CurrentWeather {
            city: self.name,
            observed_at: self.dt,
            utc_offset_secs: self.timezone,
            temperature: main.temp,
            feels_like: main.feels_like.unwrap_or(main.temp),
            temp_min: main.temp_min.unwrap_or(main.temp),
            temp_max: main.temp_max.unwrap_or(main.temp),
            humidity: main.humidity,
            wind_speed: self.wind.speed,
            condition: condition.main,
            description: condition.description,
            icon: condition.icon,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
        })
    }
}

impl GeoEntry {
    pub(crate) fn into_suggestion(self) -> CitySuggestion {
        CitySuggestion {
            name: self.name,
            state: self.state,
            country: self.country,
            coordinates: Coordinates {
                latitude: self.lat,
                longitude: self.lon,
            },
        }
    }
}
