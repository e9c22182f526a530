use skycast_core::{AppError, ConfigError, NetworkError, ReqwestErrorExt, WeatherError};
use skycast_weather::{LocationError, WeatherError as LookupError};

/// Map a lookup failure onto the application's error taxonomy.
pub fn lookup_error(e: LookupError) -> AppError {
    match e {
        LookupError::Network(err) => AppError::Network(err.into_network_error()),
        LookupError::InvalidApiKey => AppError::Weather(WeatherError::InvalidApiKey),
        LookupError::CityNotFound(city) => AppError::Weather(WeatherError::CityNotFound(city)),
        LookupError::RateLimited => AppError::Weather(WeatherError::RateLimited),
        LookupError::Api { status, message } if status >= 500 => {
            AppError::Network(NetworkError::ServerError { status, message })
        }
        LookupError::Api { status, message } => {
            AppError::Weather(WeatherError::ApiError(format!("{}: {}", status, message)))
        }
        LookupError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
        LookupError::Location(err) => location_error(err),
    }
}

pub fn location_error(e: LocationError) -> AppError {
    let detail = e.to_string();
    match e {
        LocationError::Unavailable => AppError::Weather(WeatherError::LocationUnavailable(detail)),
        LocationError::InvalidCoordinates { .. } => {
            AppError::Weather(WeatherError::InvalidCoordinates(detail))
        }
    }
}

/// Reading, creating or parsing the config file failed.
pub fn config_load_error(e: anyhow::Error) -> AppError {
    AppError::Config(ConfigError::Invalid(format!("{e:#}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_not_found_keeps_name() {
        let err = lookup_error(LookupError::CityNotFound("Atlantis".into()));
        assert!(matches!(
            err,
            AppError::Weather(WeatherError::CityNotFound(ref c)) if c == "Atlantis"
        ));
        assert_eq!(err.user_message(), "City not found.");
    }

    #[test]
    fn test_upstream_failure_is_network_error() {
        let err = lookup_error(LookupError::Api {
            status: 503,
            message: "unavailable".into(),
        });
        assert!(matches!(
            err,
            AppError::Network(NetworkError::ServerError { status: 503, .. })
        ));
    }

    #[test]
    fn test_client_failure_is_weather_error() {
        let err = lookup_error(LookupError::Api {
            status: 400,
            message: "bad request".into(),
        });
        assert!(matches!(err, AppError::Weather(WeatherError::ApiError(_))));
    }

    #[test]
    fn test_parse_failure_is_invalid_response() {
        let err = lookup_error(LookupError::Parse("eof".into()));
        assert!(matches!(
            err,
            AppError::Network(NetworkError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_location_failure() {
        let err = lookup_error(LookupError::Location(LocationError::Unavailable));
        assert!(matches!(
            err,
            AppError::Weather(WeatherError::LocationUnavailable(_))
        ));
    }

    #[test]
    fn test_out_of_range_coordinates_are_not_missing_location() {
        let err = location_error(LocationError::InvalidCoordinates {
            latitude: 123.0,
            longitude: 0.0,
        });

        assert!(matches!(
            err,
            AppError::Weather(WeatherError::InvalidCoordinates(ref d)) if d.contains("123")
        ));
        assert!(err.user_message().contains("out of range"));
        assert!(!err.user_message().contains("No location given"));
    }

    #[test]
    fn test_config_load_failure_is_not_reported_as_malformed() {
        let err = config_load_error(anyhow::anyhow!("Failed to create config directory"));

        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
        assert!(!err.user_message().contains("malformed"));
        assert!(!err.user_message().contains("Using defaults"));
    }
}
