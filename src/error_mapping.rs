//! Maps weather-crate errors to skycast_core::AppError for consistent
//! user-facing messages.

use skycast_core::{AppError, NetworkError, WeatherError as CoreWeatherError};
use skycast_weather::{GeocodeError, WeatherError};

pub fn weather_error(e: WeatherError) -> AppError {
    match e {
        WeatherError::Network(e) => AppError::Network(e.into()),
        WeatherError::Status(status) => AppError::Network(NetworkError::ServerError {
            status,
            message: "forecast request failed".to_string(),
        }),
        WeatherError::Parse(msg) => AppError::Weather(CoreWeatherError::Malformed(msg)),
        WeatherError::CityNotFound(name) => AppError::Weather(CoreWeatherError::CityNotFound(name)),
        WeatherError::Geocode(e) => geocode_error(e),
    }
}

pub fn geocode_error(e: GeocodeError) -> AppError {
    match e {
        GeocodeError::Network(e) => AppError::Network(e.into()),
        GeocodeError::Status(status) => AppError::Weather(CoreWeatherError::Unavailable(format!(
            "geocoder returned status {}",
            status
        ))),
        GeocodeError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
        GeocodeError::NotFound(name) => AppError::Weather(CoreWeatherError::CityNotFound(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_city_reads_as_city_not_found() {
        let err = weather_error(WeatherError::CityNotFound("Atlantis".into()));
        assert_eq!(err.user_message(), "City not found. Please check the city name.");

        let err = weather_error(WeatherError::Geocode(GeocodeError::NotFound("Atlantis".into())));
        assert_eq!(err.user_message(), "City not found. Please check the city name.");
    }

    #[test]
    fn forecast_outage_reads_as_server_trouble() {
        let err = weather_error(WeatherError::Status(502));
        assert!(err.user_message().contains("try again later"));
    }

    #[test]
    fn geocoder_outage_reads_as_connection_trouble() {
        let err = geocode_error(GeocodeError::Status(429));
        assert!(err.user_message().contains("internet connection"));
    }
}
