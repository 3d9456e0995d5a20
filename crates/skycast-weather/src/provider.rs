//! Forecast fetching from Open-Meteo - free, no API key required.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::geocode::GeocodeClient;
use crate::types::{
    CurrentWeather, DayForecast, GeocodeError, HourlyForecast, Location, TemperatureUnit,
    WeatherCondition, WeatherData, WeatherError,
};

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FORECAST_DAYS: u8 = 14;

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,weather_code,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability,weather_code";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset,uv_index_max,sunshine_duration";

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone)]
pub struct ForecastSettings {
    pub base_url: String,
    pub unit: TemperatureUnit,
    pub forecast_days: u8,
    pub timeout: Duration,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            base_url: OPEN_METEO_URL.to_string(),
            unit: TemperatureUnit::default(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    hourly: HourlyBlock,
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    is_day: u8,
    weather_code: i32,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    weather_code: Vec<Option<i32>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    sunrise: Vec<String>,
    sunset: Vec<String>,
    uv_index_max: Vec<Option<f64>>,
    sunshine_duration: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    unit: TemperatureUnit,
    forecast_days: u8,
}

impl WeatherProvider {
    pub fn new(settings: &ForecastSettings) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            unit: settings.unit,
            forecast_days: settings.forecast_days,
        })
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Fetch current conditions and the daily/hourly forecast for `location`.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn fetch(&self, location: &Location) -> Result<WeatherData, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let latitude = location.latitude.to_string();
        let longitude = location.longitude.to_string();
        let forecast_days = self.forecast_days.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("hourly", HOURLY_FIELDS),
                ("daily", DAILY_FIELDS),
                ("temperature_unit", self.unit.query_value()),
                ("wind_speed_unit", self.unit.wind_speed_unit()),
                ("forecast_days", forecast_days.as_str()),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Forecast request returned status {}", status);
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let raw: ForecastResponse =
            serde_json::from_slice(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        let data = build_weather_data(raw, location.clone(), self.unit)?;
        tracing::info!(
            "Fetched {} forecast days for {}",
            data.forecast.len(),
            location.city_name.as_deref().unwrap_or("coordinates")
        );
        Ok(data)
    }

    /// Geocode `city` and fetch its forecast.
    pub async fn fetch_city(
        &self,
        geocoder: &GeocodeClient,
        city: &str,
    ) -> Result<WeatherData, WeatherError> {
        let place = geocoder.locate(city).await.map_err(|e| match e {
            GeocodeError::NotFound(name) => WeatherError::CityNotFound(name),
            other => WeatherError::Geocode(other),
        })?;

        self.fetch(&place.location()).await
    }
}

fn parse_date_time(s: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
        .map_err(|e| WeatherError::Parse(format!("timestamp {:?}: {}", s, e)))
}

fn parse_date(s: &str) -> Result<NaiveDate, WeatherError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| WeatherError::Parse(format!("date {:?}: {}", s, e)))
}

fn check_len(block: &str, column: &str, expected: usize, actual: usize) -> Result<(), WeatherError> {
    if expected == actual {
        Ok(())
    } else {
        Err(WeatherError::Parse(format!(
            "{}.{} has {} values, expected {}",
            block, column, actual, expected
        )))
    }
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn build_weather_data(
    raw: ForecastResponse,
    location: Location,
    unit: TemperatureUnit,
) -> Result<WeatherData, WeatherError> {
    let current = CurrentWeather {
        temperature: raw.current.temperature_2m,
        feels_like: raw.current.apparent_temperature,
        humidity: percent(raw.current.relative_humidity_2m),
        wind_speed: raw.current.wind_speed_10m,
        is_day: raw.current.is_day != 0,
        condition: WeatherCondition::from_wmo_code(raw.current.weather_code),
        observed_at: parse_date_time(&raw.current.time)?,
    };

    let mut hourly_by_day = group_hourly(&raw.hourly)?;
    let forecast = build_days(&raw.daily, &mut hourly_by_day)?;

    Ok(WeatherData {
        current,
        forecast,
        location,
        unit,
        fetched_at: Utc::now(),
    })
}

fn group_hourly(
    hourly: &HourlyBlock,
) -> Result<BTreeMap<NaiveDate, Vec<HourlyForecast>>, WeatherError> {
    let n = hourly.time.len();
    check_len("hourly", "temperature_2m", n, hourly.temperature_2m.len())?;
    check_len("hourly", "precipitation_probability", n, hourly.precipitation_probability.len())?;
    check_len("hourly", "weather_code", n, hourly.weather_code.len())?;

    let mut by_day: BTreeMap<NaiveDate, Vec<HourlyForecast>> = BTreeMap::new();
    for (i, time) in hourly.time.iter().enumerate() {
        // Far-out hours can come back null; they just don't get an entry
        let Some(temperature) = hourly.temperature_2m[i] else {
            continue;
        };
        let at = parse_date_time(time)?;
        by_day.entry(at.date()).or_default().push(HourlyForecast {
            time: at.time(),
            temperature,
            condition: WeatherCondition::from_wmo_code(hourly.weather_code[i].unwrap_or(0)),
            precipitation_chance: percent(hourly.precipitation_probability[i].unwrap_or(0.0)),
        });
    }

    Ok(by_day)
}

fn build_days(
    daily: &DailyBlock,
    hourly_by_day: &mut BTreeMap<NaiveDate, Vec<HourlyForecast>>,
) -> Result<Vec<DayForecast>, WeatherError> {
    let n = daily.time.len();
    check_len("daily", "weather_code", n, daily.weather_code.len())?;
    check_len("daily", "temperature_2m_max", n, daily.temperature_2m_max.len())?;
    check_len("daily", "temperature_2m_min", n, daily.temperature_2m_min.len())?;
    check_len("daily", "sunrise", n, daily.sunrise.len())?;
    check_len("daily", "sunset", n, daily.sunset.len())?;
    check_len("daily", "uv_index_max", n, daily.uv_index_max.len())?;
    check_len("daily", "sunshine_duration", n, daily.sunshine_duration.len())?;

    let mut days = Vec::with_capacity(n);
    for (i, date) in daily.time.iter().enumerate() {
        let (Some(high), Some(low)) = (daily.temperature_2m_max[i], daily.temperature_2m_min[i])
        else {
            tracing::debug!("Skipping forecast day {} without temperatures", date);
            continue;
        };
        let date = parse_date(date)?;

        days.push(DayForecast {
            date,
            high,
            low,
            condition: WeatherCondition::from_wmo_code(daily.weather_code[i].unwrap_or(0)),
            sunrise: parse_date_time(&daily.sunrise[i])?.time(),
            sunset: parse_date_time(&daily.sunset[i])?.time(),
            uv_index_max: daily.uv_index_max[i].unwrap_or(0.0),
            sunshine_duration_secs: daily.sunshine_duration[i].unwrap_or(0.0),
            hourly: hourly_by_day.remove(&date).unwrap_or_default(),
        });
    }

    Ok(days)
}
