use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Value of Open-Meteo's `temperature_unit` parameter
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    /// Wind speed unit that goes with this temperature unit
    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            Self::Celsius => "kmh",
            Self::Fahrenheit => "mph",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "\u{00B0}C",
            Self::Fahrenheit => "\u{00B0}F",
        }
    }
}

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    LightDrizzle,
    ModerateDrizzle,
    DenseDrizzle,
    LightFreezingDrizzle,
    DenseFreezingDrizzle,
    LightRain,
    ModerateRain,
    HeavyRain,
    LightFreezingRain,
    HeavyFreezingRain,
    LightSnowFall,
    ModerateSnowFall,
    HeavySnowFall,
    SnowGrains,
    LightRainShowers,
    ModerateRainShowers,
    ViolentRainShowers,
    LightSnowShowers,
    HeavySnowShowers,
    Thunderstorm,
    ThunderstormLightHail,
    ThunderstormHeavyHail,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 => Self::LightDrizzle,
            53 => Self::ModerateDrizzle,
            55 => Self::DenseDrizzle,
            56 => Self::LightFreezingDrizzle,
            57 => Self::DenseFreezingDrizzle,
            61 => Self::LightRain,
            63 => Self::ModerateRain,
            65 => Self::HeavyRain,
            66 => Self::LightFreezingRain,
            67 => Self::HeavyFreezingRain,
            71 => Self::LightSnowFall,
            73 => Self::ModerateSnowFall,
            75 => Self::HeavySnowFall,
            77 => Self::SnowGrains,
            80 => Self::LightRainShowers,
            81 => Self::ModerateRainShowers,
            82 => Self::ViolentRainShowers,
            85 => Self::LightSnowShowers,
            86 => Self::HeavySnowShowers,
            95 => Self::Thunderstorm,
            96 => Self::ThunderstormLightHail,
            99 => Self::ThunderstormHeavyHail,
            _ => Self::Clear, // Unknown codes default to clear
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::MainlyClear => "Mainly Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Overcast => "Cloudy",
            Self::Fog => "Foggy",
            Self::LightDrizzle => "Light Drizzle",
            Self::ModerateDrizzle => "Moderate Drizzle",
            Self::DenseDrizzle => "Dense Drizzle",
            Self::LightFreezingDrizzle => "Light Freezing Drizzle",
            Self::DenseFreezingDrizzle => "Dense Freezing Drizzle",
            Self::LightRain => "Light Rain",
            Self::ModerateRain => "Moderate Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::LightFreezingRain => "Light Freezing Rain",
            Self::HeavyFreezingRain => "Heavy Freezing Rain",
            Self::LightSnowFall => "Light Snow Fall",
            Self::ModerateSnowFall => "Moderate Snow Fall",
            Self::HeavySnowFall => "Heavy Snow Fall",
            Self::SnowGrains => "Snow Grains",
            Self::LightRainShowers => "Slight Rain Showers",
            Self::ModerateRainShowers => "Moderate Rain Showers",
            Self::ViolentRainShowers => "Violent Rain Showers",
            Self::LightSnowShowers => "Light Snow Showers",
            Self::HeavySnowShowers => "Heavy Snow Showers",
            Self::Thunderstorm => "Thunderstorms",
            Self::ThunderstormLightHail => "T-storms w/ Light Hail",
            Self::ThunderstormHeavyHail => "T-storms w/ Heavy Hail",
        }
    }

    /// Get icon name; artwork lives with the presentation layer
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear | Self::MainlyClear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Overcast => "cloud",
            Self::Fog => "cloud_fog",
            Self::LightDrizzle | Self::ModerateDrizzle | Self::DenseDrizzle => "cloud_drizzle",
            Self::LightFreezingDrizzle
            | Self::DenseFreezingDrizzle
            | Self::LightFreezingRain
            | Self::HeavyFreezingRain => "cloud_sleet",
            Self::LightRain | Self::ModerateRainShowers => "cloud_rain",
            Self::LightRainShowers => "cloud_sun_rain",
            Self::ModerateRain | Self::HeavyRain | Self::ViolentRainShowers => "cloud_showers_heavy",
            Self::LightSnowFall
            | Self::ModerateSnowFall
            | Self::HeavySnowFall
            | Self::LightSnowShowers
            | Self::HeavySnowShowers => "snowflake",
            Self::SnowGrains => "asterisk",
            Self::Thunderstorm | Self::ThunderstormLightHail | Self::ThunderstormHeavyHail => {
                "cloud_lightning"
            }
        }
    }
}

/// Geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city_name: Option<String>,
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub is_day: bool,
    pub condition: WeatherCondition,
    /// Local time at the location
    pub observed_at: NaiveDateTime,
}

/// Hourly forecast entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub time: NaiveTime,
    pub temperature: f64,
    pub condition: WeatherCondition,
    pub precipitation_chance: u8,
}

/// Daily forecast entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub condition: WeatherCondition,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub uv_index_max: f64,
    pub sunshine_duration_secs: f64,
    /// Up to 24 entries, in hour order
    pub hourly: Vec<HourlyForecast>,
}

/// Complete weather data bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherData {
    pub current: CurrentWeather,
    pub forecast: Vec<DayForecast>,
    pub location: Location,
    pub unit: TemperatureUnit,
    pub fetched_at: DateTime<Utc>,
}

/// Geocoding errors
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Geocoder returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("No place matches {0:?}")]
    NotFound(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Forecast service returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),
}
