mod commands;
mod error_mapping;
mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use skycast_core::{AppError, Config, ConfigError};
use skycast_weather::{
    AutofillCoordinator, AutofillSettings, ForecastSettings, GeocodeClient, GeocodeSettings,
    TemperatureUnit, WeatherData, WeatherProvider,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;

use commands::{Command, HELP};
use render::View;

fn autofill_settings(config: &Config) -> AutofillSettings {
    AutofillSettings {
        debounce: Duration::from_millis(config.autofill.debounce_ms),
        max_suggestions: config.autofill.max_suggestions,
        lookup_timeout: Duration::from_secs(config.autofill.request_timeout_secs),
    }
}

fn geocode_settings(config: &Config) -> GeocodeSettings {
    GeocodeSettings {
        base_url: config.geocoding.base_url.clone(),
        user_agent: config.geocoding.user_agent.clone(),
        timeout: Duration::from_secs(config.autofill.request_timeout_secs),
    }
}

fn forecast_settings(config: &Config) -> ForecastSettings {
    ForecastSettings {
        base_url: config.weather.base_url.clone(),
        unit: match config.weather.temperature_unit {
            skycast_core::TemperatureUnit::Celsius => TemperatureUnit::Celsius,
            skycast_core::TemperatureUnit::Fahrenheit => TemperatureUnit::Fahrenheit,
        },
        forecast_days: config.weather.forecast_days,
        timeout: Duration::from_secs(config.weather.request_timeout_secs),
    }
}

struct Session {
    geocoder: GeocodeClient,
    provider: WeatherProvider,
    autofill: AutofillCoordinator,
    view: View,
    weather: Option<WeatherData>,
}

impl Session {
    async fn show_weather_for(&mut self, city: &str) {
        println!("Fetching weather for {}...", city);
        match self.provider.fetch_city(&self.geocoder, city).await {
            Ok(data) => {
                self.view.day = 0;
                print!("{}", render::weather(&data, &self.view));
                self.weather = Some(data);
            }
            Err(e) => {
                tracing::warn!("Weather fetch for {:?} failed: {}", city, e);
                self.weather = None;
                eprintln!("{}", error_mapping::weather_error(e).user_message());
            }
        }
    }

    fn redraw(&self) {
        if let Some(data) = &self.weather {
            print!("{}", render::weather(data, &self.view));
        }
    }

    /// Returns false when the user asked to quit
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Input(text) => self.autofill.submit(&text),
            Command::Pick(n) => {
                let list = self.autofill.suggestions();
                let Some(choice) = list.get(n - 1) else {
                    eprintln!("No suggestion {} (have {})", n, list.len());
                    return true;
                };
                if let Some(label) = self.autofill.select_suggestion(&choice.id) {
                    self.show_weather_for(&label).await;
                }
            }
            Command::Search(city) => {
                self.autofill.reset();
                self.show_weather_for(&city).await;
            }
            Command::Span(span) => {
                self.view.span = span;
                self.redraw();
            }
            Command::Mode(mode) => {
                self.view.mode = mode;
                self.redraw();
            }
            Command::Day(day) => {
                self.view.day = day;
                self.redraw();
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return false,
            Command::Invalid(msg) => eprintln!("{}", msg),
        }
        true
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let (config, _) = Config::load_validated().map_err(|e| {
        let err = AppError::from(ConfigError::Invalid(format!("{:#}", e)));
        eprintln!("{}", err.user_message());
        e
    })?;

    let geocoder = GeocodeClient::new(&geocode_settings(&config))
        .context("Failed to create geocoding client")?;
    let provider = WeatherProvider::new(&forecast_settings(&config))
        .context("Failed to create weather provider")?;
    let autofill = AutofillCoordinator::new(
        Arc::new(geocoder.clone()),
        autofill_settings(&config),
        Handle::current(),
    );

    let mut updates = autofill.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let list = updates.borrow_and_update().clone();
            if !list.is_empty() {
                print!("{}", render::suggestions(&list));
            }
        }
    });

    tracing::info!("SkyCast started");
    println!("SkyCast - city weather lookup");
    println!("{}", HELP);

    let mut session = Session {
        geocoder,
        provider,
        autofill,
        view: View::default(),
        weather: None,
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(AppError::from)? {
        if !session.handle(Command::parse(&line)).await {
            break;
        }
    }

    session.autofill.reset();
    tracing::info!("SkyCast shutting down");
    Ok(())
}
