//! Plain-text rendering of suggestions and weather.

use std::fmt::Write;

use skycast_weather::chart::{day_chart, day_heading, ChartMode, ForecastSpan};
use skycast_weather::uv::{sunshine_hours, UvReading};
use skycast_weather::{Suggestion, WeatherData};

/// What the user has chosen to look at
#[derive(Debug, Clone, Copy, Default)]
pub struct View {
    pub span: ForecastSpan,
    pub mode: ChartMode,
    pub day: usize,
}

pub fn suggestions(list: &[Suggestion]) -> String {
    let mut out = String::new();
    for (i, s) in list.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, s.label);
    }
    out
}

pub fn weather(data: &WeatherData, view: &View) -> String {
    let unit = data.unit.symbol();
    let current = &data.current;
    let mut out = String::new();

    let place = data.location.city_name.clone().unwrap_or_else(|| {
        format!("{:.2}, {:.2}", data.location.latitude, data.location.longitude)
    });
    let _ = writeln!(out, "{}", place);
    let _ = writeln!(
        out,
        "  {}{}  {}  (feels like {}{})",
        current.temperature.round(),
        unit,
        current.condition.description(),
        current.feels_like.round(),
        unit
    );
    let _ = writeln!(
        out,
        "  Humidity {}%  Wind {}",
        current.humidity,
        current.wind_speed.round()
    );

    if let Some(day) = data.forecast.get(view.day) {
        let _ = writeln!(out, "\n{}", day_heading(day.date));
        for point in day_chart(data, view.day, view.mode) {
            let temp = point
                .temperature
                .map_or_else(|| "--".to_string(), |t| format!("{}{}", t, unit));
            let rain = point
                .precipitation_chance
                .map_or_else(|| "--".to_string(), |p| format!("{}%", p));
            let condition = point.condition.map_or("", |c| c.description());
            let _ = writeln!(out, "  {:>5}  {:>6}  {:>4}  {}", point.label, temp, rain, condition);
        }

        let uv = UvReading::from_index(day.uv_index_max);
        let _ = write!(out, "\nUV Index {} - Risk: {}", uv.gauge, uv.risk.label());
        if let (Some(spf), Some(minutes)) = (uv.spf, uv.minutes_to_burn) {
            let _ = write!(out, ", SPF {}, burn in ~{} min", spf, minutes);
        }
        let _ = writeln!(out, ", {} h of sun", sunshine_hours(day.sunshine_duration_secs));
        for precaution in uv.risk.precautions() {
            let _ = writeln!(out, "  - {}", precaution.description());
        }
    }

    let _ = writeln!(out, "\nForecast");
    for day in view.span.take(&data.forecast) {
        let _ = writeln!(
            out,
            "  {:<10} {:<24} {} / {}{}",
            day_heading(day.date),
            day.condition.description(),
            day.low.round(),
            day.high.round(),
            unit
        );
    }

    out
}
