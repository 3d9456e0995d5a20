//! Display buckets for the day chart and the forecast list.

use chrono::{Datelike, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::types::{DayForecast, WeatherCondition, WeatherData};

/// How densely the day chart samples the hourly forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    /// Every second hour, 12 points
    #[default]
    Summary,
    /// All 24 hours
    Hourly,
}

impl ChartMode {
    fn step(&self) -> usize {
        match self {
            Self::Summary => 2,
            Self::Hourly => 1,
        }
    }
}

/// One column of the day chart. Fields are `None` when the forecast has no
/// entry for that hour.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub hour: u32,
    pub label: String,
    pub temperature: Option<i32>,
    pub precipitation_chance: Option<u8>,
    pub condition: Option<WeatherCondition>,
}

/// "12 AM", "1 AM", ... "11 PM"
pub fn hour_label(hour: u32) -> String {
    let suffix = if hour % 24 < 12 { "AM" } else { "PM" };
    let h = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{} {}", h, suffix)
}

/// Chart columns for the `day_index`-th forecast day.
///
/// Returns an empty chart for a day past the end of the forecast.
pub fn day_chart(data: &WeatherData, day_index: usize, mode: ChartMode) -> Vec<ChartPoint> {
    let Some(day) = data.forecast.get(day_index) else {
        return Vec::new();
    };

    (0..24u32)
        .step_by(mode.step())
        .map(|hour| {
            let entry = day.hourly.iter().find(|h| h.time.hour() == hour);
            ChartPoint {
                hour,
                label: hour_label(hour),
                temperature: entry.map(|h| h.temperature.round() as i32),
                precipitation_chance: entry.map(|h| h.precipitation_chance),
                condition: entry.map(|h| h.condition),
            }
        })
        .collect()
}

/// Heading for a forecast day, e.g. "Mon, 1st"
pub fn day_heading(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}, {}{}", date.format("%a"), day, suffix)
}

/// How many days the forecast list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastSpan {
    #[default]
    Week,
    Fortnight,
}

impl ForecastSpan {
    pub fn days(&self) -> usize {
        match self {
            Self::Week => 7,
            Self::Fortnight => 14,
        }
    }

    pub fn take<'a>(&self, forecast: &'a [DayForecast]) -> &'a [DayForecast] {
        &forecast[..forecast.len().min(self.days())]
    }
}
