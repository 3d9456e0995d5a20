//! Line commands for the terminal front end.

use skycast_weather::{ChartMode, ForecastSpan};

pub const HELP: &str = "\
Type part of a city name to see suggestions.
  :pick N          use suggestion N
  :search CITY     look up CITY directly
  :week | :fortnight
  :summary | :hourly
  :day N           show the chart for forecast day N (1 = today)
  :help | :quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text typed into the search box
    Input(String),
    Pick(usize),
    Search(String),
    Span(ForecastSpan),
    Mode(ChartMode),
    Day(usize),
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.strip_prefix(':') else {
            return Self::Input(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest.trim(), ""),
        };

        match name {
            "pick" => match arg.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Pick(n),
                _ => Self::Invalid(format!("expected a suggestion number, got {:?}", arg)),
            },
            "search" if !arg.is_empty() => Self::Search(arg.to_string()),
            "search" => Self::Invalid("search needs a city name".to_string()),
            "week" => Self::Span(ForecastSpan::Week),
            "fortnight" => Self::Span(ForecastSpan::Fortnight),
            "summary" => Self::Mode(ChartMode::Summary),
            "hourly" => Self::Mode(ChartMode::Hourly),
            "day" => match arg.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Day(n - 1),
                _ => Self::Invalid(format!("expected a day number, got {:?}", arg)),
            },
            "help" | "h" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command :{}", other)),
        }
    }
}
