//! Weather lookup for SkyCast
//!
//! City-name autocomplete backed by Nominatim, forecasts from the Open-Meteo
//! API, and the derived views the app displays (day chart, forecast span,
//! UV risk).

pub mod autofill;
pub mod chart;
pub mod geocode;
pub mod provider;
pub mod types;
pub mod uv;

pub use autofill::{AutofillCoordinator, AutofillSettings, Phase};
pub use chart::{day_chart, ChartMode, ChartPoint, ForecastSpan};
pub use geocode::{short_label, GeocodeClient, GeocodeSettings, Place, PlaceLookup, Suggestion};
pub use provider::{ForecastSettings, WeatherProvider};
pub use types::*;
pub use uv::{UvReading, UvRisk};
