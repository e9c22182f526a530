//! Weather lookups for Skycast
//!
//! Fetches current conditions, forecasts and city suggestions from the
//! OpenWeatherMap API and derives the hourly chart series and per-day
//! summaries shown to the user.

pub mod aggregate;
mod api;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod session;
pub mod tracker;
pub mod types;

pub use aggregate::{
    build_report, chart_points, derive_daily_summaries, derive_hourly, summarize_days,
    ReportOptions,
};
pub use location::{LocationQuery, LocationSources};
pub use provider::WeatherProvider;
pub use session::{WeatherSession, WeatherSnapshot, WeatherView};
pub use tracker::{Outcome, RequestTicket, RequestTracker};
pub use types::*;
