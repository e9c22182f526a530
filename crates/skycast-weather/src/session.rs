//! Lookup session: the loading/ready/failed state behind a weather display.
//!
//! Each lookup runs under a [`RequestTracker`] ticket so that only the most
//! recent request can update the visible state. Responses that arrive after
//! a newer lookup has started are dropped.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::aggregate::ReportOptions;
use crate::geocode::MAX_SUGGESTIONS;
use crate::location::LocationQuery;
use crate::provider::WeatherProvider;
use crate::tracker::{Outcome, RequestTicket, RequestTracker};
use crate::types::{CitySuggestion, Coordinates, CurrentWeather, ForecastReport, WeatherError};

/// Current conditions together with the derived forecast views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub current: CurrentWeather,
    /// `None` when the forecast request failed but current conditions arrived
    pub report: Option<ForecastReport>,
}

/// What a display should show
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WeatherView {
    #[default]
    Idle,
    Loading {
        request: u64,
    },
    Ready(Box<WeatherSnapshot>),
    Failed(String),
}

impl WeatherView {
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            WeatherView::Ready(s) => Some(s),
            _ => None,
        }
    }
}

pub struct WeatherSession {
    provider: Arc<WeatherProvider>,
    options: ReportOptions,
    suggestion_limit: usize,
    lookups: RequestTracker,
    autocomplete: RequestTracker,
    view: RwLock<WeatherView>,
    suggestions: RwLock<Vec<CitySuggestion>>,
}

impl WeatherSession {
    pub fn new(provider: Arc<WeatherProvider>, options: ReportOptions) -> Self {
        Self {
            provider,
            options,
            suggestion_limit: MAX_SUGGESTIONS,
            lookups: RequestTracker::new(),
            autocomplete: RequestTracker::new(),
            view: RwLock::new(WeatherView::Idle),
            suggestions: RwLock::new(Vec::new()),
        }
    }

    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    pub fn view(&self) -> WeatherView {
        self.view.read().clone()
    }

    pub fn suggestions(&self) -> Vec<CitySuggestion> {
        self.suggestions.read().clone()
    }

    /// Look up whichever kind of location was resolved.
    pub async fn lookup(
        &self,
        query: &LocationQuery,
    ) -> Result<Outcome<WeatherSnapshot>, WeatherError> {
        match query {
            LocationQuery::City(city) => self.search(city).await,
            LocationQuery::Coordinates(coords) => self.locate(*coords).await,
        }
    }

    /// Current conditions and forecast for a city name.
    pub async fn search(&self, city: &str) -> Result<Outcome<WeatherSnapshot>, WeatherError> {
        let ticket = self.start_lookup();
        // Picking a city closes the suggestion list.
        self.autocomplete.cancel_all();
        self.suggestions.write().clear();

        let fetch = async {
            let (current, report) = tokio::join!(
                self.provider.current_by_city(city),
                self.provider.report(city, &self.options),
            );
            Ok(WeatherSnapshot {
                current: current?,
                report: forecast_or_none(report),
            })
        };

        self.finish_lookup(&ticket, fetch).await
    }

    /// Current conditions and forecast at `coords`.
    pub async fn locate(
        &self,
        coords: Coordinates,
    ) -> Result<Outcome<WeatherSnapshot>, WeatherError> {
        let ticket = self.start_lookup();

        let fetch = async {
            let (current, report) = tokio::join!(
                self.provider.current_by_coords(coords),
                self.provider.report_by_coords(coords, &self.options),
            );
            Ok(WeatherSnapshot {
                current: current?,
                report: forecast_or_none(report),
            })
        };

        self.finish_lookup(&ticket, fetch).await
    }

    /// City suggestions for a partially typed name. Only the newest query's
    /// matches are kept.
    pub async fn suggest(
        &self,
        query: &str,
    ) -> Result<Outcome<Vec<CitySuggestion>>, WeatherError> {
        let ticket = self.autocomplete.begin();
        let fetch = self.provider.suggest_cities(query, self.suggestion_limit);

        match self.autocomplete.run_with(&ticket, fetch).await {
            Outcome::Superseded => Ok(Outcome::Superseded),
            Outcome::Latest(result) => {
                let found = result?;
                let mut guard = self.suggestions.write();
                if !self.autocomplete.is_latest(&ticket) {
                    return Ok(Outcome::Superseded);
                }
                *guard = found.clone();
                Ok(Outcome::Latest(found))
            }
        }
    }

    fn start_lookup(&self) -> RequestTicket {
        let ticket = self.lookups.begin();
        let loading = WeatherView::Loading {
            request: ticket.id(),
        };
        self.publish(&ticket, loading);
        ticket
    }

    async fn finish_lookup<F>(
        &self,
        ticket: &RequestTicket,
        fetch: F,
    ) -> Result<Outcome<WeatherSnapshot>, WeatherError>
    where
        F: std::future::Future<Output = Result<WeatherSnapshot, WeatherError>>,
    {
        match self.lookups.run_with(ticket, fetch).await {
            Outcome::Superseded => Ok(Outcome::Superseded),
            Outcome::Latest(Ok(snapshot)) => {
                let view = WeatherView::Ready(Box::new(snapshot.clone()));
                if self.publish(ticket, view) {
                    Ok(Outcome::Latest(snapshot))
                } else {
                    Ok(Outcome::Superseded)
                }
            }
            Outcome::Latest(Err(e)) => {
                tracing::warn!("Weather lookup failed: {}", e);
                if self.publish(ticket, WeatherView::Failed(e.to_string())) {
                    Err(e)
                } else {
                    Ok(Outcome::Superseded)
                }
            }
        }
    }

    /// Replace the view if `ticket` is still the latest lookup. The check and
    /// the write happen under the view lock.
    fn publish(&self, ticket: &RequestTicket, view: WeatherView) -> bool {
        let mut guard = self.view.write();
        if self.lookups.is_latest(ticket) {
            *guard = view;
            true
        } else {
            tracing::debug!(id = ticket.id(), "Dropping stale weather update");
            false
        }
    }
}

/// Current conditions stand on their own; a failed forecast only drops the
/// derived views.
fn forecast_or_none(result: Result<ForecastReport, WeatherError>) -> Option<ForecastReport> {
    match result {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!("Forecast unavailable: {}", e);
            None
        }
    }
}
