//! Forecast aggregation: turns the provider's 3-hourly samples into the
//! hourly chart series and per-day summaries.
//!
//! Both operations are pure. Samples are taken in the order given; nothing
//! is re-sorted.

use chrono::FixedOffset;

use crate::types::{DaySummary, Forecast, ForecastReport, HourlyPoint, Sample};

pub const DEFAULT_HOURLY_LIMIT: usize = 8;
pub const DEFAULT_CHART_POINTS: usize = 4;
pub const DEFAULT_FORECAST_DAYS: usize = 3;

const TIME_LABEL_FORMAT: &str = "%H:%M";
const DAY_KEY_FORMAT: &str = "%A";

/// How many entries each derived view keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub hourly_limit: usize,
    pub chart_points: usize,
    pub forecast_days: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            hourly_limit: DEFAULT_HOURLY_LIMIT,
            chart_points: DEFAULT_CHART_POINTS,
            forecast_days: DEFAULT_FORECAST_DAYS,
        }
    }
}

/// Map the first `limit` samples to time-labelled temperatures.
pub fn derive_hourly(samples: &[Sample], limit: usize, offset: FixedOffset) -> Vec<HourlyPoint> {
    samples
        .iter()
        .take(limit)
        .map(|s| HourlyPoint {
            time: s.local_time(offset).format(TIME_LABEL_FORMAT).to_string(),
            temperature: s.temperature,
        })
        .collect()
}

/// The leading `points` entries of an hourly series.
pub fn chart_points(hourly: &[HourlyPoint], points: usize) -> &[HourlyPoint] {
    &hourly[..points.min(hourly.len())]
}

/// Per-day summaries for the [`DEFAULT_FORECAST_DAYS`] days after the first.
pub fn derive_daily_summaries(samples: &[Sample], offset: FixedOffset) -> Vec<DaySummary> {
    summarize_days(samples, offset, DEFAULT_FORECAST_DAYS)
}

/// Group samples by weekday in first-seen order, skip the first day (usually
/// partial) and keep the next `days`.
///
/// The first sample of each day decides its condition and icon; later
/// samples only widen the temperature range.
pub fn summarize_days(samples: &[Sample], offset: FixedOffset, days: usize) -> Vec<DaySummary> {
    let mut groups: Vec<DayAccumulator> = Vec::new();

    for sample in samples {
        let key = sample.local_time(offset).format(DAY_KEY_FORMAT).to_string();

        match groups.iter_mut().find(|g| g.day == key) {
            Some(group) => group.add(sample.temperature),
            None => groups.push(DayAccumulator::start(key, sample)),
        }
    }

    groups
        .into_iter()
        .skip(1)
        .take(days)
        .map(DayAccumulator::finish)
        .collect()
}

/// Run every derivation over a fetched forecast.
pub fn build_report(forecast: &Forecast, options: &ReportOptions) -> ForecastReport {
    let offset = forecast.offset();
    let hourly = derive_hourly(&forecast.samples, options.hourly_limit, offset);
    let chart = chart_points(&hourly, options.chart_points).to_vec();
    let days = summarize_days(&forecast.samples, offset, options.forecast_days);

    tracing::debug!(
        samples = forecast.samples.len(),
        hourly = hourly.len(),
        days = days.len(),
        "Built forecast report"
    );

    ForecastReport {
        city: forecast.city.clone(),
        hourly,
        chart,
        days,
    }
}

struct DayAccumulator {
    day: String,
    min: f64,
    max: f64,
    condition: String,
    icon: String,
}

impl DayAccumulator {
    fn start(day: String, sample: &Sample) -> Self {
        Self {
            day,
            min: sample.temperature,
            max: sample.temperature,
            condition: sample.condition.clone(),
            icon: sample.icon.clone(),
        }
    }

    fn add(&mut self, temperature: f64) {
        self.min = self.min.min(temperature);
        self.max = self.max.max(temperature);
    }

    fn finish(self) -> DaySummary {
        DaySummary {
            day: self.day,
            min_temp: self.min.floor() as i32,
            max_temp: self.max.floor() as i32,
            condition: self.condition,
            icon: self.icon,
        }
    }
}
