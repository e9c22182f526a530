//! Plain-text rendering of lookups for the terminal.

use std::fmt::Write;

use skycast_weather::{icon_url, CitySuggestion, CurrentWeather, DaySummary, HourlyPoint, Units};

const BAR_WIDTH: usize = 24;

pub fn current(current: &CurrentWeather, units: Units, icon_base_url: &str) -> String {
    let t = units.temperature_symbol();
    let observed = current.observed_local();
    let mut out = String::new();

    let _ = writeln!(out, "{}", current.city);
    let _ = writeln!(
        out,
        "  {}  {}",
        observed.format("%A, %b %-d, %Y"),
        observed.format("%-I:%M %p")
    );
    let _ = writeln!(
        out,
        "  {}{}  {}",
        current.temperature.floor(),
        t,
        current.description
    );
    let _ = writeln!(out, "  Real feel  {}{}", current.feels_like.floor(), t);
    let _ = writeln!(out, "  Humidity   {}%", current.humidity);
    let _ = writeln!(
        out,
        "  Wind       {} {}",
        current.wind_speed,
        units.wind_speed_symbol()
    );
    let _ = writeln!(
        out,
        "  High {}{}  Low {}{}",
        current.temp_max.floor(),
        t,
        current.temp_min.floor(),
        t
    );
    if let (Some(rise), Some(set)) = (current.sunrise_local(), current.sunset_local()) {
        let _ = writeln!(
            out,
            "  Rise {}  Set {}",
            rise.format("%H:%M"),
            set.format("%H:%M")
        );
    }
    let _ = writeln!(
        out,
        "  Icon       {}",
        icon_url(icon_base_url, &current.icon)
    );

    out
}

/// One row per point with a bar scaled between the series' min and max.
pub fn chart(points: &[HourlyPoint], units: Units) -> String {
    if points.is_empty() {
        return "  No hourly data\n".to_string();
    }

    let lo = points
        .iter()
        .map(|p| p.temperature)
        .fold(f64::INFINITY, f64::min);
    let hi = points
        .iter()
        .map(|p| p.temperature)
        .fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;

    let mut out = String::new();
    for p in points {
        let filled = if span > 0.0 {
            1 + (((p.temperature - lo) / span) * (BAR_WIDTH - 1) as f64).round() as usize
        } else {
            BAR_WIDTH / 2
        };
        let _ = writeln!(
            out,
            "  {}  {:>6.1}{}  {}",
            p.time,
            p.temperature,
            units.temperature_symbol(),
            "█".repeat(filled)
        );
    }
    out
}

pub fn days(days: &[DaySummary], units: Units) -> String {
    if days.is_empty() {
        return "  No forecast days available\n".to_string();
    }

    let t = units.temperature_symbol();
    let mut out = String::new();
    for d in days {
        let _ = writeln!(
            out,
            "  {:<10} {:<13} {:>5}{}  ({}{} / {}{})",
            d.day,
            d.condition,
            d.average_temp(),
            t,
            d.min_temp,
            t,
            d.max_temp,
            t
        );
    }
    out
}

pub fn suggestions(found: &[CitySuggestion]) -> String {
    if found.is_empty() {
        return "No matching cities\n".to_string();
    }

    let mut out = String::new();
    for (i, s) in found.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}  ({:.4}, {:.4})",
            i + 1,
            s.label(),
            s.coordinates.latitude,
            s.coordinates.longitude
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_weather::Coordinates;

    fn point(time: &str, temperature: f64) -> HourlyPoint {
        HourlyPoint {
            time: time.to_string(),
            temperature,
        }
    }

    fn lisbon() -> CurrentWeather {
        CurrentWeather {
            city: "Lisbon".into(),
            // 2024-03-05T12:00:00Z
            observed_at: 1_709_640_000,
            utc_offset_secs: 0,
            temperature: 16.8,
            feels_like: 16.2,
            temp_min: 15.1,
            temp_max: 18.0,
            humidity: 62,
            wind_speed: 4.1,
            condition: "Clear".into(),
            description: "clear sky".into(),
            icon: "01d".into(),
            sunrise: Some(1_709_621_000),
            sunset: Some(1_709_662_000),
        }
    }

    #[test]
    fn test_current_block() {
        let text = current(
            &lisbon(),
            Units::Metric,
            "https://openweathermap.org/img/wn",
        );
        assert!(text.starts_with("Lisbon\n"));
        assert!(text.contains("Tuesday, Mar 5, 2024"));
        assert!(text.contains("16°C  clear sky"));
        assert!(text.contains("Humidity   62%"));
        assert!(text.contains("4.1 m/s"));
        assert!(text.contains("High 18°C  Low 15°C"));
        assert!(text.contains("https://openweathermap.org/img/wn/01d.png"));
    }

    #[test]
    fn test_chart_bars_scale_with_temperature() {
        let text = chart(
            &[
                point("09:00", 10.0),
                point("12:00", 20.0),
                point("15:00", 15.0),
            ],
            Units::Metric,
        );
        let bars: Vec<usize> = text
            .lines()
            .map(|l| l.chars().filter(|c| *c == '█').count())
            .collect();
        assert_eq!(bars[0], 1);
        assert_eq!(bars[1], BAR_WIDTH);
        assert!(bars[0] < bars[2] && bars[2] < bars[1]);
    }

    #[test]
    fn test_chart_flat_series() {
        let text = chart(&[point("09:00", 5.0), point("12:00", 5.0)], Units::Metric);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("5.0°C"));
    }

    #[test]
    fn test_chart_empty() {
        assert!(chart(&[], Units::Metric).contains("No hourly data"));
    }

    #[test]
    fn test_day_cards_show_average_and_range() {
        let text = days(
            &[DaySummary {
                day: "Wednesday".into(),
                min_temp: 10,
                max_temp: 15,
                condition: "Rain".into(),
                icon: "10d".into(),
            }],
            Units::Imperial,
        );
        assert!(text.contains("Wednesday"));
        assert!(text.contains("12.5°F"));
        assert!(text.contains("(10°F / 15°F)"));
    }

    #[test]
    fn test_suggestion_list() {
        let text = suggestions(&[CitySuggestion {
            name: "Bern".into(),
            state: None,
            country: Some("CH".into()),
            coordinates: Coordinates {
                latitude: 46.948,
                longitude: 7.4474,
            },
        }]);
        assert_eq!(text, "1. Bern, CH  (46.9480, 7.4474)\n");
        assert!(suggestions(&[]).contains("No matching"));
    }
}
