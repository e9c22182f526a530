mod error_mapping;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use skycast_core::{AppError, Config, ConfigError, WeatherError};
use skycast_weather::{
    LocationSources, Outcome, ReportOptions, Units, WeatherProvider, WeatherSession,
    WeatherSnapshot,
};

use crate::error_mapping::{config_load_error, location_error, lookup_error};

/// Current conditions, hourly temperatures and a 3-day forecast from OpenWeatherMap.
#[derive(Parser, Debug)]
#[command(name = "skycast", version, about)]
struct Cli {
    /// Path to config file (default: <config dir>/skycast/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Current conditions, hourly chart and upcoming days
    Now(LocationArgs),
    /// Hourly series and upcoming days only
    Forecast(LocationArgs),
    /// Suggest city names matching a partial query
    Suggest {
        /// Partial city name
        query: String,
    },
    /// Show the config file location and validation result
    Config,
}

#[derive(Args, Debug)]
struct LocationArgs {
    /// City name, e.g. "London" or "Portland,US"
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    city: Option<String>,

    /// Latitude in degrees
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude in degrees
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    if let Err(e) = skycast_core::init(level) {
        eprintln!("Failed to initialize logging: {e:#}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Oops! Something went wrong: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    if let Command::Config = cli.command {
        return show_config(cli.config, cli.json);
    }

    let (config, _) = Config::load_validated(cli.config.as_deref())
        .map_err(config_load_error)?;
    let session = build_session(&config)?;
    let units = weather_units(config.weather.units);

    match cli.command {
        Command::Now(args) => {
            let snapshot = lookup(&session, &config, &args).await?;
            if cli.json {
                print_json(&snapshot)?;
            } else {
                print!(
                    "{}",
                    render::current(&snapshot.current, units, &config.weather.icon_base_url)
                );
                match &snapshot.report {
                    Some(report) => {
                        println!("\n{}-hour forecast", report.chart.len() * 3);
                        print!("{}", render::chart(&report.chart, units));
                        println!("\nFuture forecast");
                        print!("{}", render::days(&report.days, units));
                    }
                    None => println!("\nForecast unavailable"),
                }
            }
        }
        Command::Forecast(args) => {
            let snapshot = lookup(&session, &config, &args).await?;
            let report = snapshot.report.ok_or(WeatherError::ServiceUnavailable)?;
            if cli.json {
                print_json(&report)?;
            } else {
                if let Some(city) = &report.city {
                    println!("{}", city);
                }
                print!("{}", render::chart(&report.hourly, units));
                println!();
                print!("{}", render::days(&report.days, units));
            }
        }
        Command::Suggest { query } => {
            let found = match session.suggest(&query).await.map_err(lookup_error)? {
                Outcome::Latest(found) => found,
                Outcome::Superseded => Vec::new(),
            };
            if cli.json {
                print_json(&found)?;
            } else {
                print!("{}", render::suggestions(&found));
            }
        }
        Command::Config => {}
    }

    Ok(())
}

fn build_session(config: &Config) -> Result<WeatherSession, AppError> {
    let weather = &config.weather;
    let api_key = weather
        .api_key
        .as_deref()
        .filter(|_| weather.has_api_key())
        .ok_or_else(|| ConfigError::MissingSetting("weather.api_key".to_string()))?;

    let provider = WeatherProvider::with_base_url(
        api_key,
        weather_units(weather.units),
        &weather.api_base_url,
        Duration::from_secs(weather.request_timeout_secs),
    )
    .map_err(lookup_error)?;

    let options = ReportOptions {
        hourly_limit: weather.hourly_limit,
        chart_points: weather.chart_points,
        forecast_days: weather.forecast_days,
    };

    Ok(WeatherSession::new(Arc::new(provider), options)
        .with_suggestion_limit(weather.suggestion_limit))
}

async fn lookup(
    session: &WeatherSession,
    config: &Config,
    args: &LocationArgs,
) -> Result<WeatherSnapshot, AppError> {
    let sources = LocationSources {
        coordinates: args.lat.zip(args.lon),
        city: args.city.clone(),
        default_city: config.location.default_city.clone(),
        default_coordinates: config
            .location
            .default_latitude
            .zip(config.location.default_longitude),
    };
    let query = sources.resolve().map_err(location_error)?;
    tracing::debug!(?query, "Resolved location");

    match session.lookup(&query).await.map_err(lookup_error)? {
        Outcome::Latest(snapshot) => Ok(snapshot),
        Outcome::Superseded => Err(WeatherError::ServiceUnavailable.into()),
    }
}

fn show_config(path: Option<PathBuf>, json: bool) -> Result<(), AppError> {
    let path = match path {
        Some(p) => p,
        None => Config::config_path()?,
    };
    let config = Config::load_from(&path).map_err(config_load_error)?;
    let checks = config.validate();

    let errors: Vec<String> = checks.errors.iter().map(ToString::to_string).collect();
    let warnings: Vec<String> = checks.warnings.iter().map(ToString::to_string).collect();

    if json {
        print_json(&serde_json::json!({
            "path": path,
            "valid": checks.is_valid(),
            "api_key_set": config.weather.has_api_key(),
            "errors": errors,
            "warnings": warnings,
        }))?;
    } else {
        println!("Config file: {}", path.display());
        let key_state = if config.weather.has_api_key() {
            "set"
        } else {
            "missing"
        };
        println!("API key:     {}", key_state);
        println!("Units:       {:?}", config.weather.units);
        for e in &errors {
            println!("error:   {}", e);
        }
        for w in &warnings {
            println!("warning: {}", w);
        }
        if checks.is_valid() {
            println!("Configuration is valid");
        }
    }

    Ok(())
}

fn weather_units(units: skycast_core::Units) -> Units {
    match units {
        skycast_core::Units::Metric => Units::Metric,
        skycast_core::Units::Imperial => Units::Imperial,
        skycast_core::Units::Standard => Units::Standard,
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?;
    println!("{}", text);
    Ok(())
}
