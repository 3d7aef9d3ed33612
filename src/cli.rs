//! Command-line interface parsing for citymap
//!
//! This module handles parsing of CLI arguments using clap and validates them
//! into the `RunConfig` the pipeline runs with. Every file the program touches
//! is a flag with the historical file name as its default.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::ARCGIS_FIND_URL;
use crate::map::MapOptions;

/// Log levels accepted by `--log-level`
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The request timeout must be at least one second
    #[error("Invalid timeout: must be at least 1 second")]
    InvalidTimeout,

    /// The log level name is not recognized
    #[error("Invalid log level: '{0}'. Valid levels: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// citymap - geocode a list of cities and plot them on a clustered web map
#[derive(Parser, Debug)]
#[command(name = "citymap")]
#[command(about = "Geocode cities from a CSV file and render them on a clustered map")]
#[command(version)]
pub struct Cli {
    /// Semicolon-delimited place list; the second field of each line is geocoded
    #[arg(long, value_name = "FILE", default_value = "locations.csv")]
    pub input: PathBuf,

    /// Location cache, created on first run and reused afterwards
    #[arg(long, value_name = "FILE", default_value = "locations.json")]
    pub cache: PathBuf,

    /// Where to write the rendered map
    #[arg(long, value_name = "FILE", default_value = "map.html")]
    pub output: PathBuf,

    /// Geocoder request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    pub timeout: u64,

    /// ArcGIS findAddressCandidates endpoint
    #[arg(long, value_name = "URL", default_value = ARCGIS_FIND_URL)]
    pub geocoder_url: String,

    /// Title of the rendered page
    #[arg(long, value_name = "TEXT", default_value = "citymap")]
    pub title: String,

    /// Name of the marker cluster layer
    #[arg(long, value_name = "NAME", default_value = "CAT Locations")]
    pub layer_name: String,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Configuration derived from CLI arguments for a pipeline run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_path: PathBuf,
    pub cache_path: PathBuf,
    pub output_path: PathBuf,
    pub timeout: Duration,
    pub geocoder_url: String,
    pub map: MapOptions,
    /// Normalized lowercase level name
    pub log_level: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("locations.csv"),
            cache_path: PathBuf::from("locations.json"),
            output_path: PathBuf::from("map.html"),
            timeout: Duration::from_secs(10),
            geocoder_url: ARCGIS_FIND_URL.to_string(),
            map: MapOptions::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Parses a log level name, case-insensitively
pub fn parse_log_level(s: &str) -> Result<String, CliError> {
    let level = s.to_lowercase();
    if LOG_LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(CliError::InvalidLogLevel(s.to_string()))
    }
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(RunConfig)` with validated settings
    /// * `Err(CliError)` if the timeout is zero or the log level is unknown
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.timeout == 0 {
            return Err(CliError::InvalidTimeout);
        }
        let log_level = parse_log_level(&cli.log_level)?;

        Ok(RunConfig {
            input_path: cli.input.clone(),
            cache_path: cli.cache.clone(),
            output_path: cli.output.clone(),
            timeout: Duration::from_secs(cli.timeout),
            geocoder_url: cli.geocoder_url.clone(),
            map: MapOptions {
                title: cli.title.clone(),
                layer_name: cli.layer_name.clone(),
                ..MapOptions::default()
            },
            log_level,
        })
    }
}
