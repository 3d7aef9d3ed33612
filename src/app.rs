//! Resolve-then-render pipeline for citymap
//!
//! Loads the place list and the cache, resolves every place, saves the cache
//! whatever happened during resolution, and renders the map from the full
//! cache.

use thiserror::Error;
use tracing::{info, warn};

use crate::cache::{CacheError, CacheManager, LocationCache};
use crate::cli::RunConfig;
use crate::data::{read_places, Geocoder};
use crate::map::write_map;
use crate::resolver::{resolve_places, Interrupt, ResolveReport};

/// Errors that stop the pipeline
#[derive(Debug, Error)]
pub enum AppError {
    /// The place list could not be read
    #[error("Failed to read input file {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The cache could not be loaded or saved
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The map could not be written
    #[error("Failed to write map {path}: {source}")]
    Render {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What a pipeline run produced
#[derive(Debug)]
pub struct RunSummary {
    /// Resolution counters
    pub report: ResolveReport,
    /// The full cache after the run, as rendered
    pub locations: LocationCache,
    /// Markers written to the map
    pub markers: usize,
}

/// Runs the full pipeline
///
/// A resolution that stops early (timeout, interrupt, lookup failure) is not
/// an error: the partial results are saved and rendered like a complete run.
///
/// # Returns
/// * `Ok(RunSummary)` once the cache is saved and the map is written
/// * `Err(AppError)` if the input, the cache file or the output cannot be accessed
pub async fn run<G>(
    config: &RunConfig,
    geocoder: &G,
    interrupt: &Interrupt,
) -> Result<RunSummary, AppError>
where
    G: Geocoder + ?Sized,
{
    let cache_manager = CacheManager::with_path(&config.cache_path);
    let mut locations = cache_manager.load()?;
    let known_before = locations.len();

    let rows = read_places(&config.input_path).map_err(|source| AppError::Input {
        path: config.input_path.display().to_string(),
        source,
    })?;
    info!(rows = rows.len(), cached = known_before, "Resolving places");

    let report = resolve_places(&rows, &mut locations, geocoder, interrupt).await;
    if let Some(reason) = &report.stopped {
        warn!("Resolution stopped early: {}", reason);
    }

    cache_manager.save(&locations)?;
    info!(path = %cache_manager.path().display(), entries = locations.len(), "Cache saved");

    let markers =
        write_map(&config.output_path, &locations, &config.map).map_err(|source| {
            AppError::Render {
                path: config.output_path.display().to_string(),
                source,
            }
        })?;

    Ok(RunSummary {
        report,
        locations,
        markers,
    })
}
