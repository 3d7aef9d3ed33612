//! Location resolver
//!
//! Walks the place list in file order, answers from the cache where it can and
//! asks the geocoder for everything else. Lookups are strictly sequential.
//! A timeout, an operator interrupt or any other lookup failure stops the walk
//! early but keeps everything resolved so far in the cache.
//!
//! The first Ctrl-C lets the current lookup finish so partial results are
//! saved. A second Ctrl-C exits the process immediately with status 130,
//! without saving the cache or writing the map.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::LocationCache;
use crate::data::{Candidate, GeocodeError, Geocoder, PlaceRow};

/// Operator interrupt flag shared with the Ctrl-C listener
///
/// The resolver polls it between rows; a query already in flight is allowed
/// to finish.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and returns whether it was already set
    pub fn trigger(&self) -> bool {
        self.flag.swap(true, Ordering::SeqCst)
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Spawns a task that triggers this flag on Ctrl-C
    ///
    /// A Ctrl-C arriving after the flag is already set exits the process.
    pub fn listen_for_ctrl_c(&self) {
        let interrupt = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for interrupt signal: {}", e);
                    return;
                }
                if interrupt.trigger() {
                    warn!("Second interrupt received, exiting without saving");
                    std::process::exit(130);
                }
                warn!("Interrupt received, stopping after the current lookup");
                info!("Press Ctrl-C again to exit immediately");
            }
        });
    }
}

/// Outcome of handling a single row
#[derive(Debug)]
pub enum Lookup {
    /// Already in the cache, no query made
    Cached,
    /// The geocoder returned a match
    Resolved(Candidate),
    /// The geocoder had no usable match
    NotFound,
    /// The query timed out
    TimedOut,
    /// The operator interrupted before the query was made
    Cancelled,
    /// Any other lookup failure
    Failed(GeocodeError),
}

/// Why resolution stopped before the end of the place list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    TimedOut,
    Interrupted,
    Failed(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::TimedOut => write!(f, "Geocoder timed out"),
            StopReason::Interrupted => write!(f, "Interrupted by operator"),
            StopReason::Failed(message) => write!(f, "Lookup failed: {}", message),
        }
    }
}

/// Counters for a resolution run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Places newly resolved and cached
    pub added: usize,
    /// Places already in the cache
    pub skipped: usize,
    /// Places the geocoder could not resolve
    pub unknown: usize,
    /// Set when the walk ended before the last row
    pub stopped: Option<StopReason>,
}

impl ResolveReport {
    /// Rows processed, not counting the row an early stop happened on
    pub fn total(&self) -> usize {
        self.added + self.skipped + self.unknown
    }
}

impl fmt::Display for ResolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Added: {} / Skipped: {} / Unknown: {} / Total: {}",
            self.added,
            self.skipped,
            self.unknown,
            self.total()
        )
    }
}

/// Decides what to do with one place
async fn lookup<G>(
    geocoder: &G,
    cache: &LocationCache,
    place: &str,
    interrupt: &Interrupt,
) -> Lookup
where
    G: Geocoder + ?Sized,
{
    if interrupt.is_triggered() {
        return Lookup::Cancelled;
    }
    if cache.contains(place) {
        return Lookup::Cached;
    }

    match geocoder.geocode(place).await {
        Ok(Some(candidate)) => Lookup::Resolved(candidate),
        Ok(None) => Lookup::NotFound,
        Err(GeocodeError::Timeout) => Lookup::TimedOut,
        Err(e) => Lookup::Failed(e),
    }
}

/// Resolves every row's place into `cache`
///
/// Rows are handled in order. Places already cached are counted as skipped;
/// new matches are inserted and counted as added; places without a match are
/// counted as unknown and left out of the cache so the next run retries them.
/// The first timeout, interrupt or other failure ends the walk, and the row
/// it happened on is not counted.
pub async fn resolve_places<G>(
    rows: &[PlaceRow],
    cache: &mut LocationCache,
    geocoder: &G,
    interrupt: &Interrupt,
) -> ResolveReport
where
    G: Geocoder + ?Sized,
{
    let mut report = ResolveReport::default();

    for row in rows {
        let place = row.place.as_str();

        let stop = match lookup(geocoder, cache, place, interrupt).await {
            Lookup::Cached => {
                info!("Skipped {}", place);
                report.skipped += 1;
                continue;
            }
            Lookup::Resolved(candidate) => {
                debug!(
                    row = %row.id,
                    x = candidate.location.x,
                    y = candidate.location.y,
                    "Resolved {}",
                    place
                );
                cache.insert(place, candidate);
                info!("Added {}", place);
                report.added += 1;
                continue;
            }
            Lookup::NotFound => {
                warn!("Unknown city {}", place);
                report.unknown += 1;
                continue;
            }
            Lookup::TimedOut => StopReason::TimedOut,
            Lookup::Cancelled => StopReason::Interrupted,
            Lookup::Failed(e) => StopReason::Failed(e.to_string()),
        };

        warn!(place, "{}, stopping resolution", stop);
        report.stopped = Some(stop);
        break;
    }

    report
}
