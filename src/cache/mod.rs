//! Cache module for storing resolved locations on disk
//!
//! This module provides the in-memory `LocationCache` filled by the resolver
//! and the `CacheManager` that loads it at start-up and writes it back at the
//! end of every run. Places are never evicted: a resolved place is not queried
//! again on later runs.

mod locations;
mod manager;

pub use locations::{CachedLocation, LocationCache};
pub use manager::{CacheError, CacheManager, CACHE_FORMAT_VERSION};
