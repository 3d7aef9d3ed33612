//! Cache manager for persisting resolved locations to disk
//!
//! Provides a `CacheManager` that loads the whole location cache from a JSON
//! file at start-up and writes the whole cache back at the end of a run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::LocationCache;

/// Current on-disk format version
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Errors that can occur when loading or saving the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache file is not valid JSON or has an unexpected layout
    #[error("Failed to parse cache file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The cache file was written by an incompatible version
    #[error("Unsupported cache format version {0}")]
    UnsupportedVersion(u32),
}

/// Wrapper struct for the cache as stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile<T> {
    /// Format version of the file
    version: u32,
    /// Place name → resolved location
    locations: T,
}

/// Only the version, read before committing to a full parse
#[derive(Debug, Deserialize)]
struct CacheHeader {
    version: u32,
}

/// Reads and writes the location cache file
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Path of the cache file
    path: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager for the file at `path`
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the scratch file written before the final rename
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Ensures the directory holding the cache file exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }

    /// Loads the whole cache
    ///
    /// # Returns
    /// * `Ok(LocationCache)` - the stored cache, or an empty one if the file doesn't exist
    /// * `Err(CacheError)` - the file exists but cannot be read or parsed
    pub fn load(&self) -> Result<LocationCache, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No cache file, starting empty");
                return Ok(LocationCache::new());
            }
            Err(e) => return Err(e.into()),
        };

        let header: CacheHeader = serde_json::from_str(&content)?;
        if header.version != CACHE_FORMAT_VERSION {
            return Err(CacheError::UnsupportedVersion(header.version));
        }

        let file: CacheFile<LocationCache> = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), entries = file.locations.len(), "Loaded cache");
        Ok(file.locations)
    }

    /// Writes the whole cache, replacing the previous file
    ///
    /// The data is written to a sibling `.tmp` file first and renamed over
    /// the target, so an interrupted write leaves the old cache intact.
    pub fn save(&self, cache: &LocationCache) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let file = CacheFile {
            version: CACHE_FORMAT_VERSION,
            locations: cache,
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), entries = cache.len(), "Saved cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Candidate, Point};
    use tempfile::TempDir;

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let manager = CacheManager::with_path(temp_dir.path().join("locations.json"));
        (manager, temp_dir)
    }

    fn sample_cache() -> LocationCache {
        let mut cache = LocationCache::new();
        cache.insert(
            "Paris",
            Candidate {
                location: Point::new(2.3515, 48.8566),
                address: Some("Paris, Île-de-France".to_string()),
                score: Some(100.0),
            },
        );
        cache.insert("Oslo", Candidate::at(Point::new(10.7522, 59.9139)));
        cache
    }

    #[test]
    fn test_load_returns_empty_for_missing_file() {
        let (manager, _temp_dir) = create_test_cache();

        let cache = manager.load().expect("Missing file should not be an error");

        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_entries() {
        let (manager, _temp_dir) = create_test_cache();
        let cache = sample_cache();

        manager.save(&cache).expect("Save should succeed");
        let loaded = manager.load().expect("Load should succeed");

        assert_eq!(loaded, cache);
    }

    #[test]
    fn test_save_writes_versioned_json() {
        let (manager, _temp_dir) = create_test_cache();

        manager.save(&sample_cache()).expect("Save should succeed");

        let content = fs::read_to_string(manager.path()).expect("Should read file");
        let json: serde_json::Value = serde_json::from_str(&content).expect("Should be JSON");
        assert_eq!(json["version"], 1);
        assert_eq!(json["locations"]["Oslo"]["location"]["x"], 10.7522);
        assert_eq!(json["locations"]["Paris"]["score"], 100.0);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let (manager, temp_dir) = create_test_cache();

        manager.save(&sample_cache()).expect("Save should succeed");

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .expect("Should list directory")
            .map(|e| e.expect("Should read entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["locations.json".to_string()]);
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let (manager, _temp_dir) = create_test_cache();
        manager.save(&sample_cache()).expect("First save should succeed");

        let mut smaller = LocationCache::new();
        smaller.insert("Lima", Candidate::at(Point::new(-77.04, -12.05)));
        manager.save(&smaller).expect("Second save should succeed");

        let loaded = manager.load().expect("Load should succeed");
        assert_eq!(loaded, smaller);
    }

    #[test]
    fn test_save_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("locations.json");
        let manager = CacheManager::with_path(nested_path.clone());

        manager.save(&sample_cache()).expect("Save should succeed");

        assert!(nested_path.exists(), "Cache file should exist");
    }

    #[test]
    fn test_load_rejects_corrupt_file() {
        let (manager, _temp_dir) = create_test_cache();
        fs::write(manager.path(), "\u{80}\u{2}}garbage").expect("Should write file");

        let result = manager.load();

        assert!(matches!(result, Err(CacheError::Parse(_))));
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let (manager, _temp_dir) = create_test_cache();
        fs::write(manager.path(), r#"{"version": 7, "locations": []}"#).expect("Should write file");

        let result = manager.load();

        assert!(matches!(result, Err(CacheError::UnsupportedVersion(7))));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let manager = CacheManager::with_path("data/locations.json");

        assert_eq!(manager.temp_path(), PathBuf::from("data/locations.json.tmp"));
    }
}
