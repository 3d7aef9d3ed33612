//! In-memory location cache
//!
//! Maps place names to the candidate the geocoder returned for them. Entries
//! are only ever added: once a place resolves it is never queried again.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{Candidate, Point};

/// A resolved place as stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLocation {
    /// The raw geocoder match
    #[serde(flatten)]
    pub candidate: Candidate,
    /// When the place was resolved
    pub cached_at: DateTime<Utc>,
}

impl CachedLocation {
    pub fn new(candidate: Candidate) -> Self {
        Self {
            candidate,
            cached_at: Utc::now(),
        }
    }

    pub fn location(&self) -> Point {
        self.candidate.location
    }
}

/// Place name → resolved location, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationCache {
    entries: BTreeMap<String, CachedLocation>,
}

impl LocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, place: &str) -> bool {
        self.entries.contains_key(place)
    }

    pub fn get(&self, place: &str) -> Option<&CachedLocation> {
        self.entries.get(place)
    }

    /// Stores `candidate` under `place` unless the place is already cached
    ///
    /// Returns `true` if a new entry was added. An existing entry is kept
    /// as is, even if the new candidate differs.
    pub fn insert(&mut self, place: impl Into<String>, candidate: Candidate) -> bool {
        let place = place.into();
        if self.entries.contains_key(&place) {
            return false;
        }
        self.entries.insert(place, CachedLocation::new(candidate));
        true
    }

    /// Iterates entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CachedLocation)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(x: f64, y: f64) -> Candidate {
        Candidate::at(Point::new(x, y))
    }

    #[test]
    fn test_insert_new_place() {
        let mut cache = LocationCache::new();

        assert!(cache.insert("Paris", candidate(2.35, 48.85)));

        assert_eq!(cache.len(), 1);
        assert!(cache.contains("Paris"));
        assert_eq!(cache.get("Paris").unwrap().location(), Point::new(2.35, 48.85));
    }

    #[test]
    fn test_insert_never_replaces_existing_entry() {
        let mut cache = LocationCache::new();
        cache.insert("Paris", candidate(2.35, 48.85));
        let original = cache.get("Paris").cloned().unwrap();

        assert!(!cache.insert("Paris", candidate(-95.55, 33.66)));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("Paris"), Some(&original));
    }

    #[test]
    fn test_iteration_is_sorted_by_name() {
        let mut cache = LocationCache::new();
        cache.insert("Vienna", candidate(16.37, 48.21));
        cache.insert("Amsterdam", candidate(4.9, 52.37));
        cache.insert("Madrid", candidate(-3.7, 40.42));

        let names: Vec<&str> = cache.names().collect();

        assert_eq!(names, vec!["Amsterdam", "Madrid", "Vienna"]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut cache = LocationCache::new();
        cache.insert("paris", candidate(2.35, 48.85));

        assert!(!cache.contains("Paris"));
    }

    #[test]
    fn test_cached_location_serializes_flat() {
        let entry = CachedLocation::new(Candidate {
            location: Point::new(2.0, 48.0),
            address: Some("Paris".to_string()),
            score: Some(100.0),
        });

        let json = serde_json::to_value(&entry).expect("Should serialize");

        assert_eq!(json["location"]["x"], 2.0);
        assert_eq!(json["location"]["y"], 48.0);
        assert_eq!(json["address"], "Paris");
        assert_eq!(json["score"], 100.0);
        assert!(json["cached_at"].is_string());
    }
}
