//! Place list input
//!
//! Reads the semicolon-delimited place list. Only the first two fields of a
//! line matter: an identifier and the place name to geocode.

use std::fs;
use std::path::Path;

use tracing::debug;

/// Field separator used by the place list
const FIELD_SEPARATOR: char = ';';

/// A single line of the place list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceRow {
    /// First field, carried for diagnostics only
    pub id: String,
    /// Second field, the name sent to the geocoder and used as cache key
    pub place: String,
}

/// Parses place rows from the raw file contents
///
/// Lines are split on `\n` (a trailing `\r` is dropped) and then on `;`.
/// Lines without a non-empty second field are skipped.
pub fn parse_places(content: &str) -> Vec<PlaceRow> {
    let mut rows = Vec::new();

    for (index, line) in content.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut fields = line.split(FIELD_SEPARATOR);
        let id = fields.next().unwrap_or_default();

        match fields.next() {
            Some(place) if !place.is_empty() => rows.push(PlaceRow {
                id: id.to_string(),
                place: place.to_string(),
            }),
            _ => debug!(line = index + 1, "Skipping line without a place field"),
        }
    }

    rows
}

/// Reads and parses the place list at `path`
pub fn read_places(path: &Path) -> std::io::Result<Vec<PlaceRow>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_places(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn places(rows: &[PlaceRow]) -> Vec<&str> {
        rows.iter().map(|r| r.place.as_str()).collect()
    }

    #[test]
    fn test_parse_keeps_file_order_and_duplicates() {
        let rows = parse_places("A;Paris\nB;Zzzzznotacity\nC;Paris");

        assert_eq!(places(&rows), vec!["Paris", "Zzzzznotacity", "Paris"]);
        assert_eq!(rows[0].id, "A");
        assert_eq!(rows[2].id, "C");
    }

    #[test]
    fn test_parse_ignores_fields_after_the_second() {
        let rows = parse_places("1;Berlin;Germany;extra");

        assert_eq!(
            rows,
            vec![PlaceRow {
                id: "1".to_string(),
                place: "Berlin".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_skips_trailing_newline() {
        let rows = parse_places("A;Oslo\nB;Rome\n");

        assert_eq!(places(&rows), vec!["Oslo", "Rome"]);
    }

    #[test]
    fn test_parse_strips_carriage_returns() {
        let rows = parse_places("A;Lima\r\nB;Quito\r\n");

        assert_eq!(places(&rows), vec!["Lima", "Quito"]);
    }

    #[test]
    fn test_parse_skips_lines_without_place() {
        let rows = parse_places("only-one-field\nA;\n;Madrid\n\n");

        assert_eq!(places(&rows), vec!["Madrid"]);
        assert_eq!(rows[0].id, "");
    }

    #[test]
    fn test_parse_does_not_trim_place_names() {
        let rows = parse_places("A; New York ");

        assert_eq!(places(&rows), vec![" New York "]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_places("").is_empty());
    }

    #[test]
    fn test_read_places_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("locations.csv");
        fs::write(&path, "X;Tokyo\nY;Kyoto\n").expect("Should write input");

        let rows = read_places(&path).expect("Should read places");

        assert_eq!(places(&rows), vec!["Tokyo", "Kyoto"]);
    }

    #[test]
    fn test_read_places_missing_file_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let result = read_places(&temp_dir.path().join("missing.csv"));

        assert!(result.is_err());
    }
}
