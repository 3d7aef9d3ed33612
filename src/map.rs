//! Map rendering
//!
//! Turns the resolved locations into a self-contained Leaflet page with one
//! clustered marker per place on a light CartoDB Positron base map.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::cache::LocationCache;

/// Page template; `{{NAME}}` placeholders are filled by `render_map`
const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>

  <!-- Leaflet 1.9.4 -->
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous"
    referrerpolicy="no-referrer" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"
    referrerpolicy="no-referrer"></script>

  <!-- Leaflet.markercluster 1.4.1 -->
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.css" />
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.Default.css" />
  <script src="https://unpkg.com/leaflet.markercluster@1.4.1/dist/leaflet.markercluster.js"></script>

  <style>
    html, body { width: 100%; height: 100%; margin: 0; padding: 0; }
    #map { position: absolute; top: 0; bottom: 0; left: 0; right: 0; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const markers = {{MARKERS}};
    const clusterName = {{LAYER_NAME}};

    const map = L.map('map', { center: [{{CENTER_LAT}}, {{CENTER_LNG}}], zoom: {{ZOOM}} });

    const base = L.tileLayer('https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png', {
      attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors &copy; <a href="https://carto.com/attributions">CARTO</a>',
      subdomains: 'abcd',
      maxZoom: 20
    }).addTo(map);

    const cluster = L.markerClusterGroup();
    for (const m of markers) {
      const popup = document.createElement('div');
      popup.textContent = m.name;
      L.marker([m.lat, m.lng]).bindPopup(popup).addTo(cluster);
    }
    cluster.addTo(map);

    L.control.layers({ 'CartoDB Positron': base }, { [clusterName]: cluster }).addTo(map);
  </script>
</body>
</html>
"#;

/// Options for the rendered page
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// Page title
    pub title: String,
    /// Name of the marker cluster layer in the layer control
    pub layer_name: String,
    /// Initial center as (latitude, longitude)
    pub center: (f64, f64),
    /// Initial zoom level
    pub zoom: u8,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            title: "citymap".to_string(),
            layer_name: "CAT Locations".to_string(),
            center: (0.0, 0.0),
            zoom: 1,
        }
    }
}

/// A marker as embedded in the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    /// Popup label
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// One marker per cached place, in name order
pub fn markers_from(cache: &LocationCache) -> Vec<MapMarker> {
    cache
        .iter()
        .map(|(name, entry)| MapMarker {
            name: name.to_string(),
            lat: entry.location().latitude(),
            lng: entry.location().longitude(),
        })
        .collect()
}

/// Serializes a value for inclusion inside a `<script>` element
fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    // serde_json output for these types cannot fail
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Fills `{{NAME}}` placeholders of `template` in a single scan
///
/// Only the template text is searched, so a value that looks like a
/// placeholder is copied as is. Unknown placeholders are left untouched.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut page = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        page.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                page.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                page.push_str("{{");
                rest = &tail[2..];
            }
        }
    }
    page.push_str(rest);
    page
}

/// Renders the map page for `markers`
pub fn render_map(markers: &[MapMarker], options: &MapOptions) -> String {
    fill_template(
        MAP_TEMPLATE,
        &[
            ("{{TITLE}}", escape_html(&options.title)),
            ("{{MARKERS}}", script_json(markers)),
            ("{{LAYER_NAME}}", script_json(&options.layer_name)),
            ("{{CENTER_LAT}}", options.center.0.to_string()),
            ("{{CENTER_LNG}}", options.center.1.to_string()),
            ("{{ZOOM}}", options.zoom.to_string()),
        ],
    )
}

/// Renders the cache and writes the page to `path`, replacing any existing file
///
/// # Returns
/// * `Ok(usize)` - number of markers written
/// * `Err` - if the file cannot be written
pub fn write_map(
    path: &Path,
    cache: &LocationCache,
    options: &MapOptions,
) -> std::io::Result<usize> {
    let markers = markers_from(cache);
    let html = render_map(&markers, options);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, html)?;

    debug!(path = %path.display(), markers = markers.len(), "Wrote map");
    Ok(markers.len())
}
