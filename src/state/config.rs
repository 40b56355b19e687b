//! Map configuration.
//!
//! Defaults describe the observatory network map. On the web, the page URL
//! can override the initial view; natively, a JSON file named by
//! `METEOR_MAP_CONFIG`, the `METEOR_MAP_API_BASE` variable and a query-style
//! command-line argument (`lat=48.1&zoom=7`) can.

use super::url_state::UrlParams;
use crate::data::SnapshotMode;
use crate::geo::{LayerKind, TileSource};
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything needed to assemble the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Initial center longitude in degrees
    pub center_lon: f64,
    /// Initial center latitude in degrees
    pub center_lat: f64,
    /// Initial zoom level
    pub zoom: f64,
    /// Base map tiles
    pub tile_source: TileSource,
    /// Meteor endpoint (relative or absolute)
    pub meteors_url: String,
    /// Station endpoint (relative or absolute)
    pub stations_url: String,
    /// Base URL for relative endpoints; `None` leaves them relative
    pub api_base: Option<String>,
    /// Whether meteors expand into trajectory snapshots
    pub snapshot_mode: SnapshotMode,
    /// Request timeout, also used for the "still loading" indicator
    pub fetch_timeout_secs: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lon: 17.2738,
            center_lat: 48.3729,
            zoom: 9.0,
            tile_source: TileSource::default(),
            meteors_url: "/meteors/json".to_string(),
            stations_url: "/stations/json".to_string(),
            api_base: None,
            snapshot_mode: SnapshotMode::Collapse,
            fetch_timeout_secs: 30,
        }
    }
}

impl MapConfig {
    /// Environment variable naming a JSON config file (native only).
    pub const CONFIG_PATH_ENV: &'static str = "METEOR_MAP_CONFIG";
    /// Environment variable overriding the API base URL (native only).
    pub const API_BASE_ENV: &'static str = "METEOR_MAP_API_BASE";
    /// API base used natively when nothing else is configured.
    pub const DEFAULT_NATIVE_API_BASE: &'static str = "http://127.0.0.1:8000";

    /// Loads the configuration for the web build.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let mut config = Self::default();
        config.apply_url_params(&super::url_state::parse_from_url());
        config
    }

    /// Loads the configuration for the native build.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let mut config = match std::env::var(Self::CONFIG_PATH_ENV) {
            Ok(path) => match Self::read_file(&path) {
                Ok(config) => {
                    log::info!("Loaded map configuration from {}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Failed to load map configuration from {}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        if let Ok(base) = std::env::var(Self::API_BASE_ENV) {
            config.api_base = Some(base);
        }
        if config.api_base.is_none() {
            config.api_base = Some(Self::DEFAULT_NATIVE_API_BASE.to_string());
        }

        config.apply_url_params(&super::url_state::parse_from_url());
        config
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn read_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    /// Parses a configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Applies view overrides from the page URL.
    pub fn apply_url_params(&mut self, params: &UrlParams) {
        if let Some(lat) = params.lat {
            self.center_lat = lat;
        }
        if let Some(lon) = params.lon {
            self.center_lon = lon;
        }
        if let Some(zoom) = params.zoom {
            self.zoom = zoom;
        }
        if let Some(expand) = params.expand_snapshots {
            self.snapshot_mode = if expand {
                SnapshotMode::Expand
            } else {
                SnapshotMode::Collapse
            };
        }
    }

    /// Initial map center (x = lon, y = lat).
    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: self.center_lon,
            y: self.center_lat,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Full URL of the endpoint feeding a layer.
    pub fn source_url(&self, kind: LayerKind) -> String {
        match kind {
            LayerKind::Meteors => self.resolve_url(&self.meteors_url),
            LayerKind::Stations => self.resolve_url(&self.stations_url),
        }
    }

    /// Joins a relative endpoint onto `api_base`; absolute URLs pass through.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.api_base {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::url_state::parse_query;

    #[test]
    fn test_defaults() {
        let config = MapConfig::default();
        assert_eq!(config.center(), Coord { x: 17.2738, y: 48.3729 });
        assert_eq!(config.zoom, 9.0);
        assert_eq!(config.source_url(LayerKind::Meteors), "/meteors/json");
        assert_eq!(config.source_url(LayerKind::Stations), "/stations/json");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_resolve_url() {
        let mut config = MapConfig {
            api_base: Some("http://localhost:8000/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_url("/meteors/json"),
            "http://localhost:8000/meteors/json"
        );
        assert_eq!(
            config.resolve_url("https://example.org/stations/json"),
            "https://example.org/stations/json"
        );

        config.api_base = None;
        assert_eq!(config.resolve_url("/meteors/json"), "/meteors/json");
    }

    #[test]
    fn test_url_overrides() {
        let mut config = MapConfig::default();
        config.apply_url_params(&UrlParams {
            lat: Some(50.0),
            zoom: Some(6.0),
            expand_snapshots: Some(true),
            ..Default::default()
        });

        assert_eq!(config.center_lat, 50.0);
        assert_eq!(config.center_lon, 17.2738);
        assert_eq!(config.zoom, 6.0);
        assert_eq!(config.snapshot_mode, SnapshotMode::Expand);
    }

    #[test]
    fn test_command_line_query_overrides() {
        let mut config = MapConfig::default();
        config.apply_url_params(&parse_query("lon=18.5&z=6&snapshots=expand"));

        assert_eq!(config.center(), Coord { x: 18.5, y: 48.3729 });
        assert_eq!(config.zoom, 6.0);
        assert_eq!(config.snapshot_mode, SnapshotMode::Expand);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MapConfig::from_json(
            r#"{"zoom": 7, "api_base": "http://meteors.local", "snapshot_mode": "expand"}"#,
        )
        .unwrap();

        assert_eq!(config.zoom, 7.0);
        assert_eq!(config.snapshot_mode, SnapshotMode::Expand);
        assert_eq!(
            config.source_url(LayerKind::Stations),
            "http://meteors.local/stations/json"
        );
        assert_eq!(config.tile_source, TileSource::default());
    }
}
