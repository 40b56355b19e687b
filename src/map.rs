//! Map assembly: viewport, base tiles, and the two data layers.
//!
//! The map is usable as soon as it is assembled. Each data source is
//! fetched exactly once, independently of the other, and populates only
//! its own layer when it completes:
//!
//! ```text
//! Pending ──ok──▶ Loaded (layer populated)
//!    └──error──▶ Failed (layer stays empty)
//! ```

use crate::data::{
    decode_records, map_meteors, map_stations, FetchChannel, FetchError, FetchOutcome,
    MappedBatch, MeteorRecord, StationRecord,
};
use crate::geo::{mercator_to_lonlat, LayerKind, LayerSet, TileSource, Viewport};
use crate::state::MapConfig;
use eframe::egui;
use std::time::Duration;
use web_time::Instant;

/// Lifecycle of one data source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceState {
    /// Request issued (or about to be), no answer yet
    Pending { since: Instant },
    /// Layer populated
    Loaded {
        features: usize,
        skipped: usize,
        latency_ms: f64,
    },
    /// Request or payload failed; layer left empty
    Failed(String),
}

impl SourceState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SourceState::Pending { .. })
    }

    /// Returns true if the source has been pending for longer than `timeout`.
    pub fn is_overdue(&self, timeout: Duration) -> bool {
        match self {
            SourceState::Pending { since } => since.elapsed() > timeout,
            _ => false,
        }
    }
}

/// The assembled map.
pub struct MeteorMap {
    /// Configuration the map was assembled from
    pub config: MapConfig,
    /// Current view
    pub viewport: Viewport,
    /// Base tile layer, drawn below every data layer
    pub tile_source: TileSource,
    /// Data layers, attached empty at assembly time
    pub layers: LayerSet,
    meteors: SourceState,
    stations: SourceState,
}

impl MeteorMap {
    /// Builds the map with its base layer, initial viewport and empty data layers.
    ///
    /// An unusable configured view falls back to the default one.
    pub fn assemble(config: MapConfig) -> Self {
        let viewport = Viewport::centered_on(config.center(), config.zoom).unwrap_or_else(|e| {
            log::warn!("Invalid initial view ({}), using default", e);
            default_viewport()
        });

        let center = mercator_to_lonlat(viewport.center);
        log::info!(
            "Assembled map at ({:.4}, {:.4}) zoom {:.1} over {}",
            center.x,
            center.y,
            viewport.zoom,
            config.tile_source.name
        );

        let now = Instant::now();
        Self {
            tile_source: config.tile_source.clone(),
            config,
            viewport,
            layers: LayerSet::new(),
            meteors: SourceState::Pending { since: now },
            stations: SourceState::Pending { since: now },
        }
    }

    /// Issues both data requests; neither waits for the other.
    pub fn request_sources(&mut self, ctx: &egui::Context, channel: &FetchChannel) {
        let timeout = self.config.fetch_timeout();

        for &kind in LayerKind::all() {
            *self.source_state_mut(kind) = SourceState::Pending {
                since: Instant::now(),
            };
            channel.fetch(ctx.clone(), kind, self.config.source_url(kind), timeout);
        }
    }

    /// Applies every completed request. Returns true if anything changed.
    pub fn poll(&mut self, channel: &FetchChannel) -> bool {
        let mut changed = false;
        while let Some(outcome) = channel.try_recv() {
            self.apply(outcome);
            changed = true;
        }
        changed
    }

    /// Populates a layer from a completed request, or records its failure.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        let kind = outcome.kind;

        if !self.source_state(kind).is_pending() {
            log::warn!(
                "Ignoring repeated result for {} from {}",
                kind.label(),
                outcome.url
            );
            return;
        }

        let mapped = outcome
            .result
            .and_then(|body| self.map_payload(kind, &body));

        let state = match mapped {
            Ok(batch) => {
                let features = batch.features.len();
                self.layers.get_mut(kind).extend(batch.features);
                log::info!(
                    "Loaded {} {} ({} skipped) in {:.0} ms",
                    features,
                    kind.label().to_lowercase(),
                    batch.skipped,
                    outcome.latency_ms
                );
                SourceState::Loaded {
                    features,
                    skipped: batch.skipped,
                    latency_ms: outcome.latency_ms,
                }
            }
            Err(e) => {
                log::error!("Could not load {} from {}: {}", kind.label(), outcome.url, e);
                SourceState::Failed(e.to_string())
            }
        };

        *self.source_state_mut(kind) = state;
    }

    fn map_payload(&self, kind: LayerKind, body: &str) -> Result<MappedBatch, FetchError> {
        let mut batch = match kind {
            LayerKind::Meteors => {
                let decoded = decode_records::<MeteorRecord>(body)?;
                let mut batch = map_meteors(&decoded.records, self.config.snapshot_mode);
                batch.skipped += decoded.malformed;
                batch
            }
            LayerKind::Stations => {
                let decoded = decode_records::<StationRecord>(body)?;
                let mut batch = map_stations(&decoded.records);
                batch.skipped += decoded.malformed;
                batch
            }
        };
        batch.features.shrink_to_fit();
        Ok(batch)
    }

    pub fn source_state(&self, kind: LayerKind) -> &SourceState {
        match kind {
            LayerKind::Meteors => &self.meteors,
            LayerKind::Stations => &self.stations,
        }
    }

    fn source_state_mut(&mut self, kind: LayerKind) -> &mut SourceState {
        match kind {
            LayerKind::Meteors => &mut self.meteors,
            LayerKind::Stations => &mut self.stations,
        }
    }

    /// True while either source is still pending.
    pub fn is_loading(&self) -> bool {
        LayerKind::all()
            .iter()
            .any(|&kind| self.source_state(kind).is_pending())
    }

    /// Returns the view to the configured initial center and zoom.
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::centered_on(self.config.center(), self.config.zoom)
            .unwrap_or_else(|_| default_viewport());
    }
}

fn default_viewport() -> Viewport {
    let defaults = MapConfig::default();
    Viewport::centered_on(defaults.center(), defaults.zoom).unwrap_or(Viewport {
        center: Default::default(),
        zoom: defaults.zoom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SnapshotMode;
    use crate::geo::lonlat_to_mercator;
    use crate::state::url_state::parse_query;
    use geo_types::Coord;

    const METEORS: &str = r#"[
        {"longitude": 17.27, "latitude": 48.37, "magnitude": 10},
        {"longitude": 200, "latitude": 48.37, "magnitude": 5},
        {"longitude": null, "latitude": 48.0, "magnitude": 1},
        {"longitude": 18.0, "latitude": 49.0, "magnitude": -4}
    ]"#;

    const STATIONS: &str = r#"{
        "1": {"id": 1, "code": "AGO", "name": "Modra", "longitude": 17.2738, "latitude": 48.3729},
        "2": {"id": 2, "code": "ARBO", "name": "Arboretum", "longitude": 18.3, "latitude": 48.3},
        "3": {"id": 3, "code": "KNM", "name": "Kysucké Nové Mesto", "longitude": 18.8, "latitude": 49.3}
    }"#;

    fn outcome(kind: LayerKind, result: Result<&str, FetchError>) -> FetchOutcome {
        FetchOutcome {
            kind,
            url: format!("/{}/json", kind.label().to_lowercase()),
            result: result.map(str::to_string),
            latency_ms: 12.0,
        }
    }

    #[test]
    fn test_assembled_map_is_empty_and_pending() {
        let map = MeteorMap::assemble(MapConfig::default());

        assert!(map.layers.meteors.is_empty());
        assert!(map.layers.stations.is_empty());
        assert!(map.source_state(LayerKind::Meteors).is_pending());
        assert!(map.source_state(LayerKind::Stations).is_pending());
        assert!(map.is_loading());

        let expected = lonlat_to_mercator(Coord {
            x: 17.2738,
            y: 48.3729,
        })
        .unwrap();
        assert_eq!(map.viewport.center, expected);
        assert_eq!(map.viewport.zoom, 9.0);
    }

    #[test]
    fn test_invalid_center_falls_back() {
        let map = MeteorMap::assemble(MapConfig {
            center_lat: 123.0,
            ..Default::default()
        });
        assert_eq!(map.viewport, default_viewport());
    }

    #[test]
    fn test_non_finite_zoom_falls_back() {
        let mut map = MeteorMap::assemble(MapConfig {
            zoom: f64::NAN,
            ..Default::default()
        });
        assert_eq!(map.viewport, default_viewport());

        map.viewport.zoom = 3.0;
        map.reset_view();
        assert!(map.viewport.zoom.is_finite());
        assert_eq!(map.viewport, default_viewport());
    }

    #[test]
    fn test_non_finite_url_zoom_keeps_configured_view() {
        let mut config = MapConfig::default();
        config.apply_url_params(&parse_query("?zoom=NaN&lat=inf"));

        let mut map = MeteorMap::assemble(config);
        map.reset_view();
        assert!(map.viewport.zoom.is_finite());
        assert_eq!(map.viewport.zoom, 9.0);
    }

    #[test]
    fn test_meteor_payload_populates_meteor_layer() {
        let mut map = MeteorMap::assemble(MapConfig::default());
        map.apply(outcome(LayerKind::Meteors, Ok(METEORS)));

        assert_eq!(map.layers.meteors.len(), 2);
        assert!(map.layers.stations.is_empty());
        assert_eq!(
            map.source_state(LayerKind::Meteors),
            &SourceState::Loaded {
                features: 2,
                skipped: 2,
                latency_ms: 12.0
            }
        );
        assert!(map.source_state(LayerKind::Stations).is_pending());

        let first = &map.layers.meteors.features[0];
        assert_eq!(first.coord, Coord { x: 17.27, y: 48.37 });
        assert_eq!(first.style.unwrap().radius, 3.0);
    }

    #[test]
    fn test_meteor_failure_leaves_station_layer_unaffected() {
        let mut map = MeteorMap::assemble(MapConfig::default());
        map.apply(outcome(LayerKind::Meteors, Err(FetchError::Status(502))));
        map.apply(outcome(LayerKind::Stations, Ok(STATIONS)));

        assert!(map.layers.meteors.is_empty());
        assert_eq!(
            map.source_state(LayerKind::Meteors),
            &SourceState::Failed("HTTP status 502".to_string())
        );
        assert_eq!(map.layers.stations.len(), 3);
        assert!(!map.is_loading());

        let codes: Vec<_> = map
            .layers
            .stations
            .features
            .iter()
            .map(|f| f.label.as_deref().unwrap())
            .collect();
        assert_eq!(codes, vec!["AGO", "ARBO", "KNM"]);
    }

    #[test]
    fn test_station_failure_leaves_meteor_layer_unaffected() {
        let mut map = MeteorMap::assemble(MapConfig::default());
        map.apply(outcome(
            LayerKind::Stations,
            Err(FetchError::Network("connection refused".to_string())),
        ));
        map.apply(outcome(LayerKind::Meteors, Ok(METEORS)));

        assert!(map.layers.stations.is_empty());
        assert!(matches!(
            map.source_state(LayerKind::Stations),
            SourceState::Failed(_)
        ));
        assert_eq!(map.layers.meteors.len(), 2);
    }

    #[test]
    fn test_bad_payload_fails_source() {
        let mut map = MeteorMap::assemble(MapConfig::default());
        map.apply(outcome(LayerKind::Stations, Ok("<html>login</html>")));

        assert!(map.layers.stations.is_empty());
        assert!(matches!(
            map.source_state(LayerKind::Stations),
            SourceState::Failed(_)
        ));
    }

    #[test]
    fn test_second_result_is_ignored() {
        let mut map = MeteorMap::assemble(MapConfig::default());
        map.apply(outcome(LayerKind::Meteors, Ok(METEORS)));
        map.apply(outcome(LayerKind::Meteors, Ok(METEORS)));

        assert_eq!(map.layers.meteors.len(), 2);
    }

    #[test]
    fn test_snapshot_mode_from_config() {
        let body = r#"[{"longitude": 17.0, "latitude": 48.0, "magnitude": 0, "snapshots": [
            {"longitude": 17.1, "latitude": 48.1, "magnitude": 2},
            {"longitude": 17.2, "latitude": 48.2, "magnitude": 4}
        ]}]"#;

        let mut map = MeteorMap::assemble(MapConfig {
            snapshot_mode: SnapshotMode::Expand,
            ..Default::default()
        });
        map.apply(outcome(LayerKind::Meteors, Ok(body)));
        assert_eq!(map.layers.meteors.len(), 2);
    }

    #[test]
    fn test_poll_drains_channel() {
        let channel = FetchChannel::new();
        let mut map = MeteorMap::assemble(MapConfig::default());
        assert!(!map.poll(&channel));

        channel.inject(outcome(LayerKind::Stations, Ok(STATIONS)));
        channel.inject(outcome(LayerKind::Meteors, Ok("[]")));

        assert!(map.poll(&channel));
        assert_eq!(map.layers.stations.len(), 3);
        assert_eq!(
            map.source_state(LayerKind::Meteors),
            &SourceState::Loaded {
                features: 0,
                skipped: 0,
                latency_ms: 12.0
            }
        );
    }

    #[test]
    fn test_overdue_only_while_pending() {
        let pending = SourceState::Pending {
            since: Instant::now(),
        };
        assert!(!pending.is_overdue(Duration::from_secs(60)));
        assert!(!SourceState::Failed("x".into()).is_overdue(Duration::ZERO));
    }

    #[test]
    fn test_reset_view() {
        let mut map = MeteorMap::assemble(MapConfig::default());
        let initial = map.viewport;
        map.viewport.zoom = 3.0;
        map.viewport.center.x += 1000.0;

        map.reset_view();
        assert_eq!(map.viewport, initial);
    }
}
