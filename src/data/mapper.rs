//! Conversion of raw records into styled map features.
//!
//! Magnitude follows the astronomical convention: smaller is brighter.
//! Brighter meteors get larger markers, so the marker radius decreases
//! linearly with magnitude and is clamped to [`MIN_RADIUS`].

use super::records::{MeteorRecord, SnapshotRecord, StationRecord};
use crate::geo::{
    lonlat_to_mercator, LayerKind, MarkerStyle, ProjectedPoint, ProjectionError, VisualFeature,
};
use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// Smallest marker radius, in pixels.
pub const MIN_RADIUS: f32 = 1.0;
/// Radius of a magnitude 0 meteor.
const RADIUS_AT_MAGNITUDE_ZERO: f64 = 5.0;
/// Magnitudes per pixel of radius.
const MAGNITUDES_PER_PIXEL: f64 = 5.0;

/// How meteors with trajectory snapshots are mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotMode {
    /// One marker per meteor, at its own point
    #[default]
    Collapse,
    /// One marker per trajectory snapshot
    Expand,
}

/// Why a record produced no feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// Longitude or latitude is absent
    MissingCoordinates,
    /// Coordinates are present but cannot be projected
    Projection(ProjectionError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingCoordinates => write!(f, "missing coordinates"),
            SkipReason::Projection(e) => write!(f, "{}", e),
        }
    }
}

impl From<ProjectionError> for SkipReason {
    fn from(e: ProjectionError) -> Self {
        SkipReason::Projection(e)
    }
}

/// Features produced from a batch of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedBatch {
    pub features: Vec<VisualFeature>,
    pub skipped: usize,
}

impl MappedBatch {
    fn push(&mut self, result: Result<VisualFeature, SkipReason>) {
        match result {
            Ok(feature) => self.features.push(feature),
            Err(reason) => {
                log::debug!("Skipping record: {}", reason);
                self.skipped += 1;
            }
        }
    }
}

/// Marker radius for a meteor magnitude.
///
/// Missing or non-finite magnitudes get the minimum radius.
pub fn magnitude_radius(magnitude: Option<f64>) -> f32 {
    match magnitude {
        Some(m) if m.is_finite() => {
            let radius = RADIUS_AT_MAGNITUDE_ZERO - m / MAGNITUDES_PER_PIXEL;
            (radius as f32).max(MIN_RADIUS)
        }
        _ => MIN_RADIUS,
    }
}

fn locate(
    longitude: Option<f64>,
    latitude: Option<f64>,
) -> Result<(Coord<f64>, ProjectedPoint), SkipReason> {
    let (Some(x), Some(y)) = (longitude, latitude) else {
        return Err(SkipReason::MissingCoordinates);
    };
    let coord = Coord { x, y };
    Ok((coord, lonlat_to_mercator(coord)?))
}

fn meteor_feature(
    longitude: Option<f64>,
    latitude: Option<f64>,
    magnitude: Option<f64>,
) -> Result<VisualFeature, SkipReason> {
    let (coord, point) = locate(longitude, latitude)?;

    Ok(VisualFeature {
        coord,
        point,
        style: Some(MarkerStyle {
            radius: magnitude_radius(magnitude),
            ..LayerKind::Meteors.base_style()
        }),
        label: None,
        magnitude,
    })
}

/// Maps a meteor to a marker sized by its magnitude.
pub fn map_meteor(record: &MeteorRecord) -> Result<VisualFeature, SkipReason> {
    meteor_feature(record.longitude, record.latitude, record.magnitude)
}

/// Maps one trajectory snapshot to a marker sized by its own magnitude.
pub fn map_snapshot(snapshot: &SnapshotRecord) -> Result<VisualFeature, SkipReason> {
    meteor_feature(snapshot.longitude, snapshot.latitude, snapshot.magnitude)
}

/// Maps a station to a marker using the station layer's fixed style.
pub fn map_station(record: &StationRecord) -> Result<VisualFeature, SkipReason> {
    let (coord, point) = locate(record.longitude, record.latitude)?;

    Ok(VisualFeature {
        coord,
        point,
        style: None,
        label: record.code.clone().or_else(|| record.name.clone()),
        magnitude: None,
    })
}

/// Maps a batch of meteors, skipping records that cannot be placed.
pub fn map_meteors(records: &[MeteorRecord], mode: SnapshotMode) -> MappedBatch {
    let mut batch = MappedBatch::default();

    for record in records {
        match (mode, record.snapshots.as_deref()) {
            (SnapshotMode::Expand, Some(snapshots)) if !snapshots.is_empty() => {
                for snapshot in snapshots {
                    batch.push(map_snapshot(snapshot));
                }
            }
            _ => batch.push(map_meteor(record)),
        }
    }

    batch
}

/// Maps a batch of stations, skipping records that cannot be placed.
pub fn map_stations(records: &[StationRecord]) -> MappedBatch {
    let mut batch = MappedBatch::default();
    for record in records {
        batch.push(map_station(record));
    }
    batch
}
