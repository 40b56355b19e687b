//! Map projection and coordinate transformation.
//!
//! Geographic coordinates (EPSG:4326, lon/lat in degrees) are projected to
//! Web Mercator metres (EPSG:3857), and projected points are mapped onto the
//! canvas for the current viewport.

use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;
use std::f64::consts::PI;

/// Sphere radius used by Web Mercator, in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Half the side of the square Web Mercator world, in metres.
pub const HALF_WORLD_M: f64 = PI * EARTH_RADIUS_M;
/// Side of a single base map tile, in pixels.
pub const TILE_SIZE: f64 = 256.0;
/// Most zoomed-out level the viewport allows.
pub const MIN_ZOOM: f64 = 1.0;
/// Most zoomed-in level the viewport allows.
pub const MAX_ZOOM: f64 = 19.0;

/// Reasons a geographic coordinate cannot be projected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionError {
    /// Longitude or latitude is NaN or infinite.
    NonFinite,
    /// Longitude outside [-180, 180].
    LongitudeOutOfRange(f64),
    /// Latitude outside [-90, 90].
    LatitudeOutOfRange(f64),
}

impl std::fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionError::NonFinite => write!(f, "Coordinate or zoom is not a finite number"),
            ProjectionError::LongitudeOutOfRange(lon) => {
                write!(f, "Longitude {} is outside [-180, 180]", lon)
            }
            ProjectionError::LatitudeOutOfRange(lat) => {
                write!(f, "Latitude {} is outside [-90, 90]", lat)
            }
        }
    }
}

impl std::error::Error for ProjectionError {}

/// A point in the projected display frame (Web Mercator metres).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Projects a geographic coordinate (x = lon, y = lat) to Web Mercator.
///
/// The poles are valid inputs; their northing is clamped to the edge of the
/// square world so the result is always finite.
pub fn lonlat_to_mercator(coord: Coord<f64>) -> Result<ProjectedPoint, ProjectionError> {
    let lon = coord.x;
    let lat = coord.y;

    if !lon.is_finite() || !lat.is_finite() {
        return Err(ProjectionError::NonFinite);
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ProjectionError::LongitudeOutOfRange(lon));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ProjectionError::LatitudeOutOfRange(lat));
    }

    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();

    Ok(ProjectedPoint {
        x,
        y: y.clamp(-HALF_WORLD_M, HALF_WORLD_M),
    })
}

/// Converts a Web Mercator point back to geographic coordinates (x = lon, y = lat).
pub fn mercator_to_lonlat(point: ProjectedPoint) -> Coord<f64> {
    let lon = (point.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (point.y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    Coord { x: lon, y: lat }
}

/// The map's current center point and zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Center of the view in projected metres
    pub center: ProjectedPoint,
    /// Slippy-map zoom level (0 = whole world in one tile)
    pub zoom: f64,
}

impl Viewport {
    /// Creates a viewport centered on a geographic coordinate.
    ///
    /// A non-finite zoom is rejected like a non-finite coordinate.
    pub fn centered_on(center: Coord<f64>, zoom: f64) -> Result<Self, ProjectionError> {
        if !zoom.is_finite() {
            return Err(ProjectionError::NonFinite);
        }
        Ok(Self {
            center: lonlat_to_mercator(center)?,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        })
    }

    /// Ground size of one screen pixel, in metres.
    pub fn resolution(&self) -> f64 {
        2.0 * HALF_WORLD_M / (TILE_SIZE * 2f64.powf(self.zoom))
    }

    /// Moves the view by a screen-space drag delta.
    pub fn pan_by_pixels(&mut self, delta: Vec2) {
        let resolution = self.resolution();
        self.center.x = (self.center.x - delta.x as f64 * resolution)
            .clamp(-HALF_WORLD_M, HALF_WORLD_M);
        self.center.y = (self.center.y + delta.y as f64 * resolution)
            .clamp(-HALF_WORLD_M, HALF_WORLD_M);
    }

    /// Changes zoom while keeping `anchor` at the same screen position.
    pub fn zoom_around(&mut self, new_zoom: f64, anchor: ProjectedPoint) {
        if !new_zoom.is_finite() {
            return;
        }
        let new_zoom = new_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = 2f64.powf(self.zoom - new_zoom);

        self.center.x = anchor.x + (self.center.x - anchor.x) * ratio;
        self.center.y = anchor.y + (self.center.y - anchor.y) * ratio;
        self.zoom = new_zoom;
    }
}

/// Map projection for converting projected points to screen coordinates.
#[derive(Debug, Clone)]
pub struct MapProjection {
    /// Viewport being displayed
    pub viewport: Viewport,
    /// Screen rectangle for the canvas
    pub screen_rect: Rect,
}

impl MapProjection {
    pub fn new(viewport: Viewport, screen_rect: Rect) -> Self {
        Self {
            viewport,
            screen_rect,
        }
    }

    /// Converts a projected point to a screen position.
    pub fn projected_to_screen(&self, point: ProjectedPoint) -> Pos2 {
        let resolution = self.viewport.resolution();
        let center = self.screen_rect.center();

        // Screen Y increases downward, northing increases upward
        Pos2::new(
            center.x + ((point.x - self.viewport.center.x) / resolution) as f32,
            center.y - ((point.y - self.viewport.center.y) / resolution) as f32,
        )
    }

    /// Converts a screen position to a projected point.
    pub fn screen_to_projected(&self, pos: Pos2) -> ProjectedPoint {
        let resolution = self.viewport.resolution();
        let center = self.screen_rect.center();

        ProjectedPoint {
            x: self.viewport.center.x + (pos.x - center.x) as f64 * resolution,
            y: self.viewport.center.y - (pos.y - center.y) as f64 * resolution,
        }
    }

    /// Converts a screen position to geographic coordinates (lon, lat).
    pub fn screen_to_geo(&self, pos: Pos2) -> Coord<f64> {
        mercator_to_lonlat(self.screen_to_projected(pos))
    }

    /// Returns the visible projected bounds as (min_x, min_y, max_x, max_y).
    pub fn visible_bounds(&self) -> (f64, f64, f64, f64) {
        let top_left = self.screen_to_projected(self.screen_rect.left_top());
        let bottom_right = self.screen_to_projected(self.screen_rect.right_bottom());

        (
            top_left.x.min(bottom_right.x),
            top_left.y.min(bottom_right.y),
            top_left.x.max(bottom_right.x),
            top_left.y.max(bottom_right.y),
        )
    }

    /// Checks if a projected point lands on the canvas (with a pixel margin).
    pub fn is_visible(&self, point: ProjectedPoint, margin_px: f32) -> bool {
        self.screen_rect
            .expand(margin_px)
            .contains(self.projected_to_screen(point))
    }
}
