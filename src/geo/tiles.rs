//! Base map tile source and XYZ tile coverage.

use super::projection::{MapProjection, ProjectedPoint, HALF_WORLD_M};
use eframe::egui::Rect;
use serde::{Deserialize, Serialize};

/// Upper bound on tiles drawn per frame.
const MAX_VISIBLE_TILES: usize = 512;

/// A raster tile provider addressed by `{z}/{x}/{y}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    /// Identifier shown in the UI
    pub name: String,
    /// URL with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    /// Attribution text drawn over the map
    pub attribution: String,
    /// Highest zoom level the provider serves
    pub max_zoom: u8,
}

impl Default for TileSource {
    fn default() -> Self {
        Self {
            name: "OpenStreetMap".to_string(),
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
            max_zoom: 19,
        }
    }
}

impl TileSource {
    /// Expands the URL template for a tile.
    pub fn tile_url(&self, tile: TileId) -> String {
        self.url_template
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

/// Address of one XYZ tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// A tile together with where it lands on screen.
#[derive(Debug, Clone, Copy)]
pub struct PlacedTile {
    pub id: TileId,
    pub rect: Rect,
}

/// Computes the tiles covering the canvas at the zoom level nearest the viewport's.
///
/// Columns wrap around the antimeridian; rows outside the world are dropped.
pub fn visible_tiles(projection: &MapProjection, max_zoom: u8) -> Vec<PlacedTile> {
    let z = (projection.viewport.zoom.round().max(0.0) as u8).min(max_zoom);
    let tiles_per_side = 1i64 << z;
    let span = 2.0 * HALF_WORLD_M / tiles_per_side as f64;

    let (min_x, min_y, max_x, max_y) = projection.visible_bounds();

    let first_col = ((min_x + HALF_WORLD_M) / span).floor() as i64;
    let last_col = ((max_x + HALF_WORLD_M) / span).floor() as i64;
    let first_row = (((HALF_WORLD_M - max_y) / span).floor() as i64).max(0);
    let last_row = (((HALF_WORLD_M - min_y) / span).floor() as i64).min(tiles_per_side - 1);

    let mut tiles = Vec::new();
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            if tiles.len() >= MAX_VISIBLE_TILES {
                log::warn!("Tile coverage exceeds {} tiles, truncating", MAX_VISIBLE_TILES);
                return tiles;
            }

            let left = col as f64 * span - HALF_WORLD_M;
            let top = HALF_WORLD_M - row as f64 * span;
            let min = projection.projected_to_screen(ProjectedPoint::new(left, top));
            let max = projection.projected_to_screen(ProjectedPoint::new(left + span, top - span));

            tiles.push(PlacedTile {
                id: TileId {
                    z,
                    x: col.rem_euclid(tiles_per_side) as u32,
                    y: row as u32,
                },
                rect: Rect::from_min_max(min, max),
            });
        }
    }

    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Viewport;
    use eframe::egui::{Pos2, Vec2};

    fn projection_at(center: ProjectedPoint, zoom: f64, size: Vec2) -> MapProjection {
        MapProjection::new(
            Viewport { center, zoom },
            Rect::from_min_size(Pos2::ZERO, size),
        )
    }

    #[test]
    fn test_tile_url_template() {
        let source = TileSource::default();
        let url = source.tile_url(TileId { z: 9, x: 280, y: 178 });
        assert_eq!(url, "https://tile.openstreetmap.org/9/280/178.png");
    }

    #[test]
    fn test_whole_world_at_zoom_one() {
        // 512x512 canvas at zoom 1 shows exactly the 2x2 world
        let projection = projection_at(ProjectedPoint::default(), 1.0, Vec2::new(511.0, 511.0));
        let tiles = visible_tiles(&projection, 19);

        let mut ids: Vec<(u32, u32)> = tiles.iter().map(|t| (t.id.x, t.id.y)).collect();
        ids.sort();
        assert_eq!(ids, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert!(tiles.iter().all(|t| t.id.z == 1));
        assert!(tiles
            .iter()
            .all(|t| (t.rect.width() - 256.0).abs() < 1e-2));
    }

    #[test]
    fn test_columns_wrap_at_antimeridian() {
        let projection = projection_at(
            ProjectedPoint::new(HALF_WORLD_M, 0.0),
            2.0,
            Vec2::new(400.0, 200.0),
        );
        let tiles = visible_tiles(&projection, 19);

        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.id.x < 4 && t.id.y < 4));
        assert!(tiles.iter().any(|t| t.id.x == 0));
        assert!(tiles.iter().any(|t| t.id.x == 3));
    }

    #[test]
    fn test_zoom_capped_by_source() {
        let projection = projection_at(ProjectedPoint::default(), 18.6, Vec2::new(300.0, 300.0));
        let tiles = visible_tiles(&projection, 16);
        assert!(tiles.iter().all(|t| t.id.z == 16));
    }
}
