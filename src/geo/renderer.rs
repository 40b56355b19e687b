//! Map layer rendering.
//!
//! Renders the base tiles and the feature layers to the egui canvas.

use super::tiles::{visible_tiles, TileSource};
use super::{FeatureLayer, LayerKind, LayerSet, MapProjection, VisualFeature};
use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Vec2};

/// Extra pick distance around a marker, in pixels.
const PICK_SLOP: f32 = 3.0;

/// Draws the base tile layer and its attribution.
pub fn render_base_tiles(ui: &egui::Ui, projection: &MapProjection, source: &TileSource) {
    for tile in visible_tiles(projection, source.max_zoom) {
        egui::Image::new(source.tile_url(tile.id))
            .show_loading_spinner(false)
            .paint_at(ui, tile.rect);
    }

    let corner = projection.screen_rect.right_bottom() - Vec2::new(4.0, 2.0);
    ui.painter().text(
        corner,
        Align2::RIGHT_BOTTOM,
        &source.attribution,
        FontId::proportional(10.0),
        Color32::from_rgb(60, 60, 60),
    );
}

/// Renders all visible feature layers (back to front).
pub fn render_feature_layers(
    painter: &Painter,
    layers: &LayerSet,
    projection: &MapProjection,
    show_labels: bool,
) {
    for layer in layers.iter() {
        if layer.visible && !layer.is_empty() {
            render_layer(painter, layer, projection, show_labels);
        }
    }
}

fn render_layer(
    painter: &Painter,
    layer: &FeatureLayer,
    projection: &MapProjection,
    show_labels: bool,
) {
    for feature in &layer.features {
        let style = layer.style_for(feature);

        // Skip markers that are entirely off screen
        if !projection.is_visible(feature.point, style.radius) {
            continue;
        }

        let pos = projection.projected_to_screen(feature.point);
        painter.circle_filled(pos, style.radius, style.fill);
        if let Some(stroke) = style.stroke {
            painter.circle_stroke(pos, style.radius, stroke);
        }

        if show_labels {
            if let Some(text) = feature.label.as_deref() {
                painter.text(
                    Pos2::new(pos.x + style.radius + 3.0, pos.y - 2.0),
                    Align2::LEFT_CENTER,
                    text,
                    FontId::proportional(10.0),
                    Color32::from_rgb(30, 30, 40),
                );
            }
        }
    }
}

/// Finds the marker under a screen position.
///
/// Layers drawn last win, and within a layer the closest marker wins.
pub fn pick_feature<'a>(
    layers: &'a LayerSet,
    projection: &MapProjection,
    pos: Pos2,
) -> Option<(LayerKind, &'a VisualFeature)> {
    let mut best: Option<(LayerKind, &VisualFeature)> = None;

    for layer in layers.iter().filter(|l| l.visible) {
        let mut best_dist = f32::MAX;
        let mut layer_best = None;

        for feature in &layer.features {
            let reach = layer.style_for(feature).radius + PICK_SLOP;
            let dist = projection.projected_to_screen(feature.point).distance(pos);
            if dist <= reach && dist < best_dist {
                best_dist = dist;
                layer_best = Some(feature);
            }
        }

        if let Some(feature) = layer_best {
            best = Some((layer.kind, feature));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{lonlat_to_mercator, Viewport};
    use eframe::egui::Rect;
    use geo_types::Coord;

    fn station_at(lon: f64, lat: f64, code: &str) -> VisualFeature {
        let coord = Coord { x: lon, y: lat };
        VisualFeature {
            coord,
            point: lonlat_to_mercator(coord).unwrap(),
            style: None,
            label: Some(code.to_string()),
            magnitude: None,
        }
    }

    #[test]
    fn test_pick_nearest_and_respects_visibility() {
        let viewport = Viewport::centered_on(Coord { x: 17.27, y: 48.37 }, 9.0).unwrap();
        let projection = MapProjection::new(
            viewport,
            Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
        );

        let mut layers = LayerSet::new();
        layers
            .stations
            .extend(vec![station_at(17.27, 48.37, "AGO"), station_at(17.5, 48.5, "ARBO")]);

        let center = Pos2::new(400.0, 300.0);
        let (kind, feature) = pick_feature(&layers, &projection, center).unwrap();
        assert_eq!(kind, LayerKind::Stations);
        assert_eq!(feature.label.as_deref(), Some("AGO"));

        assert!(pick_feature(&layers, &projection, Pos2::new(10.0, 10.0)).is_none());

        layers.stations.visible = false;
        assert!(pick_feature(&layers, &projection, center).is_none());
    }
}
