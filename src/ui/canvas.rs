//! Central canvas UI: base tiles with the meteor and station layers on top.

use super::colors;
use crate::geo::{
    pick_feature, render_base_tiles, render_feature_layers, LayerKind, MapProjection, VisualFeature,
};
use crate::map::MeteorMap;
use crate::state::AppState;
use eframe::egui::{self, Rect, RichText, Sense, Vec2};

/// Zoom levels per scroll unit.
const SCROLL_ZOOM_RATE: f64 = 0.0025;

pub fn render_canvas(ctx: &egui::Context, state: &mut AppState, map: &mut MeteorMap) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let available_size = ui.available_size();

            // Allocate the full available space for the canvas
            let (response, painter) =
                ui.allocate_painter(available_size, Sense::click_and_drag());
            let rect = response.rect;

            painter.rect_filled(rect, 0.0, colors::canvas::BACKGROUND);

            let projection = MapProjection::new(map.viewport, rect);

            // Base layer first so every data layer draws above it
            render_base_tiles(ui, &projection, &map.tile_source);
            render_feature_layers(
                &painter,
                &map.layers,
                &projection,
                state.show_station_labels,
            );

            if map.is_loading() {
                draw_loading_overlay(ui, &rect);
            }

            state.cursor_geo = response
                .hover_pos()
                .map(|pos| projection.screen_to_geo(pos));

            let hovered = response
                .hover_pos()
                .and_then(|pos| pick_feature(&map.layers, &projection, pos))
                .map(|(kind, feature)| describe_feature(kind, feature));

            handle_canvas_interaction(&response, &projection, map);

            if let Some(text) = hovered {
                response.on_hover_ui_at_pointer(|ui| {
                    ui.label(RichText::new(text).monospace().size(12.0));
                });
            }
        });
}

fn describe_feature(kind: LayerKind, feature: &VisualFeature) -> String {
    let position = format!("{:.4}, {:.4}", feature.coord.y, feature.coord.x);
    match kind {
        LayerKind::Meteors => match feature.magnitude {
            Some(m) => format!("Meteor  mag {:.1}\n{}", m, position),
            None => format!("Meteor\n{}", position),
        },
        LayerKind::Stations => format!(
            "Station {}\n{}",
            feature.label.as_deref().unwrap_or("?"),
            position
        ),
    }
}

fn draw_loading_overlay(ui: &mut egui::Ui, rect: &Rect) {
    let overlay_rect = Rect::from_min_size(
        rect.left_top() + Vec2::new(10.0, 10.0),
        Vec2::new(140.0, 24.0),
    );

    ui.painter()
        .rect_filled(overlay_rect, 4.0, colors::canvas::overlay());
    ui.scope_builder(egui::UiBuilder::new().max_rect(overlay_rect.shrink(4.0)), |ui| {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(
                RichText::new("Loading data")
                    .size(12.0)
                    .color(colors::canvas::OVERLAY_TEXT),
            );
        });
    });
}

fn handle_canvas_interaction(
    response: &egui::Response,
    projection: &MapProjection,
    map: &mut MeteorMap,
) {
    // Handle dragging for panning
    if response.dragged() {
        map.viewport.pan_by_pixels(response.drag_delta());
    }

    // Handle scroll for zooming relative to cursor position
    if response.hovered() {
        let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.y != 0.0 {
            let new_zoom = map.viewport.zoom + scroll_delta.y as f64 * SCROLL_ZOOM_RATE;
            let anchor = match response.hover_pos() {
                Some(pos) => projection.screen_to_projected(pos),
                None => map.viewport.center,
            };
            map.viewport.zoom_around(new_zoom, anchor);
        }
    }

    // Reset view on double-click
    if response.double_clicked() {
        map.reset_view();
    }
}
