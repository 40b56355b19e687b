//! Right panel UI: layer toggles, source status, and view details.

use super::colors;
use crate::data::SnapshotMode;
use crate::geo::LayerKind;
use crate::map::{MeteorMap, SourceState};
use crate::state::AppState;
use eframe::egui::{self, RichText, ScrollArea};

pub fn render_right_panel(ctx: &egui::Context, state: &mut AppState, map: &mut MeteorMap) {
    egui::SidePanel::right("right_panel")
        .resizable(true)
        .default_width(220.0)
        .min_width(180.0)
        .max_width(350.0)
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Controls");
                ui.separator();

                render_layers_section(ui, state, map);
                ui.add_space(5.0);

                render_sources_section(ui, map);
                ui.add_space(5.0);

                render_view_section(ui, state, map);
            });
        });
}

fn render_layers_section(ui: &mut egui::Ui, state: &mut AppState, map: &mut MeteorMap) {
    egui::CollapsingHeader::new(RichText::new("Layers").strong())
        .default_open(true)
        .show(ui, |ui| {
            for &kind in LayerKind::all() {
                let layer = map.layers.get_mut(kind);
                let text = format!("{} ({})", kind.label(), layer.len());
                ui.checkbox(&mut layer.visible, text);
            }

            ui.separator();
            ui.checkbox(&mut state.show_station_labels, "Station Labels");

            let snapshots = match map.config.snapshot_mode {
                SnapshotMode::Collapse => "one marker per meteor",
                SnapshotMode::Expand => "trajectory snapshots",
            };
            ui.label(
                RichText::new(format!("Meteors: {}", snapshots))
                    .small()
                    .color(colors::ui::LABEL),
            );
        });
}

fn render_sources_section(ui: &mut egui::Ui, map: &MeteorMap) {
    egui::CollapsingHeader::new(RichText::new("Data Sources").strong())
        .default_open(true)
        .show(ui, |ui| {
            let timeout = map.config.fetch_timeout();

            for &kind in LayerKind::all() {
                ui.label(RichText::new(kind.label()).color(colors::ui::ACTIVE));
                ui.indent(kind.label(), |ui| match map.source_state(kind) {
                    SourceState::Pending { since } => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(
                                RichText::new(format!(
                                    "Loading... {:.0}s",
                                    since.elapsed().as_secs_f64()
                                ))
                                .color(colors::source::PENDING),
                            );
                        });
                        if map.source_state(kind).is_overdue(timeout) {
                            ui.label(
                                RichText::new("Still waiting for the server")
                                    .small()
                                    .color(colors::source::PENDING),
                            );
                        }
                    }
                    SourceState::Loaded {
                        features,
                        skipped,
                        latency_ms,
                    } => {
                        stat_row(ui, "Shown", &features.to_string());
                        stat_row(ui, "Skipped", &skipped.to_string());
                        stat_row(ui, "Latency", &format!("{:.0} ms", latency_ms));
                    }
                    SourceState::Failed(reason) => {
                        egui::Frame::new()
                            .fill(colors::source::FAILED_BG)
                            .inner_margin(4.0)
                            .corner_radius(3.0)
                            .show(ui, |ui| {
                                ui.label(
                                    RichText::new(format!("Failed to load: {}", reason))
                                        .small()
                                        .color(colors::source::FAILED),
                                );
                            });
                    }
                });
            }
        });
}

fn render_view_section(ui: &mut egui::Ui, state: &AppState, map: &mut MeteorMap) {
    egui::CollapsingHeader::new(RichText::new("View").strong())
        .default_open(true)
        .show(ui, |ui| {
            stat_row(ui, "Zoom", &format!("{:.2}", map.viewport.zoom));

            let cursor = match state.cursor_geo {
                Some(coord) => format!("{:.4}, {:.4}", coord.y, coord.x),
                None => "-".to_string(),
            };
            stat_row(ui, "Cursor", &cursor);

            if ui.button("Reset View").clicked() {
                map.reset_view();
            }
        });
}

fn stat_row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).small().color(colors::ui::LABEL));
        ui.label(RichText::new(value).small().color(colors::ui::VALUE));
    });
}
