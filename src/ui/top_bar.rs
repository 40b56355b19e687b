//! Top bar UI: app title, status, and per-source load badges.

use super::colors;
use crate::geo::LayerKind;
use crate::map::{MeteorMap, SourceState};
use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};
use egui_phosphor::regular as icons;

pub fn render_top_bar(ctx: &egui::Context, state: &AppState, map: &MeteorMap) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                // App title
                ui.label(
                    RichText::new(format!("{} Meteor Map", icons::SHOOTING_STAR))
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                for &kind in LayerKind::all() {
                    let visible = map.layers.get(kind).visible;
                    source_badge(ui, kind, map.source_state(kind), visible);
                }

                ui.separator();

                // Status text
                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );
            });
        });
}

fn source_badge(ui: &mut egui::Ui, kind: LayerKind, source: &SourceState, visible: bool) {
    let (icon, color, hover) = match source {
        SourceState::Pending { .. } => (
            icons::HOURGLASS,
            colors::source::PENDING,
            "Loading".to_string(),
        ),
        SourceState::Loaded { features, .. } => (
            icons::CHECK_CIRCLE,
            colors::source::LOADED,
            if visible {
                format!("{} shown", features)
            } else {
                format!("{} loaded, layer hidden", features)
            },
        ),
        SourceState::Failed(reason) => (
            icons::WARNING_CIRCLE,
            colors::source::FAILED,
            reason.clone(),
        ),
    };

    ui.label(
        RichText::new(format!("{} {}", icon, kind.label()))
            .size(12.0)
            .color(color),
    )
    .on_hover_text(hover);
}
