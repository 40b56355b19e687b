//! Centralized color constants for the UI.
//!
//! Marker colors live with the layer styles; these cover panels and the
//! canvas chrome.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for stat labels.
    pub const LABEL: Color32 = Color32::from_rgb(100, 100, 100);
    /// Slightly brighter for stat values.
    pub const VALUE: Color32 = Color32::from_rgb(160, 160, 160);
    /// Emphasized color for active states.
    pub const ACTIVE: Color32 = Color32::from_rgb(100, 180, 255);
}

/// Colors for data source status badges.
pub mod source {
    use super::Color32;

    /// Orange - request in flight.
    pub const PENDING: Color32 = Color32::from_rgb(255, 180, 50);
    /// Green - layer populated.
    pub const LOADED: Color32 = Color32::from_rgb(100, 200, 100);
    /// Red - request failed.
    pub const FAILED: Color32 = Color32::from_rgb(255, 80, 80);
    /// Banner background for failures.
    pub const FAILED_BG: Color32 = Color32::from_rgb(70, 25, 25);
}

/// Colors for the map canvas.
pub mod canvas {
    use super::Color32;

    /// Background shown until tiles arrive.
    pub const BACKGROUND: Color32 = Color32::from_rgb(170, 211, 223);

    /// Tooltip overlay background - requires alpha, use function.
    pub fn overlay() -> Color32 {
        Color32::from_rgba_unmultiplied(20, 20, 35, 200)
    }

    /// Overlay text color.
    pub const OVERLAY_TEXT: Color32 = Color32::from_rgb(220, 220, 240);
}
