//! Application state management.
//!
//! Configuration, shareable URL state, and the small amount of UI state
//! that is not owned by the map itself.

mod config;
pub mod url_state;

pub use config::MapConfig;

use geo_types::Coord;

/// UI state shared by the panels.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application status message displayed in top bar
    pub status_message: String,

    /// Draw station codes next to station markers
    pub show_station_labels: bool,

    /// Geographic position under the pointer, if it is over the map
    pub cursor_geo: Option<Coord<f64>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            status_message: "Loading map data...".to_string(),
            show_station_labels: true,
            cursor_geo: None,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
