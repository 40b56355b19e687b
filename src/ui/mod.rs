//! UI modules for the meteor map.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title, status, and per-source load badges
//! - Central canvas: Base tiles with the meteor and station layers
//! - Right panel: Layer toggles and data source details

mod canvas;
mod colors;
mod right_panel;
mod top_bar;

pub use canvas::render_canvas;
pub use right_panel::render_right_panel;
pub use top_bar::render_top_bar;
