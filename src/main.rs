#![warn(clippy::all)]

//! Meteor Map - A web-based map of meteor sightings and observing stations.
//!
//! Shows detected meteors and the stations that observed them over an
//! OpenStreetMap base layer. Both data sources load asynchronously and
//! independently once the map is on screen.

mod data;
mod geo;
mod map;
mod state;
mod ui;

use data::FetchChannel;
use eframe::egui;
use geo::{mercator_to_lonlat, LayerKind, Viewport};
use map::{MeteorMap, SourceState};
use state::{AppState, MapConfig};
use std::time::Duration;

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Meteor Map",
        native_options,
        Box::new(|cc| Ok(Box::new(MeteorMapApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document to attach the map to");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("app_canvas")
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("Failed to find app_canvas");
            return;
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(MeteorMapApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    log::error!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct MeteorMapApp {
    /// UI state shared by the panels
    state: AppState,

    /// The assembled map with its layers
    map: MeteorMap,

    /// Channel for async data source requests
    fetch_channel: FetchChannel,

    /// Monotonic instant of last URL push (for throttling to ~1/sec).
    last_url_push: web_time::Instant,

    /// View last written to the URL
    last_pushed_view: Option<Viewport>,
}

impl MeteorMapApp {
    /// Creates the app, assembles the map, and starts loading both sources.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let config = MapConfig::load();
        let mut map = MeteorMap::assemble(config);

        let fetch_channel = FetchChannel::new();
        map.request_sources(&cc.egui_ctx, &fetch_channel);

        Self {
            state: AppState::new(),
            map,
            fetch_channel,
            last_url_push: web_time::Instant::now(),
            last_pushed_view: None,
        }
    }

    fn refresh_status(&mut self) {
        let failed: Vec<&str> = LayerKind::all()
            .iter()
            .filter(|&&kind| matches!(self.map.source_state(kind), SourceState::Failed(_)))
            .map(|kind| kind.label())
            .collect();

        self.state.status_message = if self.map.is_loading() {
            "Loading map data...".to_string()
        } else if failed.is_empty() {
            "Ready".to_string()
        } else {
            format!("Could not load: {}", failed.join(", "))
        };
    }

    fn sync_url(&mut self, ctx: &egui::Context) {
        if self.last_pushed_view == Some(self.map.viewport) {
            return;
        }

        let now = web_time::Instant::now();
        if now.duration_since(self.last_url_push).as_secs_f64() >= 1.0 {
            self.last_url_push = now;
            self.last_pushed_view = Some(self.map.viewport);

            let center = mercator_to_lonlat(self.map.viewport.center);
            state::url_state::push_to_url(center.y, center.x, self.map.viewport.zoom);
        } else {
            ctx.request_repaint_after(Duration::from_secs(1));
        }
    }
}

impl eframe::App for MeteorMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.map.poll(&self.fetch_channel) {
            self.refresh_status();
        }

        ui::render_top_bar(ctx, &self.state, &self.map);
        ui::render_right_panel(ctx, &mut self.state, &mut self.map);
        ui::render_canvas(ctx, &mut self.state, &mut self.map);

        self.sync_url(ctx);

        // Keep elapsed-time readouts ticking while requests are outstanding
        if self.map.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(500));
        }
    }
}
