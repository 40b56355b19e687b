//! HTTP retrieval of the meteor and station payloads.
//!
//! Uses channel-based communication to bridge async requests with egui's
//! synchronous update loop. Every request runs independently and reports
//! back through the same channel, tagged with the layer it feeds.

use crate::geo::LayerKind;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

/// Errors that can occur while fetching a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    Network(String),
    /// The server answered with a non-success status.
    Status(u16),
    /// The body is not a usable record payload.
    Payload(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "Network error: {}", msg),
            FetchError::Status(code) => write!(f, "HTTP status {}", code),
            FetchError::Payload(msg) => write!(f, "Invalid payload: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Payload(e.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Network(e.to_string()),
        }
    }
}

/// Result of one completed request.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Layer the payload is destined for
    pub kind: LayerKind,
    /// Resolved request URL
    pub url: String,
    /// Response body, or why there is none
    pub result: Result<String, FetchError>,
    /// Time from issue to completion
    pub latency_ms: f64,
}

/// Channel-based fetcher for the map's data sources.
///
/// Requests are async but egui's update() is synchronous. This struct
/// provides a channel to pass results from the request tasks back to the
/// UI thread.
pub struct FetchChannel {
    sender: Sender<FetchOutcome>,
    receiver: Receiver<FetchOutcome>,
}

impl Default for FetchChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Spawns a request for one data source using the browser's fetch API.
    ///
    /// The browser applies its own request timeout.
    #[cfg(target_arch = "wasm32")]
    pub fn fetch(&self, ctx: egui::Context, kind: LayerKind, url: String, _timeout: Duration) {
        let sender = self.sender.clone();

        wasm_bindgen_futures::spawn_local(async move {
            log::info!("Fetching {} from {}", kind.label(), url);
            let started = web_time::Instant::now();
            let result = fetch_text(&url).await;
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

            let _ = sender.send(FetchOutcome {
                kind,
                url,
                result,
                latency_ms,
            });
            ctx.request_repaint();
        });
    }

    /// Spawns a request for one data source on its own thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn fetch(&self, ctx: egui::Context, kind: LayerKind, url: String, timeout: Duration) {
        let sender = self.sender.clone();

        std::thread::spawn(move || {
            log::info!("Fetching {} from {}", kind.label(), url);
            let started = web_time::Instant::now();
            let result = fetch_text_blocking(&url, timeout);
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

            let _ = sender.send(FetchOutcome {
                kind,
                url,
                result,
                latency_ms,
            });
            ctx.request_repaint();
        });
    }

    /// Non-blocking check for a completed request.
    ///
    /// Returns Some(outcome) if a request completed,
    /// None if no result is ready yet.
    pub fn try_recv(&self) -> Option<FetchOutcome> {
        self.receiver.try_recv().ok()
    }

    /// Hands an outcome to the receiving side without a network round trip.
    #[cfg(test)]
    pub fn inject(&self, outcome: FetchOutcome) {
        let _ = self.sender.send(outcome);
    }
}

/// Performs a GET with the browser's fetch API and returns the body text.
#[cfg(target_arch = "wasm32")]
async fn fetch_text(url: &str) -> Result<String, FetchError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let js_err = |e: wasm_bindgen::JsValue| FetchError::Network(format!("{:?}", e));

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(js_err)?;

    let window = web_sys::window().ok_or_else(|| FetchError::Network("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;

    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }

    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;

    text.as_string()
        .ok_or_else(|| FetchError::Payload("response body is not text".into()))
}

/// Performs a blocking GET and returns the body text.
#[cfg(not(target_arch = "wasm32"))]
fn fetch_text_blocking(url: &str, timeout: Duration) -> Result<String, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;

    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()?
        .error_for_status()?;

    Ok(response.text()?)
}
