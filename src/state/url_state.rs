//! URL state encoding/decoding for shareable URLs.
//!
//! Encodes the map center and zoom in the URL query string so reloading
//! restores the view and URLs can be shared.

/// Parsed URL parameters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UrlParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub zoom: Option<f64>,
    /// `snapshots=1` expands meteors into their trajectory snapshots
    pub expand_snapshots: Option<bool>,
}

/// Parses a query string (with or without the leading `?`).
///
/// Unknown keys and unparsable values are ignored.
pub fn parse_query(query: &str) -> UrlParams {
    let mut params = UrlParams::default();

    let query = query.trim_start_matches('?');
    if query.is_empty() {
        return params;
    }

    for pair in query.split('&') {
        let mut kv = pair.splitn(2, '=');
        let key = kv.next().unwrap_or("");
        let value = kv.next().unwrap_or("");
        match key {
            "lat" => params.lat = parse_finite(value),
            "lon" => params.lon = parse_finite(value),
            "zoom" | "z" => params.zoom = parse_finite(value),
            "snapshots" => {
                params.expand_snapshots = match value {
                    "1" | "true" | "expand" => Some(true),
                    "0" | "false" | "collapse" => Some(false),
                    _ => None,
                }
            }
            _ => {}
        }
    }

    params
}

/// Parses a number, rejecting `NaN` and infinities.
fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Formats the view as a query string.
pub fn format_query(lat: f64, lon: f64, zoom: f64) -> String {
    format!("?lat={:.4}&lon={:.4}&zoom={:.2}", lat, lon, zoom)
}

/// Parse URL query parameters from the current browser URL.
#[cfg(target_arch = "wasm32")]
pub fn parse_from_url() -> UrlParams {
    let Some(window) = web_sys::window() else {
        return UrlParams::default();
    };
    match window.location().search() {
        Ok(search) => parse_query(&search),
        Err(_) => UrlParams::default(),
    }
}

/// Native builds take the same query from the first command-line argument
/// that contains `=` (e.g. `meteor-map "lat=48.1&lon=17.0&zoom=7"`).
#[cfg(not(target_arch = "wasm32"))]
pub fn parse_from_url() -> UrlParams {
    std::env::args()
        .skip(1)
        .find(|arg| arg.contains('='))
        .map(|arg| parse_query(&arg))
        .unwrap_or_default()
}

/// Push the current view to the URL query string using `replaceState`.
#[cfg(target_arch = "wasm32")]
pub fn push_to_url(lat: f64, lon: f64, zoom: f64) {
    let query = format_query(lat, lon, zoom);

    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(history) = window.history() else {
        return;
    };
    if let Err(e) =
        history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&query))
    {
        log::warn!("Failed to update URL: {:?}", e);
    }
}

/// Native builds have no URL bar; the view is only logged.
#[cfg(not(target_arch = "wasm32"))]
pub fn push_to_url(lat: f64, lon: f64, zoom: f64) {
    log::trace!("View changed: {}", format_query(lat, lon, zoom));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_params() {
        let params = parse_query("?lat=48.3729&lon=17.2738&zoom=9");
        assert_eq!(params.lat, Some(48.3729));
        assert_eq!(params.lon, Some(17.2738));
        assert_eq!(params.zoom, Some(9.0));
        assert_eq!(params.expand_snapshots, None);
    }

    #[test]
    fn test_parse_ignores_junk() {
        let params = parse_query("lat=abc&foo=bar&&z=4.5&snapshots=maybe");
        assert_eq!(params.lat, None);
        assert_eq!(params.zoom, Some(4.5));
        assert_eq!(params.expand_snapshots, None);

        assert_eq!(parse_query(""), UrlParams::default());
        assert_eq!(parse_query("?"), UrlParams::default());
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        let params = parse_query("?lat=inf&lon=-inf&zoom=NaN");
        assert_eq!(params, UrlParams::default());
    }

    #[test]
    fn test_snapshot_flag() {
        assert_eq!(parse_query("snapshots=1").expand_snapshots, Some(true));
        assert_eq!(parse_query("snapshots=collapse").expand_snapshots, Some(false));
    }

    #[test]
    fn test_formatted_query_parses_back() {
        let params = parse_query(&format_query(48.3729, 17.2738, 9.0));
        assert_eq!(params.lat, Some(48.3729));
        assert_eq!(params.lon, Some(17.2738));
        assert_eq!(params.zoom, Some(9.0));
    }
}
