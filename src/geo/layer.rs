//! Feature layer data structures.

use super::projection::ProjectedPoint;
use eframe::egui::{Color32, Stroke};
use geo_types::Coord;

/// Kind of data layer drawn over the base map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Meteors,
    Stations,
}

impl LayerKind {
    /// Display label for the layer.
    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::Meteors => "Meteors",
            LayerKind::Stations => "Stations",
        }
    }

    /// Style shared by every feature of this layer unless a feature overrides it.
    pub fn base_style(&self) -> MarkerStyle {
        match self {
            LayerKind::Meteors => MarkerStyle {
                radius: 4.0,
                fill: Color32::from_rgba_unmultiplied(230, 40, 40, 160),
                stroke: None,
            },
            LayerKind::Stations => MarkerStyle {
                radius: 3.0,
                fill: Color32::from_rgb(40, 170, 60),
                stroke: Some(Stroke::new(1.0, Color32::from_rgb(20, 80, 30))),
            },
        }
    }

    /// Layers in drawing order (back to front).
    pub fn all() -> &'static [LayerKind] {
        &[LayerKind::Meteors, LayerKind::Stations]
    }
}

/// Visual style of a circular point marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    /// Radius in screen pixels
    pub radius: f32,
    /// Fill color
    pub fill: Color32,
    /// Optional outline
    pub stroke: Option<Stroke>,
}

/// A renderable point with geometry and style.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualFeature {
    /// Geographic position (x = lon, y = lat)
    pub coord: Coord<f64>,
    /// Position in the projected display frame
    pub point: ProjectedPoint,
    /// Per-feature style; `None` uses the layer's base style
    pub style: Option<MarkerStyle>,
    /// Text shown next to the marker when labels are enabled
    pub label: Option<String>,
    /// Source magnitude, for meteors
    pub magnitude: Option<f64>,
}

/// A named, ordered collection of features rendered together.
#[derive(Debug, Clone)]
pub struct FeatureLayer {
    /// Kind of this layer
    pub kind: LayerKind,
    /// Features in insertion order
    pub features: Vec<VisualFeature>,
    /// Style for features without their own
    pub base_style: MarkerStyle,
    /// Whether this layer is visible
    pub visible: bool,
}

impl FeatureLayer {
    /// Creates a new empty layer of the specified kind.
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            features: Vec::new(),
            base_style: kind.base_style(),
            visible: true,
        }
    }

    /// Returns the effective style for one of this layer's features.
    pub fn style_for(&self, feature: &VisualFeature) -> MarkerStyle {
        feature.style.unwrap_or(self.base_style)
    }

    /// Appends features, keeping their order.
    pub fn extend(&mut self, features: impl IntoIterator<Item = VisualFeature>) {
        self.features.extend(features);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// The two data layers attached to the map.
#[derive(Debug, Clone)]
pub struct LayerSet {
    pub meteors: FeatureLayer,
    pub stations: FeatureLayer,
}

impl Default for LayerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerSet {
    /// Creates both layers, empty.
    pub fn new() -> Self {
        Self {
            meteors: FeatureLayer::new(LayerKind::Meteors),
            stations: FeatureLayer::new(LayerKind::Stations),
        }
    }

    /// Returns an iterator over the layers in drawing order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureLayer> {
        [&self.meteors, &self.stations].into_iter()
    }

    pub fn get(&self, kind: LayerKind) -> &FeatureLayer {
        match kind {
            LayerKind::Meteors => &self.meteors,
            LayerKind::Stations => &self.stations,
        }
    }

    pub fn get_mut(&mut self, kind: LayerKind) -> &mut FeatureLayer {
        match kind {
            LayerKind::Meteors => &mut self.meteors,
            LayerKind::Stations => &mut self.stations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(style: Option<MarkerStyle>) -> VisualFeature {
        VisualFeature {
            coord: Coord { x: 0.0, y: 0.0 },
            point: ProjectedPoint::default(),
            style,
            label: None,
            magnitude: None,
        }
    }

    #[test]
    fn test_new_layers_are_empty_and_visible() {
        let layers = LayerSet::new();
        for layer in layers.iter() {
            assert!(layer.is_empty());
            assert!(layer.visible);
            assert_eq!(layer.base_style, layer.kind.base_style());
        }
    }

    #[test]
    fn test_drawing_order() {
        let layers = LayerSet::new();
        let kinds: Vec<LayerKind> = layers.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, LayerKind::all());
    }

    #[test]
    fn test_feature_style_overrides_base() {
        let layer = FeatureLayer::new(LayerKind::Meteors);
        let custom = MarkerStyle {
            radius: 9.0,
            ..layer.base_style
        };

        assert_eq!(layer.style_for(&feature(None)), layer.base_style);
        assert_eq!(layer.style_for(&feature(Some(custom))).radius, 9.0);
    }

    #[test]
    fn test_meteor_and_station_colors_differ() {
        assert_ne!(
            LayerKind::Meteors.base_style().fill,
            LayerKind::Stations.base_style().fill
        );
    }

    #[test]
    fn test_extend_preserves_order() {
        let mut layers = LayerSet::new();
        let mut a = feature(None);
        a.label = Some("A".to_string());
        let mut b = feature(None);
        b.label = Some("B".to_string());

        layers.get_mut(LayerKind::Stations).extend(vec![a, b]);

        let labels: Vec<_> = layers
            .get(LayerKind::Stations)
            .features
            .iter()
            .map(|f| f.label.clone().unwrap())
            .collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert!(layers.meteors.is_empty());
    }
}
