//! Geographic layer system for the map.
//!
//! This module provides the coordinate transformation from geographic to
//! projected display coordinates, the base tile layer, and the point
//! feature layers drawn on top of it.

mod layer;
mod projection;
mod renderer;
mod tiles;

pub use layer::{FeatureLayer, LayerKind, LayerSet, MarkerStyle, VisualFeature};
pub use projection::{
    lonlat_to_mercator, mercator_to_lonlat, MapProjection, ProjectedPoint, ProjectionError,
    Viewport,
};
pub use renderer::{pick_feature, render_base_tiles, render_feature_layers};
pub use tiles::TileSource;
