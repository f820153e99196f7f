//! Preset layers
//!
//! Shortcuts for the two common editable layer kinds, configured from a
//! [`TimelineConfig`].

use crate::behavior::Behavior;
use crate::config::TimelineConfig;
use crate::error::Result;
use crate::layer::{Datum, Layer};
use crate::shape::ShapeFactory;

/// Collection layer of resizable spans (segments, regions)
pub fn segment_layer<T: Datum>(
    config: &TimelineConfig,
    name: impl Into<String>,
    records: Vec<T>,
    shape_factory: ShapeFactory<T>,
) -> Result<Layer<T>> {
    Layer::collection(name, records, shape_factory)
        .with_behavior(Behavior::span().with_selected_class(config.selected_class.clone()))
        .with_params(config.layer.clone())
}

/// Collection layer of movable points in time (markers, cue points)
pub fn marker_layer<T: Datum>(
    config: &TimelineConfig,
    name: impl Into<String>,
    records: Vec<T>,
    shape_factory: ShapeFactory<T>,
) -> Result<Layer<T>> {
    Layer::collection(name, records, shape_factory)
        .with_behavior(Behavior::point().with_selected_class(config.selected_class.clone()))
        .with_params(config.layer.clone())
}
