//! Tracks
//!
//! A track is one horizontal window on the timeline: a stack of layers drawn
//! on the same surface. Every track of a timeline shows the same span of
//! time, shifted by the root context offset.

use crate::error::Result;
use crate::layer::AnyLayer;
use crate::reconciler::IdentityArena;
use crate::time_context::TimeContextTree;
use crate::track_collection::LayerSelector;
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default track height in pixels
pub const DEFAULT_TRACK_HEIGHT: f64 = 120.0;

/// Surface placement of a track, as computed by `update_container`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    /// Visible width of the root context
    pub width: f64,
    pub height: f64,
    /// Horizontal translation applied to every layer: root offset in pixels
    pub offset_x: f64,
}

/// Ordered stack of layers
pub struct Track {
    id: Uuid,
    layers: Vec<Box<dyn AnyLayer>>,
    height: f64,
    geometry: TrackGeometry,
}

impl Default for Track {
    fn default() -> Self {
        Self::new(DEFAULT_TRACK_HEIGHT)
    }
}

impl Track {
    pub fn new(height: f64) -> Self {
        Self::with_id(Uuid::new_v4(), height)
    }

    pub fn with_id(id: Uuid, height: f64) -> Self {
        Self {
            id,
            layers: Vec::new(),
            height,
            geometry: TrackGeometry::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Takes effect on the next `update_container`
    pub fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    /// Append a layer on top of the stack
    pub fn add(&mut self, layer: Box<dyn AnyLayer>) {
        self.layers.push(layer);
    }

    /// Take a layer out of the track without destroying it
    pub fn remove(&mut self, layer_id: Uuid) -> Option<Box<dyn AnyLayer>> {
        let index = self.layers.iter().position(|l| l.id() == layer_id)?;
        Some(self.layers.remove(index))
    }

    pub fn layers(&self) -> &[Box<dyn AnyLayer>] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Box<dyn AnyLayer>] {
        &mut self.layers
    }

    pub fn layer(&self, layer_id: Uuid) -> Option<&dyn AnyLayer> {
        self.layers
            .iter()
            .find(|l| l.id() == layer_id)
            .map(|l| l.as_ref())
    }

    pub fn layer_mut(&mut self, layer_id: Uuid) -> Option<&mut Box<dyn AnyLayer>> {
        self.layers.iter_mut().find(|l| l.id() == layer_id)
    }

    pub fn contains_layer(&self, layer_id: Uuid) -> bool {
        self.layers.iter().any(|l| l.id() == layer_id)
    }

    /// Reconcile every layer against its data
    pub fn render(&mut self, tree: &TimeContextTree, arena: &mut IdentityArena) -> Result<()> {
        for layer in &mut self.layers {
            layer.render(tree, arena)?;
        }
        Ok(())
    }

    /// `update_container` then `update_layers`
    pub fn update(&mut self, tree: &TimeContextTree, selector: &LayerSelector) -> Result<()> {
        self.update_container(tree)?;
        self.update_layers(tree, selector)
    }

    /// Recompute the track geometry from the root context
    pub fn update_container(&mut self, tree: &TimeContextTree) -> Result<()> {
        self.geometry = TrackGeometry {
            width: tree.visible_width(),
            height: self.height,
            offset_x: tree.offset_px(tree.root())?,
        };
        Ok(())
    }

    /// Update the layers of this track matched by `selector`
    pub fn update_layers(&mut self, tree: &TimeContextTree, selector: &LayerSelector) -> Result<()> {
        for layer in self.layers.iter_mut().filter(|l| selector.matches(l.as_ref())) {
            layer.update(tree)?;
        }
        Ok(())
    }

    /// Destroy every layer's items and hand the layers back
    ///
    /// The returned layers have no items left and can be added to another
    /// track.
    pub fn destroy(mut self) -> Vec<Box<dyn AnyLayer>> {
        for layer in &mut self.layers {
            layer.destroy();
        }
        debug!("Destroyed track {} ({} layers released)", self.id, self.layers.len());
        self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_follows_root_offset() {
        let mut tree = TimeContextTree::new(100.0, 800.0).unwrap();
        tree.set_offset(tree.root(), -2.0).unwrap();

        let mut track = Track::default();
        track.update_container(&tree).unwrap();
        assert_eq!(
            *track.geometry(),
            TrackGeometry {
                width: 800.0,
                height: DEFAULT_TRACK_HEIGHT,
                offset_x: -200.0,
            }
        );

        track.set_height(60.0);
        track.update(&tree, &LayerSelector::All).unwrap();
        assert_eq!(track.geometry().height, 60.0);
    }

    #[test]
    fn test_remove_unknown_layer() {
        let mut track = Track::new(80.0);
        assert!(track.remove(Uuid::new_v4()).is_none());
        assert!(track.destroy().is_empty());
    }
}
