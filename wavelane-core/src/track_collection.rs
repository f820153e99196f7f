//! All tracks of a timeline, updated together

use crate::error::{Result, TimelineError};
use crate::layer::AnyLayer;
use crate::reconciler::IdentityArena;
use crate::time_context::TimeContextTree;
use crate::track::Track;
use log::debug;
use uuid::Uuid;

/// Which layers a batched update touches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerSelector<'a> {
    /// Every layer of every track
    All,
    /// Layers whose group name matches
    Group(&'a str),
    /// A single layer
    Layer(Uuid),
}

impl LayerSelector<'_> {
    pub fn matches(&self, layer: &dyn AnyLayer) -> bool {
        match self {
            LayerSelector::All => true,
            LayerSelector::Group(group) => layer.group() == Some(*group),
            LayerSelector::Layer(id) => layer.id() == *id,
        }
    }
}

/// Ordered tracks of one timeline
#[derive(Default)]
pub struct TrackCollection {
    tracks: Vec<Track>,
}

impl TrackCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Take a track out of the collection
    pub fn remove(&mut self, track_id: Uuid) -> Option<Track> {
        let index = self.tracks.iter().position(|t| t.id() == track_id)?;
        Some(self.tracks.remove(index))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    pub fn track(&self, track_id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id() == track_id)
    }

    pub fn track_mut(&mut self, track_id: Uuid) -> Result<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| t.id() == track_id)
            .ok_or(TimelineError::UnknownTrack(track_id))
    }

    /// Track holding `layer_id`
    pub fn track_of(&self, layer_id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.contains_layer(layer_id))
    }

    /// Every layer, track by track
    pub fn layers(&self) -> impl Iterator<Item = &dyn AnyLayer> + '_ {
        self.tracks
            .iter()
            .flat_map(|t| t.layers().iter().map(|l| l.as_ref() as &dyn AnyLayer))
    }

    pub fn layers_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn AnyLayer>> + '_ {
        self.tracks.iter_mut().flat_map(|t| t.layers_mut().iter_mut())
    }

    pub fn layer(&self, layer_id: Uuid) -> Option<&dyn AnyLayer> {
        self.tracks.iter().find_map(|t| t.layer(layer_id))
    }

    pub fn layer_mut(&mut self, layer_id: Uuid) -> Result<&mut Box<dyn AnyLayer>> {
        self.tracks
            .iter_mut()
            .find_map(|t| t.layer_mut(layer_id))
            .ok_or(TimelineError::UnknownLayer(layer_id))
    }

    /// Ids of the layers matched by `selector`
    pub fn layer_ids(&self, selector: &LayerSelector) -> Vec<Uuid> {
        self.layers()
            .filter(|l| selector.matches(*l))
            .map(|l| l.id())
            .collect()
    }

    /// Apply the same height to every track
    pub fn set_height(&mut self, height: f64) {
        for track in &mut self.tracks {
            track.set_height(height);
        }
    }

    /// Reconcile every layer of every track
    pub fn render(&mut self, tree: &TimeContextTree, arena: &mut IdentityArena) -> Result<()> {
        for track in &mut self.tracks {
            track.render(tree, arena)?;
        }
        debug!("Rendered {} tracks", self.tracks.len());
        Ok(())
    }

    /// Update every track container and the layers matched by `selector`
    pub fn update(&mut self, tree: &TimeContextTree, selector: &LayerSelector) -> Result<()> {
        for track in &mut self.tracks {
            track.update(tree, selector)?;
        }
        Ok(())
    }

    pub fn update_containers(&mut self, tree: &TimeContextTree) -> Result<()> {
        for track in &mut self.tracks {
            track.update_container(tree)?;
        }
        Ok(())
    }

    /// Update the layers matched by `selector`, leaving containers untouched
    pub fn update_layers(&mut self, tree: &TimeContextTree, selector: &LayerSelector) -> Result<()> {
        for track in &mut self.tracks {
            track.update_layers(tree, selector)?;
        }
        Ok(())
    }
}
