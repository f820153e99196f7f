//! Timeline aggregate
//!
//! Owns the time context tree, the identity arena, the tracks and the
//! active interaction state, and routes input events to that state.

use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::event::InputEvent;
use crate::layer::{AnyLayer, Datum, Layer};
use crate::reconciler::IdentityArena;
use crate::shape::SceneGraph;
use crate::states::{InteractionState, StateContext};
use crate::time_context::TimeContextTree;
use crate::track::Track;
use crate::track_collection::{LayerSelector, TrackCollection};
use kurbo::Rect;
use log::debug;
use uuid::Uuid;

/// Multi-track timeline sharing one root time context
pub struct Timeline {
    config: TimelineConfig,
    contexts: TimeContextTree,
    identities: IdentityArena,
    tracks: TrackCollection,
    state: Option<InteractionState>,
}

impl Timeline {
    /// Create an empty timeline with the root viewport from `config`
    pub fn new(config: TimelineConfig) -> Result<Self> {
        let mut contexts = TimeContextTree::new(config.pixels_per_second, config.visible_width)?;
        contexts.set_maintain_visible_duration(config.maintain_visible_duration);

        Ok(Self {
            config,
            contexts,
            identities: IdentityArena::new(),
            tracks: TrackCollection::new(),
            state: None,
        })
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn contexts(&self) -> &TimeContextTree {
        &self.contexts
    }

    /// Direct access to the time contexts; call `update` afterwards
    pub fn contexts_mut(&mut self) -> &mut TimeContextTree {
        &mut self.contexts
    }

    pub fn tracks(&self) -> &TrackCollection {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut TrackCollection {
        &mut self.tracks
    }

    /// Append an empty track with the configured height
    pub fn add_track(&mut self) -> Uuid {
        let track = Track::new(self.config.track_height);
        let id = track.id();
        self.tracks.push(track);
        id
    }

    /// Destroy a track's items and hand back its layers
    pub fn remove_track(&mut self, track_id: Uuid) -> Result<Vec<Box<dyn AnyLayer>>> {
        let track = self
            .tracks
            .remove(track_id)
            .ok_or(TimelineError::UnknownTrack(track_id))?;
        Ok(track.destroy())
    }

    /// Add a layer to a track
    ///
    /// A layer without a time context gets a fresh child of the root.
    pub fn add_layer(&mut self, track_id: Uuid, mut layer: Box<dyn AnyLayer>) -> Result<Uuid> {
        if self.tracks.track(track_id).is_none() {
            return Err(TimelineError::UnknownTrack(track_id));
        }
        match layer.time_context() {
            Some(context) => {
                self.contexts.context(context)?;
            }
            None => {
                let context = self.contexts.attach(self.contexts.root())?;
                layer.set_time_context(context);
            }
        }

        let id = layer.id();
        self.tracks.track_mut(track_id)?.add(layer);
        debug!("Added layer {} to track {}", id, track_id);
        Ok(id)
    }

    /// Remove and destroy a layer
    ///
    /// Its time context is detached when no remaining layer renders under
    /// it or under one of its descendants.
    pub fn remove_layer(&mut self, layer_id: Uuid) -> Result<Box<dyn AnyLayer>> {
        let mut layer = self
            .tracks
            .tracks_mut()
            .iter_mut()
            .find_map(|t| t.remove(layer_id))
            .ok_or(TimelineError::UnknownLayer(layer_id))?;
        layer.destroy();

        if let Some(context) = layer.time_context() {
            if context != self.contexts.root() && self.contexts.contains(context) {
                let mut subtree = self.contexts.descendants(context)?;
                subtree.push(context);
                let in_use = self
                    .tracks
                    .layers()
                    .filter_map(|l| l.time_context())
                    .any(|c| subtree.contains(&c));
                if !in_use {
                    self.contexts.detach(context)?;
                }
            }
        }
        Ok(layer)
    }

    /// Typed access to a layer
    pub fn layer<T: Datum>(&self, layer_id: Uuid) -> Option<&Layer<T>> {
        self.tracks.layer(layer_id)?.as_any().downcast_ref()
    }

    pub fn layer_mut<T: Datum>(&mut self, layer_id: Uuid) -> Option<&mut Layer<T>> {
        self.tracks.layer_mut(layer_id).ok()?.as_any_mut().downcast_mut()
    }

    /// Reconcile every layer against its data
    pub fn render(&mut self) -> Result<()> {
        self.tracks.render(&self.contexts, &mut self.identities)
    }

    /// Update track containers and the selected layers
    pub fn update(&mut self, selector: &LayerSelector) -> Result<()> {
        self.tracks.update(&self.contexts, selector)
    }

    /// Resize the visible width of the root context
    pub fn set_visible_width(&mut self, width: f64) -> Result<()> {
        self.contexts.set_visible_width(width)
    }

    pub fn state(&self) -> Option<&InteractionState> {
        self.state.as_ref()
    }

    /// Switch interaction state, exiting the current one first
    pub fn set_state(&mut self, state: InteractionState, scene: &dyn SceneGraph) -> Result<()> {
        let Self {
            config,
            contexts,
            tracks,
            state: current,
            ..
        } = self;
        let mut ctx = StateContext {
            tracks,
            contexts,
            scene,
            config: &config.interaction,
        };

        if let Some(previous) = current.as_mut() {
            previous.exit(&mut ctx)?;
            debug!("Exited {} state", previous.name());
        }
        let next = current.insert(state);
        next.enter(&mut ctx)?;
        debug!("Entered {} state", next.name());
        Ok(())
    }

    /// Route an event to the active state; ignored when no state is set
    pub fn handle_event(&mut self, event: &InputEvent, scene: &dyn SceneGraph) -> Result<()> {
        let Self {
            config,
            contexts,
            tracks,
            state,
            ..
        } = self;
        let Some(state) = state.as_mut() else {
            return Ok(());
        };
        let mut ctx = StateContext {
            tracks,
            contexts,
            scene,
            config: &config.interaction,
        };
        state.handle_event(&mut ctx, event)
    }

    /// Brush of the active state, for the host to draw
    pub fn brush(&self) -> Option<Rect> {
        self.state.as_ref().and_then(InteractionState::brush)
    }
}
