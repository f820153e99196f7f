//! Interaction states
//!
//! A timeline routes every input event to exactly one active state. Each
//! state interprets the pointer gesture its own way (brush selection, drag
//! editing, context editing, zooming) and only keeps per-gesture data
//! between a mousedown and its mouseup.

mod brush_zoom;
mod centered_zoom;
mod context_edition;
mod edition;
mod selection;

pub use brush_zoom::BrushZoomState;
pub use centered_zoom::CenteredZoomState;
pub use context_edition::ContextEditionState;
pub use edition::EditionState;
pub use selection::SelectionState;

use crate::config::InteractionConfig;
use crate::error::Result;
use crate::event::InputEvent;
use crate::shape::{NodeId, SceneGraph};
use crate::time_context::TimeContextTree;
use crate::track_collection::TrackCollection;
use kurbo::Rect;
use uuid::Uuid;

/// What a state may touch while handling an event
pub struct StateContext<'a> {
    pub tracks: &'a mut TrackCollection,
    pub contexts: &'a mut TimeContextTree,
    pub scene: &'a dyn SceneGraph,
    pub config: &'a InteractionConfig,
}

impl StateContext<'_> {
    /// First layer containing `target`, with the layer that owns it as an
    /// item taking precedence over one that merely contains it
    pub(crate) fn layer_under(&self, target: Option<NodeId>) -> Option<Uuid> {
        let target = target?;
        self.tracks
            .layers()
            .find(|l| l.item_from_element(self.scene, target).is_some())
            .or_else(|| self.tracks.layers().find(|l| l.has_element(self.scene, target)))
            .map(|l| l.id())
    }
}

/// Behavior shared by every interaction state
///
/// `enter` and `exit` default to doing nothing.
pub trait TimelineState {
    fn enter(&mut self, _ctx: &mut StateContext) -> Result<()> {
        Ok(())
    }

    fn exit(&mut self, _ctx: &mut StateContext) -> Result<()> {
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()>;

    /// Brush rectangle to draw, in surface pixels
    fn brush(&self) -> Option<Rect> {
        None
    }
}

/// The closed set of interaction states
#[derive(Debug, Clone)]
pub enum InteractionState {
    Selection(SelectionState),
    Edition(EditionState),
    ContextEdition(ContextEditionState),
    CenteredZoom(CenteredZoomState),
    BrushZoom(BrushZoomState),
}

impl InteractionState {
    pub fn selection() -> Self {
        InteractionState::Selection(SelectionState::default())
    }

    pub fn edition() -> Self {
        InteractionState::Edition(EditionState::default())
    }

    pub fn context_edition() -> Self {
        InteractionState::ContextEdition(ContextEditionState::default())
    }

    pub fn centered_zoom() -> Self {
        InteractionState::CenteredZoom(CenteredZoomState::default())
    }

    pub fn brush_zoom() -> Self {
        InteractionState::BrushZoom(BrushZoomState::default())
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Selection(_) => "selection",
            InteractionState::Edition(_) => "edition",
            InteractionState::ContextEdition(_) => "context-edition",
            InteractionState::CenteredZoom(_) => "centered-zoom",
            InteractionState::BrushZoom(_) => "brush-zoom",
        }
    }

    fn as_state_mut(&mut self) -> &mut dyn TimelineState {
        match self {
            InteractionState::Selection(state) => state,
            InteractionState::Edition(state) => state,
            InteractionState::ContextEdition(state) => state,
            InteractionState::CenteredZoom(state) => state,
            InteractionState::BrushZoom(state) => state,
        }
    }

    fn as_state(&self) -> &dyn TimelineState {
        match self {
            InteractionState::Selection(state) => state,
            InteractionState::Edition(state) => state,
            InteractionState::ContextEdition(state) => state,
            InteractionState::CenteredZoom(state) => state,
            InteractionState::BrushZoom(state) => state,
        }
    }

    pub fn enter(&mut self, ctx: &mut StateContext) -> Result<()> {
        self.as_state_mut().enter(ctx)
    }

    pub fn exit(&mut self, ctx: &mut StateContext) -> Result<()> {
        self.as_state_mut().exit(ctx)
    }

    pub fn handle_event(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        self.as_state_mut().handle_event(ctx, event)
    }

    pub fn brush(&self) -> Option<Rect> {
        self.as_state().brush()
    }
}
