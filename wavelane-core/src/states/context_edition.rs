use super::{StateContext, TimelineState};
use crate::error::Result;
use crate::event::{EventKind, InputEvent};
use crate::shape::NodeId;
use crate::track_collection::LayerSelector;
use uuid::Uuid;

/// Drag editing of a layer's time context
///
/// Plain drags trim or move the context of the layer under the pointer;
/// with shift the same drag stretches it.
#[derive(Debug, Clone, Default)]
pub struct ContextEditionState {
    pressed: bool,
    current_layer: Option<Uuid>,
    target: Option<NodeId>,
}

impl ContextEditionState {
    fn on_mouse_down(&mut self, ctx: &mut StateContext, event: &InputEvent) {
        self.pressed = true;
        self.target = event.target;
        self.current_layer = event.target.and_then(|target| {
            ctx.tracks
                .layers()
                .find(|l| l.has_element(ctx.scene, target))
                .map(|l| l.id())
        });
    }

    fn on_mouse_move(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        let (true, Some(layer_id)) = (self.pressed, self.current_layer) else {
            return Ok(());
        };
        let Ok(layer) = ctx.tracks.layer_mut(layer_id) else {
            return Ok(());
        };

        if event.modifiers.shift {
            layer.stretch_context(ctx.contexts, event.dx, event.dy, self.target)?;
        } else {
            layer.edit_context(ctx.contexts, event.dx, event.dy, self.target)?;
        }
        ctx.tracks.update(ctx.contexts, &LayerSelector::Layer(layer_id))
    }
}

impl TimelineState for ContextEditionState {
    fn exit(&mut self, _ctx: &mut StateContext) -> Result<()> {
        *self = Self::default();
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        match event.kind {
            EventKind::MouseDown => {
                self.on_mouse_down(ctx, event);
                Ok(())
            }
            EventKind::MouseMove => self.on_mouse_move(ctx, event),
            EventKind::MouseUp => {
                *self = Self::default();
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
