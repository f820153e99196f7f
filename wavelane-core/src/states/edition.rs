use super::{StateContext, TimelineState};
use crate::error::Result;
use crate::event::{EventKind, InputEvent};
use crate::shape::NodeId;
use log::trace;
use uuid::Uuid;

/// Drag editing of the items under the pointer
///
/// Mousedown selects the item under the pointer (adding to the selection
/// with shift), then every move edits all selected items of that layer.
#[derive(Debug, Clone, Default)]
pub struct EditionState {
    pressed: bool,
    edited_layer: Option<Uuid>,
    target: Option<NodeId>,
}

impl EditionState {
    fn on_mouse_down(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        self.pressed = true;
        self.edited_layer = None;
        self.target = event.target;

        let Some(target) = event.target else {
            return Ok(());
        };
        let scene = ctx.scene;

        for layer in ctx.tracks.layers_mut() {
            if !layer.has_element(scene, target) {
                continue;
            }
            if !event.modifiers.shift {
                layer.unselect_all();
            }
            let Some(item) = layer.item_from_element(scene, target) else {
                continue;
            };
            self.edited_layer = Some(layer.id());
            layer.select(&[item]);
        }
        Ok(())
    }

    fn on_mouse_move(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        let (true, Some(layer_id)) = (self.pressed, self.edited_layer) else {
            return Ok(());
        };
        let Ok(layer) = ctx.tracks.layer_mut(layer_id) else {
            return Ok(());
        };

        let items = layer.selected_items();
        layer.edit(ctx.contexts, &items, event.dx, event.dy, self.target)?;
        layer.update_shapes(ctx.contexts, Some(&items))?;

        trace!("Edited {} items by ({}, {})", items.len(), event.dx, event.dy);
        Ok(())
    }
}

impl TimelineState for EditionState {
    fn exit(&mut self, _ctx: &mut StateContext) -> Result<()> {
        *self = Self::default();
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        match event.kind {
            EventKind::MouseDown => self.on_mouse_down(ctx, event),
            EventKind::MouseMove => self.on_mouse_move(ctx, event),
            EventKind::MouseUp => {
                *self = Self::default();
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
