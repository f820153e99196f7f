use super::{StateContext, TimelineState};
use crate::error::Result;
use crate::event::{EventKind, InputEvent, Key};
use crate::reconciler::ItemKey;
use kurbo::Rect;
use log::{debug, trace};
use uuid::Uuid;

/// Brush and click selection inside one layer
///
/// A mousedown picks the layer under the pointer and snapshots its
/// selection. While dragging, the items under the brush replace the
/// selection, or with shift are toggled against the snapshot. A click that
/// follows a gesture with no real drag toggles the item under the pointer.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    current_layer: Option<Uuid>,
    previous_selection: Vec<ItemKey>,
    pressed: bool,
    shift_held: bool,
    brush: Option<Rect>,
    pending_click: Option<PendingClick>,
}

/// Gesture that just ended and may be followed by a click event
#[derive(Debug, Clone, Copy)]
struct PendingClick {
    area: f64,
}

impl SelectionState {
    /// Layer the selection currently applies to
    pub fn current_layer(&self) -> Option<Uuid> {
        self.current_layer
    }

    /// Selection snapshot of the gesture in progress, empty once its click
    /// has been handled
    pub fn previous_selection(&self) -> &[ItemKey] {
        &self.previous_selection
    }

    fn shift(&self, event: &InputEvent) -> bool {
        self.shift_held || event.modifiers.shift
    }

    fn on_mouse_down(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        self.pressed = true;
        self.brush = None;
        self.pending_click = None;

        let new_layer = ctx.layer_under(event.target);
        if let (Some(current), Some(new)) = (self.current_layer, new_layer) {
            if current != new {
                if let Ok(layer) = ctx.tracks.layer_mut(current) {
                    layer.unselect_all();
                }
            }
        }
        if new_layer.is_some() {
            self.current_layer = new_layer;
        }

        let Some(layer_id) = self.current_layer else {
            return Ok(());
        };
        let Ok(layer) = ctx.tracks.layer_mut(layer_id) else {
            // the layer was removed since the last gesture
            self.current_layer = None;
            return Ok(());
        };

        self.previous_selection = layer.selected_items();
        if !self.shift(event) {
            layer.unselect_all();
        }
        Ok(())
    }

    fn on_mouse_move(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        if !self.pressed {
            return Ok(());
        }
        self.brush = event.area;

        let (Some(layer_id), Some(area)) = (self.current_layer, event.area) else {
            return Ok(());
        };
        let Ok(layer) = ctx.tracks.layer_mut(layer_id) else {
            return Ok(());
        };

        let in_area = layer.items_in_area(ctx.contexts, area)?;
        let desired: Vec<ItemKey> = if self.shift(event) {
            // symmetric difference with the snapshot
            let mut keys: Vec<ItemKey> = self
                .previous_selection
                .iter()
                .filter(|k| !in_area.contains(k))
                .copied()
                .collect();
            keys.extend(in_area.iter().filter(|k| !self.previous_selection.contains(k)));
            keys
        } else {
            in_area
        };

        let current = layer.selected_items();
        let stale: Vec<ItemKey> = current.iter().filter(|k| !desired.contains(k)).copied().collect();
        let fresh: Vec<ItemKey> = desired.iter().filter(|k| !current.contains(k)).copied().collect();
        layer.unselect(&stale);
        layer.select(&fresh);

        trace!("Brush {:?}: {} selected, {} unselected", area, fresh.len(), stale.len());
        Ok(())
    }

    fn on_mouse_up(&mut self, event: &InputEvent) {
        if !self.pressed {
            return;
        }
        self.pressed = false;
        self.brush = None;
        self.pending_click = Some(PendingClick {
            area: event.area.map_or(0.0, |a| a.area()),
        });
    }

    fn on_click(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        let Some(pending) = self.pending_click.take() else {
            return Ok(());
        };
        let previous = std::mem::take(&mut self.previous_selection);
        if pending.area > ctx.config.click_tolerance {
            return Ok(());
        }
        let Some(layer_id) = self.current_layer else {
            return Ok(());
        };

        let scene = ctx.scene;
        let shift = self.shift(event);
        let Ok(layer) = ctx.tracks.layer_mut(layer_id) else {
            return Ok(());
        };
        let item = event.target.and_then(|t| layer.item_from_element(scene, t));

        if !previous.is_empty() && !shift {
            layer.unselect_all();
        }
        if let Some(item) = item {
            if previous.contains(&item) {
                layer.unselect(&[item]);
            } else {
                layer.select(&[item]);
            }
            debug!("Click toggled {:?}", item);
        }
        Ok(())
    }

    fn on_key(&mut self, event: &InputEvent) {
        self.shift_held = match event.key {
            Some(Key::Shift) => event.kind == EventKind::KeyDown,
            _ => event.modifiers.shift,
        };
    }
}

impl TimelineState for SelectionState {
    fn exit(&mut self, _ctx: &mut StateContext) -> Result<()> {
        self.pressed = false;
        self.brush = None;
        self.pending_click = None;
        self.previous_selection.clear();
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        match event.kind {
            EventKind::MouseDown => self.on_mouse_down(ctx, event),
            EventKind::MouseMove => self.on_mouse_move(ctx, event),
            EventKind::MouseUp => {
                self.on_mouse_up(event);
                Ok(())
            }
            EventKind::Click => self.on_click(ctx, event),
            EventKind::KeyDown | EventKind::KeyUp => {
                self.on_key(event);
                Ok(())
            }
            EventKind::DblClick => Ok(()),
        }
    }

    fn brush(&self) -> Option<Rect> {
        self.brush
    }
}
