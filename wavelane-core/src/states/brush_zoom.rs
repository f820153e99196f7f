use super::{StateContext, TimelineState};
use crate::error::Result;
use crate::event::{EventKind, InputEvent, Key};
use crate::track_collection::LayerSelector;
use kurbo::Rect;
use log::{debug, trace};

/// Zoom onto a horizontally brushed time range
///
/// On mouseup the brushed range fills the whole visible width. Space resets
/// the root context to no offset and no zoom.
#[derive(Debug, Clone, Default)]
pub struct BrushZoomState {
    start_x: Option<f64>,
    height: f64,
    brush: Option<Rect>,
}

impl BrushZoomState {
    fn on_mouse_down(&mut self, ctx: &mut StateContext, event: &InputEvent) {
        self.start_x = Some(event.x);
        // tracks are stacked, the brush covers all of them
        self.height = ctx.tracks.tracks().iter().map(|t| t.height()).sum();
        self.brush = Some(Rect::new(event.x, 0.0, event.x, self.height));
    }

    fn on_mouse_move(&mut self, event: &InputEvent) {
        if let Some(start_x) = self.start_x {
            self.brush = Some(Rect::new(start_x.min(event.x), 0.0, start_x.max(event.x), self.height));
        }
    }

    fn on_mouse_up(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        self.brush = None;
        let Some(start_x) = self.start_x.take() else {
            return Ok(());
        };

        let tree = &mut *ctx.contexts;
        let root = tree.root();
        let left = tree.left_px(root)?;

        let min_time = tree.pixel_to_time(root, start_x.min(event.x).max(left))?;
        let max_time = tree.pixel_to_time(root, start_x.max(event.x))?;
        let delta = max_time - min_time;
        if delta <= 0.0 {
            trace!("Empty zoom brush ignored");
            return Ok(());
        }

        let ratio = tree.set_zoom(root, tree.visible_duration() / delta)?;
        tree.set_offset(root, -min_time)?;
        debug!("Brush zoom onto {}..{} s (ratio {})", min_time, max_time, ratio);

        ctx.tracks.update(ctx.contexts, &LayerSelector::All)
    }

    fn reset(&mut self, ctx: &mut StateContext) -> Result<()> {
        let root = ctx.contexts.root();
        ctx.contexts.set_offset(root, 0.0)?;
        ctx.contexts.set_zoom(root, 1.0)?;
        debug!("Brush zoom reset");
        ctx.tracks.update(ctx.contexts, &LayerSelector::All)
    }
}

impl TimelineState for BrushZoomState {
    fn exit(&mut self, _ctx: &mut StateContext) -> Result<()> {
        self.start_x = None;
        self.brush = None;
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        match event.kind {
            EventKind::MouseDown => {
                self.on_mouse_down(ctx, event);
                Ok(())
            }
            EventKind::MouseMove => {
                self.on_mouse_move(event);
                Ok(())
            }
            EventKind::MouseUp => self.on_mouse_up(ctx, event),
            EventKind::KeyDown if event.key == Some(Key::Space) => self.reset(ctx),
            _ => Ok(()),
        }
    }

    fn brush(&self) -> Option<Rect> {
        self.brush
    }
}
