use super::{StateContext, TimelineState};
use crate::error::Result;
use crate::event::{EventKind, InputEvent};
use crate::track_collection::LayerSelector;
use log::trace;

/// Zoom around the pointer by dragging vertically, pan by dragging
/// horizontally
///
/// The root offset is compensated after each zoom step so the time under
/// the pointer keeps its pixel.
#[derive(Debug, Clone, Default)]
pub struct CenteredZoomState {
    pressed: bool,
}

impl CenteredZoomState {
    fn on_mouse_move(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        if !self.pressed {
            return Ok(());
        }
        let tree = &mut *ctx.contexts;
        let root = tree.root();
        let config = ctx.config;

        let last_center = tree.pixel_to_time(root, event.x)?;
        let ratio = tree.context(root)?.stretch_ratio() + event.dy * config.zoom_sensitivity;
        let ratio = tree.set_zoom(root, ratio.max(config.min_zoom_ratio))?;
        let new_center = tree.pixel_to_time(root, event.x)?;

        let scale = *tree.context(root)?.x_scale();
        let mut offset = tree.context(root)?.offset() + (new_center - last_center) + scale.invert_extent(event.dx);

        if config.clamp_zoomed_out_offset && ratio < 1.0 {
            // keep the whole visible duration inside the container
            let content_px = scale.apply_extent(tree.visible_duration());
            let max_offset = scale.invert_extent(tree.visible_width() - content_px);
            offset = offset.clamp(0.0, max_offset.max(0.0));
        }
        tree.set_offset(root, offset)?;

        trace!("Centered zoom: ratio {}, offset {}", ratio, offset);
        ctx.tracks.update(ctx.contexts, &LayerSelector::All)
    }
}

impl TimelineState for CenteredZoomState {
    fn exit(&mut self, _ctx: &mut StateContext) -> Result<()> {
        self.pressed = false;
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut StateContext, event: &InputEvent) -> Result<()> {
        match event.kind {
            EventKind::MouseDown => {
                self.pressed = true;
                Ok(())
            }
            EventKind::MouseMove => self.on_mouse_move(ctx, event),
            EventKind::MouseUp => {
                self.pressed = false;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InteractionConfig;
    use crate::shape::{NodeId, SceneGraph};
    use crate::time_context::TimeContextTree;
    use crate::track_collection::TrackCollection;
    use approx::assert_relative_eq;

    struct FlatScene;

    impl SceneGraph for FlatScene {
        fn parent(&self, _node: NodeId) -> Option<NodeId> {
            None
        }
    }

    #[test]
    fn test_clamp_keeps_zoomed_out_content_inside() {
        let mut tracks = TrackCollection::new();
        let mut contexts = TimeContextTree::new(100.0, 1000.0).unwrap();
        let config = InteractionConfig {
            clamp_zoomed_out_offset: true,
            ..InteractionConfig::default()
        };
        let mut ctx = StateContext {
            tracks: &mut tracks,
            contexts: &mut contexts,
            scene: &FlatScene,
            config: &config,
        };

        let mut state = CenteredZoomState::default();
        state.handle_event(&mut ctx, &InputEvent::mouse_down(900.0, 0.0)).unwrap();
        let event = InputEvent::mouse_move(900.0, 0.0).with_delta(0.0, -50.0);
        state.handle_event(&mut ctx, &event).unwrap();

        // ratio 0.5: 10 s fill 500 px, so the offset may range over 0..10 s
        let root = ctx.contexts.context(ctx.contexts.root()).unwrap();
        assert_relative_eq!(root.stretch_ratio(), 0.5);
        assert!(root.offset() >= 0.0 && root.offset() <= 10.0 + 1e-9);
    }
}
