//! Time context edits
//!
//! Dragging a layer's context box moves, trims or stretches the time
//! context the layer renders under, rather than the data inside it.

use crate::error::Result;
use crate::shape::Handle;
use crate::time_context::{ContextId, TimeContextTree};
use log::trace;

/// Narrowest width, in pixels, a context can be trimmed to
pub const MIN_CONTEXT_WIDTH_PX: f64 = 1.0;

/// Edits `start`, `offset`, `duration` and `stretch_ratio` of a context
/// from pixel deltas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeContextBehavior;

impl TimeContextBehavior {
    /// Trim (left/right handle) or move (body) the context
    pub fn edit(&self, tree: &mut TimeContextTree, id: ContextId, dx: f64, handle: Handle) -> Result<()> {
        match handle {
            Handle::Left => self.edit_left(tree, id, dx),
            Handle::Right => self.edit_right(tree, id, dx),
            Handle::Body => self.move_context(tree, id, dx),
        }
    }

    /// Same gesture as [`edit`](Self::edit), but the width change becomes a
    /// zoom: the stretch ratio is multiplied by `duration_after /
    /// duration_before` and the previous offset and duration are restored
    pub fn stretch(&self, tree: &mut TimeContextTree, id: ContextId, dx: f64, handle: Handle) -> Result<()> {
        let (last_duration, last_offset) = {
            let context = tree.context(id)?;
            (context.duration(), context.offset())
        };

        self.edit(tree, id, dx, handle)?;

        let new_duration = tree.context(id)?.duration();
        if last_duration > 0.0 {
            let ratio = new_duration / last_duration;
            let current = tree.context(id)?.stretch_ratio();
            tree.set_zoom(id, current * ratio)?;
        } else {
            trace!("Context {:?} has no duration, stretch skipped", id);
        }

        tree.set_offset(id, last_offset)?;
        tree.set_duration(id, last_duration)?;
        Ok(())
    }

    /// Moves the left edge with the right edge fixed, compensating the
    /// offset so content stays in place
    fn edit_left(&self, tree: &mut TimeContextTree, id: ContextId, dx: f64) -> Result<()> {
        let x = tree.start_px(id)?;
        let offset = tree.offset_px(id)?;
        let width = tree.duration_px(id)?;

        let dx = dx.min(width - MIN_CONTEXT_WIDTH_PX);
        let target_x = x + dx;
        let target_offset = offset - dx;
        let target_width = width - dx;

        let parent_scale = *tree.parent_scale(id)?;
        let own_scale = *tree.context(id)?.x_scale();
        tree.set_start(id, parent_scale.invert(target_x))?;
        tree.set_offset(id, own_scale.invert_extent(target_offset))?;
        tree.set_duration(id, own_scale.invert_extent(target_width))?;
        Ok(())
    }

    fn edit_right(&self, tree: &mut TimeContextTree, id: ContextId, dx: f64) -> Result<()> {
        let width = tree.duration_px(id)?;
        let target_width = (width + dx).max(MIN_CONTEXT_WIDTH_PX);

        let own_scale = *tree.context(id)?.x_scale();
        tree.set_duration(id, own_scale.invert_extent(target_width))?;
        Ok(())
    }

    fn move_context(&self, tree: &mut TimeContextTree, id: ContextId, dx: f64) -> Result<()> {
        let x = tree.start_px(id)?;
        let parent_scale = *tree.parent_scale(id)?;
        let target_x = (x + dx).max(parent_scale.apply(0.0));

        tree.set_start(id, parent_scale.invert(target_x))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // root shows 10 s on 1000 px, child starts at 2 s and lasts 4 s
    fn setup() -> (TimeContextTree, ContextId) {
        let mut tree = TimeContextTree::new(100.0, 1000.0).unwrap();
        let child = tree.attach(tree.root()).unwrap();
        tree.set_start(child, 2.0).unwrap();
        tree.set_duration(child, 4.0).unwrap();
        (tree, child)
    }

    #[test]
    fn test_body_moves_start_only() {
        let (mut tree, child) = setup();
        TimeContextBehavior.edit(&mut tree, child, 50.0, Handle::Body).unwrap();
        assert_relative_eq!(tree.context(child).unwrap().start(), 2.5);
        assert_relative_eq!(tree.context(child).unwrap().duration(), 4.0);

        TimeContextBehavior.edit(&mut tree, child, -5000.0, Handle::Body).unwrap();
        assert_eq!(tree.context(child).unwrap().start(), 0.0);
    }

    #[test]
    fn test_left_handle_keeps_right_edge_and_content() {
        let (mut tree, child) = setup();
        let content_before = tree.time_to_pixel(child, 1.0).unwrap();

        TimeContextBehavior.edit(&mut tree, child, 100.0, Handle::Left).unwrap();
        let context = tree.context(child).unwrap();
        assert_relative_eq!(context.start(), 3.0);
        assert_relative_eq!(context.duration(), 3.0);
        assert_relative_eq!(context.offset(), -1.0);
        assert_relative_eq!(context.start() + context.duration(), 6.0);
        assert_relative_eq!(tree.time_to_pixel(child, 1.0).unwrap(), content_before);

        // past the right edge: one pixel remains
        TimeContextBehavior.edit(&mut tree, child, 1000.0, Handle::Left).unwrap();
        assert_relative_eq!(tree.duration_px(child).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_right_handle_floors_width() {
        let (mut tree, child) = setup();
        TimeContextBehavior.edit(&mut tree, child, -1000.0, Handle::Right).unwrap();
        assert_relative_eq!(tree.duration_px(child).unwrap(), 1.0);
        assert_relative_eq!(tree.context(child).unwrap().start(), 2.0);
    }

    #[test]
    fn test_stretch_turns_width_change_into_zoom() {
        let (mut tree, child) = setup();
        tree.set_offset(child, -0.5).unwrap();

        // 400 px -> 600 px
        TimeContextBehavior.stretch(&mut tree, child, 200.0, Handle::Right).unwrap();
        let context = tree.context(child).unwrap();
        assert_relative_eq!(context.stretch_ratio(), 1.5);
        assert_relative_eq!(context.duration(), 4.0);
        assert_relative_eq!(context.offset(), -0.5);
        assert_relative_eq!(tree.duration_px(child).unwrap(), 600.0);
    }
}
