//! Datum edit behaviors
//!
//! A behavior turns a pointer delta (in pixels) into new datum values. The
//! delta is applied in pixel space through the layer's scales, then written
//! back in domain units through the shape's accessors.

use crate::selection::SelectableSet;
use crate::shape::{Handle, RenderingContext, Shape};
use log::trace;
use serde::{Deserialize, Serialize};

/// Narrowest width, in pixels, a span can be resized to
pub const MIN_SPAN_WIDTH_PX: f64 = 1.0;

/// How dragging edits a datum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditBehavior {
    /// Single position (markers, dots): horizontal moves only
    Point,
    /// Time span with two resize handles (segments)
    Span,
}

impl EditBehavior {
    /// Apply a drag of `(dx, dy)` pixels on `handle` to `datum`
    pub fn edit<T>(
        &self,
        ctx: &RenderingContext,
        shape: &dyn Shape<T>,
        datum: &mut T,
        dx: f64,
        dy: f64,
        handle: Handle,
    ) {
        match (self, handle) {
            (EditBehavior::Point, _) => move_point(ctx, shape, datum, dx),
            (EditBehavior::Span, Handle::Left) => resize_left(ctx, shape, datum, dx),
            (EditBehavior::Span, Handle::Right) => resize_right(ctx, shape, datum, dx),
            (EditBehavior::Span, Handle::Body) => move_span(ctx, shape, datum, dx, dy),
        }
    }
}

fn move_point<T>(ctx: &RenderingContext, shape: &dyn Shape<T>, datum: &mut T, dx: f64) {
    let x = ctx.x_scale.apply(shape.x(datum));
    let target_x = (x + dx).max(ctx.x_scale.apply(0.0));

    shape.set_x(datum, ctx.x_scale.invert(target_x));
}

fn move_span<T>(ctx: &RenderingContext, shape: &dyn Shape<T>, datum: &mut T, dx: f64, dy: f64) {
    let x = ctx.x_scale.apply(shape.x(datum));
    let y = ctx.y_scale.apply(shape.y(datum));
    let height = ctx.y_scale.apply_extent(shape.height(datum));

    let target_x = (x + dx).max(ctx.x_scale.apply(0.0));
    let mut target_y = y - dy;

    // keep the span inside the layer's y axis
    if target_y < 0.0 {
        target_y = 0.0;
    } else if target_y + height > ctx.height {
        target_y = ctx.height - height;
    }

    shape.set_x(datum, ctx.x_scale.invert(target_x));
    shape.set_y(datum, ctx.y_scale.invert(target_y));
}

/// Moves the left edge with the right edge fixed
///
/// The new left edge is first kept at least one pixel left of the right
/// edge, then clamped to time 0. The width floor is applied last, so the
/// right edge only moves when a span narrower than a pixel touches time 0.
fn resize_left<T>(ctx: &RenderingContext, shape: &dyn Shape<T>, datum: &mut T, dx: f64) {
    let x = ctx.x_scale.apply(shape.x(datum));
    let width = ctx.x_scale.apply_extent(shape.width(datum));
    let right = x + width;

    let target_x = (x + dx)
        .min(right - MIN_SPAN_WIDTH_PX)
        .max(ctx.x_scale.apply(0.0));
    let target_width = (right - target_x).max(MIN_SPAN_WIDTH_PX);

    shape.set_x(datum, ctx.x_scale.invert(target_x));
    shape.set_width(datum, ctx.x_scale.invert_extent(target_width));
}

fn resize_right<T>(ctx: &RenderingContext, shape: &dyn Shape<T>, datum: &mut T, dx: f64) {
    let width = ctx.x_scale.apply_extent(shape.width(datum));
    let target_width = (width + dx).max(MIN_SPAN_WIDTH_PX);
    if target_width != width + dx {
        trace!("Span width floored at {} px", MIN_SPAN_WIDTH_PX);
    }

    shape.set_width(datum, ctx.x_scale.invert_extent(target_width));
}

/// Interaction capabilities of a layer
///
/// A layer without a behavior can neither be selected nor edited.
#[derive(Clone, Debug, Default)]
pub struct Behavior {
    edit: Option<EditBehavior>,
    selection: SelectableSet,
}

impl Behavior {
    /// Selectable, not editable
    pub fn selectable() -> Self {
        Self::default()
    }

    pub fn point() -> Self {
        Self::with_edit(EditBehavior::Point)
    }

    pub fn span() -> Self {
        Self::with_edit(EditBehavior::Span)
    }

    pub fn with_edit(edit: EditBehavior) -> Self {
        Self {
            edit: Some(edit),
            selection: SelectableSet::default(),
        }
    }

    /// Use another class for selected items
    pub fn with_selected_class(mut self, class: impl Into<String>) -> Self {
        self.selection = SelectableSet::new(class);
        self
    }

    pub fn edit_behavior(&self) -> Option<EditBehavior> {
        self.edit
    }

    pub fn selection(&self) -> &SelectableSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectableSet {
        &mut self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::Scale;
    use crate::shape::NodeId;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Span {
        start: f64,
        duration: f64,
        y: f64,
        height: f64,
    }

    struct SpanShape;

    impl Shape<Span> for SpanShape {
        fn render(&mut self, _ctx: &RenderingContext) -> NodeId {
            NodeId(0)
        }
        fn update(&mut self, _ctx: &RenderingContext, _node: NodeId, _datum: &Span, _index: usize) {}
        fn destroy(&mut self) {}
        fn x(&self, d: &Span) -> f64 {
            d.start
        }
        fn set_x(&self, d: &mut Span, v: f64) {
            d.start = v;
        }
        fn y(&self, d: &Span) -> f64 {
            d.y
        }
        fn set_y(&self, d: &mut Span, v: f64) {
            d.y = v;
        }
        fn width(&self, d: &Span) -> f64 {
            d.duration
        }
        fn set_width(&self, d: &mut Span, v: f64) {
            d.duration = v;
        }
        fn height(&self, d: &Span) -> f64 {
            d.height
        }
        fn set_height(&self, d: &mut Span, v: f64) {
            d.height = v;
        }
    }

    // 100 px per second, 0..1 mapped on 100 px of height
    fn ctx() -> RenderingContext {
        RenderingContext {
            x_scale: Scale::linear([0.0, 10.0], [0.0, 1000.0]).unwrap(),
            y_scale: Scale::linear([0.0, 1.0], [0.0, 100.0]).unwrap(),
            width: 1000.0,
            height: 100.0,
            offset_x: 0.0,
            start_x: 0.0,
        }
    }

    fn span(start: f64, duration: f64) -> Span {
        Span {
            start,
            duration,
            y: 0.2,
            height: 0.5,
        }
    }

    #[test]
    fn test_point_never_goes_negative() {
        let mut datum = span(0.5, 0.0);
        EditBehavior::Point.edit(&ctx(), &SpanShape, &mut datum, 30.0, 50.0, Handle::Body);
        assert_relative_eq!(datum.start, 0.8);
        assert_relative_eq!(datum.y, 0.2);

        EditBehavior::Point.edit(&ctx(), &SpanShape, &mut datum, -500.0, 0.0, Handle::Body);
        assert_eq!(datum.start, 0.0);
    }

    #[test]
    fn test_span_body_move_clamps_vertically() {
        let mut datum = span(1.0, 1.0);
        EditBehavior::Span.edit(&ctx(), &SpanShape, &mut datum, 50.0, -10.0, Handle::Body);
        assert_relative_eq!(datum.start, 1.5);
        assert_relative_eq!(datum.y, 0.3);

        // 50 px tall span inside a 100 px layer tops out at y = 50 px
        EditBehavior::Span.edit(&ctx(), &SpanShape, &mut datum, 0.0, -400.0, Handle::Body);
        assert_relative_eq!(datum.y, 0.5);

        EditBehavior::Span.edit(&ctx(), &SpanShape, &mut datum, -1000.0, 400.0, Handle::Body);
        assert_eq!(datum.start, 0.0);
        assert_eq!(datum.y, 0.0);
        assert_relative_eq!(datum.duration, 1.0);
    }

    #[test]
    fn test_span_resize_right_floors_width() {
        // 10 px wide
        let mut datum = span(2.0, 0.1);
        EditBehavior::Span.edit(&ctx(), &SpanShape, &mut datum, -1000.0, 0.0, Handle::Right);
        assert_relative_eq!(datum.duration, 0.01);
        assert_relative_eq!(datum.start, 2.0);

        EditBehavior::Span.edit(&ctx(), &SpanShape, &mut datum, 99.0, 0.0, Handle::Right);
        assert_relative_eq!(datum.duration, 1.0);
    }

    #[test]
    fn test_span_resize_left_keeps_right_edge() {
        let mut datum = span(2.0, 1.0);
        EditBehavior::Span.edit(&ctx(), &SpanShape, &mut datum, -50.0, 0.0, Handle::Left);
        assert_relative_eq!(datum.start, 1.5);
        assert_relative_eq!(datum.duration, 1.5);

        // past the right edge: stops one pixel short of it
        EditBehavior::Span.edit(&ctx(), &SpanShape, &mut datum, 1000.0, 0.0, Handle::Left);
        assert_relative_eq!(datum.start + datum.duration, 3.0, epsilon = 1e-9);
        assert_relative_eq!(datum.duration, 0.01, epsilon = 1e-9);

        // past time 0: start clamps, right edge still fixed
        let mut datum = span(0.5, 1.0);
        EditBehavior::Span.edit(&ctx(), &SpanShape, &mut datum, -200.0, 0.0, Handle::Left);
        assert_eq!(datum.start, 0.0);
        assert_relative_eq!(datum.duration, 1.5);
    }

    #[test]
    fn test_behavior_constructors() {
        assert_eq!(Behavior::span().edit_behavior(), Some(EditBehavior::Span));
        assert_eq!(Behavior::selectable().edit_behavior(), None);
        let behavior = Behavior::point().with_selected_class("on");
        assert_eq!(behavior.selection().selected_class(), "on");
    }
}
