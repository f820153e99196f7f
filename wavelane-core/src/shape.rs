//! Shape and scene collaborator traits
//!
//! Layers never draw anything themselves. They hand scale-derived pixel
//! values to [`Shape`] implementations supplied by the host, and identify
//! what the pointer is over through opaque [`NodeId`]s that the host's scene
//! graph resolves.

use crate::scale::Scale;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Opaque handle to a node of the host scene graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Part of a shape hit by the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    /// Left resize handle
    Left,
    /// Right resize handle
    Right,
    /// Anywhere else on the shape
    Body,
}

/// Everything a shape needs to turn a datum into pixels
///
/// Rebuilt by the layer before every shape pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderingContext {
    /// Time to layer-local pixels, from the layer's time context
    pub x_scale: Scale,
    /// Layer y-domain to layer pixels (y axis points up)
    pub y_scale: Scale,
    /// Width of the layer's time context in pixels
    pub width: f64,
    /// Layer height in pixels
    pub height: f64,
    /// Context offset in pixels
    pub offset_x: f64,
    /// Context start in pixels, through the parent scale
    pub start_x: f64,
}

/// Visual primitive rendering one datum
///
/// Accessors read and write the datum in domain units (seconds for `x` and
/// `width`, y-domain units for `y` and `height`). The defaults describe a
/// shape without that attribute: reads return 0 and writes do nothing.
pub trait Shape<T> {
    /// Class attached to the rendered node
    fn class_name(&self) -> &str {
        "shape"
    }

    /// Create the scene node for this shape
    fn render(&mut self, ctx: &RenderingContext) -> NodeId;

    /// Bring the node in line with `datum`
    fn update(&mut self, ctx: &RenderingContext, node: NodeId, datum: &T, index: usize);

    /// Release the scene node and anything else the shape holds
    fn destroy(&mut self);

    /// Whether the shape intersects `area`, given in layer-local pixels
    /// (origin at the context offset, y axis pointing up)
    fn in_area(&self, _ctx: &RenderingContext, _datum: &T, _area: Rect) -> bool {
        false
    }

    /// Map a hit node to the part of the shape it belongs to
    fn handle(&self, _target: NodeId) -> Handle {
        Handle::Body
    }

    fn x(&self, _datum: &T) -> f64 {
        0.0
    }

    fn set_x(&self, _datum: &mut T, _value: f64) {}

    fn y(&self, _datum: &T) -> f64 {
        0.0
    }

    fn set_y(&self, _datum: &mut T, _value: f64) {}

    fn width(&self, _datum: &T) -> f64 {
        0.0
    }

    fn set_width(&self, _datum: &mut T, _value: f64) {}

    fn height(&self, _datum: &T) -> f64 {
        0.0
    }

    fn set_height(&self, _datum: &mut T, _value: f64) {}
}

/// Single visual item drawn from a layer's whole dataset (a line through
/// every point, for instance)
pub trait CommonShape<T> {
    fn class_name(&self) -> &str {
        "common"
    }

    fn render(&mut self, ctx: &RenderingContext) -> NodeId;

    fn update(&mut self, ctx: &RenderingContext, node: NodeId, data: &[T]);

    fn destroy(&mut self);
}

/// Builds a fresh shape for every entering datum
pub type ShapeFactory<T> = Box<dyn Fn() -> Box<dyn Shape<T>>>;

/// Builds the common shape of a layer
pub type CommonShapeFactory<T> = Box<dyn Fn() -> Box<dyn CommonShape<T>>>;

/// Read access to the host scene graph
pub trait SceneGraph {
    /// Parent of `node`, `None` at the top of the scene
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// `node` followed by each of its ancestors
    fn ancestors(&self, node: NodeId) -> Ancestors<'_, Self>
    where
        Self: Sized,
    {
        Ancestors {
            scene: self,
            next: Some(node),
        }
    }
}

/// Iterator over a node and its ancestors
pub struct Ancestors<'a, S: ?Sized> {
    scene: &'a S,
    next: Option<NodeId>,
}

impl<S: SceneGraph + ?Sized> Iterator for Ancestors<'_, S> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.scene.parent(current);
        Some(current)
    }
}

/// Walk from `node` up to the root of a type-erased scene
pub fn walk_ancestors(scene: &dyn SceneGraph, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    Ancestors {
        scene,
        next: Some(node),
    }
}
