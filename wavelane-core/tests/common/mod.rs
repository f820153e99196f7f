//! Shared fixtures: a segment datum, a counting segment shape and a scene
//! graph backed by a parent map

#![allow(dead_code)]

use kurbo::Rect;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wavelane_core::shape::ShapeFactory;
use wavelane_core::{Datum, Handle, NodeId, RenderingContext, SceneGraph, Shape};

/// Route `log` output to the test harness when RUST_LOG is set
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: u32,
    pub start: f64,
    pub duration: f64,
    pub y: f64,
    pub height: f64,
}

impl Segment {
    pub fn new(id: u32, start: f64, duration: f64) -> Self {
        Self {
            id,
            start,
            duration,
            y: 0.0,
            height: 0.5,
        }
    }
}

impl Datum for Segment {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }
}

/// Host scene: node ids handed out in order, with a parent for child nodes
#[derive(Clone, Default)]
pub struct TestScene {
    parents: Rc<RefCell<HashMap<NodeId, NodeId>>>,
    next: Rc<Cell<u64>>,
}

impl TestScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next.get() + 1);
        self.next.set(id.0);
        if let Some(parent) = parent {
            self.parents.borrow_mut().insert(id, parent);
        }
        id
    }
}

impl SceneGraph for TestScene {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.borrow().get(&node).copied()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Counts {
    pub rendered: usize,
    pub updated: usize,
    pub destroyed: usize,
}

/// Nodes created for one segment: a body with two child resize handles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentNodes {
    pub body: NodeId,
    pub left: NodeId,
    pub right: NodeId,
}

pub struct SegmentShape {
    scene: TestScene,
    counts: Rc<RefCell<Counts>>,
    created: Rc<RefCell<Vec<SegmentNodes>>>,
    nodes: Option<SegmentNodes>,
}

impl Shape<Segment> for SegmentShape {
    fn class_name(&self) -> &str {
        "segment"
    }

    fn render(&mut self, _ctx: &RenderingContext) -> NodeId {
        let body = self.scene.node(None);
        let nodes = SegmentNodes {
            body,
            left: self.scene.node(Some(body)),
            right: self.scene.node(Some(body)),
        };
        self.nodes = Some(nodes);
        self.created.borrow_mut().push(nodes);
        self.counts.borrow_mut().rendered += 1;
        body
    }

    fn update(&mut self, _ctx: &RenderingContext, _node: NodeId, _datum: &Segment, _index: usize) {
        self.counts.borrow_mut().updated += 1;
    }

    fn destroy(&mut self) {
        self.counts.borrow_mut().destroyed += 1;
    }

    fn in_area(&self, ctx: &RenderingContext, datum: &Segment, area: Rect) -> bool {
        let x1 = ctx.x_scale.apply(datum.start);
        let x2 = ctx.x_scale.apply(datum.start + datum.duration);
        let y1 = ctx.y_scale.apply(datum.y);
        let y2 = ctx.y_scale.apply(datum.y + datum.height);
        x1 < area.x1 && x2 > area.x0 && y1 < area.y1 && y2 > area.y0
    }

    fn handle(&self, target: NodeId) -> Handle {
        match self.nodes {
            Some(nodes) if target == nodes.left => Handle::Left,
            Some(nodes) if target == nodes.right => Handle::Right,
            _ => Handle::Body,
        }
    }

    fn x(&self, datum: &Segment) -> f64 {
        datum.start
    }

    fn set_x(&self, datum: &mut Segment, value: f64) {
        datum.start = value;
    }

    fn y(&self, datum: &Segment) -> f64 {
        datum.y
    }

    fn set_y(&self, datum: &mut Segment, value: f64) {
        datum.y = value;
    }

    fn width(&self, datum: &Segment) -> f64 {
        datum.duration
    }

    fn set_width(&self, datum: &mut Segment, value: f64) {
        datum.duration = value;
    }

    fn height(&self, datum: &Segment) -> f64 {
        datum.height
    }

    fn set_height(&self, datum: &mut Segment, value: f64) {
        datum.height = value;
    }
}

/// Factory for [`SegmentShape`]s sharing one scene and one set of counters
#[derive(Clone, Default)]
pub struct SegmentShapes {
    pub scene: TestScene,
    pub counts: Rc<RefCell<Counts>>,
    pub created: Rc<RefCell<Vec<SegmentNodes>>>,
}

impl SegmentShapes {
    pub fn new(scene: &TestScene) -> Self {
        Self {
            scene: scene.clone(),
            ..Self::default()
        }
    }

    pub fn factory(&self) -> ShapeFactory<Segment> {
        let shapes = self.clone();
        Box::new(move || {
            Box::new(SegmentShape {
                scene: shapes.scene.clone(),
                counts: shapes.counts.clone(),
                created: shapes.created.clone(),
                nodes: None,
            }) as Box<dyn Shape<Segment>>
        })
    }

    pub fn counts(&self) -> Counts {
        *self.counts.borrow()
    }

    /// Nodes of the `index`-th rendered shape
    pub fn nodes(&self, index: usize) -> SegmentNodes {
        self.created.borrow()[index]
    }
}
