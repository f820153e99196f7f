//! Layer system
//!
//! A layer renders one dataset (a single entity or an ordered collection of
//! records) under one time context. Each record gets its own visual item and
//! shape; a layer can also carry one common item drawn from the whole
//! dataset.
//!
//! Layers are generic over their datum type. Tracks hold them type-erased as
//! `Box<dyn AnyLayer>`; hosts get the typed layer back through
//! [`AnyLayer::as_any_mut`].
//!
//! Coordinate conventions: the layer container sits at the context's start
//! in the parent scale, clips to the context's duration, and translates its
//! items by the context offset. Inside the container the y axis points up.

use crate::behavior::Behavior;
use crate::context_behavior::TimeContextBehavior;
use crate::error::{Result, TimelineError};
use crate::reconciler::{reconcile, IdentityArena, IdentityMap, ItemKey, Reconciliation};
use crate::scale::Scale;
use crate::shape::{
    walk_ancestors, CommonShape, CommonShapeFactory, Handle, NodeId, RenderingContext, SceneGraph,
    Shape, ShapeFactory,
};
use crate::time_context::{ContextId, TimeContextTree};
use kurbo::Rect;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use uuid::Uuid;

/// A record that can be rendered by a layer
///
/// The key identifies the record across renders: two records with the same
/// key are the same item, whatever their position in the dataset.
pub trait Datum: 'static {
    type Key: Clone + Eq + Hash + Debug + 'static;

    fn key(&self) -> Self::Key;
}

/// Shape of a layer's dataset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Exactly one datum
    Entity,
    /// Ordered records
    Collection,
}

/// Dataset of a layer
#[derive(Clone, Debug, PartialEq)]
pub enum LayerData<T> {
    Entity(T),
    Collection(Vec<T>),
}

impl<T> LayerData<T> {
    pub fn data_type(&self) -> DataType {
        match self {
            LayerData::Entity(_) => DataType::Entity,
            LayerData::Collection(_) => DataType::Collection,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            LayerData::Entity(datum) => std::slice::from_ref(datum),
            LayerData::Collection(records) => records,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            LayerData::Entity(datum) => std::slice::from_mut(datum),
            LayerData::Collection(records) => records,
        }
    }
}

impl<T: Datum> LayerData<T> {
    fn slot_key(&self, datum: &T) -> SlotKey<T::Key> {
        match self {
            LayerData::Entity(_) => SlotKey::Entity,
            LayerData::Collection(_) => SlotKey::Record(datum.key()),
        }
    }
}

/// Identity slot of a record
///
/// An entity always occupies the same slot, so reassigning it keeps its
/// visual item.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum SlotKey<K> {
    Entity,
    Record(K),
}

/// Display parameters of a layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerParams {
    /// Height in pixels
    pub height: f64,
    /// Distance from the top of the track in pixels
    pub top: f64,
    /// Data range mapped onto the layer height
    pub y_domain: [f64; 2],
    pub opacity: f64,
    /// Width in pixels of the context edition handles
    pub context_handler_width: f64,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            height: 100.0,
            top: 0.0,
            y_domain: [0.0, 1.0],
            opacity: 1.0,
            context_handler_width: 2.0,
        }
    }
}

impl LayerParams {
    /// Scale from `y_domain` onto `[0, height]`
    pub fn y_scale(&self) -> Result<Scale> {
        Scale::linear(self.y_domain, [0.0, self.height])
    }
}

/// Placement of the layer container, as computed by `update_container`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerGeometry {
    /// Context start in the parent scale
    pub x: f64,
    pub top: f64,
    /// Clip width: context duration in pixels
    pub width: f64,
    pub height: f64,
    /// Translation applied to the items: context offset in pixels
    pub offset_x: f64,
    pub opacity: f64,
}

/// Rendered counterpart of one datum
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualItem {
    pub key: ItemKey,
    /// Scene node returned by the shape
    pub node: NodeId,
    classes: Vec<String>,
    /// Draw order inside the layer, higher is in front
    pub z_index: u64,
}

impl VisualItem {
    pub fn new(key: ItemKey, node: NodeId, class_name: &str) -> Self {
        Self {
            key,
            node,
            classes: vec!["item".to_string(), class_name.to_string()],
            z_index: 0,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }
}

/// Scene nodes of the context box, used to tell which handle was grabbed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextHandles {
    pub body: NodeId,
    pub left: NodeId,
    pub right: NodeId,
}

struct CommonItem<T> {
    node: NodeId,
    shape: Box<dyn CommonShape<T>>,
}

/// Layer rendering a dataset of `T`
pub struct Layer<T: Datum> {
    id: Uuid,
    name: String,
    group: Option<String>,
    data: LayerData<T>,
    params: LayerParams,
    time_context: Option<ContextId>,

    shape_factory: ShapeFactory<T>,
    common_factory: Option<CommonShapeFactory<T>>,

    identities: IdentityMap<SlotKey<T::Key>>,
    items: HashMap<ItemKey, VisualItem>,
    shapes: HashMap<ItemKey, Box<dyn Shape<T>>>,
    nodes: HashMap<NodeId, ItemKey>,
    common: Option<CommonItem<T>>,

    behavior: Option<Behavior>,
    context_behavior: TimeContextBehavior,
    context_editable: bool,
    context_handles: Option<ContextHandles>,

    element: Option<NodeId>,
    geometry: LayerGeometry,
    next_z: u64,
}

impl<T: Datum> Layer<T> {
    /// Create a layer rendering `data` with shapes built by `shape_factory`
    pub fn new(name: impl Into<String>, data: LayerData<T>, shape_factory: ShapeFactory<T>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            group: None,
            data,
            params: LayerParams::default(),
            time_context: None,
            shape_factory,
            common_factory: None,
            identities: IdentityMap::new(),
            items: HashMap::new(),
            shapes: HashMap::new(),
            nodes: HashMap::new(),
            common: None,
            behavior: None,
            context_behavior: TimeContextBehavior,
            context_editable: false,
            context_handles: None,
            element: None,
            geometry: LayerGeometry::default(),
            next_z: 0,
        }
    }

    /// Layer holding exactly one datum
    pub fn entity(name: impl Into<String>, datum: T, shape_factory: ShapeFactory<T>) -> Self {
        Self::new(name, LayerData::Entity(datum), shape_factory)
    }

    /// Layer holding an ordered collection
    pub fn collection(name: impl Into<String>, records: Vec<T>, shape_factory: ShapeFactory<T>) -> Self {
        Self::new(name, LayerData::Collection(records), shape_factory)
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Render one extra item from the whole dataset
    pub fn with_common_shape(mut self, factory: CommonShapeFactory<T>) -> Self {
        self.common_factory = Some(factory);
        self
    }

    pub fn with_time_context(mut self, context: ContextId) -> Self {
        self.time_context = Some(context);
        self
    }

    /// Replace the display parameters, rejecting ones that give no y scale
    pub fn with_params(mut self, params: LayerParams) -> Result<Self> {
        self.set_params(params)?;
        Ok(self)
    }

    pub fn set_params(&mut self, params: LayerParams) -> Result<()> {
        params.y_scale()?;
        self.params = params;
        Ok(())
    }

    pub fn behavior(&self) -> Option<&Behavior> {
        self.behavior.as_ref()
    }

    pub fn set_behavior(&mut self, behavior: Behavior) {
        self.behavior = Some(behavior);
    }

    /// Scene node of the layer container
    pub fn set_element(&mut self, node: NodeId) {
        self.element = Some(node);
    }

    pub fn set_context_handles(&mut self, handles: ContextHandles) {
        self.context_handles = Some(handles);
    }

    pub fn data(&self) -> &LayerData<T> {
        &self.data
    }

    pub fn records(&self) -> &[T] {
        self.data.as_slice()
    }

    /// Mutable access to the records in place; call `update` afterwards
    pub fn records_mut(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    /// Replace the dataset; call `render` and `update` afterwards
    pub fn set_data(&mut self, data: LayerData<T>) {
        self.data = data;
    }

    /// Replace the datum of an entity layer, keeping its visual item
    pub fn set_entity(&mut self, datum: T) {
        self.data = LayerData::Entity(datum);
    }

    fn index_of(&self, key: ItemKey) -> Option<usize> {
        self.data
            .as_slice()
            .iter()
            .position(|datum| self.identities.get(&self.data.slot_key(datum)) == Some(key))
    }

    /// Datum rendered by an item
    pub fn datum(&self, key: ItemKey) -> Option<&T> {
        let index = self.index_of(key)?;
        self.data.as_slice().get(index)
    }

    pub fn datum_mut(&mut self, key: ItemKey) -> Option<&mut T> {
        let index = self.index_of(key)?;
        self.data.as_mut_slice().get_mut(index)
    }

    /// Item rendering the datum with `datum_key`
    pub fn item_for_key(&self, datum_key: &T::Key) -> Option<ItemKey> {
        match self.data {
            LayerData::Entity(_) => self.identities.get(&SlotKey::Entity),
            LayerData::Collection(_) => self.identities.get(&SlotKey::Record(datum_key.clone())),
        }
    }

    /// Current scales and extents handed to shapes and behaviors
    pub fn rendering_context(&self, tree: &TimeContextTree) -> Result<RenderingContext> {
        let id = self.time_context.ok_or(TimelineError::MissingTimeContext(self.id))?;
        let context = tree.context(id)?;

        Ok(RenderingContext {
            x_scale: *context.x_scale(),
            y_scale: self.params.y_scale()?,
            width: tree.duration_px(id)?,
            height: self.params.height,
            offset_x: tree.offset_px(id)?,
            start_x: tree.start_px(id)?,
        })
    }

    fn context_id(&self) -> Result<ContextId> {
        self.time_context.ok_or(TimelineError::MissingTimeContext(self.id))
    }

    fn raise(&mut self, key: ItemKey) {
        if let Some(item) = self.items.get_mut(&key) {
            self.next_z += 1;
            item.z_index = self.next_z;
        }
    }

    fn context_handle(&self, target: Option<NodeId>) -> Handle {
        match (self.context_handles, target) {
            (Some(handles), Some(node)) if node == handles.left => Handle::Left,
            (Some(handles), Some(node)) if node == handles.right => Handle::Right,
            _ => Handle::Body,
        }
    }
}

/// Type-erased layer interface used by tracks and interaction states
pub trait AnyLayer {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    /// Group name used by [`LayerSelector::Group`](crate::track_collection::LayerSelector)
    fn group(&self) -> Option<&str>;
    fn data_type(&self) -> DataType;
    fn params(&self) -> &LayerParams;

    fn time_context(&self) -> Option<ContextId>;
    fn set_time_context(&mut self, context: ContextId);

    /// Reconcile the dataset against the rendered items
    ///
    /// Entering records get a new shape, exiting items have their shape
    /// destroyed. The common item is created on the first render only.
    fn render(&mut self, tree: &TimeContextTree, arena: &mut IdentityArena) -> Result<Reconciliation>;

    /// `update_container` followed by `update_shapes` on every item
    fn update(&mut self, tree: &TimeContextTree) -> Result<()> {
        self.update_container(tree)?;
        self.update_shapes(tree, None)
    }

    /// Recompute the container geometry from the time context
    fn update_container(&mut self, tree: &TimeContextTree) -> Result<()>;

    /// Push current data into the shapes, optionally restricted to `only`
    fn update_shapes(&mut self, tree: &TimeContextTree, only: Option<&[ItemKey]>) -> Result<()>;

    fn select(&mut self, keys: &[ItemKey]);
    fn unselect(&mut self, keys: &[ItemKey]);
    fn toggle_selection(&mut self, keys: &[ItemKey]);
    fn select_all(&mut self);
    fn unselect_all(&mut self);
    fn selected_items(&self) -> Vec<ItemKey>;
    fn is_selected(&self, key: ItemKey) -> bool;

    /// Apply a pointer drag to the data behind `keys`
    ///
    /// `target` is the node under the pointer; the shape maps it to a
    /// handle. Layers without an edit behavior ignore the call.
    fn edit(&mut self, tree: &TimeContextTree, keys: &[ItemKey], dx: f64, dy: f64, target: Option<NodeId>) -> Result<()>;

    /// Trim or move this layer's time context
    fn edit_context(&mut self, tree: &mut TimeContextTree, dx: f64, dy: f64, target: Option<NodeId>) -> Result<()>;

    /// Stretch this layer's time context
    fn stretch_context(&mut self, tree: &mut TimeContextTree, dx: f64, dy: f64, target: Option<NodeId>) -> Result<()>;

    fn is_context_editable(&self) -> bool;
    fn set_context_editable(&mut self, editable: bool);

    fn element(&self) -> Option<NodeId>;

    /// Whether `node` is, or lies below, the layer container, one of its
    /// items or one of its context handles
    fn has_element(&self, scene: &dyn SceneGraph, node: NodeId) -> bool;

    /// Item owning `node`, searching up through its ancestors
    fn item_from_element(&self, scene: &dyn SceneGraph, node: NodeId) -> Option<ItemKey>;

    fn has_item(&self, key: ItemKey) -> bool;
    fn item(&self, key: ItemKey) -> Option<&VisualItem>;

    /// Keys of every rendered item, in dataset order
    fn item_keys(&self) -> Vec<ItemKey>;

    /// Items intersecting `area`, given in track pixels (y axis down)
    fn items_in_area(&self, tree: &TimeContextTree, area: Rect) -> Result<Vec<ItemKey>>;

    fn geometry(&self) -> &LayerGeometry;

    /// Destroy every shape and forget all identities
    fn destroy(&mut self);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Datum> AnyLayer for Layer<T> {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    fn params(&self) -> &LayerParams {
        &self.params
    }

    fn time_context(&self) -> Option<ContextId> {
        self.time_context
    }

    fn set_time_context(&mut self, context: ContextId) {
        self.time_context = Some(context);
    }

    fn render(&mut self, tree: &TimeContextTree, arena: &mut IdentityArena) -> Result<Reconciliation> {
        let ctx = self.rendering_context(tree)?;

        if self.common.is_none() {
            if let Some(factory) = &self.common_factory {
                let mut shape = factory();
                let node = shape.render(&ctx);
                self.common = Some(CommonItem { node, shape });
            }
        }

        let keys: Vec<_> = self
            .data
            .as_slice()
            .iter()
            .map(|datum| self.data.slot_key(datum))
            .collect();
        let result = reconcile(&mut self.identities, keys, arena);

        for &(_, key) in &result.enter {
            let mut shape = (self.shape_factory)();
            let node = shape.render(&ctx);
            self.items.insert(key, VisualItem::new(key, node, shape.class_name()));
            self.shapes.insert(key, shape);
            self.nodes.insert(node, key);
        }

        for key in &result.exit {
            if let Some(mut shape) = self.shapes.remove(key) {
                shape.destroy();
            }
            if let Some(item) = self.items.remove(key) {
                self.nodes.remove(&item.node);
            }
            if let Some(behavior) = &mut self.behavior {
                behavior.selection_mut().forget(key);
            }
        }

        debug!(
            "Rendered layer '{}': {} entered, {} updated, {} exited",
            self.name,
            result.enter.len(),
            result.update.len(),
            result.exit.len()
        );
        Ok(result)
    }

    fn update_container(&mut self, tree: &TimeContextTree) -> Result<()> {
        let id = self.context_id()?;

        self.geometry = LayerGeometry {
            x: tree.start_px(id)?,
            top: self.params.top,
            width: tree.duration_px(id)?,
            height: self.params.height,
            offset_x: tree.offset_px(id)?,
            opacity: self.params.opacity,
        };
        Ok(())
    }

    fn update_shapes(&mut self, tree: &TimeContextTree, only: Option<&[ItemKey]>) -> Result<()> {
        let ctx = self.rendering_context(tree)?;
        let records = self.data.as_slice();

        if let Some(common) = &mut self.common {
            common.shape.update(&ctx, common.node, records);
        }

        let mut seen = HashSet::new();
        for (index, datum) in records.iter().enumerate() {
            let Some(key) = self.identities.get(&self.data.slot_key(datum)) else {
                continue;
            };
            if !seen.insert(key) {
                continue;
            }
            if only.is_some_and(|keys| !keys.contains(&key)) {
                continue;
            }
            let (Some(shape), Some(item)) = (self.shapes.get_mut(&key), self.items.get(&key)) else {
                continue;
            };
            shape.update(&ctx, item.node, datum, index);
        }
        Ok(())
    }

    fn select(&mut self, keys: &[ItemKey]) {
        let Some(behavior) = &mut self.behavior else {
            return;
        };
        let mut raised = Vec::new();
        for key in keys {
            if let Some(item) = self.items.get_mut(key) {
                behavior.selection_mut().select(item);
                raised.push(*key);
            }
        }
        for key in raised {
            self.raise(key);
        }
    }

    fn unselect(&mut self, keys: &[ItemKey]) {
        let Some(behavior) = &mut self.behavior else {
            return;
        };
        for key in keys {
            if let Some(item) = self.items.get_mut(key) {
                behavior.selection_mut().unselect(item);
            }
        }
    }

    fn toggle_selection(&mut self, keys: &[ItemKey]) {
        let Some(behavior) = &mut self.behavior else {
            return;
        };
        let mut raised = Vec::new();
        for key in keys {
            if let Some(item) = self.items.get_mut(key) {
                if behavior.selection_mut().toggle(item) {
                    raised.push(*key);
                }
            }
        }
        for key in raised {
            self.raise(key);
        }
    }

    fn select_all(&mut self) {
        let keys = self.item_keys();
        self.select(&keys);
    }

    fn unselect_all(&mut self) {
        if let Some(behavior) = &mut self.behavior {
            behavior.selection_mut().clear(&mut self.items);
        }
    }

    fn selected_items(&self) -> Vec<ItemKey> {
        self.behavior
            .as_ref()
            .map(|b| b.selection().selected_items())
            .unwrap_or_default()
    }

    fn is_selected(&self, key: ItemKey) -> bool {
        self.behavior
            .as_ref()
            .is_some_and(|b| b.selection().contains(&key))
    }

    fn edit(&mut self, tree: &TimeContextTree, keys: &[ItemKey], dx: f64, dy: f64, target: Option<NodeId>) -> Result<()> {
        let Some(edit) = self.behavior.as_ref().and_then(Behavior::edit_behavior) else {
            return Ok(());
        };
        let ctx = self.rendering_context(tree)?;

        for &key in keys {
            let Some(index) = self.index_of(key) else {
                continue;
            };
            let Some(shape) = self.shapes.get(&key) else {
                continue;
            };
            let handle = target.map_or(Handle::Body, |node| shape.handle(node));
            if let Some(datum) = self.data.as_mut_slice().get_mut(index) {
                edit.edit(&ctx, shape.as_ref(), datum, dx, dy, handle);
                trace!("Edited {:?} in layer '{}' ({:?}, dx {}, dy {})", key, self.name, handle, dx, dy);
            }
        }
        Ok(())
    }

    fn edit_context(&mut self, tree: &mut TimeContextTree, dx: f64, _dy: f64, target: Option<NodeId>) -> Result<()> {
        let id = self.context_id()?;
        let handle = self.context_handle(target);
        self.context_behavior.edit(tree, id, dx, handle)
    }

    fn stretch_context(&mut self, tree: &mut TimeContextTree, dx: f64, _dy: f64, target: Option<NodeId>) -> Result<()> {
        let id = self.context_id()?;
        let handle = self.context_handle(target);
        self.context_behavior.stretch(tree, id, dx, handle)
    }

    fn is_context_editable(&self) -> bool {
        self.context_editable
    }

    fn set_context_editable(&mut self, editable: bool) {
        self.context_editable = editable;
    }

    fn element(&self) -> Option<NodeId> {
        self.element
    }

    fn has_element(&self, scene: &dyn SceneGraph, node: NodeId) -> bool {
        let handles = self.context_handles;
        walk_ancestors(scene, node).any(|n| {
            Some(n) == self.element
                || self.nodes.contains_key(&n)
                || handles.is_some_and(|h| n == h.body || n == h.left || n == h.right)
        })
    }

    fn item_from_element(&self, scene: &dyn SceneGraph, node: NodeId) -> Option<ItemKey> {
        walk_ancestors(scene, node).find_map(|n| self.nodes.get(&n).copied())
    }

    fn has_item(&self, key: ItemKey) -> bool {
        self.items.contains_key(&key)
    }

    fn item(&self, key: ItemKey) -> Option<&VisualItem> {
        self.items.get(&key)
    }

    fn item_keys(&self) -> Vec<ItemKey> {
        let mut keys = Vec::new();
        for datum in self.data.as_slice() {
            if let Some(key) = self.identities.get(&self.data.slot_key(datum)) {
                if self.items.contains_key(&key) && !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    fn items_in_area(&self, tree: &TimeContextTree, area: Rect) -> Result<Vec<ItemKey>> {
        let id = self.context_id()?;
        let ctx = self.rendering_context(tree)?;
        let left = tree.left_px(id)?;
        let origin = tree.time_to_pixel(id, 0.0)?;
        let area = area.abs();

        // constrain to the visible part of the context
        let x1 = area.x0.max(left);
        let x2 = area.x1.min(left + ctx.width);
        if x1 >= x2 {
            return Ok(Vec::new());
        }

        // flip into the layer's y-up coordinates
        let y1 = self.params.height - area.y1 + self.params.top;
        let y2 = self.params.height - area.y0 + self.params.top;
        let local = Rect::new(x1 - origin, y1, x2 - origin, y2);

        let mut found = Vec::new();
        for key in self.item_keys() {
            let (Some(shape), Some(datum)) = (self.shapes.get(&key), self.datum(key)) else {
                continue;
            };
            if shape.in_area(&ctx, datum, local) {
                found.push(key);
            }
        }
        Ok(found)
    }

    fn geometry(&self) -> &LayerGeometry {
        &self.geometry
    }

    fn destroy(&mut self) {
        if let Some(behavior) = &mut self.behavior {
            behavior.selection_mut().clear(&mut self.items);
        }
        for (_, mut shape) in self.shapes.drain() {
            shape.destroy();
        }
        if let Some(mut common) = self.common.take() {
            common.shape.destroy();
        }
        self.items.clear();
        self.nodes.clear();
        self.identities.clear();
        debug!("Destroyed layer '{}'", self.name);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Mark {
        id: u32,
        time: f64,
    }

    impl Datum for Mark {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }
    }

    #[derive(Default)]
    struct Log {
        next_node: u64,
        rendered: usize,
        updated: Vec<(u64, f64)>,
        destroyed: usize,
    }

    struct MarkShape(Rc<RefCell<Log>>);

    impl Shape<Mark> for MarkShape {
        fn class_name(&self) -> &str {
            "mark"
        }
        fn render(&mut self, _ctx: &RenderingContext) -> NodeId {
            let mut log = self.0.borrow_mut();
            log.next_node += 1;
            log.rendered += 1;
            NodeId(log.next_node)
        }
        fn update(&mut self, ctx: &RenderingContext, node: NodeId, datum: &Mark, _index: usize) {
            self.0.borrow_mut().updated.push((node.0, ctx.x_scale.apply(datum.time)));
        }
        fn destroy(&mut self) {
            self.0.borrow_mut().destroyed += 1;
        }
        fn in_area(&self, ctx: &RenderingContext, datum: &Mark, area: Rect) -> bool {
            let x = ctx.x_scale.apply(datum.time);
            x >= area.x0 && x <= area.x1
        }
        fn x(&self, datum: &Mark) -> f64 {
            datum.time
        }
        fn set_x(&self, datum: &mut Mark, value: f64) {
            datum.time = value;
        }
    }

    fn marks(ids: &[u32]) -> Vec<Mark> {
        ids.iter().map(|&id| Mark { id, time: id as f64 }).collect()
    }

    fn setup(records: Vec<Mark>) -> (Layer<Mark>, TimeContextTree, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let shared = log.clone();
        let mut tree = TimeContextTree::new(100.0, 1000.0).unwrap();
        let context = tree.attach(tree.root()).unwrap();
        let layer = Layer::collection(
            "marks",
            records,
            Box::new(move || Box::new(MarkShape(shared.clone())) as Box<dyn Shape<Mark>>),
        )
        .with_behavior(Behavior::point())
        .with_time_context(context);
        (layer, tree, log)
    }

    #[test]
    fn test_render_without_context_fails() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut layer = Layer::collection(
            "orphan",
            marks(&[1]),
            Box::new(move || Box::new(MarkShape(log.clone())) as Box<dyn Shape<Mark>>),
        );
        let tree = TimeContextTree::new(100.0, 1000.0).unwrap();
        let mut arena = IdentityArena::new();
        let id = layer.id();
        assert_eq!(layer.render(&tree, &mut arena), Err(TimelineError::MissingTimeContext(id)));
    }

    #[test]
    fn test_render_update_destroy() {
        let (mut layer, tree, log) = setup(marks(&[1, 2, 3]));
        let mut arena = IdentityArena::new();

        layer.render(&tree, &mut arena).unwrap();
        layer.update(&tree).unwrap();
        assert_eq!(log.borrow().rendered, 3);
        assert_eq!(log.borrow().updated.len(), 3);
        assert_eq!(layer.item_keys().len(), 3);

        layer.set_data(LayerData::Collection(marks(&[3, 4])));
        let result = layer.render(&tree, &mut arena).unwrap();
        assert_eq!((result.enter.len(), result.update.len(), result.exit.len()), (1, 1, 2));
        assert_eq!(log.borrow().destroyed, 2);

        layer.destroy();
        assert_eq!(log.borrow().destroyed, 4);
        assert!(layer.item_keys().is_empty());
    }

    #[test]
    fn test_entity_reassignment_keeps_item() {
        let (mut layer, tree, log) = setup(Vec::new());
        layer.set_entity(Mark { id: 7, time: 1.0 });
        let mut arena = IdentityArena::new();
        layer.render(&tree, &mut arena).unwrap();
        let key = layer.item_keys()[0];

        layer.set_entity(Mark { id: 8, time: 2.0 });
        let result = layer.render(&tree, &mut arena).unwrap();
        assert!(result.enter.is_empty());
        assert_eq!(result.update, vec![(0, key)]);
        assert_eq!(log.borrow().rendered, 1);
        assert_eq!(layer.datum(key).map(|m| m.id), Some(8));
        assert_eq!(layer.data_type(), DataType::Entity);
    }

    #[test]
    fn test_selection_tags_and_raises_items() {
        let (mut layer, tree, _log) = setup(marks(&[1, 2]));
        let mut arena = IdentityArena::new();
        layer.render(&tree, &mut arena).unwrap();
        let keys = layer.item_keys();

        layer.select(&[keys[0]]);
        layer.select(&[keys[1]]);
        assert!(layer.item(keys[0]).unwrap().has_class("selected"));
        assert!(layer.item(keys[1]).unwrap().z_index > layer.item(keys[0]).unwrap().z_index);

        layer.toggle_selection(&keys);
        assert!(layer.selected_items().is_empty());

        layer.select_all();
        assert_eq!(layer.selected_items().len(), 2);
        layer.unselect_all();
        assert!(!layer.item(keys[1]).unwrap().has_class("selected"));
    }

    #[test]
    fn test_edit_moves_datum_and_updates_only_selected() {
        let (mut layer, tree, log) = setup(marks(&[1, 2]));
        let mut arena = IdentityArena::new();
        layer.render(&tree, &mut arena).unwrap();
        let key = layer.item_keys()[1];

        layer.edit(&tree, &[key], 50.0, 0.0, None).unwrap();
        assert_eq!(layer.records()[1].time, 2.5);
        assert_eq!(layer.records()[0].time, 1.0);

        layer.update_shapes(&tree, Some(&[key])).unwrap();
        let updated = &log.borrow().updated;
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].1, 250.0);
    }

    #[test]
    fn test_items_in_area_follows_context() {
        let (mut layer, mut tree, _log) = setup(marks(&[1, 2, 5]));
        let context = layer.time_context().unwrap();
        tree.set_start(context, 1.0).unwrap();
        tree.set_duration(context, 3.0).unwrap();
        let mut arena = IdentityArena::new();
        layer.render(&tree, &mut arena).unwrap();
        let keys = layer.item_keys();

        // context spans 100..400 px; mark 1 sits at 200 px, mark 2 at 300 px
        let found = layer.items_in_area(&tree, Rect::new(150.0, 0.0, 250.0, 100.0)).unwrap();
        assert_eq!(found, vec![keys[0]]);

        // mark 5 lies outside the context duration and is clipped
        let found = layer.items_in_area(&tree, Rect::new(0.0, 0.0, 1000.0, 100.0)).unwrap();
        assert_eq!(found, vec![keys[0], keys[1]]);

        let found = layer.items_in_area(&tree, Rect::new(500.0, 0.0, 600.0, 100.0)).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_update_container_geometry() {
        let (mut layer, mut tree, _log) = setup(marks(&[]));
        let context = layer.time_context().unwrap();
        tree.set_start(context, 2.0).unwrap();
        tree.set_duration(context, 4.0).unwrap();
        tree.set_offset(context, -1.0).unwrap();
        layer.update_container(&tree).unwrap();

        let geometry = layer.geometry();
        assert_eq!(geometry.x, 200.0);
        assert_eq!(geometry.width, 400.0);
        assert_eq!(geometry.offset_x, -100.0);
        assert_eq!(geometry.height, 100.0);
    }
}
