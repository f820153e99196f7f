//! Hierarchical time contexts
//!
//! A [`TimeContextTree`] owns every [`TimeContext`] of one timeline. The root
//! context maps the visible duration onto the visible pixel width; child
//! contexts (one per layer, usually) are positioned inside their parent by
//! `start`, clipped to `duration`, panned by `offset` and zoomed by their own
//! `stretch_ratio`.
//!
//! ## Positions and extents
//!
//! A context's `start` is a *position* in its parent's domain, so it goes
//! through the parent's scale. `duration` and `offset` are *extents* in the
//! context's own domain and go through its own scale. The two are not
//! interchangeable once a child is stretched.
//!
//! ## Zoom
//!
//! Every context keeps the scale it was created with (`original_x_scale`).
//! Its current scale divides the original domain span by the product of its
//! own stretch ratio and all ancestors' ratios, so repeated zooms are
//! absolute and a parent zoom multiplies through the children.

use crate::error::{Result, TimelineError};
use crate::scale::Scale;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

/// Lower bound applied to every stretch ratio
pub const MIN_STRETCH_RATIO: f64 = 1e-6;

/// Identifier of a context inside its tree
///
/// Ids are never reused after a context is detached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextId(usize);

/// One node of the time context tree
#[derive(Clone, Debug)]
pub struct TimeContext {
    start: f64,
    duration: f64,
    offset: f64,
    stretch_ratio: f64,
    x_scale: Scale,
    original_x_scale: Scale,
    parent: Option<ContextId>,
    children: Vec<ContextId>,
}

impl TimeContext {
    /// Origin of this context in its parent's domain (seconds)
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Visible extent of this context (seconds)
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Pan applied inside this context (seconds)
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Zoom factor relative to the original scale, excluding ancestors
    pub fn stretch_ratio(&self) -> f64 {
        self.stretch_ratio
    }

    /// Current time-to-pixel scale
    pub fn x_scale(&self) -> &Scale {
        &self.x_scale
    }

    /// Unzoomed baseline scale
    pub fn original_x_scale(&self) -> &Scale {
        &self.original_x_scale
    }

    pub fn parent(&self) -> Option<ContextId> {
        self.parent
    }

    pub fn children(&self) -> &[ContextId] {
        &self.children
    }
}

const ROOT: ContextId = ContextId(0);

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Arena of time contexts with a single root
#[derive(Clone, Debug)]
pub struct TimeContextTree {
    root: TimeContext,
    /// Slot 0 is reserved for the root and always empty
    nodes: Vec<Option<TimeContext>>,
    maintain_visible_duration: bool,
}

impl TimeContextTree {
    /// Create a tree whose root shows `visible_width / pixels_per_second`
    /// seconds across `visible_width` pixels
    pub fn new(pixels_per_second: f64, visible_width: f64) -> Result<Self> {
        let domain = [0.0, visible_width / pixels_per_second];
        let range = [0.0, visible_width];
        if !is_positive(pixels_per_second) || !is_positive(visible_width) {
            return Err(TimelineError::InvalidScale { domain, range });
        }
        let scale = Scale::linear(domain, range)?;

        let root = TimeContext {
            start: 0.0,
            duration: domain[1],
            offset: 0.0,
            stretch_ratio: 1.0,
            x_scale: scale,
            original_x_scale: scale,
            parent: None,
            children: Vec::new(),
        };

        Ok(Self {
            root,
            nodes: vec![None],
            maintain_visible_duration: false,
        })
    }

    /// Root context id
    pub fn root(&self) -> ContextId {
        ROOT
    }

    pub fn get(&self, id: ContextId) -> Option<&TimeContext> {
        if id == ROOT {
            return Some(&self.root);
        }
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Like [`get`](Self::get) but reports unknown ids as errors
    pub fn context(&self, id: ContextId) -> Result<&TimeContext> {
        self.get(id).ok_or(TimelineError::UnknownContext(id))
    }

    fn node_mut(&mut self, id: ContextId) -> Result<&mut TimeContext> {
        if id == ROOT {
            return Ok(&mut self.root);
        }
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TimelineError::UnknownContext(id))
    }

    pub fn contains(&self, id: ContextId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live contexts, root included
    pub fn context_count(&self) -> usize {
        1 + self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Create a child context under `parent`
    ///
    /// The child starts at 0, spans the root's visible duration, has no
    /// offset and a stretch ratio of 1. It copies the parent's original
    /// scale, so it shares the root's pixel extent.
    pub fn attach(&mut self, parent: ContextId) -> Result<ContextId> {
        let parent_node = self.context(parent)?;
        let original = parent_node.original_x_scale;
        let duration = self.visible_duration();

        let id = ContextId(self.nodes.len());
        self.nodes.push(Some(TimeContext {
            start: 0.0,
            duration,
            offset: 0.0,
            stretch_ratio: 1.0,
            x_scale: original,
            original_x_scale: original,
            parent: Some(parent),
            children: Vec::new(),
        }));
        self.node_mut(parent)?.children.push(id);
        self.rederive(id)?;

        debug!("Attached time context {:?} under {:?}", id, parent);
        Ok(id)
    }

    /// Remove a context and its whole subtree
    pub fn detach(&mut self, id: ContextId) -> Result<()> {
        if id == ROOT {
            return Err(TimelineError::DetachRoot);
        }
        let parent = self.context(id)?.parent;
        let mut removed = self.descendants(id)?;
        removed.push(id);

        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|&c| c != id);
        }
        for node in &removed {
            if let Some(slot) = self.nodes.get_mut(node.0) {
                *slot = None;
            }
        }

        debug!("Detached time context {:?} ({} contexts removed)", id, removed.len());
        Ok(())
    }

    /// All contexts below `id`, depth first, `id` excluded
    pub fn descendants(&self, id: ContextId) -> Result<Vec<ContextId>> {
        let mut out = Vec::new();
        let mut stack: Vec<ContextId> = self.context(id)?.children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.get(next) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        Ok(out)
    }

    /// Product of the stretch ratios from the root down to `id`
    pub fn effective_ratio(&self, id: ContextId) -> Result<f64> {
        let mut ratio = 1.0;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.context(current)?;
            ratio *= node.stretch_ratio;
            cursor = node.parent;
        }
        Ok(ratio)
    }

    /// Rebuild the current scale of `id` and every descendant from their
    /// original scales
    fn rederive(&mut self, id: ContextId) -> Result<()> {
        let mut targets = vec![id];
        targets.extend(self.descendants(id)?);

        // all scales are validated before any is written
        let mut scales = Vec::with_capacity(targets.len());
        for target in targets {
            let ratio = self.effective_ratio(target)?;
            let original = self.context(target)?.original_x_scale;
            let [min, _] = original.domain();
            let span = original.domain_span() / ratio;
            scales.push((target, original.with_domain([min, min + span])?));
        }
        for (target, scale) in scales {
            self.node_mut(target)?.x_scale = scale;
        }
        Ok(())
    }

    /// Set the stretch ratio of `id` and propagate to its descendants
    ///
    /// Ratios below [`MIN_STRETCH_RATIO`] are clamped, non-finite ratios are
    /// ignored. Returns the ratio actually applied.
    pub fn set_zoom(&mut self, id: ContextId, ratio: f64) -> Result<f64> {
        let current = self.context(id)?.stretch_ratio;
        if !ratio.is_finite() {
            warn!("Ignoring non-finite stretch ratio {} for {:?}", ratio, id);
            return Ok(current);
        }
        let clamped = ratio.max(MIN_STRETCH_RATIO);
        if clamped != ratio {
            trace!("Stretch ratio {} clamped to {}", ratio, clamped);
        }

        self.node_mut(id)?.stretch_ratio = clamped;
        if let Err(e) = self.rederive(id) {
            self.node_mut(id)?.stretch_ratio = current;
            return Err(e);
        }
        Ok(clamped)
    }

    /// Set the pixel range of `id` and of every descendant
    ///
    /// Both the current and the original scales are updated, so subsequent
    /// zooms stay relative to the new range.
    pub fn set_range(&mut self, id: ContextId, range: [f64; 2]) -> Result<()> {
        let mut targets = vec![id];
        targets.extend(self.descendants(id)?);

        // validate once before touching anything
        let probe = self.context(id)?.x_scale;
        Scale::linear(probe.domain(), range)?;

        for target in targets {
            let node = self.node_mut(target)?;
            node.x_scale.set_range(range)?;
            node.original_x_scale.set_range(range)?;
        }
        Ok(())
    }

    /// Width of the root pixel range
    pub fn visible_width(&self) -> f64 {
        let [r0, r1] = self.root_node().original_x_scale.range();
        (r1 - r0).abs()
    }

    /// Seconds shown across the visible width at stretch ratio 1
    pub fn visible_duration(&self) -> f64 {
        self.root_node().original_x_scale.domain_span().abs()
    }

    /// Unzoomed pixels per second of the root
    pub fn pixels_per_second(&self) -> f64 {
        self.visible_width() / self.visible_duration()
    }

    pub fn maintain_visible_duration(&self) -> bool {
        self.maintain_visible_duration
    }

    /// When set, resizing the visible width rescales pixels per second so the
    /// visible duration stays the same
    pub fn set_maintain_visible_duration(&mut self, maintain: bool) {
        self.maintain_visible_duration = maintain;
    }

    /// Change the unzoomed pixels per second of the whole tree
    pub fn set_pixels_per_second(&mut self, pixels_per_second: f64) -> Result<()> {
        let width = self.visible_width();
        if !is_positive(pixels_per_second) {
            return Err(TimelineError::InvalidScale {
                domain: [0.0, width / pixels_per_second],
                range: self.root_node().original_x_scale.range(),
            });
        }
        self.set_visible_domain(width / pixels_per_second)
    }

    /// Resize the visible pixel width of the whole tree
    pub fn set_visible_width(&mut self, width: f64) -> Result<()> {
        let pixels_per_second = self.pixels_per_second();
        let [r0, _] = self.root_node().original_x_scale.range();
        if !is_positive(width) {
            return Err(TimelineError::InvalidScale {
                domain: self.root_node().original_x_scale.domain(),
                range: [r0, r0 + width],
            });
        }
        self.set_range(ROOT, [r0, r0 + width])?;

        if !self.maintain_visible_duration {
            self.set_visible_domain(width / pixels_per_second)?;
        }
        Ok(())
    }

    fn set_visible_domain(&mut self, duration: f64) -> Result<()> {
        let root = ROOT;
        let [d0, _] = self.root_node().original_x_scale.domain();
        let domain = [d0, d0 + duration];
        Scale::linear(domain, self.root_node().original_x_scale.range())?;

        let mut targets = vec![root];
        targets.extend(self.descendants(root)?);
        for target in targets {
            self.node_mut(target)?.original_x_scale.set_domain(domain)?;
        }
        self.node_mut(root)?.duration = duration;
        self.rederive(root)
    }

    fn root_node(&self) -> &TimeContext {
        &self.root
    }

    pub fn set_start(&mut self, id: ContextId, start: f64) -> Result<f64> {
        self.node_mut(id)?.start = start;
        Ok(start)
    }

    pub fn set_duration(&mut self, id: ContextId, duration: f64) -> Result<f64> {
        self.node_mut(id)?.duration = duration;
        Ok(duration)
    }

    /// Set the pan of a context; never clamped here
    pub fn set_offset(&mut self, id: ContextId, offset: f64) -> Result<f64> {
        self.node_mut(id)?.offset = offset;
        Ok(offset)
    }

    /// Scale used for positions expressed in the parent's domain
    pub fn parent_scale(&self, id: ContextId) -> Result<&Scale> {
        let node = self.context(id)?;
        match node.parent {
            Some(parent) => Ok(&self.context(parent)?.x_scale),
            None => Ok(&node.x_scale),
        }
    }

    /// `start` in pixels, relative to the parent's content origin
    pub fn start_px(&self, id: ContextId) -> Result<f64> {
        let start = self.context(id)?.start;
        Ok(self.parent_scale(id)?.apply(start))
    }

    /// `duration` in pixels
    pub fn duration_px(&self, id: ContextId) -> Result<f64> {
        let node = self.context(id)?;
        Ok(node.x_scale.apply_extent(node.duration))
    }

    /// `offset` in pixels
    pub fn offset_px(&self, id: ContextId) -> Result<f64> {
        let node = self.context(id)?;
        Ok(node.x_scale.apply_extent(node.offset))
    }

    /// Absolute surface pixel of this context's left edge
    pub fn left_px(&self, id: ContextId) -> Result<f64> {
        let node = self.context(id)?;
        match node.parent {
            Some(parent) => self.time_to_pixel(parent, node.start),
            None => Ok(node.x_scale.apply(node.start)),
        }
    }

    /// Absolute surface pixel of a time expressed in this context's domain
    pub fn time_to_pixel(&self, id: ContextId, time: f64) -> Result<f64> {
        let node = self.context(id)?;
        Ok(self.left_px(id)? + node.x_scale.apply_extent(time + node.offset))
    }

    /// Time in this context's domain under an absolute surface pixel
    pub fn pixel_to_time(&self, id: ContextId, pixel: f64) -> Result<f64> {
        let node = self.context(id)?;
        let local = pixel - self.left_px(id)?;
        Ok(node.x_scale.invert_extent(local) - node.offset)
    }
}
