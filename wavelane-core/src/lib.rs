//! Wavelane core library
//!
//! Time-based visualization engine for audio and time-series editors:
//! nested time contexts mapping seconds to pixels, data-bound layers that
//! reconcile records against host-drawn shapes, selection and edit
//! behaviors, and interaction states driven by pointer and keyboard events.

pub mod behavior;
pub mod config;
pub mod context_behavior;
pub mod error;
pub mod event;
pub mod helpers;
pub mod layer;
pub mod orthogonal;
pub mod reconciler;
pub mod scale;
pub mod selection;
pub mod shape;
pub mod states;
pub mod surface;
pub mod time_context;
pub mod timeline;
pub mod track;
pub mod track_collection;

pub use behavior::{Behavior, EditBehavior};
pub use config::{InteractionConfig, TimelineConfig};
pub use error::{ConfigError, DataError, Result, TimelineError};
pub use event::{EventKind, InputEvent, Key, Modifiers};
pub use layer::{AnyLayer, DataType, Datum, Layer, LayerData, LayerParams};
pub use reconciler::ItemKey;
pub use scale::Scale;
pub use shape::{Handle, NodeId, RenderingContext, SceneGraph, Shape};
pub use states::InteractionState;
pub use time_context::{ContextId, TimeContextTree};
pub use timeline::Timeline;
pub use track::Track;
pub use track_collection::{LayerSelector, TrackCollection};
