//! Rebinds annotated shader uniforms to preprocessor definitions.
//!
//! Whenever the host writes a uniform carrying a `ui_bind` annotation, the
//! written bytes are decoded into lanes, rendered as comma separated text and
//! queued under the annotation's value. At the next frame boundary the queue
//! is swapped out and every entry is applied to the host as a preprocessor
//! definition, so effects can recompile against the current UI values.

mod context;
mod decode;
mod format;
mod host;
mod memory;
mod queue;
mod replay;
mod types;

pub use bindconfig::{BindOptions, BoolStyle, LaneOrder, ScopeMode};
pub use context::{apply_batch, BindContext, ContextRegistry, FlushOutcome};
pub use decode::{LaneValue, UniformSnapshot};
pub use format::{format_lane, format_scientific, lane_index, render, TextFormat, LANE_SEPARATOR};
pub use host::EffectRuntime;
pub use memory::{DefinitionCall, MemoryRuntime, UniformDecl, VariableId};
pub use queue::{BindingTriple, FlushBatch, PendingQueue};
pub use replay::{
    replay, FrameReport, FrameSpec, ReplayError, ReplayReport, Script, VariableSpec, WriteSpec,
};
pub use types::{BaseType, ElementFormat, UniformShape, LANE_COUNT, LANE_STRIDE, MAX_DIMENSION};
