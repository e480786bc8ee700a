use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use bindconfig::{BindOptions, ScopeMode};
use tracing::{debug, trace};

use crate::decode::UniformSnapshot;
use crate::format::{render, TextFormat};
use crate::host::EffectRuntime;
use crate::queue::{BindingTriple, FlushBatch, PendingQueue};

/// Result of a frame-boundary flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The given number of definitions were handed to the host.
    Applied(usize),
    /// Nothing was pending.
    Empty,
    /// No effect was loaded; the latest triple per key stays queued for the
    /// next boundary.
    SkippedNoEffects { pending: usize },
}

/// Per-runtime binding state: the options in force and the pending queue.
#[derive(Debug)]
pub struct BindContext {
    options: BindOptions,
    pending: PendingQueue,
}

impl BindContext {
    pub fn new(options: BindOptions) -> Self {
        Self {
            options,
            pending: PendingQueue::new(),
        }
    }

    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    /// Observes a uniform write. Always returns `false`: the write itself is
    /// never intercepted.
    pub fn on_uniform_write<R: EffectRuntime>(
        &mut self,
        runtime: &R,
        variable: R::Variable,
        bytes: &[u8],
    ) -> bool {
        if let Some(triple) = self.bind(runtime, variable, bytes) {
            self.record(triple);
        }
        false
    }

    /// Builds the triple for a write to `variable`, or `None` when the
    /// variable carries no binding annotation or cannot be rebound.
    pub fn bind<R: EffectRuntime>(
        &self,
        runtime: &R,
        variable: R::Variable,
        bytes: &[u8],
    ) -> Option<BindingTriple> {
        let key = runtime.annotation(variable, &self.options.annotation)?;
        let (format, shape) = runtime.uniform_type(variable);
        let Some(snapshot) = UniformSnapshot::decode(format, shape, bytes) else {
            debug!(%key, %format, ?shape, "uniform cannot be rebound; skipping");
            return None;
        };

        let text = render(
            &snapshot,
            TextFormat::new(self.options.lane_order, self.options.bool_style),
        );
        let scope = match self.options.scope {
            ScopeMode::Effect => Some(runtime.effect_name(variable)),
            ScopeMode::Global => None,
        };
        Some(BindingTriple { scope, key, text })
    }

    pub fn record(&mut self, triple: BindingTriple) {
        trace!(
            scope = ?triple.scope,
            key = %triple.key,
            text = %triple.text,
            pending = self.pending.len() + 1,
            "recorded binding"
        );
        self.pending.record(triple);
    }

    /// Detaches the pending triples; later records start a fresh batch.
    pub fn take_batch(&mut self) -> FlushBatch {
        self.pending.take_batch()
    }

    /// Applies every pending triple to `runtime` in recorded order.
    pub fn flush<R: EffectRuntime>(&mut self, runtime: &mut R) -> FlushOutcome {
        if self.options.skip_without_effects && !runtime.effects_loaded() {
            let superseded = self.pending.coalesce();
            let pending = self.pending.len();
            debug!(pending, superseded, "no effects loaded; deferring binding flush");
            return FlushOutcome::SkippedNoEffects { pending };
        }
        if self.pending.is_empty() {
            return FlushOutcome::Empty;
        }

        let batch = self.take_batch();
        FlushOutcome::Applied(apply_batch(runtime, batch))
    }
}

/// Hands each triple of `batch` to the host, returning how many were applied.
pub fn apply_batch<R: EffectRuntime>(runtime: &mut R, batch: FlushBatch) -> usize {
    let mut applied = 0;
    for triple in batch {
        runtime.set_preprocessor_definition(triple.scope.as_deref(), &triple.key, &triple.text);
        applied += 1;
    }
    debug!(applied, "applied binding definitions");
    applied
}

/// Binding contexts keyed by runtime handle.
///
/// Contexts are created when the host initializes a runtime and dropped when
/// it is destroyed, discarding anything still pending.
#[derive(Debug)]
pub struct ContextRegistry<H> {
    options: BindOptions,
    contexts: HashMap<H, BindContext>,
}

impl<H> ContextRegistry<H>
where
    H: Copy + Eq + Hash + Debug,
{
    pub fn new(options: BindOptions) -> Self {
        Self {
            options,
            contexts: HashMap::new(),
        }
    }

    pub fn on_init(&mut self, runtime: H) -> &mut BindContext {
        debug!(?runtime, "creating binding context");
        self.context_mut(runtime)
    }

    pub fn on_destroy(&mut self, runtime: H) -> Option<BindContext> {
        let removed = self.contexts.remove(&runtime);
        if let Some(context) = &removed {
            debug!(
                ?runtime,
                dropped = context.pending().len(),
                "destroyed binding context"
            );
        }
        removed
    }

    pub fn context(&self, runtime: H) -> Option<&BindContext> {
        self.contexts.get(&runtime)
    }

    /// Context for `runtime`, created on demand for hosts that write uniforms
    /// before announcing the runtime.
    pub fn context_mut(&mut self, runtime: H) -> &mut BindContext {
        let options = &self.options;
        self.contexts
            .entry(runtime)
            .or_insert_with(|| BindContext::new(options.clone()))
    }

    pub fn on_uniform_write<R: EffectRuntime>(
        &mut self,
        runtime: H,
        host: &R,
        variable: R::Variable,
        bytes: &[u8],
    ) -> bool {
        self.context_mut(runtime).on_uniform_write(host, variable, bytes)
    }

    pub fn on_frame_boundary<R: EffectRuntime>(&mut self, runtime: H, host: &mut R) -> FlushOutcome {
        match self.contexts.get_mut(&runtime) {
            Some(context) => context.flush(host),
            None => {
                trace!(?runtime, "frame boundary for unknown runtime");
                FlushOutcome::Empty
            }
        }
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
