use std::collections::HashSet;
use std::vec;

use serde::Serialize;

/// A preprocessor definition waiting to be applied at the next frame boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingTriple {
    /// Owning effect; `None` when definitions are applied globally.
    pub scope: Option<String>,
    /// Preprocessor symbol named by the uniform's annotation.
    pub key: String,
    /// Rendered lane text.
    pub text: String,
}

impl BindingTriple {
    pub fn new(scope: Option<String>, key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            scope,
            key: key.into(),
            text: text.into(),
        }
    }
}

/// Triples recorded since the last flush, in arrival order.
///
/// Repeated writes to the same key are all kept; applying them in order leaves
/// the last one in effect at the host.
#[derive(Debug, Default)]
pub struct PendingQueue {
    triples: Vec<BindingTriple>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, triple: BindingTriple) {
        self.triples.push(triple);
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingTriple> {
        self.triples.iter()
    }

    /// Drops every triple that a later one for the same scope and key
    /// overrides, returning how many were dropped.
    ///
    /// The surviving triples keep their relative order, so applying the
    /// collapsed queue leaves the host in the same state as the full one.
    pub fn coalesce(&mut self) -> usize {
        let before = self.triples.len();
        let mut seen = HashSet::new();
        let mut kept: Vec<BindingTriple> = self
            .triples
            .drain(..)
            .rev()
            .filter(|triple| seen.insert((triple.scope.clone(), triple.key.clone())))
            .collect();
        kept.reverse();
        self.triples = kept;
        before - self.triples.len()
    }

    /// Moves every pending triple into a batch, leaving the queue empty.
    ///
    /// Anything recorded after this call lands in the next batch.
    pub fn take_batch(&mut self) -> FlushBatch {
        FlushBatch {
            triples: std::mem::take(&mut self.triples),
        }
    }
}

/// Triples owned by one flush, detached from the live queue.
#[derive(Debug, Default)]
pub struct FlushBatch {
    triples: Vec<BindingTriple>,
}

impl FlushBatch {
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

impl IntoIterator for FlushBatch {
    type Item = BindingTriple;
    type IntoIter = vec::IntoIter<BindingTriple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}
