//! Where resolved appearances are applied.

use std::sync::{Arc, Mutex, PoisonError};

use crate::appearance::Appearance;

/// Applies a resolved appearance to the presentation layer.
///
/// Applying the same value twice must leave the same observable state as
/// applying it once. Implementations must not call back into the
/// controller that drives them.
pub trait AppearanceSink: Send + Sync {
    fn apply(&self, appearance: Appearance);
}

impl<F> AppearanceSink for F
where
    F: Fn(Appearance) + Send + Sync,
{
    fn apply(&self, appearance: Appearance) {
        self(appearance)
    }
}

/// Sink that remembers everything applied to it.
///
/// Clones share the same history. Hosts that poll rather than react can
/// read [`current`](Self::current).
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    applied: Arc<Mutex<Vec<Appearance>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently applied appearance.
    pub fn current(&self) -> Option<Appearance> {
        self.lock().last().copied()
    }

    /// Every applied appearance, oldest first.
    pub fn history(&self) -> Vec<Appearance> {
        self.lock().clone()
    }

    pub fn apply_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Appearance>> {
        self.applied.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AppearanceSink for RecordingSink {
    fn apply(&self, appearance: Appearance) {
        self.lock().push(appearance);
    }
}
