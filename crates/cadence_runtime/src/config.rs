//! Runtime configuration.

use cadence_engine::EngineConfig;

/// Configuration carried by a [`Context`](crate::Context).
///
/// Stored once in the context and handed to the engine session it owns;
/// loading a snapshot or rolling back keeps the caller's configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Configuration for the engine session.
    pub engine: EngineConfig,
    /// Priority reported for rules absent from the priority table.
    pub default_priority: i64,
}

impl RuntimeConfig {
    /// Creates the default configuration: unbounded cycles, priority 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps every run-cycle at `max` activations.
    #[must_use]
    pub fn bounded(max: usize) -> Self {
        Self::new().with_max_activations(max)
    }

    /// Builder method to cap activations per run-cycle.
    #[must_use]
    pub fn with_max_activations(mut self, max: usize) -> Self {
        self.engine = self.engine.with_max_activations(max);
        self
    }

    /// Builder method to change the default priority.
    #[must_use]
    pub fn with_default_priority(mut self, priority: i64) -> Self {
        self.default_priority = priority;
        self
    }
}
