//! Configuration for the host engine.

/// Engine configuration, stored in the [`Session`](crate::Session) value.
///
/// There is no process-wide default: a session carries its own copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum activations fired by a single run-cycle.
    ///
    /// `None` (the default) means unbounded: a rule that keeps re-enqueueing
    /// itself makes the cycle run forever.
    pub max_activations: Option<usize>,
}

impl EngineConfig {
    /// Creates the default (unbounded) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to cap activations per cycle.
    #[must_use]
    pub fn with_max_activations(mut self, max: usize) -> Self {
        self.max_activations = Some(max);
        self
    }

    /// Builder method to remove the activation cap.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.max_activations = None;
        self
    }
}
