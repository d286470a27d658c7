//! Error types for the Cadence system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

/// The main error type for Cadence operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating it if needed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates a module-not-registered error.
    #[must_use]
    pub fn module_not_registered(module: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModuleNotRegistered {
            module: module.into(),
        })
    }

    /// Creates a checkpoint-not-found error.
    #[must_use]
    pub fn checkpoint_not_found(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::CheckpointNotFound { name: name.into() })
    }

    /// Creates an action failure error for the given rule.
    #[must_use]
    pub fn action_failed(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ActionFailed {
            rule: rule.into(),
            message: message.into(),
        })
    }

    /// Creates a semantic limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Returns true if this is a `ModuleNotRegistered` error.
    #[must_use]
    pub fn is_module_not_registered(&self) -> bool {
        matches!(self.kind, ErrorKind::ModuleNotRegistered { .. })
    }

    /// Returns true if this is a `CheckpointNotFound` error.
    #[must_use]
    pub fn is_checkpoint_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::CheckpointNotFound { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A module was enabled before being registered.
    #[error("module not registered: {module}")]
    ModuleNotRegistered {
        /// The unknown module name.
        module: String,
    },

    /// Rollback named a checkpoint that was never captured.
    #[error("checkpoint not found: {name}")]
    CheckpointNotFound {
        /// The unknown checkpoint name.
        name: String,
    },

    /// A rule action reported failure while firing.
    #[error("action failed in rule {rule}: {message}")]
    ActionFailed {
        /// The rule whose action failed.
        rule: String,
        /// Failure description supplied by the action.
        message: String,
    },

    /// Semantic limit exceeded (kill switch triggered).
    #[error("limit exceeded: {0}")]
    LimitExceeded(SemanticLimit),

    /// A snapshot carries a format version this build does not understand.
    #[error("unsupported snapshot version {found} (supported: {supported})")]
    UnsupportedSnapshotVersion {
        /// Version tag found in the snapshot.
        found: u32,
        /// Version this build writes and reads.
        supported: u32,
    },

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O failure while persisting a snapshot.
    #[error("io error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Semantic limits (kill switches) that can be exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticLimit {
    /// Maximum rule activations per run-cycle exceeded.
    MaxActivations {
        /// The configured limit.
        limit: usize,
        /// The rule that would have fired next.
        rule: Option<String>,
    },
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxActivations { limit, rule } => {
                write!(f, "max activations ({limit}) exceeded")?;
                if let Some(rule) = rule {
                    write!(f, " at rule {rule}")?;
                }
                Ok(())
            }
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Rule, module, or checkpoint the error originated from.
    pub source: Option<String>,
    /// Stack of rule firings leading to the error, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
