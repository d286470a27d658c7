//! Agenda priority scheduling.
//!
//! Pending activations fire highest priority first. Within one priority
//! they fire in enqueue order. The ordering is applied before every pop of
//! the run-cycle, so an activation enqueued mid-cycle overtakes waiting
//! activations of lower priority.
//!
//! An activation re-enqueued after it fired receives a fresh enqueue index
//! at the tail, so ties are always broken by the most recent enqueue.

use std::cmp::Reverse;

use cadence_engine::{Activation, Bindings, ConflictResolver, Rule};
use cadence_foundation::{Keyword, PMap, Result};
use tracing::{debug, warn};

use crate::context::Context;

/// Metadata key holding a rule's priority tag.
pub const PRIORITY_TAG: &str = "priority";

/// Returns a copy of `rule` tagged with `priority`.
///
/// The tag is read when the rule is added to a [`Context`].
#[must_use]
pub fn with_priority(priority: i64, rule: &Rule) -> Rule {
    rule.with_meta(PRIORITY_TAG, priority)
}

/// Reads the priority tag of a rule.
///
/// Tags that are not integers are ignored with a warning.
pub(crate) fn rule_priority(rule: &Rule) -> Option<i64> {
    let tag = rule.meta(PRIORITY_TAG)?;
    let priority = tag.as_int();
    if priority.is_none() {
        warn!(rule = %rule.name(), tag = %tag, kind = tag.type_name(), "ignoring non-integer priority tag");
    }
    priority
}

// =============================================================================
// Conflict Resolution
// =============================================================================

/// Orders activations by descending priority, then enqueue index.
#[derive(Clone, Debug)]
pub struct PriorityResolver<'a> {
    priorities: &'a PMap<Keyword, i64>,
    default: i64,
}

impl<'a> PriorityResolver<'a> {
    /// Creates a resolver over a priority table.
    #[must_use]
    pub fn new(priorities: &'a PMap<Keyword, i64>, default: i64) -> Self {
        Self {
            priorities,
            default,
        }
    }

    /// Priority of a rule, or the default if it has none.
    #[must_use]
    pub fn priority(&self, rule: &Keyword) -> i64 {
        self.priorities.get(rule).copied().unwrap_or(self.default)
    }
}

impl ConflictResolver for PriorityResolver<'_> {
    fn order(&self, pending: &mut [Activation]) {
        pending.sort_by_key(|a| (Reverse(self.priority(&a.rule)), a.seq));
    }
}

/// One entry of [`Context::explain_execution_order`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledActivation {
    /// Rule that would fire
    pub rule: Keyword,
    /// Its effective priority
    pub priority: i64,
    /// Position the activation was enqueued at
    pub enqueue_index: u64,
    /// Match it would fire on
    pub bindings: Bindings,
}

// =============================================================================
// Context Operations
// =============================================================================

impl Context {
    fn resolver(&self) -> PriorityResolver<'_> {
        PriorityResolver::new(&self.priorities, self.config.default_priority)
    }

    /// Runs pending activations in priority order until none remain.
    ///
    /// # Errors
    /// Propagates the first rule action failure, or a limit error if the
    /// configuration caps activations per cycle.
    pub fn run_cycle(&self) -> Result<Self> {
        let pending = self.session.agenda().len();
        let fired_before = self.session.fired().len();
        debug!(pending, "run-cycle started");

        let session = self.session.run_native_cycle_with(&self.resolver())?;

        debug!(
            fired = session.fired().len() - fired_before,
            "run-cycle finished"
        );
        Ok(self.with_session(session))
    }

    /// Priority of a rule; rules without one report the configured default.
    #[must_use]
    pub fn priority_of(&self, rule: &str) -> i64 {
        self.priorities
            .get(Keyword::bare(rule))
            .copied()
            .unwrap_or(self.config.default_priority)
    }

    /// Sets the priority of a rule by name.
    ///
    /// Takes effect at the next ordering decision, including for activations
    /// already pending.
    #[must_use]
    pub fn set_priority(&self, rule: &str, priority: i64) -> Self {
        Self {
            priorities: self.priorities.insert(Keyword::new(rule), priority),
            ..self.clone()
        }
    }

    /// Every recorded priority, highest first, then by rule name.
    #[must_use]
    pub fn list_priorities(&self) -> Vec<(Keyword, i64)> {
        let mut entries: Vec<(Keyword, i64)> = self
            .priorities
            .iter()
            .map(|(rule, p)| (rule.clone(), *p))
            .collect();
        entries.sort_by(|(a, pa), (b, pb)| pb.cmp(pa).then_with(|| a.cmp(b)));
        entries
    }

    /// Pending activations in the order [`run_cycle`](Self::run_cycle) would
    /// start firing them. Nothing is executed.
    #[must_use]
    pub fn explain_execution_order(&self) -> Vec<ScheduledActivation> {
        let resolver = self.resolver();
        self.session
            .agenda()
            .ordered(&resolver)
            .into_iter()
            .map(|a| ScheduledActivation {
                priority: resolver.priority(&a.rule),
                rule: a.rule,
                enqueue_index: a.seq,
                bindings: a.bindings,
            })
            .collect()
    }
}
