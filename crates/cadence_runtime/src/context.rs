//! The runtime context: an engine session plus its side tables.
//!
//! A [`Context`] owns the [`Session`] together with the state the control
//! layers keep about it: the priority table, the module registry, stored
//! checkpoints, and the configuration. Like the session, a context is an
//! immutable value. Every operation returns a new context, and the caller
//! treats the returned value as the new current one.
//!
//! Scheduling, module, and checkpoint operations live in their own modules
//! as further `impl Context` blocks.

use cadence_aggregate::{Accumulator, AccumulatorSet};
use cadence_engine::{Activation, Bindings, Fact, MatchSource, Rule, Session};
use cadence_foundation::{EntityId, Keyword, PMap, POrdMap, Value};
use std::collections::HashMap;

use crate::config::RuntimeConfig;
use crate::module::ModuleRegistry;
use crate::scheduler::rule_priority;
use crate::snapshot::Snapshot;

/// Engine session plus priority table, module registry, and checkpoints.
#[derive(Clone, Debug, Default)]
pub struct Context {
    pub(crate) session: Session,
    /// Rule name -> priority. Absence means the configured default.
    pub(crate) priorities: PMap<Keyword, i64>,
    pub(crate) modules: ModuleRegistry,
    /// Checkpoints by name (ordered for listing).
    pub(crate) checkpoints: POrdMap<String, Snapshot>,
    pub(crate) config: RuntimeConfig,
}

impl Context {
    /// Creates an empty context with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty context with the given configuration.
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            session: Session::with_config(config.engine.clone()),
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Returns the engine session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Consumes the context, returning the engine session.
    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Returns a context with the session replaced and side tables kept.
    #[must_use]
    pub fn with_session(&self, session: Session) -> Self {
        Self {
            session,
            ..self.clone()
        }
    }

    // -------------------------------------------------------------------------
    // Rules
    // -------------------------------------------------------------------------

    /// Adds a rule to the session and records its priority.
    ///
    /// The priority comes from the rule's priority tag (see
    /// [`with_priority`](crate::with_priority)); untagged rules get the
    /// configured default.
    #[must_use]
    pub fn add_rule(&self, rule: Rule) -> Self {
        let priority = rule_priority(&rule).unwrap_or(self.config.default_priority);
        Self {
            priorities: self.priorities.insert(rule.name().clone(), priority),
            session: self.session.add_rule(rule),
            ..self.clone()
        }
    }

    /// Adds several rules in order.
    #[must_use]
    pub fn add_rules<I>(&self, rules: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        rules.into_iter().fold(self.clone(), |ctx, rule| ctx.add_rule(rule))
    }

    /// Removes a rule, its pending activations, and its priority entry.
    #[must_use]
    pub fn remove_rule(&self, name: &str) -> Self {
        Self {
            session: self.session.remove_rule(name),
            priorities: self.priorities.remove(Keyword::bare(name)),
            ..self.clone()
        }
    }

    /// Returns true if a rule with this name is in the session.
    #[must_use]
    pub fn has_rule(&self, name: &str) -> bool {
        self.session.has_rule(name)
    }

    /// Rule names in registration order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<Keyword> {
        self.session.rule_names()
    }

    // -------------------------------------------------------------------------
    // Facts
    // -------------------------------------------------------------------------

    /// Inserts or updates a fact.
    #[must_use]
    pub fn insert_fact(
        &self,
        entity: EntityId,
        attribute: impl Into<Keyword>,
        value: impl Into<Value>,
    ) -> Self {
        self.with_session(self.session.insert_fact(entity, attribute, value))
    }

    /// Inserts many facts in order.
    #[must_use]
    pub fn insert_facts<I>(&self, facts: I) -> Self
    where
        I: IntoIterator<Item = Fact>,
    {
        self.with_session(self.session.insert_facts(facts))
    }

    /// Retracts a fact if present.
    #[must_use]
    pub fn retract_fact(&self, entity: EntityId, attribute: &str) -> Self {
        self.with_session(self.session.retract_fact(entity, attribute))
    }

    /// Returns true if the fact exists.
    #[must_use]
    pub fn has_fact(&self, entity: EntityId, attribute: &str) -> bool {
        self.session.has_fact(entity, attribute)
    }

    /// Returns the value of a fact.
    #[must_use]
    pub fn fact(&self, entity: EntityId, attribute: &str) -> Option<&Value> {
        self.session.fact(entity, attribute)
    }

    /// Every current fact, in first-insertion order.
    #[must_use]
    pub fn enumerate_facts(&self) -> Vec<Fact> {
        self.session.enumerate_facts()
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current matches of a rule.
    #[must_use]
    pub fn query_matches(&self, rule: &str) -> Vec<Bindings> {
        self.session.query_matches(rule)
    }

    /// Pending activations in enqueue order.
    #[must_use]
    pub fn pending_activations(&self) -> Vec<Activation> {
        self.session.pending_activations()
    }

    /// Runs `acc` over the current matches of `rule`.
    pub fn accumulate<A>(&self, rule: &str, acc: &A) -> A::Output
    where
        A: Accumulator + ?Sized,
    {
        cadence_aggregate::accumulate(&self.session, rule, acc)
    }

    /// Runs every accumulator in `set` over the current matches of `rule`.
    #[must_use]
    pub fn accumulate_all(&self, rule: &str, set: &AccumulatorSet) -> HashMap<String, Value> {
        cadence_aggregate::accumulate_all(&self.session, rule, set)
    }
}

impl MatchSource for Context {
    fn query_matches(&self, rule: &str) -> Vec<Bindings> {
        self.session.query_matches(rule)
    }
}
