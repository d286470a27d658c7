//! The immutable engine session.
//!
//! A [`Session`] bundles rules, facts, and the agenda. Every operation
//! returns a new session and leaves the receiver untouched; cloning is O(1)
//! thanks to persistent collections, so two sessions derived from a common
//! ancestor can be queried independently without coordination.

use cadence_foundation::{EntityId, Error, ErrorKind, Keyword, PVec, Result, SemanticLimit, Value};
use tracing::trace;

use crate::agenda::{Activation, Agenda, ConflictResolver, FifoResolver, FiringRecord};
use crate::config::EngineConfig;
use crate::fact::{Fact, FactStore};
use crate::pattern::{Bindings, PatternMatcher};
use crate::rule::Rule;

/// Immutable rule-engine state: rules, facts, and pending activations.
#[derive(Clone, Debug, Default)]
pub struct Session {
    config: EngineConfig,
    /// Rules in registration order
    rules: PVec<Rule>,
    facts: FactStore,
    agenda: Agenda,
    /// Every activation fired by this session's lineage, oldest first
    fired: PVec<FiringRecord>,
}

impl Session {
    /// Creates an empty session with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns a session with the configuration replaced.
    #[must_use]
    pub fn set_config(&self, config: EngineConfig) -> Self {
        Self {
            config,
            ..self.clone()
        }
    }

    // -------------------------------------------------------------------------
    // Rules
    // -------------------------------------------------------------------------

    /// Adds a rule, replacing any rule with the same name in place.
    ///
    /// Matches of the new rule are enqueued immediately.
    #[must_use]
    pub fn add_rule(&self, rule: Rule) -> Self {
        let existing = self.rules.position(|r| r.name() == rule.name());
        let (rules, agenda) = match existing.and_then(|i| {
            let agenda = self.agenda.without_rule(rule.name());
            self.rules.update(i, rule.clone()).map(|rules| (rules, agenda))
        }) {
            Some(replaced) => replaced,
            None => (self.rules.push_back(rule), self.agenda.clone()),
        };
        Self {
            rules,
            agenda,
            ..self.clone()
        }
        .refreshed()
    }

    /// Removes a rule and its pending activations.
    ///
    /// Removing an unknown rule returns an identical session.
    #[must_use]
    pub fn remove_rule(&self, name: &str) -> Self {
        let name = Keyword::bare(name);
        let Some(index) = self.rules.position(|r| r.name().name() == name) else {
            return self.clone();
        };
        let Some((rules, removed)) = self.rules.remove(index) else {
            return self.clone();
        };
        Self {
            rules,
            agenda: self.agenda.without_rule(removed.name()),
            ..self.clone()
        }
    }

    /// Looks up a rule by name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        let name = Keyword::bare(name);
        self.rules.iter().find(|r| r.name().name() == name)
    }

    /// Returns true if a rule with this name is present.
    #[must_use]
    pub fn has_rule(&self, name: &str) -> bool {
        self.rule(name).is_some()
    }

    /// Rule names in registration order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<Keyword> {
        self.rules.iter().map(|r| r.name().clone()).collect()
    }

    /// Iterates rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    // -------------------------------------------------------------------------
    // Facts
    // -------------------------------------------------------------------------

    /// Inserts or updates the fact for `(entity, attribute)`.
    #[must_use]
    pub fn insert_fact(
        &self,
        entity: EntityId,
        attribute: impl Into<Keyword>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            facts: self.facts.insert(entity, attribute.into(), value.into()),
            ..self.clone()
        }
        .refreshed()
    }

    /// Inserts many facts in order, reconciling the agenda once at the end.
    #[must_use]
    pub fn insert_facts<I>(&self, facts: I) -> Self
    where
        I: IntoIterator<Item = Fact>,
    {
        let store = facts.into_iter().fold(self.facts.clone(), |store, fact| {
            store.insert(fact.entity, fact.attribute, fact.value)
        });
        Self {
            facts: store,
            ..self.clone()
        }
        .refreshed()
    }

    /// Retracts the fact for `(entity, attribute)` if present.
    #[must_use]
    pub fn retract_fact(&self, entity: EntityId, attribute: &str) -> Self {
        let attribute = Keyword::new(attribute);
        if !self.facts.contains(entity, &attribute) {
            return self.clone();
        }
        Self {
            facts: self.facts.retract(entity, &attribute),
            ..self.clone()
        }
        .refreshed()
    }

    /// Returns true if a fact exists for `(entity, attribute)`.
    #[must_use]
    pub fn has_fact(&self, entity: EntityId, attribute: &str) -> bool {
        self.facts.contains(entity, &Keyword::new(attribute))
    }

    /// Returns the value of the fact for `(entity, attribute)`.
    #[must_use]
    pub fn fact(&self, entity: EntityId, attribute: &str) -> Option<&Value> {
        self.facts.get(entity, &Keyword::new(attribute))
    }

    /// Every current fact, in first-insertion order.
    #[must_use]
    pub fn enumerate_facts(&self) -> Vec<Fact> {
        self.facts.iter().collect()
    }

    /// Number of facts.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Returns the underlying fact store.
    #[must_use]
    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    // -------------------------------------------------------------------------
    // Matches and agenda
    // -------------------------------------------------------------------------

    /// All current matches of a rule (guard applied), in deterministic order.
    ///
    /// Unknown rules have no matches.
    #[must_use]
    pub fn query_matches(&self, rule: &str) -> Vec<Bindings> {
        self.rule(rule)
            .map(|r| self.matches_of(r))
            .unwrap_or_default()
    }

    fn matches_of(&self, rule: &Rule) -> Vec<Bindings> {
        let mut matches = PatternMatcher::match_pattern(rule.pattern(), &self.facts);
        matches.retain(|b| rule.accepts(b));
        matches
    }

    /// Pending activations in enqueue order.
    #[must_use]
    pub fn pending_activations(&self) -> Vec<Activation> {
        self.agenda.iter().cloned().collect()
    }

    /// Returns the agenda.
    #[must_use]
    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    /// Activations fired so far, oldest first.
    #[must_use]
    pub fn fired(&self) -> &PVec<FiringRecord> {
        &self.fired
    }

    /// Names of the rules fired so far, oldest first.
    #[must_use]
    pub fn fired_rules(&self) -> Vec<Keyword> {
        self.fired.iter().map(|r| r.rule.clone()).collect()
    }

    /// Returns a session with the firing history cleared.
    #[must_use]
    pub fn clear_fired(&self) -> Self {
        Self {
            fired: PVec::new(),
            ..self.clone()
        }
    }

    fn refreshed(self) -> Self {
        let current: Vec<(Keyword, Bindings)> = self
            .rules
            .iter()
            .flat_map(|rule| {
                self.matches_of(rule)
                    .into_iter()
                    .map(move |b| (rule.name().clone(), b))
            })
            .collect();
        Self {
            agenda: self.agenda.refresh(&current),
            ..self
        }
    }

    // -------------------------------------------------------------------------
    // Run cycle
    // -------------------------------------------------------------------------

    /// Fires pending activations in enqueue order until none remain.
    ///
    /// # Errors
    /// Propagates the first action failure, or a limit error if
    /// [`EngineConfig::max_activations`] is set and exceeded.
    pub fn run_native_cycle(&self) -> Result<Self> {
        self.run_native_cycle_with(&FifoResolver)
    }

    /// Fires pending activations in the order chosen by `resolver` until none
    /// remain. The resolver is consulted before every pop, so activations
    /// enqueued by an action compete with those already waiting.
    ///
    /// # Errors
    /// Propagates the first action failure, or a limit error if
    /// [`EngineConfig::max_activations`] is set and exceeded.
    pub fn run_native_cycle_with(&self, resolver: &dyn ConflictResolver) -> Result<Self> {
        let mut session = self.clone();
        let mut count = 0usize;

        while let Some(activation) = session.agenda.next(resolver) {
            if let Some(limit) = session.config.max_activations {
                if count >= limit {
                    return Err(Error::limit_exceeded(SemanticLimit::MaxActivations {
                        limit,
                        rule: Some(activation.rule.name().to_string()),
                    }));
                }
            }
            count += 1;
            session = session.fire(&activation)?;
        }

        Ok(session)
    }

    fn fire(&self, activation: &Activation) -> Result<Self> {
        let rule = self.rule(activation.rule.name()).cloned().ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!(
                "activation for unknown rule {}",
                activation.rule
            )))
        })?;
        let agenda = self.agenda.take(activation).ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!(
                "activation for {} is not pending",
                activation.rule
            )))
        })?;

        trace!(rule = %activation.rule, seq = activation.seq, "firing activation");

        let before = Self {
            agenda,
            fired: self.fired.push_back(FiringRecord {
                rule: activation.rule.clone(),
                bindings: activation.bindings.clone(),
                seq: activation.seq,
            }),
            ..self.clone()
        };

        let after = rule
            .execute(&before, &activation.bindings)
            .map_err(|e| e.with_frame(format!("rule {}", activation.rule)))?;
        Ok(after.refreshed())
    }
}

// =============================================================================
// Tests
// =============================================================================
