//! Rule definitions.
//!
//! A rule is a named production: a [`Pattern`], an optional guard over the
//! resulting bindings, and an action that maps the current session to a new
//! one. Rules carry a small metadata map for tags that other layers attach
//! (priority, module membership) without the engine interpreting them.

use std::fmt;
use std::sync::Arc;

use cadence_foundation::{Keyword, PMap, Result, Value};

use crate::pattern::{Bindings, Clause, Pattern, Term};
use crate::session::Session;

/// Guard predicate evaluated against each candidate match.
pub type GuardFn = dyn Fn(&Bindings) -> bool + Send + Sync;

/// Rule action: receives the session (with the firing activation already
/// removed from the agenda) and the match, returns the next session.
pub type ActionFn = dyn Fn(&Session, &Bindings) -> Result<Session> + Send + Sync;

// =============================================================================
// Rule
// =============================================================================

/// A named production rule.
///
/// Cloning is cheap: guard and action are shared.
#[derive(Clone)]
pub struct Rule {
    name: Keyword,
    pattern: Pattern,
    guard: Option<Arc<GuardFn>>,
    action: Arc<ActionFn>,
    meta: PMap<Keyword, Value>,
}

impl Rule {
    /// Starts building a rule.
    #[must_use]
    pub fn builder(name: impl Into<Keyword>) -> RuleBuilder {
        RuleBuilder::new(name.into())
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &Keyword {
        &self.name
    }

    /// Returns the rule pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns true if the rule has a guard.
    #[must_use]
    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }

    /// Evaluates the guard (rules without one accept every match).
    #[must_use]
    pub fn accepts(&self, bindings: &Bindings) -> bool {
        self.guard.as_ref().is_none_or(|guard| guard(bindings))
    }

    /// Runs the action.
    ///
    /// # Errors
    /// Returns whatever error the action reports.
    pub fn execute(&self, session: &Session, bindings: &Bindings) -> Result<Session> {
        (self.action)(session, bindings)
    }

    /// Reads a metadata tag.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(Keyword::bare(key))
    }

    /// Returns a copy of this rule with a metadata tag set.
    ///
    /// The receiver is left unchanged.
    #[must_use]
    pub fn with_meta(&self, key: impl Into<Keyword>, value: impl Into<Value>) -> Self {
        Self {
            meta: self.meta.insert(key.into(), value.into()),
            ..self.clone()
        }
    }

    /// Returns a copy of this rule without the metadata tag.
    #[must_use]
    pub fn without_meta(&self, key: &str) -> Self {
        Self {
            meta: self.meta.remove(Keyword::bare(key)),
            ..self.clone()
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("guard", &self.guard.is_some())
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Rule Builder
// =============================================================================

/// Builds a [`Rule`] from clauses, a guard, and an action.
///
/// ```
/// use cadence_engine::{Rule, Session};
///
/// let rule = Rule::builder("regen")
///     .when("?e", "health", "?hp")
///     .unless("?e", "dead", "_")
///     .guard(|b| b.get_int("hp").is_some_and(|hp| hp < 100))
///     .then(|session, b| {
///         let e = b.get_entity("e").expect("bound by pattern");
///         let hp = b.get_int("hp").unwrap_or(0);
///         Ok(session.insert_fact(e, "health", hp + 1))
///     });
/// assert_eq!(rule.name().name(), "regen");
/// ```
pub struct RuleBuilder {
    name: Keyword,
    pattern: Pattern,
    guard: Option<Arc<GuardFn>>,
    meta: PMap<Keyword, Value>,
}

impl RuleBuilder {
    fn new(name: Keyword) -> Self {
        Self {
            name,
            pattern: Pattern::new(),
            guard: None,
            meta: PMap::new(),
        }
    }

    /// Adds a positive clause `[entity attribute value]`.
    #[must_use]
    pub fn when(
        mut self,
        entity: impl Into<Term>,
        attribute: impl Into<Keyword>,
        value: impl Into<Term>,
    ) -> Self {
        self.pattern = self.pattern.with_clause(Clause::new(entity, attribute, value));
        self
    }

    /// Adds a negated clause: the rule matches only if no such fact exists.
    #[must_use]
    pub fn unless(
        mut self,
        entity: impl Into<Term>,
        attribute: impl Into<Keyword>,
        value: impl Into<Term>,
    ) -> Self {
        self.pattern = self
            .pattern
            .with_negation(Clause::new(entity, attribute, value));
        self
    }

    /// Replaces the whole pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Sets the guard predicate.
    #[must_use]
    pub fn guard<G>(mut self, guard: G) -> Self
    where
        G: Fn(&Bindings) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    /// Sets a metadata tag.
    #[must_use]
    pub fn meta(mut self, key: impl Into<Keyword>, value: impl Into<Value>) -> Self {
        self.meta = self.meta.insert(key.into(), value.into());
        self
    }

    /// Finishes the rule with the given action.
    #[must_use]
    pub fn then<A>(self, action: A) -> Rule
    where
        A: Fn(&Session, &Bindings) -> Result<Session> + Send + Sync + 'static,
    {
        Rule {
            name: self.name,
            pattern: self.pattern,
            guard: self.guard,
            action: Arc::new(action),
            meta: self.meta,
        }
    }

    /// Finishes the rule with an action that leaves the session unchanged.
    #[must_use]
    pub fn build(self) -> Rule {
        self.then(|session, _| Ok(session.clone()))
    }
}
