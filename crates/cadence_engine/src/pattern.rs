//! Pattern matching for rule conditions.
//!
//! A pattern is a conjunction of clauses `[entity attribute value]` plus
//! negated clauses. Each satisfied combination of facts produces one
//! [`Bindings`] environment.

use std::fmt;

use cadence_foundation::{EntityId, Keyword, PMap, POrdMap, Value};

use crate::fact::FactStore;

// =============================================================================
// Pattern Types
// =============================================================================

/// One position of a clause.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// Bind to (or join on) a variable: `?hp`
    Var(String),
    /// Match a literal value.
    Const(Value),
    /// Ignore this position: `_`
    Wildcard,
}

impl Term {
    /// Creates a variable term. A leading `?` is optional.
    #[must_use]
    pub fn var(name: &str) -> Self {
        Self::Var(normalize_var(name).to_string())
    }

    /// Creates a literal term.
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Const(value.into())
    }
}

/// `"?x"` is a variable, `"_"` a wildcard, anything else a string literal.
impl From<&str> for Term {
    fn from(s: &str) -> Self {
        if s == "_" {
            Self::Wildcard
        } else if s.starts_with('?') {
            Self::var(s)
        } else {
            Self::Const(Value::from(s))
        }
    }
}

impl From<Value> for Term {
    fn from(v: Value) -> Self {
        Self::Const(v)
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Self::Const(Value::Int(n))
    }
}

impl From<i32> for Term {
    fn from(n: i32) -> Self {
        Self::Const(Value::from(n))
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Self::Const(Value::Bool(b))
    }
}

impl From<EntityId> for Term {
    fn from(id: EntityId) -> Self {
        Self::Const(Value::EntityRef(id))
    }
}

impl From<Keyword> for Term {
    fn from(kw: Keyword) -> Self {
        Self::Const(Value::Keyword(kw))
    }
}

/// A single clause: `[?e :health ?hp]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    /// Entity position
    pub entity: Term,
    /// Attribute to match
    pub attribute: Keyword,
    /// Value position
    pub value: Term,
}

impl Clause {
    /// Creates a clause.
    #[must_use]
    pub fn new(entity: impl Into<Term>, attribute: impl Into<Keyword>, value: impl Into<Term>) -> Self {
        Self {
            entity: entity.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// A pattern (positive clauses + negations).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pattern {
    /// Clauses that must all match, joined left to right
    pub clauses: Vec<Clause>,
    /// Clauses that must have no match under the positive bindings
    pub negations: Vec<Clause>,
}

impl Pattern {
    /// Create a new empty pattern.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a positive clause.
    #[must_use]
    pub fn with_clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Adds a negated clause.
    #[must_use]
    pub fn with_negation(mut self, clause: Clause) -> Self {
        self.negations.push(clause);
        self
    }

    /// Returns all variable names bound by positive clauses, in first-use order.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        let mut vars = Vec::new();
        for clause in &self.clauses {
            for term in [&clause.entity, &clause.value] {
                if let Term::Var(name) = term {
                    if !vars.contains(&name.as_str()) {
                        vars.push(name.as_str());
                    }
                }
            }
        }
        vars
    }
}

fn normalize_var(name: &str) -> &str {
    name.strip_prefix('?').unwrap_or(name)
}

// =============================================================================
// Bindings
// =============================================================================

/// An immutable variable-binding environment produced by one match.
///
/// Variable names are stored without the leading `?`; lookups accept
/// either spelling.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bindings {
    values: POrdMap<String, Value>,
}

impl Bindings {
    /// Create empty bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns new bindings with `var` bound to `value`.
    #[must_use]
    pub fn with(&self, var: &str, value: impl Into<Value>) -> Self {
        Self {
            values: self
                .values
                .insert(normalize_var(var).to_string(), value.into()),
        }
    }

    /// Get a binding by variable name.
    #[must_use]
    pub fn get(&self, var: &str) -> Option<&Value> {
        self.values.get(normalize_var(var))
    }

    /// Get the entity bound to a variable.
    #[must_use]
    pub fn get_entity(&self, var: &str) -> Option<EntityId> {
        self.get(var).and_then(Value::as_entity)
    }

    /// Get an integer bound to a variable.
    #[must_use]
    pub fn get_int(&self, var: &str) -> Option<i64> {
        self.get(var).and_then(Value::as_int)
    }

    /// Get a number (int or float) bound to a variable.
    #[must_use]
    pub fn get_number(&self, var: &str) -> Option<f64> {
        self.get(var).and_then(Value::as_number)
    }

    /// Returns true if the variable is bound.
    #[must_use]
    pub fn contains(&self, var: &str) -> bool {
        self.values.contains_key(normalize_var(var))
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate all bindings in variable-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.iter().map(|(k, v)| (format!("?{k}"), v)))
            .finish()
    }
}

impl<S: AsRef<str>, V: Into<Value>> FromIterator<(S, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |b, (k, v)| b.with(k.as_ref(), v))
    }
}

/// Bindings become a map from variable keyword to value.
impl From<Bindings> for Value {
    fn from(bindings: Bindings) -> Self {
        let map: PMap<Value, Value> = bindings
            .iter()
            .map(|(k, v)| (Value::Keyword(Keyword::new(k)), v.clone()))
            .collect();
        Value::Map(map)
    }
}

// =============================================================================
// Pattern Matching
// =============================================================================

/// Executes patterns against a [`FactStore`].
pub struct PatternMatcher;

impl PatternMatcher {
    /// Find all binding sets that satisfy a pattern.
    ///
    /// Results come out in fact-enumeration order, clause by clause, so the
    /// same store always yields the same sequence.
    #[must_use]
    pub fn match_pattern(pattern: &Pattern, facts: &FactStore) -> Vec<Bindings> {
        let mut partial = vec![Bindings::new()];

        for clause in &pattern.clauses {
            let mut next = Vec::new();
            for bindings in &partial {
                Self::extend(clause, facts, bindings, &mut next);
            }
            partial = next;
            if partial.is_empty() {
                return partial;
            }
        }

        partial.retain(|bindings| {
            pattern
                .negations
                .iter()
                .all(|clause| !Self::has_match(clause, facts, bindings))
        });
        partial
    }

    /// Returns true if any fact satisfies the clause under `bindings`.
    #[must_use]
    pub fn has_match(clause: &Clause, facts: &FactStore, bindings: &Bindings) -> bool {
        let mut out = Vec::new();
        Self::extend(clause, facts, bindings, &mut out);
        !out.is_empty()
    }

    fn extend(clause: &Clause, facts: &FactStore, bindings: &Bindings, out: &mut Vec<Bindings>) {
        match Self::resolve_entity(&clause.entity, bindings) {
            EntityLookup::Fixed(entity) => {
                if let Some(value) = facts.get(entity, &clause.attribute) {
                    if let Some(b) = Self::unify(clause, entity, value, bindings) {
                        out.push(b);
                    }
                }
            }
            EntityLookup::Scan => {
                for (entity, value) in facts.with_attribute(&clause.attribute) {
                    if let Some(b) = Self::unify(clause, entity, value, bindings) {
                        out.push(b);
                    }
                }
            }
            EntityLookup::Impossible => {}
        }
    }

    fn resolve_entity(term: &Term, bindings: &Bindings) -> EntityLookup {
        match term {
            Term::Var(name) => match bindings.get(name) {
                Some(Value::EntityRef(id)) => EntityLookup::Fixed(*id),
                Some(_) => EntityLookup::Impossible,
                None => EntityLookup::Scan,
            },
            Term::Const(Value::EntityRef(id)) => EntityLookup::Fixed(*id),
            Term::Const(_) => EntityLookup::Impossible,
            Term::Wildcard => EntityLookup::Scan,
        }
    }

    fn unify(clause: &Clause, entity: EntityId, value: &Value, bindings: &Bindings) -> Option<Bindings> {
        let bindings = Self::unify_term(&clause.entity, &Value::EntityRef(entity), bindings)?;
        Self::unify_term(&clause.value, value, &bindings)
    }

    fn unify_term(term: &Term, value: &Value, bindings: &Bindings) -> Option<Bindings> {
        match term {
            Term::Wildcard => Some(bindings.clone()),
            Term::Const(expected) => (expected == value).then(|| bindings.clone()),
            Term::Var(name) => match bindings.get(name) {
                Some(bound) => (bound == value).then(|| bindings.clone()),
                None => Some(bindings.with(name, value.clone())),
            },
        }
    }
}

enum EntityLookup {
    Fixed(EntityId),
    Scan,
    Impossible,
}

// =============================================================================
// Tests
// =============================================================================
