//! The agenda: pending activations awaiting execution.
//!
//! The agenda is logically a set of `(rule, match)` pairs. Each activation
//! remembers its enqueue index so conflict resolvers can break ties by
//! arrival order. A pair that has fired is refracted: it is not queued again
//! while its match persists, and becomes eligible again only after the
//! match disappears and reappears.

use cadence_foundation::{Keyword, PSet, PVec};

use crate::pattern::Bindings;

// =============================================================================
// Activation
// =============================================================================

/// A rule activation ready to fire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activation {
    /// Which rule
    pub rule: Keyword,
    /// Variable bindings from pattern match
    pub bindings: Bindings,
    /// Enqueue index (monotonic within a session)
    pub seq: u64,
}

impl Activation {
    /// Identity of the activation, ignoring when it was queued.
    #[must_use]
    pub fn key(&self) -> (Keyword, Bindings) {
        (self.rule.clone(), self.bindings.clone())
    }
}

/// Record of a fired activation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FiringRecord {
    /// Rule that fired
    pub rule: Keyword,
    /// Match it fired on
    pub bindings: Bindings,
    /// Enqueue index the activation carried
    pub seq: u64,
}

// =============================================================================
// Conflict Resolution
// =============================================================================

/// Decides the order pending activations fire in.
///
/// The native run-cycle calls [`order`](Self::order) before every pop, so
/// activations enqueued mid-cycle are placed by the same rule as the ones
/// that were already waiting. Implementations should sort stably.
pub trait ConflictResolver {
    /// Sorts `pending` into firing order (first element fires next).
    fn order(&self, pending: &mut [Activation]);
}

/// Fires activations in enqueue order.
#[derive(Clone, Copy, Debug, Default)]
pub struct FifoResolver;

impl ConflictResolver for FifoResolver {
    fn order(&self, pending: &mut [Activation]) {
        pending.sort_by_key(|a| a.seq);
    }
}

// =============================================================================
// Agenda
// =============================================================================

/// Persistent set of pending activations plus refraction memory.
#[derive(Clone, Debug, Default)]
pub struct Agenda {
    /// Pending activations in enqueue order
    pending: PVec<Activation>,
    /// Keys of pending activations (set membership)
    queued: PSet<(Keyword, Bindings)>,
    /// Keys that fired and still match
    refracted: PSet<(Keyword, Bindings)>,
    /// Next enqueue index
    next_seq: u64,
}

impl Agenda {
    /// Creates an empty agenda.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending activations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending activations in enqueue order.
    pub fn iter(&self) -> impl Iterator<Item = &Activation> {
        self.pending.iter()
    }

    /// Returns true if the pair is currently pending.
    #[must_use]
    pub fn is_pending(&self, rule: &Keyword, bindings: &Bindings) -> bool {
        self.queued.contains(&(rule.clone(), bindings.clone()))
    }

    /// Returns true if the pair has fired and is still refracted.
    #[must_use]
    pub fn is_refracted(&self, rule: &Keyword, bindings: &Bindings) -> bool {
        self.refracted.contains(&(rule.clone(), bindings.clone()))
    }

    /// Reconciles the agenda with the complete current match set.
    ///
    /// `current` lists every `(rule, match)` pair that holds right now, in
    /// rule-registration then match order. Pending pairs that no longer hold
    /// are dropped, refraction is forgotten for pairs that no longer hold,
    /// and pairs that are neither pending nor refracted are appended.
    #[must_use]
    pub fn refresh(&self, current: &[(Keyword, Bindings)]) -> Self {
        let live: PSet<(Keyword, Bindings)> = current.iter().cloned().collect();

        let mut pending = self.pending.retain(|a| live.contains(&a.key()));
        let mut queued = self.queued.intersection(&live);
        let refracted = self.refracted.intersection(&live);
        let mut next_seq = self.next_seq;

        for key in current {
            if queued.contains(key) || refracted.contains(key) {
                continue;
            }
            pending = pending.push_back(Activation {
                rule: key.0.clone(),
                bindings: key.1.clone(),
                seq: next_seq,
            });
            queued = queued.insert(key.clone());
            next_seq += 1;
        }

        Self {
            pending,
            queued,
            refracted,
            next_seq,
        }
    }

    /// Removes an activation and refracts it.
    ///
    /// Returns `None` if the activation is not pending.
    #[must_use]
    pub fn take(&self, activation: &Activation) -> Option<Self> {
        let key = activation.key();
        let index = self.pending.position(|a| a.key() == key)?;
        let (pending, _) = self.pending.remove(index)?;

        Some(Self {
            pending,
            queued: self.queued.remove(&key),
            refracted: self.refracted.insert(key),
            next_seq: self.next_seq,
        })
    }

    /// Drops every pending activation for a rule and its refraction memory.
    #[must_use]
    pub fn without_rule(&self, rule: &Keyword) -> Self {
        Self {
            pending: self.pending.retain(|a| &a.rule != rule),
            queued: self.queued.iter().filter(|(r, _)| r != rule).cloned().collect(),
            refracted: self
                .refracted
                .iter()
                .filter(|(r, _)| r != rule)
                .cloned()
                .collect(),
            next_seq: self.next_seq,
        }
    }

    /// Returns the activation `resolver` would fire next.
    #[must_use]
    pub fn next(&self, resolver: &dyn ConflictResolver) -> Option<Activation> {
        self.ordered(resolver).into_iter().next()
    }

    /// Returns all pending activations in the order `resolver` would fire them.
    #[must_use]
    pub fn ordered(&self, resolver: &dyn ConflictResolver) -> Vec<Activation> {
        let mut pending: Vec<Activation> = self.pending.iter().cloned().collect();
        resolver.order(&mut pending);
        pending
    }
}

// =============================================================================
// Tests
// =============================================================================
