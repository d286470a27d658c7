//! Accumulators: fold a rule's matches into a single result.
//!
//! An accumulator is three pure functions: [`init`](Accumulator::init)
//! builds the starting state, [`step`](Accumulator::step) folds one match
//! into it, and [`finish`](Accumulator::finish) turns the final state into
//! the result. Folding always runs left to right over matches in the order
//! the engine reports them.
//!
//! Every built-in handles an empty match set without failing: `count` and
//! `sum` report zero, `avg`/`min`/`max`/`first`/`last`/`variance`/`std_dev`
//! report `None`, and the collecting accumulators report an empty container.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use cadence_engine::{Bindings, MatchSource};
use cadence_foundation::{PMap, PSet, Value};

// =============================================================================
// Accumulator Trait
// =============================================================================

/// A fold over rule matches.
pub trait Accumulator {
    /// Intermediate fold state.
    type State;
    /// Final result.
    type Output: Into<Value>;

    /// Returns the starting state.
    fn init(&self) -> Self::State;

    /// Folds one match into the state.
    fn step(&self, state: Self::State, bindings: &Bindings) -> Self::State;

    /// Produces the result. Must depend only on `state`.
    fn finish(&self, state: Self::State) -> Self::Output;
}

/// Folds `matches` through `acc`, left to right.
pub fn fold<'a, A, I>(acc: &A, matches: I) -> A::Output
where
    A: Accumulator + ?Sized,
    I: IntoIterator<Item = &'a Bindings>,
{
    let state = matches
        .into_iter()
        .fold(acc.init(), |state, bindings| acc.step(state, bindings));
    acc.finish(state)
}

/// Runs `acc` over the current matches of `rule`.
///
/// Unknown rules and rules without matches fold nothing and yield the
/// accumulator's empty result.
pub fn accumulate<S, A>(source: &S, rule: &str, acc: &A) -> A::Output
where
    S: MatchSource + ?Sized,
    A: Accumulator + ?Sized,
{
    fold(acc, &source.query_matches(rule))
}

// =============================================================================
// Extractors
// =============================================================================

type ExtractFn = dyn Fn(&Bindings) -> Option<Value> + Send + Sync;

/// Pulls the value an accumulator works on out of a match.
///
/// Matches for which the extractor yields nothing (unbound variable, or a
/// bound `nil`) are skipped by the accumulator.
#[derive(Clone)]
pub enum Extract {
    /// The value bound to a pattern variable.
    Var(String),
    /// A computed value.
    With(Arc<ExtractFn>),
}

impl Extract {
    /// Extracts a pattern variable (`"hp"` or `"?hp"`).
    #[must_use]
    pub fn var(name: &str) -> Self {
        Self::Var(name.trim_start_matches('?').to_string())
    }

    /// Extracts a computed value.
    #[must_use]
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(&Bindings) -> Option<Value> + Send + Sync + 'static,
    {
        Self::With(Arc::new(f))
    }

    /// Applies the extractor to a match.
    #[must_use]
    pub fn apply(&self, bindings: &Bindings) -> Option<Value> {
        let value = match self {
            Self::Var(name) => bindings.get(name).cloned(),
            Self::With(f) => f(bindings),
        };
        value.filter(|v| !v.is_nil())
    }

    fn number(&self, bindings: &Bindings) -> Option<f64> {
        self.apply(bindings).as_ref().and_then(Value::as_number)
    }
}

impl From<&str> for Extract {
    fn from(name: &str) -> Self {
        Self::var(name)
    }
}

impl From<String> for Extract {
    fn from(name: String) -> Self {
        Self::var(&name)
    }
}

impl fmt::Debug for Extract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(name) => write!(f, "Extract(?{name})"),
            Self::With(_) => f.write_str("Extract(<fn>)"),
        }
    }
}

// =============================================================================
// Built-ins
// =============================================================================

/// Counts matches.
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

/// Counts every match.
#[must_use]
pub fn count() -> Count {
    Count
}

impl Accumulator for Count {
    type State = i64;
    type Output = i64;

    fn init(&self) -> i64 {
        0
    }

    fn step(&self, state: i64, _: &Bindings) -> i64 {
        state.saturating_add(1)
    }

    fn finish(&self, state: i64) -> i64 {
        state
    }
}

/// Sums a numeric value.
#[derive(Clone, Debug)]
pub struct Sum {
    key: Extract,
}

/// Sums `key` over all matches.
///
/// The result stays an `Int` while every input is an integer (and the total
/// fits in an `i64`), and becomes a `Float` otherwise. Zero matches sum to
/// `Int(0)`.
#[must_use]
pub fn sum(key: impl Into<Extract>) -> Sum {
    Sum { key: key.into() }
}

/// Running total for [`Sum`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SumState {
    /// Exact integer total.
    Int(i64),
    /// Floating total.
    Float(f64),
}

impl Accumulator for Sum {
    type State = SumState;
    type Output = Value;

    fn init(&self) -> SumState {
        SumState::Int(0)
    }

    #[allow(clippy::cast_precision_loss)]
    fn step(&self, state: SumState, bindings: &Bindings) -> SumState {
        let Some(value) = self.key.apply(bindings) else {
            return state;
        };
        match (state, value) {
            (SumState::Int(total), Value::Int(n)) => match total.checked_add(n) {
                Some(total) => SumState::Int(total),
                None => SumState::Float(total as f64 + n as f64),
            },
            (SumState::Int(total), Value::Float(x)) => SumState::Float(total as f64 + x),
            (SumState::Float(total), v) => match v.as_number() {
                Some(x) => SumState::Float(total + x),
                None => state,
            },
            (SumState::Int(_), _) => state,
        }
    }

    fn finish(&self, state: SumState) -> Value {
        match state {
            SumState::Int(n) => Value::Int(n),
            SumState::Float(x) => Value::Float(x),
        }
    }
}

/// Arithmetic mean of a numeric value.
#[derive(Clone, Debug)]
pub struct Avg {
    key: Extract,
}

/// Averages `key`. `None` when no match carries a number.
#[must_use]
pub fn avg(key: impl Into<Extract>) -> Avg {
    Avg { key: key.into() }
}

impl Accumulator for Avg {
    /// Running `(sum, count)`; division happens once in `finish`.
    type State = (f64, u64);
    type Output = Option<f64>;

    fn init(&self) -> (f64, u64) {
        (0.0, 0)
    }

    fn step(&self, (total, n): (f64, u64), bindings: &Bindings) -> (f64, u64) {
        match self.key.number(bindings) {
            Some(x) => (total + x, n + 1),
            None => (total, n),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, (total, n): (f64, u64)) -> Option<f64> {
        (n > 0).then(|| total / n as f64)
    }
}

/// Smallest or largest extracted value.
#[derive(Clone, Debug)]
pub struct Extreme {
    key: Extract,
    keep_larger: bool,
}

/// Smallest value of `key`. `None` when nothing was extracted.
///
/// Values are ordered by [`Value::sort_cmp`]; NaN is skipped.
#[must_use]
pub fn min(key: impl Into<Extract>) -> Extreme {
    Extreme {
        key: key.into(),
        keep_larger: false,
    }
}

/// Largest value of `key`. `None` when nothing was extracted.
#[must_use]
pub fn max(key: impl Into<Extract>) -> Extreme {
    Extreme {
        key: key.into(),
        keep_larger: true,
    }
}

impl Accumulator for Extreme {
    type State = Option<Value>;
    type Output = Option<Value>;

    fn init(&self) -> Option<Value> {
        None
    }

    fn step(&self, state: Option<Value>, bindings: &Bindings) -> Option<Value> {
        let Some(candidate) = self.key.apply(bindings).filter(|v| !v.is_nan()) else {
            return state;
        };
        match state {
            None => Some(candidate),
            Some(current) => {
                let wanted = if self.keep_larger {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
                let replace = candidate.sort_cmp(&current) == wanted;
                Some(if replace { candidate } else { current })
            }
        }
    }

    fn finish(&self, state: Option<Value>) -> Option<Value> {
        state
    }
}

/// First or last extracted value in match order.
#[derive(Clone, Debug)]
pub struct Pick {
    key: Extract,
    last: bool,
}

/// Value of `key` in the first match that has one.
#[must_use]
pub fn first(key: impl Into<Extract>) -> Pick {
    Pick {
        key: key.into(),
        last: false,
    }
}

/// Value of `key` in the last match that has one.
#[must_use]
pub fn last(key: impl Into<Extract>) -> Pick {
    Pick {
        key: key.into(),
        last: true,
    }
}

impl Accumulator for Pick {
    type State = Option<Value>;
    type Output = Option<Value>;

    fn init(&self) -> Option<Value> {
        None
    }

    fn step(&self, state: Option<Value>, bindings: &Bindings) -> Option<Value> {
        if state.is_some() && !self.last {
            return state;
        }
        self.key.apply(bindings).or(state)
    }

    fn finish(&self, state: Option<Value>) -> Option<Value> {
        state
    }
}

/// Collects extracted values in match order.
#[derive(Clone, Debug)]
pub struct Collect {
    key: Extract,
}

/// Every value of `key`, duplicates kept.
#[must_use]
pub fn collect(key: impl Into<Extract>) -> Collect {
    Collect { key: key.into() }
}

impl Accumulator for Collect {
    type State = Vec<Value>;
    type Output = Vec<Value>;

    fn init(&self) -> Vec<Value> {
        Vec::new()
    }

    fn step(&self, mut state: Vec<Value>, bindings: &Bindings) -> Vec<Value> {
        state.extend(self.key.apply(bindings));
        state
    }

    fn finish(&self, state: Vec<Value>) -> Vec<Value> {
        state
    }
}

/// Collects distinct extracted values.
#[derive(Clone, Debug)]
pub struct CollectSet {
    key: Extract,
}

/// The set of values of `key`.
#[must_use]
pub fn collect_set(key: impl Into<Extract>) -> CollectSet {
    CollectSet { key: key.into() }
}

impl Accumulator for CollectSet {
    type State = PSet<Value>;
    type Output = PSet<Value>;

    fn init(&self) -> PSet<Value> {
        PSet::new()
    }

    fn step(&self, state: PSet<Value>, bindings: &Bindings) -> PSet<Value> {
        match self.key.apply(bindings) {
            Some(v) => state.insert(v),
            None => state,
        }
    }

    fn finish(&self, state: PSet<Value>) -> PSet<Value> {
        state
    }
}

/// Number of distinct extracted values.
#[derive(Clone, Debug)]
pub struct DistinctCount {
    key: Extract,
}

/// Counts distinct values of `key`.
#[must_use]
pub fn distinct_count(key: impl Into<Extract>) -> DistinctCount {
    DistinctCount { key: key.into() }
}

impl Accumulator for DistinctCount {
    type State = HashSet<Value>;
    type Output = i64;

    fn init(&self) -> HashSet<Value> {
        HashSet::new()
    }

    fn step(&self, mut state: HashSet<Value>, bindings: &Bindings) -> HashSet<Value> {
        state.extend(self.key.apply(bindings));
        state
    }

    fn finish(&self, state: HashSet<Value>) -> i64 {
        i64::try_from(state.len()).unwrap_or(i64::MAX)
    }
}

// =============================================================================
// Grouping
// =============================================================================

/// Groups of values keyed by a group value, in first-seen group order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Groups {
    entries: Vec<(Value, Vec<Value>)>,
    index: HashMap<Value, usize>,
}

impl Groups {
    /// Values collected under `key`, in match order.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&[Value]> {
        self.index.get(key).map(|&i| self.entries[i].1.as_slice())
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// `(key, values)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &[Value])> {
        self.entries.iter().map(|(k, vs)| (k, vs.as_slice()))
    }

    /// Consumes the groups into `(key, values)` pairs.
    #[must_use]
    pub fn into_entries(self) -> Vec<(Value, Vec<Value>)> {
        self.entries
    }

    fn push(mut self, key: Value, value: Value) -> Self {
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].1.push(value);
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, vec![value]));
        }
        self
    }
}

/// Groups become a map from group key to the vector of its values.
impl From<Groups> for Value {
    fn from(groups: Groups) -> Self {
        let map: PMap<Value, Value> = groups
            .entries
            .into_iter()
            .map(|(k, vs)| (k, Value::from(vs)))
            .collect();
        Value::Map(map)
    }
}

/// Groups extracted values by an extracted key.
#[derive(Clone, Debug)]
pub struct GroupBy {
    key: Extract,
    value: Extract,
}

/// Groups the values of `value` by the value of `key`.
///
/// Matches missing either one are skipped.
#[must_use]
pub fn group_by(key: impl Into<Extract>, value: impl Into<Extract>) -> GroupBy {
    GroupBy {
        key: key.into(),
        value: value.into(),
    }
}

impl Accumulator for GroupBy {
    type State = Groups;
    type Output = Groups;

    fn init(&self) -> Groups {
        Groups::default()
    }

    fn step(&self, state: Groups, bindings: &Bindings) -> Groups {
        match (self.key.apply(bindings), self.value.apply(bindings)) {
            (Some(k), Some(v)) => state.push(k, v),
            _ => state,
        }
    }

    fn finish(&self, state: Groups) -> Groups {
        state
    }
}

// =============================================================================
// Ranking
// =============================================================================

/// The `n` best matches by an extracted key.
#[derive(Clone, Debug)]
pub struct Ranked {
    n: usize,
    key: Extract,
    descending: bool,
}

/// The `n` matches with the largest `key`, largest first.
///
/// Keys are ordered by [`Value::sort_cmp`]; matches whose key is NaN are
/// skipped. Ties keep match order.
#[must_use]
pub fn top_n(n: usize, key: impl Into<Extract>) -> Ranked {
    Ranked {
        n,
        key: key.into(),
        descending: true,
    }
}

/// The `n` matches with the smallest `key`, smallest first.
///
/// Ordering and NaN handling are those of [`top_n`].
#[must_use]
pub fn bottom_n(n: usize, key: impl Into<Extract>) -> Ranked {
    Ranked {
        n,
        key: key.into(),
        descending: false,
    }
}

impl Accumulator for Ranked {
    /// Best candidates so far, already sorted and truncated.
    type State = Vec<(Value, Bindings)>;
    type Output = Vec<Bindings>;

    fn init(&self) -> Self::State {
        Vec::new()
    }

    fn step(&self, mut state: Self::State, bindings: &Bindings) -> Self::State {
        let Some(key) = self.key.apply(bindings).filter(|v| !v.is_nan()) else {
            return state;
        };
        state.push((key, bindings.clone()));
        // Stable: equal keys stay in match order.
        if self.descending {
            state.sort_by(|(a, _), (b, _)| b.sort_cmp(a));
        } else {
            state.sort_by(|(a, _), (b, _)| a.sort_cmp(b));
        }
        state.truncate(self.n);
        state
    }

    fn finish(&self, state: Self::State) -> Vec<Bindings> {
        state.into_iter().map(|(_, b)| b).collect()
    }
}

// =============================================================================
// Dispersion
// =============================================================================

/// Running `(Σx, Σx², count)`.
pub type Moments = (f64, f64, u64);

fn step_moments(key: &Extract, (s, sq, n): Moments, bindings: &Bindings) -> Moments {
    match key.number(bindings) {
        Some(x) => (s + x, sq + x * x, n + 1),
        None => (s, sq, n),
    }
}

#[allow(clippy::cast_precision_loss)]
fn population_variance((s, sq, n): Moments) -> Option<f64> {
    if n == 0 {
        return None;
    }
    let n = n as f64;
    let mean = s / n;
    // Rounding can push E[x²] - E[x]² slightly below zero.
    Some((sq / n - mean * mean).max(0.0))
}

/// Population variance of a numeric value.
#[derive(Clone, Debug)]
pub struct Variance {
    key: Extract,
}

/// Population variance of `key`. `None` when nothing was extracted.
#[must_use]
pub fn variance(key: impl Into<Extract>) -> Variance {
    Variance { key: key.into() }
}

impl Accumulator for Variance {
    type State = Moments;
    type Output = Option<f64>;

    fn init(&self) -> Moments {
        (0.0, 0.0, 0)
    }

    fn step(&self, state: Moments, bindings: &Bindings) -> Moments {
        step_moments(&self.key, state, bindings)
    }

    fn finish(&self, state: Moments) -> Option<f64> {
        population_variance(state)
    }
}

/// Population standard deviation of a numeric value.
#[derive(Clone, Debug)]
pub struct StdDev {
    key: Extract,
}

/// Population standard deviation of `key`. `None` when nothing was
/// extracted.
#[must_use]
pub fn std_dev(key: impl Into<Extract>) -> StdDev {
    StdDev { key: key.into() }
}

impl Accumulator for StdDev {
    type State = Moments;
    type Output = Option<f64>;

    fn init(&self) -> Moments {
        (0.0, 0.0, 0)
    }

    fn step(&self, state: Moments, bindings: &Bindings) -> Moments {
        step_moments(&self.key, state, bindings)
    }

    fn finish(&self, state: Moments) -> Option<f64> {
        population_variance(state).map(f64::sqrt)
    }
}

// =============================================================================
// Custom
// =============================================================================

/// An accumulator assembled from three closures.
#[derive(Clone)]
pub struct Custom<I, S, F> {
    init: I,
    step: S,
    finish: F,
}

/// Builds an accumulator from `init`, `step`, and `finish`.
///
/// ```
/// use cadence_aggregate::accumulator::{custom, fold};
/// use cadence_engine::Bindings;
///
/// let longest = custom(
///     || 0usize,
///     |best, b: &Bindings| best.max(b.get("name").and_then(|v| v.as_str()).map_or(0, str::len)),
///     |best| i64::try_from(best).unwrap_or(i64::MAX),
/// );
/// let matches = vec![
///     Bindings::new().with("name", "ada"),
///     Bindings::new().with("name", "grace"),
/// ];
/// assert_eq!(fold(&longest, &matches), 5);
/// ```
pub fn custom<St, Out, I, S, F>(init: I, step: S, finish: F) -> Custom<I, S, F>
where
    I: Fn() -> St,
    S: Fn(St, &Bindings) -> St,
    F: Fn(St) -> Out,
    Out: Into<Value>,
{
    Custom { init, step, finish }
}

impl<St, Out, I, S, F> Accumulator for Custom<I, S, F>
where
    I: Fn() -> St,
    S: Fn(St, &Bindings) -> St,
    F: Fn(St) -> Out,
    Out: Into<Value>,
{
    type State = St;
    type Output = Out;

    fn init(&self) -> St {
        (self.init)()
    }

    fn step(&self, state: St, bindings: &Bindings) -> St {
        (self.step)(state, bindings)
    }

    fn finish(&self, state: St) -> Out {
        (self.finish)(state)
    }
}

impl<I, S, F> fmt::Debug for Custom<I, S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Custom")
    }
}

// =============================================================================
// Accumulator Sets
// =============================================================================

/// Type-erased accumulator producing a [`Value`].
trait ErasedAccumulator {
    fn run(&self, matches: &[Bindings]) -> Value;
}

impl<A: Accumulator> ErasedAccumulator for A {
    fn run(&self, matches: &[Bindings]) -> Value {
        fold(self, matches).into()
    }
}

/// Named accumulators evaluated together by [`accumulate_all`].
#[derive(Default)]
pub struct AccumulatorSet {
    entries: Vec<(String, Box<dyn ErasedAccumulator>)>,
}

impl AccumulatorSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an accumulator under `key`, replacing any previous one.
    #[must_use]
    pub fn with<A>(mut self, key: impl Into<String>, acc: A) -> Self
    where
        A: Accumulator + 'static,
    {
        let key = key.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, Box::new(acc)));
        self
    }

    /// Number of accumulators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Result keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Runs every accumulator over the same matches.
    #[must_use]
    pub fn run(&self, matches: &[Bindings]) -> HashMap<String, Value> {
        self.entries
            .iter()
            .map(|(key, acc)| (key.clone(), acc.run(matches)))
            .collect()
    }
}

impl fmt::Debug for AccumulatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// Runs every accumulator in `set` independently over the current matches
/// of `rule`, queried once.
pub fn accumulate_all<S>(source: &S, rule: &str, set: &AccumulatorSet) -> HashMap<String, Value>
where
    S: MatchSource + ?Sized,
{
    set.run(&source.query_matches(rule))
}

// =============================================================================
// Tests
// =============================================================================
