//! Quantified queries over a rule's current matches.
//!
//! Every function reads the matches through [`MatchSource`] and never
//! mutates anything. Optional predicates default to "any match": with
//! `None`, `count_where` is the total match count.
//!
//! Empty match sets are never an error:
//! - [`forall`] and [`unanimous`] are vacuously true.
//! - [`majority`] and [`minority`] are false.
//! - [`percentage_where`] is `0.0`.

use cadence_engine::{Bindings, MatchSource};

/// A predicate over one match.
pub type Predicate<'a> = &'a dyn Fn(&Bindings) -> bool;

fn count_in(matches: &[Bindings], pred: Option<Predicate<'_>>) -> usize {
    match pred {
        Some(pred) => matches.iter().filter(|&b| pred(b)).count(),
        None => matches.len(),
    }
}

/// `(satisfying, total)` for the current matches of `rule`.
fn tally<S>(source: &S, rule: &str, pred: Option<Predicate<'_>>) -> (usize, usize)
where
    S: MatchSource + ?Sized,
{
    let matches = source.query_matches(rule);
    (count_in(&matches, pred), matches.len())
}

// =============================================================================
// Basic Quantifiers
// =============================================================================

/// True iff at least one match satisfies `pred` (or any match exists).
pub fn exists<S>(source: &S, rule: &str, pred: Option<Predicate<'_>>) -> bool
where
    S: MatchSource + ?Sized,
{
    let matches = source.query_matches(rule);
    match pred {
        Some(pred) => matches.iter().any(pred),
        None => !matches.is_empty(),
    }
}

/// True iff every match satisfies `pred`.
///
/// Vacuously true when the rule has no matches. Combine with
/// [`exists_at_least`] to also require a non-empty match set.
pub fn forall<S>(source: &S, rule: &str, pred: Option<Predicate<'_>>) -> bool
where
    S: MatchSource + ?Sized,
{
    match pred {
        Some(pred) => source.query_matches(rule).iter().all(pred),
        None => true,
    }
}

/// True iff no match satisfies `pred`. The negation of [`exists`].
pub fn none<S>(source: &S, rule: &str, pred: Option<Predicate<'_>>) -> bool
where
    S: MatchSource + ?Sized,
{
    !exists(source, rule, pred)
}

/// Number of matches satisfying `pred` (all matches when `None`).
pub fn count_where<S>(source: &S, rule: &str, pred: Option<Predicate<'_>>) -> usize
where
    S: MatchSource + ?Sized,
{
    tally(source, rule, pred).0
}

// =============================================================================
// Comparisons
// =============================================================================

/// True iff exactly one match satisfies `pred`.
pub fn exists_exactly_one<S>(source: &S, rule: &str, pred: Option<Predicate<'_>>) -> bool
where
    S: MatchSource + ?Sized,
{
    count_where(source, rule, pred) == 1
}

/// True iff at least `n` matches satisfy `pred`.
pub fn exists_at_least<S>(source: &S, rule: &str, n: usize, pred: Option<Predicate<'_>>) -> bool
where
    S: MatchSource + ?Sized,
{
    count_where(source, rule, pred) >= n
}

/// True iff at most `n` matches satisfy `pred`.
pub fn exists_at_most<S>(source: &S, rule: &str, n: usize, pred: Option<Predicate<'_>>) -> bool
where
    S: MatchSource + ?Sized,
{
    count_where(source, rule, pred) <= n
}

/// True iff the number of matches satisfying `pred` lies in `lo..=hi`.
pub fn exists_between<S>(
    source: &S,
    rule: &str,
    lo: usize,
    hi: usize,
    pred: Option<Predicate<'_>>,
) -> bool
where
    S: MatchSource + ?Sized,
{
    (lo..=hi).contains(&count_where(source, rule, pred))
}

// =============================================================================
// Proportions
// =============================================================================

/// True iff strictly more than half of the matches satisfy `pred`.
///
/// Compared in integers (`2 * count > total`). False with no matches.
pub fn majority<S>(source: &S, rule: &str, pred: Option<Predicate<'_>>) -> bool
where
    S: MatchSource + ?Sized,
{
    let (count, total) = tally(source, rule, pred);
    total > 0 && count.saturating_mul(2) > total
}

/// True iff strictly fewer than half of the matches satisfy `pred`.
///
/// Compared in integers (`2 * count < total`). False with no matches.
pub fn minority<S>(source: &S, rule: &str, pred: Option<Predicate<'_>>) -> bool
where
    S: MatchSource + ?Sized,
{
    let (count, total) = tally(source, rule, pred);
    total > 0 && count.saturating_mul(2) < total
}

/// Same as [`forall`], including being true when there are no matches.
pub fn unanimous<S>(source: &S, rule: &str, pred: Option<Predicate<'_>>) -> bool
where
    S: MatchSource + ?Sized,
{
    forall(source, rule, pred)
}

/// Percentage of matches satisfying `pred`, in `[0.0, 100.0]`.
///
/// Defined as `0.0` when the rule has no matches. That value is a
/// convention chosen so the function is total, not a limit of the ratio.
#[allow(clippy::cast_precision_loss)]
pub fn percentage_where<S>(source: &S, rule: &str, pred: Option<Predicate<'_>>) -> f64
where
    S: MatchSource + ?Sized,
{
    let (count, total) = tally(source, rule, pred);
    if total == 0 {
        return 0.0;
    }
    (100.0 * count as f64 / total as f64).clamp(0.0, 100.0)
}

// =============================================================================
// Relative
// =============================================================================

/// True iff more matches satisfy `first` than `second`.
pub fn exists_more_than<S>(source: &S, rule: &str, first: Predicate<'_>, second: Predicate<'_>) -> bool
where
    S: MatchSource + ?Sized,
{
    let matches = source.query_matches(rule);
    count_in(&matches, Some(first)) > count_in(&matches, Some(second))
}

/// True iff fewer matches satisfy `first` than `second`.
pub fn exists_fewer_than<S>(source: &S, rule: &str, first: Predicate<'_>, second: Predicate<'_>) -> bool
where
    S: MatchSource + ?Sized,
{
    let matches = source.query_matches(rule);
    count_in(&matches, Some(first)) < count_in(&matches, Some(second))
}
