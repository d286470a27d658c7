//! Read-only match queries.

use crate::pattern::Bindings;
use crate::session::Session;

/// Anything that can report the current matches of a named rule.
///
/// Aggregation is written against this trait so it works the same over a
/// bare [`Session`] and over wrappers that own one.
pub trait MatchSource {
    /// All current matches of `rule`, in deterministic order.
    ///
    /// Unknown rules yield an empty vector.
    fn query_matches(&self, rule: &str) -> Vec<Bindings>;
}

impl MatchSource for Session {
    fn query_matches(&self, rule: &str) -> Vec<Bindings> {
        Session::query_matches(self, rule)
    }
}

impl<T: MatchSource + ?Sized> MatchSource for &T {
    fn query_matches(&self, rule: &str) -> Vec<Bindings> {
        (**self).query_matches(rule)
    }
}
