//! Keyword atoms for attribute and rule names.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named atom such as `:health` or `:rules/regen`.
///
/// Keywords identify fact attributes. The leading `:` is presentation only
/// and is stripped on construction, so `Keyword::new(":hp")` and
/// `Keyword::new("hp")` are equal. Cloning is O(1).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Keyword(Arc<str>);

impl Keyword {
    /// Creates a keyword from its name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Self::bare(name).into())
    }

    /// A name as it is stored, without the leading `:`.
    ///
    /// Every lookup by `&str` goes through this so `":hp"` and `"hp"` find
    /// the same entry.
    #[must_use]
    pub fn bare(name: &str) -> &str {
        name.strip_prefix(':').unwrap_or(name)
    }

    /// Returns the keyword name without the leading `:`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns the namespace part of a `ns/name` keyword.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once('/').map(|(ns, _)| ns)
    }
}

impl From<&str> for Keyword {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Keyword {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<&Keyword> for Keyword {
    fn from(kw: &Keyword) -> Self {
        kw.clone()
    }
}

impl Borrow<str> for Keyword {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}
