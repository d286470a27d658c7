//! Snapshots and named checkpoints of the fact set.
//!
//! A snapshot is the ordered list of every fact plus a format version.
//! Checkpoints are snapshots stored in the context under a name. Rolling
//! back rebuilds a fresh context from the stored snapshot; priorities,
//! modules, and checkpoints taken later are not carried over, so callers
//! re-apply them if they need them.

use std::collections::HashSet;

use cadence_engine::{Fact, Rule};
use cadence_foundation::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::context::Context;

/// Snapshot format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The complete fact set at one moment, in enumeration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version tag.
    pub version: u32,
    /// Every fact, in enumeration order.
    pub facts: Vec<Fact>,
}

impl Snapshot {
    /// Creates a snapshot of the given facts with the current version tag.
    #[must_use]
    pub fn new(facts: Vec<Fact>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            facts,
        }
    }

    /// Number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if the snapshot holds no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// The facts as an unordered set.
    #[must_use]
    pub fn fact_set(&self) -> HashSet<Fact> {
        self.facts.iter().cloned().collect()
    }

    fn check_version(&self) -> Result<()> {
        if self.version == SNAPSHOT_VERSION {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::UnsupportedSnapshotVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            }))
        }
    }
}

impl Context {
    /// Captures every current fact.
    #[must_use]
    pub fn save(&self) -> Snapshot {
        Snapshot::new(self.enumerate_facts())
    }

    /// Builds a fresh context with the default configuration, adds `rules`,
    /// then inserts the snapshot's facts in order.
    ///
    /// # Errors
    /// Returns `UnsupportedSnapshotVersion` for an unknown version tag.
    pub fn load<I>(snapshot: &Snapshot, rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = Rule>,
    {
        Self::load_with_config(snapshot, rules, RuntimeConfig::default())
    }

    /// Like [`load`](Self::load), with an explicit configuration.
    ///
    /// # Errors
    /// Returns `UnsupportedSnapshotVersion` for an unknown version tag.
    pub fn load_with_config<I>(snapshot: &Snapshot, rules: I, config: RuntimeConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Rule>,
    {
        snapshot.check_version()?;
        debug!(facts = snapshot.len(), version = snapshot.version, "loading snapshot");

        Ok(Self::with_config(config)
            .add_rules(rules)
            .insert_facts(snapshot.facts.iter().cloned()))
    }

    /// Stores a snapshot of the current facts under `name`, replacing any
    /// checkpoint of the same name.
    #[must_use]
    pub fn checkpoint(&self, name: &str) -> Self {
        let snapshot = self.save();
        debug!(checkpoint = name, facts = snapshot.len(), "checkpoint captured");
        Self {
            checkpoints: self.checkpoints.insert(name.to_string(), snapshot),
            ..self.clone()
        }
    }

    /// Rebuilds the context from a stored checkpoint with `rules`.
    ///
    /// The configuration is kept; everything else is rebuilt from scratch.
    ///
    /// # Errors
    /// Returns `CheckpointNotFound` if no checkpoint has this name.
    pub fn rollback<I>(&self, name: &str, rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = Rule>,
    {
        let snapshot = self
            .checkpoints
            .get(name)
            .ok_or_else(|| Error::checkpoint_not_found(name))?;
        debug!(checkpoint = name, facts = snapshot.len(), "rolling back");
        Self::load_with_config(snapshot, rules, self.config.clone())
    }

    /// Returns a stored checkpoint.
    #[must_use]
    pub fn get_checkpoint(&self, name: &str) -> Option<&Snapshot> {
        self.checkpoints.get(name)
    }

    /// Checkpoint names, sorted.
    #[must_use]
    pub fn list_checkpoints(&self) -> Vec<String> {
        self.checkpoints.keys().cloned().collect()
    }

    /// Drops a checkpoint. No-op if absent.
    #[must_use]
    pub fn remove_checkpoint(&self, name: &str) -> Self {
        Self {
            checkpoints: self.checkpoints.remove(name),
            ..self.clone()
        }
    }
}
