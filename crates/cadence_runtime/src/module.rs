//! Module activation registry.
//!
//! A module is a named, ordered list of rules. Registering a module only
//! records the list; enabling it adds the rules to the session, and
//! disabling it undoes exactly what enabling did. Enabling an enabled
//! module and disabling a disabled one return the context unchanged.
//!
//! A module rule whose name is already in the session replaces that rule
//! while the module is enabled. The replaced rule and its priority are kept
//! and put back in place when the module is disabled.

use cadence_engine::Rule;
use cadence_foundation::{Error, Keyword, PMap, POrdMap, PVec, Result};
use tracing::{debug, warn};

use crate::context::Context;

/// What enabling one module changed in the session.
#[derive(Clone, Debug, Default)]
struct Enabled {
    /// Names of the rules the module put in the session, in order.
    rules: PVec<Keyword>,
    /// Rules the module replaced, with the priority each had.
    shadowed: PMap<Keyword, (Rule, i64)>,
}

/// Registered modules and what each enabled module changed.
#[derive(Clone, Debug, Default)]
pub struct ModuleRegistry {
    /// Module name -> rules, in declaration order.
    registered: POrdMap<Keyword, PVec<Rule>>,
    enabled: PMap<Keyword, Enabled>,
}

impl ModuleRegistry {
    /// Returns true if a module with this name is registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(Keyword::bare(name))
    }

    /// Returns true if the module is enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains_key(Keyword::bare(name))
    }

    /// Rules registered under a module.
    #[must_use]
    pub fn rules(&self, name: &str) -> Option<&PVec<Rule>> {
        self.registered.get(Keyword::bare(name))
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &Keyword> {
        self.registered.keys()
    }
}

/// Introspection record for one module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module name
    pub name: Keyword,
    /// Whether its rules are in the session
    pub enabled: bool,
    /// Number of rules registered under it
    pub rule_count: usize,
}

/// Aggregate module counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModuleStats {
    /// Registered modules
    pub registered: usize,
    /// Enabled modules
    pub enabled: usize,
    /// Registered but not enabled
    pub disabled: usize,
}

impl Context {
    /// Returns the module registry.
    #[must_use]
    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Registers `rules` under `name`. The session is not touched.
    ///
    /// Re-registering replaces the rule list. An enabled module keeps the
    /// rules it already added; the new list is used the next time it is
    /// enabled.
    #[must_use]
    pub fn register_module<I>(&self, name: impl Into<Keyword>, rules: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        Self {
            modules: ModuleRegistry {
                registered: self.modules.registered.insert(name.into(), rules.into_iter().collect()),
                enabled: self.modules.enabled.clone(),
            },
            ..self.clone()
        }
    }

    /// Adds every rule of a registered module to the session, in order.
    ///
    /// # Errors
    /// Returns `ModuleNotRegistered` if the module was never registered.
    pub fn enable_module(&self, name: &str) -> Result<Self> {
        let name = Keyword::bare(name);
        let Some(rules) = self.modules.registered.get(name) else {
            return Err(Error::module_not_registered(name));
        };
        if self.modules.is_enabled(name) {
            return Ok(self.clone());
        }

        let shadowed: PMap<Keyword, (Rule, i64)> = rules
            .iter()
            .filter_map(|rule| {
                let existing = self.session.rule(rule.name().name())?;
                warn!(module = name, rule = %rule.name(), "module rule replaces an existing rule");
                Some((
                    rule.name().clone(),
                    (existing.clone(), self.priority_of(rule.name().name())),
                ))
            })
            .collect();
        let enabled = Enabled {
            rules: rules.iter().map(|r| r.name().clone()).collect(),
            shadowed,
        };
        debug!(module = name, rules = enabled.rules.len(), "enabling module");

        let ctx = self.add_rules(rules.iter().cloned());
        Ok(Self {
            modules: ModuleRegistry {
                registered: ctx.modules.registered.clone(),
                enabled: ctx.modules.enabled.insert(Keyword::new(name), enabled),
            },
            ..ctx
        })
    }

    /// Undoes what enabling the module did. No-op if it is not enabled.
    ///
    /// Rules the module added are removed; rules it replaced are put back
    /// in their original position with their original priority.
    #[must_use]
    pub fn disable_module(&self, name: &str) -> Self {
        let name = Keyword::bare(name);
        let Some(enabled) = self.modules.enabled.get(name) else {
            return self.clone();
        };
        debug!(module = name, rules = enabled.rules.len(), "disabling module");

        let ctx = enabled
            .rules
            .iter()
            .fold(self.clone(), |ctx, rule| match enabled.shadowed.get(rule) {
                Some((previous, priority)) => ctx
                    .add_rule(previous.clone())
                    .set_priority(rule.name(), *priority),
                None => ctx.remove_rule(rule.name()),
            });
        Self {
            modules: ModuleRegistry {
                registered: ctx.modules.registered.clone(),
                enabled: ctx.modules.enabled.remove(name),
            },
            ..ctx
        }
    }

    /// Disables an enabled module, enables a disabled one.
    ///
    /// # Errors
    /// Returns `ModuleNotRegistered` when enabling an unknown module.
    pub fn toggle_module(&self, name: &str) -> Result<Self> {
        if self.modules.is_enabled(name) {
            Ok(self.disable_module(name))
        } else {
            self.enable_module(name)
        }
    }

    /// Enables every registered module, in name order.
    ///
    /// # Errors
    /// Cannot fail for registered modules; the `Result` mirrors
    /// [`enable_module`](Self::enable_module).
    pub fn enable_all(&self) -> Result<Self> {
        let names: Vec<Keyword> = self.modules.names().cloned().collect();
        names
            .iter()
            .try_fold(self.clone(), |ctx, name| ctx.enable_module(name.name()))
    }

    /// Disables every enabled module.
    #[must_use]
    pub fn disable_all(&self) -> Self {
        let names: Vec<Keyword> = self.modules.enabled.keys().cloned().collect();
        names
            .iter()
            .fold(self.clone(), |ctx, name| ctx.disable_module(name.name()))
    }

    /// Enables exactly `names` and disables every other module.
    ///
    /// # Errors
    /// Returns `ModuleNotRegistered` for the first unknown name; nothing is
    /// changed in that case.
    pub fn enable_set(&self, names: &[&str]) -> Result<Self> {
        if let Some(unknown) = names.iter().find(|n| !self.modules.is_registered(n)) {
            return Err(Error::module_not_registered(Keyword::bare(unknown)));
        }

        let wanted: Vec<&str> = names.iter().map(|n| Keyword::bare(n)).collect();
        let others: Vec<Keyword> = self
            .modules
            .enabled
            .keys()
            .filter(|k| !wanted.contains(&k.name()))
            .cloned()
            .collect();
        let ctx = others
            .iter()
            .fold(self.clone(), |ctx, name| ctx.disable_module(name.name()));
        wanted
            .iter()
            .try_fold(ctx, |ctx, name| ctx.enable_module(name))
    }

    /// Returns true if the module is enabled.
    #[must_use]
    pub fn is_module_enabled(&self, name: &str) -> bool {
        self.modules.is_enabled(name)
    }

    /// One record per registered module, sorted by name.
    #[must_use]
    pub fn list_modules(&self) -> Vec<ModuleInfo> {
        self.modules
            .registered
            .iter()
            .map(|(name, rules)| ModuleInfo {
                name: name.clone(),
                enabled: self.modules.enabled.contains_key(name),
                rule_count: rules.len(),
            })
            .collect()
    }

    /// Registered, enabled, and disabled module counts.
    #[must_use]
    pub fn module_stats(&self) -> ModuleStats {
        let registered = self.modules.registered.len();
        let enabled = self
            .modules
            .registered
            .keys()
            .filter(|k| self.modules.enabled.contains_key(*k))
            .count();
        ModuleStats {
            registered,
            enabled,
            disabled: registered - enabled,
        }
    }
}
