//! Upgrades configuration documents written by older releases.
//!
//! A [`Migrator`] holds an ordered list of named steps. Running it applies
//! every step in order to the same document. Each step reports whether it
//! changed anything, and that outcome is recorded under the step's name so
//! later steps can look it up through [`MigrationContext::outcomes`].
//!
//! Steps cannot fail. A condition a step cannot resolve is logged and
//! treated as "no change", so a node can always start. Steps are
//! idempotent: running the whole catalog a second time reports no change
//! and leaves the document untouched.

use log::debug;

use crate::document::Config;
use crate::profile::{BuiltinProfiles, ProfileRegistry};
use crate::services::{BuiltinServices, ServiceDefaults};

pub mod steps;

/// Facts about the current invocation that are not stored in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationHints {
    /// The node is starting for the first time after an upgrade from the
    /// previous major release.
    pub upgrade_from_legacy_major: bool,
    /// The document was created by init during this invocation.
    pub just_initialized: bool,
    /// The caller passed a setting that only older releases understood.
    pub caller_supplied_legacy_value: bool,
}

/// Outcome of each step that has run so far, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcomes {
    entries: Vec<(&'static str, bool)>,
}

impl StepOutcomes {
    fn record(&mut self, name: &'static str, changed: bool) {
        self.entries.push((name, changed));
    }

    /// `None` if the step has not run yet.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .rev()
            .find(|(step, _)| *step == name)
            .map(|(_, changed)| *changed)
    }

    /// True if the named step has run and changed the document.
    pub fn fired(&self, name: &str) -> bool {
        self.get(name).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.entries.iter().copied()
    }
}

/// What a step sees besides the document.
pub struct MigrationContext<'a> {
    pub hints: MigrationHints,
    pub outcomes: &'a StepOutcomes,
    pub profiles: &'a dyn ProfileRegistry,
    pub services: &'a dyn ServiceDefaults,
}

pub type StepFn = fn(&mut Config, &MigrationContext<'_>) -> bool;

#[derive(Clone, Copy)]
pub struct MigrationStep {
    pub name: &'static str,
    pub apply: StepFn,
}

impl MigrationStep {
    pub const fn new(name: &'static str, apply: StepFn) -> Self {
        Self { name, apply }
    }
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MigrationStep").field(&self.name).finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub outcomes: StepOutcomes,
}

impl MigrationReport {
    /// True if any step changed the document.
    pub fn changed(&self) -> bool {
        self.outcomes.iter().any(|(_, changed)| changed)
    }

    /// Names of the steps that changed the document, in run order.
    pub fn applied(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|(_, changed)| *changed)
            .map(|(name, _)| name)
            .collect()
    }
}

pub struct Migrator {
    steps: Vec<MigrationStep>,
    profiles: Box<dyn ProfileRegistry>,
    services: Box<dyn ServiceDefaults>,
}

impl Default for Migrator {
    fn default() -> Self {
        Migrator::new(BuiltinProfiles::default(), BuiltinServices)
    }
}

impl Migrator {
    /// A migrator running the standard catalog against the given
    /// collaborators.
    pub fn new(
        profiles: impl ProfileRegistry + 'static,
        services: impl ServiceDefaults + 'static,
    ) -> Self {
        Self {
            steps: steps::standard(),
            ..Migrator::empty(profiles, services)
        }
    }

    /// A migrator with no steps registered.
    pub fn empty(
        profiles: impl ProfileRegistry + 'static,
        services: impl ServiceDefaults + 'static,
    ) -> Self {
        Self {
            steps: Vec::new(),
            profiles: Box::new(profiles),
            services: Box::new(services),
        }
    }

    /// Appends a step; it runs after every step registered before it.
    pub fn with_step(mut self, name: &'static str, apply: StepFn) -> Self {
        self.steps.push(MigrationStep::new(name, apply));
        self
    }

    pub fn step_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|step| step.name)
    }

    /// Runs every step and returns true if any of them changed `cfg`.
    pub fn run(&self, cfg: &mut Config, hints: MigrationHints) -> bool {
        self.run_with_report(cfg, hints).changed()
    }

    pub fn run_with_report(&self, cfg: &mut Config, hints: MigrationHints) -> MigrationReport {
        let mut outcomes = StepOutcomes::default();
        for step in &self.steps {
            let changed = {
                let ctx = MigrationContext {
                    hints,
                    outcomes: &outcomes,
                    profiles: self.profiles.as_ref(),
                    services: self.services.as_ref(),
                };
                (step.apply)(cfg, &ctx)
            };
            debug!(
                "Migration step {}: {}",
                step.name,
                if changed { "applied" } else { "no change" }
            );
            outcomes.record(step.name, changed);
        }
        MigrationReport { outcomes }
    }
}

/// Runs the standard catalog with the built-in profiles and service tables.
pub fn migrate(cfg: &mut Config, hints: MigrationHints) -> bool {
    Migrator::default().run(cfg, hints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_bootstrap(cfg: &mut Config, _: &MigrationContext<'_>) -> bool {
        if cfg.bootstrap.is_empty() {
            cfg.bootstrap.push("marker".into());
            return true;
        }
        false
    }

    fn follow_up(cfg: &mut Config, ctx: &MigrationContext<'_>) -> bool {
        if ctx.outcomes.fired("set-bootstrap") {
            cfg.experimental.hosts_sync_mode = "after".into();
            return true;
        }
        false
    }

    fn never(_: &mut Config, _: &MigrationContext<'_>) -> bool {
        false
    }

    fn custom() -> Migrator {
        Migrator::empty(BuiltinProfiles::default(), BuiltinServices)
            .with_step("set-bootstrap", set_bootstrap)
            .with_step("never", never)
            .with_step("follow-up", follow_up)
    }

    #[test]
    fn later_steps_see_earlier_outcomes() {
        let mut cfg = Config::default();
        let report = custom().run_with_report(&mut cfg, MigrationHints::default());

        assert!(report.changed());
        assert_eq!(report.applied(), vec!["set-bootstrap", "follow-up"]);
        assert_eq!(report.outcomes.get("never"), Some(false));
        assert_eq!(cfg.experimental.hosts_sync_mode, "after");
    }

    #[test]
    fn every_step_runs_even_when_nothing_changes() {
        let mut cfg = Config {
            bootstrap: vec!["already".into()],
            ..Default::default()
        };
        let report = custom().run_with_report(&mut cfg, MigrationHints::default());

        assert!(!report.changed());
        assert_eq!(
            report.outcomes.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["set-bootstrap", "never", "follow-up"]
        );
    }

    #[test]
    fn outcomes_of_unknown_steps_are_absent() {
        let outcomes = StepOutcomes::default();
        assert_eq!(outcomes.get("default-services"), None);
        assert!(!outcomes.fired("default-services"));
    }

    #[test]
    fn empty_migrator_never_changes() {
        let mut cfg = Config::default();
        let migrator = Migrator::empty(BuiltinProfiles::default(), BuiltinServices);
        assert!(!migrator.run(&mut cfg, MigrationHints::default()));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn default_migrator_uses_standard_catalog() {
        let names: Vec<_> = Migrator::default().step_names().collect();
        let expected: Vec<_> = steps::standard().iter().map(|s| s.name).collect();
        assert_eq!(names, expected);
    }
}
