use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::migration::MigrationHints;

/// Settings of the `nodeconf` tool itself, as opposed to the node
/// configuration it migrates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    pub repo_path: PathBuf,
    pub config_file: String,
    pub upgrade_from_legacy_major: bool,
    pub just_initialized: bool,
    pub caller_supplied_legacy_value: bool,
    /// Report what would change without writing the file.
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let repo_path = std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".btfs"))
            .unwrap_or_else(|| PathBuf::from(".btfs"));
        Self {
            repo_path,
            config_file: "config".into(),
            upgrade_from_legacy_major: false,
            just_initialized: false,
            caller_supplied_legacy_value: false,
            dry_run: false,
        }
    }
}

impl Settings {
    /// Defaults, then `nodeconf.toml`, `nodeconf.json` and `NODECONF_*`
    /// environment variables, later sources winning.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("nodeconf.toml"))
            .merge(Json::file("nodeconf.json"))
            .merge(Env::prefixed("NODECONF_"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let mut settings: Settings = Self::figment()
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;

        // Support Docker-style secrets
        if let Ok(path_file) = std::env::var("NODECONF_REPO_PATH_FILE") {
            settings.repo_path = std::fs::read_to_string(path_file)?.trim().into();
        }

        Ok(settings)
    }

    pub fn config_path(&self) -> PathBuf {
        self.repo_path.join(&self.config_file)
    }

    pub fn hints(&self) -> MigrationHints {
        MigrationHints {
            upgrade_from_legacy_major: self.upgrade_from_legacy_major,
            just_initialized: self.just_initialized,
            caller_supplied_legacy_value: self.caller_supplied_legacy_value,
        }
    }
}
