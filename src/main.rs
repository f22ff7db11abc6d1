//! nodeconf entry point: load, migrate and persist a node configuration.

use anyhow::anyhow;
use log::{error, info};

use nodeconf::config::Settings;
use nodeconf::{store, Error, Migrator};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    // Load settings
    let settings = Settings::load()?;
    info!("Starting nodeconf with settings: {:?}", settings);

    let path = settings.config_path();
    let mut cfg = match store::load(&path) {
        Ok(cfg) => cfg,
        Err(e @ Error::NotInitialized { .. }) => {
            error!("{}", e);
            return Err(anyhow!("no configuration to migrate at {}", path.display()));
        }
        Err(e) => return Err(anyhow!("Failed to load {}: {}", path.display(), e)),
    };

    let migrator = Migrator::default();
    let report = migrator.run_with_report(&mut cfg, settings.hints());
    if !report.changed() {
        info!("Configuration at {} is up to date", path.display());
        return Ok(());
    }
    info!("Applied migrations: {}", report.applied().join(", "));

    if settings.dry_run {
        info!("Dry run, not writing {}", path.display());
        return Ok(());
    }

    store::store(&path, &cfg).map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;
    info!("Wrote migrated configuration to {}", path.display());
    Ok(())
}
