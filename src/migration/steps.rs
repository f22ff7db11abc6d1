//! The standard migration catalog.
//!
//! Order matters: the services steps run first because the swarm key and
//! sync mode defaults depend on the deployment family the services point
//! at, and the bootstrap step depends on the swarm key.

use log::{error, info, warn};

use super::{MigrationContext, MigrationStep};
use crate::bootstrap::{default_peers, has_obsolete_entry, obsolete_markers};
use crate::document::{Config, SectionState};
use crate::network::{swarm_key_fingerprint, Network};
use crate::profile::presets::{STORAGE_CLIENT, STORAGE_HOST};
use crate::services::{DeploymentFamily, ServiceField};

pub const DEFAULT_SERVICES: &str = "default-services";
pub const BACKFILL_SERVICES: &str = "backfill-services";
pub const CORRECT_SERVICE_DOMAINS: &str = "correct-service-domains";
pub const UPGRADE_PROFILE: &str = "upgrade-profile";
pub const PROVISION_SWARM_KEY: &str = "provision-swarm-key";
pub const REPLACE_OBSOLETE_BOOTSTRAP: &str = "replace-obsolete-bootstrap";
pub const ENABLE_STREAM_MOUNTING: &str = "enable-stream-mounting";
pub const DEFAULT_AUTO_RELAY: &str = "default-auto-relay";
pub const BACKFILL_HOSTS_SYNC_MODE: &str = "backfill-hosts-sync-mode";
pub const DEFAULT_REMOTE_API: &str = "default-remote-api";

pub const DEFAULT_ENABLE_AUTO_RELAY: bool = true;
pub const HOSTS_SYNC_MODE_PRODUCTION: &str = "SCORE";
pub const HOSTS_SYNC_MODE_TESTNET: &str = "TESTNET";
pub const DEFAULT_REMOTE_API_ADDR: &str = "/ip4/127.0.0.1/tcp/5101";

/// Substrings that mark a service endpoint as retired. A matching field
/// is replaced with the default of its deployment family.
pub const DEPRECATED_SERVICE_MARKERS: &[(ServiceField, &str)] = &[
    (ServiceField::StatusServer, "http://"),
    (ServiceField::Hub, "http://"),
    (ServiceField::Escrow, "http://"),
    (ServiceField::Guard, "http://"),
    // The exchange moved off the storage domain.
    (ServiceField::Exchange, "btfs.io"),
    // 50051 is the full node port; solidity queries must use 50052.
    (ServiceField::Solidity, ":50051"),
];

pub fn standard() -> Vec<MigrationStep> {
    vec![
        MigrationStep::new(DEFAULT_SERVICES, default_services),
        MigrationStep::new(BACKFILL_SERVICES, backfill_services),
        MigrationStep::new(CORRECT_SERVICE_DOMAINS, correct_service_domains),
        MigrationStep::new(UPGRADE_PROFILE, upgrade_profile),
        MigrationStep::new(PROVISION_SWARM_KEY, provision_swarm_key),
        MigrationStep::new(REPLACE_OBSOLETE_BOOTSTRAP, replace_obsolete_bootstrap),
        MigrationStep::new(ENABLE_STREAM_MOUNTING, enable_stream_mounting),
        MigrationStep::new(DEFAULT_AUTO_RELAY, default_auto_relay),
        MigrationStep::new(BACKFILL_HOSTS_SYNC_MODE, backfill_hosts_sync_mode),
        MigrationStep::new(DEFAULT_REMOTE_API, default_remote_api),
    ]
}

/// Fills a missing services section with the production table.
pub fn default_services(cfg: &mut Config, ctx: &MigrationContext<'_>) -> bool {
    if cfg.services_state(ctx.services) != SectionState::Absent {
        return false;
    }
    cfg.services = Some(ctx.services.services(DeploymentFamily::Production));
    true
}

/// Fills empty service fields from the table of the family the populated
/// fields point at.
pub fn backfill_services(cfg: &mut Config, ctx: &MigrationContext<'_>) -> bool {
    if ctx.outcomes.fired(DEFAULT_SERVICES) {
        return false;
    }
    let Some(services) = cfg.services.as_mut() else {
        return false;
    };

    let defaults = ctx.services.services(DeploymentFamily::detect(services));
    let mut changed = false;
    for field in ServiceField::ALL {
        let default = field.get(&defaults);
        let slot = field.get_mut(services);
        if slot.is_empty() && !default.is_empty() {
            *slot = default.to_string();
            changed = true;
        }
    }
    if services.escrow_pub_keys.is_empty() && !defaults.escrow_pub_keys.is_empty() {
        services.escrow_pub_keys = defaults.escrow_pub_keys.clone();
        changed = true;
    }
    if services.guard_pub_keys.is_empty() && !defaults.guard_pub_keys.is_empty() {
        services.guard_pub_keys = defaults.guard_pub_keys.clone();
        changed = true;
    }
    changed
}

/// Replaces endpoints carrying a retired marker with the family default.
pub fn correct_service_domains(cfg: &mut Config, ctx: &MigrationContext<'_>) -> bool {
    if ctx.outcomes.fired(DEFAULT_SERVICES) {
        return false;
    }
    let Some(services) = cfg.services.as_mut() else {
        return false;
    };

    let defaults = ctx.services.services(DeploymentFamily::detect(services));
    let mut changed = false;
    for &(field, marker) in DEPRECATED_SERVICE_MARKERS {
        let default = field.get(&defaults);
        let slot = field.get_mut(services);
        if slot.contains(marker) && *slot != default && !default.contains(marker) {
            info!("Replacing deprecated service endpoint {} with {}", slot, default);
            *slot = default.to_string();
            changed = true;
        }
    }
    changed
}

/// Applies a storage profile after a major upgrade, or on a fresh init
/// that was handed a legacy setting.
pub fn upgrade_profile(cfg: &mut Config, ctx: &MigrationContext<'_>) -> bool {
    let hints = ctx.hints;
    if !(hints.upgrade_from_legacy_major
        || (hints.just_initialized && hints.caller_supplied_legacy_value))
    {
        return false;
    }

    let name = if cfg.experimental.storage_host_enabled {
        STORAGE_HOST
    } else {
        STORAGE_CLIENT
    };
    let Some(profile) = ctx.profiles.profile(name) else {
        warn!("Profile {} is not registered, leaving configuration as is", name);
        return false;
    };

    let before = cfg.clone();
    profile.apply(cfg);
    *cfg != before
}

/// Installs the swarm key of the network the services point at.
pub fn provision_swarm_key(cfg: &mut Config, _: &MigrationContext<'_>) -> bool {
    if !cfg.swarm.swarm_key.trim().is_empty() {
        return false;
    }
    let network = cfg.deployment_family().network();
    cfg.swarm.swarm_key = network.swarm_key().to_string();
    info!(
        "Provisioned {} swarm key (fingerprint {})",
        network,
        swarm_key_fingerprint(&cfg.swarm.swarm_key).unwrap_or_default()
    );
    true
}

/// Replaces the whole bootstrap list with the network's catalog as soon as
/// one entry points at a retired node.
pub fn replace_obsolete_bootstrap(cfg: &mut Config, _: &MigrationContext<'_>) -> bool {
    // Private networks maintain their own lists.
    let Some(network) = Network::from_swarm_key(&cfg.swarm.swarm_key) else {
        return false;
    };
    if !has_obsolete_entry(&cfg.bootstrap, obsolete_markers(network)) {
        return false;
    }

    match default_peers(network) {
        Ok(peers) => {
            let before = std::mem::take(&mut cfg.bootstrap);
            cfg.set_bootstrap_peers(&peers);
            info!(
                "Replaced {} bootstrap entries with the {} default list ({} entries)",
                before.len(),
                network,
                cfg.bootstrap.len()
            );
            cfg.bootstrap != before
        }
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}

/// The remote API depends on stream mounting, so the flag has no valid off
/// state and is always snapped on.
pub fn enable_stream_mounting(cfg: &mut Config, _: &MigrationContext<'_>) -> bool {
    if cfg.experimental.libp2p_stream_mounting {
        return false;
    }
    cfg.experimental.libp2p_stream_mounting = true;
    true
}

/// Sets auto relay only when the document never set it. An explicit
/// `false` is the user's choice and is kept.
pub fn default_auto_relay(cfg: &mut Config, _: &MigrationContext<'_>) -> bool {
    if cfg.swarm.enable_auto_relay.is_some() {
        return false;
    }
    cfg.swarm.enable_auto_relay = Some(DEFAULT_ENABLE_AUTO_RELAY);
    true
}

pub fn backfill_hosts_sync_mode(cfg: &mut Config, _: &MigrationContext<'_>) -> bool {
    if !cfg.experimental.hosts_sync_mode.is_empty() {
        return false;
    }
    let mode = if cfg.deployment_family().is_production() {
        HOSTS_SYNC_MODE_PRODUCTION
    } else {
        HOSTS_SYNC_MODE_TESTNET
    };
    cfg.experimental.hosts_sync_mode = mode.to_string();
    true
}

pub fn default_remote_api(cfg: &mut Config, _: &MigrationContext<'_>) -> bool {
    if !cfg.addresses.remote_api.is_empty() {
        return false;
    }
    cfg.addresses.remote_api = vec![DEFAULT_REMOTE_API_ADDR.to_string()];
    true
}
