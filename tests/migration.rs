use nodeconf::bootstrap::{default_addresses, parse_peers, PRODUCTION_BOOTSTRAP};
use nodeconf::migration::steps;
use nodeconf::network::{Network, PRODUCTION_SWARM_KEY, TEST_SWARM_KEY};
use nodeconf::services::{BuiltinServices, DeploymentFamily, ServiceDefaults, Services};
use nodeconf::{migrate, store, Config, Error, MigrationHints, Migrator};

const STALE_PEER: &str =
    "/ip4/35.163.45.200/tcp/4001/p2p/QmcZf59bWwK5XFi76CZX8cbJ4BhTzzA3gU1ZjYZcYW3dwt";

fn all_hints() -> Vec<MigrationHints> {
    let mut hints = Vec::new();
    for bits in 0..8u8 {
        hints.push(MigrationHints {
            upgrade_from_legacy_major: bits & 1 != 0,
            just_initialized: bits & 2 != 0,
            caller_supplied_legacy_value: bits & 4 != 0,
        });
    }
    hints
}

fn documents() -> Vec<Config> {
    let fresh = Config::default();

    let staging_escrow = Config {
        services: Some(Services {
            escrow_domain: "https://escrow-staging.btfs.io".into(),
            ..Default::default()
        }),
        ..Default::default()
    };

    let mut legacy_prod: Config = serde_json::from_str(&format!(
        r#"{{
            "Identity": {{"PeerID": "QmSelf"}},
            "Bootstrap": ["{}", "{}"],
            "Services": {{
                "HubDomain": "http://hub.btfs.io",
                "ExchangeDomain": "https://exchange.btfs.io",
                "SolidityDomain": "grpc.trongrid.io:50051"
            }},
            "Swarm": {{"SwarmKey": {:?}, "EnableAutoRelay": false}},
            "Experimental": {{"StorageHostEnabled": true}}
        }}"#,
        PRODUCTION_BOOTSTRAP[0], STALE_PEER, PRODUCTION_SWARM_KEY
    ))
    .unwrap();
    legacy_prod.mounts.ipfs = "/btfs".into();

    let mut private = Config::default();
    private.swarm.swarm_key = "/key/swarm/psk/1.0.0/\n/base16/\n\
        abababababababababababababababababababababababababababababababab"
        .into();
    private.bootstrap = vec![STALE_PEER.into()];

    vec![fresh, staging_escrow, legacy_prod, private]
}

#[test]
fn second_run_reports_no_change_and_is_stable() {
    for doc in documents() {
        for hints in all_hints() {
            let mut cfg = doc.clone();
            migrate(&mut cfg, hints);
            let once = cfg.clone();

            assert!(
                !migrate(&mut cfg, hints),
                "second run changed {:?} with {:?}",
                once,
                hints
            );
            assert_eq!(cfg, once);
        }
    }
}

#[test]
fn migrated_documents_encode_identically_after_rerun() {
    for doc in documents() {
        let mut cfg = doc;
        migrate(&mut cfg, MigrationHints::default());
        let first = store::to_bytes(&cfg).unwrap();
        migrate(&mut cfg, MigrationHints::default());
        assert_eq!(store::to_bytes(&cfg).unwrap(), first);
    }
}

#[test]
fn fresh_document_is_filled_with_production_defaults() {
    let mut cfg = Config::default();
    let report = Migrator::default().run_with_report(&mut cfg, MigrationHints::default());

    assert!(report.changed());
    assert!(report.outcomes.fired(steps::DEFAULT_SERVICES));
    assert!(!report.outcomes.fired(steps::BACKFILL_SERVICES));
    assert!(!report.outcomes.fired(steps::UPGRADE_PROFILE));
    assert_eq!(
        cfg.services,
        Some(BuiltinServices.services(DeploymentFamily::Production))
    );
    assert_eq!(cfg.swarm.swarm_key, PRODUCTION_SWARM_KEY);
    assert_eq!(cfg.swarm.enable_auto_relay, Some(true));
    assert!(cfg.experimental.libp2p_stream_mounting);
    assert_eq!(cfg.experimental.hosts_sync_mode, steps::HOSTS_SYNC_MODE_PRODUCTION);
    assert_eq!(cfg.addresses.remote_api, vec![steps::DEFAULT_REMOTE_API_ADDR]);
    assert!(cfg.bootstrap.is_empty());
}

#[test]
fn staging_escrow_backfills_test_network_services() {
    let mut cfg = Config {
        services: Some(Services {
            escrow_domain: "https://escrow-staging.btfs.io".into(),
            ..Default::default()
        }),
        ..Default::default()
    };

    assert!(migrate(&mut cfg, MigrationHints::default()));

    let staging = BuiltinServices.services(DeploymentFamily::Staging);
    let services = cfg.services.as_ref().unwrap();
    assert_eq!(*services, staging);
    assert_eq!(services.exchange_domain, "https://exchange-staging.bt.co");
    assert_eq!(services.solidity_domain, "grpc.trongrid.io:50052");
    assert_eq!(cfg.swarm.swarm_key, TEST_SWARM_KEY);
    assert_eq!(cfg.experimental.hosts_sync_mode, steps::HOSTS_SYNC_MODE_TESTNET);
}

#[test]
fn deprecated_bootstrap_ip_restores_production_catalog() {
    let mut cfg = Config::default();
    cfg.swarm.swarm_key = PRODUCTION_SWARM_KEY.into();
    cfg.bootstrap = vec![
        PRODUCTION_BOOTSTRAP[2].to_string(),
        STALE_PEER.to_string(),
        PRODUCTION_BOOTSTRAP[0].to_string(),
    ];

    assert!(migrate(&mut cfg, MigrationHints::default()));

    assert_eq!(cfg.bootstrap.len(), PRODUCTION_BOOTSTRAP.len());
    assert_eq!(cfg.bootstrap, default_addresses(Network::Production));
    assert!(parse_peers(&cfg.bootstrap).is_ok());
}

#[test]
fn legacy_upgrade_applies_host_profile_and_fixes_services() {
    let mut cfg = documents().remove(2);
    let hints = MigrationHints {
        upgrade_from_legacy_major: true,
        ..Default::default()
    };
    let report = Migrator::default().run_with_report(&mut cfg, hints);

    assert_eq!(
        report.applied(),
        vec![
            steps::BACKFILL_SERVICES,
            steps::CORRECT_SERVICE_DOMAINS,
            steps::UPGRADE_PROFILE,
            steps::REPLACE_OBSOLETE_BOOTSTRAP,
            steps::BACKFILL_HOSTS_SYNC_MODE,
            steps::DEFAULT_REMOTE_API,
        ]
    );
    assert_eq!(
        cfg.services,
        Some(BuiltinServices.services(DeploymentFamily::Production))
    );
    assert!(cfg.experimental.storage_host_enabled);
    assert!(cfg.experimental.storage_client_enabled);
    assert_eq!(cfg.swarm.enable_auto_relay, Some(false));
    assert_eq!(cfg.bootstrap, PRODUCTION_BOOTSTRAP);
    assert_eq!(cfg.extra["Identity"]["PeerID"], "QmSelf");
}

#[test]
fn private_network_bootstrap_is_never_replaced() {
    let mut cfg = documents().remove(3);
    migrate(&mut cfg, MigrationHints::default());
    assert_eq!(cfg.bootstrap, vec![STALE_PEER]);
    assert_eq!(Network::from_swarm_key(&cfg.swarm.swarm_key), None);
}

#[test]
fn load_migrate_store_converges() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repo").join("config");

    assert!(matches!(store::load(&path), Err(Error::NotInitialized { .. })));

    for doc in documents() {
        store::store(&path, &doc).unwrap();

        let mut cfg = store::load(&path).unwrap();
        assert_eq!(cfg, doc);
        if migrate(&mut cfg, MigrationHints::default()) {
            store::store(&path, &cfg).unwrap();
        }

        let mut reloaded = store::load(&path).unwrap();
        assert_eq!(reloaded, cfg);
        assert!(!migrate(&mut reloaded, MigrationHints::default()));
    }
}
