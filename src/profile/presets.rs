use super::Profile;
use crate::document::Config;

pub const STORAGE_HOST: &str = "storage-host";
pub const STORAGE_CLIENT: &str = "storage-client";

/// Turns the node into a storage host. Hosts also act as clients and need
/// stream mounting for the remote API.
pub struct StorageHost;

impl Profile for StorageHost {
    fn name(&self) -> &'static str {
        STORAGE_HOST
    }

    fn description(&self) -> &'static str {
        "Enables storage hosting and the client features hosts depend on."
    }

    fn apply(&self, cfg: &mut Config) {
        let exp = &mut cfg.experimental;
        exp.storage_host_enabled = true;
        exp.storage_client_enabled = true;
        exp.libp2p_stream_mounting = true;
    }
}

pub struct StorageClient;

impl Profile for StorageClient {
    fn name(&self) -> &'static str {
        STORAGE_CLIENT
    }

    fn description(&self) -> &'static str {
        "Enables uploading to storage hosts and periodic host list sync."
    }

    fn apply(&self, cfg: &mut Config) {
        let exp = &mut cfg.experimental;
        exp.storage_client_enabled = true;
        exp.hosts_sync_enabled = true;
    }
}
