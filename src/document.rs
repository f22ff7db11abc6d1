//! The persisted node configuration document.
//!
//! Only the sections the migrations and the store look at are modelled.
//! Everything else, including unknown keys inside modelled sections, is
//! carried through `extra` maps so that a load/store cycle never drops
//! fields written by other tools.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::services::{DeploymentFamily, ServiceDefaults, Services};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    #[serde(default)]
    pub addresses: Addresses,
    #[serde(default, deserialize_with = "nullable")]
    pub bootstrap: Vec<String>,
    #[serde(default)]
    pub mounts: Mounts,
    /// `None` when the document has no `Services` key. A section with every
    /// field empty is kept as written and reported as absent by
    /// [`Config::services_state`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Services>,
    #[serde(default)]
    pub swarm: Swarm,
    #[serde(default)]
    pub experimental: Experiments,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Whether a structured section has been filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    /// Missing, or present with every field empty.
    Absent,
    /// Identical to the default table of its deployment family.
    Default,
    Customized,
}

impl Config {
    pub fn services_state(&self, defaults: &dyn ServiceDefaults) -> SectionState {
        match &self.services {
            None => SectionState::Absent,
            Some(services) if services.is_blank() => SectionState::Absent,
            Some(services) if *services == defaults.services(DeploymentFamily::detect(services)) => {
                SectionState::Default
            }
            Some(_) => SectionState::Customized,
        }
    }

    /// Deployment family implied by the services section; production when
    /// the section is absent.
    pub fn deployment_family(&self) -> DeploymentFamily {
        self.services
            .as_ref()
            .map(DeploymentFamily::detect)
            .unwrap_or(DeploymentFamily::Production)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Addresses {
    #[serde(deserialize_with = "nullable")]
    pub swarm: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub announce: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub no_announce: Vec<String>,
    #[serde(
        rename = "API",
        deserialize_with = "one_or_many",
        serialize_with = "as_one_or_many"
    )]
    pub api: Vec<String>,
    #[serde(deserialize_with = "one_or_many", serialize_with = "as_one_or_many")]
    pub gateway: Vec<String>,
    #[serde(
        rename = "RemoteAPI",
        deserialize_with = "one_or_many",
        serialize_with = "as_one_or_many"
    )]
    pub remote_api: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mount points.
///
/// `ipfs`/`ipns` are the names used in memory. On disk the same values
/// live under `BTFS`/`BTNS`; see [`Mounts::prepare_for_disk`] and
/// [`Mounts::adopt_disk_names`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mounts {
    #[serde(rename = "IPFS", skip_serializing_if = "String::is_empty")]
    pub ipfs: String,
    #[serde(rename = "IPNS", skip_serializing_if = "String::is_empty")]
    pub ipns: String,
    #[serde(rename = "FuseAllowOther")]
    pub fuse_allow_other: bool,
    #[serde(rename = "BTFS")]
    pub btfs: String,
    #[serde(rename = "BTNS")]
    pub btns: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Mounts {
    /// Moves the in-memory names into the on-disk names.
    pub fn prepare_for_disk(&mut self) {
        self.btfs = std::mem::take(&mut self.ipfs);
        self.btns = std::mem::take(&mut self.ipns);
    }

    /// Adopts non-empty on-disk names as the in-memory values. Documents
    /// written before the rename only carry `IPFS`/`IPNS` and are left as
    /// they are.
    pub fn adopt_disk_names(&mut self) {
        if !self.btfs.is_empty() {
            self.ipfs = std::mem::take(&mut self.btfs);
        }
        if !self.btns.is_empty() {
            self.ipns = std::mem::take(&mut self.btns);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Swarm {
    pub swarm_key: String,
    /// `None` when the document never set the flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_auto_relay: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Experiments {
    pub libp2p_stream_mounting: bool,
    pub storage_host_enabled: bool,
    pub storage_client_enabled: bool,
    pub remove_on_unpin: bool,
    pub hosts_sync_enabled: bool,
    pub hosts_sync_mode: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts `null` wherever a value with a sensible default is expected.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(addr)) => vec![addr],
        Some(OneOrMany::Many(addrs)) => addrs,
    })
}

/// Writes a single address as a bare string and none at all as `null`,
/// the shape older releases read and write.
fn as_one_or_many<S>(addrs: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match addrs {
        [] => serializer.serialize_none(),
        [addr] => serializer.serialize_str(addr),
        _ => addrs.serialize(serializer),
    }
}
