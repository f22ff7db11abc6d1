//! External service endpoints and their per-deployment default tables.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::nullable;
use crate::network::Network;

/// Endpoints of the external services a node talks to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Services {
    pub status_server_domain: String,
    pub hub_domain: String,
    pub escrow_domain: String,
    pub guard_domain: String,
    pub exchange_domain: String,
    pub solidity_domain: String,
    pub fullnode_domain: String,
    pub trongrid_domain: String,
    pub trongrid_ip: String,
    #[serde(deserialize_with = "nullable")]
    pub escrow_pub_keys: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub guard_pub_keys: Vec<String>,
    /// Endpoints this crate does not know about, kept as found.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Services {
    /// True when no field carries a value. A blank section is treated the
    /// same as a missing one.
    pub fn is_blank(&self) -> bool {
        self.domains().iter().all(|(_, value)| value.is_empty())
            && self.escrow_pub_keys.is_empty()
            && self.guard_pub_keys.is_empty()
            && self.extra.is_empty()
    }

    /// Every textual endpoint paired with the field that holds it.
    pub fn domains(&self) -> [(ServiceField, &str); 9] {
        ServiceField::ALL.map(|field| (field, field.get(self)))
    }
}

/// Names a single textual endpoint of [`Services`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceField {
    StatusServer,
    Hub,
    Escrow,
    Guard,
    Exchange,
    Solidity,
    Fullnode,
    Trongrid,
    TrongridIp,
}

impl ServiceField {
    pub const ALL: [ServiceField; 9] = [
        ServiceField::StatusServer,
        ServiceField::Hub,
        ServiceField::Escrow,
        ServiceField::Guard,
        ServiceField::Exchange,
        ServiceField::Solidity,
        ServiceField::Fullnode,
        ServiceField::Trongrid,
        ServiceField::TrongridIp,
    ];

    pub fn get(self, services: &Services) -> &str {
        match self {
            ServiceField::StatusServer => &services.status_server_domain,
            ServiceField::Hub => &services.hub_domain,
            ServiceField::Escrow => &services.escrow_domain,
            ServiceField::Guard => &services.guard_domain,
            ServiceField::Exchange => &services.exchange_domain,
            ServiceField::Solidity => &services.solidity_domain,
            ServiceField::Fullnode => &services.fullnode_domain,
            ServiceField::Trongrid => &services.trongrid_domain,
            ServiceField::TrongridIp => &services.trongrid_ip,
        }
    }

    pub fn get_mut(self, services: &mut Services) -> &mut String {
        match self {
            ServiceField::StatusServer => &mut services.status_server_domain,
            ServiceField::Hub => &mut services.hub_domain,
            ServiceField::Escrow => &mut services.escrow_domain,
            ServiceField::Guard => &mut services.guard_domain,
            ServiceField::Exchange => &mut services.exchange_domain,
            ServiceField::Solidity => &mut services.solidity_domain,
            ServiceField::Fullnode => &mut services.fullnode_domain,
            ServiceField::Trongrid => &mut services.trongrid_domain,
            ServiceField::TrongridIp => &mut services.trongrid_ip,
        }
    }
}

/// Which family of service deployments a document points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentFamily {
    Production,
    /// The staging services back the public test network.
    Staging,
    Dev,
}

impl DeploymentFamily {
    /// Guesses the family from the domains already present in `services`.
    ///
    /// The escrow, hub, status and guard domains are consulted in that
    /// order and the first non-empty one decides. With none set the family
    /// is production.
    pub fn detect(services: &Services) -> DeploymentFamily {
        let probe = [
            &services.escrow_domain,
            &services.hub_domain,
            &services.status_server_domain,
            &services.guard_domain,
        ]
        .into_iter()
        .find(|domain| !domain.is_empty());

        match probe {
            Some(domain) if domain.contains("staging") => DeploymentFamily::Staging,
            Some(domain) if domain.contains("-dev") => DeploymentFamily::Dev,
            _ => DeploymentFamily::Production,
        }
    }

    pub fn is_production(self) -> bool {
        self == DeploymentFamily::Production
    }

    /// The public network whose swarm key and bootstrap peers match.
    pub fn network(self) -> Network {
        match self {
            DeploymentFamily::Production => Network::Production,
            DeploymentFamily::Staging | DeploymentFamily::Dev => Network::Test,
        }
    }
}

/// Source of default [`Services`] tables, keyed by deployment family.
pub trait ServiceDefaults {
    fn services(&self, family: DeploymentFamily) -> Services;
}

/// A services table baked into the binary.
#[derive(Debug, Clone, Copy)]
pub struct ServicesTable {
    pub status_server_domain: &'static str,
    pub hub_domain: &'static str,
    pub escrow_domain: &'static str,
    pub guard_domain: &'static str,
    pub exchange_domain: &'static str,
    pub solidity_domain: &'static str,
    pub fullnode_domain: &'static str,
    pub trongrid_domain: &'static str,
    pub escrow_pub_keys: &'static [&'static str],
    pub guard_pub_keys: &'static [&'static str],
}

impl From<&ServicesTable> for Services {
    fn from(table: &ServicesTable) -> Self {
        Services {
            status_server_domain: table.status_server_domain.into(),
            hub_domain: table.hub_domain.into(),
            escrow_domain: table.escrow_domain.into(),
            guard_domain: table.guard_domain.into(),
            exchange_domain: table.exchange_domain.into(),
            solidity_domain: table.solidity_domain.into(),
            fullnode_domain: table.fullnode_domain.into(),
            trongrid_domain: table.trongrid_domain.into(),
            trongrid_ip: String::new(),
            escrow_pub_keys: table.escrow_pub_keys.iter().map(|k| k.to_string()).collect(),
            guard_pub_keys: table.guard_pub_keys.iter().map(|k| k.to_string()).collect(),
            extra: Map::new(),
        }
    }
}

pub const PRODUCTION_SERVICES: ServicesTable = ServicesTable {
    status_server_domain: "https://status.btfs.io",
    hub_domain: "https://hub.btfs.io",
    escrow_domain: "https://escrow.btfs.io",
    guard_domain: "https://guard.btfs.io",
    exchange_domain: "https://exchange.bt.co",
    solidity_domain: "grpc.trongrid.io:50052",
    fullnode_domain: "grpc.trongrid.io:50051",
    trongrid_domain: "https://api.trongrid.io",
    escrow_pub_keys: &["CAISIQPAfB2Mt2ic+n3JcL4vrKXxBCmB0iNh+5BYiXdJNWed/Q=="],
    guard_pub_keys: &["CAISIQJ16EiwvGko4SaBEEUFyMdNZp1vKsTLgIXCY6fRa3/Obg=="],
};

pub const STAGING_SERVICES: ServicesTable = ServicesTable {
    status_server_domain: "https://status-staging.btfs.io",
    hub_domain: "https://hub-staging.btfs.io",
    escrow_domain: "https://escrow-staging.btfs.io",
    guard_domain: "https://guard-staging.btfs.io",
    exchange_domain: "https://exchange-staging.bt.co",
    solidity_domain: "grpc.trongrid.io:50052",
    fullnode_domain: "grpc.trongrid.io:50051",
    trongrid_domain: "https://api.shasta.trongrid.io",
    escrow_pub_keys: &["CAISIQJOcRK0q4TOwpswAkvMMq33ksQfhplEyhHcZnEUFbthQg=="],
    guard_pub_keys: &["CAISIQJhPBQWKPPjYcuPWR9sl+QlN0wJSRbQs3yUKmggvubXwg=="],
};

pub const DEV_SERVICES: ServicesTable = ServicesTable {
    status_server_domain: "https://status-dev.btfs.io",
    hub_domain: "https://hub-dev.btfs.io",
    escrow_domain: "https://escrow-dev.btfs.io",
    guard_domain: "https://guard-dev.btfs.io",
    exchange_domain: "https://exchange-dev.bt.co",
    solidity_domain: "grpc.trongrid.io:50052",
    fullnode_domain: "grpc.trongrid.io:50051",
    trongrid_domain: "https://api.shasta.trongrid.io",
    escrow_pub_keys: &["CAISIQJOcRK0q4TOwpswAkvMMq33ksQfhplEyhHcZnEUFbthQg=="],
    guard_pub_keys: &["CAISIQJhPBQWKPPjYcuPWR9sl+QlN0wJSRbQs3yUKmggvubXwg=="],
};

/// The tables compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinServices;

impl ServiceDefaults for BuiltinServices {
    fn services(&self, family: DeploymentFamily) -> Services {
        let table = match family {
            DeploymentFamily::Production => &PRODUCTION_SERVICES,
            DeploymentFamily::Staging => &STAGING_SERVICES,
            DeploymentFamily::Dev => &DEV_SERVICES,
        };
        Services::from(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_detect_as_their_own_family() {
        for family in [
            DeploymentFamily::Production,
            DeploymentFamily::Staging,
            DeploymentFamily::Dev,
        ] {
            let services = BuiltinServices.services(family);
            assert_eq!(DeploymentFamily::detect(&services), family);
            assert!(!services.is_blank());
        }
    }

    #[test]
    fn detection_uses_first_populated_domain() {
        let services = Services {
            hub_domain: "https://hub-dev.btfs.io".into(),
            status_server_domain: "https://status-staging.btfs.io".into(),
            ..Default::default()
        };
        assert_eq!(DeploymentFamily::detect(&services), DeploymentFamily::Dev);
        assert_eq!(
            DeploymentFamily::detect(&Services::default()),
            DeploymentFamily::Production
        );
    }

    #[test]
    fn blank_means_every_field_empty() {
        assert!(Services::default().is_blank());
        let keys_only = Services {
            guard_pub_keys: vec!["k".into()],
            ..Default::default()
        };
        assert!(!keys_only.is_blank());

        let mut unknown_only = Services::default();
        unknown_only
            .extra
            .insert("OnlineServerDomain".into(), Value::from("https://online.btfs.io"));
        assert!(!unknown_only.is_blank());
    }

    #[test]
    fn field_accessors_round_trip() {
        let mut services = Services::default();
        for field in ServiceField::ALL {
            *field.get_mut(&mut services) = format!("{:?}", field);
        }
        for (field, value) in services.domains() {
            assert_eq!(value, format!("{:?}", field));
        }
        assert_eq!(services.trongrid_ip, "TrongridIp");
    }
}
