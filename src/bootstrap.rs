//! Bootstrap peers: parsing, default catalogs and obsolescence checks.
//!
//! Entries are multiaddrs such as
//! `/ip4/3.14.238.171/tcp/4001/p2p/QmRb1Vi7JeNMVE2QVvCuWFU2J2qt6rn4pLf31CHyjt9GbB`.
//! Everything before the trailing `/p2p/<id>` segment is the endpoint used
//! to dial the peer. The older `/ipfs/<id>` spelling is accepted on input
//! and written back as `/p2p/<id>`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use libp2p::multiaddr::Protocol;
use libp2p::{Multiaddr, PeerId};

use crate::document::Config;
use crate::error::{Error, Result};
use crate::network::Network;

/// Bootstrap peers of the production network.
pub const PRODUCTION_BOOTSTRAP: &[&str] = &[
    "/ip4/3.14.238.171/tcp/4001/p2p/QmRb1Vi7JeNMVE2QVvCuWFU2J2qt6rn4pLf31CHyjt9GbB",
    "/ip4/3.18.120.107/tcp/4001/p2p/QmcmRdAHQYTtpbs9Ud5rNx6WzHmU9WcYCrBneCSyKhMr7H",
    "/ip4/3.14.203.8/tcp/4001/p2p/QmbsqP3GLrRRhGWwnXnb6gb7EFC9LAege333NBpn9cDXAv",
];

/// Bootstrap peers of the test network.
pub const TEST_BOOTSTRAP: &[&str] = &[
    "/ip4/18.188.245.33/tcp/4001/p2p/QmNnooDu7bfjPFoTZYxMNLWUQJyrVwtbZg5gBMjTezGAJN",
    "/ip4/3.20.13.112/tcp/4001/p2p/QmQCU2EcMqAqQPR2i9bChDtGNJchTbq5TbXJJ16u19uLTa",
    "/ip4/3.19.82.218/tcp/4001/p2p/QmbLHAnMoJPWSCR5Zhtx6BHJX9KiKNN6tpvbUcqanj75Nb",
];

/// Endpoints of retired production bootstrap nodes.
pub const PRODUCTION_OBSOLETE_MARKERS: &[&str] = &[
    "/ip4/18.237.54.123/",
    "/ip4/54.213.128.120/",
    "/ip4/35.163.45.200/",
];

/// Endpoints of retired test network bootstrap nodes.
pub const TEST_OBSOLETE_MARKERS: &[&str] = &["/ip4/18.220.204.165/", "/ip4/52.15.101.94/"];

pub fn default_addresses(network: Network) -> &'static [&'static str] {
    match network {
        Network::Production => PRODUCTION_BOOTSTRAP,
        Network::Test => TEST_BOOTSTRAP,
    }
}

pub fn obsolete_markers(network: Network) -> &'static [&'static str] {
    match network {
        Network::Production => PRODUCTION_OBSOLETE_MARKERS,
        Network::Test => TEST_OBSOLETE_MARKERS,
    }
}

/// A dialable endpoint together with the peer expected to answer on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    endpoint: Multiaddr,
    peer_id: PeerId,
}

impl PeerAddress {
    pub fn endpoint(&self) -> &Multiaddr {
        &self.endpoint
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }
}

impl FromStr for PeerAddress {
    type Err = Error;

    fn from_str(addr: &str) -> Result<Self> {
        let mut endpoint: Multiaddr = addr
            .trim()
            .parse()
            .map_err(|e| Error::invalid_address(addr, e))?;

        let peer_id = match endpoint.pop() {
            Some(Protocol::P2p(peer_id)) => peer_id,
            _ => {
                return Err(Error::invalid_address(
                    addr,
                    "address must end with a /p2p/<peer id> segment",
                ))
            }
        };
        if endpoint.is_empty() {
            return Err(Error::invalid_address(
                addr,
                "no transport segment before the peer id",
            ));
        }
        if endpoint.iter().any(|p| matches!(p, Protocol::P2p(_))) {
            return Err(Error::invalid_address(addr, "more than one peer id segment"));
        }

        Ok(PeerAddress { endpoint, peer_id })
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint.clone().with(Protocol::P2p(self.peer_id)))
    }
}

pub fn parse_peer(addr: &str) -> Result<PeerAddress> {
    addr.parse()
}

/// Parses every entry, in order. The first malformed entry fails the whole
/// batch.
pub fn parse_peers<S: AsRef<str>>(addrs: &[S]) -> Result<Vec<PeerAddress>> {
    addrs.iter().map(|addr| parse_peer(addr.as_ref())).collect()
}

/// Encodes peers back to strings, one per distinct endpoint of each peer,
/// in first-seen order.
pub fn peer_strings(peers: &[PeerAddress]) -> Vec<String> {
    let mut seen = HashSet::new();
    peers
        .iter()
        .filter(|peer| seen.insert(*peer))
        .map(PeerAddress::to_string)
        .collect()
}

/// Parses the hardcoded catalog of `network`.
///
/// The catalog is parsed fresh on every call. A failure here means the
/// binary was built with a broken catalog, and the error says so.
pub fn default_peers(network: Network) -> Result<Vec<PeerAddress>> {
    parse_peers(default_addresses(network)).map_err(|source| Error::DefaultBootstrap {
        network,
        source: Box::new(source),
    })
}

/// True when any marker occurs anywhere in any entry.
pub fn has_obsolete_entry<S: AsRef<str>>(addrs: &[S], markers: &[&str]) -> bool {
    addrs
        .iter()
        .any(|addr| markers.iter().any(|marker| addr.as_ref().contains(marker)))
}

impl Config {
    pub fn bootstrap_peers(&self) -> Result<Vec<PeerAddress>> {
        parse_peers(&self.bootstrap)
    }

    pub fn set_bootstrap_peers(&mut self, peers: &[PeerAddress]) {
        self.bootstrap = peer_strings(peers);
    }
}
