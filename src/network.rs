//! Network discriminator and the swarm keys that identify each network.

use std::fmt;

use sha2::{Digest, Sha256};

/// Swarm key of the production network.
pub const PRODUCTION_SWARM_KEY: &str = "/key/swarm/psk/1.0.0/\n/base16/\n\
64ef95289a6b998c776927ed6e33ca8c9202ee47df90141d09f5ffeeb64b8a66";

/// Swarm key of the test network.
pub const TEST_SWARM_KEY: &str = "/key/swarm/psk/1.0.0/\n/base16/\n\
d0566ce7e71d880487a89385296ab8a454967e975955ce0e59bff7991d5539d6";

const PSK_HEADER: &str = "/key/swarm/psk/1.0.0/";
const BASE16_ENCODING: &str = "/base16/";
const PSK_LEN: usize = 32;

/// The two public networks a node can join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Production,
    Test,
}

impl Network {
    pub fn swarm_key(self) -> &'static str {
        match self {
            Network::Production => PRODUCTION_SWARM_KEY,
            Network::Test => TEST_SWARM_KEY,
        }
    }

    /// Works out which public network a swarm key belongs to.
    ///
    /// Keys are compared line by line after trimming, so CRLF line endings
    /// and trailing whitespace from hand edits still match. Returns `None`
    /// for an empty key or a private network key.
    pub fn from_swarm_key(key: &str) -> Option<Network> {
        let key = normalize_key(key);
        if key.is_empty() {
            return None;
        }
        [Network::Production, Network::Test]
            .into_iter()
            .find(|network| normalize_key(network.swarm_key()) == key)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Production => f.write_str("production"),
            Network::Test => f.write_str("test"),
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Short fingerprint of a swarm key, safe to log.
///
/// Returns `None` if the key is not a base16 pre-shared key of 32 bytes.
pub fn swarm_key_fingerprint(key: &str) -> Option<String> {
    let normalized = normalize_key(key);
    let mut lines = normalized.lines();
    if lines.next()? != PSK_HEADER || lines.next()? != BASE16_ENCODING {
        return None;
    }
    let psk = hex::decode(lines.next()?).ok()?;
    if psk.len() != PSK_LEN || lines.next().is_some() {
        return None;
    }
    let digest = Sha256::digest(&psk);
    Some(hex::encode(&digest[..8]))
}
