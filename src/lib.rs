//! Keeps a node's persisted configuration current across releases.
//!
//! * [`store`] reads and atomically writes the configuration file.
//! * [`migration`] upgrades a loaded document in place.
//! * [`bootstrap`] parses, encodes and replaces bootstrap peer lists.

pub mod bootstrap;
pub mod config;
pub mod document;
pub mod error;
pub mod migration;
pub mod network;
pub mod profile;
pub mod services;
pub mod store;

pub use document::Config;
pub use error::{Error, Result};
pub use migration::{migrate, MigrationHints, Migrator};
