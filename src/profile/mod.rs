//! Named presets that set several related fields at once.

use crate::document::Config;

pub mod presets;
pub use presets::{StorageClient, StorageHost};

pub trait Profile {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Applies the preset. Applying it twice must leave the document as
    /// applying it once did.
    fn apply(&self, cfg: &mut Config);
}

/// Looks profiles up by name.
pub trait ProfileRegistry {
    fn profile(&self, name: &str) -> Option<&dyn Profile>;
}

/// The presets compiled into this crate.
pub struct BuiltinProfiles {
    profiles: Vec<Box<dyn Profile + Send + Sync>>,
}

impl BuiltinProfiles {
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.profiles.iter().map(|p| p.name())
    }
}

impl Default for BuiltinProfiles {
    fn default() -> Self {
        Self {
            profiles: vec![Box::new(StorageHost), Box::new(StorageClient)],
        }
    }
}

impl ProfileRegistry for BuiltinProfiles {
    fn profile(&self, name: &str) -> Option<&dyn Profile> {
        self.profiles
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref() as &dyn Profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_builtin_presets() {
        let registry = BuiltinProfiles::default();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec![presets::STORAGE_HOST, presets::STORAGE_CLIENT]
        );
        assert_eq!(
            registry.profile(presets::STORAGE_HOST).map(|p| p.name()),
            Some(presets::STORAGE_HOST)
        );
        assert!(registry.profile("lowpower").is_none());
    }
}
