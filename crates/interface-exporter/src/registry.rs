//! Immutable list of configured targets.

use crate::config::TargetConfig;
use interface_probe::Target;
use std::sync::Arc;

/// Targets loaded at startup, shared read-only by every collection pass.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: Arc<[Target]>,
}

impl TargetRegistry {
    /// Build a registry from already-constructed targets
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            targets: targets.into(),
        }
    }

    /// Build a registry from configuration records, keeping their order
    pub fn from_configs(configs: &[TargetConfig]) -> Self {
        let targets = configs
            .iter()
            .map(|c| Target::new(c.name.clone(), c.url.clone(), c.protocol.clone(), c.check_interval))
            .collect::<Vec<_>>();
        Self::new(targets)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
