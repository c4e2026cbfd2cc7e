//! External checksum plugins, looked up by algorithm name at call time.

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// An externally supplied checksum computation, invoked for any fixity
/// algorithm outside the built-in set.
///
/// Plugins open and read the file themselves; the declared value is passed
/// through for plugins whose output depends on it. Value comparison for
/// plugin results is exact (case included), unlike the built-in digests.
pub trait ChecksumPlugin: Send + Sync {
    fn compute(&self, path: &Path, declared: Option<&str>) -> Result<String>;
}

/// Registry of active checksum plugins keyed by algorithm name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn ChecksumPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `plugin` under `name`, replacing any previous registration.
    pub fn register(&mut self, name: impl Into<String>, plugin: Arc<dyn ChecksumPlugin>) {
        let name = name.into();
        tracing::debug!(plugin = %name, "registered checksum plugin");
        self.plugins.insert(name, plugin);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ChecksumPlugin>> {
        self.plugins.get(name)
    }
}
