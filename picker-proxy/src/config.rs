//! Configuration for picker proxies.

use serde::{Deserialize, Serialize};

/// Maximum journal entries kept by default.
const DEFAULT_JOURNAL_CAPACITY: usize = 1_000;

/// What a `cancel()` issued while the picker is still loading does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingCancelPolicy {
    /// Wait for the load to settle, then forward `cancel` like any other call
    #[default]
    WaitThenForward,
    /// Drop the in-flight load and fail the proxy with `Aborted`
    AbortIfLoading,
}

/// Configuration shared by the proxies a client builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Cancel behavior during loading
    pub loading_cancel: LoadingCancelPolicy,
    /// Record every operation in a journal
    pub journal_enabled: bool,
    /// Maximum journal entries before pruning
    pub journal_capacity: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            loading_cancel: LoadingCancelPolicy::default(),
            journal_enabled: false,
            journal_capacity: DEFAULT_JOURNAL_CAPACITY,
        }
    }
}

impl ProxyConfig {
    /// Set the cancel-while-loading policy.
    pub fn with_loading_cancel(mut self, policy: LoadingCancelPolicy) -> Self {
        self.loading_cancel = policy;
        self
    }

    /// Enable the operation journal.
    pub fn with_journal(mut self, capacity: usize) -> Self {
        self.journal_enabled = true;
        self.journal_capacity = capacity;
        self
    }

    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProxyConfig::default();
        assert_eq!(config.loading_cancel, LoadingCancelPolicy::WaitThenForward);
        assert!(!config.journal_enabled);
        assert_eq!(config.journal_capacity, 1_000);
    }

    #[test]
    fn test_partial_yaml() {
        let config = ProxyConfig::from_yaml("loading_cancel: abort_if_loading\n").unwrap();
        assert_eq!(config.loading_cancel, LoadingCancelPolicy::AbortIfLoading);
        assert!(!config.journal_enabled);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = ProxyConfig::default().with_journal(50);
        let yaml = config.to_yaml().unwrap();
        let parsed = ProxyConfig::from_yaml(&yaml).unwrap();
        assert!(parsed.journal_enabled);
        assert_eq!(parsed.journal_capacity, 50);
    }
}
