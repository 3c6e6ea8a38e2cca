//! Configuration for the covenant core.

use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::Covenant`] instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CovenantConfig {
    /// Accept deal-health reports only from the dao's vault.
    ///
    /// The observed reporting channel is an open oracle, so this is off
    /// by default; hosts that do not trust their reporters should turn
    /// it on.
    pub vault_only_reports: bool,
    /// Projection settings
    pub projection: ProjectionConfig,
}

impl Default for CovenantConfig {
    fn default() -> Self {
        Self {
            vault_only_reports: false,
            projection: ProjectionConfig::default(),
        }
    }
}

/// Projection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Emit change records after each committed mutation
    pub enabled: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CovenantConfig::default();
        assert!(!config.vault_only_reports);
        assert!(config.projection.enabled);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = CovenantConfig::default();
        config.vault_only_reports = true;

        let json = serde_json::to_string(&config).unwrap();
        let parsed: CovenantConfig = serde_json::from_str(&json).unwrap();
        assert!(parsed.vault_only_reports);
    }
}
