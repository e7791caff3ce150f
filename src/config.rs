//! Store configuration

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Storage strategy selection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecializationMode {
    /// Use a specializer when one is available, else the long-encoded fallback
    #[default]
    Auto,
    /// Always use the long-encoded fallback
    Disabled,
}

/// Settings applied when compiling an experiment set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage strategy selection policy
    pub specialization: SpecializationMode,
}

impl StoreConfig {
    /// Read a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not a valid configuration.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Set the storage strategy selection policy
    #[must_use]
    pub const fn with_specialization(mut self, mode: SpecializationMode) -> Self {
        self.specialization = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(StoreConfig::default().specialization, SpecializationMode::Auto);
        assert_eq!(StoreConfig::from_json("{}").unwrap(), StoreConfig::default());
    }

    #[test]
    fn test_from_json() {
        let config = StoreConfig::from_json(r#"{"specialization": "disabled"}"#).unwrap();
        assert_eq!(config.specialization, SpecializationMode::Disabled);
    }

    #[test]
    fn test_from_json_rejects_unknown_mode() {
        let result = StoreConfig::from_json(r#"{"specialization": "jit"}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
