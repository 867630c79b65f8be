//! Address space configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::export::pipeline::{DEFAULT_PUBLICATION_DATE_FORMAT, is_valid_date_format};

/// Configuration of an address space context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressSpaceConfig {
    /// Import the built-in standard node set on construction
    pub load_standard_model: bool,
    /// Namespace exported by `validate_and_export_model` (last registered when unset)
    pub target_namespace: Option<String>,
    /// Publication date declared for namespaces without one ("now" when unset)
    pub default_publication_date: Option<DateTime<Utc>>,
    /// chrono format string for declared publication dates
    pub publication_date_format: String,
}

impl Default for AddressSpaceConfig {
    fn default() -> Self {
        Self {
            load_standard_model: true,
            target_namespace: None,
            default_publication_date: None,
            publication_date_format: DEFAULT_PUBLICATION_DATE_FORMAT.to_string(),
        }
    }
}

impl AddressSpaceConfig {
    /// Create a new config
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from YAML; missing fields take their defaults
    pub fn from_yaml(yaml_content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml_content)
    }

    /// Set whether the standard model is loaded
    pub fn with_standard_model(mut self, load: bool) -> Self {
        self.load_standard_model = load;
        self
    }

    /// Set the target namespace
    pub fn with_target_namespace(mut self, uri: impl Into<String>) -> Self {
        self.target_namespace = Some(uri.into());
        self
    }

    pub fn with_default_publication_date(mut self, date: DateTime<Utc>) -> Self {
        self.default_publication_date = Some(date);
        self
    }

    pub fn with_publication_date_format(mut self, format: impl Into<String>) -> Self {
        self.publication_date_format = format.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.publication_date_format.trim().is_empty() {
            return Err("Publication date format must not be empty".to_string());
        }
        if !is_valid_date_format(&self.publication_date_format) {
            return Err(format!(
                "Publication date format '{}' is not a valid chrono format",
                self.publication_date_format
            ));
        }
        if self
            .target_namespace
            .as_deref()
            .is_some_and(|uri| uri.trim().is_empty())
        {
            return Err("Target namespace must not be empty".to_string());
        }
        Ok(())
    }
}
