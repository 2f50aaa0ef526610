//! Session Configuration

use intake_schema::FieldDefinition;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::default_fields;

/// Intake session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntakeConfig {
    /// Fields used when the store has no configuration
    pub default_fields: Vec<FieldDefinition>,
    /// Per-call deadline for store and notifier calls, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
    /// Record key holding the confirmation address. When unset, the first
    /// `email` field of the form is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_field: Option<String>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            default_fields: default_fields(),
            deadline_ms: None,
            recipient_field: None,
        }
    }
}

impl IntakeConfig {
    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(deadline.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn with_default_fields(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.default_fields = fields;
        self
    }

    pub fn with_recipient_field(mut self, name: impl Into<String>) -> Self {
        self.recipient_field = Some(name.into());
        self
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_schema::FieldType;

    #[test]
    fn test_default_config_uses_default_fields() {
        let config = IntakeConfig::default();
        assert_eq!(config.default_fields, default_fields());
        assert_eq!(config.deadline(), None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: IntakeConfig = serde_json::from_str(r#"{"deadlineMs": 2500}"#).unwrap();
        assert_eq!(config.deadline(), Some(Duration::from_millis(2500)));
        assert_eq!(config.default_fields.len(), 3);
        assert_eq!(config.recipient_field, None);
    }

    #[test]
    fn test_custom_default_fields() {
        let json = r#"{
            "defaultFields": [
                {"id": "a", "name": "party", "label": "Party size", "type": "number", "required": true, "min": 1}
            ],
            "recipientField": "contact"
        }"#;
        let config: IntakeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.default_fields.len(), 1);
        assert_eq!(config.default_fields[0].field_type, FieldType::Number);
        assert_eq!(config.default_fields[0].min, Some(1.0));
        assert_eq!(config.recipient_field.as_deref(), Some("contact"));
    }

    #[test]
    fn test_missing_file() {
        let err = IntakeConfig::load("/nonexistent/intake.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("intake-config-{}.json", std::process::id()));
        let config = IntakeConfig::default()
            .with_deadline(Duration::from_millis(750))
            .with_default_fields(vec![FieldDefinition::new("1", "party", "Party", FieldType::Number)
                .required()
                .with_min(1.0)]);

        config.save(&path).unwrap();
        assert_eq!(IntakeConfig::load(&path).unwrap(), config);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_builder() {
        let config = IntakeConfig::default()
            .with_deadline(Duration::from_secs(3))
            .with_recipient_field("contact_email");
        assert_eq!(config.deadline_ms, Some(3000));
        assert_eq!(config.recipient_field.as_deref(), Some("contact_email"));
    }
}
