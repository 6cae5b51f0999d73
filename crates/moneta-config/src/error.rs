//! Error types for moneta-config

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigErrorCode {
    FileNotFound,
    Unreadable,
    InvalidYaml,
    MissingField,
    InvalidValue,
    /// Thousands and decimal separators are the same character
    SeparatorConflict,
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErrorCode::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            ConfigErrorCode::Unreadable => write!(f, "UNREADABLE"),
            ConfigErrorCode::InvalidYaml => write!(f, "INVALID_YAML"),
            ConfigErrorCode::MissingField => write!(f, "MISSING_FIELD"),
            ConfigErrorCode::InvalidValue => write!(f, "INVALID_VALUE"),
            ConfigErrorCode::SeparatorConflict => write!(f, "SEPARATOR_CONFLICT"),
        }
    }
}

/// What went wrong with the config file and how to fix it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    /// Dotted path of the offending setting, e.g. `pagination.page_size`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ConfigErrorDetails {
    pub fn new(code: ConfigErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            field: None,
            suggestions: vec![],
        }
    }

    pub fn with_field(mut self, field: String) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, "\nSetting: {}", field)?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  hint: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigErrorSeverity {
    /// The client can still start on defaults
    Warning,
    Error,
}

impl std::fmt::Display for ConfigErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErrorSeverity::Warning => write!(f, "warning"),
            ConfigErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Could not read {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("Invalid YAML: {message}")]
    InvalidYaml { message: String },

    #[error("Missing required setting: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Thousands and decimal separators are both {separator:?}")]
    SeparatorConflict { separator: String },
}

/// Value the bundled template uses for a setting
fn template_default(field: &str) -> Option<&'static str> {
    match field {
        "api.base_url" => Some("\"http://127.0.0.1:8000\""),
        "api.timeout_secs" => Some("30"),
        "api.list_limit" => Some("1000"),
        "pagination.page_size" => Some("10"),
        "currency.decimal_places" => Some("2"),
        _ => None,
    }
}

impl ConfigError {
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::Unreadable { .. } => ConfigErrorCode::Unreadable,
            ConfigError::InvalidYaml { .. } => ConfigErrorCode::InvalidYaml,
            ConfigError::MissingField { .. } => ConfigErrorCode::MissingField,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
            ConfigError::SeparatorConflict { .. } => ConfigErrorCode::SeparatorConflict,
        }
    }

    /// A missing file is only a warning: `load_or_default` runs on defaults
    pub fn severity(&self) -> ConfigErrorSeverity {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorSeverity::Warning,
            _ => ConfigErrorSeverity::Error,
        }
    }

    pub fn to_details(&self) -> ConfigErrorDetails {
        let mut details = ConfigErrorDetails::new(self.code(), self.to_string());

        match self {
            ConfigError::FileNotFound { .. } => {
                details = details.with_suggestion("Pass the right file with `--config <path>`.".to_string());
                details = details.with_suggestion("Run `moneta init-config` to write the defaults.".to_string());
            }
            ConfigError::Unreadable { .. } => {
                details = details.with_suggestion("Check the file permissions.".to_string());
            }
            ConfigError::InvalidYaml { .. } => {
                details = details.with_suggestion(
                    "Compare with the template written by `moneta init-config --force`.".to_string(),
                );
            }
            ConfigError::MissingField { field } => {
                details = details.with_field(field.clone());
                details = details.with_suggestion(format!("Set `{}` in the config file.", field));
            }
            ConfigError::InvalidValue { field, reason } => {
                details = details.with_field(field.clone());
                details = details.with_suggestion(reason.clone());
                if let Some(default) = template_default(field) {
                    details = details.with_suggestion(format!("The default is `{}: {}`.", field, default));
                }
            }
            ConfigError::SeparatorConflict { .. } => {
                details = details.with_field("currency".to_string());
                details = details.with_suggestion(
                    "Use `thousands_separator: \".\"` with `decimal_separator: \",\"` for R$ 1.234,56.".to_string(),
                );
            }
        }

        details
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_code() {
        let error = ConfigError::FileNotFound {
            path: "/path/to/config.yaml".to_string(),
        };
        assert_eq!(error.code(), ConfigErrorCode::FileNotFound);
        assert_eq!(error.code().to_string(), "FILE_NOT_FOUND");
        assert_eq!(error.severity(), ConfigErrorSeverity::Warning);

        let error = ConfigError::SeparatorConflict {
            separator: ",".to_string(),
        };
        assert_eq!(error.code().to_string(), "SEPARATOR_CONFLICT");
        assert_eq!(error.severity(), ConfigErrorSeverity::Error);
    }

    #[test]
    fn test_invalid_value_suggests_template_default() {
        let error = ConfigError::InvalidValue {
            field: "pagination.page_size".to_string(),
            reason: "Page size must be greater than 0".to_string(),
        };
        let details = error.to_details();

        assert_eq!(details.field.as_deref(), Some("pagination.page_size"));
        assert_eq!(
            details.suggestions,
            vec![
                "Page size must be greater than 0".to_string(),
                "The default is `pagination.page_size: 10`.".to_string(),
            ]
        );
        assert!(details.to_string().starts_with("[INVALID_VALUE]"));
    }

    #[test]
    fn test_unknown_field_has_no_default_hint() {
        let error = ConfigError::InvalidValue {
            field: "logging.level".to_string(),
            reason: "Unknown level".to_string(),
        };
        assert_eq!(error.to_details().suggestions.len(), 1);
    }

    #[test]
    fn test_details_display() {
        let details = ConfigError::MissingField {
            field: "currency.decimal_separator".to_string(),
        }
        .to_details();
        assert_eq!(
            details.to_string(),
            "[MISSING_FIELD] Missing required setting: currency.decimal_separator\n\
             Setting: currency.decimal_separator\n  \
             hint: Set `currency.decimal_separator` in the config file."
        );
    }
}
