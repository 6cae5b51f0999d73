//! User-facing notifications

use moneta_config::NotificationConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Success => write!(f, "success"),
            NotificationLevel::Error => write!(f, "error"),
            NotificationLevel::Warning => write!(f, "warning"),
            NotificationLevel::Info => write!(f, "info"),
        }
    }
}

/// Message handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// How long the message stays visible
    pub duration: Duration,
}

/// Builds notifications with the configured durations
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    config: NotificationConfig,
}

impl Notifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    pub fn duration(&self, level: NotificationLevel) -> Duration {
        let ms = match level {
            NotificationLevel::Success => self.config.success_ms,
            NotificationLevel::Error => self.config.error_ms,
            NotificationLevel::Warning => self.config.warning_ms,
            NotificationLevel::Info => self.config.info_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn notification(&self, level: NotificationLevel, message: impl Into<String>) -> Notification {
        Notification {
            level,
            message: message.into(),
            duration: self.duration(level),
        }
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.notification(NotificationLevel::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.notification(NotificationLevel::Error, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Notification {
        self.notification(NotificationLevel::Warning, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Notification {
        self.notification(NotificationLevel::Info, message)
    }

    /// Map an error to what the user sees; `fallback` covers unmapped statuses
    pub fn from_error(&self, error: &CoreError, fallback: &str) -> Notification {
        match error {
            CoreError::Validation { message } | CoreError::InvalidCredentials { message } => self.error(message.clone()),
            CoreError::Network { .. } => self.error("Could not reach the server. Check your connection."),
            CoreError::NotAuthenticated => self.warning("Please log in to continue."),
            _ => match error.status() {
                Some(400) => self.error("Invalid data. Check the fields and try again."),
                Some(401) => self.error("Session expired. Please log in again."),
                Some(403) => self.error("You do not have permission to perform this action."),
                Some(404) => self.error("Resource not found."),
                Some(409) => self.warning(match error {
                    CoreError::Conflict { message } if !message.is_empty() => message.clone(),
                    _ => "Conflict: the resource is in use or already exists.".to_string(),
                }),
                Some(422) => self.error("Invalid input. Check the fields and try again."),
                Some(500) => self.error("Internal server error. Try again later."),
                _ => match error {
                    CoreError::Api { message, .. } if !message.is_empty() => self.error(message.clone()),
                    _ => self.error(fallback),
                },
            },
        }
    }
}
