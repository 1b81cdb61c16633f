//! Engine configuration: default board template and commit retry budget.

use crate::board::domain::BoardTemplate;
use serde::Deserialize;
use thiserror::Error;

/// Configuration shared by board services.
///
/// # Examples
///
/// ```
/// use kanban_sync::board::services::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.max_commit_attempts, 3);
///
/// let relaxed = EngineConfig::unlimited();
/// assert!(relaxed.template.columns().iter().all(|column| column.wip_limit.is_none()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Columns a board is created with, and restored from during repair.
    pub template: BoardTemplate,
    /// Attempts made before a revision conflict is reported as a failure.
    pub max_commit_attempts: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template: BoardTemplate::standard(),
            max_commit_attempts: 3,
        }
    }
}

impl EngineConfig {
    /// Default settings with no WIP limits on any column.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            template: BoardTemplate::without_wip_limits(),
            ..Self::default()
        }
    }

    /// Replaces the board template.
    #[must_use]
    pub fn with_template(mut self, template: BoardTemplate) -> Self {
        self.template = template;
        self
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineConfigError::Parse`] for malformed JSON or an invalid
    /// template, and [`EngineConfigError::NoCommitAttempts`] for a zero
    /// attempt count.
    pub fn from_json_str(document: &str) -> Result<Self, EngineConfigError> {
        let config: Self = serde_json::from_str(document)
            .map_err(|err| EngineConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineConfigError::NoCommitAttempts`] when
    /// `max_commit_attempts` is zero.
    pub const fn validate(&self) -> Result<(), EngineConfigError> {
        if self.max_commit_attempts == 0 {
            return Err(EngineConfigError::NoCommitAttempts);
        }
        Ok(())
    }
}

/// Errors raised while loading an [`EngineConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineConfigError {
    /// The document could not be decoded.
    #[error("invalid engine configuration: {0}")]
    Parse(String),

    /// At least one commit attempt is required.
    #[error("max_commit_attempts must be at least 1")]
    NoCommitAttempts,
}
