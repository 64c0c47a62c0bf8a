//! Error types for rule set construction and settings loading.

use chatcfg_core::SettingsError;

/// Errors that can occur while building or reloading command rules.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A get/set command pattern failed to compile.
    #[error("invalid {name} pattern: {source}")]
    InvalidPattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    /// Settings file could not be read or parsed.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
