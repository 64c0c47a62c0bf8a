use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Resolve a `${VAR}` reference against the environment.
///
/// Values that are not of that exact form are returned unchanged.
pub fn resolve_env_ref(value: &str) -> Result<String, SettingsError> {
    if !value.starts_with("${") {
        return Ok(value.to_string());
    }
    let var_name = value
        .strip_prefix("${")
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| SettingsError::Validation(format!("Malformed env var reference: {value}")))?;
    env::var(var_name)
        .map_err(|_| SettingsError::Validation(format!("Environment variable '{var_name}' is not set")))
}

// ── Settings document ─────────────────────────────────────────

/// The full settings document, read from YAML and hot-reloaded on change.
///
/// Command recognition fields feed the rule set; chat and INI fields feed the
/// gateway and the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Usernames allowed to issue raw directives when access is restricted.
    pub allowed_users: Vec<String>,
    pub restrict_commands_to_allowed_users: bool,

    /// Alias entries: `[trigger, expansion]`. Extra elements are ignored,
    /// entries with fewer than two elements are skipped.
    pub commands: Vec<Vec<String>>,
    pub command_get_regex: String,
    pub command_set_regex: String,
    pub command_prefix: String,
    pub command_delimiter: String,
    pub command_reset: String,
    /// Maximum accepted line length in characters (`None` = unbounded).
    pub max_message_length: Option<usize>,

    pub access_token: String,
    pub channel: String,
    pub bot_username: String,
    pub post_responses_in_chat: bool,

    pub original_ini_path: Option<PathBuf>,
    pub modified_ini_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_yaml(content: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// The access token with any `${VAR}` reference resolved.
    pub fn resolved_access_token(&self) -> Result<String, SettingsError> {
        resolve_env_ref(self.access_token.trim())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Settings loaded:");
        tracing::info!("  commands:    {} alias entries", self.commands.len());
        tracing::info!(
            "  directives:  prefix={:?}, delimiter={:?}, reset={:?}",
            self.command_prefix,
            self.command_delimiter,
            self.command_reset
        );
        tracing::info!(
            "  chat:        channel={}, bot={}, post_responses={}",
            self.channel,
            self.bot_username,
            self.post_responses_in_chat
        );
        tracing::info!(
            "  ini:         original={}, modified={}",
            display_path(self.original_ini_path.as_deref()),
            display_path(self.modified_ini_path.as_deref())
        );
    }

    /// Return a redacted view safe for debug output (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "commands": self.commands.len(),
            "command_prefix": self.command_prefix,
            "command_delimiter": self.command_delimiter,
            "command_reset": self.command_reset,
            "max_message_length": self.max_message_length,
            "chat": {
                "channel": self.channel,
                "bot_username": self.bot_username,
                "access_token_set": !self.access_token.trim().is_empty(),
                "post_responses_in_chat": self.post_responses_in_chat,
            },
            "access": {
                "restricted": self.restrict_commands_to_allowed_users,
                "allowed_users": self.allowed_users.len(),
            },
            "ini": {
                "original": self.original_ini_path,
                "modified": self.modified_ini_path,
            },
        })
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string())
}
