//! Allow-list deciding which chat users are privileged senders.

use std::collections::HashSet;

use chatcfg_core::Settings;
use tracing::{debug, info};

/// Who may issue raw directives without an alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    restricted: bool,
    /// Trimmed lower-case usernames.
    allowed: HashSet<String>,
}

impl AccessPolicy {
    /// Everyone is privileged.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Only the given users are privileged.
    pub fn restricted<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = users
            .into_iter()
            .map(|u| u.as_ref().trim().to_lowercase())
            .filter(|u| !u.is_empty())
            .collect();
        Self {
            restricted: true,
            allowed,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        debug!("loading allowed users");
        let policy = if settings.restrict_commands_to_allowed_users {
            Self::restricted(&settings.allowed_users)
        } else {
            Self::unrestricted()
        };
        policy.log_status();
        policy
    }

    pub fn is_privileged(&self, user: &str) -> bool {
        !self.restricted || self.allowed.contains(&user.trim().to_lowercase())
    }

    fn log_status(&self) {
        if self.restricted {
            let mut users: Vec<_> = self.allowed.iter().map(String::as_str).collect();
            users.sort_unstable();
            info!("directive access is restricted to allowed users only");
            info!("loaded allow-list: {}", users.join(", "));
        } else {
            info!("directive access is unrestricted (anyone can issue directives)");
        }
    }
}
