//! Settings file loader with hot-reload via `notify` watcher.
//!
//! Watches the settings file for changes and pushes every successfully parsed
//! snapshot to the registered listeners (command rule set, access policy).

mod core;
mod error;
mod watcher;

#[cfg(test)]
mod tests;

pub use self::core::{SettingsListener, SettingsSource};
pub use self::error::{Result, RuleError};
