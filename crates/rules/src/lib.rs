//! Chat command recognition and execution.
//!
//! This crate provides:
//! - Rule set construction from settings (alias table, get/set patterns, directive tokens)
//! - Settings file loader with hot-reload via `notify` watcher
//! - Command validation and directive execution against a [`ConfigStore`]
//! - Human-readable reply formatting
//!
//! [`ConfigStore`]: chatcfg_core::ConfigStore

pub mod loader;
pub mod processor;
pub mod reply;
pub mod rule_set;

pub use loader::{Result, RuleError, SettingsSource};
pub use processor::CommandProcessor;
pub use rule_set::{Directive, RuleSet};
