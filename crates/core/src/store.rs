//! Capability interface for the persisted key/value configuration store.

use crate::error::StoreError;

/// A sectioned key/value store that chat directives read and mutate.
///
/// An empty `section` addresses the global (unnamed) section.
/// Mutations must be durable before the call returns.
pub trait ConfigStore: Send + Sync {
    /// Current value of `property` in `section`, or an empty string when absent.
    fn get(&self, section: &str, property: &str) -> Result<String, StoreError>;

    /// Write `value` and persist it.
    fn set(&self, section: &str, property: &str, value: &str) -> Result<(), StoreError>;

    /// Revert every value to the baseline snapshot and persist it.
    fn restore(&self) -> Result<(), StoreError>;
}
