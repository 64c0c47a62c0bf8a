//! The command processor: validation and execution of chat lines.
//!
//! Every call reads one [`RuleSet`] snapshot up front and uses it for the
//! whole call, so a reload that lands mid-call never mixes old and new rules.

mod execute;
mod validate;


use std::sync::{Arc, RwLock};

use chatcfg_core::{ConfigStore, Settings, StoreError};
use tracing::{error, info};

use crate::loader::Result;
use crate::rule_set::RuleSet;

/// Validates and executes chat lines against a hot-reloadable [`RuleSet`].
pub struct CommandProcessor {
    rules: RwLock<Arc<RuleSet>>,
    store: Arc<dyn ConfigStore>,
}

impl CommandProcessor {
    /// Build a processor from the initial settings snapshot.
    ///
    /// Fails when either command pattern does not compile.
    pub fn new(settings: &Settings, store: Arc<dyn ConfigStore>) -> Result<Self> {
        let rules = RuleSet::from_settings(settings)?;
        Ok(Self {
            rules: RwLock::new(Arc::new(rules)),
            store,
        })
    }

    /// Rebuild the rule set from `settings` and swap it in.
    ///
    /// On error the current rule set stays in place untouched.
    pub fn reload(&self, settings: &Settings) -> Result<()> {
        let staged = Arc::new(RuleSet::from_settings(settings)?);
        *self.rules.write().expect("rule set lock poisoned") = staged;
        info!("command rule set reloaded");
        Ok(())
    }

    /// Settings listener that reloads this processor, keeping the previous
    /// rule set when the new one is unusable.
    pub fn reload_listener(self: &Arc<Self>) -> impl Fn(&Settings) + Send + Sync + 'static {
        let processor = Arc::clone(self);
        move |settings: &Settings| {
            if let Err(e) = processor.reload(settings) {
                error!(error = %e, "invalid command settings, keeping previous rule set");
            }
        }
    }

    /// The current rule set snapshot.
    pub fn rules(&self) -> Arc<RuleSet> {
        Arc::clone(&self.rules.read().expect("rule set lock poisoned"))
    }

    /// Whether `line` should be acted upon. Never mutates anything.
    pub fn is_valid_command(&self, line: &str, allow_privileged: bool) -> bool {
        self.rules().is_valid_command(line, allow_privileged)
    }

    /// Execute `line`, returning the reply (if any).
    ///
    /// Store failures propagate; the reply is only produced once the store
    /// call has succeeded.
    pub fn process_command(
        &self,
        line: &str,
        allow_privileged: bool,
    ) -> std::result::Result<Option<String>, StoreError> {
        self.execute_with(&self.rules(), line, allow_privileged)
    }

    /// Validate then execute `line` against a single rule set snapshot.
    pub fn handle(
        &self,
        line: &str,
        allow_privileged: bool,
    ) -> std::result::Result<Option<String>, StoreError> {
        let rules = self.rules();
        if !rules.is_valid_command(line, allow_privileged) {
            return Ok(None);
        }
        self.execute_with(&rules, line, allow_privileged)
    }

    /// Execute `line` against a snapshot the caller already holds.
    pub fn execute_with(
        &self,
        rules: &RuleSet,
        line: &str,
        allow_privileged: bool,
    ) -> std::result::Result<Option<String>, StoreError> {
        rules.execute(line, allow_privileged, self.store.as_ref())
    }
}
