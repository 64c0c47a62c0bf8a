use chatcfg_core::{ConfigStore, StoreError};
use tracing::debug;

use crate::reply::{get_reply, set_reply, RESET_REPLY};
use crate::rule_set::{Directive, RuleSet};

impl RuleSet {
    /// Resolve aliases, enforce privilege, then run the directive.
    ///
    /// Alias expansions always run as privileged. Performs at most one store
    /// call.
    pub fn execute(
        &self,
        line: &str,
        allow_privileged: bool,
        store: &dyn ConfigStore,
    ) -> Result<Option<String>, StoreError> {
        let line = line.trim();

        if let Some(expansion) = self.alias(line) {
            debug!(cmd = %line.to_lowercase(), sub = %expansion, "executing alias");
            return self.execute_directive(expansion, store);
        }

        if !allow_privileged {
            return Ok(None);
        }
        self.execute_directive(line, store)
    }

    /// Evaluate directive text. Unrecognized text is a silent no-op.
    pub fn execute_directive(
        &self,
        cmd: &str,
        store: &dyn ConfigStore,
    ) -> Result<Option<String>, StoreError> {
        let Some(directive) = self.parse_directive(cmd) else {
            return Ok(None);
        };

        let reply = match directive {
            Directive::Reset => {
                debug!("recognized as reset command");
                store.restore()?;
                RESET_REPLY.to_string()
            }
            Directive::Get { section, property } => {
                let value = store.get(&section, &property)?;
                debug!(%section, %property, %value, "recognized as get command");
                get_reply(&section, &property, &value)
            }
            Directive::Set {
                section,
                property,
                value,
            } => {
                store.set(&section, &property, &value)?;
                debug!(%section, %property, %value, "recognized as set command");
                set_reply(&section, &property, &value)
            }
        };
        Ok(Some(reply))
    }
}
