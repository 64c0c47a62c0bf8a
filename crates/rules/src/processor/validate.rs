use tracing::debug;

use crate::rule_set::RuleSet;

impl RuleSet {
    /// Decide whether a raw chat line is actionable.
    ///
    /// Rules, first match wins: reject empty or over-long lines (length in
    /// characters, before trimming); reject anything outside printable ASCII;
    /// accept known aliases; accept directive-marked lines from privileged
    /// senders; reject everything else.
    pub fn is_valid_command(&self, line: &str, allow_privileged: bool) -> bool {
        let too_long = self
            .max_message_length()
            .is_some_and(|max| line.chars().count() > max);
        if line.trim().is_empty() || too_long {
            debug!("invalid command: empty or too long");
            return false;
        }

        let line = line.trim();

        if !line.chars().all(is_printable_ascii) {
            debug!("invalid command: contains non-printable or non-ascii characters");
            return false;
        }

        if self.alias(line).is_some() {
            debug!(cmd = %line.to_lowercase(), "valid command: matches known alias");
            return true;
        }

        if allow_privileged && self.starts_with_marker(line) {
            debug!("valid command: privileged sender and directive marker present");
            return true;
        }

        false
    }
}

fn is_printable_ascii(c: char) -> bool {
    c == ' ' || c.is_ascii_graphic()
}
