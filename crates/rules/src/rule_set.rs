//! Immutable snapshot of everything that governs command recognition.

use std::collections::HashMap;

use chatcfg_core::Settings;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::loader::{Result, RuleError};

pub const SECTION_GROUP: &str = "section";
pub const PROPERTY_GROUP: &str = "property";
pub const VALUE_GROUP: &str = "value";

/// A parsed directive body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Reset,
    Get {
        section: String,
        property: String,
    },
    Set {
        section: String,
        property: String,
        value: String,
    },
}

/// Alias table, pattern pair and directive tokens.
///
/// Built once per settings snapshot and never mutated afterwards; a reload
/// produces a fresh `RuleSet` that replaces the old one as a unit.
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// Trimmed lower-case trigger -> trimmed expansion.
    aliases: HashMap<String, String>,
    get_pattern: Regex,
    set_pattern: Regex,
    command_prefix: String,
    command_delimiter: String,
    command_reset: String,
    max_message_length: Option<usize>,
}

impl RuleSet {
    /// Build a rule set from a settings snapshot.
    ///
    /// Pattern compilation failures are returned as [`RuleError::InvalidPattern`];
    /// nothing is published in that case.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let aliases = load_aliases(&settings.commands);

        debug!("compiling command patterns");
        let set_pattern = compile_pattern("command_set_regex", &settings.command_set_regex)?;
        let get_pattern = compile_pattern("command_get_regex", &settings.command_get_regex)?;
        check_groups("command_get_regex", &get_pattern, &[PROPERTY_GROUP]);
        check_groups("command_set_regex", &set_pattern, &[PROPERTY_GROUP, VALUE_GROUP]);
        debug!("command patterns compiled");

        Ok(Self {
            aliases,
            get_pattern,
            set_pattern,
            command_prefix: settings.command_prefix.clone(),
            command_delimiter: settings.command_delimiter.clone(),
            command_reset: settings.command_reset.trim().to_string(),
            max_message_length: settings.max_message_length,
        })
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    /// Expansion for a trimmed line, matched case-insensitively.
    pub fn alias(&self, line: &str) -> Option<&str> {
        self.aliases.get(&line.to_lowercase()).map(String::as_str)
    }

    pub fn max_message_length(&self) -> Option<usize> {
        self.max_message_length
    }

    /// `prefix + delimiter`, the token every directive starts with.
    pub fn directive_marker(&self) -> String {
        format!("{}{}", self.command_prefix, self.command_delimiter)
    }

    /// Remainder of `line` after the directive marker (ASCII case-insensitive).
    pub fn strip_marker<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = strip_prefix_ignore_case(line, &self.command_prefix)?;
        strip_prefix_ignore_case(rest, &self.command_delimiter)
    }

    pub fn starts_with_marker(&self, line: &str) -> bool {
        self.strip_marker(line).is_some()
    }

    /// Classify directive text.
    ///
    /// The body after the marker is trimmed, then compared against the reset
    /// keyword (ASCII case-insensitive, keyword trimmed when the rule set was
    /// built), then the get pattern, then the set pattern. An empty reset
    /// keyword disables reset. Returns `None` when `cmd` lacks the marker or
    /// its body matches none of them.
    pub fn parse_directive(&self, cmd: &str) -> Option<Directive> {
        let Some(body) = self.strip_marker(cmd) else {
            debug!(marker = %self.directive_marker(), "not a directive: missing marker");
            return None;
        };
        let body = body.trim();

        if !self.command_reset.is_empty() && body.eq_ignore_ascii_case(&self.command_reset) {
            return Some(Directive::Reset);
        }

        if let Some(caps) = self.get_pattern.captures(body) {
            return Some(Directive::Get {
                section: group(&caps, SECTION_GROUP),
                property: group(&caps, PROPERTY_GROUP),
            });
        }

        if let Some(caps) = self.set_pattern.captures(body) {
            return Some(Directive::Set {
                section: group(&caps, SECTION_GROUP),
                property: group(&caps, PROPERTY_GROUP),
                value: group(&caps, VALUE_GROUP),
            });
        }

        debug!(body = %body, "directive body matched neither pattern");
        None
    }
}

/// Build the alias table from raw `[trigger, expansion]` entries.
///
/// Short entries are skipped; on duplicate triggers the last entry wins.
pub fn load_aliases(entries: &[Vec<String>]) -> HashMap<String, String> {
    debug!("loading alias table");
    let mut aliases = HashMap::new();
    for entry in entries {
        let [trigger, expansion, ..] = entry.as_slice() else {
            debug!(entry = ?entry, "skipping alias entry: requires at least two values");
            continue;
        };
        aliases.insert(trigger.trim().to_lowercase(), expansion.trim().to_string());
    }

    let mut listing: Vec<_> = aliases.iter().collect();
    listing.sort();
    let listing = listing
        .iter()
        .map(|(k, v)| format!("{k:<20}==>   {v}"))
        .collect::<Vec<_>>()
        .join("\n");
    info!("loaded {} aliases:\n\n{}\n", aliases.len(), listing);
    aliases
}

fn compile_pattern(name: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| {
        tracing::error!(pattern = %name, error = %source, "invalid command pattern");
        RuleError::InvalidPattern { name, source }
    })
}

fn check_groups(name: &str, pattern: &Regex, required: &[&str]) {
    for group in required {
        if !pattern.capture_names().flatten().any(|n| n == *group) {
            warn!(pattern = %name, group = %group, "command pattern has no named group; captures will be empty");
        }
    }
}

fn group(caps: &regex::Captures<'_>, name: &str) -> String {
    caps.name(name).map(|m| m.as_str().to_string()).unwrap_or_default()
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET: &str = r"^(?:\[(?P<section>[^\]]+)\]\s*)?(?P<property>[A-Za-z0-9_.]+)$";
    const SET: &str =
        r"^(?:\[(?P<section>[^\]]+)\]\s*)?(?P<property>[A-Za-z0-9_.]+)\s*=\s*(?P<value>[ -~]+)$";

    fn settings() -> Settings {
        Settings {
            commands: vec![
                vec!["  LOUDER ".to_string(), " !:[Audio] Volume = 100 ".to_string()],
                vec!["lonely".to_string()],
                vec!["quiet".to_string(), "!:[Audio] Volume = 0".to_string(), "extra".to_string()],
                vec!["Quiet".to_string(), "!:[Audio] Volume = 10".to_string()],
            ],
            command_get_regex: GET.to_string(),
            command_set_regex: SET.to_string(),
            command_prefix: "!".to_string(),
            command_delimiter: ":".to_string(),
            command_reset: "reset".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn aliases_are_normalized() {
        let rules = RuleSet::from_settings(&settings()).unwrap();
        assert_eq!(rules.aliases().len(), 2);
        assert_eq!(rules.alias("louder"), Some("!:[Audio] Volume = 100"));
        assert_eq!(rules.alias("LoUdEr"), Some("!:[Audio] Volume = 100"));
    }

    #[test]
    fn duplicate_trigger_last_wins() {
        let rules = RuleSet::from_settings(&settings()).unwrap();
        assert_eq!(rules.alias("quiet"), Some("!:[Audio] Volume = 10"));
    }

    #[test]
    fn invalid_get_pattern_is_error() {
        let mut s = settings();
        s.command_get_regex = "(unclosed".to_string();
        let err = RuleSet::from_settings(&s).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { name: "command_get_regex", .. }));
    }

    #[test]
    fn invalid_set_pattern_is_error() {
        let mut s = settings();
        s.command_set_regex = "[".to_string();
        assert!(matches!(
            RuleSet::from_settings(&s),
            Err(RuleError::InvalidPattern { name: "command_set_regex", .. })
        ));
    }

    #[test]
    fn marker_is_case_insensitive() {
        let mut s = settings();
        s.command_prefix = "cfg".to_string();
        let rules = RuleSet::from_settings(&s).unwrap();
        assert_eq!(rules.strip_marker("CFG: volume"), Some(" volume"));
        assert_eq!(rules.strip_marker("cfg; volume"), None);
        assert_eq!(rules.strip_marker("cf"), None);
    }

    #[test]
    fn marker_on_multibyte_boundary() {
        let rules = RuleSet::from_settings(&settings()).unwrap();
        assert_eq!(rules.strip_marker("é:x"), None);
    }

    #[test]
    fn parses_reset_get_set() {
        let rules = RuleSet::from_settings(&settings()).unwrap();
        assert_eq!(rules.parse_directive("!: RESET "), Some(Directive::Reset));
        assert_eq!(
            rules.parse_directive("!:[Audio] Volume"),
            Some(Directive::Get {
                section: "Audio".to_string(),
                property: "Volume".to_string()
            })
        );
        assert_eq!(
            rules.parse_directive("!:Speed = 1.5"),
            Some(Directive::Set {
                section: String::new(),
                property: "Speed".to_string(),
                value: "1.5".to_string()
            })
        );
    }

    #[test]
    fn unmatched_body_is_none() {
        let rules = RuleSet::from_settings(&settings()).unwrap();
        assert_eq!(rules.parse_directive("!:what is this?"), None);
        assert_eq!(rules.parse_directive("volume"), None);
    }

    #[test]
    fn get_wins_when_both_patterns_match() {
        let mut s = settings();
        s.command_get_regex = r"^(?P<property>\w+)".to_string();
        let rules = RuleSet::from_settings(&s).unwrap();
        assert!(matches!(
            rules.parse_directive("!:Volume = 5"),
            Some(Directive::Get { .. })
        ));
    }

    #[test]
    fn empty_reset_keyword_disables_reset() {
        let mut s = settings();
        s.command_reset = "  ".to_string();
        let rules = RuleSet::from_settings(&s).unwrap();
        assert_eq!(rules.parse_directive("!:"), None);
    }

    #[test]
    fn reset_keyword_is_trimmed() {
        let mut s = settings();
        s.command_reset = " Reset ".to_string();
        let rules = RuleSet::from_settings(&s).unwrap();
        assert_eq!(rules.parse_directive("!:reset"), Some(Directive::Reset));
        assert_eq!(rules.parse_directive("!: reset now"), None);
    }
}
