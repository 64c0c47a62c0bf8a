//! Reply text sent back to chat after a directive runs.

/// Fixed acknowledgement for a reset directive.
pub const RESET_REPLY: &str = "Reset successful.";

/// `property = value`, prefixed with `[section] ` when a section is present.
pub fn format_assignment(section: &str, property: &str, value: &str) -> String {
    if section.is_empty() {
        format!("{property} = {value}")
    } else {
        format!("[{section}] {property} = {value}")
    }
}

pub fn get_reply(section: &str, property: &str, value: &str) -> String {
    format!("Value of {}.", format_assignment(section, property, value))
}

pub fn set_reply(section: &str, property: &str, value: &str) -> String {
    format!("Set {}.", format_assignment(section, property, value))
}
