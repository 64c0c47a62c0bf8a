//! Minimal INI document model.
//!
//! Comments, blank lines, ordering and the exact text of untouched lines are
//! kept, so a rewrite only changes the entries that were set. Section and key
//! lookups ignore ASCII case; the casing seen first is kept. Keys before the
//! first `[header]` live in the global section, addressed by the empty name.
//! A leading UTF-8 byte-order mark is accepted and written back out.

use std::fmt;

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    /// Comment, blank or unrecognized line, kept verbatim.
    Raw(String),
    /// `raw` holds the source text until the entry is set.
    Entry {
        key: String,
        value: String,
        raw: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    /// Source text of the header line, e.g. `[Audio] ; sound`.
    header: Option<String>,
    lines: Vec<Line>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            header: None,
            lines: Vec::new(),
        }
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut Line> {
        self.lines
            .iter_mut()
            .find(|line| matches!(line, Line::Entry { key: k, .. } if k.eq_ignore_ascii_case(key)))
    }
}

/// A parsed INI document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniDocument {
    /// `sections[0]` is always the global section.
    sections: Vec<Section>,
    bom: bool,
}

impl Default for IniDocument {
    fn default() -> Self {
        Self {
            sections: vec![Section::new("")],
            bom: false,
        }
    }
}

impl IniDocument {
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::default();
        let text = match text.strip_prefix(BOM) {
            Some(rest) => {
                doc.bom = true;
                rest
            }
            None => text,
        };

        for raw in text.lines() {
            let trimmed = raw.trim();
            if let Some(name) = parse_header(trimmed) {
                let mut section = Section::new(name);
                section.header = Some(raw.to_string());
                doc.sections.push(section);
                continue;
            }

            let line = if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
                Line::Raw(raw.to_string())
            } else if let Some((key, value)) = trimmed.split_once('=') {
                Line::Entry {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                    raw: Some(raw.to_string()),
                }
            } else {
                Line::Raw(raw.to_string())
            };

            if let Some(section) = doc.sections.last_mut() {
                section.lines.push(line);
            }
        }
        doc
    }

    /// Value of `key` in `section`, if present.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .filter(|s| s.name.eq_ignore_ascii_case(section))
            .flat_map(|s| s.lines.iter())
            .find_map(|line| match line {
                Line::Entry { key: k, value, .. } if k.eq_ignore_ascii_case(key) => Some(value.as_str()),
                _ => None,
            })
    }

    /// Set `key` in `section`, creating either when missing.
    ///
    /// New keys are placed right after the last existing entry of the section.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let idx = match self
            .sections
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(section))
        {
            Some(idx) => idx,
            None => {
                self.sections.push(Section::new(section));
                self.sections.len() - 1
            }
        };

        for s in self
            .sections
            .iter_mut()
            .filter(|s| s.name.eq_ignore_ascii_case(section))
        {
            if let Some(Line::Entry { value: v, raw, .. }) = s.entry_mut(key) {
                *v = value.to_string();
                *raw = None;
                return;
            }
        }

        let target = &mut self.sections[idx];
        let insert_at = target
            .lines
            .iter()
            .rposition(|l| matches!(l, Line::Entry { .. }))
            .map(|i| i + 1)
            .unwrap_or(0);
        target.lines.insert(
            insert_at,
            Line::Entry {
                key: key.to_string(),
                value: value.to_string(),
                raw: None,
            },
        );
    }
}

/// Section name of a header line: the text between `[` and the first `]`,
/// optionally followed by a `;` or `#` comment.
fn parse_header(trimmed: &str) -> Option<&str> {
    let (name, rest) = trimmed.strip_prefix('[')?.split_once(']')?;
    let rest = rest.trim_start();
    if rest.is_empty() || rest.starts_with(';') || rest.starts_with('#') {
        Some(name.trim())
    } else {
        None
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bom {
            write!(f, "{BOM}")?;
        }
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                match &section.header {
                    Some(header) => writeln!(f, "{header}")?,
                    None => writeln!(f, "[{}]", section.name)?,
                }
            }
            for line in &section.lines {
                match line {
                    Line::Raw(raw) | Line::Entry { raw: Some(raw), .. } => writeln!(f, "{raw}")?,
                    Line::Entry { key, value, raw: None } => writeln!(f, "{key}={value}")?,
                }
            }
        }
        Ok(())
    }
}
