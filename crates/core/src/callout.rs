//! Callout directive parsing.
//!
//! Recognizes `:::kind Title` / `:::kind[Title]` opener lines, the `:::`
//! closer, and GitHub-style `> [!NOTE]` alert markers.

use std::fmt;
use std::str::FromStr;

use crate::code_fence::is_indented_code_line;

/// The closed set of callout kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CalloutKind {
    /// Neutral aside.
    Note,
    /// Helpful advice.
    Tip,
    /// Something that can go wrong.
    Warning,
    /// Something that will go wrong.
    Caution,
    /// Background information.
    Info,
}

impl CalloutKind {
    /// Every kind, in declaration order.
    pub const ALL: [CalloutKind; 5] = [
        CalloutKind::Note,
        CalloutKind::Tip,
        CalloutKind::Warning,
        CalloutKind::Caution,
        CalloutKind::Info,
    ];

    /// Lowercase wire name (`note`, `tip`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            CalloutKind::Note => "note",
            CalloutKind::Tip => "tip",
            CalloutKind::Warning => "warning",
            CalloutKind::Caution => "caution",
            CalloutKind::Info => "info",
        }
    }

    /// Default title used when the opener carries none.
    pub fn default_label(self) -> &'static str {
        match self {
            CalloutKind::Note => "Note",
            CalloutKind::Tip => "Tip",
            CalloutKind::Warning => "Warning",
            CalloutKind::Caution => "Caution",
            CalloutKind::Info => "Info",
        }
    }
}

impl fmt::Display for CalloutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a callout kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl FromStr for CalloutKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalloutKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// A parsed callout opener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutOpening {
    /// Callout kind.
    pub kind: CalloutKind,
    /// Title text, with any leading decorative icon removed.
    pub title: Option<String>,
}

/// Classification of a `:::` opener line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveLine {
    /// A supported callout opener.
    Callout(CalloutOpening),
    /// Legacy `:::pagebreak` marker.
    PageBreak,
    /// Directive syntax naming an unsupported kind.
    UnknownKind(String),
}

/// Parse an opener line like `:::warning Mind the gap` or `:::note[Title]`.
///
/// Returns `None` for lines that are not directive openers at all (including
/// the bare `:::` closer and indented code).
pub fn parse_directive_line(line: &str) -> Option<DirectiveLine> {
    if is_indented_code_line(line) {
        return None;
    }

    let after_colons = line.trim().strip_prefix(":::")?;
    if !after_colons.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let name_end = after_colons
        .find(|c: char| c.is_whitespace() || c == '[')
        .unwrap_or(after_colons.len());
    let (name, rest) = after_colons.split_at(name_end);

    if name.eq_ignore_ascii_case("pagebreak") && rest.trim().is_empty() {
        return Some(DirectiveLine::PageBreak);
    }

    let Ok(kind) = name.parse::<CalloutKind>() else {
        return Some(DirectiveLine::UnknownKind(name.to_string()));
    };

    let raw_title = match rest.strip_prefix('[') {
        Some(bracketed) => match bracketed.find(']') {
            Some(close) => &bracketed[..close],
            None => bracketed,
        },
        None => rest,
    };

    Some(DirectiveLine::Callout(CalloutOpening {
        kind,
        title: strip_title_icon(raw_title),
    }))
}

/// Check if a line is a callout closer (`:::`).
pub fn is_callout_closer(line: &str) -> bool {
    line.trim() == ":::"
}

/// Parse a GitHub alert marker line (`> [!NOTE]`).
///
/// Only supported kinds are returned; other alert words stay ordinary
/// blockquote content.
pub fn parse_alert_marker(line: &str) -> Option<CalloutKind> {
    let quoted = line.trim_start().strip_prefix('>')?.trim_start();
    let inner = quoted.strip_prefix("[!")?;
    let close = inner.find(']')?;
    if !inner[close + 1..].trim().is_empty() {
        return None;
    }
    inner[..close].parse().ok()
}

/// Strip one level of blockquote prefix (`>` plus one optional space).
pub fn strip_quote_prefix(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

const TITLE_ICON_PREFIXES: &[&str] = &[
    "\u{26A0}",
    "\u{2757}",
    "\u{2139}",
    "\u{270E}",
    "\u{1F4A1}",
    "\u{26D4}",
    ":warning:",
    ":info:",
    ":bulb:",
    ":pencil:",
    ":exclamation:",
    ":no_entry:",
];

/// Remove a leading decorative icon from a callout title. The icon is drawn
/// by the stylesheet, so keeping it would duplicate it.
fn strip_title_icon(raw: &str) -> Option<String> {
    let mut title = raw.trim();
    if let Some(prefix) = TITLE_ICON_PREFIXES.iter().find(|p| title.starts_with(**p)) {
        title = title[prefix.len()..]
            .trim_start_matches('\u{FE0F}')
            .trim_start_matches([' ', '-', ':', '|', '\t']);
    }
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}
