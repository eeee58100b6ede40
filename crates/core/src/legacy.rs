//! Legacy shot-list parsing.
//!
//! Older storyboards stored the plot summary as a single free-text block in
//! the numbered `N. [theme] content` format. The text-drafting backend
//! produces the same format, so this parser is shared by the load-time
//! upgrade path and by batch content drafting.

use std::sync::LazyLock;

use regex::Regex;

/// Matches one numbered shot line: `3. [wide] The city at dawn.`
/// The bracketed theme is optional.
pub const SHOT_LINE_PATTERN: &str = r"^\s*(\d+)\.\s*(?:\[([^\]]+)\]\s*)?(.*)$";

/// Compiled shot-line regex. Compiled once, reused forever.
static SHOT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SHOT_LINE_PATTERN).expect("valid regex"));

/// One parsed shot line, before ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedShot {
    pub theme: Option<String>,
    pub content: String,
}

/// Parse a legacy shot list or drafted shot text.
///
/// Every line matching [`SHOT_LINE_PATTERN`] yields one [`ParsedShot`] in
/// line order; the leading number is positional only and is discarded.
/// A non-matching line following a parsed shot is treated as a
/// continuation of that shot's description. If *no* line matches, the
/// whole text becomes a single unstructured shot. Blank input yields no
/// shots.
pub fn parse_shot_list(text: &str) -> Vec<ParsedShot> {
    let mut shots: Vec<ParsedShot> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = SHOT_LINE_RE.captures(line) {
            let theme = caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .filter(|t| !t.is_empty());
            let content = caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            shots.push(ParsedShot { theme, content });
        } else if let Some(last) = shots.last_mut() {
            let cont = line.trim();
            if !cont.is_empty() {
                if !last.content.is_empty() {
                    last.content.push(' ');
                }
                last.content.push_str(cont);
            }
        }
    }

    if shots.is_empty() {
        let whole = text.trim();
        if whole.is_empty() {
            return Vec::new();
        }
        return vec![ParsedShot {
            theme: None,
            content: whole.to_string(),
        }];
    }

    shots
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
