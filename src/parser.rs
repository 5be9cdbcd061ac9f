//! Line-oriented parser for Hyprland config text.
//!
//! This is deliberately not a grammar: each line is classified on its own
//! while a stack of open `section {` blocks gives nested keys their prefix.
//! Parsing is total. Anything that is not a comment, a brace, or a
//! `key = value` assignment comes back as [`LineKind::Other`] with its raw
//! text intact, so nothing the parser fails to understand is ever lost.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::value::{ParamMap, ParamValue};

static SECTION_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_][\w.:\-]*)").expect("section regex"));

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_$][\w.:\-$]*)\s*=(.*)$").expect("assignment regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Other,
    SectionOpen,
    SectionClose,
    Parameter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// 1-based.
    pub line_number: usize,
    pub raw_text: String,
    pub kind: LineKind,
    pub section_path: Option<String>,
    pub param_path: Option<String>,
    pub param_value: Option<String>,
}

/// The last declaration of a parameter within one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedParam {
    pub value: String,
    pub line_number: usize,
    pub section_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    pub parameters: BTreeMap<String, ParsedParam>,
    pub sections: BTreeSet<String>,
    pub lines: Vec<ParsedLine>,
}

impl ParseResult {
    /// Flatten to `path -> value`, dropping line bookkeeping.
    pub fn to_param_map(&self) -> ParamMap {
        self.parameters
            .iter()
            .map(|(path, p)| (path.clone(), ParamValue::Str(p.value.clone())))
            .collect()
    }
}

/// Parse config text. Never fails.
pub fn parse(text: &str) -> ParseResult {
    let mut result = ParseResult::default();
    let mut stack: Vec<String> = Vec::new();

    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let parsed = classify(idx + 1, line, &mut stack, &mut result);
        result.lines.push(parsed);
    }

    result
}

/// Read and parse a file. Returns `None` when the file is missing,
/// unreadable, or not valid UTF-8.
pub fn parse_file(path: &Path) -> Option<ParseResult> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let result = parse(&text);
            debug!(
                path = %path.display(),
                parameters = result.parameters.len(),
                "Parsed config file"
            );
            Some(result)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read config file");
            None
        }
    }
}

fn classify(
    line_number: usize,
    line: &str,
    stack: &mut Vec<String>,
    result: &mut ParseResult,
) -> ParsedLine {
    let mut parsed = ParsedLine {
        line_number,
        raw_text: line.to_string(),
        kind: LineKind::Other,
        section_path: None,
        param_path: None,
        param_value: None,
    };

    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return parsed;
    }

    let closes = line.matches('}').count();
    for _ in 0..closes {
        stack.pop();
    }
    if closes > 0 && trimmed.chars().all(|c| c == '}' || c.is_whitespace()) {
        parsed.kind = LineKind::SectionClose;
        return parsed;
    }

    if line.contains('{') && !line.contains('=') {
        if let Some(caps) = SECTION_OPEN.captures(line) {
            stack.push(caps[1].to_string());
            let section = stack.join(":");
            result.sections.insert(section.clone());
            parsed.kind = LineKind::SectionOpen;
            parsed.section_path = Some(section);
        }
        return parsed;
    }

    let Some(caps) = ASSIGNMENT.captures(line) else {
        return parsed;
    };

    let key = &caps[1];
    let (value, _comment) = split_inline_comment(&caps[2]);
    let value = value.trim().to_string();

    let (path, section_path) = if key.contains(':') {
        let prefix = key.rsplit_once(':').map(|(s, _)| s.to_string());
        (key.to_string(), prefix)
    } else if stack.is_empty() {
        (key.to_string(), None)
    } else {
        let section = stack.join(":");
        (format!("{section}:{key}"), Some(section))
    };

    result.parameters.insert(
        path.clone(),
        ParsedParam {
            value: value.clone(),
            line_number,
            section_path: section_path.clone(),
        },
    );

    parsed.kind = LineKind::Parameter;
    parsed.section_path = section_path;
    parsed.param_path = Some(path);
    parsed.param_value = Some(value);
    parsed
}

/// Split the right-hand side of an assignment into value and trailing comment.
///
/// The comment part keeps the whitespace that preceded the `#`, so
/// `value + comment` reproduces the input. A `#` inside double quotes, a
/// doubled `##`, or a `#rrggbb[aa]` color token does not start a comment.
pub(crate) fn split_inline_comment(rest: &str) -> (&str, &str) {
    let bytes = rest.as_bytes();
    let mut in_quotes = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            b'#' if !in_quotes => {
                if bytes.get(i + 1) == Some(&b'#') {
                    i += 2;
                    continue;
                }
                if !is_hex_color_at(rest, i) {
                    let end = rest[..i].trim_end().len();
                    return (&rest[..end], &rest[end..]);
                }
            }
            _ => {}
        }
        i += 1;
    }
    (rest, "")
}

fn is_hex_color_at(text: &str, hash: usize) -> bool {
    let at_token_start = text[..hash]
        .chars()
        .next_back()
        .is_none_or(char::is_whitespace);
    let tail = &text[hash + 1..];
    let digits = tail.bytes().take_while(u8::is_ascii_hexdigit).count();
    let ends_token = tail[digits..]
        .chars()
        .next()
        .is_none_or(char::is_whitespace);
    at_token_start && (6..=8).contains(&digits) && ends_token
}
