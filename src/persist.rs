//! Writing overrides back to disk.
//!
//! Text edits are pure functions over a document string, so they can be
//! tested without touching the filesystem. Thin I/O wrappers read, patch, and
//! write whole files, creating parent directories as needed.
//!
//! Config files are patched line by line rather than regenerated: only lines
//! assigning the target parameter change, and every other byte of a
//! hand-written file is left alone.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ParamsError;
use crate::parser::{self, LineKind, split_inline_comment};
use crate::schema::Catalog;
use crate::value::{ParamMap, ParamValue};

static ASSIGNMENT_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<lead>[^=]*=[ \t]*)(?P<rest>.*)$").expect("assignment value regex")
});

/// What happens to a trailing `# comment` on a line whose value is replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentPolicy {
    /// Keep the comment after the new value.
    #[default]
    Preserve,
    /// Replace everything after `=`, comment included.
    Replace,
}

/// Pure function: set every assignment of `path` in `text` to `value`.
///
/// Lines are matched by the path the parser resolves for them, so both
/// `general:gaps_in = 5` and a nested `gaps_in = 5` inside `general { }` are
/// rewritten. Indentation, key spelling, and line endings are kept.
///
/// Returns the new text and the number of lines whose content changed.
pub fn substitute_parameter(
    text: &str,
    path: &str,
    value: &str,
    policy: CommentPolicy,
) -> (String, usize) {
    let parsed = parser::parse(text);
    let targets: HashSet<usize> = parsed
        .lines
        .iter()
        .filter(|l| l.kind == LineKind::Parameter && l.param_path.as_deref() == Some(path))
        .map(|l| l.line_number)
        .collect();

    if targets.is_empty() {
        return (text.to_string(), 0);
    }

    let mut out = String::with_capacity(text.len());
    let mut changed = 0;
    for (idx, segment) in text.split_inclusive('\n').enumerate() {
        if !targets.contains(&(idx + 1)) {
            out.push_str(segment);
            continue;
        }
        let (body, ending) = split_line_ending(segment);
        let rewritten = rewrite_value(body, value, policy);
        if rewritten != body {
            changed += 1;
        }
        out.push_str(&rewritten);
        out.push_str(ending);
    }

    (out, changed)
}

fn split_line_ending(segment: &str) -> (&str, &str) {
    let body_len = segment.trim_end_matches(['\n', '\r']).len();
    segment.split_at(body_len)
}

fn rewrite_value(line: &str, value: &str, policy: CommentPolicy) -> String {
    let Some(caps) = ASSIGNMENT_VALUE.captures(line) else {
        return line.to_string();
    };
    let lead = &caps["lead"];
    match policy {
        CommentPolicy::Replace => format!("{lead}{value}"),
        CommentPolicy::Preserve => {
            let (old, comment) = split_inline_comment(&caps["rest"]);
            let padding = &old[old.trim_end().len()..];
            format!("{lead}{value}{padding}{comment}")
        }
    }
}

/// Pure function: make sure `text` sources `target` exactly once.
///
/// Returns `None` when a matching `source=` line already exists, otherwise
/// the text with the directive appended.
pub fn ensure_source_directive(text: &str, target: &str) -> Option<String> {
    let present = text.lines().any(|line| {
        line.trim()
            .strip_prefix("source")
            .and_then(|rest| rest.trim_start().strip_prefix('='))
            .map(|rest| split_inline_comment(rest).0.trim() == target)
            .unwrap_or(false)
    });
    if present {
        return None;
    }

    let mut out = text.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("source=");
    out.push_str(target);
    out.push('\n');
    Some(out)
}

/// Pure function: the full text of the machine-owned overrides config.
pub fn render_overrides_conf(theme_name: &str, overrides: &ParamMap, catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str("# Generated by lastlayer. This file is rewritten on every apply; edits will be lost.\n");
    out.push_str(&format!("# Theme: {theme_name}\n\n"));

    if overrides.is_empty() {
        out.push_str("# No overrides are active for this theme.\n");
        return out;
    }

    for (path, value) in overrides {
        let rendered = match catalog.get(path) {
            Some(param) => param.format_value(value),
            None => value.to_string(),
        };
        out.push_str(&format!("{path} = {rendered}\n"));
    }
    out
}

/// On-disk shape of the per-theme override file.
#[derive(Debug, Serialize, Deserialize)]
struct PerRiceFile {
    #[serde(default)]
    version: u32,
    params: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

pub const PER_RICE_FORMAT_VERSION: u32 = 1;

/// Pure function: decode a per-theme override document.
///
/// Accepts the current `{version, params, updatedAt}` shape plus two older
/// ones: `{overrides: {...}}` and a bare `{path: value}` object. Non-scalar
/// and null values are skipped.
pub fn parse_per_rice(text: &str) -> Result<ParamMap, serde_json::Error> {
    let doc: serde_json::Value = serde_json::from_str(text)?;

    let serde_json::Value::Object(obj) = &doc else {
        warn!("Per-theme overrides are not a JSON object, ignoring");
        return Ok(ParamMap::new());
    };

    if obj.get("params").is_some_and(serde_json::Value::is_object) {
        let file: PerRiceFile = serde_ignored::deserialize(doc, |field| {
            warn!(field = %field, "Ignoring unknown field in per-theme overrides");
        })?;
        return Ok(scalars(&file.params));
    }

    if let Some(serde_json::Value::Object(inner)) = obj.get("overrides") {
        return Ok(scalars(inner));
    }

    Ok(scalars(obj.iter().filter(|(key, _)| !PER_RICE_META_KEYS.contains(&key.as_str()))))
}

/// Top-level keys of the current format, never parameter paths.
const PER_RICE_META_KEYS: [&str; 3] = ["version", "params", "updatedAt"];

fn scalars<'a>(
    entries: impl IntoIterator<Item = (&'a String, &'a serde_json::Value)>,
) -> ParamMap {
    entries
        .into_iter()
        .filter_map(|(path, v)| {
            ParamValue::from_json(v)
                .filter(|v| !v.is_empty())
                .map(|v| (path.clone(), v))
        })
        .collect()
}

/// Pure function: encode per-theme overrides in the current format.
pub fn render_per_rice(params: &ParamMap, updated_at: &str) -> Result<String, serde_json::Error> {
    let file = PerRiceFile {
        version: PER_RICE_FORMAT_VERSION,
        params: params
            .iter()
            .map(|(k, v)| Ok((k.clone(), serde_json::to_value(v)?)))
            .collect::<Result<_, serde_json::Error>>()?,
        updated_at: Some(updated_at.to_string()),
    };
    serde_json::to_string_pretty(&file)
}

/// Read per-theme overrides. A missing file is an empty map; an unreadable
/// or malformed one is logged and also treated as empty.
pub fn read_per_rice(path: &Path) -> ParamMap {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ParamMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read per-theme overrides");
            return ParamMap::new();
        }
    };
    match parse_per_rice(&text) {
        Ok(map) => map,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed per-theme overrides");
            ParamMap::new()
        }
    }
}

pub fn write_per_rice(path: &Path, params: &ParamMap, updated_at: &str) -> Result<(), ParamsError> {
    let body = render_per_rice(params, updated_at).map_err(|e| ParamsError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_file(path, &body)
}

/// Whole-file write, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> Result<(), ParamsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ParamsError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| ParamsError::io(path, e))
}
