//! Version-gated rewriting of parameter maps.
//!
//! Two static tables drive everything:
//!
//! - **Legacy rules**, keyed by the *old* path, fire when the user's
//!   compositor is at or past the release that removed, moved, or renamed the
//!   parameter.
//! - **Future rules**, keyed by the *new* path, fire when the user's
//!   compositor predates the parameter. They either drop it or translate it
//!   back to the spelling the older release understands.
//!
//! Migration must run on theme originals before any override merge, so a
//! stale per-theme override cannot resurrect a path the compositor no longer
//! accepts.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;
use tracing::{debug, info};

use crate::value::{ParamMap, ParamValue};
use crate::version::Version;

/// Value rewrite applied while moving a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Transform {
    /// Swap truthy and falsy literals.
    Invert,
    /// `true`/`yes` → `1`, `false`/`no` → `0`.
    BoolToInt,
    /// `0` → `false`, any positive integer → `true`.
    IntToBool,
}

impl Transform {
    /// Unrecognized input passes through unchanged.
    pub fn apply(self, value: &ParamValue) -> ParamValue {
        match (self, value) {
            (Transform::Invert, ParamValue::Bool(b)) => ParamValue::Bool(!b),
            (Transform::Invert, ParamValue::Int(0)) => ParamValue::Int(1),
            (Transform::Invert, ParamValue::Int(1)) => ParamValue::Int(0),
            (Transform::Invert, ParamValue::Str(s)) => match invert_literal(s) {
                Some(flipped) => ParamValue::Str(flipped.to_string()),
                None => value.clone(),
            },

            (Transform::BoolToInt, ParamValue::Bool(b)) => ParamValue::Int(i64::from(*b)),
            (Transform::BoolToInt, ParamValue::Str(s)) => {
                match s.trim().to_lowercase().as_str() {
                    "true" | "yes" => ParamValue::from("1"),
                    "false" | "no" => ParamValue::from("0"),
                    _ => value.clone(),
                }
            }

            (Transform::IntToBool, ParamValue::Int(0)) => ParamValue::Bool(false),
            (Transform::IntToBool, ParamValue::Int(n)) if *n > 0 => ParamValue::Bool(true),
            (Transform::IntToBool, ParamValue::Str(s)) => match s.trim().parse::<i64>() {
                Ok(0) => ParamValue::from("false"),
                Ok(n) if n > 0 => ParamValue::from("true"),
                _ => value.clone(),
            },

            _ => value.clone(),
        }
    }
}

fn invert_literal(s: &str) -> Option<&'static str> {
    let flipped = match s.trim().to_lowercase().as_str() {
        "true" => "false",
        "false" => "true",
        "yes" => "no",
        "no" => "yes",
        "on" => "off",
        "off" => "on",
        "1" => "0",
        "0" => "1",
        _ => return None,
    };
    Some(flipped)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyAction {
    Removed,
    Moved,
    Renamed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FutureAction {
    Disable,
    Rename,
}

/// A parameter that changed in a past release. Keyed by `path`, the old spelling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyRule {
    pub path: &'static str,
    pub version: Version,
    pub action: LegacyAction,
    pub new_path: Option<&'static str>,
    pub transform: Option<Transform>,
    pub note: Option<&'static str>,
}

/// A parameter older releases do not know. Keyed by `path`, the new spelling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FutureRule {
    pub path: &'static str,
    pub min_version: Version,
    pub action: FutureAction,
    pub old_path: Option<&'static str>,
    pub transform: Option<Transform>,
    pub note: Option<&'static str>,
}

const fn v(minor: u64) -> Version {
    Version::new(0, minor, 0)
}

const fn moved(path: &'static str, new_path: &'static str, minor: u64) -> LegacyRule {
    LegacyRule {
        path,
        version: v(minor),
        action: LegacyAction::Moved,
        new_path: Some(new_path),
        transform: None,
        note: None,
    }
}

const fn removed(path: &'static str, minor: u64, note: &'static str) -> LegacyRule {
    LegacyRule {
        path,
        version: v(minor),
        action: LegacyAction::Removed,
        new_path: None,
        transform: None,
        note: Some(note),
    }
}

const fn renamed(
    path: &'static str,
    new_path: &'static str,
    minor: u64,
    transform: Transform,
    note: &'static str,
) -> LegacyRule {
    LegacyRule {
        path,
        version: v(minor),
        action: LegacyAction::Renamed,
        new_path: Some(new_path),
        transform: Some(transform),
        note: Some(note),
    }
}

const fn back_to(path: &'static str, old_path: &'static str, minor: u64) -> FutureRule {
    FutureRule {
        path,
        min_version: v(minor),
        action: FutureAction::Rename,
        old_path: Some(old_path),
        transform: None,
        note: None,
    }
}

const fn back_with(
    path: &'static str,
    old_path: &'static str,
    minor: u64,
    transform: Transform,
) -> FutureRule {
    FutureRule {
        transform: Some(transform),
        ..back_to(path, old_path, minor)
    }
}

const fn disable(path: &'static str, minor: u64, note: &'static str) -> FutureRule {
    FutureRule {
        path,
        min_version: v(minor),
        action: FutureAction::Disable,
        old_path: None,
        transform: None,
        note: Some(note),
    }
}

#[rustfmt::skip]
pub static LEGACY_RULES: &[LegacyRule] = &[
    moved("decoration:blur", "decoration:blur:enabled", 28),
    moved("decoration:blur_size", "decoration:blur:size", 28),
    moved("decoration:blur_passes", "decoration:blur:passes", 28),
    moved("decoration:blur_ignore_opacity", "decoration:blur:ignore_opacity", 28),
    moved("decoration:blur_new_optimizations", "decoration:blur:new_optimizations", 28),
    moved("decoration:blur_xray", "decoration:blur:xray", 28),
    moved("general:col.group_border", "group:col.border_inactive", 29),
    moved("general:col.group_border_active", "group:col.border_active", 29),
    removed("decoration:multisample_edges", 31, "edges are always antialiased now"),
    moved("general:cursor_inactive_timeout", "cursor:inactive_timeout", 36),
    moved("general:no_cursor_warps", "cursor:no_warps", 36),
    moved("misc:hide_cursor_on_key_press", "cursor:hide_on_key_press", 36),
    moved("misc:hide_cursor_on_touch", "cursor:hide_on_touch", 36),
    removed("misc:render_ahead_of_time", 38, "render scheduling was rewritten"),
    removed("misc:render_ahead_safezone", 38, "render scheduling was rewritten"),
    removed("master:new_is_master", 41, "replaced by master:new_status"),
    renamed("misc:no_direct_scanout", "render:direct_scanout", 42, Transform::Invert, "meaning flipped when moved to render"),
    moved("decoration:drop_shadow", "decoration:shadow:enabled", 45),
    moved("decoration:shadow_range", "decoration:shadow:range", 45),
    moved("decoration:shadow_render_power", "decoration:shadow:render_power", 45),
    moved("decoration:col.shadow", "decoration:shadow:color", 45),
    moved("decoration:col.shadow_inactive", "decoration:shadow:color_inactive", 45),
    moved("decoration:shadow_offset", "decoration:shadow:offset", 45),
    moved("decoration:shadow_scale", "decoration:shadow:scale", 45),
    moved("decoration:shadow_ignore_window", "decoration:shadow:ignore_window", 45),
    removed("dwindle:no_gaps_when_only", 45, "use workspace rules instead"),
    removed("master:no_gaps_when_only", 45, "use workspace rules instead"),
    renamed("cursor:no_hardware_cursors", "cursor:no_hardware_cursors", 45, Transform::BoolToInt, "now 0/1/2 where 2 is auto"),
];

#[rustfmt::skip]
pub static FUTURE_RULES: &[FutureRule] = &[
    back_to("decoration:blur:enabled", "decoration:blur", 28),
    back_to("decoration:blur:size", "decoration:blur_size", 28),
    back_to("decoration:blur:passes", "decoration:blur_passes", 28),
    back_to("decoration:blur:ignore_opacity", "decoration:blur_ignore_opacity", 28),
    back_to("decoration:blur:new_optimizations", "decoration:blur_new_optimizations", 28),
    back_to("decoration:blur:xray", "decoration:blur_xray", 28),
    back_to("group:col.border_inactive", "general:col.group_border", 29),
    back_to("group:col.border_active", "general:col.group_border_active", 29),
    disable("decoration:blur:vibrancy", 32, "added in 0.32"),
    disable("cursor:enable_hyprcursor", 35, "hyprcursor support landed in 0.35"),
    back_to("cursor:inactive_timeout", "general:cursor_inactive_timeout", 36),
    back_to("cursor:no_warps", "general:no_cursor_warps", 36),
    back_to("cursor:hide_on_key_press", "misc:hide_cursor_on_key_press", 36),
    back_to("cursor:hide_on_touch", "misc:hide_cursor_on_touch", 36),
    disable("decoration:blur:popups", 36, "popup blur added in 0.36"),
    disable("master:new_status", 41, "added in 0.41"),
    back_with("render:direct_scanout", "misc:no_direct_scanout", 42, Transform::Invert),
    disable("render:explicit_sync", 42, "explicit sync added in 0.42"),
    disable("general:snap:enabled", 42, "window snapping added in 0.42"),
    back_to("decoration:shadow:enabled", "decoration:drop_shadow", 45),
    back_to("decoration:shadow:range", "decoration:shadow_range", 45),
    back_to("decoration:shadow:render_power", "decoration:shadow_render_power", 45),
    back_to("decoration:shadow:color", "decoration:col.shadow", 45),
    back_to("decoration:shadow:color_inactive", "decoration:col.shadow_inactive", 45),
    back_to("decoration:shadow:offset", "decoration:shadow_offset", 45),
    back_to("decoration:shadow:scale", "decoration:shadow_scale", 45),
    back_to("decoration:shadow:ignore_window", "decoration:shadow_ignore_window", 45),
    back_with("cursor:no_hardware_cursors", "cursor:no_hardware_cursors", 45, Transform::IntToBool),
    disable("misc:middle_click_paste", 45, "added in 0.45"),
    disable("ecosystem:no_update_news", 45, "ecosystem section added in 0.45"),
    disable("render:cm_enabled", 47, "color management added in 0.47"),
    disable("decoration:rounding_power", 47, "added in 0.47"),
];

static LEGACY_INDEX: LazyLock<HashMap<&'static str, &'static LegacyRule>> =
    LazyLock::new(|| LEGACY_RULES.iter().map(|r| (r.path, r)).collect());

static FUTURE_INDEX: LazyLock<HashMap<&'static str, &'static FutureRule>> =
    LazyLock::new(|| FUTURE_RULES.iter().map(|r| (r.path, r)).collect());

pub fn legacy_rule(path: &str) -> Option<&'static LegacyRule> {
    LEGACY_INDEX.get(path).copied()
}

pub fn future_rule(path: &str) -> Option<&'static FutureRule> {
    FUTURE_INDEX.get(path).copied()
}

/// One change `migrate` made, for auditing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MigrationStep {
    Removed { path: String, since: String },
    Moved { from: String, to: String, since: String },
    Disabled { path: String, requires: String },
    Downgraded { from: String, to: String, requires: String },
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStep::Removed { path, since } => write!(f, "removed {path} (gone since {since})"),
            MigrationStep::Moved { from, to, since } => write!(f, "moved {from} -> {to} (since {since})"),
            MigrationStep::Disabled { path, requires } => {
                write!(f, "dropped {path} (requires {requires})")
            }
            MigrationStep::Downgraded { from, to, requires } => {
                write!(f, "downgraded {from} -> {to} ({from} requires {requires})")
            }
        }
    }
}

/// Rewrite `params` for a compositor at `target`.
pub fn migrate(params: &ParamMap, target: Version) -> ParamMap {
    migrate_with_report(params, target).0
}

/// Like [`migrate`], also returning every step taken.
///
/// Per path, first match wins: skip paths already produced by a rename in
/// this pass; apply a legacy rule if the target is at or past its version;
/// otherwise apply a future rule if the target predates it; otherwise pass
/// the value through.
pub fn migrate_with_report(params: &ParamMap, target: Version) -> (ParamMap, Vec<MigrationStep>) {
    let mut out = ParamMap::new();
    let mut processed: HashSet<&str> = HashSet::new();
    let mut steps = Vec::new();

    for (path, value) in params {
        if processed.contains(path.as_str()) {
            continue;
        }

        if let Some(rule) = legacy_rule(path)
            && target >= rule.version
        {
            match (rule.action, rule.new_path) {
                (LegacyAction::Removed, _) => {
                    info!(path = %path, since = %rule.version, note = rule.note.unwrap_or(""), "Dropping removed parameter");
                    processed.insert(rule.path);
                    steps.push(MigrationStep::Removed {
                        path: path.clone(),
                        since: rule.version.to_string(),
                    });
                    continue;
                }
                (LegacyAction::Moved | LegacyAction::Renamed, Some(new_path)) => {
                    let migrated = apply(rule.transform, value);
                    debug!(from = %path, to = new_path, "Migrating legacy parameter");
                    out.insert(new_path.to_string(), migrated);
                    processed.insert(rule.path);
                    processed.insert(new_path);
                    steps.push(MigrationStep::Moved {
                        from: path.clone(),
                        to: new_path.to_string(),
                        since: rule.version.to_string(),
                    });
                    continue;
                }
                _ => {}
            }
        } else if let Some(rule) = future_rule(path)
            && target < rule.min_version
        {
            match (rule.action, rule.old_path) {
                (FutureAction::Disable, _) => {
                    info!(path = %path, requires = %rule.min_version, "Dropping parameter unsupported by this version");
                    processed.insert(rule.path);
                    steps.push(MigrationStep::Disabled {
                        path: path.clone(),
                        requires: rule.min_version.to_string(),
                    });
                    continue;
                }
                (FutureAction::Rename, Some(old_path)) => {
                    let migrated = apply(rule.transform, value);
                    debug!(from = %path, to = old_path, "Downgrading parameter");
                    out.insert(old_path.to_string(), migrated);
                    processed.insert(rule.path);
                    processed.insert(old_path);
                    steps.push(MigrationStep::Downgraded {
                        from: path.clone(),
                        to: old_path.to_string(),
                        requires: rule.min_version.to_string(),
                    });
                    continue;
                }
                _ => {}
            }
        }

        out.insert(path.clone(), value.clone());
    }

    (out, steps)
}

fn apply(transform: Option<Transform>, value: &ParamValue) -> ParamValue {
    match transform {
        Some(t) => t.apply(value),
        None => value.clone(),
    }
}

/// Future renames whose `old_path` has no legacy rule leading back to them.
///
/// An empty result means the two tables describe the same moves from both
/// directions.
pub fn check_tables() -> Vec<&'static FutureRule> {
    FUTURE_RULES
        .iter()
        .filter(|rule| match (rule.action, rule.old_path) {
            (FutureAction::Rename, Some(old)) => {
                legacy_rule(old).is_none_or(|legacy| legacy.new_path != Some(rule.path))
            }
            (FutureAction::Rename, None) => true,
            (FutureAction::Disable, _) => false,
        })
        .collect()
}
