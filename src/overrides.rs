//! Three-scope override store with fixed precedence.
//!
//! ```text
//! original   as authored in the theme, after migration
//!    ↑ overridden by
//! global     the user's preference for every theme
//!    ↑ overridden by
//! per-rice   an exception for this one theme
//! ```
//!
//! Every scope is sparse. Setting a value to `None` or the empty string
//! removes it from that scope, which is how clearing an override works.
//! Collections are cheap and meant to be rebuilt per request rather than
//! cached.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value::{ParamMap, ParamValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OverrideSource {
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "global")]
    Global,
    #[serde(rename = "per-rice")]
    PerRice,
}

impl OverrideSource {
    pub fn as_str(self) -> &'static str {
        match self {
            OverrideSource::Original => "original",
            OverrideSource::Global => "global",
            OverrideSource::PerRice => "per-rice",
        }
    }
}

impl fmt::Display for OverrideSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub parameter_path: String,
    pub value: ParamValue,
    pub source: OverrideSource,
    pub timestamp: DateTime<Utc>,
}

/// One row of [`OverrideCollection::effective_overrides`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveEntry {
    pub value: ParamValue,
    pub source: OverrideSource,
    #[serde(rename = "originalValue")]
    pub original_value: Option<ParamValue>,
}

#[derive(Debug, Clone, Default)]
pub struct OverrideCollection {
    original: BTreeMap<String, Override>,
    global: BTreeMap<String, Override>,
    per_rice: BTreeMap<String, Override>,
}

impl OverrideCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_original(&mut self, path: &str, value: Option<ParamValue>) {
        self.set(OverrideSource::Original, path, value);
    }

    pub fn set_global(&mut self, path: &str, value: Option<ParamValue>) {
        self.set(OverrideSource::Global, path, value);
    }

    pub fn set_per_rice(&mut self, path: &str, value: Option<ParamValue>) {
        self.set(OverrideSource::PerRice, path, value);
    }

    /// Replace the whole original scope.
    pub fn load_originals(&mut self, params: &ParamMap) {
        self.load(OverrideSource::Original, params);
    }

    pub fn load_globals(&mut self, params: &ParamMap) {
        self.load(OverrideSource::Global, params);
    }

    pub fn load_per_rice(&mut self, params: &ParamMap) {
        self.load(OverrideSource::PerRice, params);
    }

    pub fn original(&self, path: &str) -> Option<&ParamValue> {
        self.original.get(path).map(|o| &o.value)
    }

    pub fn global(&self, path: &str) -> Option<&ParamValue> {
        self.global.get(path).map(|o| &o.value)
    }

    pub fn per_rice(&self, path: &str) -> Option<&ParamValue> {
        self.per_rice.get(path).map(|o| &o.value)
    }

    /// The winning override for `path`: per-rice, then global, then original.
    pub fn effective_pair(&self, path: &str) -> Option<(&Override, OverrideSource)> {
        [
            (&self.per_rice, OverrideSource::PerRice),
            (&self.global, OverrideSource::Global),
            (&self.original, OverrideSource::Original),
        ]
        .into_iter()
        .find_map(|(scope, source)| scope.get(path).map(|o| (o, source)))
    }

    pub fn effective_value(&self, path: &str) -> Option<&ParamValue> {
        self.effective_pair(path).map(|(o, _)| &o.value)
    }

    pub fn effective_source(&self, path: &str) -> Option<OverrideSource> {
        self.effective_pair(path).map(|(_, source)| source)
    }

    /// True when both an effective and an original value exist and they differ.
    pub fn is_overridden(&self, path: &str) -> bool {
        match (self.effective_value(path), self.original(path)) {
            (Some(effective), Some(original)) => !effective.same_as(original),
            _ => false,
        }
    }

    /// Paths set globally or per-rice whose effective value differs from the
    /// original. This is exactly what must be written back to config text.
    pub fn applicable_overrides(&self) -> ParamMap {
        self.global
            .keys()
            .chain(self.per_rice.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|path| {
                let effective = self.effective_value(path)?;
                let differs = self
                    .original(path)
                    .is_none_or(|original| !effective.same_as(original));
                differs.then(|| (path.clone(), effective.clone()))
            })
            .collect()
    }

    /// Every known path with its effective value, source, and original value.
    pub fn effective_overrides(&self) -> BTreeMap<String, EffectiveEntry> {
        self.known_paths()
            .into_iter()
            .filter_map(|path| {
                let (winner, source) = self.effective_pair(path)?;
                Some((
                    path.to_string(),
                    EffectiveEntry {
                        value: winner.value.clone(),
                        source,
                        original_value: self.original(path).cloned(),
                    },
                ))
            })
            .collect()
    }

    /// Union of paths across all scopes.
    pub fn known_paths(&self) -> BTreeSet<&str> {
        self.original
            .keys()
            .chain(self.global.keys())
            .chain(self.per_rice.keys())
            .map(String::as_str)
            .collect()
    }

    /// Remove one per-rice path, or the whole scope when `path` is `None`.
    pub fn clear_per_rice(&mut self, path: Option<&str>) {
        match path {
            Some(p) => {
                self.per_rice.remove(p);
            }
            None => self.per_rice.clear(),
        }
    }

    /// Remove one global path, or the whole scope when `path` is `None`.
    pub fn clear_global(&mut self, path: Option<&str>) {
        match path {
            Some(p) => {
                self.global.remove(p);
            }
            None => self.global.clear(),
        }
    }

    /// Snapshot of one scope as a plain map.
    pub fn scope(&self, source: OverrideSource) -> ParamMap {
        self.scope_map(source)
            .iter()
            .map(|(path, o)| (path.clone(), o.value.clone()))
            .collect()
    }

    fn scope_map(&self, source: OverrideSource) -> &BTreeMap<String, Override> {
        match source {
            OverrideSource::Original => &self.original,
            OverrideSource::Global => &self.global,
            OverrideSource::PerRice => &self.per_rice,
        }
    }

    fn scope_map_mut(&mut self, source: OverrideSource) -> &mut BTreeMap<String, Override> {
        match source {
            OverrideSource::Original => &mut self.original,
            OverrideSource::Global => &mut self.global,
            OverrideSource::PerRice => &mut self.per_rice,
        }
    }

    fn set(&mut self, source: OverrideSource, path: &str, value: Option<ParamValue>) {
        let scope = self.scope_map_mut(source);
        match value {
            Some(value) if !value.is_empty() => {
                scope.insert(
                    path.to_string(),
                    Override {
                        parameter_path: path.to_string(),
                        value,
                        source,
                        timestamp: Utc::now(),
                    },
                );
            }
            _ => {
                scope.remove(path);
            }
        }
    }

    fn load(&mut self, source: OverrideSource, params: &ParamMap) {
        self.scope_map_mut(source).clear();
        for (path, value) in params {
            self.set(source, path, Some(value.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::str_map;

    fn s(v: &str) -> Option<ParamValue> {
        Some(ParamValue::from(v))
    }

    #[test]
    fn global_over_original_is_applicable() {
        let mut c = OverrideCollection::new();
        c.load_originals(&str_map([("a", "1")]));
        c.load_globals(&str_map([("a", "2")]));
        c.load_per_rice(&ParamMap::new());
        assert_eq!(c.applicable_overrides(), str_map([("a", "2")]));
    }

    #[test]
    fn per_rice_wins_over_everything() {
        let mut c = OverrideCollection::new();
        c.set_original("a", s("1"));
        c.set_global("a", s("2"));
        c.set_per_rice("a", s("3"));
        assert_eq!(c.effective_value("a"), Some(&ParamValue::from("3")));
        assert_eq!(c.effective_source("a"), Some(OverrideSource::PerRice));
    }

    #[test]
    fn falls_back_through_scopes() {
        let mut c = OverrideCollection::new();
        c.set_original("a", s("1"));
        c.set_global("b", s("2"));
        assert_eq!(c.effective_source("a"), Some(OverrideSource::Original));
        assert_eq!(c.effective_source("b"), Some(OverrideSource::Global));
        assert_eq!(c.effective_pair("zzz").map(|(_, src)| src), None);
    }

    #[test]
    fn empty_value_clears() {
        let mut c = OverrideCollection::new();
        c.set_global("a", s("2"));
        c.set_global("a", s(""));
        assert_eq!(c.global("a"), None);
        c.set_per_rice("a", s("3"));
        c.set_per_rice("a", None);
        assert_eq!(c.per_rice("a"), None);
    }

    #[test]
    fn load_replaces_scope() {
        let mut c = OverrideCollection::new();
        c.load_globals(&str_map([("a", "1"), ("b", "2")]));
        c.load_globals(&str_map([("c", "3"), ("d", "")]));
        assert_eq!(c.scope(OverrideSource::Global), str_map([("c", "3")]));
    }

    #[test]
    fn override_equal_to_original_is_not_applicable() {
        let mut c = OverrideCollection::new();
        c.set_original("a", s("12"));
        c.set_global("a", Some(ParamValue::Int(12)));
        c.set_per_rice("b", s("x"));
        let applicable = c.applicable_overrides();
        assert!(!applicable.contains_key("a"));
        assert_eq!(applicable, str_map([("b", "x")]));
        assert!(!c.is_overridden("a"));
    }

    #[test]
    fn applicable_never_contains_original_values() {
        let mut c = OverrideCollection::new();
        c.load_originals(&str_map([("a", "1"), ("b", "2"), ("c", "3")]));
        c.load_globals(&str_map([("a", "1"), ("b", "9")]));
        c.load_per_rice(&str_map([("b", "2"), ("c", "4")]));
        let applicable = c.applicable_overrides();
        for (path, value) in &applicable {
            assert!(!c.original(path).is_some_and(|o| o.same_as(value)));
        }
        assert_eq!(applicable, str_map([("c", "4")]));
    }

    #[test]
    fn is_overridden_needs_original() {
        let mut c = OverrideCollection::new();
        c.set_global("new_only", s("1"));
        assert!(!c.is_overridden("new_only"));
        c.set_original("x", s("1"));
        c.set_per_rice("x", s("2"));
        assert!(c.is_overridden("x"));
    }

    #[test]
    fn effective_overrides_covers_all_paths() {
        let mut c = OverrideCollection::new();
        c.set_original("a", s("1"));
        c.set_global("b", s("2"));
        c.set_per_rice("a", s("5"));
        let all = c.effective_overrides();
        assert_eq!(all.len(), 2);
        assert_eq!(all["a"].source, OverrideSource::PerRice);
        assert_eq!(all["a"].original_value, s("1"));
        assert_eq!(all["b"].original_value, None);
    }

    #[test]
    fn clear_single_and_whole_scope() {
        let mut c = OverrideCollection::new();
        c.load_per_rice(&str_map([("a", "1"), ("b", "2")]));
        c.clear_per_rice(Some("a"));
        assert_eq!(c.scope(OverrideSource::PerRice), str_map([("b", "2")]));
        c.clear_per_rice(None);
        assert!(c.scope(OverrideSource::PerRice).is_empty());

        c.load_globals(&str_map([("a", "1")]));
        c.clear_global(None);
        assert_eq!(c.global("a"), None);
    }

    #[test]
    fn override_records_source_and_path() {
        let mut c = OverrideCollection::new();
        c.set_global("general:gaps_in", s("10"));
        let (o, _) = c.effective_pair("general:gaps_in").unwrap();
        assert_eq!(o.parameter_path, "general:gaps_in");
        assert_eq!(o.source, OverrideSource::Global);
        assert!(o.timestamp <= Utc::now());
    }

    #[test]
    fn source_serializes_with_hyphen() {
        assert_eq!(
            serde_json::to_string(&OverrideSource::PerRice).unwrap(),
            "\"per-rice\""
        );
    }
}
