//! The orchestrator: discover a theme's files, parse and migrate them, merge
//! the three override scopes, and write the result back.
//!
//! Nothing here is cached between calls except the detected compositor
//! version, which lives behind the injected [`VersionProvider`]. Every merge
//! builds a fresh [`OverrideCollection`].

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::ParamsError;
use crate::file;
use crate::migration::{self, MigrationStep};
use crate::overrides::{EffectiveEntry, OverrideCollection};
use crate::parser;
use crate::persist;
use crate::schema::Catalog;
use crate::settings::EngineSettings;
use crate::types::{GlobalOverrideStore, Theme, ThemeRepository};
use crate::value::{ParamMap, ParamValue};
use crate::version::{Version, VersionProvider};

/// Outcome of [`ParameterService::apply_overrides_to_config`].
///
/// A file that fails to read or write lands in `errors`; the other files are
/// still processed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    pub success: bool,
    pub migrated_files: Vec<PathBuf>,
    pub overrides_applied: usize,
    pub errors: Vec<String>,
    /// Overrides left out: unknown to the catalog or failing validation.
    pub skipped: Vec<String>,
}

/// Per-theme result of [`ParameterService::apply_to_all_themes`].
#[derive(Debug)]
pub struct ThemeOutcome {
    pub theme: Theme,
    pub result: Result<PathBuf, ParamsError>,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    #[serde(rename = "generatedAt")]
    generated_at: String,
    parameters: &'a std::collections::BTreeMap<String, EffectiveEntry>,
}

pub struct ParameterService {
    pub(crate) catalog: Catalog,
    pub(crate) settings: EngineSettings,
    pub(crate) store: Box<dyn GlobalOverrideStore>,
    pub(crate) version: Box<dyn VersionProvider>,
    pub(crate) themes: Option<Box<dyn ThemeRepository>>,
}

impl ParameterService {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The compositor version migrations target. Probed once, then cached.
    pub fn detected_version(&self) -> Version {
        self.version.version()
    }

    /// Forget the cached version so the next call re-detects it.
    pub fn invalidate_version(&self) {
        self.version.invalidate();
    }

    /// Validate raw text for a known parameter.
    ///
    /// `Ok(None)` means the input was empty, i.e. "unset".
    pub fn validate_parameter(&self, path: &str, raw: &str) -> Result<Option<ParamValue>, ParamsError> {
        let param = self
            .catalog
            .get(path)
            .ok_or_else(|| ParamsError::UnknownParameter(path.to_string()))?;
        param.validate(raw).map_err(|e| ParamsError::InvalidValue {
            key: path.to_string(),
            reason: e.to_string(),
        })
    }

    // -- originals -----------------------------------------------------------

    /// Parse every original-value file of a theme and fold them, later files
    /// winning, without migrating.
    pub fn read_theme_raw(&self, theme: &Path) -> ParamMap {
        let mut merged = ParamMap::new();
        for path in file::original_candidates(theme) {
            if let Some(parsed) = parser::parse_file(&path) {
                merged.extend(parsed.to_param_map());
            }
        }
        merged
    }

    /// The theme's as-shipped values, migrated to `target`, plus every step
    /// the migration took.
    pub fn migrate_theme(&self, theme: &Path, target: Version) -> (ParamMap, Vec<MigrationStep>) {
        let raw = self.read_theme_raw(theme);
        let (migrated, steps) = migration::migrate_with_report(&raw, target);
        for step in &steps {
            info!(theme = %theme.display(), step = %step, "Migrated parameter");
        }
        (migrated, steps)
    }

    /// The theme's as-shipped values, migrated to the detected version.
    pub fn parse_theme_originals(&self, theme: &Path) -> ParamMap {
        self.migrate_theme(theme, self.detected_version()).0
    }

    // -- global scope --------------------------------------------------------

    /// Global overrides from the store. A failing store is logged and
    /// treated as empty.
    pub fn global_overrides(&self) -> ParamMap {
        match self.store.read() {
            Ok(map) => map.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Could not read global overrides");
                ParamMap::new()
            }
        }
    }

    /// Validate and persist one global override. An empty value clears it.
    pub fn set_global(&self, path: &str, raw: &str) -> Result<Option<ParamValue>, ParamsError> {
        let value = self.validate_parameter(path, raw)?;
        let mut globals = self.store.read()?.unwrap_or_default();
        match &value {
            Some(v) => {
                globals.insert(path.to_string(), v.clone());
            }
            None => {
                globals.remove(path);
            }
        }
        self.store.write(&globals)?;
        info!(path, value = ?value, "Updated global override");
        Ok(value)
    }

    /// Remove one global override. Returns whether it was set.
    pub fn clear_global(&self, path: &str) -> Result<bool, ParamsError> {
        let mut globals = self.store.read()?.unwrap_or_default();
        let existed = globals.remove(path).is_some();
        if existed {
            self.store.write(&globals)?;
            info!(path, "Cleared global override");
        }
        Ok(existed)
    }

    // -- per-rice scope ------------------------------------------------------

    pub fn per_rice_path(&self, theme: &Path) -> PathBuf {
        theme.join(&self.settings.per_rice_file_name)
    }

    pub fn read_per_rice(&self, theme: &Path) -> ParamMap {
        persist::read_per_rice(&self.per_rice_path(theme))
    }

    pub fn write_per_rice(&self, theme: &Path, params: &ParamMap) -> Result<(), ParamsError> {
        persist::write_per_rice(&self.per_rice_path(theme), params, &timestamp())
    }

    /// Validate and persist one per-theme override. An empty value clears it.
    pub fn set_per_rice(&self, theme: &Path, path: &str, raw: &str) -> Result<Option<ParamValue>, ParamsError> {
        let value = self.validate_parameter(path, raw)?;
        let mut params = self.read_per_rice(theme);
        match &value {
            Some(v) => {
                params.insert(path.to_string(), v.clone());
            }
            None => {
                params.remove(path);
            }
        }
        self.write_per_rice(theme, &params)?;
        Ok(value)
    }

    // -- merge ---------------------------------------------------------------

    /// Build a fresh three-scope collection for `theme`.
    ///
    /// Globals and per-rice overrides go through the same migration as the
    /// originals, so an override written against an old path lands on the
    /// new one, and an override of a removed parameter is dropped instead of
    /// resurrecting it.
    pub fn get_merged_parameters(&self, theme: &Path) -> OverrideCollection {
        let version = self.detected_version();
        let mut collection = OverrideCollection::new();
        collection.load_originals(&self.migrate_theme(theme, version).0);
        collection.load_globals(&migration::migrate(&self.global_overrides(), version));
        collection.load_per_rice(&migration::migrate(&self.read_per_rice(theme), version));
        collection
    }

    /// Applicable overrides that are known and valid, formatted for config
    /// text. The second list names the ones left out.
    fn renderable_overrides(&self, collection: &OverrideCollection) -> (Vec<(String, String)>, Vec<String>) {
        let mut rendered = Vec::new();
        let mut skipped = Vec::new();
        for (path, value) in collection.applicable_overrides() {
            let Some(param) = self.catalog.get(&path) else {
                debug!(path = %path, "Not applying override for unknown parameter");
                skipped.push(path);
                continue;
            };
            match param.validate_value(Some(&value)) {
                Ok(Some(valid)) => rendered.push((path, param.format_value(&valid))),
                Ok(None) => skipped.push(path),
                Err(e) => {
                    warn!(path = %path, error = %e, "Not applying invalid override");
                    skipped.push(path);
                }
            }
        }
        (rendered, skipped)
    }

    // -- writers -------------------------------------------------------------

    /// Rewrite every config file of `theme` in place so assignments of
    /// overridden parameters carry their effective values.
    ///
    /// Only files whose text actually changed are written.
    pub fn apply_overrides_to_config(&self, theme: &Path) -> ApplyResult {
        let collection = self.get_merged_parameters(theme);
        let (rendered, skipped) = self.renderable_overrides(&collection);
        let mut result = ApplyResult {
            skipped,
            ..ApplyResult::default()
        };

        if !rendered.is_empty() {
            let policy = self.settings.comment_policy;
            for path in file::theme_config_files(theme, &self.settings.overrides_conf_name) {
                let text = match std::fs::read_to_string(&path) {
                    Ok(t) => t,
                    Err(e) => {
                        error!(path = %path.display(), error = %e, "Could not read config");
                        result.errors.push(ParamsError::io(&path, e).to_string());
                        continue;
                    }
                };

                let mut patched = text;
                let mut changed = 0;
                for (param, value) in &rendered {
                    let (next, n) = persist::substitute_parameter(&patched, param, value, policy);
                    patched = next;
                    changed += n;
                }
                if changed == 0 {
                    continue;
                }

                match persist::write_file(&path, &patched) {
                    Ok(()) => {
                        info!(path = %path.display(), changed, "Applied overrides");
                        result.overrides_applied += changed;
                        result.migrated_files.push(path);
                    }
                    Err(e) => {
                        error!(path = %path.display(), error = %e, "Could not write config");
                        result.errors.push(e.to_string());
                    }
                }
            }
        }

        result.success = result.errors.is_empty();
        result
    }

    /// Write the effective-overrides snapshot for `theme` and return its path.
    pub fn write_effective_overrides(&self, theme: &Path) -> Result<PathBuf, ParamsError> {
        let collection = self.get_merged_parameters(theme);
        let parameters = collection.effective_overrides();
        let snapshot = Snapshot {
            generated_at: timestamp(),
            parameters: &parameters,
        };
        let path = theme.join(&self.settings.snapshot_file_name);
        let body = serde_json::to_string_pretty(&snapshot).map_err(|e| ParamsError::Json {
            path: path.clone(),
            source: e,
        })?;
        persist::write_file(&path, &body)?;
        debug!(path = %path.display(), count = parameters.len(), "Wrote effective overrides");
        Ok(path)
    }

    /// Regenerate the theme's overrides config and make sure its main
    /// configs source it exactly once. Returns the overrides config path.
    ///
    /// The theme path is resolved to its canonical form first, so the
    /// `source=` directive is absolute and every spelling of one theme maps
    /// to the same line. A path that is not an existing theme is an error.
    pub fn write_overrides_config(&self, theme: &Path) -> Result<PathBuf, ParamsError> {
        let canonical = std::fs::canonicalize(theme).map_err(|e| ParamsError::io(theme, e))?;
        if !file::is_theme_dir(&canonical) {
            return Err(ParamsError::NotATheme { path: canonical });
        }
        let theme = canonical.as_path();

        let collection = self.get_merged_parameters(theme);
        let (rendered, _) = self.renderable_overrides(&collection);
        let overrides: ParamMap = rendered
            .into_iter()
            .map(|(path, value)| (path, ParamValue::Str(value)))
            .collect();

        let target = file::overrides_conf_path(theme, &self.settings.overrides_conf_name);
        let content = persist::render_overrides_conf(&theme_name(theme), &overrides, &self.catalog);
        persist::write_file(&target, &content)?;

        let directive = target.display().to_string();
        for main in file::main_configs(theme) {
            let text = std::fs::read_to_string(&main).map_err(|e| ParamsError::io(&main, e))?;
            if let Some(updated) = persist::ensure_source_directive(&text, &directive) {
                persist::write_file(&main, &updated)?;
                info!(path = %main.display(), "Added source directive for overrides");
            }
        }

        info!(theme = %theme.display(), count = overrides.len(), "Wrote overrides config");
        Ok(target)
    }

    // -- themes --------------------------------------------------------------

    pub fn list_themes(&self) -> Result<Vec<Theme>, ParamsError> {
        self.themes
            .as_ref()
            .ok_or(ParamsError::NoThemesRoot)?
            .list_themes()
    }

    /// Run [`write_overrides_config`](Self::write_overrides_config) for every
    /// theme. One theme failing does not stop the others.
    pub fn apply_to_all_themes(&self) -> Result<Vec<ThemeOutcome>, ParamsError> {
        let themes = self.list_themes()?;
        Ok(themes
            .into_iter()
            .map(|theme| {
                let result = self.write_overrides_config(&theme.path);
                if let Err(e) = &result {
                    error!(theme = %theme.name, error = %e, "Could not write overrides config");
                }
                ThemeOutcome { theme, result }
            })
            .collect())
    }
}

fn theme_name(theme: &Path) -> String {
    theme
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| theme.display().to_string())
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
