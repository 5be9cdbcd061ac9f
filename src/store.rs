//! Where global overrides live.
//!
//! The default home is a `[hyprland_overrides]` table inside the app's TOML
//! settings file. Writes go through `toml_edit`, so the user's comments and
//! any unrelated settings in that file survive.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::ParamsError;
use crate::file;
use crate::types::GlobalOverrideStore;
use crate::value::{ParamMap, ParamValue};

pub const DEFAULT_TABLE: &str = "hyprland_overrides";

/// Global overrides stored as a table in a TOML settings file.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
    table: String,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// `settings.toml` in the platform config directory
    /// (e.g. `~/.config/lastlayer/` on Linux).
    pub fn platform_default() -> Option<Self> {
        file::platform_config_dir().map(|dir| Self::new(dir.join("settings.toml")))
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GlobalOverrideStore for TomlSettingsStore {
    fn read(&self) -> Result<Option<ParamMap>, ParamsError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ParamsError::io(&self.path, e)),
        };
        let doc: toml::Table = toml::from_str(&content).map_err(|e| ParamsError::Toml {
            path: self.path.clone(),
            source: e,
        })?;
        let Some(table) = doc.get(&self.table).and_then(toml::Value::as_table) else {
            return Ok(None);
        };

        let mut map = ParamMap::new();
        for (key, value) in table {
            match ParamValue::from_toml(value) {
                Some(v) if !v.is_empty() => {
                    map.insert(key.clone(), v);
                }
                Some(_) => {}
                None => warn!(key = %key, path = %self.path.display(), "Skipping non-scalar global override"),
            }
        }
        Ok(Some(map))
    }

    fn write(&self, overrides: &ParamMap) -> Result<(), ParamsError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => Some(c),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(ParamsError::io(&self.path, e)),
        };
        let updated = set_table_in_document(content.as_deref(), &self.table, overrides).map_err(
            |e| ParamsError::TomlEdit {
                path: self.path.clone(),
                source: e,
            },
        )?;
        crate::persist::write_file(&self.path, &updated)?;
        debug!(path = %self.path.display(), count = overrides.len(), "Wrote global overrides");
        Ok(())
    }
}

/// Pure function: make `table` in a TOML document hold exactly `overrides`.
///
/// Keys that stay keep their comments; removed keys disappear; everything
/// outside the table is untouched.
pub fn set_table_in_document(
    content: Option<&str>,
    table: &str,
    overrides: &ParamMap,
) -> Result<String, toml_edit::TomlError> {
    let mut doc: toml_edit::DocumentMut = content.unwrap_or_default().parse()?;

    if !doc.get(table).is_some_and(toml_edit::Item::is_table) {
        doc[table] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    if let Some(tbl) = doc[table].as_table_mut() {
        tbl.retain(|key, _| overrides.contains_key(key));
        for (key, value) in overrides {
            tbl[key.as_str()] = toml_edit::value(to_toml_edit(value));
        }
    }

    Ok(doc.to_string())
}

fn to_toml_edit(value: &ParamValue) -> toml_edit::Value {
    match value {
        ParamValue::Bool(b) => (*b).into(),
        ParamValue::Int(i) => (*i).into(),
        ParamValue::Float(x) => (*x).into(),
        ParamValue::Str(s) => s.as_str().into(),
    }
}

/// In-process store, for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<ParamMap>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(overrides: ParamMap) -> Self {
        Self {
            inner: Mutex::new(Some(overrides)),
        }
    }
}

impl GlobalOverrideStore for MemoryStore {
    fn read(&self) -> Result<Option<ParamMap>, ParamsError> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    fn write(&self, overrides: &ParamMap) -> Result<(), ParamsError> {
        *self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(overrides.clone());
        Ok(())
    }
}

/// Ordered chain of sources. Reads return the first source that has a map;
/// a source that errors is logged and skipped. Writes go to the first source.
#[derive(Default)]
pub struct FallbackStore {
    sources: Vec<Box<dyn GlobalOverrideStore>>,
}

impl FallbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, source: impl GlobalOverrideStore + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl GlobalOverrideStore for FallbackStore {
    fn read(&self) -> Result<Option<ParamMap>, ParamsError> {
        for (i, source) in self.sources.iter().enumerate() {
            match source.read() {
                Ok(Some(map)) => return Ok(Some(map)),
                Ok(None) => continue,
                Err(e) => warn!(source = i, error = %e, "Global override source failed, trying next"),
            }
        }
        Ok(None)
    }

    fn write(&self, overrides: &ParamMap) -> Result<(), ParamsError> {
        match self.sources.first() {
            Some(primary) => primary.write(overrides),
            None => Ok(()),
        }
    }
}
