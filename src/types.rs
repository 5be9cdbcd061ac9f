use std::path::PathBuf;

use serde::Serialize;

use crate::error::ParamsError;
use crate::value::ParamMap;

/// A named theme ("rice") and the directory holding its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub name: String,
    pub path: PathBuf,
}

/// Reader/writer for the user's global Hyprland overrides.
///
/// `read` returns `Ok(None)` when the source has nothing to say (no file, no
/// table), letting a [`FallbackStore`](crate::store::FallbackStore) move on
/// to the next source.
pub trait GlobalOverrideStore {
    fn read(&self) -> Result<Option<ParamMap>, ParamsError>;
    fn write(&self, overrides: &ParamMap) -> Result<(), ParamsError>;
}

/// Enumerates installed themes.
pub trait ThemeRepository {
    fn list_themes(&self) -> Result<Vec<Theme>, ParamsError>;
}

/// A parameter operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsAction {
    Parse { file: PathBuf },
    Validate { path: String, value: String },
    Migrate { theme: PathBuf, target: Option<String> },
    Merged { theme: PathBuf },
    Apply { theme: PathBuf },
    Write { theme: PathBuf },
    Themes,
    SetGlobal { path: String, value: String },
    UnsetGlobal { path: String },
    SettingsTemplate { output: Option<PathBuf> },
}
