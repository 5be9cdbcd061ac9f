//! Engine settings: file names, comment handling, and where things live.
//!
//! Layered the usual way: `LASTLAYER_*` environment variables over an
//! optional TOML file over compiled-in defaults.

use std::path::{Path, PathBuf};

use confique::Config;
use serde::Serialize;
use tracing::warn;

use crate::error::ParamsError;
use crate::file;
use crate::persist::CommentPolicy;
use crate::store::DEFAULT_TABLE;

pub const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Name of the generated overrides config, written inside each theme's
    /// `hyprland/` directory and sourced from its main config.
    #[config(default = ".lastlayer-overrides.conf")]
    pub overrides_conf_name: String,

    /// Name of the per-theme overrides file (JSON), kept at the theme root.
    #[config(default = ".lastlayer-overrides.json")]
    pub per_rice_file_name: String,

    /// Name of the effective-overrides snapshot (JSON), kept at the theme root.
    #[config(default = ".lastlayer-effective.json")]
    pub snapshot_file_name: String,

    /// What happens to a trailing `# comment` when a value is rewritten:
    /// "preserve" keeps it, "replace" overwrites it with the value.
    #[config(default = "preserve")]
    pub comment_policy: CommentPolicy,

    /// Pin the Hyprland version used for migrations, e.g. "0.45.2".
    /// Unset means unknown, which migrates toward the oldest release.
    #[config(env = "LASTLAYER_HYPR_VERSION")]
    pub compositor_version: Option<String>,

    /// TOML file holding the `[hyprland_overrides]` table. Defaults to the
    /// settings file in the platform config directory.
    #[config(env = "LASTLAYER_GLOBAL_SETTINGS")]
    pub global_settings_file: Option<PathBuf>,

    /// Directory whose sub-directories are themes.
    #[config(env = "LASTLAYER_THEMES_DIR")]
    pub themes_root: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            overrides_conf_name: ".lastlayer-overrides.conf".into(),
            per_rice_file_name: ".lastlayer-overrides.json".into(),
            snapshot_file_name: ".lastlayer-effective.json".into(),
            comment_policy: CommentPolicy::Preserve,
            compositor_version: None,
            global_settings_file: None,
            themes_root: None,
        }
    }
}

impl EngineSettings {
    /// Load env over `path` over defaults. A missing file is not an error.
    /// Keys the engine does not know are logged, since the same file also
    /// carries the global overrides table.
    pub fn load_from(path: &Path) -> Result<Self, ParamsError> {
        if let Ok(content) = std::fs::read_to_string(path) {
            for key in unknown_keys(&content).map_err(|e| ParamsError::Toml {
                path: path.to_path_buf(),
                source: e,
            })? {
                warn!(key = %key, path = %path.display(), "Unknown setting ignored");
            }
        }
        Ok(Self::builder().env().file(path).load()?)
    }

    /// Load from the platform settings file, or env and defaults alone when
    /// no config directory exists.
    pub fn load() -> Result<Self, ParamsError> {
        match default_settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::builder().env().load()?),
        }
    }

    /// The TOML file global overrides are read from and written to.
    pub fn global_settings_path(&self) -> Option<PathBuf> {
        self.global_settings_file
            .clone()
            .or_else(default_settings_path)
    }
}

/// Keys in a settings file that no setting consumes. The global overrides
/// table is expected and never reported.
pub fn unknown_keys(content: &str) -> Result<Vec<String>, toml::de::Error> {
    let mut unknown = Vec::new();
    let deserializer = toml::Deserializer::new(content);
    let _layer: <EngineSettings as Config>::Layer =
        serde_ignored::deserialize(deserializer, |ignored| {
            let key = ignored.to_string();
            if key != DEFAULT_TABLE && !key.starts_with(&format!("{DEFAULT_TABLE}.")) {
                unknown.push(key);
            }
        })?;
    Ok(unknown)
}

pub fn default_settings_path() -> Option<PathBuf> {
    file::platform_config_dir().map(|dir| dir.join(SETTINGS_FILE_NAME))
}

/// A commented TOML template listing every setting and its default.
pub fn generate_template() -> String {
    confique::toml::template::<EngineSettings>(confique::toml::FormatOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_default_impl() {
        let dir = TempDir::new().unwrap();
        let loaded = EngineSettings::builder()
            .file(dir.path().join("missing.toml"))
            .load()
            .unwrap();
        assert_eq!(loaded, EngineSettings::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "comment_policy = \"replace\"\ncompositor_version = \"0.41.0\"\n\n[hyprland_overrides]\n\"general:gaps_in\" = \"4\"\n",
        )
        .unwrap();

        let loaded = EngineSettings::builder().file(&path).load().unwrap();
        assert_eq!(loaded.comment_policy, CommentPolicy::Replace);
        assert_eq!(loaded.compositor_version.as_deref(), Some("0.41.0"));
        assert_eq!(loaded.overrides_conf_name, ".lastlayer-overrides.conf");
    }

    #[test]
    fn bad_comment_policy_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "comment_policy = \"sometimes\"\n").unwrap();
        assert!(EngineSettings::builder().file(&path).load().is_err());
    }

    #[test]
    fn unknown_keys_skip_the_overrides_table() {
        let content = "comment_policy = \"preserve\"\nthemes_dir = \"/x\"\n\n[hyprland_overrides]\n\"general:gaps_in\" = \"4\"\n";
        assert_eq!(unknown_keys(content).unwrap(), vec!["themes_dir".to_string()]);
    }

    #[test]
    fn explicit_global_settings_file_wins() {
        let settings = EngineSettings {
            global_settings_file: Some(PathBuf::from("/etc/lastlayer.toml")),
            ..EngineSettings::default()
        };
        assert_eq!(
            settings.global_settings_path(),
            Some(PathBuf::from("/etc/lastlayer.toml"))
        );
    }

    #[test]
    fn template_documents_every_setting() {
        let template = generate_template();
        for key in [
            "overrides_conf_name",
            "per_rice_file_name",
            "snapshot_file_name",
            "comment_policy",
            "compositor_version",
            "global_settings_file",
            "themes_root",
        ] {
            assert!(template.contains(key), "template is missing {key}");
        }
        assert!(template.contains("preserve"));
    }
}
