//! Where a theme keeps its Hyprland config.
//!
//! A theme directory may hold a root `hyprland.conf`, a `hyprland/` directory
//! of split configs, or both. Lookups here are pure path arithmetic plus
//! existence checks; nothing is read.
//!
//! # Originals
//!
//! The files that define a theme's as-shipped values are checked in a fixed
//! order, lowest priority first:
//!
//! 1. `hyprland/general.conf`
//! 2. `hyprland/hyprland.conf`
//! 3. `hyprland.conf`
//!
//! When the same path appears in several, the later file wins.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ParamsError;
use crate::types::{Theme, ThemeRepository};

pub const APP_NAME: &str = "lastlayer";

const HYPR_DIR: &str = "hyprland";
const ROOT_CONFIG: &str = "hyprland.conf";

const ORIGINAL_CANDIDATES: &[&str] = &["hyprland/general.conf", "hyprland/hyprland.conf", "hyprland.conf"];
const MAIN_CONFIGS: &[&str] = &["hyprland/hyprland.conf", "hyprland.conf"];

/// The platform config directory for the app (e.g. `~/.config/lastlayer/` on
/// Linux). `None` when no home directory can be determined.
pub fn platform_config_dir() -> Option<PathBuf> {
    let proj = directories::ProjectDirs::from("", "", APP_NAME)?;
    Some(proj.config_dir().to_path_buf())
}

/// Existing original-value files, in priority-ascending order.
pub fn original_candidates(theme: &Path) -> Vec<PathBuf> {
    existing(theme, ORIGINAL_CANDIDATES)
}

/// Existing main configs, the files that should `source` the overrides file.
pub fn main_configs(theme: &Path) -> Vec<PathBuf> {
    existing(theme, MAIN_CONFIGS)
}

fn existing(theme: &Path, relative: &[&str]) -> Vec<PathBuf> {
    relative
        .iter()
        .map(|r| theme.join(r))
        .filter(|p| p.is_file())
        .collect()
}

/// Where the generated overrides config for `theme` lives.
pub fn overrides_conf_path(theme: &Path, file_name: &str) -> PathBuf {
    theme.join(HYPR_DIR).join(file_name)
}

/// Every Hyprland config in a theme: the root `hyprland.conf` plus all
/// `.conf` files under `hyprland/`, recursively. The generated overrides file
/// is excluded. Sorted by path text, so batch operations run in a stable
/// order with the root config first.
///
/// Unreadable directories are logged and skipped.
pub fn theme_config_files(theme: &Path, exclude_name: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let root = theme.join(ROOT_CONFIG);
    if root.is_file() {
        files.push(root);
    }
    collect_confs(&theme.join(HYPR_DIR), exclude_name, &mut files);
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    files
}

fn collect_confs(dir: &Path, exclude_name: &str, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Skipping unreadable config directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_confs(&path, exclude_name, out);
        } else if path.extension().is_some_and(|ext| ext == "conf")
            && path.file_name().is_none_or(|name| name != exclude_name)
        {
            out.push(path);
        }
    }
}

/// True when `dir` looks like a theme with Hyprland config.
pub fn is_theme_dir(dir: &Path) -> bool {
    dir.join(ROOT_CONFIG).is_file() || dir.join(HYPR_DIR).is_dir()
}

/// Themes are the sub-directories of one root folder.
#[derive(Debug, Clone)]
pub struct DirectoryThemes {
    root: PathBuf,
}

impl DirectoryThemes {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ThemeRepository for DirectoryThemes {
    fn list_themes(&self) -> Result<Vec<Theme>, ParamsError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| ParamsError::io(&self.root, e))?;
        let mut themes: Vec<Theme> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir() && is_theme_dir(path))
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy().into_owned();
                Some(Theme { name, path })
            })
            .collect();
        themes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(themes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn original_candidates_keep_priority_order() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("hyprland.conf"));
        touch(&dir.path().join("hyprland/general.conf"));

        let found = original_candidates(dir.path());
        assert_eq!(
            found,
            vec![
                dir.path().join("hyprland/general.conf"),
                dir.path().join("hyprland.conf"),
            ]
        );
    }

    #[test]
    fn original_candidates_empty_theme() {
        let dir = TempDir::new().unwrap();
        assert!(original_candidates(dir.path()).is_empty());
        assert!(main_configs(dir.path()).is_empty());
    }

    #[test]
    fn main_configs_prefer_directory_file_first() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("hyprland.conf"));
        touch(&dir.path().join("hyprland/hyprland.conf"));
        let found = main_configs(dir.path());
        assert_eq!(found[0], dir.path().join("hyprland/hyprland.conf"));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn config_files_are_recursive_sorted_and_skip_generated() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("hyprland.conf"));
        touch(&dir.path().join("hyprland/keybinds.conf"));
        touch(&dir.path().join("hyprland/extra/rules.conf"));
        touch(&dir.path().join("hyprland/notes.txt"));
        touch(&dir.path().join("hyprland/.lastlayer-overrides.conf"));

        let files = theme_config_files(dir.path(), ".lastlayer-overrides.conf");
        assert_eq!(
            files,
            vec![
                dir.path().join("hyprland.conf"),
                dir.path().join("hyprland/extra/rules.conf"),
                dir.path().join("hyprland/keybinds.conf"),
            ]
        );
    }

    #[test]
    fn overrides_conf_lives_in_hyprland_dir() {
        assert_eq!(
            overrides_conf_path(Path::new("/t/nord"), ".lastlayer-overrides.conf"),
            PathBuf::from("/t/nord/hyprland/.lastlayer-overrides.conf")
        );
    }

    #[test]
    fn directory_themes_lists_only_hyprland_themes() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("nord/hyprland.conf"));
        fs::create_dir_all(root.path().join("catppuccin/hyprland")).unwrap();
        fs::create_dir_all(root.path().join("empty")).unwrap();
        touch(&root.path().join("stray.conf"));

        let themes = DirectoryThemes::new(root.path()).list_themes().unwrap();
        let names: Vec<&str> = themes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["catppuccin", "nord"]);
        assert_eq!(themes[1].path, root.path().join("nord"));
    }

    #[test]
    fn directory_themes_missing_root_is_io_error() {
        let root = TempDir::new().unwrap();
        let repo = DirectoryThemes::new(root.path().join("nope"));
        assert!(matches!(repo.list_themes(), Err(ParamsError::Io { .. })));
    }
}
