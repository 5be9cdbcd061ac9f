use std::path::PathBuf;

use crate::error::ParamsError;
use crate::file::DirectoryThemes;
use crate::schema::Catalog;
use crate::service::ParameterService;
use crate::settings::{self, EngineSettings};
use crate::store::{FallbackStore, MemoryStore, TomlSettingsStore};
use crate::types::{GlobalOverrideStore, ThemeRepository};
use crate::version::{CachedVersion, StaticProbe, VersionProvider};

impl ParameterService {
    pub fn builder() -> ParameterServiceBuilder {
        ParameterServiceBuilder::new()
    }
}

/// Assembles a [`ParameterService`] from its collaborators.
///
/// Anything not supplied is derived from [`EngineSettings`]:
///
/// - **Settings**: [`settings()`](Self::settings) as given, else loaded from
///   [`settings_file()`](Self::settings_file), else from the platform file.
/// - **Global store**: a TOML store at the configured settings file, falling
///   back to the platform file for reads.
/// - **Version**: the pinned `compositor_version`, or unknown.
/// - **Themes**: the sub-directories of `themes_root`, if set.
#[derive(Default)]
pub struct ParameterServiceBuilder {
    catalog: Option<Catalog>,
    settings: Option<EngineSettings>,
    settings_file: Option<PathBuf>,
    store: Option<Box<dyn GlobalOverrideStore>>,
    version: Option<Box<dyn VersionProvider>>,
    themes: Option<Box<dyn ThemeRepository>>,
}

impl ParameterServiceBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Replace the built-in parameter catalog.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use these settings as-is; no file or env is read.
    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Load settings from this TOML file (plus env) instead of the platform file.
    pub fn settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    pub fn store(mut self, store: impl GlobalOverrideStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn version_provider(mut self, provider: impl VersionProvider + 'static) -> Self {
        self.version = Some(Box::new(provider));
        self
    }

    /// Shorthand for a provider that always reports `version`.
    pub fn compositor_version(self, version: &str) -> Self {
        self.version_provider(CachedVersion::new(StaticProbe::new(version)))
    }

    pub fn themes(mut self, repository: impl ThemeRepository + 'static) -> Self {
        self.themes = Some(Box::new(repository));
        self
    }

    pub fn build(self) -> Result<ParameterService, ParamsError> {
        let settings = match (self.settings, &self.settings_file) {
            (Some(s), _) => s,
            (None, Some(path)) => EngineSettings::load_from(path)?,
            (None, None) => EngineSettings::load()?,
        };

        let store = match self.store {
            Some(s) => s,
            None => default_store(&settings),
        };

        let version = match self.version {
            Some(v) => v,
            None => Box::new(CachedVersion::new(StaticProbe(
                settings.compositor_version.clone(),
            ))),
        };

        let themes = self.themes.or_else(|| {
            settings
                .themes_root
                .as_ref()
                .map(|root| Box::new(DirectoryThemes::new(root)) as Box<dyn ThemeRepository>)
        });

        Ok(ParameterService {
            catalog: self.catalog.unwrap_or_default(),
            settings,
            store,
            version,
            themes,
        })
    }
}

/// The configured settings file first, then the platform file when it
/// differs. Without any config directory, overrides only live in memory.
fn default_store(settings: &EngineSettings) -> Box<dyn GlobalOverrideStore> {
    let Some(primary) = settings.global_settings_path() else {
        return Box::new(MemoryStore::new());
    };
    let mut chain = FallbackStore::new().then(TomlSettingsStore::new(&primary));
    if let Some(platform) = settings::default_settings_path()
        && platform != primary
    {
        chain = chain.then(TomlSettingsStore::new(platform));
    }
    Box::new(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::str_map;
    use crate::version::Version;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_collaborators_are_used() {
        let service = ParameterService::builder()
            .settings(EngineSettings::default())
            .store(MemoryStore::with(str_map([("general:gaps_in", "3")])))
            .compositor_version("0.44.1")
            .build()
            .unwrap();
        assert_eq!(service.detected_version(), Version::new(0, 44, 1));
        assert_eq!(service.global_overrides(), str_map([("general:gaps_in", "3")]));
        assert!(service.catalog().contains("general:gaps_in"));
    }

    #[test]
    fn settings_file_drives_defaults() {
        let dir = TempDir::new().unwrap();
        let themes = dir.path().join("themes");
        fs::create_dir_all(themes.join("nord")).unwrap();
        fs::write(themes.join("nord/hyprland.conf"), "").unwrap();
        let globals = dir.path().join("globals.toml");
        fs::write(&globals, "[hyprland_overrides]\n\"general:gaps_out\" = \"30\"\n").unwrap();

        let settings_path = dir.path().join("settings.toml");
        fs::write(
            &settings_path,
            format!(
                "compositor_version = \"0.40.0\"\nthemes_root = {:?}\nglobal_settings_file = {:?}\n",
                themes.display().to_string(),
                globals.display().to_string(),
            ),
        )
        .unwrap();

        let service = ParameterService::builder()
            .settings_file(&settings_path)
            .build()
            .unwrap();
        assert_eq!(service.detected_version(), Version::new(0, 40, 0));
        assert_eq!(service.global_overrides(), str_map([("general:gaps_out", "30")]));
        let names: Vec<String> = service.list_themes().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["nord".to_string()]);
    }

    #[test]
    fn missing_version_is_unknown() {
        let service = ParameterService::builder()
            .settings(EngineSettings::default())
            .store(MemoryStore::new())
            .build()
            .unwrap();
        assert!(service.detected_version().is_unknown());
    }
}
