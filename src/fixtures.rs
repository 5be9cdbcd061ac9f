#[cfg(test)]
pub mod test {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::service::ParameterService;
    use crate::settings::EngineSettings;
    use crate::types::GlobalOverrideStore;

    /// A throwaway theme directory, `<tmp>/<name>/`, removed on drop.
    pub struct ThemeTree {
        _root: TempDir,
        theme: std::path::PathBuf,
    }

    impl ThemeTree {
        pub fn new(name: &str) -> Self {
            let root = TempDir::new().unwrap();
            let theme = root.path().join(name);
            fs::create_dir_all(&theme).unwrap();
            Self { _root: root, theme }
        }

        /// Write `content` to a path relative to the theme directory.
        pub fn file(self, relative: &str, content: &str) -> Self {
            let path = self.theme.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
            self
        }

        pub fn path(&self) -> &Path {
            &self.theme
        }

        pub fn read(&self, relative: &str) -> String {
            fs::read_to_string(self.theme.join(relative)).unwrap()
        }
    }

    /// A service with default settings, the given store, and a pinned version.
    pub fn service_with(store: impl GlobalOverrideStore + 'static, version: &str) -> ParameterService {
        ParameterService::builder()
            .settings(EngineSettings::default())
            .store(store)
            .compositor_version(version)
            .build()
            .unwrap()
    }

    #[test]
    fn theme_tree_writes_nested_files() {
        let tree = ThemeTree::new("nord").file("hyprland/general.conf", "a = 1\n");
        assert!(tree.path().ends_with("nord"));
        assert_eq!(tree.read("hyprland/general.conf"), "a = 1\n");
    }
}
