//! Action handling and result rendering.
//!
//! [`ParameterService::handle`] runs a [`ParamsAction`] and returns a
//! [`ParamsResult`] whose `Display` is what the CLI prints.

use std::fmt;
use std::path::PathBuf;

use crate::error::ParamsError;
use crate::migration::MigrationStep;
use crate::overrides::EffectiveEntry;
use crate::parser;
use crate::persist;
use crate::service::{ApplyResult, ParameterService};
use crate::settings;
use crate::types::{ParamsAction, Theme};
use crate::value::{ParamMap, ParamValue};
use crate::version::Version;

/// Result of a parameter operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsResult {
    /// Parameters parsed from one file, in path order.
    Parsed { parameters: ParamMap },
    /// A value that passed validation (`None` when it was empty).
    Valid { path: String, value: Option<ParamValue> },
    /// A theme's originals after migration, and what changed.
    Migrated {
        target: Version,
        parameters: ParamMap,
        steps: Vec<MigrationStep>,
    },
    /// Every known path with its winning scope.
    Merged {
        entries: Vec<(String, EffectiveEntry)>,
    },
    Applied(ApplyResult),
    OverridesWritten { path: PathBuf },
    Themes(Vec<Theme>),
    GlobalSet { path: String, value: Option<ParamValue> },
    GlobalUnset { path: String, existed: bool },
    Template(String),
    TemplateWritten { path: PathBuf },
}

impl fmt::Display for ParamsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsResult::Parsed { parameters } => write_map(f, parameters),
            ParamsResult::Valid { path, value } => match value {
                Some(v) => writeln!(f, "{path} = {v} (valid)"),
                None => writeln!(f, "{path} is unset (valid)"),
            },
            ParamsResult::Migrated {
                target,
                parameters,
                steps,
            } => {
                writeln!(f, "# target version {target}")?;
                for step in steps {
                    writeln!(f, "# {step}")?;
                }
                write_map(f, parameters)
            }
            ParamsResult::Merged { entries } => {
                for (path, entry) in entries {
                    write!(f, "{path} = {} [{}]", entry.value, entry.source)?;
                    match &entry.original_value {
                        Some(original) if !original.same_as(&entry.value) => {
                            writeln!(f, " (was {original})")?
                        }
                        _ => writeln!(f)?,
                    }
                }
                Ok(())
            }
            ParamsResult::Applied(result) => {
                writeln!(
                    f,
                    "Applied {} override(s) to {} file(s)",
                    result.overrides_applied,
                    result.migrated_files.len()
                )?;
                for path in &result.migrated_files {
                    writeln!(f, "  updated {}", path.display())?;
                }
                for path in &result.skipped {
                    writeln!(f, "  skipped {path}")?;
                }
                for error in &result.errors {
                    writeln!(f, "  error: {error}")?;
                }
                Ok(())
            }
            ParamsResult::OverridesWritten { path } => {
                writeln!(f, "Overrides config written to {}", path.display())
            }
            ParamsResult::Themes(themes) => {
                for theme in themes {
                    writeln!(f, "{}\t{}", theme.name, theme.path.display())?;
                }
                Ok(())
            }
            ParamsResult::GlobalSet { path, value } => match value {
                Some(v) => writeln!(f, "Set {path} = {v}"),
                None => writeln!(f, "Unset {path}"),
            },
            ParamsResult::GlobalUnset { path, existed } => {
                if *existed {
                    writeln!(f, "Unset {path}")
                } else {
                    writeln!(f, "{path} was not set")
                }
            }
            ParamsResult::Template(t) => write!(f, "{t}"),
            ParamsResult::TemplateWritten { path } => {
                writeln!(f, "Settings template written to {}", path.display())
            }
        }
    }
}

fn write_map(f: &mut fmt::Formatter<'_>, map: &ParamMap) -> fmt::Result {
    for (path, value) in map {
        writeln!(f, "{path} = {value}")?;
    }
    Ok(())
}

impl ParameterService {
    /// Handle a [`ParamsAction`] and print the result to stdout.
    pub fn handle_and_print(&self, action: &ParamsAction) -> Result<(), ParamsError> {
        let result = self.handle(action)?;
        print!("{result}");
        Ok(())
    }

    pub fn handle(&self, action: &ParamsAction) -> Result<ParamsResult, ParamsError> {
        match action {
            ParamsAction::Parse { file } => {
                let text = std::fs::read_to_string(file).map_err(|e| ParamsError::io(file, e))?;
                Ok(ParamsResult::Parsed {
                    parameters: parser::parse(&text).to_param_map(),
                })
            }
            ParamsAction::Validate { path, value } => Ok(ParamsResult::Valid {
                path: path.clone(),
                value: self.validate_parameter(path, value)?,
            }),
            ParamsAction::Migrate { theme, target } => {
                let target = match target {
                    Some(v) => Version::parse(v),
                    None => self.detected_version(),
                };
                let (parameters, steps) = self.migrate_theme(theme, target);
                Ok(ParamsResult::Migrated {
                    target,
                    parameters,
                    steps,
                })
            }
            ParamsAction::Merged { theme } => Ok(ParamsResult::Merged {
                entries: self
                    .get_merged_parameters(theme)
                    .effective_overrides()
                    .into_iter()
                    .collect(),
            }),
            ParamsAction::Apply { theme } => {
                Ok(ParamsResult::Applied(self.apply_overrides_to_config(theme)))
            }
            ParamsAction::Write { theme } => {
                let path = self.write_overrides_config(theme)?;
                self.write_effective_overrides(theme)?;
                Ok(ParamsResult::OverridesWritten { path })
            }
            ParamsAction::Themes => Ok(ParamsResult::Themes(self.list_themes()?)),
            ParamsAction::SetGlobal { path, value } => Ok(ParamsResult::GlobalSet {
                path: path.clone(),
                value: self.set_global(path, value)?,
            }),
            ParamsAction::UnsetGlobal { path } => Ok(ParamsResult::GlobalUnset {
                path: path.clone(),
                existed: self.clear_global(path)?,
            }),
            ParamsAction::SettingsTemplate { output } => {
                let template = settings::generate_template();
                match output {
                    Some(path) => {
                        persist::write_file(path, &template)?;
                        Ok(ParamsResult::TemplateWritten { path: path.clone() })
                    }
                    None => Ok(ParamsResult::Template(template)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{ThemeTree, service_with};
    use crate::overrides::OverrideSource;
    use crate::store::MemoryStore;
    use crate::value::str_map;
    use tempfile::TempDir;

    #[test]
    fn parse_lists_resolved_paths() {
        let tree = ThemeTree::new("nord").file("hyprland.conf", "general {\n  gaps_in = 5\n}\n");
        let service = service_with(MemoryStore::new(), "0.45.0");
        let result = service
            .handle(&ParamsAction::Parse {
                file: tree.path().join("hyprland.conf"),
            })
            .unwrap();
        assert_eq!(result.to_string(), "general:gaps_in = 5\n");
    }

    #[test]
    fn validate_reports_errors_as_invalid_value() {
        let service = service_with(MemoryStore::new(), "0.45.0");
        let err = service
            .handle(&ParamsAction::Validate {
                path: "general:gaps_in".into(),
                value: "-5".into(),
            })
            .unwrap_err();
        assert!(err.to_string().ends_with("Value -5 is below minimum 0"));
    }

    #[test]
    fn migrate_with_explicit_target_shows_steps() {
        let tree = ThemeTree::new("old").file("hyprland.conf", "decoration:blur_size = 10\n");
        let service = service_with(MemoryStore::new(), "0.20.0");
        let result = service
            .handle(&ParamsAction::Migrate {
                theme: tree.path().to_path_buf(),
                target: Some("0.30.0".into()),
            })
            .unwrap();
        let text = result.to_string();
        assert!(text.starts_with("# target version 0.30.0\n"));
        assert!(text.contains("decoration:blur:size = 10"));
    }

    #[test]
    fn merged_display_marks_changed_values() {
        let display = ParamsResult::Merged {
            entries: vec![(
                "general:gaps_in".into(),
                EffectiveEntry {
                    value: ParamValue::from("8"),
                    source: OverrideSource::Global,
                    original_value: Some(ParamValue::from("5")),
                },
            )],
        }
        .to_string();
        assert_eq!(display, "general:gaps_in = 8 [global] (was 5)\n");
    }

    #[test]
    fn set_and_unset_global_round_trip() {
        let service = service_with(MemoryStore::new(), "0.45.0");
        let set = service
            .handle(&ParamsAction::SetGlobal {
                path: "general:gaps_in".into(),
                value: "6".into(),
            })
            .unwrap();
        assert_eq!(set.to_string(), "Set general:gaps_in = 6\n");
        assert_eq!(service.global_overrides(), {
            let mut m = ParamMap::new();
            m.insert("general:gaps_in".into(), ParamValue::Int(6));
            m
        });

        let unset = service
            .handle(&ParamsAction::UnsetGlobal {
                path: "general:gaps_in".into(),
            })
            .unwrap();
        assert_eq!(unset.to_string(), "Unset general:gaps_in\n");
    }

    #[test]
    fn write_produces_conf_and_snapshot() {
        let tree = ThemeTree::new("nord").file("hyprland.conf", "general:gaps_in = 5\n");
        let service = service_with(MemoryStore::with(str_map([("general:gaps_in", "9")])), "0.45.0");
        let result = service
            .handle(&ParamsAction::Write {
                theme: tree.path().to_path_buf(),
            })
            .unwrap();
        assert!(matches!(result, ParamsResult::OverridesWritten { .. }));
        assert!(tree.path().join(".lastlayer-effective.json").is_file());
        assert!(tree.path().join("hyprland/.lastlayer-overrides.conf").is_file());
    }

    #[test]
    fn settings_template_to_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/settings.toml");
        let service = service_with(MemoryStore::new(), "0.45.0");
        let result = service
            .handle(&ParamsAction::SettingsTemplate {
                output: Some(out.clone()),
            })
            .unwrap();
        assert_eq!(result, ParamsResult::TemplateWritten { path: out.clone() });
        assert!(std::fs::read_to_string(out).unwrap().contains("comment_policy"));
    }

    #[test]
    fn applied_display_lists_skips_and_errors() {
        let display = ParamsResult::Applied(ApplyResult {
            success: false,
            migrated_files: vec![PathBuf::from("/t/hyprland.conf")],
            overrides_applied: 2,
            errors: vec!["boom".into()],
            skipped: vec!["made:up".into()],
        })
        .to_string();
        assert!(display.starts_with("Applied 2 override(s) to 1 file(s)\n"));
        assert!(display.contains("skipped made:up"));
        assert!(display.contains("error: boom"));
    }
}
