//! Clap adapter.
//!
//! Compiled only with the `clap` feature (on by default). [`ParamsArgs`] can
//! be embedded into any clap derive; [`ParamsArgs::into_action`] is the only
//! bridge to the core, which works on [`ParamsAction`](crate::ParamsAction)
//! and never sees clap types.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::types::ParamsAction;

/// Clap-derived args for the parameter commands.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     params: ParamsArgs,
/// }
/// ```
#[derive(Debug, Args)]
pub struct ParamsArgs {
    #[command(subcommand)]
    pub command: ParamsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ParamsCommand {
    /// Parse a Hyprland config file and print every resolved parameter.
    Parse {
        file: PathBuf,
    },
    /// Check a value against the parameter catalog.
    Validate {
        /// Parameter path, e.g. "general:gaps_in".
        path: String,
        value: String,
    },
    /// Show a theme's parameters migrated to a compositor version.
    Migrate {
        /// Theme directory.
        theme: PathBuf,
        /// Version to migrate to (default: the detected version).
        #[arg(long = "target-version")]
        target_version: Option<String>,
    },
    /// Show every parameter of a theme with the scope its value comes from.
    Merged {
        theme: PathBuf,
    },
    /// Rewrite a theme's config files in place with the active overrides.
    Apply {
        theme: PathBuf,
    },
    /// Regenerate a theme's overrides config and effective snapshot.
    Write {
        theme: PathBuf,
    },
    /// List themes under the configured themes root.
    Themes,
    /// Set a global override.
    SetGlobal {
        path: String,
        value: String,
    },
    /// Remove a global override.
    UnsetGlobal {
        path: String,
    },
    /// Print a commented settings template.
    SettingsTemplate {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl ParamsArgs {
    /// Convert clap-parsed args into a framework-agnostic `ParamsAction`.
    pub fn into_action(self) -> ParamsAction {
        match self.command {
            ParamsCommand::Parse { file } => ParamsAction::Parse { file },
            ParamsCommand::Validate { path, value } => ParamsAction::Validate { path, value },
            ParamsCommand::Migrate {
                theme,
                target_version,
            } => ParamsAction::Migrate {
                theme,
                target: target_version,
            },
            ParamsCommand::Merged { theme } => ParamsAction::Merged { theme },
            ParamsCommand::Apply { theme } => ParamsAction::Apply { theme },
            ParamsCommand::Write { theme } => ParamsAction::Write { theme },
            ParamsCommand::Themes => ParamsAction::Themes,
            ParamsCommand::SetGlobal { path, value } => ParamsAction::SetGlobal { path, value },
            ParamsCommand::UnsetGlobal { path } => ParamsAction::UnsetGlobal { path },
            ParamsCommand::SettingsTemplate { output } => ParamsAction::SettingsTemplate { output },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        params: ParamsArgs,
    }

    fn parse(args: &[&str]) -> ParamsAction {
        TestCli::try_parse_from(args).unwrap().params.into_action()
    }

    #[test]
    fn parse_takes_a_file() {
        assert_eq!(
            parse(&["app", "parse", "/t/hyprland.conf"]),
            ParamsAction::Parse {
                file: PathBuf::from("/t/hyprland.conf")
            }
        );
    }

    #[test]
    fn migrate_target_version_is_optional() {
        assert_eq!(
            parse(&["app", "migrate", "/t/nord"]),
            ParamsAction::Migrate {
                theme: PathBuf::from("/t/nord"),
                target: None
            }
        );
        assert_eq!(
            parse(&["app", "migrate", "/t/nord", "--target-version", "0.41.0"]),
            ParamsAction::Migrate {
                theme: PathBuf::from("/t/nord"),
                target: Some("0.41.0".into())
            }
        );
    }

    #[test]
    fn kebab_case_subcommands() {
        assert_eq!(
            parse(&["app", "set-global", "general:gaps_in", "8"]),
            ParamsAction::SetGlobal {
                path: "general:gaps_in".into(),
                value: "8".into()
            }
        );
        assert_eq!(
            parse(&["app", "unset-global", "general:gaps_in"]),
            ParamsAction::UnsetGlobal {
                path: "general:gaps_in".into()
            }
        );
        assert_eq!(
            parse(&["app", "settings-template", "-o", "/tmp/s.toml"]),
            ParamsAction::SettingsTemplate {
                output: Some(PathBuf::from("/tmp/s.toml"))
            }
        );
    }

    #[test]
    fn validate_requires_a_value() {
        assert!(TestCli::try_parse_from(["app", "validate", "general:gaps_in"]).is_err());
    }

    #[test]
    fn themes_has_no_arguments() {
        assert_eq!(parse(&["app", "themes"]), ParamsAction::Themes);
    }
}
