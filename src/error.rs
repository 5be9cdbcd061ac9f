use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to edit {path}: {source}")]
    TomlEdit {
        path: PathBuf,
        source: toml_edit::TomlError,
    },

    #[error("Settings error: {0}")]
    Settings(#[from] confique::Error),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("No themes root configured; set `themes_root` or LASTLAYER_THEMES_DIR")]
    NoThemesRoot,

    #[error("{path} is not a theme (no hyprland.conf or hyprland/ directory)")]
    NotATheme { path: PathBuf },
}

impl ParamsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ParamsError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a raw value was rejected by a parameter's type rules.
///
/// The `Display` text is meant to be shown to users as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Value {value} is not a valid number")]
    NotANumber { value: String },

    #[error("Value {value} is below minimum {min}")]
    BelowMinimum { value: String, min: f64 },

    #[error("Value {value} is above maximum {max}")]
    AboveMaximum { value: String, max: f64 },

    #[error("Value {value} is not one of: {}", options.join(", "))]
    NotAnOption { value: String, options: Vec<String> },

    #[error("Value {value} is not a boolean (use true/false, yes/no, on/off, 1/0)")]
    NotABool { value: String },

    #[error("Value {value} is not a valid color")]
    NotAColor { value: String },

    #[error("Value {value} is not a valid gradient")]
    NotAGradient { value: String },

    #[error("Value {value} must be two numbers separated by a space")]
    NotAVec2 { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_minimum_formats_like_the_ui_expects() {
        let err = ValidationError::BelowMinimum {
            value: "-5".into(),
            min: 0.0,
        };
        assert_eq!(err.to_string(), "Value -5 is below minimum 0");
    }

    #[test]
    fn fractional_bounds_keep_their_decimals() {
        let err = ValidationError::AboveMaximum {
            value: "1.5".into(),
            max: 1.0,
        };
        assert_eq!(err.to_string(), "Value 1.5 is above maximum 1");
        let err = ValidationError::BelowMinimum {
            value: "0.1".into(),
            min: 0.25,
        };
        assert!(err.to_string().ends_with("0.25"));
    }

    #[test]
    fn not_an_option_lists_choices() {
        let err = ValidationError::NotAnOption {
            value: "spiral".into(),
            options: vec!["dwindle".into(), "master".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("spiral"));
        assert!(msg.contains("dwindle, master"));
    }

    #[test]
    fn io_error_mentions_path() {
        let err = ParamsError::io(
            "/themes/nord/hyprland.conf",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("hyprland.conf"));
    }

    #[test]
    fn no_themes_root_names_the_setting() {
        assert!(ParamsError::NoThemesRoot.to_string().contains("themes_root"));
    }

    #[test]
    fn not_a_theme_names_the_path() {
        let err = ParamsError::NotATheme {
            path: "/themes/nrod".into(),
        };
        assert!(err.to_string().starts_with("/themes/nrod is not a theme"));
    }
}
