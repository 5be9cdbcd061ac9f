//! Hyprland parameter handling for theme managers: read a theme's config,
//! know what every parameter means, survive compositor upgrades, and write
//! the user's overrides back without wrecking hand-written files.
//!
//! ```ignore
//! let service = ParameterService::builder()
//!     .compositor_version("0.45.2")
//!     .build()?;
//! let result = service.apply_overrides_to_config(Path::new("~/themes/nord"));
//! ```
//!
//! # The pipeline
//!
//! ```text
//! config text ──parse──▶ {path → value} ──migrate──▶ originals
//!                                                       │
//!                   global store ─┐                     ▼
//!                   per-theme file ─▶ OverrideCollection (per-rice > global > original)
//!                                                       │
//!                                     applicable overrides (differs from original)
//!                                                       │
//!                             line-level patching + generated overrides config
//! ```
//!
//! - [`parser`]: a tolerant line parser for Hyprland's `section { key = value }`
//!   grammar. It never fails; lines it does not understand are kept as-is.
//! - [`schema`] and [`validate`]: the parameter catalog with types, ranges,
//!   options and popularity, plus per-type validation and formatting.
//! - [`migration`]: two static rule tables. Legacy rules rename or drop
//!   parameters that changed in past releases; future rules downgrade or drop
//!   parameters an older compositor does not have yet.
//! - [`overrides`]: the three-scope store with fixed precedence.
//! - [`ParameterService`]: ties it together and does the file I/O.
//!
//! # Writing back
//!
//! Config files are patched one line at a time, never regenerated. Only lines
//! the parser resolves to an overridden path change, whether written as
//! `general:gaps_in = 5` or nested inside `general { }`. A trailing
//! `# comment` survives by default ([`CommentPolicy::Preserve`]).
//!
//! Besides patching, each theme gets a machine-owned overrides config in its
//! `hyprland/` directory, sourced exactly once from its main config.
//!
//! # Collaborators
//!
//! Storage of global overrides ([`GlobalOverrideStore`]), theme enumeration
//! ([`ThemeRepository`]) and version detection ([`VersionProvider`]) are
//! traits, injected through the builder. Defaults come from
//! [`EngineSettings`], loaded from env over a TOML file over defaults.
//!
//! # Logging
//!
//! The library logs through `tracing` and never installs a subscriber. The
//! `lastlayer-params` binary (behind the `clap` feature, on by default)
//! installs one.
//!
//! # Error handling
//!
//! Expected failures do not escape batch operations: unparseable files read
//! as empty, and per-file write failures are collected in [`ApplyResult`].
//! Operations that act on a single thing return [`ParamsError`].

pub mod error;
pub mod file;
pub mod migration;
pub mod overrides;
pub mod parser;
pub mod persist;
pub mod schema;
pub mod service;
pub mod settings;
pub mod store;
pub mod types;
pub mod validate;
pub mod value;
pub mod version;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod ops;

#[cfg(test)]
mod fixtures;

pub use builder::ParameterServiceBuilder;
#[cfg(feature = "clap")]
pub use cli::{ParamsArgs, ParamsCommand};
pub use error::{ParamsError, ValidationError};
pub use file::DirectoryThemes;
pub use ops::ParamsResult;
pub use overrides::{OverrideCollection, OverrideSource};
pub use persist::CommentPolicy;
pub use schema::{Catalog, ParamType, Parameter};
pub use service::{ApplyResult, ParameterService, ThemeOutcome};
pub use settings::EngineSettings;
pub use store::{FallbackStore, MemoryStore, TomlSettingsStore};
pub use types::{GlobalOverrideStore, ParamsAction, Theme, ThemeRepository};
pub use value::{ParamMap, ParamValue};
pub use version::{CachedVersion, StaticProbe, Version, VersionProbe, VersionProvider};
