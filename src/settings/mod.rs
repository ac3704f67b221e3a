//! Settings loading with last-known-good fallback.
//!
//! The settings document is read and parsed on every page render. Settings
//! files are edited live and are often invalid for a moment (a missing
//! comma mid-edit), so a parse failure does not fail the render:
//!
//! ```text
//! read (must succeed) ─► parse ─┬─ ok  ─► Fresh(value) ─► persist last-known-good
//!                               └─ err ─► Stale(fallback)   (resolved on first read)
//! ```
//!
//! The fallback is only read from disk when the context resolver actually
//! asks for the settings value.

mod fallback;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

pub use fallback::{Fallback, LastKnownGood};

// ============================================================================
// Errors
// ============================================================================

/// Settings document could not be parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Errors surfaced while loading or resolving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings document itself could not be read. Fatal for the render.
    #[error("failed to read settings `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    /// Settings were malformed and no last-known-good copy exists yet.
    #[error("settings are malformed and no last-known-good copy exists at `{0}`")]
    NoFallback(PathBuf),

    /// The last-known-good copy exists but cannot be read or parsed.
    #[error("last-known-good settings at `{0}` are unusable")]
    InvalidFallback(PathBuf, #[source] Box<dyn std::error::Error + Send + Sync>),
}

// ============================================================================
// Format
// ============================================================================

/// Structured-data format of a settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsFormat {
    #[default]
    Json,
    Toml,
}

impl SettingsFormat {
    /// Pick a format from the file extension. Unknown extensions parse as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    /// Parse `text` into a generic value tree.
    pub fn parse(self, text: &str) -> Result<Value, ParseError> {
        match self {
            Self::Json => Ok(serde_json::from_str(text)?),
            Self::Toml => Ok(toml::from_str(text)?),
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Settings as seen by one page render.
#[derive(Debug)]
pub enum SettingsSnapshot {
    /// Parsed from the current document.
    Fresh(Value),
    /// Current document is malformed; deferred last-known-good copy.
    Stale(Fallback),
}

impl SettingsSnapshot {
    /// Settings value, resolving the fallback on first access.
    pub fn value(&self) -> Result<&Value, SettingsError> {
        match self {
            Self::Fresh(value) => Ok(value),
            Self::Stale(fallback) => fallback.resolve(),
        }
    }

    /// Whether this snapshot came from the fallback.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

impl From<Value> for SettingsSnapshot {
    fn from(value: Value) -> Self {
        Self::Fresh(value)
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Loads the settings document once per render.
#[derive(Debug)]
pub struct SettingsLoader {
    source: PathBuf,
    format: SettingsFormat,
    last_known_good: LastKnownGood,
}

impl SettingsLoader {
    /// Create a loader for `source`, keeping last-known-good copies in `cache_dir`.
    pub fn new(source: impl Into<PathBuf>, cache_dir: &Path) -> Self {
        let source = source.into();
        let format = SettingsFormat::from_path(&source);
        Self {
            last_known_good: LastKnownGood::new(cache_dir, format),
            source,
            format,
        }
    }

    /// Path of the settings document.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Path of the last-known-good artifact.
    pub fn fallback_path(&self) -> &Path {
        self.last_known_good.path()
    }

    /// Move the last-known-good artifact to a new cache directory.
    pub fn set_cache_dir(&mut self, cache_dir: &Path) {
        self.last_known_good = LastKnownGood::new(cache_dir, self.format);
    }

    /// Read and parse the settings document.
    ///
    /// A read failure is returned as an error. A parse failure is not: the
    /// snapshot becomes a deferred reference to the last-known-good copy.
    pub fn load(&mut self) -> Result<SettingsSnapshot, SettingsError> {
        let text = fs::read_to_string(&self.source)
            .map_err(|err| SettingsError::Read(self.source.clone(), err))?;

        match self.format.parse(&text) {
            Ok(value) => {
                self.last_known_good.remember(&text);
                Ok(SettingsSnapshot::Fresh(value))
            }
            Err(_) => Ok(SettingsSnapshot::Stale(self.last_known_good.deferred())),
        }
    }
}
