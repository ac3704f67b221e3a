//! Last-known-good settings artifact.
//!
//! Every successfully parsed settings text is written to the cache directory.
//! When the live document is malformed, a [`Fallback`] points at that
//! artifact and reads it on first access only.

use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{SettingsError, SettingsFormat};
use crate::debug;
use crate::utils::hash;

/// Owner of the last-known-good artifact path.
#[derive(Debug)]
pub struct LastKnownGood {
    path: PathBuf,
    format: SettingsFormat,
    /// Hash of the text most recently written by this process.
    written: Option<u64>,
}

impl LastKnownGood {
    pub fn new(cache_dir: &Path, format: SettingsFormat) -> Self {
        Self {
            path: cache_dir.join(format!("settings.{}", format.extension())),
            format,
            written: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a valid settings text, skipping the write when unchanged.
    ///
    /// Write failures only cost the fallback, never the render, so they are
    /// logged and dropped.
    pub fn remember(&mut self, text: &str) {
        let digest = hash::compute(text);
        if self.written == Some(digest) {
            return;
        }

        let result = self
            .path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(&self.path, text));

        match result {
            Ok(()) => self.written = Some(digest),
            Err(err) => {
                debug!("settings"; "failed to write {}: {}", self.path.display(), err);
            }
        }
    }

    /// Deferred reference to the artifact as it is on disk when first read.
    pub fn deferred(&self) -> Fallback {
        Fallback {
            path: self.path.clone(),
            format: self.format,
            value: OnceCell::new(),
        }
    }
}

/// Lazily-resolved last-known-good settings value.
#[derive(Debug)]
pub struct Fallback {
    path: PathBuf,
    format: SettingsFormat,
    value: OnceCell<Value>,
}

impl Fallback {
    /// Path of the artifact this fallback reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the artifact has been read yet.
    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }

    /// Read and parse the artifact on first call; later calls reuse it.
    pub fn resolve(&self) -> Result<&Value, SettingsError> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SettingsError::NoFallback(self.path.clone()));
            }
            Err(err) => {
                return Err(SettingsError::InvalidFallback(
                    self.path.clone(),
                    Box::new(err),
                ));
            }
        };

        let value = self
            .format
            .parse(&text)
            .map_err(|err| SettingsError::InvalidFallback(self.path.clone(), Box::new(err)))?;

        Ok(self.value.get_or_init(|| value))
    }
}
