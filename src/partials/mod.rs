//! Partial template discovery and registration.
//!
//! Runs at the start of every page render, so partial files added while the
//! session is running are picked up without a restart:
//!
//! ```text
//! partials/
//! ├── header.hbs        → "header"
//! └── nav/
//!     └── item.hbs      → "nav/item"
//! ```
//!
//! Hidden files and directories are walked too. Two files in the same root
//! that map to one name (`card.hbs` and `card.html`) are a configuration
//! error; across roots the later root wins.
//!
//! Every registered file's canonical path is recorded in the [`PartialSet`],
//! which the hot-reload invalidator consults on file changes.

mod set;

use std::fs;
use std::path::{Path, PathBuf};

use handlebars::TemplateError;
use jwalk::WalkDir;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::config::PartialDirs;
use crate::debug;
use crate::render::Engine;
use crate::utils::path::{normalize_path, slash_join};

pub use set::PartialSet;

/// Extensions registered as partials when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["hbs", "handlebars", "html"];

#[derive(Debug, Error)]
pub enum PartialError {
    /// Configured partial directory is missing or not a directory.
    #[error("partial directory `{0}` does not exist or is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read partial `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to walk partial directory `{0}`")]
    Walk(PathBuf, #[source] jwalk::Error),

    /// Two files under one root map to the same partial name.
    #[error("partial `{name}` is defined by both `{first}` and `{second}`")]
    NameCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("partial `{name}` ({path}) has a syntax error: {source}")]
    Syntax {
        name: String,
        path: PathBuf,
        #[source]
        source: TemplateError,
    },
}

/// A partial file found under a directory root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialFile {
    /// Registered name (relative path, extension stripped).
    pub name: String,
    /// Path as discovered.
    pub path: PathBuf,
}

/// Derive the registered name from a path relative to its directory root.
///
/// `nav/item.hbs` → `nav/item`. Only the last extension is stripped, so
/// `card.en.hbs` becomes `card.en`.
pub fn partial_name(rel: &Path) -> String {
    slash_join(&rel.with_extension(""))
}

/// Find partial files under `dir`, sorted by path.
///
/// Fails if the walk hits an unreadable entry or two files share a name.
pub fn discover(dir: &Path, extensions: &[String]) -> Result<Vec<PartialFile>, PartialError> {
    if !dir.is_dir() {
        return Err(PartialError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).skip_hidden(false) {
        let entry = entry.map_err(|err| PartialError::Walk(dir.to_path_buf(), err))?;
        let path = entry.path();
        if entry.file_type().is_file() && has_partial_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort();

    let mut seen: FxHashMap<String, PathBuf> = FxHashMap::default();
    let mut partials = Vec::with_capacity(files.len());
    for path in files {
        let rel = path.strip_prefix(dir).unwrap_or(&path);
        let name = partial_name(rel);
        if let Some(first) = seen.insert(name.clone(), path.clone()) {
            return Err(PartialError::NameCollision {
                name,
                first,
                second: path,
            });
        }
        partials.push(PartialFile { name, path });
    }
    Ok(partials)
}

fn has_partial_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    if extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
    } else {
        extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Discover and register every partial under `dirs`.
///
/// Registration overwrites by name, so calling this again with changed files
/// updates the engine in place. Returns the number of partials registered.
pub fn register_partials(
    dirs: &PartialDirs,
    extensions: &[String],
    engine: &mut Engine,
    set: &mut PartialSet,
) -> Result<usize, PartialError> {
    let mut owners: FxHashMap<String, PathBuf> = FxHashMap::default();
    let mut count = 0;

    for dir in dirs.iter() {
        for file in discover(dir, extensions)? {
            let source =
                fs::read_to_string(&file.path).map_err(|err| PartialError::Read(file.path.clone(), err))?;

            engine
                .register_partial(&file.name, &source)
                .map_err(|source| PartialError::Syntax {
                    name: file.name.clone(),
                    path: file.path.clone(),
                    source,
                })?;

            let canonical = normalize_path(&file.path);
            if let Some(previous) = owners.insert(file.name.clone(), canonical.clone()) {
                debug!("partials"; "`{}` from {} shadows {}",
                    file.name, canonical.display(), previous.display());
            }
            set.insert(canonical);
            count += 1;
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests;
