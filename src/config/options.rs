//! Option groups shared by the file config and the programmatic config.
//!
//! # Example
//!
//! ```toml
//! partials = ["partials", "layouts"]   # or a single string
//!
//! [compile]
//! strict = true            # missing fields are render errors
//! no_escape = false        # keep HTML escaping for {{value}}
//! prevent_indent = false   # indent standalone partial output
//!
//! [runtime]
//! dev_mode = false
//!
//! [runtime.partials]
//! copyright = "&copy; {{year}} {{author}}"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ============================================================================
// Partial Directories
// ============================================================================

/// One partial directory or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartialDirs {
    /// Single directory path.
    One(PathBuf),
    /// Several directory paths, registered in order.
    Many(Vec<PathBuf>),
}

impl Default for PartialDirs {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl PartialDirs {
    /// Iterate configured directories in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        let slice: &[PathBuf] = match self {
            Self::One(dir) => std::slice::from_ref(dir),
            Self::Many(dirs) => dirs,
        };
        slice.iter().map(PathBuf::as_path)
    }

    /// No directory configured: partial discovery is skipped.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(dirs) => dirs.is_empty(),
        }
    }

    /// Rebase relative entries onto `base`.
    pub fn resolved(&self, base: &Path) -> Self {
        let rebase = |p: &Path| crate::utils::path::resolve_path(p, base);
        match self {
            Self::One(dir) => Self::One(rebase(dir.as_path())),
            Self::Many(dirs) => Self::Many(dirs.iter().map(|d| rebase(d.as_path())).collect()),
        }
    }
}

impl From<PathBuf> for PartialDirs {
    fn from(dir: PathBuf) -> Self {
        Self::One(dir)
    }
}

impl From<&Path> for PartialDirs {
    fn from(dir: &Path) -> Self {
        Self::One(dir.to_path_buf())
    }
}

impl From<Vec<PathBuf>> for PartialDirs {
    fn from(dirs: Vec<PathBuf>) -> Self {
        Self::Many(dirs)
    }
}

// ============================================================================
// Compile / Runtime Options
// ============================================================================

/// Compile-time options applied to the engine registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Missing fields and helpers are errors instead of empty output.
    pub strict: bool,
    /// Emit `{{value}}` without HTML escaping.
    pub no_escape: bool,
    /// Do not indent the output of standalone partials.
    pub prevent_indent: bool,
}

/// Render-time options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Inline partials (name -> template source) available to every page.
    ///
    /// Registered before file partials on each render, so a file partial
    /// with the same name wins.
    pub partials: BTreeMap<String, String>,
    /// Engine dev mode.
    pub dev_mode: bool,
}
