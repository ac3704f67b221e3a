//! Stage configuration.
//!
//! A [`StageConfig`] is built either in code or from a `pagebars.toml` file:
//!
//! ```toml
//! settings = "settings.json"       # required
//! partials = ["partials"]          # string or array
//! partial_extensions = ["hbs"]     # default: hbs, handlebars, html
//! hot_reload = true
//! root = "."                       # default: directory of this file
//! cache_dir = ".pagebars"          # last-known-good settings live here
//!
//! [compile]
//! strict = false
//!
//! [runtime.partials]
//! footer = "<footer>{{year}}</footer>"
//!
//! [pages."/about.html"]
//! title = "About"
//!
//! [build]
//! pages = "pages"
//! output = "dist"
//! ```
//!
//! Relative paths in the file are resolved against the file's directory.

mod error;
mod options;
mod util;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{ContextStrategy, PageDataStrategy};
use crate::log;
use crate::render::BoxedHelper;
use crate::utils::path::resolve_path;

pub use error::ConfigError;
pub use options::{CompileOptions, PartialDirs, RuntimeOptions};
pub use util::find_config_file;

/// Default config file name, searched upward from the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "pagebars.toml";

/// Directory for cached state, relative to the root.
pub const DEFAULT_CACHE_DIR: &str = ".pagebars";

// ============================================================================
// Programmatic configuration
// ============================================================================

/// Stage configuration. Immutable once handed to a [`Stage`](crate::Stage).
pub struct StageConfig {
    /// Settings document (JSON or TOML, by extension).
    pub settings: PathBuf,
    /// Directories scanned for partials before each render.
    pub partials: PartialDirs,
    /// File extensions treated as partials. Empty means the defaults.
    pub partial_extensions: Vec<String>,
    /// Force a full reload when a registered partial changes.
    pub hot_reload: bool,
    pub compile: CompileOptions,
    pub runtime: RuntimeOptions,
    /// Build root. Defaults to the working directory.
    pub root: Option<PathBuf>,
    /// Cache directory. Defaults to `<root>/.pagebars`.
    pub cache_dir: Option<PathBuf>,
    /// Context strategy. `None` renders against the settings as-is.
    pub strategy: Option<Arc<dyn ContextStrategy>>,
    /// User helpers, registered after the built-in ones.
    pub helpers: BTreeMap<String, BoxedHelper>,
}

impl std::fmt::Debug for StageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageConfig")
            .field("settings", &self.settings)
            .field("partials", &self.partials)
            .field("partial_extensions", &self.partial_extensions)
            .field("hot_reload", &self.hot_reload)
            .field("compile", &self.compile)
            .field("runtime", &self.runtime)
            .field("root", &self.root)
            .field("cache_dir", &self.cache_dir)
            .field("strategy", &self.strategy.is_some())
            .field("helpers", &self.helpers.keys())
            .finish()
    }
}

impl StageConfig {
    pub fn new(settings: impl Into<PathBuf>) -> Self {
        Self {
            settings: settings.into(),
            partials: PartialDirs::default(),
            partial_extensions: Vec::new(),
            hot_reload: true,
            compile: CompileOptions::default(),
            runtime: RuntimeOptions::default(),
            root: None,
            cache_dir: None,
            strategy: None,
            helpers: BTreeMap::new(),
        }
    }

    pub fn with_partials(mut self, partials: impl Into<PartialDirs>) -> Self {
        self.partials = partials.into();
        self
    }

    pub fn with_partial_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partial_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.hot_reload = enabled;
        self
    }

    pub fn with_compile(mut self, compile: CompileOptions) -> Self {
        self.compile = compile;
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeOptions) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_strategy(mut self, strategy: impl ContextStrategy + 'static) -> Self {
        self.strategy = Some(Arc::new(strategy));
        self
    }

    pub fn with_helper(mut self, name: impl Into<String>, helper: BoxedHelper) -> Self {
        self.helpers.insert(name.into(), helper);
        self
    }
}

// ============================================================================
// File configuration
// ============================================================================

/// `[build]` section, used by the command-line host only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Directory containing the `*.html` pages to render.
    pub pages: PathBuf,
    /// Directory rendered pages are written to.
    pub output: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            pages: "pages".into(),
            output: "dist".into(),
        }
    }
}

/// Contents of `pagebars.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub settings: Option<PathBuf>,
    pub partials: PartialDirs,
    pub partial_extensions: Vec<String>,
    pub hot_reload: bool,
    pub root: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub compile: CompileOptions,
    pub runtime: RuntimeOptions,
    /// Per-page data merged over the settings, keyed by page path.
    pub pages: BTreeMap<String, Value>,
    pub build: BuildSection,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            settings: None,
            partials: PartialDirs::default(),
            partial_extensions: Vec::new(),
            hot_reload: true,
            root: None,
            cache_dir: None,
            compile: CompileOptions::default(),
            runtime: RuntimeOptions::default(),
            pages: BTreeMap::new(),
            build: BuildSection::default(),
        }
    }
}

impl FileConfig {
    /// Parse configuration from TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file, warning about unknown fields.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.is_none() {
            return Err(ConfigError::Validation("`settings` must be set".into()));
        }
        if let Some(key) = self.pages.keys().find(|k| !k.starts_with('/')) {
            return Err(ConfigError::Validation(format!(
                "page key `{key}` must start with `/`"
            )));
        }
        if let Some((key, _)) = self.pages.iter().find(|(_, v)| !v.is_object()) {
            return Err(ConfigError::Validation(format!(
                "`[pages.\"{key}\"]` must be a table"
            )));
        }
        Ok(())
    }

    /// Root directory, with relative paths resolved against `base`.
    pub fn root_dir(&self, base: &Path) -> PathBuf {
        match &self.root {
            Some(root) => resolve_path(root, base),
            None => base.to_path_buf(),
        }
    }

    /// Pages input directory under the root.
    pub fn pages_dir(&self, base: &Path) -> PathBuf {
        resolve_path(&self.build.pages, &self.root_dir(base))
    }

    /// Output directory under the root.
    pub fn output_dir(&self, base: &Path) -> PathBuf {
        resolve_path(&self.build.output, &self.root_dir(base))
    }

    /// Build a [`StageConfig`] with paths resolved against `base`
    /// (normally the config file's directory).
    pub fn to_stage_config(&self, base: &Path) -> Result<StageConfig, ConfigError> {
        self.validate()?;
        let root = self.root_dir(base);
        let settings = self
            .settings
            .as_deref()
            .map(|s| resolve_path(s, &root))
            .ok_or_else(|| ConfigError::Validation("`settings` must be set".into()))?;

        let mut config = StageConfig::new(settings)
            .with_partials(self.partials.resolved(&root))
            .with_partial_extensions(self.partial_extensions.iter().cloned())
            .with_hot_reload(self.hot_reload)
            .with_compile(self.compile.clone())
            .with_runtime(self.runtime.clone())
            .with_root(&root);

        if let Some(cache_dir) = &self.cache_dir {
            config = config.with_cache_dir(resolve_path(cache_dir, &root));
        }
        if !self.pages.is_empty() {
            config = config.with_strategy(PageDataStrategy::new(self.pages.clone()));
        }
        Ok(config)
    }
}

/// Parse a config snippet, asserting there are no unknown fields.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> FileConfig {
    let config = format!("settings = \"settings.json\"\n{extra}");
    let (parsed, ignored) = FileConfig::parse_with_ignored(&config).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(FileConfig::from_str("[compile\nstrict = true").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.settings, Some(PathBuf::from("settings.json")));
        assert!(config.hot_reload);
        assert!(config.partials.is_empty());
        assert!(config.partial_extensions.is_empty());
        assert_eq!(config.build, BuildSection::default());
    }

    #[test]
    fn test_full_config() {
        let config = test_parse_config(
            r#"
partials = ["partials", "layouts"]
partial_extensions = ["hbs"]
hot_reload = false
cache_dir = "tmp"

[compile]
strict = true

[runtime.partials]
footer = "<footer/>"

[pages."/about.html"]
title = "About"

[build]
pages = "src"
output = "public"
"#,
        );

        assert_eq!(
            config.partials,
            PartialDirs::Many(vec!["partials".into(), "layouts".into()])
        );
        assert!(!config.hot_reload);
        assert!(config.compile.strict);
        assert_eq!(config.runtime.partials["footer"], "<footer/>");
        assert_eq!(config.pages["/about.html"], json!({"title": "About"}));
        assert_eq!(config.build.output, PathBuf::from("public"));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) =
            FileConfig::parse_with_ignored("settings = \"s.json\"\nbogus = 1\n[compile]\nfoo = true")
                .unwrap();
        assert_eq!(ignored.len(), 2);
        assert!(ignored.contains(&"bogus".to_string()));
        assert!(ignored.contains(&"compile.foo".to_string()));
    }

    #[test]
    fn test_validate_requires_settings() {
        let config = FileConfig::from_str("hot_reload = true").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_page_keys() {
        let config = test_parse_config("[pages.\"about.html\"]\ntitle = \"x\"");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_stage_config_resolves_paths() {
        let config = test_parse_config("partials = \"partials\"\n[pages.\"/a.html\"]\nx = 1");
        let stage = config.to_stage_config(Path::new("/site")).unwrap();

        assert_eq!(stage.settings, PathBuf::from("/site/settings.json"));
        assert_eq!(stage.partials, PartialDirs::One("/site/partials".into()));
        assert_eq!(stage.root, Some(PathBuf::from("/site")));
        assert!(stage.cache_dir.is_none());
        assert!(stage.strategy.is_some());
    }

    #[test]
    fn test_root_override() {
        let config = test_parse_config("root = \"web\"\ncache_dir = \"cache\"");
        let stage = config.to_stage_config(Path::new("/site")).unwrap();

        assert_eq!(stage.root, Some(PathBuf::from("/site/web")));
        assert_eq!(stage.settings, PathBuf::from("/site/web/settings.json"));
        assert_eq!(stage.cache_dir, Some(PathBuf::from("/site/web/cache")));
        assert_eq!(config.output_dir(Path::new("/site")), PathBuf::from("/site/web/dist"));
    }

    #[test]
    fn test_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_NAME);
        fs::write(&path, "settings = \"settings.toml\"\nextra = 1").unwrap();

        let config = FileConfig::from_path(&path).unwrap();
        assert_eq!(config.settings, Some(PathBuf::from("settings.toml")));
    }

    #[test]
    fn test_from_path_missing() {
        let temp = TempDir::new().unwrap();
        let err = FileConfig::from_path(&temp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_builder() {
        let config = StageConfig::new("s.json")
            .with_partials(PathBuf::from("partials"))
            .with_hot_reload(false)
            .with_partial_extensions(["hbs"]);

        assert_eq!(config.partials, PartialDirs::One("partials".into()));
        assert!(!config.hot_reload);
        assert_eq!(config.partial_extensions, vec!["hbs".to_string()]);
        assert!(format!("{config:?}").contains("s.json"));
    }
}
