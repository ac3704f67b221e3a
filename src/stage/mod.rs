//! The page transform stage.
//!
//! [`Stage`] owns the template engine, the partial identity set and the
//! settings loader for a whole session, and exposes the three host hooks:
//!
//! - [`Stage::config_resolved`]: the host's build root is known
//! - [`Stage::transform_page`]: render one page's HTML
//! - [`Stage::handle_hot_update`]: a watched file changed
//!
//! Per page, the flow is:
//!
//! ```text
//! partials (inline, then files) → settings → context → compile + render
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{DEFAULT_CACHE_DIR, PartialDirs, StageConfig};
use crate::context::{ContextStrategy, resolve_context};
use crate::debug;
use crate::error::StageError;
use crate::partials::{PartialSet, register_partials};
use crate::reload::{self, HotUpdate, ReloadSink};
use crate::render::Engine;
use crate::settings::SettingsLoader;
use crate::utils::path::{page_path, resolve_path};

/// Session state for rendering pages.
pub struct Stage {
    engine: Engine,
    partials: PartialSet,
    partial_dirs: PartialDirs,
    partial_extensions: Vec<String>,
    settings: SettingsLoader,
    strategy: Option<Arc<dyn ContextStrategy>>,
    hot_reload: bool,
    root: PathBuf,
    cache_dir: PathBuf,
    /// Cache directory was configured explicitly and does not follow the root.
    pinned_cache_dir: bool,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("engine", &self.engine)
            .field("partials", &self.partials.len())
            .field("partial_dirs", &self.partial_dirs)
            .field("settings", &self.settings)
            .field("hot_reload", &self.hot_reload)
            .field("root", &self.root)
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl Stage {
    /// Create a stage.
    ///
    /// The root-resolving helper is registered before user helpers. Relative
    /// settings and partial paths are resolved against the root.
    pub fn new(config: StageConfig) -> Self {
        let StageConfig {
            settings,
            partials,
            partial_extensions,
            hot_reload,
            compile,
            runtime,
            root,
            cache_dir,
            strategy,
            helpers,
        } = config;

        let root = match root {
            Some(root) => root,
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        let pinned_cache_dir = cache_dir.is_some();
        let cache_dir = match cache_dir {
            Some(dir) => resolve_path(&dir, &root),
            None => root.join(DEFAULT_CACHE_DIR),
        };

        let mut engine = Engine::new(&compile, &runtime, &root);
        engine.register_helpers(helpers);

        Self {
            engine,
            partials: PartialSet::new(),
            partial_dirs: partials.resolved(&root),
            partial_extensions,
            settings: SettingsLoader::new(resolve_path(&settings, &root), &cache_dir),
            strategy,
            hot_reload,
            root,
            cache_dir,
            pinned_cache_dir,
        }
    }

    /// Host hook: the build root is resolved.
    ///
    /// Rebinds `resolve-from-root` and, unless a cache directory was
    /// configured, moves the last-known-good settings under the new root.
    pub fn config_resolved(&mut self, root: &Path) {
        debug!("stage"; "root resolved: {}", root.display());
        self.root = root.to_path_buf();
        self.engine.set_root(root);
        if !self.pinned_cache_dir {
            self.cache_dir = root.join(DEFAULT_CACHE_DIR);
            self.settings.set_cache_dir(&self.cache_dir);
        }
    }

    /// Host hook: render one page.
    ///
    /// `page` is the page's output path; it is normalized to a leading `/`
    /// with forward slashes before the context strategy sees it.
    pub fn transform_page(&mut self, html: &str, page: &str) -> Result<String, StageError> {
        let page = page_path(Path::new(page));

        self.engine
            .register_inline_partials()
            .map_err(|source| StageError::Template {
                page: page.clone(),
                source,
            })?;

        if !self.partial_dirs.is_empty() {
            let count = register_partials(
                &self.partial_dirs,
                &self.partial_extensions,
                &mut self.engine,
                &mut self.partials,
            )?;
            debug!("partials"; "{} registered for {}", count, page);
        }

        let snapshot = self.settings.load()?;
        if snapshot.is_stale() {
            debug!("settings"; "{} is malformed, using last known good", self.settings.source().display());
        }

        let context = resolve_context(self.strategy.as_deref(), &snapshot, &page)?;

        self.engine
            .render_page(html, &context)
            .map_err(|source| StageError::Template { page, source })
    }

    /// Host hook: a watched file changed.
    ///
    /// Returns [`HotUpdate::FullReload`] after sending a reload message when
    /// `file` is a registered partial; the host should then skip its own
    /// handling of the event.
    pub fn handle_hot_update(&self, file: &Path, sink: &mut dyn ReloadSink) -> HotUpdate {
        reload::invalidate(self.hot_reload, &self.partials, file, sink)
    }

    /// Files registered as partials so far.
    pub fn partials(&self) -> &PartialSet {
        &self.partials
    }

    /// Settings document path.
    pub fn settings_path(&self) -> &Path {
        self.settings.source()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the last-known-good settings.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Configured partial directories, resolved against the root.
    pub fn partial_dirs(&self) -> &PartialDirs {
        &self.partial_dirs
    }
}
