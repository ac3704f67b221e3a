//! pagebars - Handlebars rendering stage for HTML pages.
//!
//! Each page is rendered as a Handlebars template against a context built
//! from a user-edited settings document. Partials are discovered from disk
//! before every render, and edits to them trigger a full client reload.
//!
//! ```no_run
//! use pagebars::{Stage, StageConfig};
//! use std::path::PathBuf;
//!
//! let mut stage = Stage::new(
//!     StageConfig::new("settings.json").with_partials(PathBuf::from("partials")),
//! );
//! let html = stage.transform_page("<h1>{{title}}</h1>", "/index.html")?;
//! # Ok::<(), pagebars::StageError>(())
//! ```

pub mod logger;

pub mod config;
pub mod context;
pub mod error;
pub mod partials;
pub mod reload;
pub mod render;
pub mod settings;
pub mod stage;
pub mod utils;

pub use config::{CompileOptions, ConfigError, FileConfig, PartialDirs, RuntimeOptions, StageConfig};
pub use context::{ContextError, ContextStrategy, PageDataStrategy};
pub use error::StageError;
pub use reload::{HotUpdate, ReloadMessage, ReloadSink};
pub use render::{BoxedHelper, RESOLVE_FROM_ROOT};
pub use settings::{SettingsError, SettingsSnapshot};
pub use stage::Stage;
