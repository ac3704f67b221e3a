//! Per-page render errors.

use thiserror::Error;

use crate::context::ContextError;
use crate::partials::PartialError;
use crate::render::EngineError;
use crate::settings::SettingsError;

/// Failure while transforming one page.
///
/// Every variant is fatal for that page only; the stage stays usable.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Partial(#[from] PartialError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("{page}: {source}")]
    Template {
        page: String,
        #[source]
        source: EngineError,
    },
}

impl StageError {
    /// Whether the error comes from the page's own template text.
    pub fn is_template(&self) -> bool {
        matches!(self, Self::Template { .. })
    }
}
