//! Per-page context resolution.
//!
//! A [`ContextStrategy`] turns the settings snapshot and the page path into
//! the value a page is rendered against. It is called at most once per render.
//!
//! Strategies:
//! - [`IdentityStrategy`]: settings as-is (used when none is configured)
//! - [`PageDataStrategy`]: settings deep-merged with a per-page overlay
//! - any `Fn(&SettingsSnapshot, &str) -> Result<Value, ContextError>`

mod merge;

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::settings::{SettingsError, SettingsSnapshot};

pub use merge::deep_merge;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("context for `{page}`: {message}")]
    Strategy { page: String, message: String },
}

impl ContextError {
    /// Error raised by a custom strategy.
    pub fn strategy(page: &str, message: impl Into<String>) -> Self {
        Self::Strategy {
            page: page.to_string(),
            message: message.into(),
        }
    }
}

/// Page-aware context resolution.
///
/// Implementations must not have side effects outside the returned value.
pub trait ContextStrategy: Send + Sync {
    fn resolve(&self, settings: &SettingsSnapshot, page: &str) -> Result<Value, ContextError>;
}

impl<F> ContextStrategy for F
where
    F: Fn(&SettingsSnapshot, &str) -> Result<Value, ContextError> + Send + Sync,
{
    fn resolve(&self, settings: &SettingsSnapshot, page: &str) -> Result<Value, ContextError> {
        self(settings, page)
    }
}

/// Settings value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStrategy;

impl ContextStrategy for IdentityStrategy {
    fn resolve(&self, settings: &SettingsSnapshot, _page: &str) -> Result<Value, ContextError> {
        Ok(settings.value()?.clone())
    }
}

/// Settings deep-merged with the overlay registered for the page path.
///
/// Pages without an overlay get the settings unchanged.
///
/// ```toml
/// [pages."/about.html"]
/// title = "About"
/// ```
#[derive(Debug, Clone, Default)]
pub struct PageDataStrategy {
    pages: BTreeMap<String, Value>,
}

impl PageDataStrategy {
    pub fn new(pages: BTreeMap<String, Value>) -> Self {
        Self { pages }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl ContextStrategy for PageDataStrategy {
    fn resolve(&self, settings: &SettingsSnapshot, page: &str) -> Result<Value, ContextError> {
        let mut context = settings.value()?.clone();
        if let Some(overlay) = self.pages.get(page) {
            deep_merge(&mut context, overlay);
        }
        Ok(context)
    }
}

/// Resolve the render context for `page`.
///
/// Without a strategy, the identity strategy applies.
pub fn resolve_context(
    strategy: Option<&dyn ContextStrategy>,
    settings: &SettingsSnapshot,
    page: &str,
) -> Result<Value, ContextError> {
    strategy
        .unwrap_or(&IdentityStrategy)
        .resolve(settings, page)
}
