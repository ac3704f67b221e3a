//! Template rendering.
//!
//! [`Engine`] wraps a `Handlebars` registry that lives for the whole session.
//! Helpers and partials registered on it are global; the page itself is
//! compiled on every call to [`Engine::render_page`] and never enters the
//! registry, so it cannot clash with a partial name.

mod helpers;

use std::collections::BTreeMap;
use std::path::Path;

use handlebars::{Handlebars, RenderError, TemplateError};
use serde_json::Value;
use thiserror::Error;

use crate::config::{CompileOptions, RuntimeOptions};
use crate::{debug, log};

pub use helpers::{BoxedHelper, RESOLVE_FROM_ROOT, ResolveFromRoot};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("template compile error: {0}")]
    Compile(#[from] TemplateError),

    #[error("template render error: {0}")]
    Render(#[from] RenderError),
}

/// Session-wide template engine.
pub struct Engine {
    registry: Handlebars<'static>,
    inline_partials: BTreeMap<String, String>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("inline_partials", &self.inline_partials.keys())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine with compile/runtime options applied and the
    /// root-resolving helper registered.
    pub fn new(compile: &CompileOptions, runtime: &RuntimeOptions, root: &Path) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(compile.strict);
        registry.set_prevent_indent(compile.prevent_indent);
        if compile.no_escape {
            registry.register_escape_fn(handlebars::no_escape);
        }
        registry.set_dev_mode(runtime.dev_mode);

        let mut engine = Self {
            registry,
            inline_partials: runtime.partials.clone(),
        };
        engine.set_root(root);
        engine
    }

    /// (Re)register the root-resolving helper for a new build root.
    pub fn set_root(&mut self, root: &Path) {
        self.registry
            .register_helper(RESOLVE_FROM_ROOT, Box::new(ResolveFromRoot::new(root)));
    }

    /// Register user helpers. Must run after the built-in helper.
    ///
    /// A helper named like the built-in is rejected so root resolution keeps
    /// working for templates that rely on it.
    pub fn register_helpers(&mut self, helpers: BTreeMap<String, BoxedHelper>) {
        for (name, helper) in helpers {
            if name == RESOLVE_FROM_ROOT {
                log!("warning"; "helper `{}` is built in, ignoring user helper", name);
                continue;
            }
            debug!("helpers"; "registered `{}`", name);
            self.registry.register_helper(&name, helper);
        }
    }

    /// Register (or overwrite) a partial from source text.
    pub fn register_partial(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.registry.register_partial(name, source)
    }

    /// Register the inline partials from runtime options.
    pub fn register_inline_partials(&mut self) -> Result<(), EngineError> {
        for (name, source) in &self.inline_partials {
            self.registry.register_partial(name, source)?;
        }
        Ok(())
    }

    pub fn has_partial(&self, name: &str) -> bool {
        self.registry.get_template(name).is_some()
    }

    /// Compile `html` and render it against `context`.
    ///
    /// The compiled template only lives for this call. Syntax errors in the
    /// page surface as [`EngineError::Render`] with a template-error reason.
    pub fn render_page(&mut self, html: &str, context: &Value) -> Result<String, EngineError> {
        Ok(self.registry.render_template(html, context)?)
    }
}

#[cfg(test)]
mod tests;
