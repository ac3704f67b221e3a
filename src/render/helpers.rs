//! Built-in helpers.

use std::path::{Path, PathBuf};

use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, RenderErrorReason,
    ScopedJson,
};
use serde_json::Value;

use crate::utils::path::resolve_path;

/// Name of the root-resolving helper. Reserved: user helpers cannot take it.
pub const RESOLVE_FROM_ROOT: &str = "resolve-from-root";

/// A user-supplied helper, registered once for the whole session.
pub type BoxedHelper = Box<dyn HelperDef + Send + Sync + 'static>;

/// `{{resolve-from-root "assets/logo.svg"}}` -> `/abs/root/assets/logo.svg`
///
/// Resolution is lexical: the target does not need to exist.
#[derive(Debug, Clone)]
pub struct ResolveFromRoot {
    root: PathBuf,
}

impl ResolveFromRoot {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> String {
        resolve_path(Path::new(path), &self.root)
            .to_string_lossy()
            .into_owned()
    }
}

impl HelperDef for ResolveFromRoot {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let param = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(RESOLVE_FROM_ROOT, 0))?;
        let path = param
            .value()
            .as_str()
            .ok_or(RenderErrorReason::InvalidParamType("string"))?;

        Ok(ScopedJson::Derived(Value::String(self.resolve(path))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry(root: &str) -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_helper(RESOLVE_FROM_ROOT, Box::new(ResolveFromRoot::new(Path::new(root))));
        hbs
    }

    #[test]
    fn test_resolve_relative() {
        let out = registry("/site")
            .render_template(r#"{{resolve-from-root "img/a.png"}}"#, &json!({}))
            .unwrap();
        assert_eq!(out, "/site/img/a.png");
    }

    #[test]
    fn test_resolve_from_context_value() {
        let out = registry("/site")
            .render_template("{{resolve-from-root file}}", &json!({"file": "../up.css"}))
            .unwrap();
        assert_eq!(out, "/up.css");
    }

    #[test]
    fn test_resolve_as_subexpression() {
        let out = registry("/site")
            .render_template(
                r#"{{#with (resolve-from-root "x.txt")}}[{{this}}]{{/with}}"#,
                &json!({}),
            )
            .unwrap();
        assert_eq!(out, "[/site/x.txt]");
    }

    #[test]
    fn test_missing_param_is_error() {
        let err = registry("/site")
            .render_template("{{resolve-from-root}}", &json!({}))
            .unwrap_err();
        assert!(err.to_string().contains(RESOLVE_FROM_ROOT));
    }
}
