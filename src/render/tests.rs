use std::collections::BTreeMap;
use std::path::Path;

use handlebars::{RenderErrorReason, handlebars_helper};
use serde_json::json;

use super::*;

handlebars_helper!(shout: |s: String| s.to_uppercase());
handlebars_helper!(fake_root: |_s: String| "hijacked".to_string());

fn engine() -> Engine {
    Engine::new(
        &CompileOptions::default(),
        &RuntimeOptions::default(),
        Path::new("/site"),
    )
}

#[test]
fn test_render_title() {
    let out = engine()
        .render_page("<h1>{{title}}</h1>", &json!({"title": "Home"}))
        .unwrap();
    assert_eq!(out, "<h1>Home</h1>");
}

#[test]
fn test_render_is_deterministic() {
    let mut engine = engine();
    let html = "{{#each items}}<li>{{this}}</li>{{/each}}";
    let context = json!({"items": ["a", "b", "c"]});

    let first = engine.render_page(html, &context).unwrap();
    let second = engine.render_page(html, &context).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "<li>a</li><li>b</li><li>c</li>");
}

#[test]
fn test_page_template_not_kept() {
    let mut engine = engine();
    engine.render_page("first {{a}}", &json!({"a": 1})).unwrap();
    assert!(engine.registry.get_templates().is_empty());

    let out = engine.render_page("second {{a}}", &json!({"a": 2})).unwrap();
    assert_eq!(out, "second 2");
}

#[test]
fn test_page_does_not_replace_any_partial() {
    let mut engine = engine();
    for name in ["__page__", "page", "index"] {
        engine.register_partial(name, name).unwrap();
    }

    let out = engine
        .render_page("[{{> __page__}}|{{> page}}|{{> index}}]", &json!({}))
        .unwrap();
    assert_eq!(out, "[__page__|page|index]");
    assert!(engine.has_partial("__page__"));
}

#[test]
fn test_page_syntax_error_keeps_message() {
    let err = engine()
        .render_page("<h1>{{#if title}}x{{/each}}</h1>", &json!({}))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Render(ref e) if matches!(e.reason(), RenderErrorReason::TemplateError(_))
    ));
    assert!(err.to_string().starts_with("template render error"));
}

#[test]
fn test_inline_partial_syntax_error_is_compile_error() {
    let runtime = RuntimeOptions {
        partials: BTreeMap::from([("bad".to_string(), "{{#if x}}{{/each}}".to_string())]),
        ..RuntimeOptions::default()
    };
    let mut engine = Engine::new(&CompileOptions::default(), &runtime, Path::new("/"));
    let err = engine.register_inline_partials().unwrap_err();
    assert!(matches!(err, EngineError::Compile(_)));
    assert!(err.to_string().starts_with("template compile error"));
}

#[test]
fn test_missing_partial_is_render_error() {
    let err = engine().render_page("{{> nope}}", &json!({})).unwrap_err();
    assert!(matches!(err, EngineError::Render(_)));
}

#[test]
fn test_strict_mode() {
    let strict = CompileOptions {
        strict: true,
        ..CompileOptions::default()
    };
    let mut engine = Engine::new(&strict, &RuntimeOptions::default(), Path::new("/"));
    assert!(engine.render_page("{{missing}}", &json!({})).is_err());

    let out = self::engine()
        .render_page("[{{missing}}]", &json!({}))
        .unwrap();
    assert_eq!(out, "[]");
}

#[test]
fn test_escaping_toggle() {
    let html = "{{value}}";
    let context = json!({"value": "<b>"});

    assert_eq!(engine().render_page(html, &context).unwrap(), "&lt;b&gt;");

    let raw = CompileOptions {
        no_escape: true,
        ..CompileOptions::default()
    };
    let mut engine = Engine::new(&raw, &RuntimeOptions::default(), Path::new("/"));
    assert_eq!(engine.render_page(html, &context).unwrap(), "<b>");
}

#[test]
fn test_user_helpers() {
    let mut engine = engine();
    let mut helpers: BTreeMap<String, BoxedHelper> = BTreeMap::new();
    helpers.insert("shout".to_string(), Box::new(shout));
    engine.register_helpers(helpers);

    let out = engine
        .render_page("{{shout name}}", &json!({"name": "home"}))
        .unwrap();
    assert_eq!(out, "HOME");
}

#[test]
fn test_user_helper_cannot_replace_root_helper() {
    let mut engine = engine();
    let mut helpers: BTreeMap<String, BoxedHelper> = BTreeMap::new();
    helpers.insert(RESOLVE_FROM_ROOT.to_string(), Box::new(fake_root));
    helpers.insert("shout".to_string(), Box::new(shout));
    engine.register_helpers(helpers);

    let out = engine
        .render_page(r#"{{resolve-from-root "a.css"}} {{shout "ok"}}"#, &json!({}))
        .unwrap();
    assert_eq!(out, "/site/a.css OK");
}

#[test]
fn test_set_root() {
    let mut engine = engine();
    engine.set_root(Path::new("/other"));
    let out = engine
        .render_page(r#"{{resolve-from-root "a"}}"#, &json!({}))
        .unwrap();
    assert_eq!(out, "/other/a");
}

#[test]
fn test_inline_partials() {
    let mut runtime = RuntimeOptions::default();
    runtime
        .partials
        .insert("footer".to_string(), "<footer>{{year}}</footer>".to_string());
    let mut engine = Engine::new(&CompileOptions::default(), &runtime, Path::new("/"));
    engine.register_inline_partials().unwrap();

    let out = engine
        .render_page("{{> footer}}", &json!({"year": 2024}))
        .unwrap();
    assert_eq!(out, "<footer>2024</footer>");
}

#[test]
fn test_partial_overwrite() {
    let mut engine = engine();
    engine.register_partial("nav", "old").unwrap();
    engine.register_partial("nav", "new").unwrap();
    assert_eq!(engine.render_page("{{> nav}}", &json!({})).unwrap(), "new");
}
