use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::config::{CompileOptions, RuntimeOptions};

fn make_engine() -> Engine {
    Engine::new(
        &CompileOptions::default(),
        &RuntimeOptions::default(),
        Path::new("/"),
    )
}

fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_partial_name() {
    assert_eq!(partial_name(Path::new("header.hbs")), "header");
    assert_eq!(partial_name(Path::new("nav/item.hbs")), "nav/item");
    assert_eq!(partial_name(Path::new("card.en.hbs")), "card.en");
}

#[test]
fn test_same_name_in_one_root_is_error() {
    let temp = TempDir::new().unwrap();
    let hbs = write(temp.path(), "card.hbs", "from hbs");
    let html = write(temp.path(), "card.html", "from html");

    let err = discover(temp.path(), &[]).unwrap_err();
    match err {
        PartialError::NameCollision { name, first, second } => {
            assert_eq!(name, "card");
            assert_eq!(first, hbs);
            assert_eq!(second, html);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_name_collision_registers_nothing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.hbs", "a");
    write(temp.path(), "nav/item.hbs", "hbs");
    write(temp.path(), "nav/item.handlebars", "handlebars");

    let mut engine = make_engine();
    let mut set = PartialSet::new();
    let err = register_partials(
        &PartialDirs::One(temp.path().to_path_buf()),
        &[],
        &mut engine,
        &mut set,
    )
    .unwrap_err();
    assert!(matches!(err, PartialError::NameCollision { ref name, .. } if name == "nav/item"));
    assert!(set.is_empty());
    assert!(!engine.has_partial("a"));
}

#[test]
fn test_hidden_entries_discovered() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.hbs", "a");
    write(temp.path(), ".shared/footer.hbs", "footer");
    write(temp.path(), ".hidden.hbs", "hidden");

    let names: Vec<_> = discover(temp.path(), &[])
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec![".hidden", ".shared/footer", "a"]);
}

#[test]
fn test_discover_sorted_and_filtered() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "b.hbs", "b");
    write(temp.path(), "a.html", "a");
    write(temp.path(), "nav/item.handlebars", "item");
    write(temp.path(), "notes.txt", "skip");

    let names: Vec<_> = discover(temp.path(), &[])
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["a", "b", "nav/item"]);
}

#[test]
fn test_discover_custom_extensions() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.hbs", "a");
    write(temp.path(), "b.mustache", "b");

    let files = discover(temp.path(), &["mustache".to_string()]).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "b");
}

#[test]
fn test_missing_directory_is_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");

    let err = discover(&missing, &[]).unwrap_err();
    assert!(matches!(err, PartialError::NotADirectory(p) if p == missing));
}

#[test]
fn test_file_as_directory_is_error() {
    let temp = TempDir::new().unwrap();
    let file = write(temp.path(), "partials", "not a dir");

    let mut engine = make_engine();
    let mut set = PartialSet::new();
    let err = register_partials(&PartialDirs::One(file), &[], &mut engine, &mut set).unwrap_err();
    assert!(matches!(err, PartialError::NotADirectory(_)));
    assert!(set.is_empty());
}

#[test]
fn test_register_records_identities() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.hbs", "A");
    let b = write(temp.path(), "nav/b.hbs", "B");

    let mut engine = make_engine();
    let mut set = PartialSet::new();
    let count = register_partials(
        &PartialDirs::One(temp.path().to_path_buf()),
        &[],
        &mut engine,
        &mut set,
    )
    .unwrap();

    assert_eq!(count, 2);
    assert!(set.contains_file(&a));
    assert!(set.contains_file(&b));
    assert!(engine.has_partial("a"));
    assert!(engine.has_partial("nav/b"));
}

#[test]
fn test_new_partial_picked_up_on_next_registration() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.hbs", "A");
    let dirs = PartialDirs::One(temp.path().to_path_buf());

    let mut engine = make_engine();
    let mut set = PartialSet::new();
    register_partials(&dirs, &[], &mut engine, &mut set).unwrap();
    assert_eq!(set.len(), 1);

    let c = write(temp.path(), "c.hbs", "C");
    register_partials(&dirs, &[], &mut engine, &mut set).unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.contains_file(&c));
}

#[test]
fn test_reregistration_overwrites() {
    let temp = TempDir::new().unwrap();
    let path = write(temp.path(), "title.hbs", "v1");
    let dirs = PartialDirs::One(temp.path().to_path_buf());

    let mut engine = make_engine();
    let mut set = PartialSet::new();
    register_partials(&dirs, &[], &mut engine, &mut set).unwrap();

    fs::write(&path, "v2").unwrap();
    register_partials(&dirs, &[], &mut engine, &mut set).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(engine.render_page("{{> title}}", &json!({})).unwrap(), "v2");
}

#[test]
fn test_removed_partial_stays_in_set() {
    let temp = TempDir::new().unwrap();
    let path = write(temp.path(), "gone.hbs", "x");
    let dirs = PartialDirs::One(temp.path().to_path_buf());

    let mut engine = make_engine();
    let mut set = PartialSet::new();
    register_partials(&dirs, &[], &mut engine, &mut set).unwrap();
    let canonical = normalize_path(&path);

    fs::remove_file(&path).unwrap();
    register_partials(&dirs, &[], &mut engine, &mut set).unwrap();
    assert!(set.contains(&canonical));
}

#[test]
fn test_later_root_wins() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write(first.path(), "nav.hbs", "first");
    write(second.path(), "nav.hbs", "second");
    let dirs = PartialDirs::Many(vec![first.path().to_path_buf(), second.path().to_path_buf()]);

    let mut engine = make_engine();
    let mut set = PartialSet::new();
    register_partials(&dirs, &[], &mut engine, &mut set).unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(engine.render_page("{{> nav}}", &json!({})).unwrap(), "second");
}

#[test]
fn test_partial_syntax_error() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "broken.hbs", "{{#if x}}oops{{/each}}");

    let mut engine = make_engine();
    let mut set = PartialSet::new();
    let err = register_partials(
        &PartialDirs::One(temp.path().to_path_buf()),
        &[],
        &mut engine,
        &mut set,
    )
    .unwrap_err();
    assert!(matches!(err, PartialError::Syntax { ref name, .. } if name == "broken"));
}

#[test]
fn test_empty_dirs_register_nothing() {
    let mut engine = make_engine();
    let mut set = PartialSet::new();
    let count = register_partials(&PartialDirs::default(), &[], &mut engine, &mut set).unwrap();
    assert_eq!(count, 0);
}
