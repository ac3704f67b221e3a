//! Page path helpers.
//!
//! A page path is the output path of a page as the context resolver sees it:
//! forward slashes, always one leading `/` (e.g. `/blog/post.html`).

use std::path::Path;

/// Convert a path relative to the pages directory into a page path.
///
/// # Examples
/// ```ignore
/// assert_eq!(page_path(Path::new("index.html")), "/index.html");
/// assert_eq!(page_path(Path::new("blog/post.html")), "/blog/post.html");
/// ```
pub fn page_path(rel: &Path) -> String {
    let joined = slash_join(rel);
    format!("/{}", joined.trim_start_matches('/'))
}

/// Join path components with `/` regardless of platform separator.
///
/// Root and prefix components are skipped.
pub fn slash_join(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => s.to_str(),
            std::path::Component::ParentDir => Some(".."),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
