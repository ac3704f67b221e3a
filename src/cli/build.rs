//! Build command: render every page into the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use pagebars::utils::path::page_path;
use pagebars::{Stage, debug, log};

use super::project::Project;

/// Extension of page files under the pages directory.
const PAGE_EXTENSION: &str = "html";

/// Outcome of rendering a set of pages.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub rendered: usize,
    /// Pages that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

impl BuildReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        let noun = if self.rendered == 1 { "page" } else { "pages" };
        match self.failed.len() {
            0 => format!("rendered {} {}", self.rendered, noun),
            n => format!("rendered {} {}, {} failed", self.rendered, noun, n),
        }
    }
}

/// `pagebars build`
pub fn build_site(project: &Project) -> Result<()> {
    let mut stage = project.stage()?;
    let report = render_all(&mut stage, &project.pages_dir(), &project.output_dir())?;

    for (path, err) in &report.failed {
        log!("error"; "{}: {}", path.display(), err);
    }
    if !report.is_ok() {
        bail!("{}", report.summary());
    }
    log!("build"; "{}", report.summary());
    Ok(())
}

/// Find page files under `pages_dir`, sorted.
pub fn collect_pages(pages_dir: &Path) -> Result<Vec<PathBuf>> {
    if !pages_dir.is_dir() {
        bail!("pages directory `{}` does not exist", pages_dir.display());
    }

    let mut pages: Vec<_> = WalkDir::new(pages_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| is_page(p))
        .collect();
    pages.sort();
    Ok(pages)
}

pub fn is_page(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(PAGE_EXTENSION))
}

/// Render every page. Page failures are collected, not returned.
pub fn render_all(stage: &mut Stage, pages_dir: &Path, output_dir: &Path) -> Result<BuildReport> {
    let mut report = BuildReport::default();
    for page in collect_pages(pages_dir)? {
        render_into(stage, pages_dir, output_dir, &page, &mut report);
    }
    Ok(report)
}

/// Render the given pages only.
pub fn render_some(
    stage: &mut Stage,
    pages_dir: &Path,
    output_dir: &Path,
    pages: &[PathBuf],
) -> BuildReport {
    let mut report = BuildReport::default();
    for page in pages {
        render_into(stage, pages_dir, output_dir, page, &mut report);
    }
    report
}

fn render_into(
    stage: &mut Stage,
    pages_dir: &Path,
    output_dir: &Path,
    page: &Path,
    report: &mut BuildReport,
) {
    match render_page(stage, pages_dir, output_dir, page) {
        Ok(()) => report.rendered += 1,
        Err(err) => report.failed.push((page.to_path_buf(), format!("{err:#}"))),
    }
}

/// Render one page file and write it under `output_dir`.
pub fn render_page(stage: &mut Stage, pages_dir: &Path, output_dir: &Path, page: &Path) -> Result<()> {
    let rel = page.strip_prefix(pages_dir).with_context(|| {
        format!("page `{}` is outside `{}`", page.display(), pages_dir.display())
    })?;
    let html = fs::read_to_string(page).with_context(|| format!("failed to read `{}`", page.display()))?;

    let rendered = stage.transform_page(&html, &page_path(rel))?;

    let out = output_path(output_dir, rel);
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out, rendered).with_context(|| format!("failed to write `{}`", out.display()))?;
    debug!("build"; "{} -> {}", rel.display(), out.display());
    Ok(())
}

/// Output location of a page given its path relative to the pages directory.
pub fn output_path(output_dir: &Path, rel: &Path) -> PathBuf {
    output_dir.join(rel)
}
