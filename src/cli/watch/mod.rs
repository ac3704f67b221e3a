//! Watch command: build once, then re-render on file changes.
//!
//! ```text
//! notify → Debouncer → plan_changes → render (all | some) → WatchStatus
//! ```
//!
//! Partial edits go through [`Stage::handle_hot_update`]; a full reload
//! re-renders every page. Settings edits also re-render everything since
//! every page's context depends on them.

mod debouncer;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher};
use pagebars::logger::{status_error, status_success, status_unchanged};
use pagebars::utils::path::normalize_path;
use pagebars::{ReloadMessage, ReloadSink, Stage, debug, log};

use super::build::{BuildReport, is_page, output_path, render_all, render_some};
use super::project::Project;
use debouncer::{ChangeKind, Debouncer};

/// Reload sink for the terminal host: there is no browser to notify.
struct LogSink;

impl ReloadSink for LogSink {
    fn send(&mut self, message: &ReloadMessage) {
        log!("reload"; "{}", message.to_json());
    }
}

/// Directories the watch loop needs to tell changes apart.
#[derive(Debug)]
struct WatchPaths {
    pages_dir: PathBuf,
    output_dir: PathBuf,
    cache_dir: PathBuf,
    settings: PathBuf,
}

impl WatchPaths {
    fn new(project: &Project, stage: &Stage) -> Self {
        Self {
            pages_dir: normalize_path(&project.pages_dir()),
            output_dir: normalize_path(&project.output_dir()),
            cache_dir: normalize_path(stage.cache_dir()),
            settings: normalize_path(stage.settings_path()),
        }
    }

    /// Our own writes.
    fn is_generated(&self, path: &Path) -> bool {
        path.starts_with(&self.output_dir) || path.starts_with(&self.cache_dir)
    }
}

/// What a batch of changes requires.
#[derive(Debug, Default, PartialEq, Eq)]
struct Plan {
    full: bool,
    pages: Vec<PathBuf>,
    removed: Vec<PathBuf>,
}

impl Plan {
    fn is_empty(&self) -> bool {
        !self.full && self.pages.is_empty() && self.removed.is_empty()
    }
}

/// `pagebars watch`
pub fn watch_site(project: &Project) -> Result<()> {
    let mut stage = project.stage()?;
    let paths = WatchPaths::new(project, &stage);

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;
    let root = project.root();
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch `{}`", root.display()))?;

    report_status(&render_all(&mut stage, &project.pages_dir(), &project.output_dir())?);
    log!("watch"; "watching {}", root.display());

    let mut debouncer = Debouncer::new();
    loop {
        match rx.recv_timeout(debouncer.sleep_duration()) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(e)) => log!("watch"; "notify error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let Some(changes) = debouncer.take_if_ready() else {
            continue;
        };

        let plan = plan_changes(&stage, &paths, &changes, &mut LogSink);
        if plan.is_empty() {
            status_unchanged("no page affected");
            continue;
        }
        if let Err(e) = apply_plan(&mut stage, project, &paths, &plan) {
            status_error("rebuild failed", &format!("{e:#}"));
        }
    }

    Ok(())
}

/// Classify debounced changes.
fn plan_changes(
    stage: &Stage,
    paths: &WatchPaths,
    changes: &[(PathBuf, ChangeKind)],
    sink: &mut dyn ReloadSink,
) -> Plan {
    let mut plan = Plan::default();

    for (path, kind) in changes {
        if paths.is_generated(path) {
            continue;
        }

        if stage.handle_hot_update(path, sink).is_handled() {
            plan.full = true;
            continue;
        }

        if *path == paths.settings {
            debug!("watch"; "settings {}", kind.label());
            plan.full = true;
            continue;
        }

        if path.starts_with(&paths.pages_dir) && is_page(path) {
            match kind {
                ChangeKind::Removed => plan.removed.push(path.clone()),
                ChangeKind::Created | ChangeKind::Modified => plan.pages.push(path.clone()),
            }
        }
    }

    plan
}

fn apply_plan(stage: &mut Stage, project: &Project, paths: &WatchPaths, plan: &Plan) -> Result<()> {
    for page in &plan.removed {
        if let Ok(rel) = page.strip_prefix(&paths.pages_dir) {
            let out = output_path(&project.output_dir(), rel);
            if let Err(e) = fs::remove_file(&out) {
                debug!("watch"; "failed to remove {}: {}", out.display(), e);
            }
        }
    }

    let report = if plan.full {
        render_all(stage, &project.pages_dir(), &project.output_dir())?
    } else {
        render_some(stage, &paths.pages_dir, &project.output_dir(), &plan.pages)
    };

    if plan.pages.is_empty() && !plan.full {
        status_success(&format!("removed {} page(s)", plan.removed.len()));
    } else {
        report_status(&report);
    }
    Ok(())
}

fn report_status(report: &BuildReport) {
    if report.is_ok() {
        status_success(&report.summary());
        return;
    }

    let detail = report
        .failed
        .iter()
        .map(|(path, err)| format!("{}: {}", path.display(), err))
        .collect::<Vec<_>>()
        .join("\n");
    status_error(&report.summary(), &detail);
}
