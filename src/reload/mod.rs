//! Hot-reload invalidation.
//!
//! Decides, per file-change event, whether connected clients must do a full
//! reload. Only files registered as partials trigger one: pages that include
//! a partial are not tracked individually, so any partial edit invalidates
//! every page.

mod message;

use std::path::Path;

use crate::debug;
use crate::partials::PartialSet;
use crate::utils::path::normalize_path;

pub use message::{ReloadMessage, ReloadSink};

/// Outcome of a file-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotUpdate {
    /// Not ours; the host handles the event normally.
    Ignored,
    /// A full reload was sent; the host should suppress its default handling.
    FullReload,
}

impl HotUpdate {
    #[inline]
    pub fn is_handled(self) -> bool {
        matches!(self, Self::FullReload)
    }
}

/// Classify a changed file without side effects.
pub fn classify(enabled: bool, partials: &PartialSet, file: &Path) -> HotUpdate {
    if enabled && partials.contains(&normalize_path(file)) {
        HotUpdate::FullReload
    } else {
        HotUpdate::Ignored
    }
}

/// Classify a changed file and notify `sink` when a full reload is needed.
pub fn invalidate(
    enabled: bool,
    partials: &PartialSet,
    file: &Path,
    sink: &mut dyn ReloadSink,
) -> HotUpdate {
    let outcome = classify(enabled, partials, file);
    if outcome.is_handled() {
        debug!("reload"; "partial changed: {}", file.display());
        sink.send(&ReloadMessage::full_reload());
    }
    outcome
}
