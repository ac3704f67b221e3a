//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects beyond
//! `canonicalize()` lookups.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `resolve_path`)
//! - [`route`]: Page path helpers (`page_path`, `slash_join`)

pub mod fs;
pub mod route;

pub use fs::{normalize_path, resolve_path};
pub use route::{page_path, slash_join};
