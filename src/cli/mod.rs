//! Command-line interface module.

mod args;
pub mod build;
pub mod project;
pub mod watch;

pub use args::{Cli, Commands};
