//! Shared helpers: hashing and path normalization.

pub mod hash;
pub mod path;
