//! Shared types and utilities for the catalog admin crates.

pub mod types;
pub mod utils;
