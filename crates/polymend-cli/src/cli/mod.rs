//! CLI command implementations.
//!
//! This module contains the implementations for the CLI subcommands:
//! - `check` - Scan a layer and report invalid geometries
//! - `repair` - Scan, ask, repair and optionally clean a layer

pub mod check;
pub mod common;
pub mod config;
pub mod prompt;
pub mod repair;

pub use check::cmd_check;
pub use repair::{cmd_repair, RepairOptions};
