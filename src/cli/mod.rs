//! Command line interface module
//!
//! Argument parsing and the runner that performs a single tag check.

pub mod args;
pub mod runner;

pub use args::{Args, CheckTarget, OutputFormat};
pub use runner::{CheckReport, Runner};
