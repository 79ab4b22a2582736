//! Subcommand implementations.

pub mod batch;
pub mod info;
pub mod process;
