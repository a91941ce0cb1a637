//! Subcommand implementations.

pub mod store;
