//! Subcommand implementations.

pub mod admin;
pub mod catalog;
pub mod store;
