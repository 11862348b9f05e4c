//! Subcommand implementations

pub mod check;
pub mod generate;
pub mod strategies;
