//! Subcommand implementations.

pub mod demo;
pub mod password;
pub mod tokens;
pub mod webhook;
