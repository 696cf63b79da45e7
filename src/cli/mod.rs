//! CLI module for aicommits
//!
//! This module contains the CLI command definitions and handlers using clap.

pub mod commands;
pub mod commit;
pub mod config;

pub use commands::{Cli, Commands};
