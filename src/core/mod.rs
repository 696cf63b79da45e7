//! Core functionality for aicommits
//!
//! This module contains shared business logic including:
//! - Application configuration
//! - Git repository operations

pub mod config;
pub mod git;

pub use config::{Config, ConfigStore};
pub use git::{GitRepository, StagedDiff};
