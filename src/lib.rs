//! aicommits - Write your git commit messages with AI
//!
//! This library turns the staged changes of a git repository into commit
//! messages using OpenAI or Anthropic models, and provides the CLI around it.

pub mod ai;
pub mod cli;
pub mod core;
pub mod error;

pub use error::{AicommitsError, Result};
