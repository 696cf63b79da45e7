//! Shared helpers for integration tests.

#![allow(dead_code)]

use aicommits::ai::service::AiType;
use aicommits::core::config::{CommitType, Config};
use aicommits::core::git::StagedDiff;
use secrecy::SecretString;

pub const DIFF: &str = "diff --git a/a.txt b/a.txt\nnew file mode 100644\n--- /dev/null\n+++ b/a.txt\n@@ -0,0 +1 @@\n+hello\n";

/// Staged diff adding a single line to `a.txt`.
pub fn staged() -> StagedDiff {
    StagedDiff {
        files: vec!["a.txt".to_string()],
        diff: DIFF.to_string(),
    }
}

/// Config with both provider keys set.
pub fn config(ai_source: AiType, commit_type: CommitType) -> Config {
    Config {
        ai_source,
        openai_key: Some(SecretString::from("sk-test".to_string())),
        anthropic_key: Some(SecretString::from("ak-test".to_string())),
        commit_type,
        ..Config::default()
    }
}
