//! Prompt construction for commit message generation
//!
//! Everything here is pure string composition: the same configuration and
//! commit type always produce the same prompt text.

use crate::ai::templates::{
    CONVENTIONAL_FORMAT, CONVENTIONAL_TYPES, SUMMARIZE_DIFF, TASK_HEADER, UNSCOPED_FORMAT,
};
use crate::core::config::CommitType;

/// Heading placed in front of the diff-summary ground rules
const SUMMARY_HEADING: &str = "#### Summarize Git Diff";

/// Generate the full system prompt for a single request
///
/// Fragments are assembled in a fixed order (task header, language and length
/// constraints, optional type classification, output format, diff-summary
/// rules); fragments that are blank are dropped instead of leaving empty lines.
pub fn generate_prompt(locale: &str, max_length: usize, commit_type: CommitType) -> String {
    join_fragments(&[
        TASK_HEADER,
        &format!("Message language: {}", locale),
        &format!("Whole content should be within {} characters", max_length),
        &build_type_classification_instructions(commit_type),
        &commit_format(commit_type),
        SUMMARY_HEADING,
        SUMMARIZE_DIFF,
    ])
}

/// Generate the first-phase prompt that only asks for a free-form summary
pub fn build_summary_instructions(locale: &str, max_length: usize) -> String {
    generate_prompt(locale, max_length, CommitType::Unscoped)
}

/// Instructions for picking a commit type
///
/// Returns an empty string for [`CommitType::Unscoped`], meaning the
/// classification phase is skipped.
pub fn build_type_classification_instructions(commit_type: CommitType) -> String {
    match commit_type {
        CommitType::Unscoped => String::new(),
        CommitType::Conventional => {
            let types = CONVENTIONAL_TYPES
                .iter()
                .map(|(name, description)| format!("- {}: {}", name, description))
                .collect::<Vec<_>>()
                .join("\n");

            format!(
                "Choose a type from the following options that best describes the git diff:\n{}\n\nProvide a summary in the format: `{}`",
                types, CONVENTIONAL_FORMAT
            )
        }
    }
}

/// Output format directive for the given commit type
pub fn commit_format(commit_type: CommitType) -> String {
    let format = match commit_type {
        CommitType::Unscoped => UNSCOPED_FORMAT,
        CommitType::Conventional => CONVENTIONAL_FORMAT,
    };
    format!("The output response must be in format:\n{}", format)
}

/// Drop blank fragments, then join the rest with newlines
fn join_fragments(fragments: &[&str]) -> String {
    fragments
        .iter()
        .filter(|f| !f.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: [&str; 10] = [
        "build", "chore", "ci", "docs", "feat", "fix", "perf", "refactor", "style", "test",
    ];

    #[test]
    fn test_unscoped_prompt_has_no_classification_block() {
        let prompt = generate_prompt("en", 50, CommitType::Unscoped);

        assert!(!prompt.contains("Choose a type"));
        assert!(!prompt.contains("- refactor:"));
        assert!(prompt.contains("<commit message>"));
    }

    #[test]
    fn test_conventional_prompt_lists_all_types() {
        let prompt = generate_prompt("en", 50, CommitType::Conventional);

        for name in ALL_TYPES {
            assert!(
                prompt.contains(&format!("- {}:", name)),
                "missing type {}",
                name
            );
        }
        assert!(prompt.contains("<type>(<optional scope>): <commit message>"));
    }

    #[test]
    fn test_prompt_interpolates_locale_and_length() {
        let prompt = generate_prompt("pt-br", 72, CommitType::Unscoped);

        assert!(prompt.contains("Message language: pt-br"));
        assert!(prompt.contains("within 72 characters"));
    }

    #[test]
    fn test_prompt_fragment_order() {
        let prompt = generate_prompt("en", 50, CommitType::Conventional);

        let header = prompt.find(TASK_HEADER).unwrap();
        let language = prompt.find("Message language").unwrap();
        let types = prompt.find("Choose a type").unwrap();
        let summary = prompt.find(SUMMARY_HEADING).unwrap();

        assert!(header < language);
        assert!(language < types);
        assert!(types < summary);
    }

    #[test]
    fn test_prompt_has_no_blank_fragment_lines() {
        let prompt = generate_prompt("en", 50, CommitType::Unscoped);

        // The unscoped classification fragment is empty and must not leave a gap
        assert!(prompt.starts_with(&format!("{}\nMessage language: en\n", TASK_HEADER)));
        assert!(prompt.contains("characters\nThe output response must be in format:"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            generate_prompt("en", 50, CommitType::Conventional),
            generate_prompt("en", 50, CommitType::Conventional)
        );
    }

    #[test]
    fn test_summary_instructions_contain_diff_rules() {
        let summary = build_summary_instructions("en", 50);

        assert!(summary.contains("Lines starting with `+` denote additions"));
        assert!(summary.contains("EXAMPLE SUMMARY COMMENTS"));
        assert!(summary.contains("within 50 characters"));
        assert!(!summary.contains("Choose a type"));
    }

    #[test]
    fn test_classification_instructions() {
        assert_eq!(build_type_classification_instructions(CommitType::Unscoped), "");

        let conventional = build_type_classification_instructions(CommitType::Conventional);
        assert_eq!(conventional.lines().filter(|l| l.starts_with("- ")).count(), 10);
        assert!(conventional.ends_with("`<type>(<optional scope>): <commit message>`"));
    }
}
