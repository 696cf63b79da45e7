//! Static prompt text blocks

/// Ground rules for summarizing a git diff
pub const SUMMARIZE_DIFF: &str = r#"You are an expert programmer, and you are trying to summarize a git diff. Here are some reminders about the git diff format:

- For every file, there are metadata lines indicating modifications.
- Lines starting with `+` denote additions, `-` denotes deletions, and others provide context.
- Each file's diff is separated by an empty line.

Provide summary comments for the git diff without including file names. Write only the most crucial comments to maintain readability.

**EXAMPLE SUMMARY COMMENTS:**
```
- Raise the amount of returned recordings from `10` to `100`
- Fix a typo in the github action name
- Move the `octokit` initialization to a separate file
- Add an OpenAI API for completions
- Lower numeric tolerance for test files
- Add 2 tests for the inclusive string split function
```

Ensure that each comment is concise and relevant to the diff without unnecessary repetition or verbosity."#;

/// Conventional commit types with their one-line descriptions
pub const CONVENTIONAL_TYPES: [(&str, &str); 10] = [
    (
        "build",
        "Changes that affect the build system or external dependencies (example scopes: gulp, broccoli, npm)",
    ),
    (
        "chore",
        "Updating libraries, copyrights or other repo setting, includes updating dependencies.",
    ),
    (
        "ci",
        "Changes to our CI configuration files and scripts (example scopes: Travis, Circle, GitHub Actions)",
    ),
    (
        "docs",
        "Non-code changes, such as fixing typos or adding new documentation (example scopes: Markdown file)",
    ),
    (
        "feat",
        "a commit of the type feat introduces a new feature to the codebase",
    ),
    ("fix", "A commit of the type fix patches a bug in your codebase"),
    ("perf", "A code change that improves performance"),
    (
        "refactor",
        "A code change that neither fixes a bug nor adds a feature",
    ),
    (
        "style",
        "Changes that do not affect the meaning of the code (white-space, formatting, missing semi-colons, etc)",
    ),
    ("test", "Adding missing tests or correcting existing tests"),
];

/// Output grammar for conventional commit messages
pub const CONVENTIONAL_FORMAT: &str = "<type>(<optional scope>): <commit message>";

/// Output grammar for free-form commit messages
pub const UNSCOPED_FORMAT: &str = "<commit message>";

/// Heading that opens every system prompt
pub const TASK_HEADER: &str = "### Task: Summarize Git Diff with Commit Messages";
