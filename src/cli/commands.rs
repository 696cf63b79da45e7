//! CLI command definitions using clap
//!
//! Defines the command structure for the `aicommits` CLI tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// aicommits - Write your git commit messages with AI
///
/// Run without a subcommand to generate a message for the staged changes.
#[derive(Parser, Debug)]
#[command(name = "aicommits", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Path to the config file
    #[arg(long, env = "AICOMMITS_CONFIG", global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config(ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Generate
// ─────────────────────────────────────────────────────────────────────────────

/// Options for generating a commit message
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Files to exclude from the diff sent to the AI
    #[arg(short = 'x', long = "exclude", value_name = "PATH")]
    pub exclude: Vec<String>,

    /// Stage all modified and deleted tracked files before generating
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Commit message type (`conventional`)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub commit_type: Option<String>,

    /// Print the prompt instead of calling the AI
    #[arg(long)]
    pub prompt_only: bool,

    /// Extra arguments passed to `git commit` (after `--`)
    #[arg(last = true, value_name = "GIT_ARGS")]
    pub git_args: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print configuration values
    Get {
        /// Configuration keys (e.g. OPENAI_KEY locale)
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Set configuration values
    Set {
        /// Assignments in the form key=value
        #[arg(required = true, value_name = "KEY=VALUE")]
        pairs: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from([
            "aicommits",
            "-a",
            "-x",
            "Cargo.lock",
            "--exclude",
            "docs",
            "--type",
            "conventional",
            "--",
            "--no-verify",
        ])
        .unwrap();

        assert!(cli.command.is_none());
        assert!(cli.generate.all);
        assert_eq!(cli.generate.exclude, vec!["Cargo.lock", "docs"]);
        assert_eq!(cli.generate.commit_type.as_deref(), Some("conventional"));
        assert_eq!(cli.generate.git_args, vec!["--no-verify"]);
        assert!(!cli.generate.prompt_only);
    }

    #[test]
    fn test_config_set_pairs() {
        let cli =
            Cli::try_parse_from(["aicommits", "config", "set", "locale=de", "timeout=2000"])
                .unwrap();

        match cli.command {
            Some(Commands::Config(args)) => match args.command {
                ConfigCommand::Set { pairs } => assert_eq!(pairs, vec!["locale=de", "timeout=2000"]),
                other => panic!("unexpected command: {:?}", other),
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_get_requires_keys() {
        assert!(Cli::try_parse_from(["aicommits", "config", "get"]).is_err());
    }
}
