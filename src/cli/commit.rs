//! Commit message generation flow

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::ai::factory;
use crate::ai::prompts::generate_prompt;
use crate::ai::service::generate_commit_messages;
use crate::cli::commands::GenerateArgs;
use crate::core::config::{validate_ai_type, Config, ConfigKey, ConfigStore, RawConfig, ResolveMode};
use crate::core::git::GitRepository;
use crate::error::{AicommitsError, Result};

/// Environment variables consulted for the proxy, first match wins
const PROXY_ENV_VARS: [&str; 4] = ["https_proxy", "HTTPS_PROXY", "http_proxy", "HTTP_PROXY"];

/// Environment variables consulted for the OpenAI key, first match wins
const OPENAI_KEY_ENV_VARS: [&str; 2] = ["OPENAI_KEY", "OPENAI_API_KEY"];

/// Generate a commit message for the staged changes and commit it
pub async fn handle_generate(args: GenerateArgs, store: &ConfigStore) -> Result<()> {
    let git = GitRepository::open_current_dir()?;

    if args.all {
        git.stage_tracked()?;
    }

    let staged = git
        .staged_diff(&args.exclude)?
        .ok_or(AicommitsError::NoStagedChanges)?;

    println!("{}:", detected_message(staged.files.len()));
    for file in &staged.files {
        println!("     {}", file);
    }

    let overrides = env_overrides(|name| std::env::var(name).ok(), args.commit_type.as_deref());
    let config = Config::load_from(store, &overrides, ResolveMode::Strict)?;
    let ai_type = validate_ai_type(&config)?;

    if args.prompt_only {
        println!("\n→  System prompt:\n{}", system_prompt(&config));
        println!("\n→  User prompt:\n{}", staged.diff);
        return Ok(());
    }

    println!("\nThe AI ({}) is analyzing your changes...", ai_type.display_name());
    let mut service = factory::create_default(ai_type, &config, &staged)?;
    let messages = generate_commit_messages(&mut *service, config.commit_type).await?;
    debug!("Generated {} candidate messages", messages.len());

    if messages.is_empty() {
        return Err(AicommitsError::NoCommitMessages);
    }

    let stdin = io::stdin();
    let message = choose_message(&messages, &mut stdin.lock(), &mut io::stdout())?;

    if args.git_args.is_empty() {
        let commit_hash = git.commit(&message)?;
        println!("✔ Successfully committed: {}", &commit_hash[..8]);
    } else {
        git.commit_with_args(&message, &args.git_args)?;
        println!("✔ Successfully committed!");
    }

    Ok(())
}

/// "Detected N staged file(s)"
pub fn detected_message(count: usize) -> String {
    format!(
        "Detected {} staged file{}",
        count,
        if count == 1 { "" } else { "s" }
    )
}

/// Build config overrides from the environment and command line flags
fn env_overrides<F>(var: F, commit_type: Option<&str>) -> RawConfig
where
    F: Fn(&str) -> Option<String>,
{
    let first_set = |names: &[&str]| {
        names
            .iter()
            .filter_map(|&name| var(name))
            .find(|value| !value.is_empty())
    };

    let mut overrides = RawConfig::new();
    if let Some(key) = first_set(&OPENAI_KEY_ENV_VARS[..]) {
        overrides.insert(ConfigKey::OpenAiKey.as_str().to_string(), key);
    }
    if let Some(proxy) = first_set(&PROXY_ENV_VARS[..]) {
        overrides.insert(ConfigKey::Proxy.as_str().to_string(), proxy);
    }
    if let Some(commit_type) = commit_type {
        overrides.insert(ConfigKey::Type.as_str().to_string(), commit_type.to_string());
    }
    overrides
}

fn system_prompt(config: &Config) -> String {
    generate_prompt(&config.locale, config.max_length, config.commit_type)
}

/// Ask the user to accept, pick, or edit a generated message
fn choose_message<R: BufRead, W: Write>(
    messages: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    if let [message] = messages {
        writeln!(output, "\nUse this commit message?\n\n   {}\n", message)?;
        write!(output, "[Y/n/e(dit)] ")?;
    } else {
        writeln!(output, "\nPick a commit message to use:\n")?;
        for (i, message) in messages.iter().enumerate() {
            writeln!(output, "  {}) {}", i + 1, message)?;
        }
        write!(output, "\n[1-{}/n/e(dit)] ", messages.len())?;
    }
    output.flush()?;

    let choice = read_line(input)?.to_lowercase();
    match choice.as_str() {
        "" | "y" | "yes" => Ok(messages[0].clone()),
        "e" | "edit" => edit_message(input, output),
        "n" | "no" => Err(AicommitsError::Cancelled),
        other => other
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| messages.get(i))
            .cloned()
            .ok_or_else(|| AicommitsError::InvalidInput(format!("Invalid choice '{}'", other))),
    }
}

/// Read a message from the user, ending at the first empty line
fn edit_message<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    writeln!(output, "Edit the message (end with empty line):")?;
    output.flush()?;

    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() && !lines.is_empty() {
            break;
        }
        lines.push(trimmed.to_string());
    }

    let message = lines.join("\n").trim().to_string();
    if message.is_empty() {
        return Err(AicommitsError::Cancelled);
    }
    Ok(message)
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
