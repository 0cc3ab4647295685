//! API key resolution and persistence.
//!
//! Keys are looked up in order: the `--api-key` flag, the provider's
//! environment variable, then the config file. Interactive mode may prompt for
//! a key and save it to the config file with `toml_edit`, which keeps the
//! user's comments and formatting intact.

use std::path::Path;

use console::Style;
use reviewbot_core::{Config, ReviewBot};

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Flag,
    EnvOrConfig,
    Prompt,
}

/// Resolve a key without prompting.
pub fn resolve(
    bot: &ReviewBot,
    provider: Option<&str>,
    flag: Option<&str>,
) -> Option<(String, KeySource)> {
    if let Some(key) = flag.map(str::trim).filter(|k| !k.is_empty()) {
        return Some((key.to_string(), KeySource::Flag));
    }
    bot.api_key(provider)
        .map(|key| (key, KeySource::EnvOrConfig))
}

/// Human-readable label for a provider identifier.
pub fn provider_label(provider: &str) -> &str {
    match provider {
        "gemini" => "Google Gemini",
        "openai" => "OpenAI",
        "anthropic" => "Anthropic",
        other => other,
    }
}

/// Print where classification will get its key from, or why it is disabled.
pub fn report(provider: &str, resolved: Option<&(String, KeySource)>) {
    let dim = Style::new().for_stderr().dim();
    let warn = Style::new().for_stderr().yellow();
    match resolved {
        Some((_, KeySource::Flag)) => {
            eprintln!("  {}", dim.apply_to("Using API key from --api-key"));
        }
        Some((_, KeySource::EnvOrConfig)) => {
            let env_var = reviewbot_core::llm::env_var_for(provider).unwrap_or("config");
            eprintln!(
                "  {}",
                dim.apply_to(format!("Using existing API key from {env_var} / config"))
            );
        }
        Some((_, KeySource::Prompt)) => {}
        None => {
            let env_var = reviewbot_core::llm::env_var_for(provider).unwrap_or("the config file");
            eprintln!(
                "  {}",
                warn.apply_to(format!(
                    "No {} API key ({env_var} not set). Reviews will be shown as not analyzed.",
                    provider_label(provider)
                ))
            );
        }
    }
}

/// Save an API key to the default config file, preserving comments.
pub fn save_key_to_config(provider: &str, key: &str) -> anyhow::Result<()> {
    let path = Config::default_path();
    save_key(&path, provider, key)?;

    let dim = Style::new().for_stderr().dim();
    eprintln!("  {}", dim.apply_to(format!("Key saved to {}", path.display())));
    Ok(())
}

/// Write `key` into `[llm.<provider>] api_key` of the TOML file at `path`.
pub fn save_key(path: &Path, provider: &str, key: &str) -> anyhow::Result<()> {
    if !reviewbot_core::llm::SUPPORTED_PROVIDERS.contains(&provider) {
        anyhow::bail!("Unknown provider '{provider}'");
    }

    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };
    let mut doc: toml_edit::DocumentMut = content.parse()?;

    if !doc.contains_key("llm") {
        doc["llm"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    if !doc["llm"]
        .as_table()
        .is_some_and(|t| t.contains_key(provider))
    {
        doc["llm"][provider] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["llm"][provider]["api_key"] = toml_edit::value(key);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())?;
    tracing::debug!("Saved {provider} API key to {}", path.display());
    Ok(())
}
