//! API key setup: detect an existing key, otherwise prompt and optionally
//! persist it.

use console::Style;
use dialoguer::{Password, Select};
use reviewbot_core::ReviewBot;

use super::theme::reviewbot_theme;
use crate::cli::credentials::{self, KeySource};

/// Find a key for `provider`, asking the user if none is configured.
///
/// Returns `None` when the user skips; the dashboard then runs without
/// classification.
pub fn obtain_api_key(bot: &ReviewBot, provider: &str) -> anyhow::Result<Option<String>> {
    if let Some(resolved) = credentials::resolve(bot, Some(provider), None) {
        credentials::report(provider, Some(&resolved));
        return Ok(Some(resolved.0));
    }

    let theme = reviewbot_theme();
    let warn = Style::new().for_stderr().yellow();
    let env_var = reviewbot_core::llm::env_var_for(provider).unwrap_or("API key");
    eprintln!("  {}", warn.apply_to(format!("{env_var} not set.")));

    let key: String = match Password::with_theme(&theme)
        .with_prompt(format!(
            "Enter your {} API key (leave empty to skip)",
            credentials::provider_label(provider)
        ))
        .allow_empty_password(true)
        .interact()
    {
        Ok(k) if !k.trim().is_empty() => k.trim().to_string(),
        _ => {
            credentials::report(provider, None);
            return Ok(None);
        }
    };

    let save_options = &["Yes, save to config file", "No, use for this session only"];
    let save_choice = Select::with_theme(&theme)
        .with_prompt("Save this key for future sessions?")
        .items(save_options)
        .default(1)
        .interact_opt()?;

    if save_choice == Some(0) {
        if let Err(e) = credentials::save_key_to_config(provider, &key) {
            eprintln!("  {}", warn.apply_to(format!("Could not save to config: {e}")));
            eprintln!("  Using key for this session only.");
        }
    }
    credentials::report(provider, Some(&(key.clone(), KeySource::Prompt)));
    Ok(Some(key))
}
