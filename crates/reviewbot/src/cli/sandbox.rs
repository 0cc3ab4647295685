//! The `reviewbot test` command: classify one review text.

use clap::Args;
use reviewbot_core::{ClassificationResult, Config, ReviewAnalyzer, ReviewBot};

use super::{credentials, dashboard};

/// Arguments for the `test` command.
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Review text to classify
    pub text: String,

    /// API key for the LLM provider
    #[arg(long)]
    pub api_key: Option<String>,

    /// LLM provider (gemini, openai, anthropic)
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name (provider-specific)
    #[arg(long)]
    pub model: Option<String>,
}

/// Execute the test command.
pub async fn execute(config: Config, args: TestArgs) -> anyhow::Result<()> {
    let locale = config.locale();
    let bot = ReviewBot::new(config);
    let provider = bot.provider_name(args.provider.as_deref()).to_string();
    let analyzer = bot.analyzer(Some(provider.as_str()), args.model.as_deref())?;

    let resolved = credentials::resolve(&bot, Some(provider.as_str()), args.api_key.as_deref());
    credentials::report(&provider, resolved.as_ref());
    let Some((key, _)) = resolved else {
        anyhow::bail!(
            "An API key is required to test a review. Pass --api-key or set {}.",
            reviewbot_core::llm::env_var_for(&provider).unwrap_or("one in the config file")
        );
    };

    let result = classify_text(&analyzer, &args.text, &key).await?;
    println!("{}", dashboard::verdict(&result, locale));
    Ok(())
}

/// Run one text through the shared chain. Blank input is a user error.
pub async fn classify_text(
    analyzer: &ReviewAnalyzer,
    text: &str,
    key: &str,
) -> anyhow::Result<ClassificationResult> {
    if text.trim().is_empty() {
        anyhow::bail!("Review text is empty");
    }
    Ok(analyzer.analyze(text, key).await)
}
