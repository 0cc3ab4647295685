//! ReviewBot CLI - customer review sentiment dashboard.
//!
//! ReviewBot reads customer reviews from a CSV file, classifies each one with
//! a language model (sentiment plus a 0-5 quality score) and renders the
//! results as a terminal dashboard or as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Classify the configured dataset and show the dashboard
//! reviewbot analyze
//!
//! # Only Google reviews, exported as JSONL
//! reviewbot analyze --source Google --format jsonl --output google.jsonl
//!
//! # Try a single review
//! reviewbot test "Service impeccable, on reviendra !"
//!
//! # Interactive mode
//! reviewbot
//! ```

use std::io::IsTerminal;

use clap::{Parser, Subcommand};

mod cli;
mod env_file;
mod logging;

/// ReviewBot - customer review sentiment dashboard powered by LLM classification.
#[derive(Parser, Debug)]
#[command(name = "reviewbot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify the review dataset and show the dashboard
    Analyze(cli::analyze::AnalyzeArgs),

    /// Classify a single review text
    Test(cli::sandbox::TestArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let dotenv_path = env_file::load();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match reviewbot_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `reviewbot config path`."
            );
            reviewbot_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("ReviewBot v{}", reviewbot_core::VERSION);
    if let Some(path) = &dotenv_path {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    match cli.command {
        Some(Commands::Analyze(args)) => cli::analyze::execute(config, args).await,
        Some(Commands::Test(args)) => cli::sandbox::execute(config, args).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(config).await
        }
        None => {
            anyhow::bail!("No command given. Run `reviewbot --help` for usage.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_analyze_with_sources() {
        let cli = Cli::try_parse_from([
            "reviewbot",
            "analyze",
            "--source",
            "Google",
            "--source",
            "Facebook",
            "--format",
            "jsonl",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Analyze(args)) => {
                assert_eq!(args.source, vec!["Google", "Facebook"]);
                assert!(matches!(args.format, cli::analyze::Format::Jsonl));
            }
            other => panic!("Expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn cli_bare_invocation_has_no_command() {
        let cli = Cli::try_parse_from(["reviewbot", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_test_requires_text() {
        assert!(Cli::try_parse_from(["reviewbot", "test"]).is_err());
        let cli = Cli::try_parse_from(["reviewbot", "test", "Très bon"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Test(ref a)) if a.text == "Très bon"));
    }
}
