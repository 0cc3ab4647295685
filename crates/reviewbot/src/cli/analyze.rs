//! The `reviewbot analyze` command.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use reviewbot_core::{
    Config, Dataset, DatasetOrigin, OutputFormat as CoreOutputFormat, ReportWriter, ReviewBot,
    Session, SourceFilter, TriggerOutcome,
};

use super::{credentials, dashboard};

/// Arguments for the `analyze` command.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Review CSV file (defaults to `dataset.path` from the config)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Only analyze reviews from this source (repeatable)
    #[arg(short, long)]
    pub source: Vec<String>,

    /// API key for the LLM provider
    #[arg(long)]
    pub api_key: Option<String>,

    /// LLM provider (gemini, openai, anthropic)
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name (provider-specific)
    #[arg(long)]
    pub model: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: Format,

    /// Output file for json/jsonl (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Format {
    /// Terminal dashboard
    #[default]
    Table,
    /// One JSON document with KPIs and rows
    Json,
    /// One JSON object per review
    Jsonl,
}

/// Execute the analyze command.
pub async fn execute(mut config: Config, args: AnalyzeArgs) -> anyhow::Result<()> {
    if let Some(input) = &args.input {
        config.dataset.path = input.display().to_string();
    }
    let locale = config.locale();
    let table_rows = config.display.table_rows;
    let bot = ReviewBot::new(config);

    let dataset = bot.load_dataset()?;
    report_dataset(&dataset);

    let filter = source_filter(&args.source);
    if let Some(selected) = filter.selected() {
        let known = dataset.sources();
        for source in selected.iter().filter(|s| !known.contains(s)) {
            tracing::warn!("Source '{source}' does not appear in the dataset");
        }
    }

    let provider = bot.provider_name(args.provider.as_deref()).to_string();
    let runner = bot.runner(Some(provider.as_str()), args.model.as_deref())?;
    let resolved = credentials::resolve(&bot, Some(provider.as_str()), args.api_key.as_deref());
    credentials::report(&provider, resolved.as_ref());

    let mut session = Session::new(dataset);
    session.set_filter(filter);
    session.set_credential(resolved.map(|(key, _)| key));

    let total = session.dataset().filter(session.filter()).len() as u64;
    let pb = create_progress_bar(total);
    let outcome = session
        .trigger(&runner, false, |done, _| pb.set_position(done as u64))
        .await?;
    match outcome {
        TriggerOutcome::Ran => pb.finish_with_message("done"),
        _ => pb.finish_and_clear(),
    }

    let view = session.view();
    match args.format {
        Format::Table => {
            print!("{}", dashboard::render(&view, locale, table_rows));
        }
        Format::Json | Format::Jsonl => {
            let format = match args.format {
                Format::Jsonl => CoreOutputFormat::JsonLines,
                _ => CoreOutputFormat::Json,
            };
            let sink: Box<dyn Write> = match &args.output {
                Some(path) => Box::new(BufWriter::new(File::create(path)?)),
                None => Box::new(std::io::stdout().lock()),
            };
            let mut writer = ReportWriter::new(sink, format, locale, args.output.is_none());
            writer.write_view(&view)?;
            writer.flush()?;
            if let Some(path) = &args.output {
                tracing::info!("Wrote {} review(s) to {}", writer.rows_written(), path.display());
            }
        }
    }

    let stats = bot.cache().stats().await;
    tracing::debug!(
        "Cache: {} entries, {} hits, {} misses",
        stats.entries,
        stats.hits,
        stats.misses
    );
    Ok(())
}

/// Build a filter from `--source` values; none means every source.
pub fn source_filter(sources: &[String]) -> SourceFilter {
    if sources.is_empty() {
        SourceFilter::all()
    } else {
        SourceFilter::only(sources.iter().cloned())
    }
}

pub(crate) fn report_dataset(dataset: &Dataset) {
    let dim = console::Style::new().for_stderr().dim();
    let note = match dataset.origin() {
        DatasetOrigin::File(path) => format!("{} review(s) from {}", dataset.len(), path.display()),
        DatasetOrigin::Sample => format!("Dataset not found, using the {}-review sample", dataset.len()),
    };
    eprintln!("  {}", dim.apply_to(note));
}

pub(crate) fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("classifying...");
    pb
}
