//! Interactive mode, started by a bare `reviewbot` on a TTY.
//!
//! A menu loop drives one [`Session`]: running the analysis, narrowing the
//! source filter, re-running, testing a single review and clearing the
//! cache. Filter changes redraw the dashboard from the stored run without
//! calling the model again.

pub mod setup;
pub mod theme;

use console::Style;
use dialoguer::{Input, MultiSelect, Select};
use reviewbot_core::{
    BatchRunner, Config, Locale, ReviewBot, RunState, Session, SourceFilter, TriggerOutcome,
};

use super::{analyze, dashboard, sandbox};

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &[
    "Run analysis",
    "Filter by source",
    "Re-run analysis",
    "Test a review",
    "Show dashboard",
    "Clear result cache",
    "View configuration",
    "Exit",
];

/// Everything the menu actions need.
struct App {
    bot: ReviewBot,
    runner: BatchRunner,
    session: Session,
    api_key: Option<String>,
    locale: Locale,
    table_rows: usize,
}

/// Entry point for interactive mode.
pub async fn run(config: Config) -> anyhow::Result<()> {
    theme::print_banner();
    let theme = theme::reviewbot_theme();

    let locale = config.locale();
    let table_rows = config.display.table_rows;
    let bot = ReviewBot::new(config);
    let dataset = bot.load_dataset()?;
    analyze::report_dataset(&dataset);

    let provider = bot.provider_name(None).to_string();
    let runner = bot.runner(None, None)?;
    let api_key = setup::obtain_api_key(&bot, &provider)?;

    let mut session = Session::new(dataset);
    session.set_credential(api_key.clone());

    let mut app = App {
        bot,
        runner,
        session,
        api_key,
        locale,
        table_rows,
    };
    app.show_dashboard();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => app.trigger(false).await?,
            Some(1) => app.choose_sources()?,
            Some(2) => app.trigger(true).await?,
            Some(3) => app.test_review().await?,
            Some(4) => app.show_dashboard(),
            Some(5) => app.clear_cache().await,
            Some(6) => show_config(app.bot.config())?,
            Some(7) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

impl App {
    fn show_dashboard(&self) {
        print!(
            "{}",
            dashboard::render(&self.session.view(), self.locale, self.table_rows)
        );
        println!();
    }

    async fn trigger(&mut self, fresh: bool) -> anyhow::Result<()> {
        let total = self
            .session
            .dataset()
            .filter(self.session.filter())
            .len() as u64;
        let pb = analyze::create_progress_bar(total);

        let outcome = self
            .session
            .trigger(&self.runner, fresh, |done, _| pb.set_position(done as u64))
            .await;

        let dim = Style::new().for_stderr().dim();
        match outcome? {
            TriggerOutcome::Ran => pb.finish_with_message("done"),
            TriggerOutcome::Reused => {
                pb.finish_and_clear();
                eprintln!(
                    "  {}",
                    dim.apply_to("Showing the stored results. Choose \"Re-run analysis\" to classify again.")
                );
            }
            TriggerOutcome::Disabled => {
                pb.finish_and_clear();
                let warn = Style::new().for_stderr().yellow();
                eprintln!("  {}", warn.apply_to("No API key: classification is disabled."));
            }
        }
        self.show_dashboard();
        Ok(())
    }

    fn choose_sources(&mut self) -> anyhow::Result<()> {
        let sources = self.session.dataset().sources();
        let current = self.session.filter();
        let checked: Vec<bool> = sources.iter().map(|s| current.matches(s)).collect();

        let theme = theme::reviewbot_theme();
        let picked = MultiSelect::with_theme(&theme)
            .with_prompt("Sources to display (space to toggle)")
            .items(&sources)
            .defaults(&checked)
            .interact_opt()?;
        let Some(picked) = picked else {
            return Ok(());
        };

        let filter = if picked.len() == sources.len() {
            SourceFilter::all()
        } else {
            SourceFilter::only(picked.into_iter().map(|i| sources[i].clone()))
        };
        self.session.set_filter(filter);
        self.show_dashboard();
        Ok(())
    }

    async fn test_review(&self) -> anyhow::Result<()> {
        let Some(key) = self.api_key.as_deref() else {
            let warn = Style::new().for_stderr().yellow();
            eprintln!("  {}", warn.apply_to("An API key is required to test a review."));
            return Ok(());
        };

        let theme = theme::reviewbot_theme();
        let Some(text) = handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Review text")
                .allow_empty(true)
                .interact_text(),
        )?
        else {
            return Ok(());
        };

        match sandbox::classify_text(self.runner.analyzer(), &text, key).await {
            Ok(result) => eprintln!("  {}", dashboard::verdict(&result, self.locale)),
            Err(e) => {
                let warn = Style::new().for_stderr().yellow();
                eprintln!("  {}", warn.apply_to(e));
            }
        }
        Ok(())
    }

    async fn clear_cache(&self) {
        let cache = self.runner.analyzer().cache();
        let dropped = cache.len().await;
        cache.clear().await;
        let dim = Style::new().for_stderr().dim();
        eprintln!("  {}", dim.apply_to(format!("Cleared {dropped} cached result(s).")));
        if matches!(self.session.state(), RunState::Completed(_)) {
            eprintln!(
                "  {}",
                dim.apply_to("The dashboard keeps the last run until you re-run the analysis.")
            );
        }
    }
}

/// Summary of the active settings, with the full TOML on request.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::reviewbot_theme();
    let dim = Style::new().for_stderr().dim();
    let magenta = Style::new().for_stderr().magenta();
    let label = Style::new().for_stderr().bold();

    loop {
        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };

        eprintln!();
        eprintln!("  {}", magenta.apply_to("Current configuration:"));
        eprintln!();
        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Dataset:"),
            config.dataset_path().display()
        );
        eprintln!(
            "    {:<20} {} ({} ms timeout)",
            label.apply_to("LLM provider:"),
            config.llm.provider,
            config.llm.timeout_ms
        );
        eprintln!(
            "    {:<20} {} attempts, {} ms pause, {} ms rate-limit backoff",
            label.apply_to("Retry:"),
            config.retry.max_attempts,
            config.retry.safety_delay_ms,
            config.retry.rate_limit_base_ms
        );
        eprintln!(
            "    {:<20} {:?}, {} rows",
            label.apply_to("Display:"),
            config.display.locale,
            config.display.table_rows
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        let items = &["View full config (TOML)", "Back"];
        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                }
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                }
            },
            _ => break,
        }
    }

    Ok(())
}
