//! Dialoguer theme and banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// Menu theme: magenta prompts, green confirmations, red errors.
pub fn reviewbot_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().magenta(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().magenta(),
        active_item_style: Style::new().for_stderr().magenta(),
        checked_item_prefix: style("◉".to_string()).for_stderr().green(),
        unchecked_item_prefix: style("○".to_string()).for_stderr().dim(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Banner lines, centered in a double-line box.
fn banner_lines() -> Vec<String> {
    let version_line = format!("ReviewBot v{}", reviewbot_core::VERSION);
    let tagline = "Customer review sentiment dashboard";
    let inner_width = tagline.chars().count().max(version_line.len()) + 4;

    vec![
        format!("  ╔{:═<width$}╗", "", width = inner_width),
        format!("  ║{:^width$}║", version_line, width = inner_width),
        format!("  ║{:^width$}║", tagline, width = inner_width),
        format!("  ╚{:═<width$}╝", "", width = inner_width),
    ]
}

/// Print the banner to stderr so stdout stays clean.
pub fn print_banner() {
    let magenta = Style::new().for_stderr().magenta();
    eprintln!();
    for line in banner_lines() {
        eprintln!("{}", magenta.apply_to(line));
    }
    eprintln!();
}
