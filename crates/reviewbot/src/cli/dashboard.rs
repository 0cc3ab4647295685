//! Terminal rendering of the dashboard: KPI cards, the sentiment
//! distribution and the detail table.

use std::fmt::Write as _;

use console::{Style, StyledObject};
use reviewbot_core::{ClassificationResult, DashboardView, Locale, QualityBand, Sentiment};

const BAR_WIDTH: usize = 30;
const TEXT_WIDTH: usize = 48;

struct Labels {
    volume: &'static str,
    mean_score: &'static str,
    satisfaction: &'static str,
    top_source: &'static str,
    positives: &'static str,
    distribution: &'static str,
    details: &'static str,
    date: &'static str,
    source: &'static str,
    review: &'static str,
    sentiment: &'static str,
    score: &'static str,
    more_rows: &'static str,
    empty: &'static str,
}

const FR: Labels = Labels {
    volume: "Volume d'avis",
    mean_score: "Note moyenne IA",
    satisfaction: "Taux de satisfaction",
    top_source: "Source principale",
    positives: "avis positifs",
    distribution: "Répartition des sentiments",
    details: "Détail des avis",
    date: "Date",
    source: "Source",
    review: "Avis",
    sentiment: "Sentiment",
    score: "Note",
    more_rows: "avis supplémentaires non affichés",
    empty: "Aucun avis pour cette sélection.",
};

const EN: Labels = Labels {
    volume: "Review volume",
    mean_score: "Mean AI score",
    satisfaction: "Satisfaction rate",
    top_source: "Top source",
    positives: "positive reviews",
    distribution: "Sentiment distribution",
    details: "Review details",
    date: "Date",
    source: "Source",
    review: "Review",
    sentiment: "Sentiment",
    score: "Score",
    more_rows: "more reviews not shown",
    empty: "No reviews match this selection.",
};

fn labels(locale: Locale) -> &'static Labels {
    match locale {
        Locale::Fr => &FR,
        Locale::En => &EN,
    }
}

fn sentiment_style(sentiment: Sentiment) -> Style {
    match sentiment {
        Sentiment::Positive => Style::new().green(),
        Sentiment::Negative => Style::new().red(),
        Sentiment::Neutral => Style::new().yellow(),
        Sentiment::Error => Style::new().red().dim(),
        Sentiment::Pending | Sentiment::NotAnalyzed => Style::new().dim(),
    }
}

/// Colored sentiment label.
pub fn styled_sentiment(sentiment: Sentiment, locale: Locale) -> StyledObject<&'static str> {
    sentiment_style(sentiment).apply_to(sentiment.label(locale))
}

/// `Positif (4/5)`, or just the label for sentinels.
pub fn verdict(result: &ClassificationResult, locale: Locale) -> String {
    let label = styled_sentiment(result.sentiment, locale);
    if result.is_analyzed() {
        format!("{label} ({}/{})", result.score, reviewbot_core::types::MAX_SCORE)
    } else {
        label.to_string()
    }
}

/// Five-cell gauge for a 0-5 score.
pub fn score_bar(score: u8) -> String {
    let max = usize::from(reviewbot_core::types::MAX_SCORE);
    let filled = usize::from(score).min(max);
    format!("{}{}", "█".repeat(filled), "░".repeat(max - filled))
}

/// Cut `text` to `width` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= width {
        flat
    } else {
        let mut cut: String = flat.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = console::measure_text_width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

fn quality_style(band: QualityBand) -> Style {
    match band {
        QualityBand::Good => Style::new().green(),
        QualityBand::Fair => Style::new().yellow(),
        QualityBand::Poor => Style::new().red(),
    }
}

/// Render the whole dashboard, showing at most `max_rows` table rows.
pub fn render(view: &DashboardView, locale: Locale, max_rows: usize) -> String {
    let l = labels(locale);
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let cyan = Style::new().cyan();
    let kpis = view.kpis();
    let mut out = String::new();

    // KPI cards
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<24} {}", bold.apply_to(l.volume), kpis.total);
    let _ = writeln!(
        out,
        "  {:<24} {:.1}/{} {}",
        bold.apply_to(l.mean_score),
        kpis.mean_score,
        reviewbot_core::types::MAX_SCORE,
        quality_style(kpis.quality).apply_to(kpis.quality.label(locale))
    );
    let _ = writeln!(
        out,
        "  {:<24} {:.0}% {}",
        bold.apply_to(l.satisfaction),
        kpis.satisfaction_pct,
        dim.apply_to(format!("({} {})", kpis.positives, l.positives))
    );
    let _ = writeln!(
        out,
        "  {:<24} {}",
        bold.apply_to(l.top_source),
        kpis.top_source.as_deref().unwrap_or("-")
    );

    if view.rows().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}", dim.apply_to(l.empty));
        return out;
    }

    // Distribution
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", cyan.apply_to(l.distribution));
    let total = kpis.total.max(1);
    for &(sentiment, count) in view.distribution() {
        let width = (count * BAR_WIDTH).div_ceil(total);
        let label = sentiment.label(locale);
        let _ = writeln!(
            out,
            "    {} {} {count}",
            pad(label, 14),
            sentiment_style(sentiment).apply_to("■".repeat(width))
        );
    }

    // Detail table
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", cyan.apply_to(l.details));
    let _ = writeln!(
        out,
        "    {} {} {} {} {}",
        bold.apply_to(pad(l.date, 6)),
        bold.apply_to(pad(l.source, 12)),
        bold.apply_to(pad(l.review, TEXT_WIDTH)),
        bold.apply_to(pad(l.sentiment, 13)),
        bold.apply_to(l.score)
    );
    for row in view.rows().iter().take(max_rows) {
        let label = row.sentiment.label(locale);
        let score = if row.sentiment.is_polarity() {
            score_bar(row.score)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "    {} {} {} {} {}",
            pad(&row.short_date(), 6),
            pad(&truncate(&row.source, 12), 12),
            pad(&truncate(&row.text, TEXT_WIDTH), TEXT_WIDTH),
            sentiment_style(row.sentiment).apply_to(pad(label, 13)),
            score
        );
    }
    let hidden = view.rows().len().saturating_sub(max_rows);
    if hidden > 0 {
        let _ = writeln!(out, "    {}", dim.apply_to(format!("… {hidden} {}", l.more_rows)));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewbot_core::{Dataset, SourceFilter};

    #[test]
    fn score_bar_fills_cells() {
        assert_eq!(score_bar(0), "░░░░░");
        assert_eq!(score_bar(3), "███░░");
        assert_eq!(score_bar(5), "█████");
        assert_eq!(score_bar(9), "█████");
    }

    #[test]
    fn truncate_is_char_aware() {
        assert_eq!(truncate("Très bon", 20), "Très bon");
        assert_eq!(truncate("Délicieux repas", 5), "Déli…");
        assert_eq!(truncate("multi\nline   text", 40), "multi line text");
    }

    #[test]
    fn verdict_formats() {
        console::set_colors_enabled(false);
        let result = ClassificationResult::new(Sentiment::Positive, 4);
        assert_eq!(verdict(&result, Locale::Fr), "Positif (4/5)");
        assert_eq!(verdict(&ClassificationResult::error(), Locale::En), "Error");
        assert_eq!(verdict(&ClassificationResult::pending(), Locale::Fr), "En attente");
    }

    #[test]
    fn render_sample_lists_rows_and_kpis() {
        console::set_colors_enabled(false);
        let view = DashboardView::build(&Dataset::sample(), &SourceFilter::all(), None);

        let out = render(&view, Locale::Fr, 2);

        assert!(out.contains("Volume d'avis"));
        assert!(out.contains("04/10"));
        assert!(out.contains("03/10"));
        assert!(!out.contains("01/10"));
        assert!(out.contains("2 avis supplémentaires"));
        assert!(out.contains("Non analysé"));
    }

    #[test]
    fn render_empty_selection() {
        console::set_colors_enabled(false);
        let view = DashboardView::build(&Dataset::sample(), &SourceFilter::only(["Yelp"]), None);

        let out = render(&view, Locale::En, 50);
        assert!(out.contains("No reviews match this selection."));
    }
}
