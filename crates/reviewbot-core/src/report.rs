//! Dashboard view derived from a dataset, a filter and a batch run.
//!
//! The view is recomputed from scratch whenever the filter or the run
//! changes. Rows the run did not cover show as `NotAnalyzed`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::{Dataset, SourceFilter};
use crate::pipeline::BatchRun;
use crate::types::{ClassificationResult, Locale, Sentiment};

/// Mean score at or above which quality is rated good.
pub const GOOD_SCORE: f64 = 4.0;

/// Mean score at or above which quality is rated fair.
pub const FAIR_SCORE: f64 = 2.5;

/// One line of the detail table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub index: usize,
    pub date: NaiveDate,
    pub source: String,
    pub text: String,
    pub sentiment: Sentiment,
    pub score: u8,
}

impl ReviewRow {
    /// Day and month, as shown in the table (`DD/MM`).
    pub fn short_date(&self) -> String {
        self.date.format("%d/%m").to_string()
    }
}

/// Qualitative rating of the mean score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityBand {
    Good,
    Fair,
    Poor,
}

impl QualityBand {
    pub fn from_mean(mean: f64) -> Self {
        if mean >= GOOD_SCORE {
            Self::Good
        } else if mean >= FAIR_SCORE {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Good, Locale::Fr) => "Excellente",
            (Self::Fair, Locale::Fr) => "Moyenne",
            (Self::Poor, Locale::Fr) => "Critique",
            (Self::Good, Locale::En) => "Excellent",
            (Self::Fair, Locale::En) => "Average",
            (Self::Poor, Locale::En) => "Critical",
        }
    }
}

/// Headline figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    /// Rows in the view
    pub total: usize,
    /// Rows with a real classification
    pub analyzed: usize,
    /// Mean score over analyzed and failed rows (failures count as 0), 0 when
    /// there are none
    pub mean_score: f64,
    pub quality: QualityBand,
    pub positives: usize,
    /// Positives as a percentage of all rows in the view
    pub satisfaction_pct: f64,
    /// Most frequent source; ties go to the smallest label
    pub top_source: Option<String>,
}

impl Kpis {
    fn compute(rows: &[ReviewRow]) -> Self {
        let total = rows.len();
        let analyzed = rows.iter().filter(|r| r.sentiment.is_polarity()).count();
        let scored: Vec<u8> = rows
            .iter()
            .filter(|r| r.sentiment.is_polarity() || r.sentiment == Sentiment::Error)
            .map(|r| r.score)
            .collect();
        let mean_score = if scored.is_empty() {
            0.0
        } else {
            let sum: u32 = scored.iter().copied().map(u32::from).sum();
            f64::from(sum) / scored.len() as f64
        };
        let positives = rows
            .iter()
            .filter(|r| r.sentiment == Sentiment::Positive)
            .count();
        let satisfaction_pct = if total == 0 {
            0.0
        } else {
            positives as f64 / total as f64 * 100.0
        };

        let mut per_source: BTreeMap<&str, usize> = BTreeMap::new();
        for row in rows {
            *per_source.entry(row.source.as_str()).or_insert(0) += 1;
        }
        // BTreeMap iterates in label order, so the first maximum wins ties.
        let top_source = per_source
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (&source, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((source, count)),
            })
            .map(|(source, _)| source.to_string());

        Self {
            total,
            analyzed,
            mean_score,
            quality: QualityBand::from_mean(mean_score),
            positives,
            satisfaction_pct,
            top_source,
        }
    }
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    rows: Vec<ReviewRow>,
    kpis: Kpis,
    distribution: Vec<(Sentiment, usize)>,
}

impl DashboardView {
    /// Join the filtered dataset with `run`'s results.
    pub fn build(dataset: &Dataset, filter: &SourceFilter, run: Option<&BatchRun>) -> Self {
        let results = run.map(BatchRun::results_by_index).unwrap_or_default();

        let mut rows: Vec<ReviewRow> = dataset
            .reviews()
            .iter()
            .filter(|r| filter.matches(&r.source))
            .map(|review| {
                let result = results
                    .get(&review.index)
                    .copied()
                    .unwrap_or_else(ClassificationResult::not_analyzed);
                ReviewRow {
                    index: review.index,
                    date: review.date,
                    source: review.source.clone(),
                    text: review.text.clone(),
                    sentiment: result.sentiment,
                    score: result.score,
                }
            })
            .collect();
        // sort_by is stable: equal dates keep dataset order
        rows.sort_by(|a, b| b.date.cmp(&a.date));

        let distribution = Sentiment::ALL
            .iter()
            .map(|&s| (s, rows.iter().filter(|r| r.sentiment == s).count()))
            .filter(|&(_, count)| count > 0)
            .collect();

        Self {
            kpis: Kpis::compute(&rows),
            rows,
            distribution,
        }
    }

    /// Rows sorted by date, newest first.
    pub fn rows(&self) -> &[ReviewRow] {
        &self.rows
    }

    pub fn kpis(&self) -> &Kpis {
        &self.kpis
    }

    /// Non-zero counts per sentiment, in display order.
    pub fn distribution(&self) -> &[(Sentiment, usize)] {
        &self.distribution
    }
}
