//! Ordered batch classification with progress reporting.
//!
//! A run walks its reviews strictly in order, one at a time, and calls the
//! progress callback after every item. Failures never abort a run: each
//! review gets exactly one result, possibly a sentinel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use super::analyzer::ReviewAnalyzer;
use crate::types::{ClassificationResult, Review, Sentiment};

/// One classified review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub review: Review,
    pub result: ClassificationResult,
}

/// Results of one batch run, positionally aligned with its input.
#[derive(Debug, Clone, Default)]
pub struct BatchRun {
    entries: Vec<BatchEntry>,
    total: usize,
    complete: bool,
}

impl BatchRun {
    fn new(total: usize) -> Self {
        Self {
            entries: Vec::with_capacity(total),
            total,
            complete: total == 0,
        }
    }

    fn record(&mut self, review: Review, result: ClassificationResult) {
        debug_assert!(self.entries.len() < self.total);
        self.entries.push(BatchEntry { review, result });
        self.complete = self.entries.len() == self.total;
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Number of reviews the run was started with.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of reviews processed so far.
    pub fn progress(&self) -> usize {
        self.entries.len()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Results keyed by dataset row index.
    pub fn results_by_index(&self) -> HashMap<usize, ClassificationResult> {
        self.entries
            .iter()
            .map(|e| (e.review.index, e.result))
            .collect()
    }

    /// How many entries carry each sentiment.
    pub fn sentiment_counts(&self) -> HashMap<Sentiment, usize> {
        let mut counts = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.result.sentiment).or_insert(0) += 1;
        }
        counts
    }
}

/// Drives the classification chain over an ordered list of reviews.
pub struct BatchRunner {
    analyzer: Arc<ReviewAnalyzer>,
}

impl BatchRunner {
    pub fn new(analyzer: Arc<ReviewAnalyzer>) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &Arc<ReviewAnalyzer> {
        &self.analyzer
    }

    /// Classify every review in order.
    ///
    /// `on_progress(completed, total)` is called after each review. The
    /// returned run always holds exactly `reviews.len()` entries.
    pub async fn run<F>(&self, reviews: &[Review], credential: &str, mut on_progress: F) -> BatchRun
    where
        F: FnMut(usize, usize),
    {
        let total = reviews.len();
        let mut run = BatchRun::new(total);
        if total == 0 {
            tracing::debug!("Empty batch, nothing to classify");
            return run;
        }

        tracing::info!(
            "Classifying {total} review(s) with {}",
            self.analyzer.provider_name()
        );
        let start = Instant::now();

        for (i, review) in reviews.iter().enumerate() {
            let result = self.analyzer.analyze(&review.text, credential).await;
            tracing::debug!(
                index = review.index,
                sentiment = %result.sentiment,
                score = result.score,
                "Review classified"
            );
            run.record(review.clone(), result);
            on_progress(i + 1, total);
        }

        let counts = run.sentiment_counts();
        let summary = Sentiment::ALL
            .iter()
            .filter_map(|s| counts.get(s).map(|n| format!("{s}: {n}")))
            .collect::<Vec<_>>()
            .join(", ");
        if counts.contains_key(&Sentiment::Error) {
            tracing::warn!("Batch of {total} finished in {:?} ({summary})", start.elapsed());
        } else {
            tracing::info!("Batch of {total} finished in {:?} ({summary})", start.elapsed());
        }

        run
    }
}
