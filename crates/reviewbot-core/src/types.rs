//! Core data types for the ReviewBot classification pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest score the model may assign.
pub const MAX_SCORE: u8 = 5;

/// A single customer review as loaded from the dataset.
///
/// Reviews are immutable once loaded. `index` is the row position in the
/// loaded dataset and is the review's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Row position in the loaded dataset (0-based)
    pub index: usize,

    /// Publication date
    pub date: NaiveDate,

    /// Channel the review came from ("Google", "TripAdvisor", ...)
    pub source: String,

    /// Free-form review body
    pub text: String,
}

impl Review {
    pub fn new(index: usize, date: NaiveDate, source: &str, text: &str) -> Self {
        Self {
            index,
            date,
            source: source.to_string(),
            text: text.to_string(),
        }
    }
}

/// Display language for sentiment labels and the classification prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// French (the dataset's native language)
    #[default]
    Fr,
    /// English
    En,
}

impl Locale {
    /// Parse a locale code (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fr" | "fr-fr" | "french" => Some(Self::Fr),
            "en" | "en-us" | "en-gb" | "english" => Some(Self::En),
            _ => None,
        }
    }
}

/// Sentiment of a review: a polarity, or one of the sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    /// No credential was available when the review was classified.
    Pending,
    /// The review was never submitted for classification.
    NotAnalyzed,
    /// Classification failed after all retries.
    Error,
}

impl Sentiment {
    /// Every variant, in dashboard display order.
    pub const ALL: [Sentiment; 6] = [
        Sentiment::Positive,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::NotAnalyzed,
        Sentiment::Pending,
        Sentiment::Error,
    ];

    /// Match a polarity label returned by the model.
    ///
    /// Case- and accent-insensitive, French or English. Sentinels are never
    /// produced from model output.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'é' | 'è' | 'ê' | 'ë' => 'e',
                other => other,
            })
            .collect();

        match normalized.as_str() {
            "positif" | "positive" | "positifs" => Some(Self::Positive),
            "negatif" | "negative" | "negatifs" => Some(Self::Negative),
            "neutre" | "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Human-readable label in the given locale.
    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Positive, Locale::Fr) => "Positif",
            (Self::Negative, Locale::Fr) => "Négatif",
            (Self::Neutral, Locale::Fr) => "Neutre",
            (Self::Pending, Locale::Fr) => "En attente",
            (Self::NotAnalyzed, Locale::Fr) => "Non analysé",
            (Self::Error, Locale::Fr) => "Erreur",
            (Self::Positive, Locale::En) => "Positive",
            (Self::Negative, Locale::En) => "Negative",
            (Self::Neutral, Locale::En) => "Neutral",
            (Self::Pending, Locale::En) => "Pending",
            (Self::NotAnalyzed, Locale::En) => "Not analyzed",
            (Self::Error, Locale::En) => "Error",
        }
    }

    /// Whether this is a real polarity rather than a sentinel.
    pub fn is_polarity(self) -> bool {
        matches!(self, Self::Positive | Self::Negative | Self::Neutral)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Locale::En))
    }
}

/// Outcome of classifying one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub sentiment: Sentiment,

    /// Quality score 0-5; always 0 for sentinels
    pub score: u8,
}

impl ClassificationResult {
    /// Build a result, clamping the score to `0..=MAX_SCORE`.
    pub fn new(sentiment: Sentiment, score: u8) -> Self {
        let score = if sentiment.is_polarity() {
            score.min(MAX_SCORE)
        } else {
            0
        };
        Self { sentiment, score }
    }

    /// Sentinel for a call attempted without a credential.
    pub fn pending() -> Self {
        Self::new(Sentiment::Pending, 0)
    }

    /// Sentinel for rows that were never submitted.
    pub fn not_analyzed() -> Self {
        Self::new(Sentiment::NotAnalyzed, 0)
    }

    /// Terminal failure after exhausting retries.
    pub fn error() -> Self {
        Self::new(Sentiment::Error, 0)
    }

    /// Whether the model actually produced this result.
    pub fn is_analyzed(&self) -> bool {
        self.sentiment.is_polarity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_french_and_english() {
        assert_eq!(Sentiment::from_label("Positif"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label("Négatif"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("negatif"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label(" NEUTRE "), Some(Sentiment::Neutral));
        assert_eq!(Sentiment::from_label("Positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label("neutral"), Some(Sentiment::Neutral));
    }

    #[test]
    fn test_from_label_rejects_sentinels_and_noise() {
        assert_eq!(Sentiment::from_label("Erreur"), None);
        assert_eq!(Sentiment::from_label("En attente"), None);
        assert_eq!(Sentiment::from_label("mixed"), None);
        assert_eq!(Sentiment::from_label(""), None);
    }

    #[test]
    fn test_labels_per_locale() {
        assert_eq!(Sentiment::NotAnalyzed.label(Locale::Fr), "Non analysé");
        assert_eq!(Sentiment::NotAnalyzed.label(Locale::En), "Not analyzed");
        assert_eq!(Sentiment::Error.label(Locale::Fr), "Erreur");
        assert_eq!(Sentiment::Pending.label(Locale::Fr), "En attente");
    }

    #[test]
    fn test_result_clamps_score() {
        let result = ClassificationResult::new(Sentiment::Positive, 9);
        assert_eq!(result.score, 5);
    }

    #[test]
    fn test_sentinel_score_is_zero() {
        let result = ClassificationResult::new(Sentiment::Error, 4);
        assert_eq!(result.score, 0);
        assert!(!result.is_analyzed());
        assert!(!ClassificationResult::pending().is_analyzed());
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("FR"), Some(Locale::Fr));
        assert_eq!(Locale::parse("en"), Some(Locale::En));
        assert_eq!(Locale::parse("de"), None);
    }
}
