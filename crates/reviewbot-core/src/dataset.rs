//! Review dataset loading and source filtering.
//!
//! Reads a CSV file with a header row and the columns `date`, `source` and
//! `avis` (or `text`). Quoted fields may contain commas, doubled quotes and
//! line breaks. When the file does not exist a small built-in sample is
//! returned so the dashboard always has something to show.

use crate::error::DatasetError;
use crate::types::Review;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Columns that may hold the review body, in order of preference.
const TEXT_COLUMNS: &[&str] = &["avis", "text", "review"];

/// Where a dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetOrigin {
    File(PathBuf),
    Sample,
}

/// An ordered, immutable collection of reviews.
#[derive(Debug, Clone)]
pub struct Dataset {
    reviews: Vec<Review>,
    origin: DatasetOrigin,
}

impl Dataset {
    /// Load reviews from `path`, or the built-in sample if the file is missing.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Dataset {:?} not found, using built-in sample", path);
                return Ok(Self::sample());
            }
            Err(source) => {
                return Err(DatasetError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let reviews = parse_csv(&content, path)?;
        tracing::info!("Loaded {} review(s) from {:?}", reviews.len(), path);
        Ok(Self {
            reviews,
            origin: DatasetOrigin::File(path.to_path_buf()),
        })
    }

    /// The fallback dataset: 4 reviews across 3 sources.
    pub fn sample() -> Self {
        let rows = [
            (
                (2023, 10, 1),
                "Google",
                "Excellent ! Le service était rapide et le plat délicieux.",
            ),
            (
                (2023, 10, 2),
                "TripAdvisor",
                "Horrible attente, plus d'une heure pour être servi.",
            ),
            (
                (2023, 10, 3),
                "Google",
                "Correct sans plus, un peu cher pour la quantité.",
            ),
            (
                (2023, 10, 4),
                "Facebook",
                "Super ambiance, on reviendra avec plaisir !",
            ),
        ];

        let reviews = rows
            .iter()
            .enumerate()
            .filter_map(|(index, &((y, m, d), source, text))| {
                NaiveDate::from_ymd_opt(y, m, d).map(|date| Review::new(index, date, source, text))
            })
            .collect();

        Self {
            reviews,
            origin: DatasetOrigin::Sample,
        }
    }

    /// Build a dataset from already-parsed reviews (re-indexed by position).
    pub fn from_reviews(reviews: Vec<Review>) -> Self {
        let reviews = reviews
            .into_iter()
            .enumerate()
            .map(|(index, review)| Review { index, ..review })
            .collect();
        Self {
            reviews,
            origin: DatasetOrigin::Sample,
        }
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn origin(&self) -> &DatasetOrigin {
        &self.origin
    }

    /// Distinct source labels in order of first appearance.
    pub fn sources(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for review in &self.reviews {
            if !seen.contains(&review.source) {
                seen.push(review.source.clone());
            }
        }
        seen
    }

    /// Reviews whose source passes `filter`, in dataset order.
    pub fn filter(&self, filter: &SourceFilter) -> Vec<Review> {
        self.reviews
            .iter()
            .filter(|r| filter.matches(&r.source))
            .cloned()
            .collect()
    }
}

/// Subset of source labels to display and analyze.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    /// `None` selects every source
    selected: Option<BTreeSet<String>>,
}

impl SourceFilter {
    pub fn all() -> Self {
        Self { selected: None }
    }

    pub fn only<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: Some(sources.into_iter().map(Into::into).collect()),
        }
    }

    pub fn matches(&self, source: &str) -> bool {
        self.selected
            .as_ref()
            .map_or(true, |selected| selected.contains(source))
    }

    pub fn is_all(&self) -> bool {
        self.selected.is_none()
    }

    /// Selected labels, or `None` when every source is selected.
    pub fn selected(&self) -> Option<&BTreeSet<String>> {
        self.selected.as_ref()
    }
}

/// Parse the review CSV. `path` is only used in error messages.
pub fn parse_csv(content: &str, path: &Path) -> Result<Vec<Review>, DatasetError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = split_records(content).into_iter();

    let Some((_, header)) = records.next() else {
        return Ok(Vec::new());
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

    let column = |name: &str| header.iter().position(|h| h == name);
    let missing = |name: &str| DatasetError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    };
    let date_col = column("date").ok_or_else(|| missing("date"))?;
    let source_col = column("source").ok_or_else(|| missing("source"))?;
    let text_col = TEXT_COLUMNS
        .iter()
        .find_map(|&name| column(name))
        .ok_or_else(|| missing("avis"))?;

    let mut reviews = Vec::new();
    for (line, fields) in records {
        let field = |idx: usize| {
            fields.get(idx).map(|s| s.as_str()).ok_or_else(|| DatasetError::Row {
                path: path.to_path_buf(),
                line,
                message: format!("expected {} fields, found {}", header.len(), fields.len()),
            })
        };

        let raw_date = field(date_col)?;
        let date = parse_date(raw_date).ok_or_else(|| DatasetError::Row {
            path: path.to_path_buf(),
            line,
            message: format!("unrecognized date '{raw_date}'"),
        })?;

        reviews.push(Review::new(
            reviews.len(),
            date,
            field(source_col)?.trim(),
            field(text_col)?,
        ));
    }

    Ok(reviews)
}

/// Parse a calendar date, day-first for ambiguous forms.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Split CSV text into records, tracking the 1-based line each record starts on.
fn split_records(content: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                if !(fields.len() == 1 && fields[0].trim().is_empty()) {
                    records.push((record_line, std::mem::take(&mut fields)));
                }
                fields.clear();
                line += 1;
                record_line = line;
            }
            '\n' => {
                field.push(c);
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        if !(fields.len() == 1 && fields[0].trim().is_empty()) {
            records.push((record_line, fields));
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> PathBuf {
        PathBuf::from("AVIS-CLIENTS.csv")
    }

    #[test]
    fn test_sample_has_four_rows_three_sources() {
        let dataset = Dataset::sample();
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.sources(), vec!["Google", "TripAdvisor", "Facebook"]);
        assert_eq!(dataset.origin(), &DatasetOrigin::Sample);
    }

    #[test]
    fn test_filter_google_on_sample() {
        let dataset = Dataset::sample();
        let google = dataset.filter(&SourceFilter::only(["Google"]));
        assert_eq!(google.len(), 2);
        assert!(google.iter().all(|r| r.source == "Google"));
        assert_eq!(google[0].index, 0);
        assert_eq!(google[1].index, 2);
    }

    #[test]
    fn test_filter_all_and_empty_selection() {
        let dataset = Dataset::sample();
        assert_eq!(dataset.filter(&SourceFilter::all()).len(), 4);
        assert!(dataset
            .filter(&SourceFilter::only(Vec::<String>::new()))
            .is_empty());
    }

    #[test]
    fn test_parse_csv_basic() {
        let csv = "date,source,avis\n2023-10-01,Google,Excellent !\n02/10/2023,TripAdvisor,Horrible attente.\n";
        let reviews = parse_csv(csv, &path()).unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].text, "Excellent !");
        assert_eq!(reviews[1].date, NaiveDate::from_ymd_opt(2023, 10, 2).unwrap());
        assert_eq!(reviews[1].index, 1);
    }

    #[test]
    fn test_parse_csv_quoted_fields() {
        let csv = "source,date,text\r\nGoogle,2023-10-01,\"Bon, mais \"\"cher\"\"\"\r\nFacebook,2023-10-02,\"Deux\nlignes\"\r\n";
        let reviews = parse_csv(csv, &path()).unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].text, "Bon, mais \"cher\"");
        assert_eq!(reviews[1].text, "Deux\nlignes");
    }

    #[test]
    fn test_parse_csv_skips_blank_lines_and_bom() {
        let csv = "\u{feff}date,source,avis\n\n2023-10-01,Google,Top\n\n";
        let reviews = parse_csv(csv, &path()).unwrap();
        assert_eq!(reviews.len(), 1);
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let err = parse_csv("date,avis\n2023-10-01,Top\n", &path()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { ref column, .. } if column == "source"));
    }

    #[test]
    fn test_parse_csv_bad_date_reports_line() {
        let csv = "date,source,avis\n2023-10-01,Google,Top\nhier,Google,Bof\n";
        let err = parse_csv(csv, &path()).unwrap_err();
        match err {
            DatasetError::Row { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("hier"));
            }
            other => panic!("Expected row error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_csv_short_row() {
        let err = parse_csv("date,source,avis\n2023-10-01,Google\n", &path()).unwrap_err();
        assert!(matches!(err, DatasetError::Row { line: 2, .. }));
    }

    #[test]
    fn test_parse_date_formats() {
        let oct_2 = NaiveDate::from_ymd_opt(2023, 10, 2).unwrap();
        assert_eq!(parse_date("2023-10-02"), Some(oct_2));
        assert_eq!(parse_date("02/10/2023"), Some(oct_2));
        assert_eq!(parse_date("02-10-2023"), Some(oct_2));
        assert_eq!(parse_date("2023-10-02 18:30:00"), Some(oct_2));
        assert_eq!(parse_date("2023-10-02T18:30:00+02:00"), Some(oct_2));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_sample() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = Dataset::load(&dir.path().join("absent.csv")).unwrap();
        assert_eq!(dataset.origin(), &DatasetOrigin::Sample);
        assert_eq!(dataset.len(), 4);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("avis.csv");
        std::fs::write(&file, "date,source,avis\n2023-10-01,Google,Top\n").unwrap();

        let dataset = Dataset::load(&file).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.origin(), &DatasetOrigin::File(file));
    }
}
