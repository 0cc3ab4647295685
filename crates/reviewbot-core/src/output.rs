//! Machine-readable export of a dashboard view.
//!
//! JSON writes one document with the KPIs, the distribution and every row;
//! JSONL writes one row per line so large exports can be streamed into other
//! tools.

use serde::Serialize;
use std::io::{self, Write};

use crate::report::{DashboardView, Kpis, ReviewRow};
use crate::types::Locale;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON document
    Json,
    /// One JSON object per row (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// A row as exported, with the sentiment rendered in the display locale.
#[derive(Debug, Serialize)]
pub struct RowRecord<'a> {
    pub date: String,
    pub source: &'a str,
    pub text: &'a str,
    pub sentiment: &'static str,
    pub score: u8,
}

impl<'a> RowRecord<'a> {
    pub fn new(row: &'a ReviewRow, locale: Locale) -> Self {
        Self {
            date: row.date.to_string(),
            source: &row.source,
            text: &row.text,
            sentiment: row.sentiment.label(locale),
            score: row.score,
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    kpis: &'a Kpis,
    distribution: Vec<DistributionRecord>,
    rows: Vec<RowRecord<'a>>,
}

#[derive(Serialize)]
struct DistributionRecord {
    sentiment: &'static str,
    count: usize,
}

/// Serializes dashboard views to a writer.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    locale: Locale,
    pretty: bool,
    rows_written: usize,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, locale: Locale, pretty: bool) -> Self {
        Self {
            writer,
            format,
            locale,
            pretty,
            rows_written: 0,
        }
    }

    pub fn write_view(&mut self, view: &DashboardView) -> io::Result<()> {
        let rows: Vec<RowRecord<'_>> = view
            .rows()
            .iter()
            .map(|row| RowRecord::new(row, self.locale))
            .collect();

        match self.format {
            OutputFormat::Json => {
                let document = ReportDocument {
                    kpis: view.kpis(),
                    distribution: view
                        .distribution()
                        .iter()
                        .map(|&(s, count)| DistributionRecord {
                            sentiment: s.label(self.locale),
                            count,
                        })
                        .collect(),
                    rows,
                };
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, &document)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, &document).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.rows_written += document.rows.len();
            }
            OutputFormat::JsonLines => {
                for record in &rows {
                    serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
                    writeln!(self.writer)?;
                    self.rows_written += 1;
                }
            }
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
