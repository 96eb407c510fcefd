//! Per-run audit report.
//!
//! Accumulates one row per item in processing order and serializes the
//! trail to a CSV file at the end of the run. Every field is quoted with
//! internal quotes doubled; multi-valued label fields are joined with a
//! semicolon. A write failure is logged and never fails the run, since the
//! in-memory rows and counters are already complete by then.

use crate::config::ReportConfig;
use crate::error::{Result, TagportError};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::PathBuf;

/// How a target-side identity was established for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    /// Exact RFC 5322 Message-ID match.
    MessageId,
    /// No match was made.
    None,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::MessageId => "message-id",
            MatchMethod::None => "none",
        }
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal outcome recorded for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Applied,
    DryRun,
    Skipped,
    NoMatch,
    Failed,
}

impl RowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowAction::Applied => "applied",
            RowAction::DryRun => "dry_run",
            RowAction::Skipped => "skipped",
            RowAction::NoMatch => "no_match",
            RowAction::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of the audit trail. Append-only, one per item per run.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub source_id: String,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
    pub archived: bool,
    pub match_method: MatchMethod,
    pub result_count: usize,
    pub gmail_message_id: Option<String>,
    pub gmail_thread_id: Option<String>,
    pub labels_added: Vec<String>,
    pub labels_removed: Vec<String>,
    pub action: RowAction,
    pub reason: Option<String>,
}

impl ReportRow {
    fn fields(&self) -> [String; 12] {
        [
            self.source_id.clone(),
            self.subject
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| ReportConfig::EMPTY_SUBJECT_PLACEHOLDER.to_string()),
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.archived.to_string(),
            self.match_method.to_string(),
            self.result_count.to_string(),
            self.gmail_message_id.clone().unwrap_or_default(),
            self.gmail_thread_id.clone().unwrap_or_default(),
            self.labels_added.join(ReportConfig::LABEL_SEPARATOR),
            self.labels_removed.join(ReportConfig::LABEL_SEPARATOR),
            self.action.to_string(),
            self.reason.clone().unwrap_or_default(),
        ]
    }
}

/// Aggregate counters for one run. Mutated only by the orchestrator's
/// control loop.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub total: u64,
    pub processed: u64,
    pub matched: u64,
    pub labeled: u64,
    pub archived: u64,
    pub inbox: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl RunStats {
    /// Fold one finished row into the counters.
    pub fn record(&mut self, row: &ReportRow) {
        self.processed += 1;
        match row.action {
            RowAction::Applied => {
                self.matched += 1;
                self.labeled += 1;
                if row.archived {
                    self.archived += 1;
                } else {
                    self.inbox += 1;
                }
            }
            RowAction::DryRun => self.matched += 1,
            RowAction::Skipped => self.skipped += 1,
            RowAction::NoMatch => {}
            RowAction::Failed => self.failed += 1,
        }
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total={} processed={} matched={} labeled={} archived={} inbox={} skipped={} failed={}",
            self.total,
            self.processed,
            self.matched,
            self.labeled,
            self.archived,
            self.inbox,
            self.skipped,
            self.failed
        )
    }
}

const HEADER: [&str; 12] = [
    "source_id",
    "subject",
    "created_at",
    "archived",
    "match_method",
    "result_count",
    "gmail_message_id",
    "gmail_thread_id",
    "labels_added",
    "labels_removed",
    "action",
    "reason",
];

/// Serializes the decision trail to a timestamped CSV file.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write one report file for this run and return its path.
    pub fn write(&self, rows: &[ReportRow]) -> Result<PathBuf> {
        self.write_at(rows, Utc::now())
    }

    fn write_at(&self, rows: &[ReportRow], now: DateTime<Utc>) -> Result<PathBuf> {
        let path = self.dir.join(report_filename(now));

        let mut out = String::new();
        out.push_str(&csv_line(HEADER.iter().map(|s| (*s).to_string())));
        for row in rows {
            out.push_str(&csv_line(row.fields().into_iter()));
        }

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| TagportError::io_with_path(e, &self.dir))?;
        std::fs::write(&path, out).map_err(|e| TagportError::io_with_path(e, &path))?;

        Ok(path)
    }
}

/// Filesystem-safe report filename: the fixed prefix plus an ISO-8601
/// timestamp with colons and periods replaced by hyphens.
pub(crate) fn report_filename(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}{}.csv", ReportConfig::FILE_PREFIX, stamp)
}

fn csv_line(fields: impl Iterator<Item = String>) -> String {
    let mut line = fields.map(|f| csv_field(&f)).collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

/// Quote one CSV field, doubling any internal quotes.
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
