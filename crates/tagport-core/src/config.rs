//! Centralized configuration for the migration engine.
//!
//! Provides constant groups for the Front and Gmail API clients, network
//! tuning, and report output, plus the per-run `RunConfig` supplied by the
//! host application.

use crate::error::{Result, TagportError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Front API configuration.
pub struct FrontApi;

impl FrontApi {
    pub const API_BASE: &'static str = "https://api2.frontapp.com";
    /// Conversations per page for cursor pagination.
    pub const PAGE_SIZE: u32 = 100;
    /// Maximum concurrent outbound calls to Front.
    pub const MAX_IN_FLIGHT: usize = 2;
}

/// Gmail API configuration.
pub struct GmailApi;

impl GmailApi {
    pub const API_BASE: &'static str = "https://gmail.googleapis.com/gmail/v1";
    /// Maximum concurrent outbound calls to Gmail.
    pub const MAX_IN_FLIGHT: usize = 5;
    /// Provider maximum for `messages.batchModify` identifier lists.
    pub const BATCH_MODIFY_MAX_IDS: usize = 1000;
    /// Requested result cap for the exact-match identity lookup. Two, so a
    /// duplicate Message-ID shows up in the report's result count.
    pub const LOOKUP_MAX_RESULTS: u32 = 2;
}

/// Network-related tuning shared by both clients.
pub struct NetworkTuning;

impl NetworkTuning {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
    pub const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);
    /// Pause inserted between item batches, skipped after the last batch.
    pub const INTER_BATCH_PAUSE: Duration = Duration::from_secs(1);
}

/// Report output configuration.
pub struct ReportConfig;

impl ReportConfig {
    pub const FILE_PREFIX: &'static str = "migration-report-";
    pub const LABEL_SEPARATOR: &'static str = ";";
    pub const EMPTY_SUBJECT_PLACEHOLDER: &'static str = "(no subject)";
}

/// Execution mode for a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Full decision pipeline, no mutating call permitted.
    DryRun,
    /// Mutations applied to the target account.
    Live,
}

impl RunMode {
    pub fn is_read_only(&self) -> bool {
        matches!(self, RunMode::DryRun)
    }
}

/// Per-run settings supplied by the host application's config loader.
///
/// Defaults are deliberately conservative: a run that omits every field is
/// a dry run over all conversations with batches of 10.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of items processed between pauses. Must be at least 1.
    pub batch_size: usize,
    /// When true, no mutating Gmail call is permitted.
    pub dry_run: bool,
    /// Minimum log verbosity, fed to the host's tracing filter.
    pub log_level: String,
    /// Restrict the run to a single Front inbox.
    pub inbox_id: Option<String>,
    /// Skip conversations already archived in Front.
    pub skip_archived: bool,
    /// Directory the per-run report file is written into.
    pub report_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            dry_run: true,
            log_level: "info".to_string(),
            inbox_id: None,
            skip_archived: false,
            report_dir: PathBuf::from("."),
        }
    }
}

impl RunConfig {
    /// Validate the configuration before a run starts.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TagportError::Config {
                message: "batch_size must be at least 1".to_string(),
            });
        }
        if self.log_level.trim().is_empty() {
            return Err(TagportError::Config {
                message: "log_level must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// The execution mode implied by the dry-run flag.
    pub fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        }
    }
}
