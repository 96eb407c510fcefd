//! End-to-end migration orchestrator.
//!
//! Drives fetch, mapping, label reconciliation, batched per-item
//! processing, and the audit report. A single control flow processes
//! items strictly in source order; concurrency lives only inside the
//! clients' admission limiters. Per-item failures become `failed` report
//! rows; authentication failures and write-guard violations abort the run
//! after the accumulated rows are flushed.

use crate::config::{NetworkTuning, RunConfig, RunMode};
use crate::error::{Result, TagportError};
use crate::front::FrontClient;
use crate::gmail::{GmailClient, GmailMutator};
use crate::mapper::{self, MigrationItem, STATUS_ARCHIVED_LABEL, STATUS_INBOX_LABEL};
use crate::report::{MatchMethod, ReportRow, ReportWriter, RowAction, RunStats};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One-way, best-effort channel for streaming run counters to a console
/// or UI. Never a control input.
pub type ProgressSink = Arc<dyn Fn(&RunStats) + Send + Sync>;

/// Everything a finished (or aborted) run leaves behind.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub stats: RunStats,
    pub rows: Vec<ReportRow>,
    /// Where the CSV trail landed, `None` when persisting it failed.
    pub report_path: Option<PathBuf>,
}

/// Sequences one bounded migration run over a snapshot of Front data.
pub struct Migrator {
    front: FrontClient,
    gmail: GmailClient,
    config: RunConfig,
    progress: Option<ProgressSink>,
}

impl Migrator {
    pub fn new(front: FrontClient, gmail: GmailClient, config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            front,
            gmail,
            config,
            progress: None,
        })
    }

    /// Attach a progress sink invoked after every processed item.
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Execute the run. The report is flushed even when the run aborts,
    /// so partial progress stays auditable.
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        info!(
            "Starting migration run {} ({})",
            run_id,
            match self.config.mode() {
                RunMode::DryRun => "dry run",
                RunMode::Live => "live",
            }
        );

        let mut rows = Vec::new();
        let mut stats = RunStats::default();
        let outcome = self.run_inner(&mut rows, &mut stats).await;

        if let Err(e) = &outcome {
            warn!("Run {} aborted: {}", run_id, e);
        }

        let report_path = match ReportWriter::new(&self.config.report_dir).write(&rows) {
            Ok(path) => {
                info!("Report written to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to write report: {}", e);
                None
            }
        };

        info!("Run {} finished: {}", run_id, stats);
        outcome?;

        Ok(RunReport {
            run_id,
            stats,
            rows,
            report_path,
        })
    }

    async fn run_inner(&self, rows: &mut Vec<ReportRow>, stats: &mut RunStats) -> Result<()> {
        let conversations = self.front.list_all(self.config.inbox_id.as_deref()).await?;
        let items: Vec<MigrationItem> = conversations.iter().map(mapper::map_item).collect();
        stats.total = items.len() as u64;

        let union = label_union(&items);
        let mutator = match self.config.mode() {
            RunMode::Live => Some(self.reconcile_labels(&union).await?),
            RunMode::DryRun => {
                info!(
                    "Dry run: {} label names in use: {}",
                    union.len(),
                    union.join(", ")
                );
                None
            }
        };

        let batches = partition(&items, self.config.batch_size);
        let batch_count = batches.len();
        for (index, batch) in batches.iter().enumerate() {
            debug!(
                "Processing batch {}/{} ({} items)",
                index + 1,
                batch_count,
                batch.len()
            );

            for item in batch {
                let row = match self.process_item(item, mutator.as_ref()).await {
                    Ok(row) => row,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!("Item {} failed: {}", item.source_id, e);
                        failed_row(item, &e)
                    }
                };
                stats.record(&row);
                rows.push(row);
                if let Some(sink) = &self.progress {
                    sink(stats);
                }
            }

            if index + 1 < batch_count {
                tokio::time::sleep(NetworkTuning::INTER_BATCH_PAUSE).await;
            }
        }

        Ok(())
    }

    /// Make sure every label any item can need already has a resolvable
    /// identifier before the first item is processed.
    async fn reconcile_labels(&self, union: &[String]) -> Result<GmailMutator> {
        let mutator = self.gmail.mutator()?;
        let resolved = mutator.ensure_labels(union).await?;
        debug!("Label cache primed with {} entries", resolved.len());
        Ok(mutator)
    }

    /// Per-item state machine, terminal on the first matching state.
    async fn process_item(
        &self,
        item: &MigrationItem,
        mutator: Option<&GmailMutator>,
    ) -> Result<ReportRow> {
        let Some(message_id) = item.message_id.as_deref() else {
            debug!("Skipping {}: no cross-system identifier", item.source_id);
            return Ok(skipped_row(item, "missing identifier"));
        };

        if item.archived && self.config.skip_archived {
            debug!("Skipping {}: archived", item.source_id);
            return Ok(skipped_row(item, "archived"));
        }

        let lookup = self.gmail.find_by_message_id(message_id).await?;
        let Some(matched) = lookup.matched else {
            debug!("No Gmail match for {}", item.source_id);
            return Ok(no_match_row(item, lookup.result_count));
        };

        let (labels_added, labels_removed) = plan_labels(item);
        let mut row = row_for(item);
        row.match_method = MatchMethod::MessageId;
        row.result_count = lookup.result_count;
        row.gmail_message_id = Some(matched.message_id.clone());
        row.gmail_thread_id = Some(matched.thread_id.clone());

        match mutator {
            None => {
                row.labels_added = labels_added;
                row.labels_removed = labels_removed;
                row.action = RowAction::DryRun;
            }
            Some(m) => {
                let add_ids = self.resolve_ids(&labels_added).await;
                let remove_ids = self.resolve_ids(&labels_removed).await;
                m.modify_thread(&matched.thread_id, &add_ids, &remove_ids)
                    .await?;
                row.labels_added = labels_added;
                row.labels_removed = labels_removed;
                row.action = RowAction::Applied;
            }
        }

        Ok(row)
    }

    /// Resolve label names to identifiers via the pre-populated cache.
    /// A name absent from the cache is logged and skipped; reconciliation
    /// running first means this does not happen in practice.
    async fn resolve_ids(&self, names: &[String]) -> Vec<String> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            match self.gmail.cached_label_id(name).await {
                Some(id) => ids.push(id),
                None => warn!("Label {} missing from cache, skipping", name),
            }
        }
        ids
    }
}

/// The label-name sets a matched item adds and removes: its sanitized
/// tags plus the status label matching its archive flag, with the
/// opposite status label removed.
pub(crate) fn plan_labels(item: &MigrationItem) -> (Vec<String>, Vec<String>) {
    let (status_add, status_remove) = if item.archived {
        (STATUS_ARCHIVED_LABEL, STATUS_INBOX_LABEL)
    } else {
        (STATUS_INBOX_LABEL, STATUS_ARCHIVED_LABEL)
    };

    let mut add = item.labels.clone();
    add.push(status_add.to_string());
    (add, vec![status_remove.to_string()])
}

/// Union of every item's label names plus both status labels, first-seen
/// order, case-insensitively deduplicated.
pub(crate) fn label_union(items: &[MigrationItem]) -> Vec<String> {
    let mut union = vec![
        STATUS_ARCHIVED_LABEL.to_string(),
        STATUS_INBOX_LABEL.to_string(),
    ];
    let mut seen: HashSet<String> = union.iter().map(|name| name.to_lowercase()).collect();

    for item in items {
        for label in &item.labels {
            if seen.insert(label.to_lowercase()) {
                union.push(label.clone());
            }
        }
    }

    union
}

/// Split items into fixed-size groups, preserving order. A size below 1
/// is clamped to 1.
pub(crate) fn partition<T: Clone>(items: &[T], batch_size: usize) -> Vec<Vec<T>> {
    let size = batch_size.max(1);
    items.chunks(size).map(<[T]>::to_vec).collect()
}

fn row_for(item: &MigrationItem) -> ReportRow {
    ReportRow {
        source_id: item.source_id.clone(),
        subject: item.subject.clone(),
        created_at: item.created_at,
        archived: item.archived,
        match_method: MatchMethod::None,
        result_count: 0,
        gmail_message_id: None,
        gmail_thread_id: None,
        labels_added: Vec::new(),
        labels_removed: Vec::new(),
        action: RowAction::Skipped,
        reason: None,
    }
}

fn skipped_row(item: &MigrationItem, reason: &str) -> ReportRow {
    let mut row = row_for(item);
    row.action = RowAction::Skipped;
    row.reason = Some(reason.to_string());
    row
}

fn no_match_row(item: &MigrationItem, result_count: usize) -> ReportRow {
    let mut row = row_for(item);
    row.action = RowAction::NoMatch;
    row.result_count = result_count;
    row
}

fn failed_row(item: &MigrationItem, err: &TagportError) -> ReportRow {
    let mut row = row_for(item);
    row.action = RowAction::Failed;
    row.reason = Some(err.to_string());
    row
}
