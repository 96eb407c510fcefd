//! Tagport - headless migration engine for Front-to-Gmail metadata.
//!
//! Migrates organizational metadata (tags and archive status) from Front
//! conversations onto Gmail threads using exact RFC 5322 Message-ID
//! matching. Each invocation is one bounded batch job over a snapshot of
//! the source data: conversations are fetched page by page, normalized
//! into migration items, correlated against Gmail by identifier, and
//! labeled at thread granularity, with a CSV audit trail of every
//! decision. Runs default to dry-run, in which the full decision pipeline
//! executes but the mutating Gmail capability cannot even be acquired.
//!
//! The engine is a library by design: the desktop shell, credential
//! capture, OAuth exchange, and terminal chrome live in the host
//! application, which hands in tokens and a `RunConfig` and receives a
//! `RunReport`.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tagport::{FrontClient, GmailClient, Migrator, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> tagport::Result<()> {
//!     let config = RunConfig::default(); // dry run
//!     let front = FrontClient::new(&front_token)?;
//!     let gmail = GmailClient::connect(&gmail_token, config.mode())?;
//!
//!     let report = Migrator::new(front, gmail, config)?
//!         .with_progress(Arc::new(|stats| eprintln!("{stats}")))
//!         .run()
//!         .await?;
//!
//!     println!("{} rows -> {:?}", report.rows.len(), report.report_path);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod front;
pub mod gmail;
pub mod mapper;
pub mod migrator;
pub mod network;
pub mod report;

// Re-export commonly used types
pub use config::{RunConfig, RunMode};
pub use error::{Result, TagportError};
pub use front::{
    FrontClient, Recipient, SourceInbox, SourceItem, SourceMessage, SourceStatus, SourceTag,
};
pub use gmail::{GmailClient, GmailMutator, Label, LabelKind, MessageLookup, ThreadMatch};
pub use mapper::{
    map_item, sanitize_label, MigrationItem, LABEL_NAMESPACE, STATUS_ARCHIVED_LABEL,
    STATUS_INBOX_LABEL,
};
pub use migrator::{Migrator, ProgressSink, RunReport};
pub use report::{MatchMethod, ReportRow, ReportWriter, RowAction, RunStats};
