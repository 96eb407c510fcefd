//! Front (source system) integration.
//!
//! This module provides:
//! - The paginated, rate-limited conversation reader
//! - Wire types for conversations, tags, messages, and inboxes

mod client;
mod types;

pub use client::FrontClient;
pub use types::{
    PageCursor, Paginated, Recipient, SourceInbox, SourceItem, SourceMessage, SourceStatus,
    SourceTag,
};
