//! Gmail (target system) integration.
//!
//! This module provides:
//! - The read-only client and the separately-acquired mutating capability
//! - The instance-owned label name cache
//! - Wire types for labels, lookups, and modify requests

mod client;
mod labels;
mod types;

pub use client::{GmailClient, GmailMutator};
pub use labels::LabelCache;
pub use types::{
    ApiErrorBody, Label, LabelKind, LabelList, MessageLookup, MessageQuery, MessageRef,
    NewLabel, ThreadMatch,
};
