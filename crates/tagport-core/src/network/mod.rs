//! Network utilities shared by the Front and Gmail clients.
//!
//! This module provides:
//! - Retry logic with exponential backoff and jitter
//! - An admission-limited HTTP client wrapper

mod client;
mod retry;

pub use client::HttpClient;
pub use retry::{retry_async, RetryConfig, RetryStats};
