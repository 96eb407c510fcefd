//! Front API client.
//!
//! Paginated, rate-limited reader of conversations, tags, and inboxes.
//! Knows nothing about the target system: it produces `SourceItem`s in
//! provider order and leaves all interpretation to the mapper.

use crate::config::FrontApi;
use crate::error::{Result, TagportError};
use crate::front::types::{Paginated, SourceInbox, SourceItem, SourceMessage, SourceTag};
use crate::network::{retry_async, HttpClient, RetryConfig};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Client for the Front conversation API.
///
/// Clones share the same admission limiter, so concurrent message fetches
/// spawned by `list_all` stay inside the cap of
/// [`FrontApi::MAX_IN_FLIGHT`] outbound calls.
#[derive(Clone)]
pub struct FrontClient {
    http: HttpClient,
    retry: RetryConfig,
    base_url: String,
}

impl FrontClient {
    /// Create a client from an API token supplied by the credential
    /// collaborator. Fails fast when no token was provided.
    pub fn new(api_token: &str) -> Result<Self> {
        let token = api_token.trim();
        if token.is_empty() {
            return Err(TagportError::MissingCredentials {
                service: "Front".to_string(),
            });
        }

        Ok(Self {
            http: HttpClient::new("Front", token, FrontApi::MAX_IN_FLIGHT)?,
            retry: RetryConfig::default(),
            base_url: FrontApi::API_BASE.to_string(),
        })
    }

    /// Fetch every conversation, optionally restricted to one inbox,
    /// following the pagination cursor until the provider reports no
    /// further pages. Each item's messages are attached before returning,
    /// so callers receive the complete snapshot in provider order.
    pub async fn list_all(&self, inbox: Option<&str>) -> Result<Vec<SourceItem>> {
        let first_page = match inbox {
            Some(id) => format!(
                "{}/inboxes/{}/conversations?limit={}",
                self.base_url,
                id,
                FrontApi::PAGE_SIZE
            ),
            None => format!(
                "{}/conversations?limit={}",
                self.base_url,
                FrontApi::PAGE_SIZE
            ),
        };

        let mut items = Vec::new();
        let mut next = Some(first_page);
        while let Some(url) = next {
            let page: Paginated<SourceItem> = self.get_json(&url).await?;
            debug!("Fetched page of {} conversations", page.results.len());
            next = page.pagination.next;
            items.extend(page.results);
        }

        info!("Fetched {} conversations from Front", items.len());
        self.attach_messages(&mut items).await?;
        Ok(items)
    }

    /// List all inboxes. Not paginated.
    pub async fn list_inboxes(&self) -> Result<Vec<SourceInbox>> {
        let url = format!("{}/inboxes", self.base_url);
        let page: Paginated<SourceInbox> = self.get_json(&url).await?;
        Ok(page.results)
    }

    /// List the tag taxonomy. Not paginated.
    pub async fn list_tags(&self) -> Result<Vec<SourceTag>> {
        let url = format!("{}/tags", self.base_url);
        let page: Paginated<SourceTag> = self.get_json(&url).await?;
        Ok(page.results)
    }

    /// Fetch the message list for every conversation.
    ///
    /// Fetches run concurrently up to the admission limit; results are
    /// joined in conversation order so item order never changes.
    async fn attach_messages(&self, items: &mut [SourceItem]) -> Result<()> {
        let mut handles = Vec::with_capacity(items.len());
        for item in items.iter() {
            let client = self.clone();
            let url = format!("{}/conversations/{}/messages", self.base_url, item.id);
            handles.push(tokio::spawn(async move {
                client.get_json::<Paginated<SourceMessage>>(&url).await
            }));
        }

        for (item, handle) in items.iter_mut().zip(handles) {
            let page = handle.await.map_err(|e| TagportError::Network {
                message: format!("Message fetch task failed: {}", e),
                cause: None,
            })??;
            item.messages = page.results;
        }

        Ok(())
    }

    /// GET a JSON resource with the shared retry policy applied.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let (result, stats) = retry_async(
            &self.retry,
            || self.fetch_once(url),
            TagportError::is_retryable,
        )
        .await;

        if stats.attempts > 1 && stats.success {
            debug!(
                "Front request succeeded after {} attempts ({:?} backoff)",
                stats.attempts, stats.total_delay
            );
        }

        result
    }

    async fn fetch_once<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).await?;
        let status = response.status();

        // Credential rejection is not retryable; surface it as a distinct
        // error so the run can stop instead of exhausting attempts.
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TagportError::SourceAuth {
                message: format!("Front rejected the API token ({})", status),
            });
        }

        if !status.is_success() {
            return Err(TagportError::Api {
                service: "Front".to_string(),
                message: format!("Front API returned {}", status),
                status_code: Some(status.as_u16()),
            });
        }

        response.json::<T>().await.map_err(|e| TagportError::Json {
            message: format!("Failed to decode Front response: {}", e),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkTuning;

    #[test]
    fn test_empty_token_fails_fast() {
        let err = FrontClient::new("   ").unwrap_err();
        assert!(matches!(err, TagportError::MissingCredentials { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_retry_defaults_match_contract() {
        let client = FrontClient::new("tok_test").unwrap();
        assert_eq!(client.retry.max_attempts, NetworkTuning::MAX_ATTEMPTS);
        assert_eq!(client.retry.base_delay, NetworkTuning::RETRY_BASE_DELAY);
        assert!(client.retry.jitter);
    }
}
