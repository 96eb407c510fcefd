//! Gmail API client.
//!
//! Read and write access are separate capabilities. `GmailClient` carries
//! only non-mutating operations; every mutating operation lives on
//! `GmailMutator`, which can be obtained solely through
//! [`GmailClient::mutator`]. In read-only mode that acquisition fails with
//! the distinct `WriteBlocked` error, so a dry run cannot mutate by
//! construction rather than by convention.

use crate::config::{GmailApi, RunMode};
use crate::error::{Result, TagportError};
use crate::gmail::labels::LabelCache;
use crate::gmail::types::{
    ApiErrorBody, BatchModify, Label, LabelList, MessageLookup, MessageQuery, NewLabel,
    ThreadMatch, ThreadModify,
};
use crate::network::{retry_async, HttpClient, RetryConfig};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Gmail reason codes that signal throttling rather than denial. The
/// provider reports these on 403 responses, so status alone cannot
/// distinguish a rate limit from a revoked grant.
const RATE_LIMIT_REASONS: [&str; 3] = [
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "quotaExceeded",
];

struct GmailShared {
    http: HttpClient,
    retry: RetryConfig,
    base_url: String,
    cache: LabelCache,
}

/// Read-only capability for the Gmail account.
#[derive(Clone)]
pub struct GmailClient {
    shared: Arc<GmailShared>,
    mode: RunMode,
}

/// Mutating capability for the Gmail account.
///
/// Exists only for live runs; see [`GmailClient::mutator`].
#[derive(Clone)]
pub struct GmailMutator {
    shared: Arc<GmailShared>,
}

impl GmailClient {
    /// Create a client from an OAuth access token supplied by the
    /// credential collaborator. Fails fast when no token was provided.
    pub fn connect(access_token: &str, mode: RunMode) -> Result<Self> {
        let token = access_token.trim();
        if token.is_empty() {
            return Err(TagportError::MissingCredentials {
                service: "Gmail".to_string(),
            });
        }

        Ok(Self {
            shared: Arc::new(GmailShared {
                http: HttpClient::new("Gmail", token, GmailApi::MAX_IN_FLIGHT)?,
                retry: RetryConfig::default(),
                base_url: GmailApi::API_BASE.to_string(),
                cache: LabelCache::new(),
            }),
            mode,
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.mode.is_read_only()
    }

    /// Acquire the mutating capability.
    ///
    /// In read-only mode this raises `WriteBlocked` on every attempt; it
    /// never silently degrades to a no-op.
    pub fn mutator(&self) -> Result<GmailMutator> {
        if self.mode.is_read_only() {
            return Err(TagportError::WriteBlocked {
                operation: "acquire mutating capability".to_string(),
            });
        }
        Ok(GmailMutator {
            shared: self.shared.clone(),
        })
    }

    /// List the account's labels and refresh the name cache.
    pub async fn list_labels(&self) -> Result<Vec<Label>> {
        self.shared.list_labels().await
    }

    /// Resolve a cached label identifier by name, case-insensitively.
    pub async fn cached_label_id(&self, name: &str) -> Option<String> {
        self.shared.cache.id_of(name).await
    }

    /// Exact-match lookup of a message by its RFC 5322 Message-ID.
    ///
    /// This is the only cross-system correlation the engine performs; no
    /// subject or participant heuristics are ever applied.
    pub async fn find_by_message_id(&self, message_id: &str) -> Result<MessageLookup> {
        let query = format!("rfc822msgid:{}", message_id);
        let url = format!(
            "{}/users/me/messages?q={}&maxResults={}",
            self.shared.base_url,
            urlencoding::encode(&query),
            GmailApi::LOOKUP_MAX_RESULTS
        );

        let response: MessageQuery = self.shared.get_json(&url).await?;
        let result_count = response
            .result_size_estimate
            .map(|estimate| estimate as usize)
            .unwrap_or(response.messages.len());
        let matched = response.messages.into_iter().next().map(|m| ThreadMatch {
            message_id: m.id,
            thread_id: m.thread_id,
        });

        Ok(MessageLookup {
            result_count,
            matched,
        })
    }
}

impl GmailMutator {
    /// Return the label with the given name, creating it if necessary.
    ///
    /// Idempotent: when creation conflicts because another actor created
    /// the label first, the taxonomy is re-listed and the existing entry
    /// returned. Two calls with the same name never produce two labels.
    pub async fn ensure_label(&self, name: &str) -> Result<Label> {
        if let Some(label) = self.shared.cache.get(name).await {
            return Ok(label);
        }

        let url = format!("{}/users/me/labels", self.shared.base_url);
        match self
            .shared
            .post_json::<_, Label>(&url, &NewLabel::visible(name))
            .await
        {
            Ok(label) => {
                debug!("Created label {} ({})", label.name, label.id);
                self.shared.cache.insert(label.clone()).await;
                Ok(label)
            }
            Err(e) if is_conflict(&e) => {
                debug!("Label {} created concurrently, re-listing", name);
                self.shared.list_labels().await?;
                self.shared
                    .cache
                    .get(name)
                    .await
                    .ok_or_else(|| TagportError::LabelNotFound {
                        name: name.to_string(),
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Ensure every name resolves to a label, returning the name-to-id
    /// mapping. Must run before any mutation that references the names.
    pub async fn ensure_labels(&self, names: &[String]) -> Result<HashMap<String, String>> {
        if self.shared.cache.is_empty().await {
            self.shared.list_labels().await?;
        }

        let mut resolved = HashMap::with_capacity(names.len());
        for name in names {
            let label = self.ensure_label(name).await?;
            resolved.insert(name.clone(), label.id);
        }

        info!("Reconciled {} labels", resolved.len());
        Ok(resolved)
    }

    /// Apply label changes to a whole conversation thread, so every
    /// message in the thread is labeled consistently.
    pub async fn modify_thread(
        &self,
        thread_id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> Result<()> {
        let url = format!("{}/users/me/threads/{}/modify", self.shared.base_url, thread_id);
        self.shared
            .post_unit(
                &url,
                &ThreadModify {
                    add_label_ids,
                    remove_label_ids,
                },
            )
            .await
    }

    /// Apply label changes to a list of messages, chunked to the provider
    /// maximum of [`GmailApi::BATCH_MODIFY_MAX_IDS`] per call.
    pub async fn batch_modify(
        &self,
        ids: &[String],
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> Result<()> {
        let url = format!("{}/users/me/messages/batchModify", self.shared.base_url);
        for chunk in ids.chunks(GmailApi::BATCH_MODIFY_MAX_IDS) {
            self.shared
                .post_unit(
                    &url,
                    &BatchModify {
                        ids: chunk,
                        add_label_ids,
                        remove_label_ids,
                    },
                )
                .await?;
        }
        Ok(())
    }
}

impl GmailShared {
    async fn list_labels(&self) -> Result<Vec<Label>> {
        let url = format!("{}/users/me/labels", self.base_url);
        let list: LabelList = self.get_json(&url).await?;
        debug!("Listed {} Gmail labels", list.labels.len());
        self.cache.replace_all(list.labels.clone()).await;
        Ok(list.labels)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let (result, stats) = retry_async(
            &self.retry,
            || async move {
                let response = self.http.get(url).await?;
                decode(response).await
            },
            TagportError::is_retryable,
        )
        .await;

        if stats.attempts > 1 && stats.success {
            debug!(
                "Gmail request succeeded after {} attempts ({:?} backoff)",
                stats.attempts, stats.total_delay
            );
        }

        result
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let (result, _stats) = retry_async(
            &self.retry,
            || async move {
                let response = self.http.post_json(url, body).await?;
                decode(response).await
            },
            TagportError::is_retryable,
        )
        .await;
        result
    }

    /// POST where the response body is irrelevant (modify endpoints).
    async fn post_unit<B: Serialize>(&self, url: &str, body: &B) -> Result<()> {
        let (result, _stats) = retry_async(
            &self.retry,
            || async move {
                let response = self.http.post_json(url, body).await?;
                let status = response.status();
                if status.is_success() {
                    return Ok(());
                }
                let text = response.text().await.unwrap_or_default();
                Err(classify_failure(status, &text))
            },
            TagportError::is_retryable,
        )
        .await;
        result
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(|e| TagportError::Json {
            message: format!("Failed to decode Gmail response: {}", e),
            source: None,
        });
    }

    let text = response.text().await.unwrap_or_default();
    Err(classify_failure(status, &text))
}

/// Classify a non-2xx Gmail response.
///
/// 403 responses carrying a throttling reason code are rate limits and
/// retryable; all other 401/403 responses are authentication failures and
/// must never be retried.
fn classify_failure(status: StatusCode, body: &str) -> TagportError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();

    if parsed
        .reasons()
        .iter()
        .any(|reason| RATE_LIMIT_REASONS.contains(reason))
    {
        return TagportError::RateLimited {
            service: "Gmail".to_string(),
            retry_after_secs: None,
        };
    }

    let detail = parsed
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Gmail API returned {}", status));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TagportError::TargetAuth { message: detail }
        }
        _ => {
            if status.is_server_error() {
                warn!("Gmail server error {}: {}", status, detail);
            }
            TagportError::Api {
                service: "Gmail".to_string(),
                message: detail,
                status_code: Some(status.as_u16()),
            }
        }
    }
}

fn is_conflict(err: &TagportError) -> bool {
    matches!(
        err,
        TagportError::Api {
            status_code: Some(409),
            ..
        }
    )
}
