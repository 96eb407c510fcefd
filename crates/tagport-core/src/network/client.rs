//! HTTP client with admission limiting.
//!
//! Thin wrapper around reqwest that owns each remote service's concurrency
//! budget. Every outbound call acquires a semaphore permit first, so no
//! matter how callers overlap, at most `max_in_flight` requests are on the
//! wire per service. Rate-limit responses are converted into a distinct
//! error carrying the provider's `Retry-After` hint.

use crate::config::NetworkTuning;
use crate::error::{Result, TagportError};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;

/// Admission-limited HTTP client bound to one remote service.
///
/// Cloning is cheap and clones share the same permit pool, so spawned
/// tasks stay inside the service's concurrency budget.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    limiter: Arc<Semaphore>,
    service: &'static str,
    bearer: String,
}

impl HttpClient {
    /// Create a client for `service` with the given concurrency cap.
    pub fn new(service: &'static str, bearer: impl Into<String>, max_in_flight: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(NetworkTuning::REQUEST_TIMEOUT)
            .user_agent(concat!("tagport/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TagportError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            limiter: Arc::new(Semaphore::new(max_in_flight)),
            service,
            bearer: bearer.into(),
        })
    }

    /// The remote service this client talks to.
    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Make a GET request.
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.send(self.client.get(url)).await
    }

    /// Make a POST request with a JSON body.
    pub async fn post_json<T: serde::Serialize>(&self, url: &str, body: &T) -> Result<Response> {
        self.send(self.client.post(url).json(body)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| TagportError::Network {
                message: format!("{} admission limiter closed", self.service),
                cause: None,
            })?;

        let response = request
            .bearer_auth(&self.bearer)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        self.check_rate_limit(response)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> TagportError {
        if err.is_timeout() {
            TagportError::Timeout(NetworkTuning::REQUEST_TIMEOUT)
        } else {
            TagportError::Network {
                message: format!("{} request failed: {}", self.service, err),
                cause: Some(err.to_string()),
            }
        }
    }

    /// Convert 429 into the distinct rate-limited error. Other statuses are
    /// returned to the caller, which knows how to classify them per service.
    fn check_rate_limit(&self, response: Response) -> Result<Response> {
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());

            warn!(
                "{} rate limit hit, retry after {:?} seconds",
                self.service, retry_after
            );

            return Err(TagportError::RateLimited {
                service: self.service.to_string(),
                retry_after_secs: retry_after,
            });
        }

        Ok(response)
    }
}
