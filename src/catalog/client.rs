use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::auth::AuthProvider;
use super::types::{CatalogDocument, CatalogMetadata};
use crate::error::{FetchError, Result, SyncError};

const USER_AGENT: &str = concat!("catalog-sync/", env!("CARGO_PKG_VERSION"));

/// Source of catalog documents.
///
/// Both operations are idempotent; implementations own their retry and
/// timeout behaviour, callers never retry.
#[async_trait]
pub trait CatalogFetcher: Send + Sync + 'static {
    /// Fetch one catalog document by identifier
    async fn fetch_catalog(&self, identifier: &str) -> std::result::Result<CatalogDocument, FetchError>;

    /// Fetch metadata for every catalog
    async fn fetch_catalog_list(&self) -> std::result::Result<Vec<CatalogMetadata>, FetchError>;
}

/// Timeout and retry settings applied to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpPolicy {
    pub timeout: Duration,
    /// Extra attempts after the first one
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for HttpPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 2,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

/// Catalog Service HTTP client
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    policy: HttpPolicy,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl CatalogClient {
    /// Create a client for the given base URL
    pub fn new(base_url: &str, policy: HttpPolicy) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SyncError::Config(format!("Invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "Base URL cannot carry a path: {base_url}"
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(policy.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            policy,
            auth: None,
        })
    }

    /// Attach an authentication collaborator
    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn policy(&self) -> HttpPolicy {
        self.policy
    }

    /// Build an endpoint URL; each segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidResponse(format!("Unusable base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET with the configured retry policy
    async fn get<T: DeserializeOwned>(&self, url: Url) -> std::result::Result<T, FetchError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.policy.retries => {
                    attempt += 1;
                    tracing::debug!(
                        url = %url,
                        attempt,
                        error = %err,
                        "Retrying catalog request"
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: Url) -> std::result::Result<T, FetchError> {
        let mut request = self.client.get(url);
        if let Some(token) = self.auth.as_ref().and_then(|a| a.bearer_token()) {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                if let Some(auth) = &self.auth {
                    auth.on_unauthorized();
                }
            }
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body
            };
            return Err(FetchError::from_status(status.as_u16(), message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_transport(&e))?;
        serde_json::from_str(&body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl CatalogFetcher for CatalogClient {
    async fn fetch_catalog(&self, identifier: &str) -> std::result::Result<CatalogDocument, FetchError> {
        let url = self.endpoint(&["catalogs", identifier])?;
        self.get(url).await
    }

    async fn fetch_catalog_list(&self) -> std::result::Result<Vec<CatalogMetadata>, FetchError> {
        let url = self.endpoint(&["catalogs"])?;
        self.get(url).await
    }
}
