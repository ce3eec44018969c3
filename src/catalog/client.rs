//! Catalog service client
//!
//! HTTP client for the remote reference-data catalog. The credential is
//! injected at construction; its absence surfaces `Unauthorized` before any
//! network call is attempted. The client never retries on its own.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::adapter::{self, CatalogCreateResponse, CatalogResponse};
use super::{CatalogOption, CreatePayload, LookupType, OptionId};
use crate::error::{CatalogError, CatalogResult};

/// Abstract contract with the remote reference-data service.
///
/// `search` is idempotent and must not mutate catalog state; `create` is not
/// idempotent and surfaces `Conflict` for duplicate names.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search catalog entries of one lookup type.
    ///
    /// An empty term returns the unfiltered/default set. For `City` the
    /// parent country id is mandatory for a meaningful result: the lookup is
    /// scoped to the country's city list and the term is applied as a local,
    /// case-insensitive name-substring filter.
    async fn search(
        &self,
        lookup_type: LookupType,
        term: &str,
        parent: Option<&OptionId>,
    ) -> CatalogResult<Vec<CatalogOption>>;

    /// Create a new catalog entry. Duplicate names surface `Conflict`.
    async fn create(&self, payload: CreatePayload) -> CatalogResult<CatalogOption>;
}

/// Configuration for [`HttpCatalogClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Bearer credential for the catalog service. Required for every call.
    pub credential: Option<String>,
    pub timeout_secs: u64,
    pub page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            credential: None,
            timeout_secs: 30,
            page_size: 100,
        }
    }
}

pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
    credential: Option<String>,
    page_size: usize,
}

impl HttpCatalogClient {
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::network(format!("failed to create HTTP client: {}", e)))?;

        let mut base = config.base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| CatalogError::network(format!("invalid catalog base URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            credential: config.credential,
            page_size: config.page_size,
        })
    }

    fn credential(&self) -> CatalogResult<&str> {
        self.credential.as_deref().ok_or(CatalogError::Unauthorized)
    }

    fn search_url(
        &self,
        lookup_type: LookupType,
        term: &str,
        parent: Option<&OptionId>,
    ) -> CatalogResult<Url> {
        let path = match (lookup_type, parent) {
            // Cities are only ever fetched country-scoped, never free-text.
            (LookupType::City, Some(country)) => {
                format!("countries/{}/cities", country)
            }
            _ => lookup_type.endpoint().to_string(),
        };

        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| CatalogError::network(format!("invalid catalog URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            if lookup_type.supports_server_search() && !term.is_empty() {
                query.append_pair("search", term);
            }
            query.append_pair("limit", &self.page_size.to_string());
        }

        Ok(url)
    }

    async fn error_for_status(
        response: reqwest::Response,
        lookup_type: LookupType,
        name: &str,
    ) -> CatalogError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();

        match status {
            StatusCode::UNAUTHORIZED => CatalogError::Unauthorized,
            StatusCode::FORBIDDEN => CatalogError::Forbidden {
                resource: lookup_type.endpoint().to_string(),
            },
            StatusCode::NOT_FOUND => CatalogError::NotFound {
                lookup_type: lookup_type.to_string(),
            },
            StatusCode::CONFLICT => CatalogError::Conflict {
                lookup_type: lookup_type.to_string(),
                name: name.to_string(),
            },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                CatalogError::invalid_payload(snippet)
            }
            other => CatalogError::network(format!("catalog error {}: {}", other, snippet)),
        }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn search(
        &self,
        lookup_type: LookupType,
        term: &str,
        parent: Option<&OptionId>,
    ) -> CatalogResult<Vec<CatalogOption>> {
        let credential = self.credential()?.to_string();

        // No parent country means no meaningful city lookup exists yet.
        if lookup_type == LookupType::City && parent.is_none() {
            return Ok(vec![]);
        }

        let url = self.search_url(lookup_type, term, parent)?;
        tracing::debug!(%lookup_type, term, url = %url, "catalog search");

        let response = self
            .client
            .get(url)
            .bearer_auth(credential)
            .send()
            .await?;

        if !response.status().is_success() {
            let error = Self::error_for_status(response, lookup_type, term).await;
            tracing::warn!(%lookup_type, term, %error, "catalog search failed");
            return Err(error);
        }

        let parsed: CatalogResponse = response.json().await.map_err(|e| {
            CatalogError::network(format!("failed to parse {} response: {}", lookup_type, e))
        })?;

        let mut options = adapter::map_rows(lookup_type, parsed.data)?;

        // Cities come back unfiltered from the country-scoped endpoint;
        // the name-substring filter is applied here, case-insensitively.
        if lookup_type == LookupType::City && !term.is_empty() {
            options = filter_by_name_substring(options, term);
        }

        Ok(options)
    }

    async fn create(&self, payload: CreatePayload) -> CatalogResult<CatalogOption> {
        let credential = self.credential()?.to_string();
        let payload = payload.normalized()?;
        let lookup_type = payload.lookup_type();

        let url = self
            .base_url
            .join(lookup_type.endpoint())
            .map_err(|e| CatalogError::network(format!("invalid catalog URL: {}", e)))?;
        tracing::debug!(%lookup_type, name = payload.name(), "catalog create");

        let response = self
            .client
            .post(url)
            .bearer_auth(credential)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error = Self::error_for_status(response, lookup_type, payload.name()).await;
            tracing::warn!(%lookup_type, name = payload.name(), %error, "catalog create failed");
            return Err(error);
        }

        let parsed: CatalogCreateResponse = response.json().await.map_err(|e| {
            CatalogError::network(format!("failed to parse {} response: {}", lookup_type, e))
        })?;

        adapter::map_row(lookup_type, parsed.data)
    }
}

/// Case-insensitive name-substring filter used for client-side city search.
pub(crate) fn filter_by_name_substring(
    options: Vec<CatalogOption>,
    term: &str,
) -> Vec<CatalogOption> {
    let needle = term.to_lowercase();
    options
        .into_iter()
        .filter(|o| o.name.to_lowercase().contains(&needle))
        .collect()
}
