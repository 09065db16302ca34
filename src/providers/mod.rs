//! Stock-photo providers and the aggregator that fans a search out to them.
//!
//! Every adapter swallows its own failures: a provider that errors, times
//! out or returns something unexpected contributes no images instead of
//! failing the whole search.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use futures_util::future::join_all;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::config::{AppConfig, ProviderEndpoint};

mod pexels;
mod pixabay;
mod unsplash;

/// One image, normalised from whichever provider returned it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    /// Small preview URL
    pub thumb: String,
    /// Full-size URL
    pub full: String,
    /// Description, `null` when the provider had none
    pub alt: Option<String>,
}

impl ImageRecord {
    /// Builds a record, returning `None` if either URL is missing or blank.
    pub(crate) fn from_parts(
        thumb: Option<String>,
        full: Option<String>,
        alt: Option<String>,
    ) -> Option<Self> {
        let thumb = thumb.filter(|url| !url.trim().is_empty())?;
        let full = full.filter(|url| !url.trim().is_empty())?;
        let alt = alt
            .map(|alt| alt.trim().to_string())
            .filter(|alt| !alt.is_empty());
        Some(Self { thumb, full, alt })
    }
}

/// What to search for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    /// Search text, `None` asks providers for curated or random images
    pub text: Option<String>,
    /// 1-based page number
    pub page: NonZeroU32,
}

impl SearchQuery {
    /// Query for `text` on `page`; blank text means "no query".
    pub fn new(text: Option<&str>, page: NonZeroU32) -> Self {
        let text = text
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        Self { text, page }
    }

    /// Parses the raw `q` and `page` request parameters, defaulting the page to 1.
    pub fn from_params(text: Option<&str>, page: Option<&str>) -> Self {
        let page = page
            .and_then(|page| page.trim().parse::<NonZeroU32>().ok())
            .unwrap_or(NonZeroU32::MIN);
        Self::new(text, page)
    }
}

/// The stock-photo sources, in the order their results are returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    /// Provider A
    Unsplash,
    /// Provider B
    Pexels,
    /// Provider C
    Pixabay,
}

impl Provider {
    /// Every provider, in aggregation order.
    pub const ALL: [Provider; 3] = [Provider::Unsplash, Provider::Pexels, Provider::Pixabay];

    fn endpoint(self, config: &AppConfig) -> &ProviderEndpoint {
        match self {
            Provider::Unsplash => &config.unsplash,
            Provider::Pexels => &config.pexels,
            Provider::Pixabay => &config.pixabay,
        }
    }

    /// Fetches one page of results. Never fails: any problem is logged and
    /// yields an empty list.
    pub async fn fetch_page(
        self,
        client: &Client,
        config: &AppConfig,
        query: &SearchQuery,
    ) -> Vec<ImageRecord> {
        let endpoint = self.endpoint(config);
        let Some(api_key) = endpoint.api_key.as_deref() else {
            debug!("Skipping {}, no key configured", self);
            return Vec::new();
        };
        let per_page = config.per_page;
        let request = match self {
            Provider::Unsplash => unsplash::request(client, endpoint, api_key, query, per_page),
            Provider::Pexels => pexels::request(client, endpoint, api_key, query, per_page),
            Provider::Pixabay => pixabay::request(client, endpoint, api_key, query, per_page),
        }
        .timeout(config.upstream_timeout);

        let result = match self {
            Provider::Unsplash => unsplash::fetch(request, query).await,
            Provider::Pexels => pexels::fetch(request).await,
            Provider::Pixabay => pixabay::fetch(request, per_page).await,
        };
        match result {
            Ok(images) => {
                debug!("{} returned {} images", self, images.len());
                images
            }
            Err(err) => {
                error!("{} search failed: {}", self, err);
                Vec::new()
            }
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Unsplash => "Unsplash",
            Provider::Pexels => "Pexels",
            Provider::Pixabay => "Pixabay",
        };
        f.write_str(name)
    }
}

/// Searches every provider concurrently and concatenates the results in
/// [`Provider::ALL`] order. A provider that fails, or whose task panics,
/// contributes nothing.
pub async fn search(
    client: &Client,
    config: &Arc<AppConfig>,
    query: &SearchQuery,
) -> Vec<ImageRecord> {
    let tasks = Provider::ALL.map(|provider| {
        let client = client.clone();
        let config = Arc::clone(config);
        let query = query.clone();
        tokio::spawn(async move { provider.fetch_page(&client, &config, &query).await })
    });

    let mut images = Vec::new();
    for (provider, joined) in Provider::ALL.iter().zip(join_all(tasks).await) {
        match joined {
            Ok(batch) => images.extend(batch),
            Err(err) => error!("{} search task failed: {}", provider, err),
        }
    }
    images
}

/// Why a provider call produced nothing.
#[derive(Debug)]
pub(crate) enum ProviderError {
    /// Transport, timeout or body decoding failure. The URL is stripped since
    /// some providers take the key as a query parameter.
    Request(reqwest::Error),
    /// Non-success status, with the start of the response body
    Status(StatusCode, String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(err) => write!(f, "request failed: {err}"),
            Self::Status(status, body) => write!(f, "API error {status}: {body}"),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.without_url())
    }
}

/// Sends `request` and decodes a successful JSON response.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status(status, body.chars().take(200).collect()));
    }
    Ok(response.json::<T>().await?)
}
