//! Provider C: Pixabay. The key travels as a query parameter, so request
//! URLs from here must never be logged.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use super::{ImageRecord, ProviderError, SearchQuery, fetch_json};
use crate::config::ProviderEndpoint;
use crate::constants::{PIXABAY_FALLBACK_QUERY, PIXABAY_MIN_PER_PAGE};

#[derive(Debug, Deserialize)]
struct HitsResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "previewURL")]
    preview_url: Option<String>,
    #[serde(rename = "largeImageURL")]
    large_image_url: Option<String>,
    /// comma separated tag list
    tags: Option<String>,
}

impl Hit {
    fn into_record(self) -> Option<ImageRecord> {
        ImageRecord::from_parts(self.preview_url, self.large_image_url, self.tags)
    }
}

pub(super) fn request(
    client: &Client,
    endpoint: &ProviderEndpoint,
    api_key: &str,
    query: &SearchQuery,
    per_page: u8,
) -> RequestBuilder {
    let text = query.text.as_deref().unwrap_or(PIXABAY_FALLBACK_QUERY);
    client
        .get(endpoint.url("/api/"))
        .query(&[("key", api_key), ("q", text), ("image_type", "photo")])
        .query(&[("page", query.page.get())])
        .query(&[("per_page", per_page.max(PIXABAY_MIN_PER_PAGE))])
}

/// Small page sizes are raised to Pixabay's minimum in the request, so the
/// hits are cut back to `per_page` here.
pub(super) async fn fetch(
    request: RequestBuilder,
    per_page: u8,
) -> Result<Vec<ImageRecord>, ProviderError> {
    let response: HitsResponse = fetch_json(request).await?;
    Ok(normalise(response, per_page))
}

fn normalise(response: HitsResponse, per_page: u8) -> Vec<ImageRecord> {
    response
        .hits
        .into_iter()
        .filter_map(Hit::into_record)
        .take(usize::from(per_page))
        .collect()
}
