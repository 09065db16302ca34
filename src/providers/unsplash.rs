//! Provider A: Unsplash.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use super::{ImageRecord, ProviderError, SearchQuery, fetch_json};
use crate::config::ProviderEndpoint;
use crate::constants::UNSPLASH_MAX_PER_PAGE;

/// `/search/photos` wraps the photos in `results`.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: Option<PhotoUrls>,
    alt_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    small: Option<String>,
    full: Option<String>,
}

impl Photo {
    fn into_record(self) -> Option<ImageRecord> {
        let urls = self.urls?;
        ImageRecord::from_parts(urls.small, urls.full, self.alt_description)
    }
}

pub(super) fn request(
    client: &Client,
    endpoint: &ProviderEndpoint,
    api_key: &str,
    query: &SearchQuery,
    per_page: u8,
) -> RequestBuilder {
    let per_page = per_page.min(UNSPLASH_MAX_PER_PAGE);
    let builder = match query.text.as_deref() {
        Some(text) => client
            .get(endpoint.url("/search/photos"))
            .query(&[("query", text)])
            .query(&[("page", query.page.get())])
            .query(&[("per_page", per_page)]),
        // the random endpoint has no paging
        None => client
            .get(endpoint.url("/photos/random"))
            .query(&[("count", per_page)]),
    };
    builder.header("Authorization", format!("Client-ID {api_key}"))
}

pub(super) async fn fetch(
    request: RequestBuilder,
    query: &SearchQuery,
) -> Result<Vec<ImageRecord>, ProviderError> {
    // the random endpoint returns a bare array
    let photos = if query.text.is_some() {
        fetch_json::<SearchResponse>(request).await?.results
    } else {
        fetch_json::<Vec<Photo>>(request).await?
    };
    Ok(photos.into_iter().filter_map(Photo::into_record).collect())
}
