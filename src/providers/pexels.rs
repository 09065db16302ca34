//! Provider B: Pexels.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use super::{ImageRecord, ProviderError, SearchQuery, fetch_json};
use crate::config::ProviderEndpoint;

#[derive(Debug, Deserialize)]
struct PhotosResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: Option<PhotoSources>,
    alt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    medium: Option<String>,
    original: Option<String>,
}

impl Photo {
    fn into_record(self) -> Option<ImageRecord> {
        let src = self.src?;
        ImageRecord::from_parts(src.medium, src.original, self.alt)
    }
}

pub(super) fn request(
    client: &Client,
    endpoint: &ProviderEndpoint,
    api_key: &str,
    query: &SearchQuery,
    per_page: u8,
) -> RequestBuilder {
    let builder = match query.text.as_deref() {
        Some(text) => client
            .get(endpoint.url("/v1/search"))
            .query(&[("query", text)]),
        None => client.get(endpoint.url("/v1/curated")),
    };
    builder
        .query(&[("page", query.page.get())])
        .query(&[("per_page", per_page)])
        .header("Authorization", api_key)
}

pub(super) async fn fetch(request: RequestBuilder) -> Result<Vec<ImageRecord>, ProviderError> {
    let response: PhotosResponse = fetch_json(request).await?;
    Ok(response
        .photos
        .into_iter()
        .filter_map(Photo::into_record)
        .collect())
}
