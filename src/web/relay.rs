//! Image relay: fetches a validated remote image and streams it back to the
//! client, inline or as a download.
//!
//! The upstream body is never buffered. Chunks are forwarded as hyper polls
//! for them, so a slow client slows the upstream read, and when the client
//! disconnects the response body (and with it the upstream connection) is
//! dropped.

use axum::body::Body;
use axum::http::header::{
    CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS,
};
use futures_util::StreamExt;

use super::prelude::*;
use crate::constants::{
    DEFAULT_CONTENT_TYPE, DEFAULT_DOWNLOAD_FILENAME, MAX_EXTENSION_LENGTH, MAX_FILENAME_LENGTH,
};
use crate::safety::SafeUrl;

#[derive(Deserialize, Debug)]
pub(crate) struct ProxyParams {
    url: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct DownloadParams {
    url: Option<String>,
    filename: Option<String>,
}

/// handles GET /api/proxy-image
pub(crate) async fn proxy_image_handler(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> Result<Response, WallhubError> {
    let target = validate_target(params.url.as_deref(), "Missing url")?;
    let upstream = fetch_upstream(&state, target, "Proxy error").await?;
    relay_response(upstream, None)
}

/// handles GET /download
pub(crate) async fn download_handler(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, WallhubError> {
    let target = validate_target(params.url.as_deref(), "Image URL is required")?;
    let filename = sanitize_filename(
        params
            .filename
            .as_deref()
            .unwrap_or(DEFAULT_DOWNLOAD_FILENAME),
    );
    let upstream = fetch_upstream(&state, target, "Error downloading image").await?;
    relay_response(upstream, Some(&filename))
}

fn validate_target(url: Option<&str>, missing_message: &str) -> Result<SafeUrl, WallhubError> {
    let url = url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| WallhubError::BadRequest(missing_message.to_string()))?;
    SafeUrl::parse(url).ok_or_else(|| {
        debug!("Refusing to fetch {}", url);
        WallhubError::BadRequest("Invalid or disallowed url".to_string())
    })
}

/// Sends the upstream request. Only the wait for response headers is bounded
/// by the timeout, the body may take as long as it needs to stream.
async fn fetch_upstream(
    state: &AppState,
    target: SafeUrl,
    failure_message: &'static str,
) -> Result<reqwest::Response, WallhubError> {
    info!("Relaying {}", target);
    let send = state.client.get(target.into_url()).send();
    let response = match tokio::time::timeout(state.config.upstream_timeout, send).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => return Err(WallhubError::upstream(failure_message, err)),
        Err(_) => {
            return Err(WallhubError::upstream(
                failure_message,
                "timed out waiting for upstream",
            ));
        }
    };

    let status = response.status();
    if !status.is_success() {
        return Err(WallhubError::upstream(
            "Failed to fetch image",
            format!("upstream returned {status}"),
        ));
    }
    Ok(response)
}

fn relay_response(
    upstream: reqwest::Response,
    attachment_name: Option<&str>,
) -> Result<Response, WallhubError> {
    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff");
    if let Some(length) = upstream.headers().get(CONTENT_LENGTH) {
        builder = builder.header(CONTENT_LENGTH, length.clone());
    }
    if let Some(name) = attachment_name {
        builder = builder.header(CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\""));
    }

    let stream = upstream
        .bytes_stream()
        .map(|chunk| chunk.map_err(std::io::Error::other));
    builder.body(Body::from_stream(stream)).map_err(WallhubError::from)
}

fn is_filename_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Makes a client-supplied filename safe for a Content-Disposition header.
///
/// Anything outside `[A-Za-z0-9_.-]` becomes `_`, so quotes, CR/LF and path
/// separators can't get through. Long names are cut to
/// [`MAX_FILENAME_LENGTH`], keeping a short extension. Names with nothing
/// but dots fall back to [`DEFAULT_DOWNLOAD_FILENAME`].
pub(crate) fn sanitize_filename(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if is_filename_char(c) { c } else { '_' })
        .collect();
    if cleaned.chars().all(|c| c == '.') {
        return DEFAULT_DOWNLOAD_FILENAME.to_string();
    }
    truncate_filename(cleaned)
}

// only called on ASCII, so byte offsets are char offsets
fn truncate_filename(name: String) -> String {
    if name.len() <= MAX_FILENAME_LENGTH {
        return name;
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_LENGTH => {
            let extension = &name[dot..];
            format!("{}{}", &name[..MAX_FILENAME_LENGTH - extension.len()], extension)
        }
        _ => name[..MAX_FILENAME_LENGTH].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_extension_and_allowed_chars() {
        let name = sanitize_filename("My Wallpaper! <script>.png");
        assert_eq!(name, "My_Wallpaper___script_.png");
        assert!(name.chars().all(is_filename_char));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn sanitize_blocks_header_and_path_tricks() {
        let name = sanitize_filename("../../etc/passwd\"\r\nSet-Cookie: a=b");
        assert!(name.chars().all(is_filename_char));
        assert!(!name.contains('/'));
        assert!(!name.contains('"'));

        assert_eq!(sanitize_filename("ünïcødé.jpg"), "_n_c_d_.jpg");
    }

    #[test]
    fn sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize_filename(""), DEFAULT_DOWNLOAD_FILENAME);
        assert_eq!(sanitize_filename("   "), DEFAULT_DOWNLOAD_FILENAME);
        assert_eq!(sanitize_filename(".."), DEFAULT_DOWNLOAD_FILENAME);
        assert_eq!(sanitize_filename("sunset.jpg"), "sunset.jpg");
    }

    #[test]
    fn sanitize_truncates_long_names() {
        let long = format!("{}.jpeg", "a".repeat(500));
        let name = sanitize_filename(&long);
        assert_eq!(name.len(), MAX_FILENAME_LENGTH);
        assert!(name.ends_with(".jpeg"));

        let no_extension = sanitize_filename(&"b".repeat(300));
        assert_eq!(no_extension.len(), MAX_FILENAME_LENGTH);
    }

    #[test]
    fn missing_and_unsafe_targets_are_bad_requests() {
        assert!(matches!(
            validate_target(None, "Missing url"),
            Err(WallhubError::BadRequest(message)) if message == "Missing url"
        ));
        assert!(matches!(
            validate_target(Some("http://192.168.0.10/router.png"), "Missing url"),
            Err(WallhubError::BadRequest(message)) if message == "Invalid or disallowed url"
        ));
        assert!(validate_target(Some("https://images.pexels.com/p.jpg"), "Missing url").is_ok());
    }
}
