//! AI wallpaper generation through a Bytez-hosted model.
//!
//! The model answers with a URL on a third-party CDN; callers only ever get
//! a same-origin [`PROXY_IMAGE_PATH`] reference to it.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::form_urlencoded;

use crate::config::GenerationConfig;
use crate::constants::PROXY_IMAGE_PATH;

/// Why a generation didn't produce an image.
#[derive(Debug)]
pub enum GenerationError {
    /// The prompt was missing or blank
    EmptyPrompt,
    /// No model credential was configured
    NotConfigured,
    /// The model answered, but with an error or without an output URL
    Failed(String),
    /// The model couldn't be reached or its response couldn't be read
    Request(reqwest::Error),
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPrompt => write!(f, "Prompt is required"),
            Self::NotConfigured => write!(f, "AI generation is not configured"),
            Self::Failed(detail) => write!(f, "AI generation failed: {detail}"),
            Self::Request(err) => write!(f, "AI request failed: {err}"),
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err)
    }
}

#[derive(Serialize, Debug)]
struct RunRequest<'a> {
    text: &'a str,
}

/// Bytez wraps every model result as `{"error": ..., "output": ...}`.
#[derive(Deserialize, Debug)]
struct RunResponse {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    output: Option<Value>,
}

impl RunResponse {
    fn into_output_url(self) -> Result<String, GenerationError> {
        if let Some(err) = self.error.filter(|err| !err.is_null()) {
            return Err(GenerationError::Failed(format!("model returned error: {err}")));
        }
        match self.output {
            Some(Value::String(url)) if !url.trim().is_empty() => Ok(url),
            Some(other) => Err(GenerationError::Failed(format!(
                "expected an output URL, got {other}"
            ))),
            None => Err(GenerationError::Failed("response had no output".to_string())),
        }
    }
}

/// Runs `prompt` through the configured model and returns a same-origin
/// proxy URL for the result.
pub async fn generate(
    client: &Client,
    config: &GenerationConfig,
    prompt: &str,
) -> Result<String, GenerationError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(GenerationError::EmptyPrompt);
    }
    let Some(api_key) = config.endpoint.api_key.as_deref() else {
        return Err(GenerationError::NotConfigured);
    };

    info!("Generating image with {}", config.model);
    let response = client
        .post(config.endpoint.url(&format!("/models/v2/{}", config.model)))
        .header("Authorization", format!("Key {api_key}"))
        .json(&RunRequest { text: prompt })
        .timeout(config.timeout)
        .send()
        .await?;

    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(GenerationError::Failed(format!(
            "model API returned {status}: {}",
            String::from_utf8_lossy(&body).chars().take(200).collect::<String>()
        )));
    }
    let parsed: RunResponse = serde_json::from_slice(&body)
        .map_err(|err| GenerationError::Failed(format!("unreadable model response: {err}")))?;
    let output = parsed.into_output_url()?;
    debug!("Model output: {}", output);

    Ok(proxy_url(&output))
}

/// Same-origin URL that relays `remote` through the image proxy.
pub fn proxy_url(remote: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("url", remote)
        .finish();
    format!("{PROXY_IMAGE_PATH}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;

    #[test]
    fn proxy_url_encodes_the_remote() {
        assert_eq!(
            proxy_url("https://cdn.bytez.com/out/a b.png?sig=1&x=2"),
            "/api/proxy-image?url=https%3A%2F%2Fcdn.bytez.com%2Fout%2Fa+b.png%3Fsig%3D1%26x%3D2"
        );
    }

    #[test]
    fn output_must_be_a_url_string() {
        let ok: RunResponse =
            serde_json::from_value(json!({"error": null, "output": "https://cdn/x.png"}))
                .expect("parse");
        assert_eq!(ok.into_output_url().expect("url"), "https://cdn/x.png");

        for raw in [
            json!({"error": "model is loading", "output": null}),
            json!({"error": null, "output": {"images": []}}),
            json!({"error": null}),
            json!({}),
        ] {
            let parsed: RunResponse = serde_json::from_value(raw).expect("parse");
            assert!(matches!(
                parsed.into_output_url(),
                Err(GenerationError::Failed(_))
            ));
        }
    }

    #[tokio::test]
    async fn prompt_checked_before_configuration() {
        let client = Client::new();
        let config = AppConfig::default().generation;
        assert!(matches!(
            generate(&client, &config, "   ").await,
            Err(GenerationError::EmptyPrompt)
        ));
        assert!(matches!(
            generate(&client, &config, "a neon city").await,
            Err(GenerationError::NotConfigured)
        ));
    }
}
