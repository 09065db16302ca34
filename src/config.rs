//! Config handling

use std::fmt;
use std::time::Duration;

use reqwest::redirect::Policy;
use tracing::log::LevelFilter;
use tracing::warn;

use crate::cli::CliOptions;
use crate::constants::{
    BYTEZ_API_BASE, CONNECT_TIMEOUT_SECONDS, DEFAULT_AI_MODEL, DEFAULT_PER_PAGE, MAX_REDIRECTS,
    PEXELS_API_BASE, PIXABAY_API_BASE, UNSPLASH_API_BASE,
};
use crate::safety::is_safe_url;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("reqwest", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Where a stock-photo provider lives and the key used to call it.
#[derive(Clone)]
pub struct ProviderEndpoint {
    /// API key, the provider is skipped when this is `None`
    pub api_key: Option<String>,
    /// Scheme and host of the API, without a trailing slash
    pub base_url: String,
}

impl ProviderEndpoint {
    /// Endpoint at `base_url` using `api_key`.
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Joins `path` onto the base url.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// keys stay out of logs
impl fmt::Debug for ProviderEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEndpoint")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Settings for the hosted image-generation model.
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// Model API location and key, generation is disabled without a key
    pub endpoint: ProviderEndpoint,
    /// Model identifier, eg `stabilityai/stable-diffusion-xl-base-1.0`
    pub model: String,
    /// Total time allowed for one generation
    pub timeout: Duration,
}

/// Immutable process configuration, built once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Provider A
    pub unsplash: ProviderEndpoint,
    /// Provider B
    pub pexels: ProviderEndpoint,
    /// Provider C
    pub pixabay: ProviderEndpoint,
    /// AI generation
    pub generation: GenerationConfig,
    /// Results requested from each provider
    pub per_page: u8,
    /// Time allowed for a provider search, or for an image fetch to start responding
    pub upstream_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            unsplash: ProviderEndpoint::new(UNSPLASH_API_BASE, None),
            pexels: ProviderEndpoint::new(PEXELS_API_BASE, None),
            pixabay: ProviderEndpoint::new(PIXABAY_API_BASE, None),
            generation: GenerationConfig {
                endpoint: ProviderEndpoint::new(BYTEZ_API_BASE, None),
                model: DEFAULT_AI_MODEL.to_string(),
                timeout: Duration::from_secs(120),
            },
            per_page: DEFAULT_PER_PAGE,
            upstream_timeout: Duration::from_secs(15),
        }
    }
}

impl AppConfig {
    /// Builds the config from parsed CLI options, warning about anything disabled.
    pub fn from_cli(cli: &CliOptions) -> Self {
        let config = Self {
            unsplash: ProviderEndpoint::new(UNSPLASH_API_BASE, cli.unsplash_key.clone()),
            pexels: ProviderEndpoint::new(PEXELS_API_BASE, cli.pexels_key.clone()),
            pixabay: ProviderEndpoint::new(PIXABAY_API_BASE, cli.pixabay_key.clone()),
            generation: GenerationConfig {
                endpoint: ProviderEndpoint::new(BYTEZ_API_BASE, cli.bytez_key.clone()),
                model: cli.ai_model.clone(),
                timeout: Duration::from_secs(cli.generation_timeout_secs),
            },
            per_page: cli.per_page,
            upstream_timeout: Duration::from_secs(cli.upstream_timeout_secs),
        };

        for (name, endpoint) in [
            ("Unsplash", &config.unsplash),
            ("Pexels", &config.pexels),
            ("Pixabay", &config.pixabay),
        ] {
            if endpoint.api_key.is_none() {
                warn!("No {} key configured, it will not contribute results", name);
            }
        }
        if config.generation.endpoint.api_key.is_none() {
            warn!("BYTES_KEY missing, AI generation is disabled");
        }
        config
    }
}

/// Client builder shared by everything that talks upstream.
///
/// Every redirect hop is re-checked against the SSRF guard, so a public URL
/// can't bounce the server onto a private address.
pub fn http_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS))
        .redirect(Policy::custom(|attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if is_safe_url(attempt.url()) {
                attempt.follow()
            } else {
                attempt.stop()
            }
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn blank_keys_count_as_missing() {
        let endpoint = ProviderEndpoint::new("https://api.example.com/", Some("  ".to_string()));
        assert!(endpoint.api_key.is_none());
        assert_eq!(endpoint.url("/v1/search"), "https://api.example.com/v1/search");
    }

    #[test]
    fn debug_output_hides_keys() {
        let endpoint = ProviderEndpoint::new(PEXELS_API_BASE, Some("hunter2".to_string()));
        let rendered = format!("{:?}", endpoint);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn config_from_cli() {
        let cli = CliOptions::try_parse_from([
            "wallhub",
            "--pexels-key",
            "abc",
            "--per-page",
            "12",
            "--upstream-timeout-secs",
            "3",
        ])
        .expect("parse cli");
        let config = AppConfig::from_cli(&cli);
        assert_eq!(config.pexels.api_key.as_deref(), Some("abc"));
        assert_eq!(config.per_page, 12);
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
        assert_eq!(config.generation.model, DEFAULT_AI_MODEL);
    }

    #[test]
    fn per_page_is_bounded() {
        assert!(CliOptions::try_parse_from(["wallhub", "--per-page", "0"]).is_err());
        assert!(CliOptions::try_parse_from(["wallhub", "--per-page", "81"]).is_err());
    }
}
