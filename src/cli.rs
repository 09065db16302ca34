//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;

use crate::constants::{DEFAULT_AI_MODEL, DEFAULT_PER_PAGE, MAX_PER_PAGE};

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "WALLHUB_DEBUG")]
    /// Enable debug logging. Env: WALLHUB_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "3000", env = "WALLHUB_PORT")]
    /// http listener, defaults to `3000`.
    /// Env: WALLHUB_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "WALLHUB_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: WALLHUB_LISTEN_ADDRESS
    pub listen_address: String,
    #[clap(long, short, default_value = "./public", env = "WALLHUB_STATIC_DIR")]
    /// Directory of frontend files served as-is, defaults to `./public`.
    /// Env: WALLHUB_STATIC_DIR
    pub static_dir: PathBuf,
    #[clap(long, env = "WALLHUB_CORS")]
    /// Allow cross-origin requests from any site. Env: WALLHUB_CORS
    pub cors: bool,

    #[clap(long, env = "UNSPLASH_KEY", hide_env_values = true)]
    /// Unsplash access key. Env: UNSPLASH_KEY
    pub unsplash_key: Option<String>,
    #[clap(long, env = "PEXELS_KEY", hide_env_values = true)]
    /// Pexels API key. Env: PEXELS_KEY
    pub pexels_key: Option<String>,
    #[clap(long, env = "PIXABAY_KEY", hide_env_values = true)]
    /// Pixabay API key. Env: PIXABAY_KEY
    pub pixabay_key: Option<String>,
    #[clap(long, env = "BYTES_KEY", hide_env_values = true)]
    /// Bytez API key, AI generation is disabled without it. Env: BYTES_KEY
    pub bytez_key: Option<String>,
    #[clap(long, default_value = DEFAULT_AI_MODEL, env = "WALLHUB_AI_MODEL")]
    /// Hosted model used for AI generation. Env: WALLHUB_AI_MODEL
    pub ai_model: String,

    #[clap(
        long,
        default_value_t = DEFAULT_PER_PAGE,
        value_parser = clap::value_parser!(u8).range(1..=(MAX_PER_PAGE as i64)),
        env = "WALLHUB_PER_PAGE"
    )]
    /// Results requested from each provider. Env: WALLHUB_PER_PAGE
    pub per_page: u8,
    #[clap(long, default_value = "15", env = "WALLHUB_UPSTREAM_TIMEOUT_SECS")]
    /// Seconds a provider search or image fetch may take to respond.
    /// Env: WALLHUB_UPSTREAM_TIMEOUT_SECS
    pub upstream_timeout_secs: u64,
    #[clap(long, default_value = "120", env = "WALLHUB_GENERATION_TIMEOUT_SECS")]
    /// Seconds an AI generation may take. Env: WALLHUB_GENERATION_TIMEOUT_SECS
    pub generation_timeout_secs: u64,
}
