//! Shared constants for upstream endpoints and relay behaviour
//!

/// Base URL for the Unsplash API
pub const UNSPLASH_API_BASE: &str = "https://api.unsplash.com";

/// Base URL for the Pexels API
pub const PEXELS_API_BASE: &str = "https://api.pexels.com";

/// Base URL for the Pixabay API
pub const PIXABAY_API_BASE: &str = "https://pixabay.com";

/// Base URL for the Bytez hosted model API
pub const BYTEZ_API_BASE: &str = "https://api.bytez.com";

/// Model used for AI wallpaper generation unless overridden.
pub const DEFAULT_AI_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";

/// Number of results requested from each provider.
pub const DEFAULT_PER_PAGE: u8 = 30;

/// Upper bound for `--per-page`, Pexels' own limit. Providers with
/// narrower limits clamp to them.
pub const MAX_PER_PAGE: u8 = 80;

/// Unsplash caps both `per_page` and the random `count` at 30.
pub const UNSPLASH_MAX_PER_PAGE: u8 = 30;

/// Pixabay rejects `per_page` below 3.
pub const PIXABAY_MIN_PER_PAGE: u8 = 3;

/// Pixabay needs a search term, this is used when the client didn't send one.
pub const PIXABAY_FALLBACK_QUERY: &str = "wallpaper";

/// Same-origin path that relays remote images inline.
pub const PROXY_IMAGE_PATH: &str = "/api/proxy-image";

/// Content type used when upstream doesn't send one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Filename used for downloads when the client didn't supply a usable one.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "wallpaper.png";

/// Longest filename we will put in a Content-Disposition header.
pub const MAX_FILENAME_LENGTH: usize = 200;

/// Longest extension kept intact when a filename is truncated.
pub const MAX_EXTENSION_LENGTH: usize = 16;

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Seconds allowed for establishing an upstream connection.
pub const CONNECT_TIMEOUT_SECONDS: u64 = 10;

