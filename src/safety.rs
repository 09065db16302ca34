//! SSRF guard for URLs the server is asked to fetch.
//!
//! Only the literal host in the URL is inspected, nothing is resolved
//! through DNS. A public hostname that resolves to a private address (or a
//! DNS rebinding attack) is NOT caught here; that residual risk is accepted
//! for the relay and documented in DESIGN.md.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

/// A `http`/`https` URL whose literal host is not loopback, private or
/// link-local.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafeUrl(Url);

impl SafeUrl {
    /// Parses and validates `input`, returning `None` when it is malformed or
    /// points somewhere we refuse to fetch.
    pub fn parse(input: &str) -> Option<Self> {
        let url = Url::parse(input.trim()).ok()?;
        Self::from_url(url)
    }

    /// Validates an already-parsed URL.
    pub fn from_url(url: Url) -> Option<Self> {
        if is_safe_url(&url) {
            Some(Self(url))
        } else {
            None
        }
    }

    /// The validated URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Consumes the wrapper.
    pub fn into_url(self) -> Url {
        self.0
    }
}

impl fmt::Display for SafeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Returns true when `input` is a well-formed `http(s)` URL that doesn't
/// target a local or private host. Never panics, malformed input is unsafe.
pub fn is_url_safe(input: &str) -> bool {
    SafeUrl::parse(input).is_some()
}

/// Same check as [`is_url_safe`] for a parsed URL, used for redirect hops.
pub fn is_safe_url(url: &Url) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host() {
        None => false,
        Some(Host::Domain(domain)) => is_public_domain(domain),
        Some(Host::Ipv4(addr)) => is_public_ipv4(addr),
        Some(Host::Ipv6(addr)) => is_public_ipv6(addr),
    }
}

fn is_public_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    !(domain.is_empty() || domain == "localhost" || domain.ends_with(".localhost"))
}

fn is_public_ipv4(addr: Ipv4Addr) -> bool {
    // 127/8, 10/8, 172.16/12, 192.168/16, 169.254/16 and 0/8
    !(addr.is_loopback()
        || addr.is_private()
        || addr.is_link_local()
        || addr.is_unspecified()
        || addr.octets()[0] == 0)
}

fn is_public_ipv6(addr: Ipv6Addr) -> bool {
    // ::1, ::, fe80::/10 and fc00::/7
    if addr.is_loopback()
        || addr.is_unspecified()
        || addr.is_unicast_link_local()
        || addr.is_unique_local()
    {
        return false;
    }
    // IPv4-mapped ::ffff:a.b.c.d and IPv4-compatible ::a.b.c.d
    match addr.to_ipv4() {
        Some(embedded) => is_public_ipv4(embedded),
        None => true,
    }
}
