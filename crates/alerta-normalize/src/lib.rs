//! C1: URL Normalizer & Safety Gate.
//!
//! Canonicalizes a raw URL string into an immutable [`UrlContext`] and
//! rejects SSRF-hazardous or malformed targets before any other
//! component sees the URL.
//!
//! The syntactic half of the gate ([`normalize`]) never performs I/O and
//! never suspends, matching §5's "C1–C5 never suspend" scheduling
//! guarantee. Domain-name SSRF resolution is a separate async step
//! ([`resolve_safety`]) the orchestrator runs immediately afterward, so
//! the resolved address set can be handed to the crawler and reused
//! rather than re-resolved — the no-TOCTOU requirement of §4.1.
//!
//! DNS resolution itself goes through the [`Resolver`] seam rather than
//! calling `tokio::net::lookup_host` directly, the same way
//! `TrancoClient`/`VirusTotalClient` go through an overridable base URL
//! and `WhoisClient` through an overridable referral address: it lets a
//! caller (the orchestrator's tests) supply a fixed address set instead
//! of depending on live, egress-capable DNS.

mod context;
mod error;
mod safety;

pub use context::UrlContext;
pub use error::{NormalizeError, Result};

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use url::{Host, Url};

const MIN_LEN: usize = 10;
const MAX_LEN: usize = 2048;

/// Canonicalize and syntactically gate `raw`. Performs no I/O.
pub fn normalize(raw: &str) -> Result<UrlContext> {
    if raw.len() < MIN_LEN || raw.len() > MAX_LEN {
        return Err(NormalizeError::InvalidUrl(format!(
            "length {} outside [{MIN_LEN}, {MAX_LEN}]",
            raw.len()
        )));
    }

    let mut url = Url::parse(raw).map_err(|e| NormalizeError::InvalidUrl(e.to_string()))?;

    let scheme = url.scheme().to_string();
    if scheme != "http" && scheme != "https" {
        return Err(NormalizeError::InvalidUrl(format!(
            "unsupported scheme: {scheme}"
        )));
    }

    let host = url
        .host()
        .ok_or_else(|| NormalizeError::InvalidUrl("URL has no host".to_string()))?
        .to_owned();

    // Strip a trailing root-label dot, e.g. "example.com." -> "example.com".
    if let Host::Domain(domain) = &host {
        if domain.ends_with('.') {
            let trimmed = domain.trim_end_matches('.').to_string();
            url.set_host(Some(&trimmed))
                .map_err(|e| NormalizeError::InvalidUrl(e.to_string()))?;
        }
    }

    let host = url
        .host()
        .ok_or_else(|| NormalizeError::InvalidUrl("URL has no host".to_string()))?
        .to_owned();

    let (host_string, is_ip_literal) = match &host {
        Host::Domain(d) => (d.to_string(), false),
        Host::Ipv4(v4) => (v4.to_string(), true),
        Host::Ipv6(v6) => (format!("[{v6}]").trim_matches(['[', ']']).to_string(), true),
    };

    if is_ip_literal {
        let addr: IpAddr = host_string
            .parse()
            .map_err(|_| NormalizeError::InvalidUrl("unparsable IP literal".to_string()))?;
        if let Some(reason) = safety::blocked_reason(addr) {
            return Err(NormalizeError::BlockedTarget(reason.to_string()));
        }
    } else if host_string == "localhost" || host_string.ends_with(".localhost") {
        return Err(NormalizeError::BlockedTarget(
            "reserved loopback hostname".to_string(),
        ));
    }

    let registrable_domain = if is_ip_literal {
        host_string.clone()
    } else {
        psl::domain(host_string.as_bytes())
            .map(|d| String::from_utf8_lossy(d.as_bytes()).into_owned())
            .unwrap_or_else(|| host_string.clone())
    };

    let has_punycode = !is_ip_literal && host_string.split('.').any(|label| label.starts_with("xn--"));

    let port = url.port();
    let path = url.path().to_string();
    let query = url.query().map(|q| q.to_string());

    Ok(UrlContext {
        original: raw.to_string(),
        normalized: url.as_str().to_string(),
        scheme,
        host: host_string,
        registrable_domain,
        port,
        path,
        query,
        has_punycode,
        is_ip_literal,
    })
}

/// Result of the async DNS-resolution safety pass: the resolved address
/// set, reusable by the crawler to avoid re-resolving (and thereby
/// risking a different, DNS-rebound answer) the same hostname.
#[derive(Debug, Clone)]
pub struct ResolvedAddrs {
    pub addrs: Vec<IpAddr>,
}

/// A DNS resolver usable by [`resolve_safety`]. The production path is
/// [`SystemResolver`]; tests supply [`FixedResolver`] instead so the
/// safety gate never needs live network egress to exercise domain
/// hosts.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, host: &str) -> std::io::Result<Vec<IpAddr>>;
}

/// Resolves through the operating system's real DNS stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
        let lookup_target = format!("{host}:0");
        let resolved = tokio::net::lookup_host(&lookup_target).await?;
        Ok(resolved.map(|sa| sa.ip()).collect())
    }
}

/// A fixed, in-memory host-to-address table, analogous to
/// `TrancoClient::with_base_url`/`WhoisClient::with_iana_addr`: lets
/// tests pin a hostname to a known-safe (or known-blocked) address set
/// instead of resolving it for real.
#[derive(Debug, Clone, Default)]
pub struct FixedResolver {
    addrs: HashMap<String, Vec<IpAddr>>,
}

impl FixedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the address set returned for `host` (case-insensitive).
    pub fn with(mut self, host: &str, addrs: Vec<IpAddr>) -> Self {
        self.addrs.insert(host.to_ascii_lowercase(), addrs);
        self
    }
}

#[async_trait]
impl Resolver for FixedResolver {
    async fn resolve(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
        self.addrs.get(&host.to_ascii_lowercase()).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no fixed address registered for {host}"))
        })
    }
}

/// Resolve a domain host and apply the same blocked-range check used for
/// IP literals. No-op (returns an empty address set) for hosts already
/// known to be IP literals, since [`normalize`] already checked those.
pub async fn resolve_safety(ctx: &UrlContext, resolver: &dyn Resolver) -> Result<ResolvedAddrs> {
    if ctx.is_ip_literal {
        return Ok(ResolvedAddrs { addrs: Vec::new() });
    }

    let addrs = resolver
        .resolve(&ctx.host)
        .await
        .map_err(|e| NormalizeError::InvalidUrl(format!("DNS resolution failed: {e}")))?;

    if addrs.is_empty() {
        return Err(NormalizeError::InvalidUrl(
            "DNS resolution returned no addresses".to_string(),
        ));
    }
    for addr in &addrs {
        if let Some(reason) = safety::blocked_reason(*addr) {
            return Err(NormalizeError::BlockedTarget(format!(
                "{} resolves to {reason}",
                ctx.host
            )));
        }
    }
    Ok(ResolvedAddrs { addrs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_short_and_accepts_boundary_length() {
        let exactly_nine = "a".repeat(9);
        assert!(normalize(&exactly_nine).is_err());
    }

    #[test]
    fn rejects_over_budget_length() {
        let too_long = format!("https://example.com/{}", "a".repeat(2049));
        assert!(normalize(&too_long).is_err());
    }

    #[test]
    fn lowercases_scheme_and_host() {
        let ctx = normalize("HTTPS://WWW.Example.COM/Path").unwrap();
        assert_eq!(ctx.scheme, "https");
        assert_eq!(ctx.host, "www.example.com");
    }

    #[test]
    fn strips_default_port() {
        let ctx = normalize("https://example.com:443/").unwrap();
        assert_eq!(ctx.port, None);
    }

    #[test]
    fn keeps_nondefault_port() {
        let ctx = normalize("https://example.com:8443/").unwrap();
        assert_eq!(ctx.port, Some(8443));
    }

    #[test]
    fn strips_trailing_host_dot() {
        let ctx = normalize("https://example.com./path").unwrap();
        assert_eq!(ctx.host, "example.com");
    }

    #[test]
    fn rejects_private_ip_literal() {
        let err = normalize("http://192.168.1.1/admin").unwrap_err();
        assert!(matches!(err, NormalizeError::BlockedTarget(_)));
    }

    #[test]
    fn rejects_metadata_address() {
        let err = normalize("http://169.254.169.254/latest").unwrap_err();
        assert!(matches!(err, NormalizeError::BlockedTarget(_)));
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert!(normalize("ftp://example.com/file").is_err());
    }

    #[test]
    fn registrable_domain_strips_subdomains() {
        let ctx = normalize("https://accounts.google.com/signin").unwrap();
        assert_eq!(ctx.registrable_domain, "google.com");
        assert_eq!(ctx.subdomain_labels(), vec!["accounts"]);
    }

    #[test]
    fn detects_punycode_label() {
        let ctx = normalize("https://xn--pypal-4ve.com").unwrap();
        assert!(ctx.has_punycode);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("HTTPS://Example.com:443/a/../b").unwrap();
        let twice = normalize(&once.normalized).unwrap();
        assert_eq!(once.normalized, twice.normalized);
    }

    #[tokio::test]
    async fn resolve_safety_is_a_noop_for_ip_literals() {
        let ctx = normalize("http://8.8.8.8/").unwrap();
        let resolver = FixedResolver::new();
        let resolved = resolve_safety(&ctx, &resolver).await.unwrap();
        assert!(resolved.addrs.is_empty());
    }

    #[tokio::test]
    async fn resolve_safety_allows_a_host_resolving_to_a_public_address() {
        let ctx = normalize("https://example.com/").unwrap();
        let resolver = FixedResolver::new().with("example.com", vec!["93.184.216.34".parse().unwrap()]);
        let resolved = resolve_safety(&ctx, &resolver).await.unwrap();
        assert_eq!(resolved.addrs, vec!["93.184.216.34".parse::<IpAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn resolve_safety_blocks_a_host_that_resolves_to_a_private_address() {
        let ctx = normalize("https://rebind.example/").unwrap();
        let resolver = FixedResolver::new().with("rebind.example", vec!["127.0.0.1".parse().unwrap()]);
        let err = resolve_safety(&ctx, &resolver).await.unwrap_err();
        assert!(matches!(err, NormalizeError::BlockedTarget(_)));
    }
}
