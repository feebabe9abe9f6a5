//! The normalized, immutable URL context produced by C1 and consumed by
//! every downstream component (§3 "URL context (request-scoped)").

use serde::Serialize;

/// A canonicalized view of one request's URL. Built once by
/// [`crate::normalize`], immutable afterward, and dropped at the end of
/// the request.
#[derive(Debug, Clone, Serialize)]
pub struct UrlContext {
    /// The raw string exactly as submitted by the caller.
    pub original: String,
    /// The canonical form: lowercase scheme/host, default port stripped,
    /// path percent-normalized, trailing host dot removed.
    pub normalized: String,
    pub scheme: String,
    /// Lowercase host. For domain hosts this is already ASCII
    /// (punycode-encoded by the `url` crate's parser if the caller
    /// supplied a non-ASCII label).
    pub host: String,
    /// The registrable (effective second-level) domain, e.g.
    /// `example.co.uk` for `www.example.co.uk`. Equal to `host` when the
    /// host is an IP literal.
    pub registrable_domain: String,
    /// `None` if the port is absent or equal to the scheme's default.
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    /// True if any label of `host` begins with `xn--`.
    pub has_punycode: bool,
    /// True if `host` parses as an IPv4 or IPv6 literal.
    pub is_ip_literal: bool,
}

impl UrlContext {
    /// Labels of `host` to the left of the registrable domain, e.g.
    /// `["www", "accounts"]` for `www.accounts.example.com`.
    pub fn subdomain_labels(&self) -> Vec<&str> {
        if self.is_ip_literal || self.host == self.registrable_domain {
            return Vec::new();
        }
        let suffix = format!(".{}", self.registrable_domain);
        match self.host.strip_suffix(&suffix) {
            Some(prefix) if !prefix.is_empty() => {
                prefix.split('.').collect()
            }
            _ => Vec::new(),
        }
    }

    /// Second-level label of the registrable domain, e.g. `"paypal"` for
    /// `paypal.com`. Used by the brand-impersonation heuristic.
    pub fn second_level_label(&self) -> &str {
        self.registrable_domain
            .split('.')
            .next()
            .unwrap_or(&self.registrable_domain)
    }
}
