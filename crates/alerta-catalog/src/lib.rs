//! Static reference data consulted by the feature extractor and the
//! heuristic predictor: impersonated brands, suspicious keywords, risky
//! TLDs, shortener/paste-service domains, and a trusted-domain allowlist.
//!
//! All of it is loaded once at boot (`Catalog::default()`) and never
//! mutated afterward — callers share one `Catalog` behind an `Arc`.

use serde::Serialize;
use std::collections::HashSet;

/// A brand whose registrable domain may be impersonated by a malicious
/// lookalike.
#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    /// Canonical brand name, e.g. "paypal".
    pub name: &'static str,
    /// The brand's legitimate registrable domain, e.g. "paypal.com".
    pub canonical_domain: &'static str,
}

/// Static reference data, loaded once and shared read-only.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub brands: Vec<Brand>,
    pub suspicious_keywords: HashSet<&'static str>,
    pub risky_tlds: HashSet<&'static str>,
    pub shortener_domains: HashSet<&'static str>,
    pub paste_domains: HashSet<&'static str>,
    pub trusted_domains: HashSet<&'static str>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            brands: vec![
                Brand { name: "paypal", canonical_domain: "paypal.com" },
                Brand { name: "google", canonical_domain: "google.com" },
                Brand { name: "microsoft", canonical_domain: "microsoft.com" },
                Brand { name: "apple", canonical_domain: "apple.com" },
                Brand { name: "amazon", canonical_domain: "amazon.com" },
                Brand { name: "facebook", canonical_domain: "facebook.com" },
                Brand { name: "netflix", canonical_domain: "netflix.com" },
                Brand { name: "instagram", canonical_domain: "instagram.com" },
                Brand { name: "bankofamerica", canonical_domain: "bankofamerica.com" },
                Brand { name: "chase", canonical_domain: "chase.com" },
                Brand { name: "wellsfargo", canonical_domain: "wellsfargo.com" },
                Brand { name: "dropbox", canonical_domain: "dropbox.com" },
                Brand { name: "linkedin", canonical_domain: "linkedin.com" },
                Brand { name: "coinbase", canonical_domain: "coinbase.com" },
                Brand { name: "binance", canonical_domain: "binance.com" },
            ],
            suspicious_keywords: [
                "verify", "secure", "login", "update", "confirm", "account",
                "signin", "banking", "suspended", "password", "unlock",
                "security", "billing", "invoice", "reset",
            ]
            .into_iter()
            .collect(),
            risky_tlds: [
                ".xyz", ".tk", ".top", ".ml", ".ga", ".cf", ".gq", ".work",
                ".click", ".link", ".download", ".stream", ".loan", ".win",
            ]
            .into_iter()
            .collect(),
            shortener_domains: [
                "bit.ly", "tinyurl.com", "goo.gl", "ow.ly", "t.co", "is.gd",
                "buff.ly", "rebrand.ly", "cutt.ly", "shorte.st",
            ]
            .into_iter()
            .collect(),
            paste_domains: [
                "pastebin.com", "paste.ee", "ghostbin.com", "hastebin.com",
                "rentry.co", "controlc.com",
            ]
            .into_iter()
            .collect(),
            trusted_domains: [
                "google.com", "microsoft.com", "apple.com", "amazon.com",
                "wikipedia.org", "github.com", "mozilla.org",
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl Catalog {
    /// Count of suspicious-keyword occurrences anywhere in `haystack`
    /// (case-insensitive).
    pub fn count_suspicious_words(&self, haystack: &str) -> usize {
        let lower = haystack.to_ascii_lowercase();
        self.suspicious_keywords
            .iter()
            .filter(|kw| lower.contains(*kw))
            .count()
    }

    /// True if `tld` (including the leading dot, lowercased) is in the
    /// risky set.
    pub fn is_risky_tld(&self, tld: &str) -> bool {
        self.risky_tlds.contains(tld)
    }

    pub fn is_shortener(&self, host: &str) -> bool {
        self.shortener_domains.contains(host)
    }

    pub fn is_paste_service(&self, host: &str) -> bool {
        self.paste_domains.contains(host)
    }

    pub fn is_trusted(&self, host: &str) -> bool {
        self.trusted_domains.contains(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_reference_brands() {
        let catalog = Catalog::default();
        assert!(catalog.brands.iter().any(|b| b.name == "paypal"));
        assert!(!catalog.brands.is_empty());
    }

    #[test]
    fn keyword_counting_is_case_insensitive() {
        let catalog = Catalog::default();
        assert_eq!(catalog.count_suspicious_words("Please VERIFY your Account"), 2);
        assert_eq!(catalog.count_suspicious_words("https://example.com/x"), 0);
    }

    #[test]
    fn risky_tld_membership() {
        let catalog = Catalog::default();
        assert!(catalog.is_risky_tld(".xyz"));
        assert!(!catalog.is_risky_tld(".com"));
    }

    #[test]
    fn shortener_and_paste_membership() {
        let catalog = Catalog::default();
        assert!(catalog.is_shortener("bit.ly"));
        assert!(catalog.is_paste_service("pastebin.com"));
        assert!(!catalog.is_shortener("example.com"));
    }
}
