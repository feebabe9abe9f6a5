//! C2: Feature Extractor.
//!
//! Computes the 24-field [`FeatureVector`] from a [`UrlContext`]. Total
//! and pure: every well-formed context (i.e. one that already passed C1)
//! produces a complete, finite-valued record, never an error.

mod brand;
mod entropy;
mod vector;

pub use vector::{FeatureVector, FEATURE_NAMES};

use alerta_catalog::Catalog;
use alerta_normalize::UrlContext;

const ALLOWED_UNRESERVED: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789./:?=&_-";

/// Extract the fixed feature record for `ctx`. `tranco` fields start at
/// their placeholder values; the orchestrator fills them in via
/// [`FeatureVector::apply_tranco`] once C6 has run.
pub fn extract(ctx: &UrlContext, catalog: &Catalog) -> FeatureVector {
    let url_length = ctx.normalized.len() as i64;
    let domain_length = ctx.registrable_domain.len() as i64;
    let path_length = ctx.path.len() as i64;

    let num_digits = ctx.normalized.chars().filter(|c| c.is_ascii_digit()).count() as i64;
    let num_hyphens = ctx.normalized.matches('-').count() as i64;
    let num_dots = ctx.normalized.matches('.').count() as i64;
    let num_subdomains = ctx.subdomain_labels().len() as i64;

    let entropy = entropy::shannon_entropy(&ctx.host);

    let has_https = ctx.scheme == "https";
    let has_port = ctx.port.is_some();
    let has_at_symbol = ctx.normalized.contains('@');
    let contains_ip = ctx.is_ip_literal;
    let has_punycode = ctx.has_punycode;

    let shortener_detected = catalog.is_shortener(&ctx.host);
    let paste_service_detected = catalog.is_paste_service(&ctx.host);
    let has_suspicious_words = catalog.count_suspicious_words(&ctx.normalized) as i64;

    let tld_risk = effective_tld(ctx)
        .map(|tld| catalog.is_risky_tld(&tld))
        .unwrap_or(false);

    let excessive_subdomains = num_subdomains > 3;

    let digit_ratio = if url_length > 0 {
        num_digits as f64 / url_length as f64
    } else {
        0.0
    };

    let num_params = ctx.query.as_deref().unwrap_or("").matches('=').count() as i64;

    let special_chars = ctx
        .normalized
        .chars()
        .filter(|c| !ALLOWED_UNRESERVED.contains(*c))
        .count() as i64;

    let brand_impersonation = brand::detect(ctx, catalog);

    FeatureVector {
        url_length,
        domain_length,
        path_length,
        num_digits,
        num_hyphens,
        num_dots,
        num_subdomains,
        entropy,
        has_https,
        has_port,
        has_at_symbol,
        contains_ip,
        has_punycode,
        shortener_detected,
        paste_service_detected,
        has_suspicious_words,
        tld_risk,
        excessive_subdomains,
        digit_ratio,
        num_params,
        special_chars,
        in_tranco: false,
        tranco_rank: 0.0,
        brand_impersonation,
    }
}

/// `.{suffix}` for the host's registered public suffix, e.g. `.co.uk`.
/// `None` for IP literals.
fn effective_tld(ctx: &UrlContext) -> Option<String> {
    if ctx.is_ip_literal {
        return None;
    }
    psl::suffix(ctx.host.as_bytes())
        .map(|s| format!(".{}", String::from_utf8_lossy(s.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_for(url: &str) -> FeatureVector {
        let catalog = Catalog::default();
        let ctx = alerta_normalize::normalize(url).unwrap();
        extract(&ctx, &catalog)
    }

    #[test]
    fn produces_all_24_fields_with_finite_values() {
        let fv = extract_for("https://www.example.com/a/b?c=1");
        assert!(fv.entropy.is_finite());
        assert!(fv.digit_ratio.is_finite());
        assert!(fv.tranco_rank.is_finite());
    }

    #[test]
    fn https_scheme_is_detected() {
        assert!(extract_for("https://example.com/x").has_https);
        assert!(!extract_for("http://example.com/x").has_https);
    }

    #[test]
    fn ip_literal_sets_contains_ip() {
        let catalog = Catalog::default();
        // 8.8.8.8 is a public IP, won't be SSRF-blocked.
        let ctx = alerta_normalize::normalize("http://8.8.8.8/x").unwrap();
        let fv = extract(&ctx, &catalog);
        assert!(fv.contains_ip);
    }

    #[test]
    fn shortener_detected_for_known_host() {
        let fv = extract_for("https://bit.ly/abcd1234");
        assert!(fv.shortener_detected);
    }

    #[test]
    fn excessive_subdomains_threshold() {
        let fv = extract_for("https://a.b.c.d.example.com/");
        assert!(fv.excessive_subdomains);
        assert_eq!(fv.num_subdomains, 4);
    }

    #[test]
    fn risky_tld_detected() {
        let fv = extract_for("https://free-gift.xyz/claim");
        assert!(fv.tld_risk);
    }

    #[test]
    fn tranco_fields_start_as_placeholder() {
        let fv = extract_for("https://example.com/");
        assert!(!fv.in_tranco);
        assert_eq!(fv.tranco_rank, 0.0);
    }

    #[test]
    fn apply_tranco_sets_rank_and_flag() {
        let mut fv = extract_for("https://example.com/");
        fv.apply_tranco(Some(1), 100_000);
        assert!(fv.in_tranco);
        assert!(fv.tranco_rank > 0.99);

        let mut fv2 = extract_for("https://example.com/");
        fv2.apply_tranco(None, 100_000);
        assert!(!fv2.in_tranco);
        assert_eq!(fv2.tranco_rank, 0.0);
    }

    #[test]
    fn monotonic_suspicious_word_count_never_decreases_score_input() {
        let low = extract_for("https://example.com/home");
        let high = extract_for("https://example.com/verify-login-update");
        assert!(high.has_suspicious_words >= low.has_suspicious_words);
    }

    #[test]
    fn feature_names_has_24_entries_matching_struct() {
        assert_eq!(FEATURE_NAMES.len(), 24);
        let fv = extract_for("https://example.com/");
        assert_eq!(fv.to_ordered_values().len(), 24);
    }
}
