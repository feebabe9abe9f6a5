//! Brand-impersonation heuristic (§4.2).
//!
//! Flags a host whose registrable second-level label is a near-miss of a
//! known brand (Damerau–Levenshtein similarity ≥ 0.70, excluding the
//! exact legitimate label), or that carries the brand name as a
//! non-final subdomain label (`paypal.example.xyz`).
//!
//! The label is IDNA-decoded before comparison, so a homograph label
//! (`xn--pypal-4ve`) is judged in the Unicode script it visually
//! impersonates rather than in its opaque Punycode ACE form, and it is
//! also compared segment-by-segment on `-` with common leetspeak digit
//! substitutions undone (`paypa1-secure` -> `paypal`, `secure`), since a
//! single whole-label comparison misses both of those lookalike shapes.

use alerta_catalog::Catalog;
use alerta_normalize::UrlContext;

const SIMILARITY_THRESHOLD: f64 = 0.70;

fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::damerau_levenshtein(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

/// Undoes common leetspeak digit-for-letter substitutions seen in
/// lookalike registrations, e.g. "paypa1" -> "paypal".
fn undo_digit_substitutions(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0' => 'o',
            '1' => 'l',
            '3' => 'e',
            '4' => 'a',
            '5' => 's',
            '7' => 't',
            other => other,
        })
        .collect()
}

/// Decodes a Punycode (`xn--`) label to its Unicode form; returns the
/// label unchanged if it isn't Punycode or fails to decode.
fn decoded_label(label: &str) -> String {
    if label.starts_with("xn--") {
        let (decoded, result) = idna::domain_to_unicode(label);
        if result.is_ok() {
            return decoded;
        }
    }
    label.to_string()
}

fn is_close(candidate: &str, brand: &str) -> bool {
    candidate == brand || normalized_similarity(candidate, brand) >= SIMILARITY_THRESHOLD
}

/// Every string worth comparing against a brand name: the decoded label
/// itself, its digit-substituted form, and the same pair for each
/// hyphen-delimited segment.
fn candidate_tokens(decoded: &str) -> Vec<String> {
    let mut tokens = vec![decoded.to_string(), undo_digit_substitutions(decoded)];
    for segment in decoded.split('-') {
        tokens.push(segment.to_string());
        tokens.push(undo_digit_substitutions(segment));
    }
    tokens
}

pub fn detect(ctx: &UrlContext, catalog: &Catalog) -> bool {
    let label = ctx.second_level_label();
    let subdomains = ctx.subdomain_labels();
    let decoded = decoded_label(label);

    catalog.brands.iter().any(|brand| {
        if decoded == brand.name {
            return false;
        }
        if candidate_tokens(&decoded).iter().any(|token| is_close(token, brand.name)) {
            return true;
        }
        subdomains.iter().any(|sub| *sub == brand.name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_for(host: &str, registrable: &str) -> UrlContext {
        UrlContext {
            original: format!("https://{host}/"),
            normalized: format!("https://{host}/"),
            scheme: "https".to_string(),
            host: host.to_string(),
            registrable_domain: registrable.to_string(),
            port: None,
            path: "/".to_string(),
            query: None,
            has_punycode: false,
            is_ip_literal: false,
        }
    }

    #[test]
    fn detects_lookalike_domain() {
        let catalog = Catalog::default();
        let ctx = ctx_for("paypa1-secure.xyz", "paypa1-secure.xyz");
        assert!(detect(&ctx, &catalog));
    }

    #[test]
    fn does_not_flag_the_real_brand() {
        let catalog = Catalog::default();
        let ctx = ctx_for("paypal.com", "paypal.com");
        assert!(!detect(&ctx, &catalog));
    }

    #[test]
    fn flags_brand_as_nonfinal_subdomain() {
        let catalog = Catalog::default();
        let ctx = ctx_for("paypal.example.xyz", "example.xyz");
        assert!(detect(&ctx, &catalog));
    }

    #[test]
    fn unrelated_domain_is_not_flagged() {
        let catalog = Catalog::default();
        let ctx = ctx_for("my-personal-blog.com", "my-personal-blog.com");
        assert!(!detect(&ctx, &catalog));
    }

    #[test]
    fn detects_punycode_homograph_of_a_brand() {
        let catalog = Catalog::default();
        let ctx = ctx_for("xn--pypal-4ve.com", "xn--pypal-4ve.com");
        assert!(detect(&ctx, &catalog));
    }

    #[test]
    fn digit_substitution_in_a_hyphenated_segment_is_caught() {
        let catalog = Catalog::default();
        let ctx = ctx_for("secure-amaz0n-verify.com", "secure-amaz0n-verify.com");
        assert!(detect(&ctx, &catalog));
    }
}
