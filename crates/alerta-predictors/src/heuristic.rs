//! C5: Heuristic Predictor.
//!
//! Owns every weight-table rule in §4.5: the purely local rules
//! ([`base_signals`]) plus the three externally-gated adjustments
//! ([`tranco_signal`], [`virustotal_signal`], [`whois_signal`]).
//! Orchestration — *when* to call the external collaborators and how to
//! fold their deltas into a running score — is C10's job
//! (`alerta-core`); this module only evaluates predicates against the
//! weights table and never performs I/O.

use alerta_catalog::Catalog;
use alerta_features::FeatureVector;
use alerta_normalize::UrlContext;
use alerta_types::{Severity, Signal, WeightsTable};
use serde_json::json;

const BASE_SCORE: i64 = 15;
const DIGIT_RATIO_THRESHOLD: f64 = 0.30;
const ENTROPY_THRESHOLD: f64 = 3.5;
const LONG_URL_THRESHOLD: i64 = 100;

fn severity_for(weight: i64) -> Severity {
    match weight.unsigned_abs() {
        30.. => Severity::High,
        10..=29 => Severity::Medium,
        _ => Severity::Low,
    }
}

fn push(signals: &mut Vec<Signal>, score: &mut i64, weights: &WeightsTable, id: &str, evidence: serde_json::Value, explanation: &str) {
    let weight = weights.get(id);
    *score += weight;
    signals.push(Signal::new(id, severity_for(weight), weight, evidence, explanation));
}

/// The purely local rules (§4.5 table, rows with no external
/// dependency): step 3 "base signals" and step 5's
/// `score_heuristic_partial` are the same computation.
pub fn base_signals(
    ctx: &UrlContext,
    features: &FeatureVector,
    catalog: &Catalog,
    weights: &WeightsTable,
) -> (i64, Vec<Signal>) {
    let mut score = BASE_SCORE;
    let mut signals = Vec::new();

    if features.contains_ip {
        push(&mut signals, &mut score, weights, "IP_AS_HOST", json!({"host": ctx.host}), "Host is a literal IP address.");
    }
    if !features.has_https {
        push(&mut signals, &mut score, weights, "NO_HTTPS", json!({"scheme": ctx.scheme}), "URL does not use HTTPS.");
    }
    if features.brand_impersonation {
        push(&mut signals, &mut score, weights, "BRAND_IMPERSONATION", json!({"label": ctx.second_level_label()}), "Registrable label closely resembles a known brand.");
    }
    if features.has_suspicious_words >= 1 {
        push(&mut signals, &mut score, weights, "SUSPICIOUS_WORDS", json!({"count": features.has_suspicious_words}), "URL contains suspicious keywords.");
    }
    if features.has_punycode {
        push(&mut signals, &mut score, weights, "PUNYCODE_DETECTED", json!({"host": ctx.host}), "Host contains a Punycode-encoded label.");
    }
    if features.paste_service_detected {
        push(&mut signals, &mut score, weights, "PASTE_SERVICE", json!({"host": ctx.host}), "Host is a known paste service.");
    }
    if features.digit_ratio >= DIGIT_RATIO_THRESHOLD {
        push(&mut signals, &mut score, weights, "HIGH_DIGIT_RATIO", json!({"digit_ratio": features.digit_ratio}), "URL has an unusually high digit ratio.");
    }
    if features.entropy >= ENTROPY_THRESHOLD {
        push(&mut signals, &mut score, weights, "HIGH_ENTROPY", json!({"entropy": features.entropy}), "Host has unusually high character entropy.");
    }
    if features.shortener_detected {
        push(&mut signals, &mut score, weights, "URL_SHORTENER", json!({"host": ctx.host}), "Host is a known URL shortener.");
    }
    if features.has_at_symbol {
        push(&mut signals, &mut score, weights, "AT_SYMBOL", json!({}), "URL contains an '@' character.");
    }
    if features.tld_risk {
        push(&mut signals, &mut score, weights, "RISKY_TLD", json!({}), "Effective TLD is in the risky set.");
    }
    if features.excessive_subdomains {
        push(&mut signals, &mut score, weights, "EXCESSIVE_SUBDOMAINS", json!({"num_subdomains": features.num_subdomains}), "URL has an excessive number of subdomain labels.");
    }
    if features.url_length > LONG_URL_THRESHOLD {
        push(&mut signals, &mut score, weights, "LONG_URL", json!({"url_length": features.url_length}), "URL exceeds the length threshold.");
    }
    if catalog.is_trusted(&ctx.host) {
        push(&mut signals, &mut score, weights, "TRUSTED_DOMAIN", json!({"host": ctx.host}), "Host is on the trusted-domain allowlist.");
    }

    (score.clamp(0, 100), signals)
}

/// §4.8 step 6 (and its converse, since the rule table also defines
/// `DOMAIN_NOT_IN_TRANCO`): `in_top_k` and whether the host is a
/// shortener/paste service (which disqualifies the bonus even when
/// ranked).
pub fn tranco_signal(in_top_k: bool, is_shortener_or_paste: bool, weights: &WeightsTable) -> (i64, Option<Signal>) {
    if in_top_k && !is_shortener_or_paste {
        let weight = weights.get("DOMAIN_IN_TRANCO");
        (
            weight,
            Some(Signal::new("DOMAIN_IN_TRANCO", severity_for(weight), weight, json!({"in_top_k": true}), "Domain is present in the Tranco top list.")),
        )
    } else if !in_top_k {
        let weight = weights.get("DOMAIN_NOT_IN_TRANCO");
        (
            weight,
            Some(Signal::new("DOMAIN_NOT_IN_TRANCO", severity_for(weight), weight, json!({"in_top_k": false}), "Domain is absent from the Tranco top list.")),
        )
    } else {
        (0, None)
    }
}

pub struct VirusTotalOutcome {
    pub malicious: i64,
    pub harmless: i64,
    pub total_engines: i64,
}

/// §4.5/§4.8 step 7.
pub fn virustotal_signal(vt: &VirusTotalOutcome, weights: &WeightsTable) -> (i64, Option<Signal>) {
    let evidence = json!({"malicious": vt.malicious, "harmless": vt.harmless, "total_engines": vt.total_engines});
    let id = match vt.malicious {
        0 if vt.total_engines > 0 && (vt.harmless as f64 / vt.total_engines as f64) >= 0.8 => "VIRUSTOTAL_CLEAN",
        1..=3 => "VIRUSTOTAL_MALICIOUS_LOW",
        4..=6 => "VIRUSTOTAL_MALICIOUS_MED",
        7..=9 => "VIRUSTOTAL_MALICIOUS_HIGH",
        10.. => "VIRUSTOTAL_MALICIOUS_CRITICAL",
        _ => return (0, None),
    };
    let weight = weights.get(id);
    (weight, Some(Signal::new(id, severity_for(weight), weight, evidence, "VirusTotal multi-engine verdict.")))
}

/// §4.5/§4.8 step 8.
pub fn whois_signal(age_days: i64, weights: &WeightsTable) -> (i64, Option<Signal>) {
    let evidence = json!({"age_days": age_days});
    if age_days < 30 {
        let weight = weights.get("DOMAIN_TOO_NEW");
        (weight, Some(Signal::new("DOMAIN_TOO_NEW", severity_for(weight), weight, evidence, "Domain was registered recently.")))
    } else if age_days > 365 {
        let weight = weights.get("DOMAIN_ESTABLISHED");
        (weight, Some(Signal::new("DOMAIN_ESTABLISHED", severity_for(weight), weight, evidence, "Domain has been registered for over a year.")))
    } else {
        (0, None)
    }
}
