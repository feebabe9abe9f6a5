//! Crawler signal synthesis and the Tranco top-k false-positive guard
//! (§4.7 "Signal synthesis" / "Filtering rule").

use crate::evidence::Evidence;
use alerta_types::{Severity, Signal, WeightsTable};
use serde_json::json;

const CRITICAL_SIGNAL_IDS: &[&str] = &[
    "SSL_CERTIFICATE_ERROR",
    "FORM_SUBMITS_EXTERNALLY",
    "REDIRECT_CROSSED_DOMAIN",
];

fn severity_for(weight: i64) -> Severity {
    match weight.unsigned_abs() {
        30.. => Severity::High,
        10..=29 => Severity::Medium,
        _ => Severity::Low,
    }
}

fn push(signals: &mut Vec<Signal>, weights: &WeightsTable, id: &str, evidence: serde_json::Value, explanation: &str) {
    let weight = weights.get(id);
    signals.push(Signal::new(id, severity_for(weight), weight, evidence, explanation));
}

/// Synthesize every applicable crawler signal from `evidence`, then
/// apply the Tranco top-k filter (§4.7): when `host_in_tranco_top_k`,
/// only the critical signals survive.
pub fn crawl_signals(evidence: &Evidence, host_in_tranco_top_k: bool, weights: &WeightsTable) -> Vec<Signal> {
    let mut signals = Vec::new();

    if evidence.has_login_form {
        push(&mut signals, weights, "LOGIN_FORM_DETECTED", json!({}), "Page contains a login form.");
    }
    if evidence.has_password_field {
        push(&mut signals, weights, "PASSWORD_FIELD_DETECTED", json!({}), "Page contains a password input field.");
    }
    if evidence.has_credit_card_field {
        push(&mut signals, weights, "CREDIT_CARD_FORM", json!({}), "Page contains a credit-card input field.");
    }
    if evidence.has_suspicious_inputs {
        push(&mut signals, weights, "SUSPICIOUS_INPUT_FIELDS", json!({}), "Page requests sensitive identifiers (SSN/PIN/CVV).");
    }
    if !evidence.brands_detected.is_empty() {
        push(&mut signals, weights, "BRAND_CONTENT_DETECTED", json!({"brands": evidence.brands_detected}), "Page content references a known brand.");
    }
    if evidence.phishing_phrases_count > 0 {
        push(&mut signals, weights, "PHISHING_PHRASES_DETECTED", json!({"count": evidence.phishing_phrases_count}), "Page text contains common phishing phrasing.");
    }
    if evidence.form_submits_externally {
        push(&mut signals, weights, "FORM_SUBMITS_EXTERNALLY", json!({}), "A form on this page submits to a different domain.");
    }
    if evidence.iframe_count > 2 {
        push(&mut signals, weights, "EXCESSIVE_IFRAMES", json!({"count": evidence.iframe_count}), "Page embeds an unusually large number of iframes.");
    }
    if evidence.hidden_input_count > 0 {
        push(&mut signals, weights, "HIDDEN_INPUTS_DETECTED", json!({"count": evidence.hidden_input_count}), "Page contains hidden input fields.");
    }
    if evidence.ssl_error {
        push(&mut signals, weights, "SSL_CERTIFICATE_ERROR", json!({}), "Navigation encountered a TLS/certificate error.");
    }
    if evidence.redirect_crossed_domain {
        push(&mut signals, weights, "REDIRECT_CROSSED_DOMAIN", json!({}), "Navigation redirected to a different registrable domain than requested.");
    }

    if host_in_tranco_top_k {
        signals.retain(|s| CRITICAL_SIGNAL_IDS.contains(&s.id.as_str()));
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_evidence() -> Evidence {
        Evidence {
            has_login_form: true,
            has_password_field: true,
            has_credit_card_field: false,
            has_suspicious_inputs: false,
            page_title: None,
            brands_detected: Vec::new(),
            phishing_phrases_count: 0,
            form_submits_externally: true,
            iframe_count: 0,
            hidden_input_count: 0,
            ssl_error: true,
            redirect_crossed_domain: false,
        }
    }

    #[test]
    fn synthesizes_a_signal_per_evidence_field() {
        let weights = WeightsTable::default();
        let signals = crawl_signals(&sample_evidence(), false, &weights);
        let ids: Vec<&str> = signals.iter().map(|s| s.id.as_str()).collect();
        assert!(ids.contains(&"LOGIN_FORM_DETECTED"));
        assert!(ids.contains(&"PASSWORD_FIELD_DETECTED"));
        assert!(ids.contains(&"FORM_SUBMITS_EXTERNALLY"));
        assert!(ids.contains(&"SSL_CERTIFICATE_ERROR"));
    }

    #[test]
    fn tranco_top_k_suppresses_non_critical_signals() {
        let weights = WeightsTable::default();
        let signals = crawl_signals(&sample_evidence(), true, &weights);
        let ids: Vec<&str> = signals.iter().map(|s| s.id.as_str()).collect();
        assert!(ids.contains(&"FORM_SUBMITS_EXTERNALLY"));
        assert!(ids.contains(&"SSL_CERTIFICATE_ERROR"));
        assert!(!ids.contains(&"LOGIN_FORM_DETECTED"));
        assert!(!ids.contains(&"PASSWORD_FIELD_DETECTED"));
    }

    #[test]
    fn no_evidence_yields_no_signals() {
        let weights = WeightsTable::default();
        let signals = crawl_signals(&Evidence::default(), false, &weights);
        assert!(signals.is_empty());
    }
}
