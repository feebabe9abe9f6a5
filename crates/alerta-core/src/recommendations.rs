//! Human-readable guidance assembled from the final risk level and
//! signal set (§4.8 step 11 "Assemble recommendations").

use alerta_types::{RiskLevel, Signal};

/// One level-keyed baseline message plus a message per distinctive
/// signal present in the verdict, in the signals' own (already-ordered)
/// sequence.
pub fn build(level: RiskLevel, signals: &[Signal]) -> Vec<String> {
    let mut recommendations = vec![baseline(level).to_string()];

    for signal in signals {
        if let Some(message) = for_signal(&signal.id) {
            recommendations.push(message.to_string());
        }
    }

    recommendations
}

fn baseline(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Safe => "No risk indicators found; this URL appears safe to visit.",
        RiskLevel::Low => "Low risk detected; proceed with ordinary caution.",
        RiskLevel::Medium => "Elevated risk detected; verify the destination before entering any information.",
        RiskLevel::High => "High risk detected; do not enter credentials or personal information on this page.",
    }
}

fn for_signal(id: &str) -> Option<&'static str> {
    Some(match id {
        "IP_AS_HOST" => "The destination is a raw IP address rather than a named domain; legitimate services rarely link this way.",
        "NO_HTTPS" => "The connection is not encrypted; avoid submitting any sensitive data.",
        "BRAND_IMPERSONATION" => "The domain closely resembles a well-known brand; confirm you are on the brand's official site.",
        "PUNYCODE_DETECTED" => "The hostname contains Punycode-encoded characters, a common homograph-attack technique.",
        "PASTE_SERVICE" => "The link points at a paste service rather than the content's original source.",
        "URL_SHORTENER" => "The link has been shortened; the true destination is hidden until you visit it.",
        "DOMAIN_TOO_NEW" => "The domain was registered very recently, a pattern common to short-lived phishing sites.",
        "VIRUSTOTAL_MALICIOUS_LOW" | "VIRUSTOTAL_MALICIOUS_MED" | "VIRUSTOTAL_MALICIOUS_HIGH" | "VIRUSTOTAL_MALICIOUS_CRITICAL" => {
            "Multiple antivirus engines have flagged this URL as malicious."
        }
        "LOGIN_FORM_DETECTED" | "PASSWORD_FIELD_DETECTED" => "The page requests login credentials; verify the site's identity before entering them.",
        "CREDIT_CARD_FORM" => "The page requests payment card details; confirm the site is legitimate before entering them.",
        "SUSPICIOUS_INPUT_FIELDS" => "The page requests sensitive identifiers such as an SSN, PIN, or CVV.",
        "FORM_SUBMITS_EXTERNALLY" => "A form on this page submits its data to a different domain than the one you're viewing.",
        "REDIRECT_CROSSED_DOMAIN" => "This link redirects to a different domain than the one requested.",
        "SSL_CERTIFICATE_ERROR" => "The site's TLS certificate could not be validated.",
        "PHISHING_PHRASES_DETECTED" => "The page text uses language commonly seen in phishing attempts.",
        _ => return None,
    })
}
