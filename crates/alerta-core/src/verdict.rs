//! The response shape (§3 "Verdict (response)", §6.2 "Verdict JSON
//! (exact shape)").

use alerta_crawler::{CrawlReport, Evidence};
use alerta_types::Signal;
use serde::{Deserialize, Serialize};

/// `model` request option / `model_used` response field (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    Ml,
    Heuristic,
}

impl Default for ModelChoice {
    fn default() -> Self {
        ModelChoice::Ml
    }
}

/// `mode` request option / `mode_used` response field. Per §9 "Known
/// ambiguities" #3, the mobile "offline" mode is described in the
/// source material but never wired to the scoring engine: this is
/// recorded verbatim in `mode_used` and otherwise has no effect on
/// which collaborators `Engine::analyze` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Auto,
    Online,
    Offline,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Auto
    }
}

/// `analyze(url, options)` request options (§4.8).
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub model: ModelChoice,
    pub mode: Mode,
    pub enable_crawler: bool,
    pub timeout_seconds: Option<u64>,
    pub max_redirects: Option<u32>,
}

/// Which external collaborators returned a non-`Unavailable` result
/// (§3 "apis_consulted"). The data model names `{tranco,virustotal,
/// whois,crawler}` as the authoritative set; see DESIGN.md for the
/// resolution of this against §6.2's narrower JSON sample.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ApisConsulted {
    pub tranco: bool,
    pub virustotal: bool,
    pub whois: bool,
    pub crawler: bool,
}

/// `crawl?` response field: the crawl report plus whether crawling was
/// even attempted for this request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    pub enabled: bool,
    pub status: String,
    pub final_url: String,
    pub redirect_chain: Vec<String>,
    pub html_fingerprint: String,
    pub evidence: Evidence,
}

impl CrawlSection {
    pub fn from_report(report: &CrawlReport) -> Self {
        Self {
            enabled: true,
            status: format!("{:?}", report.status),
            final_url: report.final_url.clone(),
            redirect_chain: report.redirect_chain.clone(),
            html_fingerprint: report.html_fingerprint.clone(),
            evidence: report.evidence.clone(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            status: String::new(),
            final_url: String::new(),
            redirect_chain: Vec::new(),
            html_fingerprint: String::new(),
            evidence: Evidence::default(),
        }
    }
}

/// `timestamps` response field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timestamps {
    pub requested_at: String,
    pub completed_at: String,
    pub duration_ms: i64,
}

/// C10's primary output (§3, §6.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub url: String,
    pub normalized_url: String,
    pub score: i64,
    pub risk_level: alerta_types::RiskLevel,
    pub model_used: ModelChoice,
    pub mode_used: Mode,
    pub apis_consulted: ApisConsulted,
    pub signals: Vec<Signal>,
    pub recommendations: Vec<String>,
    pub crawl: Option<CrawlSection>,
    pub timestamps: Timestamps,
}
