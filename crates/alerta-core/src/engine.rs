//! The `Engine` facade (C10): owns every long-lived collaborator and
//! runs the analysis pipeline of §4.8.
//!
//! Grounded on the teacher's `Sentinel` struct and its
//! `analyze_tool_call` method: a facade holding one instance of each
//! collaborator, with a single public entry point that runs them in a
//! fixed sequence and folds their results into one outcome. Where the
//! teacher short-circuits on the first phase that blocks, this engine
//! instead always runs the full pipeline and fuses every phase's output
//! into a single score — ALERTA-LINK has no pass/fail gate before C10,
//! only signals that accumulate.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::verdict::{ApisConsulted, CrawlSection, ModelChoice, Timestamps, Verdict};
use alerta_catalog::Catalog;
use alerta_crawler::CrawlerPool;
use alerta_limiter::{Decision, RateLimiter};
use alerta_normalize::{Resolver, SystemResolver};
use alerta_predictors::model::PredictOutcome;
use alerta_predictors::{heuristic, score_from_probability, MLPredictor, VirusTotalOutcome};
use alerta_reputation::{Outcome, TrancoClient, VirusTotalClient, WhoisClient};
use alerta_storage::{AnalysisResult, ResultStore};
use alerta_types::{order_signals, RiskLevel, Signal, Severity, WeightsArtifact, WeightsTable};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::warn;

/// C10: the orchestrator and fusion engine. One instance is built at
/// boot and shared (behind an `Arc`, by the binary crates) across every
/// request.
///
/// `weights` and `ml_predictor` are `RwLock`-wrapped rather than plain
/// fields so [`Engine::reload_artifacts`] can swap in a freshly-read
/// artifact without restarting the process (§3 "reloadable on a
/// SIGHUP-equivalent signal").
pub struct Engine {
    config: EngineConfig,
    catalog: Catalog,
    weights: RwLock<WeightsTable>,
    ml_predictor: RwLock<MLPredictor>,
    tranco: TrancoClient,
    virustotal: VirusTotalClient,
    whois: WhoisClient,
    crawler_pool: CrawlerPool,
    limiter: RateLimiter,
    storage: Box<dyn ResultStore>,
    resolver: Arc<dyn Resolver>,
}

impl Engine {
    /// Boot sequence (§6.3, §6.4): load the model artifact and weights
    /// artifact if configured (falling back to heuristic-only / default
    /// weights on any failure), construct every collaborator, and select
    /// the persistence backend. DNS resolution goes through the real
    /// system resolver; use [`Engine::with_resolver`] to supply a fixed
    /// address table instead (tests).
    pub async fn new(config: EngineConfig) -> Result<Self> {
        Self::with_resolver(config, Arc::new(SystemResolver)).await
    }

    /// As [`Engine::new`], but resolves domain hosts through `resolver`
    /// rather than live DNS — the seam `alerta-core`'s own tests use to
    /// stay hermetic, analogous to `TrancoClient::with_base_url`.
    pub async fn with_resolver(config: EngineConfig, resolver: Arc<dyn Resolver>) -> Result<Self> {
        let ml_predictor = load_ml_predictor(&config).await;
        let weights = load_weights(&config).await;

        let tranco = TrancoClient::new(
            config.tranco.rank_threshold,
            config.tranco.api_key.clone(),
            config.tranco.api_email.clone(),
        );
        let virustotal = VirusTotalClient::new(config.virustotal.api_key.clone(), config.virustotal.quota_per_minute);
        let whois = WhoisClient::new();
        let crawler_pool = CrawlerPool::new(config.crawler.max_concurrent);
        let limiter = RateLimiter::new(config.limiter);
        let storage = alerta_storage::from_database_url(config.global.database_url.as_deref(), &config.global.json_store_dir).await?;

        Ok(Self {
            config,
            catalog: Catalog::default(),
            weights: RwLock::new(weights),
            ml_predictor: RwLock::new(ml_predictor),
            tranco,
            virustotal,
            whois,
            crawler_pool,
            limiter,
            storage,
            resolver,
        })
    }

    /// Re-reads the model and weights artifacts from the paths fixed at
    /// boot and swaps them in atomically, without disturbing any other
    /// collaborator or in-flight request. Triggered by a SIGHUP-equivalent
    /// signal in the binary crates; never called from `analyze` itself.
    pub async fn reload_artifacts(&self) -> Result<()> {
        let ml_predictor = load_ml_predictor(&self.config).await;
        let weights = load_weights(&self.config).await;

        *self.weights.write().unwrap() = weights;
        *self.ml_predictor.write().unwrap() = ml_predictor;
        Ok(())
    }

    /// §4.9: the rate limiter wraps the public entry point entirely. An
    /// exhausted bucket rejects the request before `analyze` ever runs.
    pub fn check_rate_limit(&self, client_id: &str) -> Decision {
        self.limiter.check(client_id)
    }

    /// `GET /health` (§6.1): whether the ML predictor loaded a verified
    /// artifact at boot.
    pub fn model_loaded(&self) -> bool {
        self.ml_predictor.read().unwrap().is_available()
    }

    /// `GET /health`: whether each reputation API is configured with
    /// credentials, not whether a live lookup would currently succeed.
    pub fn tranco_configured(&self) -> bool {
        self.config.tranco.api_key.is_some()
    }

    pub fn virustotal_configured(&self) -> bool {
        self.config.virustotal.api_key.is_some()
    }

    /// §4.8: the 11-step analysis pipeline.
    pub async fn analyze(&self, raw_url: &str, options: &crate::verdict::AnalyzeOptions) -> Result<Verdict> {
        let requested_at = Utc::now();
        let started = Instant::now();

        // Step 1: normalize + safety gate (C1). Never suspends except
        // for the DNS-resolution half, which always runs regardless of
        // `mode` since it guards against a malicious target, not an
        // external reputation lookup.
        let ctx = alerta_normalize::normalize(raw_url)?;
        alerta_normalize::resolve_safety(&ctx, self.resolver.as_ref()).await?;

        // Snapshot the reloadable artifacts once per request, cloned out
        // from behind the lock rather than held across the `.await`
        // points below, so a concurrent `reload_artifacts` can't apply
        // half-old, half-new weights within a single pipeline run and the
        // guards never make this future non-`Send`.
        let weights = self.weights.read().unwrap().clone();
        let ml_predictor = self.ml_predictor.read().unwrap().clone();

        // Step 2: feature extraction (C2).
        let mut features = alerta_features::extract(&ctx, &self.catalog);

        // Step 3: purely local heuristic signals (C5), which also doubles
        // as step 5's `score_heuristic_partial` before any external
        // adjustment is folded in.
        let (score_heuristic_partial, mut signals) = heuristic::base_signals(&ctx, &features, &self.catalog, &weights);
        let mut score = score_heuristic_partial;

        let crawl_enabled = options.enable_crawler;
        let crawl_timeout = Duration::from_secs(options.timeout_seconds.unwrap_or(self.config.crawler.default_timeout_secs));
        let max_redirects = options.max_redirects.unwrap_or(self.config.crawler.default_max_redirects);

        // Step 4 (Tranco, always attempted) and step 9's crawl (depends
        // only on step 1) run concurrently (§5 "C9 ... may run alongside
        // C6-C8").
        let (tranco_outcome, crawl_report) = tokio::join!(
            self.tranco.lookup(&ctx.registrable_domain),
            async {
                if crawl_enabled {
                    Some(self.crawler_pool.crawl(&ctx.normalized, crawl_timeout, max_redirects).await)
                } else {
                    None
                }
            }
        );

        let in_top_k = match &tranco_outcome {
            Outcome::Available(payload) => {
                features.apply_tranco(payload.rank, self.config.tranco.rank_threshold);
                payload.in_top_k
            }
            Outcome::Unavailable => false,
        };
        let is_shortener_or_paste = features.shortener_detected || features.paste_service_detected;

        // Step 5: fuse the ML and heuristic predictors per the requested
        // model (§4.4, §4.8).
        let mut model_used = options.model;
        let mut ml_score: Option<i64> = None;
        match options.model {
            ModelChoice::Heuristic => {}
            ModelChoice::Ml => match ml_predictor.predict(&features) {
                PredictOutcome::Available { probability } => {
                    let score_ml = score_from_probability(probability);
                    ml_score = Some(score_ml);
                    if (score_ml - score_heuristic_partial).abs() > 50 {
                        signals.push(Signal::new(
                            "ML_HEURISTIC_DIVERGENCE",
                            Severity::Low,
                            0,
                            serde_json::json!({"score_ml": score_ml, "score_heuristic": score_heuristic_partial}),
                            "The ML and heuristic predictors disagree by more than 50 points; both scores are preserved for audit.",
                        ));
                    }
                    score = score_ml.max(score_heuristic_partial);
                }
                PredictOutcome::Unavailable => {
                    model_used = ModelChoice::Heuristic;
                }
            },
        }

        // Step 6: Tranco adjustment.
        let (delta, tranco_signal) = heuristic::tranco_signal(in_top_k, is_shortener_or_paste, &weights);
        score = (score + delta).clamp(0, 100);
        if let Some(s) = tranco_signal {
            signals.push(s);
        }

        // Steps 7 and 8 may run concurrently (§5): VirusTotal only inside
        // the uncertainty window, WHOIS only when the host isn't already
        // Tranco top-k verified.
        let need_vt = (self.config.virustotal.uncertainty_min..=self.config.virustotal.uncertainty_max).contains(&score);
        let need_whois = !in_top_k;

        let (vt_outcome, whois_outcome) = tokio::join!(
            async {
                if need_vt {
                    Some(self.virustotal.lookup(&ctx.normalized).await)
                } else {
                    None
                }
            },
            async {
                if need_whois {
                    Some(self.whois.lookup(&ctx.registrable_domain).await)
                } else {
                    None
                }
            }
        );

        if let Some(Outcome::Available(payload)) = &vt_outcome {
            let vt = VirusTotalOutcome {
                malicious: payload.malicious,
                harmless: payload.harmless,
                total_engines: payload.total_engines,
            };
            let (delta, signal) = heuristic::virustotal_signal(&vt, &weights);
            score = (score + delta).clamp(0, 100);
            if let Some(s) = signal {
                signals.push(s);
            }
        }

        if let Some(Outcome::Available(payload)) = &whois_outcome {
            if let Some(age_days) = payload.age_days {
                let (delta, signal) = heuristic::whois_signal(age_days, &weights);
                score = (score + delta).clamp(0, 100);
                if let Some(s) = signal {
                    signals.push(s);
                }
            }
        }

        // Step 9: merge the crawl signals already awaited above, subject
        // to the Tranco top-k filtering rule (§4.7).
        let crawl_section = match &crawl_report {
            Some(report) => {
                let extra = alerta_crawler::crawl_signals(&report.evidence, in_top_k, &weights);
                for s in &extra {
                    score = (score + s.weight).clamp(0, 100);
                }
                signals.extend(extra);
                Some(CrawlSection::from_report(report))
            }
            None if crawl_enabled => Some(CrawlSection::disabled()),
            None => None,
        };

        // Step 10: clamp and bucket.
        let score = score.clamp(0, 100);
        let risk_level = RiskLevel::from_score(score);

        // Step 11: stable ordering, recommendations, apis_consulted.
        order_signals(&mut signals);
        let recommendations = crate::recommendations::build(risk_level, &signals);

        let apis_consulted = ApisConsulted {
            tranco: tranco_outcome.is_available(),
            virustotal: vt_outcome.as_ref().is_some_and(Outcome::is_available),
            whois: whois_outcome.as_ref().is_some_and(Outcome::is_available),
            crawler: crawl_report.is_some(),
        };

        let completed_at = Utc::now();
        let duration_ms = started.elapsed().as_millis() as i64;

        let verdict = Verdict {
            url: raw_url.to_string(),
            normalized_url: ctx.normalized.clone(),
            score,
            risk_level,
            model_used,
            mode_used: options.mode,
            apis_consulted,
            signals,
            recommendations,
            crawl: crawl_section,
            timestamps: Timestamps {
                requested_at: requested_at.to_rfc3339(),
                completed_at: completed_at.to_rfc3339(),
                duration_ms,
            },
        };

        if let Err(e) = self
            .persist_analysis(&ctx, &verdict, ml_score, score_heuristic_partial, duration_ms)
            .await
        {
            warn!(error = %e, url = raw_url, "failed to persist analysis result");
        }

        Ok(verdict)
    }

    async fn persist_analysis(
        &self,
        ctx: &alerta_normalize::UrlContext,
        verdict: &Verdict,
        ml_score: Option<i64>,
        heuristic_score: i64,
        duration_ms: i64,
    ) -> alerta_storage::Result<()> {
        let record = AnalysisResult {
            url: verdict.url.clone(),
            url_hash: url_hash(&ctx.normalized),
            score: verdict.score,
            risk_level: format!("{:?}", verdict.risk_level).to_uppercase(),
            signals: serde_json::to_value(&verdict.signals).unwrap_or(serde_json::Value::Null),
            ml_score,
            heuristic_score,
            tranco_verified: verdict.apis_consulted.tranco,
            virustotal_checked: verdict.apis_consulted.virustotal,
            duration_ms,
            created_at: verdict.timestamps.completed_at.clone(),
        };
        self.storage.record_analysis(&record).await
    }

    /// `/ingest` (§6.1): accepted labeled training data, passed straight
    /// through to persistence.
    pub async fn ingest(&self, record: &alerta_storage::IngestedUrl) -> Result<()> {
        self.storage.ingest(record).await.map_err(EngineError::from)
    }

    /// `/report` (§6.1): a user-submitted abuse report.
    pub async fn report(&self, record: &alerta_storage::Report) -> Result<()> {
        self.storage.report(record).await.map_err(EngineError::from)
    }

    /// `/whois/{domain}` (§6.1): a direct WHOIS pass-through, independent
    /// of the scoring pipeline.
    pub async fn whois_lookup(&self, registrable_domain: &str) -> Outcome<alerta_reputation::WhoisPayload> {
        self.whois.lookup(registrable_domain).await
    }

    pub async fn count_analyses(&self) -> Result<i64> {
        self.storage.count_analyses().await.map_err(EngineError::from)
    }
}

async fn load_ml_predictor(config: &EngineConfig) -> MLPredictor {
    match &config.model.path {
        Some(path) => match (tokio::fs::read(path).await, &config.model.authorized_sha256) {
            (Ok(bytes), Some(hash)) => MLPredictor::load(&bytes, hash),
            (Ok(_), None) => {
                warn!("MODEL_PATH configured without an authorized hash; ML predictor unavailable");
                MLPredictor::unavailable()
            }
            (Err(e), _) => {
                warn!(error = %e, "failed to read model artifact; ML predictor unavailable");
                MLPredictor::unavailable()
            }
        },
        None => MLPredictor::unavailable(),
    }
}

async fn load_weights(config: &EngineConfig) -> WeightsTable {
    match &config.weights.path {
        Some(path) => match tokio::fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice::<WeightsArtifact>(&bytes) {
                Ok(artifact) => WeightsTable::from_artifact(&artifact),
                Err(e) => {
                    warn!(error = %e, "failed to parse weights artifact; using defaults");
                    WeightsTable::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "failed to read weights artifact; using defaults");
                WeightsTable::default()
            }
        },
        None => WeightsTable::default(),
    }
}

fn url_hash(normalized_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_url.as_bytes());
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}
