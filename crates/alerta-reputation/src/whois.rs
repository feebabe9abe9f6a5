//! C8: WHOIS Client — domain registration age, with a 24h positive /
//! 6h negative cache (§4.6).
//!
//! No crate on the pack's dependency graph exposes a usable WHOIS client
//! (see DESIGN.md), so this queries the protocol directly: RFC 3912 is a
//! plain-text request/response over TCP port 43. We ask IANA's
//! authoritative root server for the TLD's referral, then ask that
//! server for the domain itself, and scrape a creation-date line out of
//! the free-text reply.

use crate::cache::{CacheEntry, Ttl, TtlCache};
use crate::Outcome;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::warn;

const IANA_WHOIS_HOST: &str = "whois.iana.org";
const WHOIS_PORT: u16 = 43;
const TIMEOUT: Duration = Duration::from_secs(3);
const POSITIVE_TTL: Duration = Duration::from_secs(24 * 3600);
const NEGATIVE_TTL: Duration = Duration::from_secs(6 * 3600);
const MAX_RESPONSE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhoisPayload {
    pub age_days: Option<i64>,
    pub registrar: Option<String>,
    pub available: bool,
}

pub struct WhoisClient {
    cache: TtlCache<WhoisPayload>,
    /// Full `host:port` address of the root WHOIS server to query first.
    iana_addr: String,
}

impl WhoisClient {
    pub fn new() -> Self {
        Self::with_iana_addr(format!("{IANA_WHOIS_HOST}:{WHOIS_PORT}"))
    }

    /// Used by tests to point the referral step at a local stub server;
    /// `addr` is a full `host:port` socket address.
    pub fn with_iana_addr(addr: String) -> Self {
        Self {
            cache: TtlCache::new(Ttl { positive: POSITIVE_TTL, negative: NEGATIVE_TTL }, 50_000),
            iana_addr: addr,
        }
    }

    /// §4.6 "Cache keys": lowercased registrable domain.
    pub async fn lookup(&self, registrable_domain: &str) -> Outcome<WhoisPayload> {
        let key = registrable_domain.to_ascii_lowercase();
        let entry = self.cache.get_with(&key, async { self.fetch(&key).await }).await;
        if entry.ok {
            Outcome::Available(entry.value.clone())
        } else {
            Outcome::Unavailable
        }
    }

    async fn fetch(&self, domain: &str) -> CacheEntry<WhoisPayload> {
        match tokio::time::timeout(TIMEOUT, self.query(domain)).await {
            Ok(Ok(payload)) => CacheEntry::positive(payload, "whois"),
            Ok(Err(e)) => {
                warn!(domain, error = %e, "whois lookup failed");
                CacheEntry::negative(WhoisPayload::default(), "whois")
            }
            Err(_) => {
                warn!(domain, "whois lookup timed out");
                CacheEntry::negative(WhoisPayload::default(), "whois")
            }
        }
    }

    async fn query(&self, domain: &str) -> std::io::Result<WhoisPayload> {
        let referral_reply = whois_query(&self.iana_addr, domain).await?;
        let reply = match extract_referral(&referral_reply) {
            Some(host) => whois_query(&normalize_addr(&host), domain).await?,
            None => referral_reply,
        };
        Ok(parse_reply(&reply))
    }
}

/// Appends the default WHOIS port when `host` has none of its own
/// (bare hostnames extracted from a `refer:` line never carry one).
fn normalize_addr(host: &str) -> String {
    if host.contains(':') {
        host.to_string()
    } else {
        format!("{host}:{WHOIS_PORT}")
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

async fn whois_query(addr: &str, domain: &str) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(format!("{domain}\r\n").as_bytes()).await?;
    stream.flush().await?;

    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() >= MAX_RESPONSE_BYTES {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// IANA's referral reply has a `refer: whois.example-registry.net` line.
fn extract_referral(reply: &str) -> Option<String> {
    reply.lines().find_map(|line| {
        let lower = line.to_ascii_lowercase();
        lower.strip_prefix("refer:").map(|rest| rest.trim().to_string())
    })
}

const AVAILABILITY_MARKERS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "status: available",
    "domain not found",
];

fn parse_reply(reply: &str) -> WhoisPayload {
    let lower = reply.to_ascii_lowercase();
    if AVAILABILITY_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return WhoisPayload { age_days: None, registrar: None, available: true };
    }

    let created_at = find_field(reply, &["creation date:", "created:", "created on:", "domain registration date:"])
        .and_then(|raw| parse_date(&raw));
    let age_days = created_at.map(|created| (Utc::now() - created).num_days());
    let registrar = find_field(reply, &["registrar:"]);

    WhoisPayload { age_days, registrar, available: false }
}

fn find_field(reply: &str, prefixes: &[&str]) -> Option<String> {
    reply.lines().find_map(|line| {
        let lower = line.to_ascii_lowercase();
        prefixes.iter().find_map(|prefix| {
            lower.strip_prefix(prefix).map(|_| line[prefix.len()..].trim().to_string())
        })
    })
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    const FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%d", "%d-%b-%Y", "%Y/%m/%d"];
    for format in FORMATS {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, format) {
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, format) {
            return Some(DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0)?, Utc));
        }
    }
    None
}
