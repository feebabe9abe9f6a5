//! Bounded-concurrency gate for crawl instances (§5 "The crawler (C9)
//! runs on a bounded concurrency pool because each instance is
//! resource-heavy").
//!
//! Grounded on the pack's semaphore-gated worker pattern (acquire a
//! permit before spawning, so in-flight work never exceeds the
//! configured limit) rather than hand-rolled counters.

use crate::report::CrawlReport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub struct CrawlerPool {
    semaphore: Arc<Semaphore>,
}

impl CrawlerPool {
    pub fn new(max_concurrent: usize) -> Self {
        Self { semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))) }
    }

    /// Acquire a permit before launching a browser instance, run the
    /// crawl, and release it on completion. The permit is held for the
    /// entire crawl, not just its setup, since each headless instance is
    /// the resource being bounded.
    pub async fn crawl(&self, url: &str, timeout: Duration, max_redirects: u32) -> CrawlReport {
        let _permit = self.semaphore.acquire().await.expect("semaphore never closed");
        crate::crawl(url, timeout, max_redirects).await
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_configured_permit_count() {
        let pool = CrawlerPool::new(3);
        assert_eq!(pool.available_permits(), 3);
    }

    #[test]
    fn zero_is_clamped_to_one_permit() {
        let pool = CrawlerPool::new(0);
        assert_eq!(pool.available_permits(), 1);
    }
}
