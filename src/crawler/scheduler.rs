//! Per-domain politeness gate
//!
//! This module handles:
//! - Per-domain concurrency limiting via semaphores
//! - Minimum spacing between request starts to the same domain
//! - Per-domain request counting
//!
//! The scheduler is shared by every in-flight page task. Its lock is only held to
//! look up or update domain state, never across an await.

use crate::config::CrawlerConfig;
use crate::state::DomainState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Permission to send one request to a domain
///
/// The domain's concurrency slot is released when this is dropped.
#[derive(Debug)]
pub struct DomainPermit {
    pub domain: String,
    _permit: OwnedSemaphorePermit,
}

#[derive(Debug)]
struct DomainSlot {
    semaphore: Arc<Semaphore>,
    state: DomainState,
}

/// Scheduler enforces per-domain politeness
///
/// The scheduler coordinates:
/// - Per-domain concurrency caps (in-flight requests to one domain)
/// - Per-domain rate limits (minimum time between request starts)
#[derive(Debug)]
pub struct Scheduler {
    /// Per-domain concurrency slots and request state
    domains: Mutex<HashMap<String, DomainSlot>>,

    /// Maximum in-flight requests per domain
    per_domain: usize,

    /// Minimum time between two request starts to one domain
    request_delay: Duration,
}

impl Scheduler {
    /// Creates a new scheduler from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Self {
        Self::with_limits(
            config.concurrent_requests_per_domain as usize,
            Duration::from_millis(config.request_delay),
        )
    }

    /// Creates a scheduler with explicit limits
    pub fn with_limits(per_domain: usize, request_delay: Duration) -> Self {
        Self {
            domains: Mutex::new(HashMap::new()),
            per_domain: per_domain.max(1),
            request_delay,
        }
    }

    /// Waits until a request to `domain` may start
    ///
    /// This method:
    /// 1. Waits for one of the domain's concurrency slots
    /// 2. Books the next start time for the domain
    /// 3. Sleeps until that start time
    ///
    /// Returns None only if the domain's semaphore was closed.
    pub async fn acquire(&self, domain: &str) -> Option<DomainPermit> {
        let semaphore = self.semaphore_for(domain);
        let permit = semaphore.acquire_owned().await.ok()?;

        let wait = self.reserve_slot(domain);
        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} before requesting {}", wait, domain);
            tokio::time::sleep(wait).await;
        }

        Some(DomainPermit {
            domain: domain.to_string(),
            _permit: permit,
        })
    }

    /// Locks the domain map, recovering it from a poisoned lock
    fn domains(&self) -> MutexGuard<'_, HashMap<String, DomainSlot>> {
        self.domains.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_slot<T>(&self, domain: &str, f: impl FnOnce(&mut DomainSlot) -> T) -> T {
        let mut domains = self.domains();
        let slot = domains
            .entry(domain.to_string())
            .or_insert_with(|| DomainSlot {
                semaphore: Arc::new(Semaphore::new(self.per_domain)),
                state: DomainState::new(),
            });
        f(slot)
    }

    fn semaphore_for(&self, domain: &str) -> Arc<Semaphore> {
        self.with_slot(domain, |slot| slot.semaphore.clone())
    }

    fn reserve_slot(&self, domain: &str) -> Duration {
        let delay = self.request_delay;
        self.with_slot(domain, |slot| slot.state.reserve_slot(delay, Instant::now()))
    }

    /// Number of requests started against `domain` so far
    pub fn request_count(&self, domain: &str) -> u32 {
        self.domains()
            .get(domain)
            .map(|slot| slot.state.request_count)
            .unwrap_or(0)
    }

    /// Number of free concurrency slots for `domain`
    pub fn available_permits(&self, domain: &str) -> usize {
        self.domains()
            .get(domain)
            .map(|slot| slot.semaphore.available_permits())
            .unwrap_or(self.per_domain)
    }

    /// Number of domains seen so far
    pub fn domain_count(&self) -> usize {
        self.domains().len()
    }
}
