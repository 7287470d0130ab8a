use std::time::{Duration, Instant};

/// Tracks request spacing for one domain during crawling
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// Number of requests started against this domain in the current crawl
    pub request_count: u32,

    /// Start time of the most recent request to this domain
    pub last_request_time: Option<Instant>,
}

impl DomainState {
    /// Creates a new DomainState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a request can start now given the minimum spacing
    pub fn can_request(&self, min_delay: Duration, now: Instant) -> bool {
        self.time_until_next_request(min_delay, now).is_none()
    }

    /// Records that a request was started against this domain
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can start
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, min_delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < min_delay).then(|| min_delay - elapsed)
    }

    /// Reserves the next request slot and returns how long to wait for it
    ///
    /// The slot is booked immediately, so concurrent callers queue up one delay apart.
    pub fn reserve_slot(&mut self, min_delay: Duration, now: Instant) -> Duration {
        let start = match self.last_request_time {
            Some(last) if last + min_delay > now => last + min_delay,
            _ => now,
        };
        self.record_request(start);
        start - now
    }
}
