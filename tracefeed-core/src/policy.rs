// Copyright 2025 Tracefeed Contributors (https://github.com/tracefeed/tracefeed)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Synchronization policy: refresh cadence, page size, refetch semantics.

use std::time::Duration;

/// Smallest refresh interval the engine will honor.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// Largest page size the engine will request.
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// What happens when a page index that is already held is fetched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefetchSemantics {
    /// The new fetch replaces the previous content for that index.
    #[default]
    Replace,
    /// Every fetch is retained and duplicates are suppressed at projection
    /// time. The merged list can grow on every refresh; kept as a
    /// diagnostic mode only.
    Append,
}

/// Backoff schedule for retrying failed page fetches.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never below 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Multiplier applied per retry.
    pub multiplier: f64,
    /// Random jitter fraction in `[0, 1]` applied to each delay.
    pub jitter: f64,
}

impl RetryPolicy {
    /// One attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            jitter: 0.0,
        }
    }

    /// Exponential backoff starting at 100ms, capped at 5s.
    pub fn exponential(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }

    /// Delay before retry `attempt` (zero-based), with jitter applied.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let jitter_factor = 1.0 + (rand::random::<f64>() * 2.0 - 1.0) * self.jitter;
        let capped = (base * jitter_factor).min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Tunable behavior of one live list query.
///
/// `Default` gives a 5 second refresh, 50-record pages, replace-on-refetch,
/// and no retries.
#[derive(Debug, Clone)]
pub struct SyncPolicy {
    /// Period between automatic first-page refreshes.
    pub refresh_interval: Duration,
    /// Records requested per page.
    pub page_size: u32,
    /// How refetched page indexes are reconciled.
    pub refetch: RefetchSemantics,
    /// Retry schedule for failed fetches.
    pub retry: RetryPolicy,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5),
            page_size: 50,
            refetch: RefetchSemantics::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl SyncPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the refresh period.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Sets the requested page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the refetch reconciliation mode.
    pub fn with_refetch(mut self, refetch: RefetchSemantics) -> Self {
        self.refetch = refetch;
        self
    }

    /// Sets the retry schedule.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Clamps out-of-range values to safe bounds.
    pub fn normalized(mut self) -> Self {
        if self.refresh_interval < MIN_REFRESH_INTERVAL {
            tracing::debug!(
                requested_ms = self.refresh_interval.as_millis() as u64,
                min_ms = MIN_REFRESH_INTERVAL.as_millis() as u64,
                "refresh interval below minimum, clamping"
            );
            self.refresh_interval = MIN_REFRESH_INTERVAL;
        }
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self.retry.max_attempts = self.retry.max_attempts.max(1);
        self
    }
}
