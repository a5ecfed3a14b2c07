//! Rolling-window token rate limiter
//!
//! Gates each outbound model call against a token budget over the trailing
//! 60 seconds. Owned by a single conversation loop; sharing one limiter
//! across concurrent loops would need synchronization this type does not
//! provide.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(60);

/// Token budget gate over a rolling one-minute window
#[derive(Debug)]
pub struct RateLimiter {
    tokens_per_minute: u32,
    /// (timestamp, token count) pairs within the trailing window
    window: VecDeque<(Instant, u32)>,
    total_input_tokens: u64,
    total_output_tokens: u64,
}

impl RateLimiter {
    /// Create a limiter with the given per-minute token budget
    pub fn new(tokens_per_minute: u32) -> Self {
        Self {
            tokens_per_minute,
            window: VecDeque::new(),
            total_input_tokens: 0,
            total_output_tokens: 0,
        }
    }

    /// Suspend until the trailing-window usage is below the budget.
    ///
    /// If the window sum has reached the budget, sleeps until the oldest
    /// entry ages out: `60s - (now - oldest)`.
    pub async fn check_and_wait(&mut self) {
        self.evict(Instant::now());

        let used: u32 = self.window.iter().map(|&(_, tokens)| tokens).sum();
        if used < self.tokens_per_minute {
            return;
        }

        if let Some(&(oldest, _)) = self.window.front() {
            let elapsed = Instant::now().duration_since(oldest);
            if elapsed < WINDOW {
                let sleep_for = WINDOW - elapsed;
                tracing::info!(
                    tokens_in_last_minute = used,
                    sleep_secs = sleep_for.as_secs_f64(),
                    "rate limit reached, sleeping"
                );
                tokio::time::sleep(sleep_for).await;
            }
        }

        self.evict(Instant::now());
    }

    /// Record usage from one model call
    pub fn record(&mut self, input_tokens: u32, output_tokens: u32) {
        self.total_input_tokens += u64::from(input_tokens);
        self.total_output_tokens += u64::from(output_tokens);

        let now = Instant::now();
        self.window.push_back((now, input_tokens + output_tokens));
        self.evict(now);
    }

    /// Tokens used within the trailing window
    pub fn used_last_minute(&self) -> u32 {
        self.window.iter().map(|&(_, tokens)| tokens).sum()
    }

    /// Cumulative (input, output) token totals for the run
    pub fn totals(&self) -> (u64, u64) {
        (self.total_input_tokens, self.total_output_tokens)
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&(ts, _)) = self.window.front() {
            if now.duration_since(ts) > WINDOW {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_under_budget_does_not_wait() {
        let mut limiter = RateLimiter::new(1000);
        limiter.record(100, 100);

        let before = Instant::now();
        limiter.check_and_wait().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_window_waits_until_oldest_expires() {
        let mut limiter = RateLimiter::new(1000);
        limiter.record(600, 0);
        tokio::time::advance(Duration::from_secs(20)).await;
        limiter.record(400, 0);

        // Budget reached; the oldest entry is 20s old, so the wait is ~40s.
        let before = Instant::now();
        limiter.check_and_wait().await;
        let waited = Instant::now().duration_since(before);
        assert!(waited >= Duration::from_secs(40), "waited {:?}", waited);

        // The window has since expired; a fresh check does not suspend.
        let before = Instant::now();
        limiter.check_and_wait().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_evicted_after_window() {
        let mut limiter = RateLimiter::new(1000);
        limiter.record(999, 1);
        assert_eq!(limiter.used_last_minute(), 1000);

        tokio::time::advance(Duration::from_secs(61)).await;
        limiter.check_and_wait().await;
        assert_eq!(limiter.used_last_minute(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_totals_accumulate() {
        let mut limiter = RateLimiter::new(1000);
        limiter.record(10, 5);
        limiter.record(20, 15);
        assert_eq!(limiter.totals(), (30, 20));
    }
}
