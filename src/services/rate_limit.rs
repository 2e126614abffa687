// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outbound request budget for the osu! API.
//!
//! Sliding-window log: the start times of the last `max_requests` calls
//! are kept, and a new call may only start once the oldest of them has
//! left the window. No interval of length `window` ever contains more
//! than `max_requests` starts. Callers over budget wait their turn in
//! FIFO order; nothing is dropped.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Rate limiter shared by every outbound osu! API call.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    /// Start times of recent requests, oldest first.
    sent: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: NonZeroU32, window: Duration) -> Self {
        let max_requests = max_requests.get() as usize;
        Self {
            max_requests,
            window,
            sent: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait until a request may start and record it.
    ///
    /// The lock is held while sleeping, so waiters are released in the
    /// order they arrived. Returns how long the caller was held back.
    pub async fn acquire(&self) -> Duration {
        let mut sent = self.sent.lock().await;
        let arrived = Instant::now();

        self.prune(&mut sent, arrived);

        if sent.len() >= self.max_requests {
            if let Some(&oldest) = sent.front() {
                let ready_at = oldest + self.window;
                tracing::debug!(
                    wait_ms = ready_at.saturating_duration_since(arrived).as_millis() as u64,
                    "osu! API budget exhausted, delaying request"
                );
                tokio::time::sleep_until(ready_at).await;
            }
            self.prune(&mut sent, Instant::now());
        }

        let now = Instant::now();
        sent.push_back(now);
        now.saturating_duration_since(arrived)
    }

    /// Drop starts that have left the window ending at `now`.
    fn prune(&self, sent: &mut VecDeque<Instant>, now: Instant) {
        while sent
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= self.window)
        {
            sent.pop_front();
        }
    }
}
