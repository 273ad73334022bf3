//! Per-action sliding-window rate limiting
//!
//! Counts recent actions of each kind and combines that count with the
//! working-hours window to decide whether a sensitive action may go ahead.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use super::schedule::{should_rate_limit, BusinessHours};

/// Sensitive actions that have their own budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Connection,
    Message,
    Search,
}

/// Timestamps of recent actions inside a fixed-length window
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    max_actions: u32,
    window: Duration,
    events: VecDeque<Instant>,
}

impl SlidingWindow {
    /// `max_actions == 0` disables the ceiling
    pub fn new(max_actions: u32, window: Duration) -> Self {
        Self {
            max_actions,
            window,
            events: VecDeque::new(),
        }
    }

    pub fn max_actions(&self) -> u32 {
        self.max_actions
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Drop events that fell out of the window
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.events.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    /// Actions still inside the window at `now`
    pub fn count(&mut self, now: Instant) -> u32 {
        self.prune(now);
        u32::try_from(self.events.len()).unwrap_or(u32::MAX)
    }

    pub fn is_limited(&mut self, now: Instant) -> bool {
        let count = self.count(now);
        should_rate_limit(count, self.window, self.max_actions)
    }

    pub fn record(&mut self, now: Instant) {
        self.events.push_back(now);
    }

    /// Actions left before the ceiling, `None` when unlimited
    pub fn remaining(&mut self, now: Instant) -> Option<u32> {
        if self.max_actions == 0 {
            return None;
        }
        Some(self.max_actions.saturating_sub(self.count(now)))
    }

    /// Wait until the oldest counted action leaves the window
    pub fn retry_after(&mut self, now: Instant) -> Duration {
        self.prune(now);
        match self.events.front() {
            Some(&oldest) => self
                .window
                .saturating_sub(now.saturating_duration_since(oldest)),
            None => Duration::ZERO,
        }
    }
}

/// One sliding window per action kind
#[derive(Debug, Clone, Default)]
pub struct ActionLimiter {
    windows: HashMap<ActionKind, SlidingWindow>,
}

impl ActionLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ceiling for one action kind
    pub fn with_limit(mut self, kind: ActionKind, max_actions: u32, window: Duration) -> Self {
        self.windows
            .insert(kind, SlidingWindow::new(max_actions, window));
        self
    }

    /// Kinds without a configured window are never limited
    pub fn is_limited(&mut self, kind: ActionKind, now: Instant) -> bool {
        self.windows
            .get_mut(&kind)
            .is_some_and(|w| w.is_limited(now))
    }

    pub fn count(&mut self, kind: ActionKind, now: Instant) -> u32 {
        self.windows.get_mut(&kind).map_or(0, |w| w.count(now))
    }

    pub fn remaining(&mut self, kind: ActionKind, now: Instant) -> Option<u32> {
        self.windows.get_mut(&kind).and_then(|w| w.remaining(now))
    }

    pub fn record(&mut self, kind: ActionKind, now: Instant) {
        if let Some(window) = self.windows.get_mut(&kind) {
            window.record(now);
        }
    }

    pub fn retry_after(&mut self, kind: ActionKind, now: Instant) -> Duration {
        self.windows
            .get_mut(&kind)
            .map_or(Duration::ZERO, |w| w.retry_after(now))
    }
}

/// Whether a sensitive action may run now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    OutsideBusinessHours,
    RateLimited { retry_after: Duration },
}

/// Working hours plus per-kind rate limits
#[derive(Debug, Clone)]
pub struct ActionGate {
    hours: BusinessHours,
    limiter: ActionLimiter,
}

impl ActionGate {
    pub fn new(hours: BusinessHours, limiter: ActionLimiter) -> Self {
        Self { hours, limiter }
    }

    /// Check `kind` at wall-clock `local_time` and monotonic time `now`
    pub fn check<T: Timelike>(
        &mut self,
        kind: ActionKind,
        local_time: &T,
        now: Instant,
    ) -> Readiness {
        if !self.hours.contains(local_time.hour()) {
            return Readiness::OutsideBusinessHours;
        }
        if self.limiter.is_limited(kind, now) {
            return Readiness::RateLimited {
                retry_after: self.limiter.retry_after(kind, now),
            };
        }
        Readiness::Ready
    }

    /// Count a completed action against its budget
    pub fn record(&mut self, kind: ActionKind, now: Instant) {
        self.limiter.record(kind, now);
    }

    pub fn limiter_mut(&mut self) -> &mut ActionLimiter {
        &mut self.limiter
    }
}
