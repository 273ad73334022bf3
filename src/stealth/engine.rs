//! The stealth engine
//!
//! Owns the immutable configuration bundles and the randomness source.
//! Behaviors live in sibling modules as further `impl` blocks.

use std::thread;
use std::time::{Duration, Instant};

use chrono::Timelike;
use rand::rngs::StdRng;
use rand::Rng;

use super::humanize::Humanizer;
use super::schedule;
use super::{FingerprintConfig, StealthConfig};

/// Human-like behavior engine
///
/// Every operation runs synchronously on the calling thread and blocks it
/// for its own pauses.
pub struct StealthEngine<R = StdRng> {
    pub(crate) config: StealthConfig,
    pub(crate) fingerprint: FingerprintConfig,
    pub(crate) humanizer: Humanizer<R>,
}

impl StealthEngine<StdRng> {
    /// Create an engine seeded from OS entropy
    pub fn new(config: StealthConfig, fingerprint: FingerprintConfig) -> Self {
        Self::with_rng(config, fingerprint, Humanizer::new())
    }
}

impl<R: Rng> StealthEngine<R> {
    /// Create an engine drawing from a caller-supplied randomness source
    pub fn with_rng(
        config: StealthConfig,
        fingerprint: FingerprintConfig,
        humanizer: Humanizer<R>,
    ) -> Self {
        Self {
            config,
            fingerprint,
            humanizer,
        }
    }

    pub fn config(&self) -> &StealthConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> &FingerprintConfig {
        &self.fingerprint
    }

    /// Sleep for a duration drawn uniformly from `[min, max]`
    ///
    /// Reversed bounds are swapped; equal bounds sleep exactly that long.
    /// Returns the duration slept.
    pub fn random_delay(&mut self, min: Duration, max: Duration) -> Duration {
        let delay = self.humanizer.delay_between(min, max);
        log::trace!("random delay {:?} within [{:?}, {:?}]", delay, min, max);
        thread::sleep(delay);
        delay
    }

    /// Standard pause between two interactions
    pub fn pace(&mut self) -> Duration {
        self.random_delay(self.config.min_delay, self.config.max_delay)
    }

    /// Whether `t` falls inside the configured working hours
    pub fn is_within_business_hours<T: Timelike>(&self, t: &T) -> bool {
        self.config.business_hours().contains(t.hour())
    }

    /// Whether `action_count` actions already reach `max_actions`
    pub fn should_rate_limit(&self, action_count: u32, window: Duration, max_actions: u32) -> bool {
        schedule::should_rate_limit(action_count, window, max_actions)
    }

    /// Whether `action_count` reaches the configured ceiling for the
    /// configured window
    pub fn is_rate_limited(&self, action_count: u32) -> bool {
        self.should_rate_limit(
            action_count,
            self.config.rate_limit_window,
            self.config.max_actions_per_window,
        )
    }

    /// Block until `cooldown_period` has passed since `last_action`
    pub fn enforce_cooldown(&self, last_action: Instant, cooldown_period: Duration) -> Duration {
        schedule::enforce_cooldown(last_action, cooldown_period)
    }

    pub(crate) fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}
