//! Stealth and anti-detection module
//!
//! This module makes browser automation less detectable:
//! - Curved, jittered pointer paths
//! - Randomized typing cadence with corrected mistakes
//! - Natural scroll bursts and idle pointer wandering
//! - Business-hour, rate and cooldown gating for sensitive actions

pub mod cancel;
pub mod curve;
pub mod engine;
pub mod fingerprint;
pub mod humanize;
pub mod limiter;
pub mod motion;
pub mod schedule;
pub mod scroll;
pub mod typing;

pub use cancel::CancelToken;
pub use curve::{generate_path, Point};
pub use engine::StealthEngine;
pub use humanize::{Humanizer, ScrollPlan};
pub use limiter::{ActionGate, ActionKind, ActionLimiter, Readiness, SlidingWindow};
pub use motion::Cursor;
pub use schedule::{enforce_cooldown, should_rate_limit, BusinessHours};

use std::time::Duration;

use crate::driver::DriverError;

/// Configuration for stealth behavior
///
/// Built once by the caller and never mutated by the engine. Bounds are
/// taken as given; only the typing bounds have a zero-means-default rule.
#[derive(Debug, Clone, PartialEq)]
pub struct StealthConfig {
    /// General pause between interactions
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Pause between keystrokes
    pub typing_min_delay: Duration,
    pub typing_max_delay: Duration,
    /// Pause between scroll bursts
    pub scroll_min_delay: Duration,
    pub scroll_max_delay: Duration,
    /// Restrict sensitive actions to working hours
    pub business_hours_enabled: bool,
    /// Hour of day (0-23); start > end spans midnight
    pub business_start_hour: u32,
    pub business_end_hour: u32,
    /// Minimum gap between sensitive actions
    pub cooldown_period: Duration,
    /// Rate ceiling read by `StealthEngine::is_rate_limited`, 0 = unlimited
    pub max_actions_per_window: u32,
    pub rate_limit_window: Duration,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(2),
            typing_min_delay: Duration::from_millis(50),
            typing_max_delay: Duration::from_millis(200),
            scroll_min_delay: Duration::from_millis(100),
            scroll_max_delay: Duration::from_millis(500),
            business_hours_enabled: true,
            business_start_hour: 9,
            business_end_hour: 17,
            cooldown_period: Duration::from_secs(5 * 60),
            max_actions_per_window: 10,
            rate_limit_window: Duration::from_secs(60 * 60),
        }
    }
}

impl StealthConfig {
    /// Near-zero pacing for tests and dry runs
    pub fn instant() -> Self {
        Self {
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            typing_min_delay: Duration::from_millis(1),
            typing_max_delay: Duration::from_millis(2),
            scroll_min_delay: Duration::from_millis(1),
            scroll_max_delay: Duration::from_millis(2),
            business_hours_enabled: false,
            cooldown_period: Duration::ZERO,
            max_actions_per_window: 0,
            ..Self::default()
        }
    }

    /// Working-hours window described by this config
    pub fn business_hours(&self) -> BusinessHours {
        BusinessHours {
            enabled: self.business_hours_enabled,
            start_hour: self.business_start_hour,
            end_hour: self.business_end_hour,
        }
    }
}

/// Browser identity presented to the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    /// Empty string leaves the browser's own user agent in place
    pub user_agent: String,
    /// 0 in either dimension leaves the viewport alone
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Hide `navigator.webdriver` and related automation hints
    pub mask_webdriver: bool,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            user_agent: fingerprint::DEFAULT_USER_AGENT.to_string(),
            viewport_width: 1920,
            viewport_height: 1080,
            mask_webdriver: true,
        }
    }
}

/// Stealth behavior errors
#[derive(Debug, thiserror::Error)]
pub enum StealthError {
    #[error("Invalid element handle: {0:?}")]
    InvalidElement(String),
    #[error("Target element has no visible area")]
    NoVisibleArea,
    #[error("Failed to {action} (step {step}): {source}")]
    Driver {
        action: &'static str,
        step: usize,
        #[source]
        source: DriverError,
    },
    #[error("Operation cancelled")]
    Cancelled,
}

impl StealthError {
    pub(crate) fn driver(action: &'static str, step: usize) -> impl FnOnce(DriverError) -> Self {
        move |source| StealthError::Driver {
            action,
            step,
            source,
        }
    }

    /// True when the caller asked the behavior to stop
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StealthError::Cancelled)
    }

    /// True when retrying the same call cannot succeed
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            StealthError::InvalidElement(_) | StealthError::NoVisibleArea
        )
    }
}
