//! User settings
//!
//! Defines all configurable options for the automation and converts them
//! into the immutable bundles the stealth engine consumes.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::stealth::fingerprint::DEFAULT_USER_AGENT;
use crate::stealth::{ActionKind, ActionLimiter, FingerprintConfig, StealthConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Human-behavior pacing and scheduling
    pub stealth: StealthSettings,
    /// Browser identity
    pub browser: BrowserSettings,
    /// Per-action hourly budgets
    pub rate_limit: RateLimitSettings,
    /// Log output
    pub logging: LoggingSettings,
}

impl Settings {
    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Read settings, falling back to defaults when the file is missing,
    /// then apply environment overrides and validate
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_or_default_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::load_or_default`] with overrides read from `lookup`
    pub fn load_or_default_with<F>(
        path: impl AsRef<Path>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let mut settings = match Self::load(path) {
            Ok(settings) => settings,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("{} not found, using default settings", path.display());
                Self::default()
            }
            Err(e) => return Err(e),
        };

        settings.apply_env_overrides_with(lookup);
        settings.validate()?;
        Ok(settings)
    }

    /// Override fields from process environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_with(|key| std::env::var(key).ok());
    }

    /// Override fields from any key lookup; unparsable values are ignored
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            lookup: &dyn Fn(&str) -> Option<String>,
            key: &str,
            target: &mut T,
        ) {
            if let Some(value) = lookup(key) {
                match value.trim().parse() {
                    Ok(v) => *target = v,
                    Err(_) => log::warn!("ignoring unparsable {}={:?}", key, value),
                }
            }
        }

        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;
        let s = &mut self.stealth;
        parsed(lookup, "STEALTH_MIN_DELAY_MS", &mut s.min_delay_ms);
        parsed(lookup, "STEALTH_MAX_DELAY_MS", &mut s.max_delay_ms);
        parsed(lookup, "STEALTH_TYPING_MIN_DELAY_MS", &mut s.typing_min_delay_ms);
        parsed(lookup, "STEALTH_TYPING_MAX_DELAY_MS", &mut s.typing_max_delay_ms);
        parsed(lookup, "STEALTH_SCROLL_MIN_DELAY_MS", &mut s.scroll_min_delay_ms);
        parsed(lookup, "STEALTH_SCROLL_MAX_DELAY_MS", &mut s.scroll_max_delay_ms);
        parsed(lookup, "STEALTH_BUSINESS_HOURS", &mut s.respect_business_hours);
        parsed(lookup, "STEALTH_COOLDOWN_PERIOD_MS", &mut s.cooldown_period_ms);

        let b = &mut self.browser;
        if let Some(ua) = lookup("BROWSER_USER_AGENT") {
            b.user_agent = ua;
        }
        parsed(lookup, "BROWSER_VIEWPORT_WIDTH", &mut b.viewport_width);
        parsed(lookup, "BROWSER_VIEWPORT_HEIGHT", &mut b.viewport_height);

        let r = &mut self.rate_limit;
        parsed(lookup, "RATE_LIMIT_CONNECTIONS_PER_HOUR", &mut r.connections_per_hour);
        parsed(lookup, "RATE_LIMIT_MESSAGES_PER_HOUR", &mut r.messages_per_hour);
        parsed(lookup, "RATE_LIMIT_SEARCHES_PER_HOUR", &mut r.searches_per_hour);

        if let Some(level) = lookup("LOGGING_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Fill unset values with defaults and reject inconsistent ones
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let defaults = StealthSettings::default();
        let s = &mut self.stealth;

        fill_zero(&mut s.min_delay_ms, defaults.min_delay_ms);
        fill_zero(&mut s.max_delay_ms, defaults.max_delay_ms);
        fill_zero(&mut s.typing_min_delay_ms, defaults.typing_min_delay_ms);
        fill_zero(&mut s.typing_max_delay_ms, defaults.typing_max_delay_ms);
        fill_zero(&mut s.scroll_min_delay_ms, defaults.scroll_min_delay_ms);
        fill_zero(&mut s.scroll_max_delay_ms, defaults.scroll_max_delay_ms);

        check_order("delay", s.min_delay_ms, s.max_delay_ms)?;
        check_order("typing delay", s.typing_min_delay_ms, s.typing_max_delay_ms)?;
        check_order("scroll delay", s.scroll_min_delay_ms, s.scroll_max_delay_ms)?;

        for (name, hour) in [
            ("business_start_hour", s.business_start_hour),
            ("business_end_hour", s.business_end_hour),
        ] {
            if hour > 23 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be 0-23, got {hour}"
                )));
            }
        }

        let browser_defaults = BrowserSettings::default();
        if self.browser.user_agent.trim().is_empty() {
            self.browser.user_agent = browser_defaults.user_agent;
        }
        fill_zero(&mut self.browser.viewport_width, browser_defaults.viewport_width);
        fill_zero(&mut self.browser.viewport_height, browser_defaults.viewport_height);

        if self.rate_limit.window_secs == 0 {
            self.rate_limit.window_secs = RateLimitSettings::default().window_secs;
        }

        let level = self.logging.level.trim().to_lowercase();
        if level.is_empty() {
            self.logging.level = LoggingSettings::default().level;
        } else if LOG_LEVELS.contains(&level.as_str()) {
            self.logging.level = level;
        } else {
            return Err(ConfigError::Invalid(format!(
                "logging level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.logging.level
            )));
        }

        Ok(())
    }

    /// Slower, more conservative pacing with tight budgets
    pub fn cautious_preset() -> Self {
        Self {
            stealth: StealthSettings {
                min_delay_ms: 2_000,
                max_delay_ms: 6_000,
                typing_min_delay_ms: 80,
                typing_max_delay_ms: 300,
                scroll_min_delay_ms: 400,
                scroll_max_delay_ms: 1_500,
                cooldown_period_ms: 15 * 60 * 1000,
                ..Default::default()
            },
            rate_limit: RateLimitSettings {
                connections_per_hour: 5,
                messages_per_hour: 3,
                searches_per_hour: 10,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Short pauses and no working-hours gate, for supervised runs
    pub fn fast_preset() -> Self {
        Self {
            stealth: StealthSettings {
                min_delay_ms: 200,
                max_delay_ms: 800,
                typing_min_delay_ms: 30,
                typing_max_delay_ms: 90,
                scroll_min_delay_ms: 50,
                scroll_max_delay_ms: 200,
                respect_business_hours: false,
                cooldown_period_ms: 30_000,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Engine configuration; connection budget drives the rate ceiling
    pub fn stealth_config(&self) -> StealthConfig {
        let s = &self.stealth;
        StealthConfig {
            min_delay: Duration::from_millis(s.min_delay_ms),
            max_delay: Duration::from_millis(s.max_delay_ms),
            typing_min_delay: Duration::from_millis(s.typing_min_delay_ms),
            typing_max_delay: Duration::from_millis(s.typing_max_delay_ms),
            scroll_min_delay: Duration::from_millis(s.scroll_min_delay_ms),
            scroll_max_delay: Duration::from_millis(s.scroll_max_delay_ms),
            business_hours_enabled: s.respect_business_hours,
            business_start_hour: s.business_start_hour,
            business_end_hour: s.business_end_hour,
            cooldown_period: Duration::from_millis(s.cooldown_period_ms),
            max_actions_per_window: self.rate_limit.connections_per_hour,
            rate_limit_window: self.rate_limit.window(),
        }
    }

    pub fn fingerprint_config(&self) -> FingerprintConfig {
        FingerprintConfig {
            user_agent: self.browser.user_agent.clone(),
            viewport_width: self.browser.viewport_width,
            viewport_height: self.browser.viewport_height,
            mask_webdriver: self.browser.mask_webdriver,
        }
    }

    /// Sliding-window limiter with one budget per action kind
    pub fn action_limiter(&self) -> ActionLimiter {
        let r = &self.rate_limit;
        let window = r.window();
        ActionLimiter::new()
            .with_limit(ActionKind::Connection, r.connections_per_hour, window)
            .with_limit(ActionKind::Message, r.messages_per_hour, window)
            .with_limit(ActionKind::Search, r.searches_per_hour, window)
    }
}

fn fill_zero<T: Default + PartialEq>(value: &mut T, default: T) {
    if *value == T::default() {
        *value = default;
    }
}

fn check_order(name: &str, min: u64, max: u64) -> Result<(), ConfigError> {
    if max < min {
        return Err(ConfigError::Invalid(format!(
            "max {name} ({max}ms) must not be below min {name} ({min}ms)"
        )));
    }
    Ok(())
}

/// Pacing and scheduling of human-like behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealthSettings {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub typing_min_delay_ms: u64,
    pub typing_max_delay_ms: u64,
    pub scroll_min_delay_ms: u64,
    pub scroll_max_delay_ms: u64,
    /// Only act during working hours
    pub respect_business_hours: bool,
    pub business_start_hour: u32,
    pub business_end_hour: u32,
    /// Minimum gap between sensitive actions
    pub cooldown_period_ms: u64,
}

impl Default for StealthSettings {
    fn default() -> Self {
        Self {
            min_delay_ms: 500,
            max_delay_ms: 2_000,
            typing_min_delay_ms: 50,
            typing_max_delay_ms: 200,
            scroll_min_delay_ms: 100,
            scroll_max_delay_ms: 500,
            respect_business_hours: true,
            business_start_hour: 9,
            business_end_hour: 17,
            cooldown_period_ms: 5 * 60 * 1000,
        }
    }
}

/// Browser identity settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Hide `navigator.webdriver` and friends
    pub mask_webdriver: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport_width: 1920,
            viewport_height: 1080,
            mask_webdriver: true,
        }
    }
}

/// Per-action budgets within a rolling window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub connections_per_hour: u32,
    pub messages_per_hour: u32,
    pub searches_per_hour: u32,
    /// Rolling window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            connections_per_hour: 10,
            messages_per_hour: 5,
            searches_per_hour: 20,
            window_secs: 3_600,
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
