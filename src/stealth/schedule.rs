//! Activity scheduling: working hours, rate ceilings and cooldowns

use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Hours of the day during which sensitive actions are allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub enabled: bool,
    /// First allowed hour (0-23)
    pub start_hour: u32,
    /// First disallowed hour (0-23); below `start_hour` wraps past midnight
    pub end_hour: u32,
}

impl BusinessHours {
    /// Whether `hour` lies in `[start, end)`, wrapping past midnight
    pub fn contains(&self, hour: u32) -> bool {
        if !self.enabled {
            return true;
        }

        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

/// Whether `action_count` actions already reach the ceiling
///
/// `max_actions == 0` means no ceiling. Reaching the ceiling counts as
/// limited. The window is the period the caller counted over; it does not
/// change the answer.
pub fn should_rate_limit(action_count: u32, _window: Duration, max_actions: u32) -> bool {
    if max_actions == 0 {
        return false;
    }
    action_count >= max_actions
}

/// Time still to wait before `cooldown_period` has passed since `last_action`
pub fn cooldown_remaining(last_action: Instant, cooldown_period: Duration, now: Instant) -> Duration {
    cooldown_period.saturating_sub(now.saturating_duration_since(last_action))
}

/// Block until `cooldown_period` has elapsed since `last_action`
///
/// Returns immediately when the period is zero or already over. Returns
/// the time actually waited.
pub fn enforce_cooldown(last_action: Instant, cooldown_period: Duration) -> Duration {
    let remaining = cooldown_remaining(last_action, cooldown_period, Instant::now());
    if remaining.is_zero() {
        return Duration::ZERO;
    }

    log::debug!("cooling down for {:?}", remaining);
    thread::sleep(remaining);
    remaining
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(start_hour: u32, end_hour: u32) -> BusinessHours {
        BusinessHours {
            enabled: true,
            start_hour,
            end_hour,
        }
    }

    #[test]
    fn test_daytime_window() {
        let window = hours(9, 17);

        assert!(window.contains(9));
        assert!(window.contains(16));
        assert!(!window.contains(17));
        assert!(!window.contains(8));
        assert!(!window.contains(0));
    }

    #[test]
    fn test_overnight_window() {
        let window = hours(22, 6);

        assert!(window.contains(23));
        assert!(window.contains(22));
        assert!(window.contains(3));
        assert!(!window.contains(6));
        assert!(!window.contains(10));
    }

    #[test]
    fn test_disabled_window_allows_everything() {
        let window = BusinessHours {
            enabled: false,
            start_hour: 9,
            end_hour: 17,
        };

        assert!((0..24).all(|h| window.contains(h)));
    }

    #[test]
    fn test_rate_limit_threshold() {
        let hour = Duration::from_secs(3600);

        assert!(!should_rate_limit(4, hour, 5));
        assert!(should_rate_limit(5, hour, 5));
        assert!(should_rate_limit(6, hour, 5));
    }

    #[test]
    fn test_unconfigured_rate_limit_never_limits() {
        let hour = Duration::from_secs(3600);

        assert!(!should_rate_limit(0, hour, 0));
        assert!(!should_rate_limit(1_000, hour, 0));
    }

    #[test]
    fn test_cooldown_blocks_for_remaining_time() {
        let period = Duration::from_millis(100);
        let start = Instant::now();

        let waited = enforce_cooldown(Instant::now(), period);
        let elapsed = start.elapsed();

        assert!(waited <= period);
        assert!(elapsed >= Duration::from_millis(90));
        assert!(elapsed <= period + Duration::from_millis(50));
    }

    #[test]
    fn test_cooldown_already_elapsed() {
        let period = Duration::from_millis(100);
        let Some(long_ago) = Instant::now().checked_sub(period + Duration::from_millis(20)) else {
            return;
        };

        let start = Instant::now();
        assert_eq!(enforce_cooldown(long_ago, period), Duration::ZERO);
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[test]
    fn test_zero_cooldown_never_blocks() {
        let start = Instant::now();
        assert_eq!(enforce_cooldown(Instant::now(), Duration::ZERO), Duration::ZERO);
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[test]
    fn test_cooldown_remaining_partial() {
        let last = Instant::now();
        let now = last + Duration::from_secs(2);

        assert_eq!(
            cooldown_remaining(last, Duration::from_secs(5), now),
            Duration::from_secs(3)
        );
        assert_eq!(
            cooldown_remaining(last, Duration::from_secs(1), now),
            Duration::ZERO
        );
    }
}
