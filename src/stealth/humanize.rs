//! Human behavior simulation for anti-detection
//!
//! Every randomized draw the behaviors make goes through [`Humanizer`], so
//! a seeded generator reproduces a whole session and no global RNG is
//! shared between engines.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::curve::Point;

/// Pointer landing offset from the element center (+/- px per axis)
const MAX_POINTER_OFFSET: f64 = 5.0;

/// Pause between consecutive pointer path points
const MIN_STEP_PAUSE_MS: u64 = 1;
const MAX_STEP_PAUSE_MS: u64 = 5;

/// Chance of a mistyped character before each keystroke after the first
const MISTYPE_PROBABILITY: f64 = 0.05;

/// Hesitation after a wrong key, before backspacing
const MIN_MISTAKE_NOTICE_MS: u64 = 100;
const MAX_MISTAKE_NOTICE_MS: u64 = 300;

/// Pause after the backspace, before the correct key
const MIN_CORRECTION_PAUSE_MS: u64 = 50;
const MAX_CORRECTION_PAUSE_MS: u64 = 150;

/// Fallback keystroke bounds when typing delays are unset
pub const DEFAULT_TYPING_MIN_DELAY: Duration = Duration::from_millis(50);
pub const DEFAULT_TYPING_MAX_DELAY: Duration = Duration::from_millis(200);

/// Scroll burst shape
const SCROLL_DOWN_PROBABILITY: f64 = 0.7;
const MIN_SCROLL_DISTANCE: i64 = 100;
const MAX_SCROLL_DISTANCE: i64 = 400;
const MIN_SCROLL_STEPS: u32 = 3;
const MAX_SCROLL_STEPS: u32 = 7;
const MIN_SCROLL_STEP_PAUSE_MS: u64 = 20;
const MAX_SCROLL_STEP_PAUSE_MS: u64 = 70;

/// Idle wandering shape
const MIN_IDLE_MOVES: u32 = 2;
const MAX_IDLE_MOVES: u32 = 5;
pub const IDLE_MIN_X: f64 = 100.0;
pub const IDLE_MAX_X: f64 = 900.0;
pub const IDLE_MIN_Y: f64 = 100.0;
pub const IDLE_MAX_Y: f64 = 700.0;
const MIN_IDLE_PAUSE_MS: u64 = 500;
const MAX_IDLE_PAUSE_MS: u64 = 1500;

/// Shape of one scroll burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPlan {
    /// Total vertical distance in pixels, negative when scrolling up
    pub distance: i64,
    /// Number of equal sub-steps
    pub steps: u32,
}

impl ScrollPlan {
    /// Pixels per sub-step (remainder is dropped)
    pub fn step_size(&self) -> i64 {
        self.distance / i64::from(self.steps)
    }

    pub fn is_downward(&self) -> bool {
        self.distance > 0
    }
}

/// Humanizer for generating realistic timing and positions
pub struct Humanizer<R = StdRng> {
    rng: R,
}

impl Default for Humanizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl Humanizer<StdRng> {
    /// Create a humanizer seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a reproducible humanizer
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> Humanizer<R> {
    /// Wrap an existing randomness source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Direct access to the randomness source
    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Draw a delay uniformly from `[min, max]`
    ///
    /// Reversed bounds are swapped. Equal bounds return that value without
    /// touching the generator.
    pub fn delay_between(&mut self, min: Duration, max: Duration) -> Duration {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        if min == max {
            return min;
        }

        let span = (max - min).as_nanos().min(u128::from(u64::MAX)) as u64;
        min + Duration::from_nanos(self.rng.gen_range(0..=span))
    }

    /// Inter-keystroke delay, substituting defaults for unset bounds
    pub fn keystroke_delay(&mut self, min: Duration, max: Duration) -> Duration {
        let min = if min.is_zero() {
            DEFAULT_TYPING_MIN_DELAY
        } else {
            min
        };
        let max = if max.is_zero() {
            DEFAULT_TYPING_MAX_DELAY
        } else {
            max
        };

        self.delay_between(min, max)
    }

    /// Random landing offset around an element center
    pub fn pointer_offset(&mut self) -> (f64, f64) {
        let x = (self.rng.gen::<f64>() - 0.5) * 2.0 * MAX_POINTER_OFFSET;
        let y = (self.rng.gen::<f64>() - 0.5) * 2.0 * MAX_POINTER_OFFSET;
        (x, y)
    }

    /// Pause between two pointer path points
    pub fn pointer_step_pause(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(MIN_STEP_PAUSE_MS..=MAX_STEP_PAUSE_MS))
    }

    /// Decide whether the keystroke at `index` is preceded by a mistake
    pub fn should_mistype(&mut self, index: usize) -> bool {
        index > 0 && self.rng.gen_bool(MISTYPE_PROBABILITY)
    }

    /// A random lowercase letter to type by mistake
    pub fn wrong_key(&mut self) -> char {
        char::from(b'a' + self.rng.gen_range(0..26u8))
    }

    /// Hesitation after noticing a wrong key
    pub fn mistake_notice_pause(&mut self) -> Duration {
        Duration::from_millis(
            self.rng
                .gen_range(MIN_MISTAKE_NOTICE_MS..=MAX_MISTAKE_NOTICE_MS),
        )
    }

    /// Pause after correcting a wrong key
    pub fn correction_pause(&mut self) -> Duration {
        Duration::from_millis(
            self.rng
                .gen_range(MIN_CORRECTION_PAUSE_MS..=MAX_CORRECTION_PAUSE_MS),
        )
    }

    /// Pick direction, distance and granularity of one scroll burst
    pub fn scroll_plan(&mut self) -> ScrollPlan {
        let downward = self.rng.gen_bool(SCROLL_DOWN_PROBABILITY);
        let distance = self
            .rng
            .gen_range(MIN_SCROLL_DISTANCE..=MAX_SCROLL_DISTANCE);
        let steps = self.rng.gen_range(MIN_SCROLL_STEPS..=MAX_SCROLL_STEPS);

        ScrollPlan {
            distance: if downward { distance } else { -distance },
            steps,
        }
    }

    /// Pause between scroll sub-steps
    pub fn scroll_step_pause(&mut self) -> Duration {
        Duration::from_millis(
            self.rng
                .gen_range(MIN_SCROLL_STEP_PAUSE_MS..=MAX_SCROLL_STEP_PAUSE_MS),
        )
    }

    /// Number of idle pointer wanders in one idle spell
    pub fn idle_move_count(&mut self) -> u32 {
        self.rng.gen_range(MIN_IDLE_MOVES..=MAX_IDLE_MOVES)
    }

    /// A random resting spot inside the idle bounding box
    pub fn idle_point(&mut self) -> Point {
        Point::new(
            self.rng.gen_range(IDLE_MIN_X..=IDLE_MAX_X),
            self.rng.gen_range(IDLE_MIN_Y..=IDLE_MAX_Y),
        )
    }

    /// Pause after each idle wander
    pub fn idle_pause(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(MIN_IDLE_PAUSE_MS..=MAX_IDLE_PAUSE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_between_bounds() {
        let mut humanizer = Humanizer::seeded(1);
        let min = Duration::from_millis(500);
        let max = Duration::from_secs(2);

        for _ in 0..1000 {
            let delay = humanizer.delay_between(min, max);
            assert!(delay >= min && delay <= max);
        }
    }

    #[test]
    fn test_delay_between_swaps_reversed_bounds() {
        let mut humanizer = Humanizer::seeded(2);
        let low = Duration::from_millis(10);
        let high = Duration::from_millis(90);

        for _ in 0..200 {
            let delay = humanizer.delay_between(high, low);
            assert!(delay >= low && delay <= high);
        }
    }

    #[test]
    fn test_equal_bounds_return_exact_value() {
        let mut humanizer = Humanizer::seeded(3);
        let d = Duration::from_millis(250);

        for _ in 0..10 {
            assert_eq!(humanizer.delay_between(d, d), d);
        }
    }

    #[test]
    fn test_keystroke_delay_defaults() {
        let mut humanizer = Humanizer::seeded(4);

        for _ in 0..200 {
            let delay = humanizer.keystroke_delay(Duration::ZERO, Duration::ZERO);
            assert!(delay >= DEFAULT_TYPING_MIN_DELAY && delay <= DEFAULT_TYPING_MAX_DELAY);
        }
    }

    #[test]
    fn test_pointer_offset_bounded() {
        let mut humanizer = Humanizer::seeded(5);

        for _ in 0..500 {
            let (x, y) = humanizer.pointer_offset();
            assert!((-5.0..=5.0).contains(&x));
            assert!((-5.0..=5.0).contains(&y));
        }
    }

    #[test]
    fn test_never_mistype_first_key() {
        let mut humanizer = Humanizer::seeded(6);

        for _ in 0..1000 {
            assert!(!humanizer.should_mistype(0));
        }
    }

    #[test]
    fn test_wrong_key_is_lowercase_letter() {
        let mut humanizer = Humanizer::seeded(7);

        for _ in 0..200 {
            assert!(humanizer.wrong_key().is_ascii_lowercase());
        }
    }

    #[test]
    fn test_scroll_plans_vary() {
        let mut humanizer = Humanizer::seeded(8);
        let plans: Vec<ScrollPlan> = (0..200).map(|_| humanizer.scroll_plan()).collect();

        for plan in &plans {
            assert!((100..=400).contains(&plan.distance.abs()));
            assert!((3..=7).contains(&plan.steps));
        }

        // Mostly downward, but not always
        let down = plans.iter().filter(|p| p.is_downward()).count();
        assert!(down > 100 && down < 200);

        let first = plans[0].distance;
        assert!(plans.iter().any(|p| p.distance != first));
    }

    #[test]
    fn test_idle_points_inside_box() {
        let mut humanizer = Humanizer::seeded(9);

        for _ in 0..500 {
            let p = humanizer.idle_point();
            assert!((IDLE_MIN_X..=IDLE_MAX_X).contains(&p.x));
            assert!((IDLE_MIN_Y..=IDLE_MAX_Y).contains(&p.y));
            assert!((2..=5).contains(&humanizer.idle_move_count()));
        }
    }
}
