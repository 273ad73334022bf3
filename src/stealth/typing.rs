//! Keystroke-by-keystroke text entry

use rand::Rng;

use super::cancel::CancelToken;
use super::engine::StealthEngine;
use super::StealthError;
use crate::driver::{BrowserDriver, ElementHandle, Key};

impl<R: Rng> StealthEngine<R> {
    /// Replace the content of `element` with `text`, typed like a person
    ///
    /// Existing content is selected first so the first keystroke replaces
    /// it. Occasionally a wrong letter is typed and immediately erased;
    /// the final content always equals `text`.
    pub fn human_type<D: BrowserDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        element: &ElementHandle,
        text: &str,
        cancel: &CancelToken,
    ) -> Result<(), StealthError> {
        if element.is_empty() {
            return Err(StealthError::InvalidElement(element.id.clone()));
        }

        driver
            .select_all(element)
            .map_err(StealthError::driver("select existing text", 0))?;

        let total = text.chars().count();
        log::debug!("typing {} characters into {}", total, element.id);

        // Nothing will replace the selection, so delete it
        if total == 0 {
            driver
                .press_key(element, Key::Backspace)
                .map_err(StealthError::driver("clear existing text", 0))?;
            return Ok(());
        }

        let mut buf = [0u8; 4];
        for (i, ch) in text.chars().enumerate() {
            cancel.check()?;

            if self.humanizer.should_mistype(i) {
                self.mistype(driver, element, i)?;
            }

            driver
                .insert_text(element, ch.encode_utf8(&mut buf))
                .map_err(StealthError::driver("type character", i))?;

            if i + 1 < total {
                let delay = self
                    .humanizer
                    .keystroke_delay(self.config.typing_min_delay, self.config.typing_max_delay);
                self.sleep(delay);
            }
        }

        Ok(())
    }

    /// Type one wrong letter, notice it, and erase it
    fn mistype<D: BrowserDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        element: &ElementHandle,
        index: usize,
    ) -> Result<(), StealthError> {
        let wrong = self.humanizer.wrong_key();
        log::trace!("mistyping {:?} before character {}", wrong, index);

        let mut buf = [0u8; 4];
        driver
            .insert_text(element, wrong.encode_utf8(&mut buf))
            .map_err(StealthError::driver("type wrong character", index))?;

        let notice = self.humanizer.mistake_notice_pause();
        self.sleep(notice);

        driver
            .press_key(element, Key::Backspace)
            .map_err(StealthError::driver("press backspace", index))?;

        let pause = self.humanizer.correction_pause();
        self.sleep(pause);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverEvent, RecordingDriver, Shape};
    use crate::stealth::humanize::Humanizer;
    use crate::stealth::{FingerprintConfig, StealthConfig};
    use std::time::{Duration, Instant};

    fn engine(seed: u64, config: StealthConfig) -> StealthEngine {
        StealthEngine::with_rng(config, FingerprintConfig::default(), Humanizer::seeded(seed))
    }

    fn field(text: &str) -> RecordingDriver {
        RecordingDriver::new().with_text_field("query", Shape::rect(0.0, 0.0, 200.0, 30.0), text)
    }

    #[test]
    fn test_final_text_matches_input() {
        let inputs = [
            "",
            "a",
            "software engineer",
            "Hi there, I'd love to connect!",
            "naïve café, ünïcödé",
        ];

        for (seed, text) in inputs.iter().enumerate() {
            let mut engine = engine(seed as u64, StealthConfig::instant());
            let mut driver = field("previous search");

            engine
                .human_type(
                    &mut driver,
                    &ElementHandle::new("query"),
                    text,
                    &CancelToken::new(),
                )
                .unwrap();

            assert_eq!(driver.text_of("query"), Some(*text));
        }
    }

    #[test]
    fn test_mistakes_are_corrected() {
        // Long enough that a 5% mistake rate is all but certain to fire
        let text = "the quick brown fox jumps over the lazy dog ".repeat(5);
        let mut engine = engine(99, StealthConfig::instant());
        let mut driver = field("");

        engine
            .human_type(
                &mut driver,
                &ElementHandle::new("query"),
                &text,
                &CancelToken::new(),
            )
            .unwrap();

        let backspaces = driver
            .events()
            .iter()
            .filter(|e| matches!(e, DriverEvent::PressKey { .. }))
            .count();
        assert!(backspaces > 0);
        assert_eq!(driver.text_of("query"), Some(text.as_str()));
    }

    #[test]
    fn test_select_all_issued_first() {
        let mut engine = engine(1, StealthConfig::instant());
        let mut driver = field("old");

        engine
            .human_type(
                &mut driver,
                &ElementHandle::new("query"),
                "new",
                &CancelToken::new(),
            )
            .unwrap();

        assert!(matches!(
            driver.events().first(),
            Some(DriverEvent::SelectAll { .. })
        ));
    }

    #[test]
    fn test_select_failure_aborts() {
        let mut engine = engine(2, StealthConfig::instant());
        let mut driver = field("old").failing_input();

        let err = engine
            .human_type(
                &mut driver,
                &ElementHandle::new("query"),
                "new",
                &CancelToken::new(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            StealthError::Driver {
                action: "select existing text",
                ..
            }
        ));
        assert_eq!(driver.text_of("query"), Some("old"));
    }

    #[test]
    fn test_cancelled_typing_stops() {
        let mut engine = engine(3, StealthConfig::instant());
        let mut driver = field("");
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = engine
            .human_type(&mut driver, &ElementHandle::new("query"), "hello", &cancel)
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(driver.text_of("query"), Some(""));
    }

    #[test]
    fn test_empty_text_clears_field() {
        let mut engine = engine(5, StealthConfig::instant());
        let mut driver = field("old");

        engine
            .human_type(
                &mut driver,
                &ElementHandle::new("query"),
                "",
                &CancelToken::new(),
            )
            .unwrap();

        assert_eq!(driver.text_of("query"), Some(""));
        assert!(matches!(
            driver.events(),
            [
                DriverEvent::SelectAll { .. },
                DriverEvent::PressKey {
                    key: Key::Backspace,
                    ..
                }
            ]
        ));
    }

    #[test]
    fn test_cancel_mid_text_keeps_typed_prefix() {
        let text = "hello world";
        let mut engine = engine(6, StealthConfig::instant());
        let cancel = CancelToken::new();
        let mut driver = field("old").cancelling_after_inputs(3, cancel.clone());

        let err = engine
            .human_type(&mut driver, &ElementHandle::new("query"), text, &cancel)
            .unwrap_err();

        assert!(err.is_cancelled());
        // Mistakes count as inputs, so at most three correct characters land
        let typed = driver.text_of("query").unwrap();
        assert!(!typed.is_empty() && typed.len() <= 3);
        assert!(text.starts_with(typed));
    }

    #[test]
    fn test_keystroke_timing_varies() {
        let config = StealthConfig {
            typing_min_delay: Duration::from_millis(5),
            typing_max_delay: Duration::from_millis(25),
            ..StealthConfig::instant()
        };
        let mut engine = engine(4, config);

        let gaps: Vec<Duration> = (0..20)
            .map(|_| {
                engine
                    .humanizer
                    .keystroke_delay(engine.config.typing_min_delay, engine.config.typing_max_delay)
            })
            .collect();
        assert!(gaps.iter().any(|g| *g != gaps[0]));

        let mut driver = field("");
        let start = Instant::now();
        engine
            .human_type(
                &mut driver,
                &ElementHandle::new("query"),
                "abcd",
                &CancelToken::new(),
            )
            .unwrap();
        // Three gaps of at least 5ms each
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
