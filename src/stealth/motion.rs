//! Pointer motion along generated paths

use rand::Rng;

use super::cancel::CancelToken;
use super::curve::{generate_path, Point};
use super::engine::StealthEngine;
use super::StealthError;
use crate::driver::{BrowserDriver, ElementHandle};

/// Where the pointer starts before any move has been issued
pub const DEFAULT_CURSOR_POSITION: Point = Point::new(100.0, 100.0);

/// Last known pointer position, owned by the caller
///
/// Drivers cannot report where the pointer is, so the position of the last
/// issued move is threaded through every pointer behavior instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    position: Point,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::at(DEFAULT_CURSOR_POSITION)
    }
}

impl Cursor {
    pub fn at(position: Point) -> Self {
        Self { position }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub(crate) fn set(&mut self, position: Point) {
        self.position = position;
    }
}

impl<R: Rng> StealthEngine<R> {
    /// Move the pointer onto `target` along a curved path
    ///
    /// Lands within 5px of the element center. Moves already issued are not
    /// undone on failure; `cursor` always holds the last position issued.
    pub fn move_to<D: BrowserDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        target: &ElementHandle,
        cursor: &mut Cursor,
        cancel: &CancelToken,
    ) -> Result<(), StealthError> {
        if target.is_empty() {
            return Err(StealthError::InvalidElement(target.id.clone()));
        }

        let shape = driver
            .shape(target)
            .map_err(StealthError::driver("read element shape", 0))?;
        let center = shape.center().ok_or(StealthError::NoVisibleArea)?;

        let (dx, dy) = self.humanizer.pointer_offset();
        let destination = Point::new(center.x + dx, center.y + dy);
        let path = generate_path(self.humanizer.rng(), cursor.position(), destination);

        log::debug!(
            "moving pointer to {} from {:?} to {:?} in {} steps",
            target.id,
            cursor.position(),
            destination,
            path.len()
        );

        self.follow_path(driver, &path, cursor, cancel)
    }

    /// Issue one move per path point with short pauses in between
    pub(crate) fn follow_path<D: BrowserDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        path: &[Point],
        cursor: &mut Cursor,
        cancel: &CancelToken,
    ) -> Result<(), StealthError> {
        for (i, point) in path.iter().enumerate() {
            cancel.check()?;

            driver
                .mouse_move(*point)
                .map_err(StealthError::driver("move pointer", i))?;
            cursor.set(*point);

            if i + 1 < path.len() {
                let pause = self.humanizer.pointer_step_pause();
                self.sleep(pause);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverEvent, RecordingDriver, Shape};
    use crate::stealth::curve::{MAX_PATH_POINTS, MIN_PATH_POINTS};
    use crate::stealth::humanize::Humanizer;
    use crate::stealth::{FingerprintConfig, StealthConfig};

    fn engine(seed: u64) -> StealthEngine {
        StealthEngine::with_rng(
            StealthConfig::instant(),
            FingerprintConfig::default(),
            Humanizer::seeded(seed),
        )
    }

    #[test]
    fn test_move_lands_near_element_center() {
        let mut engine = engine(1);
        let mut driver =
            RecordingDriver::new().with_element("connect", Shape::rect(600.0, 400.0, 80.0, 30.0));
        let mut cursor = Cursor::default();

        engine
            .move_to(
                &mut driver,
                &ElementHandle::new("connect"),
                &mut cursor,
                &CancelToken::new(),
            )
            .unwrap();

        let moves = driver.mouse_positions();
        assert!((MIN_PATH_POINTS..=MAX_PATH_POINTS).contains(&moves.len()));

        let center = Point::new(640.0, 415.0);
        let last = moves[moves.len() - 1];
        // 5px landing offset plus 1px jitter per axis
        assert!(last.distance_to(center) <= 9.0);
        assert!(moves[0].distance_to(DEFAULT_CURSOR_POSITION) <= 10.0);
        assert_eq!(cursor.position(), last);
    }

    #[test]
    fn test_consecutive_moves_start_from_cursor() {
        let mut engine = engine(2);
        let mut driver = RecordingDriver::new()
            .with_element("a", Shape::rect(800.0, 100.0, 20.0, 20.0))
            .with_element("b", Shape::rect(200.0, 600.0, 20.0, 20.0));
        let mut cursor = Cursor::default();
        let cancel = CancelToken::new();

        engine
            .move_to(&mut driver, &ElementHandle::new("a"), &mut cursor, &cancel)
            .unwrap();
        let after_first = cursor.position();
        let first_len = driver.mouse_positions().len();

        engine
            .move_to(&mut driver, &ElementHandle::new("b"), &mut cursor, &cancel)
            .unwrap();

        let second_start = driver.mouse_positions()[first_len];
        assert!(second_start.distance_to(after_first) <= 10.0);
    }

    #[test]
    fn test_invisible_element_rejected() {
        let mut engine = engine(3);
        let mut driver = RecordingDriver::new().with_element("hidden", Shape::default());

        let err = engine
            .move_to(
                &mut driver,
                &ElementHandle::new("hidden"),
                &mut Cursor::default(),
                &CancelToken::new(),
            )
            .unwrap_err();

        assert!(matches!(err, StealthError::NoVisibleArea));
        assert!(driver.events().is_empty());
    }

    #[test]
    fn test_empty_handle_rejected() {
        let mut engine = engine(4);
        let mut driver = RecordingDriver::new();

        let err = engine
            .move_to(
                &mut driver,
                &ElementHandle::new(""),
                &mut Cursor::default(),
                &CancelToken::new(),
            )
            .unwrap_err();

        assert!(matches!(err, StealthError::InvalidElement(_)));
        assert!(err.is_permanent());
    }

    #[test]
    fn test_move_failure_wrapped_with_step() {
        let mut engine = engine(5);
        let mut driver = RecordingDriver::new()
            .with_element("btn", Shape::rect(500.0, 500.0, 40.0, 40.0))
            .failing_moves_after(3);
        let mut cursor = Cursor::default();

        let err = engine
            .move_to(
                &mut driver,
                &ElementHandle::new("btn"),
                &mut cursor,
                &CancelToken::new(),
            )
            .unwrap_err();

        match err {
            StealthError::Driver { action, step, .. } => {
                assert_eq!(action, "move pointer");
                assert_eq!(step, 3);
            }
            other => panic!("Expected driver error, got {other:?}"),
        }
        // Partial progress is kept
        assert_eq!(driver.mouse_positions().len(), 3);
        assert_eq!(cursor.position(), driver.mouse_positions()[2]);
    }

    #[test]
    fn test_cancel_mid_path() {
        let mut engine = engine(6);
        let cancel = CancelToken::new();
        let mut driver = RecordingDriver::new()
            .with_element("btn", Shape::rect(900.0, 700.0, 40.0, 40.0))
            .cancelling_after_moves(4, cancel.clone());

        let err = engine
            .move_to(
                &mut driver,
                &ElementHandle::new("btn"),
                &mut Cursor::default(),
                &cancel,
            )
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(driver.mouse_positions().len(), 4);
    }

    #[test]
    fn test_cancelled_before_start_issues_nothing() {
        let mut engine = engine(7);
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut driver =
            RecordingDriver::new().with_element("btn", Shape::rect(10.0, 10.0, 40.0, 40.0));

        let err = engine
            .move_to(
                &mut driver,
                &ElementHandle::new("btn"),
                &mut Cursor::default(),
                &cancel,
            )
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(!driver
            .events()
            .iter()
            .any(|e| matches!(e, DriverEvent::MouseMove(_))));
    }
}
