//! In-memory page that records every driver call
//!
//! Used for dry runs and as the test double behind every behavior test.
//! Text fields keep their content so typing can be checked end to end.

use std::collections::HashMap;

use super::{BrowserDriver, DriverError, ElementHandle, FingerprintOverrides, Key, Shape};
use crate::stealth::cancel::CancelToken;
use crate::stealth::curve::Point;

/// A driver call as the page saw it
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    MouseMove(Point),
    Scroll { delta_x: f64, delta_y: f64 },
    InsertText { element: String, text: String },
    PressKey { element: String, key: Key },
    SelectAll { element: String },
    Fingerprint(FingerprintOverrides),
}

#[derive(Debug, Clone, Default)]
struct FakeElement {
    shape: Shape,
    text: String,
    selected: bool,
}

/// Scripted page with registered elements and optional fault injection
#[derive(Debug, Default)]
pub struct RecordingDriver {
    elements: HashMap<String, FakeElement>,
    events: Vec<DriverEvent>,
    /// Moves accepted before every further move fails
    fail_moves_after: Option<usize>,
    fail_scrolls: bool,
    fail_input: bool,
    fail_fingerprint: bool,
    /// Tokens cancelled once this many calls of a kind were accepted
    cancel_after_moves: Option<(usize, CancelToken)>,
    cancel_after_scrolls: Option<(usize, CancelToken)>,
    cancel_after_inputs: Option<(usize, CancelToken)>,
    moves_seen: usize,
    scrolls_seen: usize,
    inputs_seen: usize,
}

fn cancel_when_reached(trigger: &Option<(usize, CancelToken)>, seen: usize) {
    if let Some((count, token)) = trigger {
        if seen >= *count {
            token.cancel();
        }
    }
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element with the given geometry
    pub fn with_element(mut self, id: &str, shape: Shape) -> Self {
        self.elements.insert(
            id.to_string(),
            FakeElement {
                shape,
                ..Default::default()
            },
        );
        self
    }

    /// Register an element that already holds text
    pub fn with_text_field(mut self, id: &str, shape: Shape, text: &str) -> Self {
        self.elements.insert(
            id.to_string(),
            FakeElement {
                shape,
                text: text.to_string(),
                selected: false,
            },
        );
        self
    }

    /// Accept `count` pointer moves, then fail every subsequent one
    pub fn failing_moves_after(mut self, count: usize) -> Self {
        self.fail_moves_after = Some(count);
        self
    }

    pub fn failing_scrolls(mut self) -> Self {
        self.fail_scrolls = true;
        self
    }

    pub fn failing_input(mut self) -> Self {
        self.fail_input = true;
        self
    }

    pub fn failing_fingerprint(mut self) -> Self {
        self.fail_fingerprint = true;
        self
    }

    /// Cancel `token` as soon as `count` pointer moves were accepted
    pub fn cancelling_after_moves(mut self, count: usize, token: CancelToken) -> Self {
        self.cancel_after_moves = Some((count, token));
        self
    }

    /// Cancel `token` as soon as `count` scroll events were accepted
    pub fn cancelling_after_scrolls(mut self, count: usize, token: CancelToken) -> Self {
        self.cancel_after_scrolls = Some((count, token));
        self
    }

    /// Cancel `token` as soon as `count` text inserts were accepted
    pub fn cancelling_after_inputs(mut self, count: usize, token: CancelToken) -> Self {
        self.cancel_after_inputs = Some((count, token));
        self
    }

    /// Every call received so far, in order
    pub fn events(&self) -> &[DriverEvent] {
        &self.events
    }

    /// Current content of a text field
    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.text.as_str())
    }

    /// Positions of all accepted pointer moves
    pub fn mouse_positions(&self) -> Vec<Point> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DriverEvent::MouseMove(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Vertical deltas of all accepted scroll events
    pub fn scroll_deltas(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Scroll { delta_y, .. } => Some(*delta_y),
                _ => None,
            })
            .collect()
    }

    fn element_mut(&mut self, element: &ElementHandle) -> Result<&mut FakeElement, DriverError> {
        self.elements
            .get_mut(&element.id)
            .ok_or_else(|| DriverError::UnknownElement(element.id.clone()))
    }
}

impl BrowserDriver for RecordingDriver {
    fn shape(&mut self, element: &ElementHandle) -> Result<Shape, DriverError> {
        Ok(self.element_mut(element)?.shape.clone())
    }

    fn mouse_move(&mut self, to: Point) -> Result<(), DriverError> {
        if self.fail_moves_after.is_some_and(|limit| self.moves_seen >= limit) {
            return Err(DriverError::Command("mouse move rejected".to_string()));
        }

        self.moves_seen += 1;
        self.events.push(DriverEvent::MouseMove(to));
        cancel_when_reached(&self.cancel_after_moves, self.moves_seen);
        Ok(())
    }

    fn scroll(&mut self, delta_x: f64, delta_y: f64) -> Result<(), DriverError> {
        if self.fail_scrolls {
            return Err(DriverError::Command("scroll rejected".to_string()));
        }
        self.scrolls_seen += 1;
        self.events.push(DriverEvent::Scroll { delta_x, delta_y });
        cancel_when_reached(&self.cancel_after_scrolls, self.scrolls_seen);
        Ok(())
    }

    fn insert_text(&mut self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        if self.fail_input {
            return Err(DriverError::Command("input rejected".to_string()));
        }

        let field = self.element_mut(element)?;
        if field.selected {
            field.text.clear();
            field.selected = false;
        }
        field.text.push_str(text);

        self.inputs_seen += 1;
        self.events.push(DriverEvent::InsertText {
            element: element.id.clone(),
            text: text.to_string(),
        });
        cancel_when_reached(&self.cancel_after_inputs, self.inputs_seen);
        Ok(())
    }

    fn press_key(&mut self, element: &ElementHandle, key: Key) -> Result<(), DriverError> {
        if self.fail_input {
            return Err(DriverError::Command("key press rejected".to_string()));
        }

        let field = self.element_mut(element)?;
        match key {
            Key::Backspace => {
                if field.selected {
                    field.text.clear();
                    field.selected = false;
                } else {
                    field.text.pop();
                }
            }
        }

        self.events.push(DriverEvent::PressKey {
            element: element.id.clone(),
            key,
        });
        Ok(())
    }

    fn select_all(&mut self, element: &ElementHandle) -> Result<(), DriverError> {
        if self.fail_input {
            return Err(DriverError::Command("select all rejected".to_string()));
        }

        self.element_mut(element)?.selected = true;
        self.events.push(DriverEvent::SelectAll {
            element: element.id.clone(),
        });
        Ok(())
    }

    fn override_fingerprint(
        &mut self,
        overrides: &FingerprintOverrides,
    ) -> Result<(), DriverError> {
        if self.fail_fingerprint {
            return Err(DriverError::Command("fingerprint override rejected".to_string()));
        }
        self.events.push(DriverEvent::Fingerprint(overrides.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_then_type_replaces_text() {
        let field = ElementHandle::new("name");
        let mut driver =
            RecordingDriver::new().with_text_field("name", Shape::rect(0.0, 0.0, 10.0, 10.0), "old");

        driver.select_all(&field).unwrap();
        driver.insert_text(&field, "n").unwrap();
        driver.insert_text(&field, "ew").unwrap();

        assert_eq!(driver.text_of("name"), Some("new"));
    }

    #[test]
    fn test_backspace_removes_last_char() {
        let field = ElementHandle::new("name");
        let mut driver =
            RecordingDriver::new().with_text_field("name", Shape::rect(0.0, 0.0, 10.0, 10.0), "abc");

        driver.press_key(&field, Key::Backspace).unwrap();

        assert_eq!(driver.text_of("name"), Some("ab"));
    }

    #[test]
    fn test_move_failure_injection() {
        let mut driver = RecordingDriver::new().failing_moves_after(2);

        assert!(driver.mouse_move(Point::new(1.0, 1.0)).is_ok());
        assert!(driver.mouse_move(Point::new(2.0, 2.0)).is_ok());
        assert!(driver.mouse_move(Point::new(3.0, 3.0)).is_err());
        assert_eq!(driver.mouse_positions().len(), 2);
    }

    #[test]
    fn test_cancel_hooks_fire_after_count() {
        let token = CancelToken::new();
        let mut driver = RecordingDriver::new().cancelling_after_scrolls(2, token.clone());

        driver.scroll(0.0, 10.0).unwrap();
        assert!(!token.is_cancelled());
        driver.scroll(0.0, 10.0).unwrap();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_unknown_element() {
        let mut driver = RecordingDriver::new();
        let result = driver.shape(&ElementHandle::new("missing"));
        assert!(matches!(result, Err(DriverError::UnknownElement(_))));
    }
}
