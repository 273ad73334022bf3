//! Browser driver capability interface
//!
//! The engine never talks to a browser directly. It issues a handful of
//! primitive actions through [`BrowserDriver`], implemented by a real
//! adapter ([`BridgeDriver`]) and an in-memory page ([`RecordingDriver`]).

pub mod bridge;
pub mod recording;

pub use bridge::BridgeDriver;
pub use recording::{DriverEvent, RecordingDriver};

use serde::{Deserialize, Serialize};

use crate::stealth::curve::Point;

/// Opaque reference to an element on the current page
///
/// The id is whatever the driver uses to find the node again (remote
/// object id, selector, test key). An empty id stands for "no element".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.id.trim().is_empty()
    }
}

/// Visible geometry of an element
///
/// Each quad lists four corners as `[x1, y1, x2, y2, x3, y3, x4, y4]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub quads: Vec<[f64; 8]>,
}

impl Shape {
    /// Shape made of a single axis-aligned rectangle
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            quads: vec![[
                x,
                y,
                x + width,
                y,
                x + width,
                y + height,
                x,
                y + height,
            ]],
        }
    }

    /// Center of the first quad, `None` when nothing is rendered
    pub fn center(&self) -> Option<Point> {
        let q = self.quads.first()?;
        Some(Point::new(
            (q[0] + q[2] + q[4] + q[6]) / 4.0,
            (q[1] + q[3] + q[5] + q[7]) / 4.0,
        ))
    }
}

/// Non-character keys the engine presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Backspace,
}

/// Page-level identity overrides applied once per session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Width and height in CSS pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<(u32, u32)>,
    /// Script evaluated before any page script runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_script: Option<String>,
}

impl FingerprintOverrides {
    pub fn is_empty(&self) -> bool {
        self.user_agent.is_none() && self.viewport.is_none() && self.init_script.is_none()
    }
}

/// The narrow set of primitives the stealth engine needs from a browser
pub trait BrowserDriver {
    /// Visible geometry of `element`
    fn shape(&mut self, element: &ElementHandle) -> Result<Shape, DriverError>;

    /// Move the pointer to absolute page coordinates
    fn mouse_move(&mut self, to: Point) -> Result<(), DriverError>;

    /// Scroll the page by a pixel delta
    fn scroll(&mut self, delta_x: f64, delta_y: f64) -> Result<(), DriverError>;

    /// Type text into `element` as keyboard input
    fn insert_text(&mut self, element: &ElementHandle, text: &str) -> Result<(), DriverError>;

    /// Press and release a key while `element` has focus
    fn press_key(&mut self, element: &ElementHandle, key: Key) -> Result<(), DriverError>;

    /// Select all text inside `element` so the next input replaces it
    fn select_all(&mut self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Override navigator and viewport properties of the page
    fn override_fingerprint(&mut self, overrides: &FingerprintOverrides)
        -> Result<(), DriverError>;
}

/// Driver errors
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Driver command failed: {0}")]
    Command(String),
    #[error("Unknown element: {0}")]
    UnknownElement(String),
    #[error("Driver I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed driver message: {0}")]
    Protocol(#[from] serde_json::Error),
    #[error("Driver disconnected")]
    Disconnected,
}
