//! Line-delimited JSON bridge to an external browser driver
//!
//! The browser itself lives in a separate driver process (a CDP client, a
//! WebDriver shim, ...). Each primitive becomes one JSON command line on
//! the writer, answered by exactly one JSON reply line on the reader.
//!
//! ```text
//! -> {"cmd":"mouse_move","x":412.5,"y":230.0}
//! <- {"ok":true}
//! -> {"cmd":"shape","element":"search-box"}
//! <- {"ok":true,"quads":[[10,10,110,10,110,40,10,40]]}
//! ```

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use super::{BrowserDriver, DriverError, ElementHandle, FingerprintOverrides, Key, Shape};
use crate::stealth::curve::Point;

/// Command sent to the driver process
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DriverCommand<'a> {
    Shape {
        element: &'a str,
    },
    MouseMove {
        x: f64,
        y: f64,
    },
    Scroll {
        delta_x: f64,
        delta_y: f64,
    },
    InsertText {
        element: &'a str,
        text: &'a str,
    },
    PressKey {
        element: &'a str,
        key: Key,
    },
    SelectAll {
        element: &'a str,
    },
    OverrideFingerprint {
        #[serde(flatten)]
        overrides: &'a FingerprintOverrides,
    },
}

impl DriverCommand<'_> {
    /// Wire tag of the command, safe to log (carries no typed text)
    pub fn name(&self) -> &'static str {
        match self {
            DriverCommand::Shape { .. } => "shape",
            DriverCommand::MouseMove { .. } => "mouse_move",
            DriverCommand::Scroll { .. } => "scroll",
            DriverCommand::InsertText { .. } => "insert_text",
            DriverCommand::PressKey { .. } => "press_key",
            DriverCommand::SelectAll { .. } => "select_all",
            DriverCommand::OverrideFingerprint { .. } => "override_fingerprint",
        }
    }
}

/// Reply read back from the driver process
#[derive(Debug, Deserialize)]
pub struct DriverReply {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub quads: Option<Vec<[f64; 8]>>,
}

/// Driver adapter speaking the line protocol over any reader/writer pair
pub struct BridgeDriver<R, W> {
    reader: R,
    writer: W,
    line: String,
}

impl<R: BufRead, W: Write> BridgeDriver<R, W> {
    /// Wrap the driver process' stdout (reader) and stdin (writer)
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
        }
    }

    /// Give back the underlying streams
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Send one command and wait for its reply
    pub fn call(&mut self, command: &DriverCommand<'_>) -> Result<DriverReply, DriverError> {
        serde_json::to_writer(&mut self.writer, command)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(DriverError::Disconnected);
        }

        let reply: DriverReply = serde_json::from_str(self.line.trim_end())?;
        if !reply.ok {
            let message = reply
                .error
                .unwrap_or_else(|| "driver reported failure".to_string());
            return Err(DriverError::Command(message));
        }

        log::trace!("driver replied to {}", command.name());
        Ok(reply)
    }

    fn expect_ok(&mut self, command: DriverCommand<'_>) -> Result<(), DriverError> {
        self.call(&command).map(|_| ())
    }
}

impl<R: BufRead, W: Write> BrowserDriver for BridgeDriver<R, W> {
    fn shape(&mut self, element: &ElementHandle) -> Result<Shape, DriverError> {
        let reply = self.call(&DriverCommand::Shape {
            element: &element.id,
        })?;
        Ok(Shape {
            quads: reply.quads.unwrap_or_default(),
        })
    }

    fn mouse_move(&mut self, to: Point) -> Result<(), DriverError> {
        self.expect_ok(DriverCommand::MouseMove { x: to.x, y: to.y })
    }

    fn scroll(&mut self, delta_x: f64, delta_y: f64) -> Result<(), DriverError> {
        self.expect_ok(DriverCommand::Scroll { delta_x, delta_y })
    }

    fn insert_text(&mut self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.expect_ok(DriverCommand::InsertText {
            element: &element.id,
            text,
        })
    }

    fn press_key(&mut self, element: &ElementHandle, key: Key) -> Result<(), DriverError> {
        self.expect_ok(DriverCommand::PressKey {
            element: &element.id,
            key,
        })
    }

    fn select_all(&mut self, element: &ElementHandle) -> Result<(), DriverError> {
        self.expect_ok(DriverCommand::SelectAll {
            element: &element.id,
        })
    }

    fn override_fingerprint(
        &mut self,
        overrides: &FingerprintOverrides,
    ) -> Result<(), DriverError> {
        self.expect_ok(DriverCommand::OverrideFingerprint { overrides })
    }
}
