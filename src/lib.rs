//! LinkPilot - human-like browser automation behaviors
//!
//! This library provides the behavior engine used to drive a browser the way
//! a person would: curved pointer paths, uneven typing with corrected
//! mistakes, bursty scrolling and idle wandering, plus the pacing, working
//! hours and rate-limit policy that decides when an action may run.
//!
//! ## Drivers
//!
//! Behaviors talk to the browser through the narrow `driver::BrowserDriver`
//! trait. `driver::BridgeDriver` speaks a line-delimited JSON protocol to an
//! external driver process; `driver::RecordingDriver` keeps everything in
//! memory for dry runs and tests.

pub mod config;
pub mod driver;
pub mod logging;
pub mod stealth;
