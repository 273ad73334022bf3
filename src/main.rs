//! LinkPilot CLI - dry-run entry point
//!
//! Runs every behavior against an in-memory page so settings can be tried
//! out without a browser.
//!
//! Usage: `linkpilot [settings.json] [--instant]`

use std::time::Instant;

use chrono::Timelike;

use linkpilot::config::Settings;
use linkpilot::driver::{ElementHandle, RecordingDriver, Shape};
use linkpilot::logging::init_logger;
use linkpilot::stealth::{
    ActionGate, ActionKind, CancelToken, Cursor, Readiness, StealthConfig, StealthEngine,
};

const DEFAULT_SETTINGS_PATH: &str = "linkpilot.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut path = DEFAULT_SETTINGS_PATH.to_string();
    let mut instant = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--instant" => instant = true,
            _ => path = arg,
        }
    }

    let settings = Settings::load_or_default(&path)?;
    let _logger = init_logger(&settings.logging.level)?;

    println!("LinkPilot - human-like browser behaviors");
    println!("========================================");
    println!();
    println!("Settings: {}", path);
    println!("  - Delay: {}-{}ms", settings.stealth.min_delay_ms, settings.stealth.max_delay_ms);
    println!(
        "  - Typing: {}-{}ms per key",
        settings.stealth.typing_min_delay_ms, settings.stealth.typing_max_delay_ms
    );
    println!(
        "  - Business hours: {} ({}:00-{}:00)",
        settings.stealth.respect_business_hours,
        settings.stealth.business_start_hour,
        settings.stealth.business_end_hour
    );
    println!();

    let config = if instant {
        StealthConfig::instant()
    } else {
        settings.stealth_config()
    };
    let mut gate = ActionGate::new(config.business_hours(), settings.action_limiter());
    let mut engine = StealthEngine::new(config, settings.fingerprint_config());

    let mut driver = RecordingDriver::new()
        .with_element("connect-button", Shape::rect(640.0, 420.0, 96.0, 32.0))
        .with_text_field("note", Shape::rect(400.0, 500.0, 480.0, 120.0), "");
    let cancel = CancelToken::new();
    let mut cursor = Cursor::default();

    let local = chrono::Local::now();
    let hour = local.hour();
    match gate.check(ActionKind::Connection, &local, Instant::now()) {
        Readiness::Ready => println!("Gate: ready at hour {}", hour),
        Readiness::OutsideBusinessHours => {
            println!("Gate: outside business hours at {}:00, running anyway (dry run)", hour)
        }
        Readiness::RateLimited { retry_after } => {
            println!("Gate: rate limited, retry in {:?}", retry_after)
        }
    }

    let applied = engine.configure_fingerprint(&mut driver)?;
    println!("Fingerprint applied: {}", applied);

    engine.move_to(
        &mut driver,
        &ElementHandle::new("connect-button"),
        &mut cursor,
        &cancel,
    )?;
    println!("Pointer landed at {:?}", cursor.position());
    engine.pace();

    let note = "Hi, I enjoyed your talk and would love to connect.";
    engine.human_type(&mut driver, &ElementHandle::new("note"), note, &cancel)?;
    println!("Typed note: {:?}", driver.text_of("note").unwrap_or_default());
    gate.record(ActionKind::Connection, Instant::now());

    let plans = engine.scroll_session(&mut driver, 3, &cancel)?;
    let scrolled: i64 = plans.iter().map(|p| p.step_size() * i64::from(p.steps)).sum();
    println!("Scrolled {}px in {} bursts", scrolled, plans.len());

    let landed = engine.idle_behavior(&mut driver, &mut cursor, &cancel)?;
    println!("Idle moves: {}", landed);

    println!();
    println!("Driver calls issued: {}", driver.events().len());
    println!(
        "Connections left this window: {:?}",
        gate.limiter_mut().remaining(ActionKind::Connection, Instant::now())
    );

    Ok(())
}
