//! Browser fingerprint patching
//!
//! One-shot session setup: user agent, viewport size and a script that
//! hides the usual automation giveaways.

use rand::Rng;

use super::engine::StealthEngine;
use super::{FingerprintConfig, StealthError};
use crate::driver::{BrowserDriver, FingerprintOverrides};

/// User agent used when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Script injected before page scripts to mask automation signals
pub const MASK_WEBDRIVER_SCRIPT: &str = r#"
(() => {
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined,
        configurable: true,
    });

    if (!window.chrome) {
        window.chrome = {};
    }
    if (!window.chrome.runtime) {
        window.chrome.runtime = {};
    }

    Object.defineProperty(navigator, 'plugins', {
        get: () => [1, 2, 3, 4, 5],
        configurable: true,
    });

    Object.defineProperty(navigator, 'languages', {
        get: () => ['en-US', 'en'],
        configurable: true,
    });
})();
"#;

impl FingerprintConfig {
    /// Overrides to send to the page; unset fields are left out
    pub fn overrides(&self) -> FingerprintOverrides {
        let user_agent = Some(self.user_agent.trim())
            .filter(|ua| !ua.is_empty())
            .map(str::to_string);

        let viewport = (self.viewport_width > 0 && self.viewport_height > 0)
            .then_some((self.viewport_width, self.viewport_height));

        let init_script = self
            .mask_webdriver
            .then(|| MASK_WEBDRIVER_SCRIPT.to_string());

        FingerprintOverrides {
            user_agent,
            viewport,
            init_script,
        }
    }
}

impl<R: Rng> StealthEngine<R> {
    /// Apply the configured fingerprint to the current page
    ///
    /// Returns `false` when nothing was configured and the driver was not
    /// called.
    pub fn configure_fingerprint<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Result<bool, StealthError> {
        let overrides = self.fingerprint.overrides();
        if overrides.is_empty() {
            log::warn!("no fingerprint overrides configured, leaving browser defaults");
            return Ok(false);
        }

        log::debug!(
            "applying fingerprint: user agent {}, viewport {:?}, webdriver masked {}",
            overrides.user_agent.is_some(),
            overrides.viewport,
            overrides.init_script.is_some()
        );

        driver
            .override_fingerprint(&overrides)
            .map_err(StealthError::driver("configure fingerprint", 0))?;
        Ok(true)
    }
}
