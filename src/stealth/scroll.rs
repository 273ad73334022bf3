//! Scrolling and idle pointer behavior

use rand::Rng;

use super::cancel::CancelToken;
use super::engine::StealthEngine;
use super::humanize::ScrollPlan;
use super::motion::Cursor;
use super::StealthError;
use crate::driver::BrowserDriver;

impl<R: Rng> StealthEngine<R> {
    /// Scroll once in a few uneven-feeling increments
    ///
    /// Mostly downward, 100-400px split into 3-7 equal sub-steps. Returns
    /// the plan that was carried out.
    pub fn scroll_naturally<D: BrowserDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        cancel: &CancelToken,
    ) -> Result<ScrollPlan, StealthError> {
        let plan = self.humanizer.scroll_plan();
        let step = plan.step_size() as f64;
        log::debug!(
            "scrolling {}px in {} steps of {}px",
            plan.distance,
            plan.steps,
            step
        );

        for i in 0..plan.steps {
            cancel.check()?;

            driver
                .scroll(0.0, step)
                .map_err(StealthError::driver("scroll", i as usize))?;

            if i + 1 < plan.steps {
                let pause = self.humanizer.scroll_step_pause();
                self.sleep(pause);
            }
        }

        Ok(plan)
    }

    /// Several scroll bursts separated by reading pauses
    ///
    /// Pauses between bursts are drawn from the configured scroll delay
    /// bounds.
    pub fn scroll_session<D: BrowserDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        bursts: u32,
        cancel: &CancelToken,
    ) -> Result<Vec<ScrollPlan>, StealthError> {
        let mut plans = Vec::with_capacity(bursts as usize);

        for burst in 0..bursts {
            plans.push(self.scroll_naturally(driver, cancel)?);

            if burst + 1 < bursts {
                cancel.check()?;
                let pause = self
                    .humanizer
                    .delay_between(self.config.scroll_min_delay, self.config.scroll_max_delay);
                self.sleep(pause);
            }
        }

        Ok(plans)
    }

    /// Wander the pointer around like someone reading the page
    ///
    /// Makes 2-5 direct moves to random spots in the 100..900 x 100..700
    /// box, resting 0.5-1.5s after each. A failed move is logged and
    /// skipped; it never fails the call. Returns how many moves landed.
    pub fn idle_behavior<D: BrowserDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        cursor: &mut Cursor,
        cancel: &CancelToken,
    ) -> Result<u32, StealthError> {
        let moves = self.humanizer.idle_move_count();
        let mut landed = 0;

        for i in 0..moves {
            cancel.check()?;

            let spot = self.humanizer.idle_point();
            if let Err(e) = driver.mouse_move(spot) {
                log::warn!("idle move {} to {:?} failed: {}", i, spot, e);
                continue;
            }
            cursor.set(spot);
            landed += 1;

            let rest = self.humanizer.idle_pause();
            self.sleep(rest);
        }

        log::debug!("idle wandering made {}/{} moves", landed, moves);
        Ok(landed)
    }
}
