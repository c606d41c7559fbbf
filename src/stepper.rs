use crate::driver::ActuatorDriver;
use crate::registry::ChannelRegistry;

/// Result of one `tick()` call. The controller ignores throttled ticks;
/// tests use the distinction to check the timing gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Less than the step interval has elapsed; nothing was touched.
    Throttled,
    /// Every channel was examined; `writes` channels actually moved.
    Stepped { writes: usize },
}

/// Rate-limited position stepper.
///
/// Each effective tick advances every channel that is off target by at most
/// `step_deg` and forwards the new position to the actuator driver, so the
/// hardware never sees a discontinuous position jump no matter how far a
/// new target is from the current pose. Ticks closer together than
/// `interval_ms` are no-ops, which decouples the update rate from how often
/// the polling loop happens to call in.
#[derive(Debug)]
pub struct MotionStepper {
    step_deg: i16,
    interval_ms: u64,
    last_tick_ms: Option<u64>,
}

impl MotionStepper {
    pub fn new(step_deg: i16, interval_ms: u64) -> Self {
        Self {
            step_deg,
            interval_ms,
            last_tick_ms: None,
        }
    }

    pub fn step_deg(&self) -> i16 {
        self.step_deg
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Advance every off-target channel by one bounded step.
    ///
    /// Channels are handled independently in registry order; a channel at
    /// its target gets no driver write at all. Convergence is monotonic:
    /// the step magnitude is capped at the remaining gap, so a channel
    /// reaches its target in `ceil(|target - position| / step_deg)`
    /// effective ticks and never overshoots.
    pub fn tick<D: ActuatorDriver>(
        &mut self,
        now_ms: u64,
        registry: &mut ChannelRegistry,
        driver: &mut D,
    ) -> TickOutcome {
        if let Some(last) = self.last_tick_ms {
            // Wrapping subtraction mirrors a millisecond counter rollover.
            if now_ms.wrapping_sub(last) < self.interval_ms {
                return TickOutcome::Throttled;
            }
        }
        self.last_tick_ms = Some(now_ms);

        let mut writes = 0;
        for index in 0..registry.channel_count() {
            if let Some(position_deg) = registry.step_toward(index, self.step_deg) {
                driver.write(index, position_deg);
                writes += 1;
            }
        }

        TickOutcome::Stepped { writes }
    }
}
