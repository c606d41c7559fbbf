use serde::Serialize;

use crate::config::{ArmConfig, ConfigError};
use crate::driver::ActuatorDriver;
use crate::protocol::{parse_line, LineAssembler, LineOutcomes, SegmentOutcome};
use crate::registry::ChannelRegistry;
use crate::stepper::{MotionStepper, TickOutcome};

/// Running counters for diagnostics. Fire-and-forget protocol means these
/// are the only place a noisy command source becomes visible.
#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct ControllerStats {
    pub lines_parsed: u32,
    pub lines_overflowed: u32,
    pub segments_applied: u32,
    pub segments_dropped: u32,
    pub step_writes: u32,
}

/// Orchestrates the whole controller: assembles raw input bytes into lines,
/// parses them into target updates, and runs the rate-gated stepper that
/// walks each joint toward its target.
///
/// Intake (`push_byte`/`push_bytes`) and motion (`tick`) are both plain
/// synchronous calls meant to be interleaved from a single polling loop;
/// neither blocks, and each runs to completion before the other can touch
/// the shared channel table. A tick that lands mid-line only ever sees
/// fully-applied individual targets, which is safe because every target
/// write is independently valid.
pub struct ArmController<D: ActuatorDriver> {
    registry: ChannelRegistry,
    assembler: LineAssembler,
    stepper: MotionStepper,
    driver: D,
    stats: ControllerStats,
}

impl<D: ActuatorDriver> ArmController<D> {
    /// Build the controller and home the arm: every joint is driven to its
    /// configured initial pose exactly once, so the hardware starts from a
    /// known-safe position before any command arrives.
    pub fn new(config: &ArmConfig, driver: D) -> Result<Self, ConfigError> {
        let registry = ChannelRegistry::from_config(config)?;
        let mut controller = Self {
            registry,
            assembler: LineAssembler::new(),
            stepper: MotionStepper::new(config.step_deg, config.step_interval_ms),
            driver,
            stats: ControllerStats::default(),
        };

        for index in 0..controller.registry.channel_count() {
            if let Some(channel) = controller.registry.channel(index) {
                let pose = channel.position_deg();
                controller.driver.write(index, pose);
            }
        }

        Ok(controller)
    }

    /// One-time startup banner, emitted to the command source.
    pub fn greeting(&self) -> alloc::string::String {
        alloc::format!(
            "servobus ready ({} channels). Send commands like m1:135 or m1:90;m2:45",
            self.registry.channel_count()
        )
    }

    /// Feed one raw input byte. Returns the per-segment outcomes when the
    /// byte completes a line; the production loop can ignore them.
    pub fn push_byte(&mut self, byte: u8) -> Option<LineOutcomes> {
        let was_discarding = self.assembler.is_discarding();
        let line = self.assembler.push_byte(byte);
        if was_discarding && !self.assembler.is_discarding() {
            // Terminator that closed out an overflowed line.
            self.stats.lines_overflowed = self.stats.lines_overflowed.saturating_add(1);
            return None;
        }

        let line = line?;
        let outcomes = parse_line(&line, &mut self.registry);
        self.stats.lines_parsed = self.stats.lines_parsed.saturating_add(1);
        for outcome in &outcomes {
            match outcome {
                SegmentOutcome::Applied { .. } => {
                    self.stats.segments_applied = self.stats.segments_applied.saturating_add(1);
                }
                SegmentOutcome::DroppedMalformed | SegmentOutcome::DroppedUnknownChannel => {
                    self.stats.segments_dropped = self.stats.segments_dropped.saturating_add(1);
                }
            }
        }

        Some(outcomes)
    }

    /// Drain a chunk of input, e.g. everything currently readable from the
    /// transport.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let _ = self.push_byte(byte);
        }
    }

    /// Run one stepper tick at the given millisecond timestamp. Safe to
    /// call as often as the polling loop likes; calls inside the step
    /// interval are no-ops.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        let outcome = self.stepper.tick(now_ms, &mut self.registry, &mut self.driver);
        if let TickOutcome::Stepped { writes } = outcome {
            self.stats.step_writes = self.stats.step_writes.saturating_add(writes as u32);
        }
        outcome
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &ControllerStats {
        &self.stats
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}
