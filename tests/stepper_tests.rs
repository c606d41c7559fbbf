use servobus::config::ArmConfig;
use servobus::driver::ActuatorDriver;
use servobus::registry::ChannelRegistry;
use servobus::stepper::{MotionStepper, TickOutcome};

/// Test double recording every position write the stepper forwards.
#[derive(Default)]
struct RecordingDriver {
    writes: Vec<(usize, i16)>,
}

impl ActuatorDriver for RecordingDriver {
    fn write(&mut self, channel: usize, angle_deg: i16) {
        self.writes.push((channel, angle_deg));
    }
}

fn braccio_registry() -> ChannelRegistry {
    ChannelRegistry::from_config(&ArmConfig::braccio()).unwrap()
}

#[test]
fn test_convergence_tick_count_matches_gap() {
    // m1 from 90 to 135 with step 4: ceil(45 / 4) = 12 effective ticks.
    let mut stepper = MotionStepper::new(4, 15);
    let mut registry = braccio_registry();
    let mut driver = RecordingDriver::default();
    registry.apply_target(0, 135);

    let mut moving_ticks = 0;
    let mut now_ms = 0;
    for _ in 0..40 {
        if let TickOutcome::Stepped { writes } = stepper.tick(now_ms, &mut registry, &mut driver) {
            if writes > 0 {
                moving_ticks += 1;
            }
        }
        now_ms += 15;
    }

    assert_eq!(moving_ticks, 12);
    assert_eq!(registry.channel(0).unwrap().position_deg(), 135);

    // Monotonic approach: no overshoot, no oscillation.
    let mut previous = 90;
    for &(channel, angle) in &driver.writes {
        assert_eq!(channel, 0);
        assert!(angle > previous && angle <= 135);
        previous = angle;
    }
    assert_eq!(driver.writes.last(), Some(&(0, 135)));
}

#[test]
fn test_position_never_leaves_safe_range() {
    let mut stepper = MotionStepper::new(7, 15);
    let mut registry = braccio_registry();
    let mut driver = RecordingDriver::default();

    // Slam targets to the extremes in both directions while ticking.
    let extremes = [999, 0, 999, 0];
    let mut now_ms = 0;
    for target in extremes {
        for index in 0..registry.channel_count() {
            registry.apply_target(index, target);
        }
        for _ in 0..10 {
            let _ = stepper.tick(now_ms, &mut registry, &mut driver);
            now_ms += 15;
            for channel in registry.channels() {
                assert!(channel.min_deg() <= channel.position_deg());
                assert!(channel.position_deg() <= channel.max_deg());
            }
        }
    }
}

#[test]
fn test_repeated_target_causes_no_further_writes() {
    let mut stepper = MotionStepper::new(1, 15);
    let mut registry = braccio_registry();
    let mut driver = RecordingDriver::default();

    registry.apply_target(5, 12);
    let mut now_ms = 0;
    loop {
        match stepper.tick(now_ms, &mut registry, &mut driver) {
            TickOutcome::Stepped { writes: 0 } => break,
            _ => now_ms += 15,
        }
    }
    let settled = driver.writes.len();

    // Re-applying the same target is a no-op for the stepper.
    registry.apply_target(5, 12);
    for _ in 0..5 {
        now_ms += 15;
        assert_eq!(
            stepper.tick(now_ms, &mut registry, &mut driver),
            TickOutcome::Stepped { writes: 0 }
        );
    }
    assert_eq!(driver.writes.len(), settled);
}

#[test]
fn test_channel_at_target_gets_no_write() {
    // m6 homed at 10, commanded to 10: nothing should reach the driver.
    let mut stepper = MotionStepper::new(1, 15);
    let mut registry = braccio_registry();
    let mut driver = RecordingDriver::default();

    registry.apply_target(5, 10);
    let outcome = stepper.tick(0, &mut registry, &mut driver);
    assert_eq!(outcome, TickOutcome::Stepped { writes: 0 });
    assert!(driver.writes.is_empty());
}

#[test]
fn test_two_ticks_inside_interval_produce_one_write_set() {
    let mut stepper = MotionStepper::new(1, 15);
    let mut registry = braccio_registry();
    let mut driver = RecordingDriver::default();
    registry.apply_target(0, 95);

    assert_eq!(
        stepper.tick(1000, &mut registry, &mut driver),
        TickOutcome::Stepped { writes: 1 }
    );
    assert_eq!(
        stepper.tick(1014, &mut registry, &mut driver),
        TickOutcome::Throttled
    );
    assert_eq!(driver.writes.len(), 1);

    // At the interval boundary the gate opens again.
    assert_eq!(
        stepper.tick(1015, &mut registry, &mut driver),
        TickOutcome::Stepped { writes: 1 }
    );
    assert_eq!(driver.writes.len(), 2);
}

#[test]
fn test_superseding_target_redirects_mid_approach() {
    let mut stepper = MotionStepper::new(10, 15);
    let mut registry = braccio_registry();
    let mut driver = RecordingDriver::default();

    registry.apply_target(0, 200);
    let _ = stepper.tick(0, &mut registry, &mut driver);
    assert_eq!(registry.channel(0).unwrap().position_deg(), 100);

    // New target below the current position reverses the approach.
    registry.apply_target(0, 80);
    let _ = stepper.tick(15, &mut registry, &mut driver);
    assert_eq!(registry.channel(0).unwrap().position_deg(), 90);
    let _ = stepper.tick(30, &mut registry, &mut driver);
    assert_eq!(registry.channel(0).unwrap().position_deg(), 80);
    let _ = stepper.tick(45, &mut registry, &mut driver);
    assert_eq!(registry.channel(0).unwrap().position_deg(), 80);
}
