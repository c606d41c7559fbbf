use tracing::debug;

/// Capability the motion stepper pushes positions into. One call per joint
/// per effective tick, absolute angle in degrees. Writes are infallible and
/// idempotent from the controller's perspective; transport or hardware
/// failures are the implementation's concern.
pub trait ActuatorDriver {
    fn write(&mut self, channel: usize, angle_deg: i16);
}

/// Driver that reports every position write to the tracing subscriber.
/// Stands in for real servo hardware in the bridge binary.
#[derive(Debug, Default)]
pub struct TraceDriver;

impl TraceDriver {
    pub fn new() -> Self {
        Self
    }
}

impl ActuatorDriver for TraceDriver {
    fn write(&mut self, channel: usize, angle_deg: i16) {
        debug!(channel, angle_deg, "servo write");
    }
}
