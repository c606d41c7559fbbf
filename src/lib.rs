//! # Servo Bus Controller
//!
//! An embedded-style motion controller for a six-joint articulated servo arm,
//! driven by a textual command stream over a serial-like byte link.
//!
//! ## Features
//!
//! - **Line-oriented command protocol**: `m1:90;m2:45` style target updates,
//!   best-effort parsing that tolerates garbled fragments
//! - **Bounds safety**: every target is clamped into the joint's mechanically
//!   safe range at write time
//! - **Rate-limited motion**: a time-gated stepper walks each joint toward its
//!   target by a bounded step, so the hardware never sees a position jump
//! - **Injectable configuration**: channel table and stepper tuning passed in
//!   at construction, so independent instances are cheap to build
//! - **Embedded-friendly**: bounded buffers, no heap in the hot path
//!
//! ## Quick Start
//!
//! ```rust
//! use servobus::config::ArmConfig;
//! use servobus::controller::ArmController;
//! use servobus::driver::TraceDriver;
//!
//! let mut controller = ArmController::new(&ArmConfig::braccio(), TraceDriver::new())
//!     .expect("stock config is valid");
//!
//! // Feed command bytes as they arrive, tick on the polling cadence.
//! controller.push_bytes(b"m1:135;m2:60\n");
//! controller.tick(0);
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Injectable channel table and stepper tuning
//! - [`registry`] - Fixed ordered channel table owning all joint state
//! - [`protocol`] - Line assembly and best-effort command parsing
//! - [`stepper`] - Rate-gated position stepper
//! - [`driver`] - Actuator driver capability
//! - [`controller`] - Orchestrator tying intake and motion together

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

extern crate alloc;

pub mod config;
pub mod controller;
pub mod driver;
pub mod protocol;
pub mod registry;
pub mod stepper;

// Re-export main public types for convenience
pub use config::{ArmConfig, ChannelConfig, ConfigError};
pub use controller::ArmController;
pub use driver::{ActuatorDriver, TraceDriver};
pub use protocol::{LineAssembler, SegmentOutcome};
pub use registry::{Channel, ChannelRegistry};
pub use stepper::{MotionStepper, TickOutcome};
