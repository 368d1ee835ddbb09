//! # ptz-motion
//!
//! Motion-control core for a multi-axis pan/tilt/zoom camera rig driven by
//! stepper motors.
//!
//! The crate turns high-level intent (joystick deflections, preset recalls,
//! homing requests) into precisely timed step pulses:
//!
//! - [`MotionController`] owns the whole pipeline and exposes the command
//!   surface. Call [`update`](MotionController::update) at control rate and
//!   [`tick`](MotionController::tick) from the step timer.
//! - [`MotionPlanner`] integrates velocity commands and eased quintic
//!   trajectories into fixed-duration [`Segment`]s.
//! - [`SegmentQueue`] is the lock-free ring buffer between the two rates.
//! - [`StepExecutor`] spreads each segment's steps evenly across timer
//!   ticks and drives the pins through the [`RigHardware`] seam.
//! - [`HomingSequence`] establishes absolute zero per axis, by endstop or
//!   sensorless stall detection.
//!
//! ## Example
//!
//! ```
//! use ptz_motion::{
//!     Axis, Easing, MemoryPresetStore, MotionController, RigConfig, RigHardware,
//!     STALL_READ_INVALID,
//! };
//!
//! struct NullRig;
//!
//! impl RigHardware for NullRig {
//!     fn set_step(&mut self, _axis: Axis, _high: bool) {}
//!     fn set_direction(&mut self, _axis: Axis, _forward: bool) {}
//!     fn endstop_triggered(&mut self, _axis: Axis) -> bool { false }
//!     fn stall_metric(&mut self, _axis: Axis) -> u8 { STALL_READ_INVALID }
//!     fn set_driver_enable(&mut self, _enabled: bool) {}
//! }
//!
//! let config = RigConfig::default();
//! let mut controller = MotionController::new(&config, NullRig, MemoryPresetStore::new());
//!
//! controller.move_to([1000.0, 500.0, 0.0], None, Easing::Smootherstep)?;
//! loop {
//!     controller.update(0.02); // control rate
//!     for _ in 0..800 {
//!         controller.tick(); // step timer, 40 kHz
//!     }
//!     if !controller.is_busy() {
//!         break;
//!     }
//! }
//! assert_eq!(controller.step_positions(), [1000, 500, 0]);
//! # Ok::<(), ptz_motion::Error>(())
//! ```
//!
//! ## `no_std`
//!
//! The crate is `no_std` by default for use on embedded targets. The `std`
//! feature (enabled by default for host builds) adds TOML config loading
//! and `std::error::Error` impls. No allocation is required either way.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod axis;
pub mod config;
pub mod controller;
pub mod error;
pub mod hal;
pub mod homing;
pub mod motion;
pub mod preset;
pub mod segment;
pub mod trajectory;

pub use axis::{Axis, AXIS_COUNT};
pub use config::{
    AxisConfig, AxisConstraints, HomingAxisConfig, JoystickConfig, PlannerConfig, RigConfig,
    TravelLimits, TriggerConfig,
};
pub use controller::MotionController;
pub use error::{ConfigError, Error, HomingError, MotionError, PresetError, Result};
pub use hal::{GpioRig, RigHardware, STALL_READ_INVALID};
pub use homing::{HomingEvent, HomingSequence, HomingState, TriggerKind, TriggerSample};
pub use motion::{MotionPlanner, StepExecutor, DEFAULT_TICK_PERIOD_US};
pub use preset::{ApproachMode, MemoryPresetStore, Preset, PresetStore, MAX_PRESETS};
pub use segment::{
    Segment, SegmentQueue, SegmentSink, SegmentSource, DEFAULT_SEGMENT_DURATION_US,
    SEGMENT_QUEUE_DEPTH,
};
pub use trajectory::{Easing, Quintic};

#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
