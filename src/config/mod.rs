//! Rig configuration: axis kinematics, planner tuning, joystick shaping.
//!
//! Configuration deserializes from TOML with `serde`, and every loaded
//! config passes through [`validate`] before it reaches the controller.
//! All fields carry defaults, so an empty config is a valid (if
//! conservative) rig.

mod limits;
mod rig;
mod validation;

#[cfg(feature = "std")]
mod loader;

pub use limits::TravelLimits;
pub use rig::{
    AxisConfig, AxisConstraints, HomingAxisConfig, JoystickConfig, PlannerConfig, RigConfig,
    TriggerConfig,
};
pub use validation::validate;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
