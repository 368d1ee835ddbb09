//! Rig configuration structures.

use crate::axis::Axis;
use crate::segment::DEFAULT_SEGMENT_DURATION_US;

use super::TravelLimits;

/// Complete rig configuration.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Pan axis configuration.
    pub pan: AxisConfig,
    /// Tilt axis configuration.
    pub tilt: AxisConfig,
    /// Zoom axis configuration.
    pub zoom: AxisConfig,
    /// Planner tuning.
    pub planner: PlannerConfig,
    /// Joystick input shaping.
    pub joystick: JoystickConfig,
}

impl RigConfig {
    /// Axis configuration by axis.
    pub fn axis(&self, axis: Axis) -> &AxisConfig {
        match axis {
            Axis::Pan => &self.pan,
            Axis::Tilt => &self.tilt,
            Axis::Zoom => &self.zoom,
        }
    }

    /// Derive the planner-facing kinematic constraints for one axis.
    ///
    /// Waypoint-move velocity and acceleration default to 10% of the manual
    /// values when not configured, keeping automated moves gentle.
    pub fn constraints(&self, axis: Axis) -> AxisConstraints {
        let cfg = self.axis(axis);
        AxisConstraints {
            max_velocity: cfg.max_velocity,
            max_acceleration: cfg.max_acceleration,
            move_velocity: cfg.move_velocity.unwrap_or(cfg.max_velocity * 0.1),
            move_acceleration: cfg
                .move_acceleration
                .unwrap_or(cfg.max_acceleration * 0.1),
            limits: cfg.limits,
        }
    }
}

/// Per-axis kinematics, limits, and homing setup.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Maximum manual velocity in steps/s.
    pub max_velocity: f32,
    /// Maximum acceleration in steps/s².
    pub max_acceleration: f32,
    /// Waypoint-move velocity cap in steps/s (defaults to 10% of manual).
    pub move_velocity: Option<f32>,
    /// Waypoint-move acceleration cap in steps/s² (defaults to 10% of manual).
    pub move_acceleration: Option<f32>,
    /// Soft travel limits in steps.
    pub limits: TravelLimits,
    /// Invert the direction pin sense for this axis. Applied by the step
    /// executor; positions still count in logical coordinates.
    pub invert_direction: bool,
    /// Homing behavior.
    pub homing: HomingAxisConfig,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            max_velocity: 2000.0,
            max_acceleration: 4000.0,
            move_velocity: None,
            move_acceleration: None,
            limits: TravelLimits::default(),
            invert_direction: false,
            homing: HomingAxisConfig::default(),
        }
    }
}

/// Derived per-axis constraints handed to the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisConstraints {
    /// Maximum manual velocity in steps/s.
    pub max_velocity: f32,
    /// Maximum acceleration in steps/s².
    pub max_acceleration: f32,
    /// Waypoint-move velocity cap in steps/s.
    pub move_velocity: f32,
    /// Waypoint-move acceleration cap in steps/s².
    pub move_acceleration: f32,
    /// Soft travel limits.
    pub limits: TravelLimits,
}

impl Default for AxisConstraints {
    fn default() -> Self {
        RigConfig::default().constraints(Axis::Pan)
    }
}

/// Home reference trigger for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum TriggerConfig {
    /// Physical endstop switch.
    #[default]
    Endstop,
    /// Sensorless stall detection from the motor driver.
    Stall,
}

/// Per-axis homing parameters.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct HomingAxisConfig {
    /// Trigger source for the home reference.
    pub trigger: TriggerConfig,
    /// Stall metric threshold; readings below it count as a stall.
    pub stall_threshold: u8,
    /// Fast approach speed in steps/s.
    pub fast_velocity: f32,
    /// Slow re-approach speed in steps/s.
    pub slow_velocity: f32,
    /// Backoff distance after the fast trigger, in steps.
    pub backoff_steps: i32,
    /// Consecutive triggered samples required before a trigger is accepted.
    pub debounce: u8,
    /// Time budget for homing the axis, in seconds.
    pub timeout_s: f32,
}

impl Default for HomingAxisConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerConfig::Endstop,
            stall_threshold: 150,
            fast_velocity: 500.0,
            slow_velocity: 50.0,
            backoff_steps: 200,
            debounce: 3,
            timeout_s: 30.0,
        }
    }
}

/// Planner tuning shared across axes.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Segment duration in microseconds.
    pub segment_duration_us: u32,
    /// Soft-limit approach zone as a fraction of travel span.
    pub soft_limit_zone: f32,
    /// Velocity multiplier applied in precision mode.
    pub precision_multiplier: f32,
    /// Seconds of inactivity before motor drivers are disabled.
    pub idle_timeout_s: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            segment_duration_us: DEFAULT_SEGMENT_DURATION_US,
            soft_limit_zone: 0.05,
            precision_multiplier: 0.25,
            idle_timeout_s: 300.0,
        }
    }
}

/// Joystick input shaping.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct JoystickConfig {
    /// Deflections below this magnitude read as zero.
    pub deadband: f32,
    /// Exponential response exponent; 1.0 is linear.
    pub expo: f32,
    /// Rate-limit commanded velocity changes to the acceleration cap.
    pub slew_limited: bool,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            deadband: 0.1,
            expo: 2.0,
            slew_limited: false,
        }
    }
}
