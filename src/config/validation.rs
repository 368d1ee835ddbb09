//! Configuration validation.

use crate::axis::Axis;
use crate::error::ConfigError;

use super::RigConfig;

/// Check every field of a config for physical plausibility.
///
/// Returns the first problem found. A config that passes here will not
/// produce degenerate math anywhere downstream.
pub fn validate(config: &RigConfig) -> Result<(), ConfigError> {
    let d = config.planner.segment_duration_us;
    if !(1000..=10_000).contains(&d) {
        return Err(ConfigError::InvalidSegmentDuration(d));
    }

    for axis in Axis::ALL {
        let cfg = config.axis(axis);

        if cfg.max_velocity <= 0.0 {
            return Err(ConfigError::InvalidMaxVelocity {
                axis,
                value: cfg.max_velocity,
            });
        }
        if cfg.max_acceleration <= 0.0 {
            return Err(ConfigError::InvalidMaxAcceleration {
                axis,
                value: cfg.max_acceleration,
            });
        }
        if let Some(v) = cfg.move_velocity {
            if v <= 0.0 {
                return Err(ConfigError::InvalidMaxVelocity { axis, value: v });
            }
        }
        if let Some(a) = cfg.move_acceleration {
            if a <= 0.0 {
                return Err(ConfigError::InvalidMaxAcceleration { axis, value: a });
            }
        }
        if cfg.limits.min >= cfg.limits.max {
            return Err(ConfigError::InvalidSoftLimits {
                axis,
                min: cfg.limits.min,
                max: cfg.limits.max,
            });
        }

        let homing = &cfg.homing;
        if homing.fast_velocity <= 0.0
            || homing.slow_velocity <= 0.0
            || homing.slow_velocity > homing.fast_velocity
        {
            return Err(ConfigError::InvalidHomingSpeeds {
                axis,
                fast: homing.fast_velocity,
                slow: homing.slow_velocity,
            });
        }
        if homing.debounce == 0 {
            return Err(ConfigError::InvalidDebounce(homing.debounce));
        }
    }

    let joystick = &config.joystick;
    if !(0.0..1.0).contains(&joystick.deadband) {
        return Err(ConfigError::InvalidDeadband(joystick.deadband));
    }
    if joystick.expo <= 0.0 {
        return Err(ConfigError::InvalidExpo(joystick.expo));
    }

    Ok(())
}
