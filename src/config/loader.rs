//! TOML configuration loading (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::{validate, RigConfig};

/// Load and validate a rig configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RigConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::Config(ConfigError::IoError(truncated(&e.to_string()))))?;
    parse_config(&contents)
}

/// Parse and validate a rig configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<RigConfig> {
    let config: RigConfig = toml::from_str(contents)
        .map_err(|e| Error::Config(ConfigError::ParseError(truncated(&e.to_string()))))?;
    validate(&config)?;
    Ok(config)
}

fn truncated(msg: &str) -> heapless::String<128> {
    let mut s = heapless::String::new();
    for c in msg.chars() {
        if s.push(c).is_err() {
            break;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;
    use crate::config::TriggerConfig;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [pan]
            max_velocity = 3000.0
            max_acceleration = 6000.0
            move_velocity = 400.0
            limits = { min = -50000.0, max = 50000.0 }

            [pan.homing]
            trigger = "stall"
            stall_threshold = 180
            fast_velocity = 600.0
            slow_velocity = 60.0

            [tilt]
            max_velocity = 1500.0
            invert_direction = true

            [planner]
            segment_duration_us = 5000

            [joystick]
            deadband = 0.15
            expo = 2.5
            slew_limited = true
        "#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.pan.max_velocity, 3000.0);
        assert_eq!(config.pan.homing.trigger, TriggerConfig::Stall);
        assert_eq!(config.pan.homing.stall_threshold, 180);
        assert_eq!(config.pan.limits.min, -50000.0);
        assert!(config.tilt.invert_direction);
        assert_eq!(config.planner.segment_duration_us, 5000);
        assert!(config.joystick.slew_limited);

        // Unset sections fall back to defaults.
        assert_eq!(config.zoom.homing.trigger, TriggerConfig::Endstop);
        let c = config.constraints(Axis::Pan);
        assert_eq!(c.move_velocity, 400.0);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.planner.segment_duration_us, 4000);
        assert_eq!(config.joystick.deadband, 0.1);
    }

    #[test]
    fn test_parse_error_reported() {
        let result = parse_config("pan = \"not a table\"");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let toml = "[pan]\nmax_velocity = -1.0\n";
        let result = parse_config(toml);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidMaxVelocity { .. }))
        ));
    }
}
