//! Error types for ptz-motion.
//!
//! Provides unified error handling across configuration, motion planning,
//! homing, and preset storage. Every rejected request is reported
//! synchronously through these types; nothing in the core panics.

use core::fmt;

use crate::axis::Axis;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all ptz-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motion planning error
    Motion(MotionError),
    /// Homing sequence error
    Homing(HomingError),
    /// Preset lookup or storage error
    Preset(PresetError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid segment duration (must be 1000-10000 microseconds)
    InvalidSegmentDuration(u32),
    /// Invalid max velocity (must be > 0)
    InvalidMaxVelocity {
        /// Axis with the invalid value
        axis: Axis,
        /// Configured value
        value: f32,
    },
    /// Invalid max acceleration (must be > 0)
    InvalidMaxAcceleration {
        /// Axis with the invalid value
        axis: Axis,
        /// Configured value
        value: f32,
    },
    /// Invalid soft limits (min must be < max)
    InvalidSoftLimits {
        /// Axis with the invalid limits
        axis: Axis,
        /// Minimum limit value
        min: f32,
        /// Maximum limit value
        max: f32,
    },
    /// Invalid joystick deadband (must be in [0, 1))
    InvalidDeadband(f32),
    /// Invalid joystick expo exponent (must be > 0)
    InvalidExpo(f32),
    /// Invalid homing speeds (must be > 0, slow <= fast)
    InvalidHomingSpeeds {
        /// Axis with the invalid speeds
        axis: Axis,
        /// Fast approach speed
        fast: f32,
        /// Slow approach speed
        slow: f32,
    },
    /// Invalid stall debounce count (must be >= 1)
    InvalidDebounce(u8),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motion planning errors (rejected requests, no state change).
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A waypoint move is already in progress
    MoveInProgress,
    /// Requested target lies outside the soft limits
    TargetOutOfLimits {
        /// Offending axis
        axis: Axis,
        /// Requested target position in steps
        target: f32,
        /// Minimum allowed position
        min: f32,
        /// Maximum allowed position
        max: f32,
    },
}

/// Homing sequence errors.
///
/// These cover rejected requests only; a homing timeout is reported through
/// [`HomingState::Error`](crate::homing::HomingState), not through this type.
#[derive(Debug, Clone, PartialEq)]
pub enum HomingError {
    /// A homing sequence is already in progress
    AlreadyActive,
    /// No axes were given to home
    NoAxes,
}

/// Preset lookup and storage errors.
#[derive(Debug, Clone, PartialEq)]
pub enum PresetError {
    /// No valid preset stored at this index
    NotFound(u8),
    /// Index is beyond the store's capacity
    IndexOutOfRange(u8),
    /// The store rejected the write
    SaveFailed(u8),
    /// The preset's approach mode is not supported by this controller
    UnsupportedApproach,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Homing(e) => write!(f, "Homing error: {}", e),
            Error::Preset(e) => write!(f, "Preset error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidSegmentDuration(v) => {
                write!(f, "Invalid segment duration: {} us. Must be 1000-10000", v)
            }
            ConfigError::InvalidMaxVelocity { axis, value } => {
                write!(f, "Invalid max velocity for {}: {}. Must be > 0", axis, value)
            }
            ConfigError::InvalidMaxAcceleration { axis, value } => {
                write!(f, "Invalid max acceleration for {}: {}. Must be > 0", axis, value)
            }
            ConfigError::InvalidSoftLimits { axis, min, max } => {
                write!(f, "Invalid soft limits for {}: min ({}) must be < max ({})", axis, min, max)
            }
            ConfigError::InvalidDeadband(v) => {
                write!(f, "Invalid joystick deadband: {}. Must be in [0, 1)", v)
            }
            ConfigError::InvalidExpo(v) => {
                write!(f, "Invalid joystick expo: {}. Must be > 0", v)
            }
            ConfigError::InvalidHomingSpeeds { axis, fast, slow } => {
                write!(
                    f,
                    "Invalid homing speeds for {}: fast={} slow={}. Must be > 0 with slow <= fast",
                    axis, fast, slow
                )
            }
            ConfigError::InvalidDebounce(v) => {
                write!(f, "Invalid stall debounce count: {}. Must be >= 1", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::MoveInProgress => write!(f, "A move is already in progress"),
            MotionError::TargetOutOfLimits { axis, target, min, max } => {
                write!(f, "Target {} for {} exceeds limits [{}, {}]", target, axis, min, max)
            }
        }
    }
}

impl fmt::Display for HomingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomingError::AlreadyActive => write!(f, "Homing already in progress"),
            HomingError::NoAxes => write!(f, "No axes to home"),
        }
    }
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::NotFound(i) => write!(f, "Preset {} not found", i),
            PresetError::IndexOutOfRange(i) => write!(f, "Preset index {} out of range", i),
            PresetError::SaveFailed(i) => write!(f, "Failed to save preset {}", i),
            PresetError::UnsupportedApproach => write!(f, "Preset approach mode not supported"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<HomingError> for Error {
    fn from(e: HomingError) -> Self {
        Error::Homing(e)
    }
}

impl From<PresetError> for Error {
    fn from(e: PresetError) -> Self {
        Error::Preset(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for HomingError {}

#[cfg(feature = "std")]
impl std::error::Error for PresetError {}
