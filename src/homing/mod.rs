//! Homing: establishing the absolute zero reference for each axis.
//!
//! Axes home sequentially through a fast approach, a backoff, and a slow
//! re-approach for repeatability. The home trigger is either a physical
//! endstop or sensorless stall detection, chosen per axis in the config.
//! The sequence itself only decides velocities and phase transitions; the
//! caller drives the planner with [`target_velocity`](HomingSequence::target_velocity)
//! and samples the trigger hardware each control tick.

use heapless::Vec;

use crate::axis::{Axis, AXIS_COUNT};
use crate::config::{RigConfig, TriggerConfig};
use crate::error::HomingError;
use crate::hal::STALL_READ_INVALID;

/// Steps the slow re-approach may stop short of the backoff target.
const BACKOFF_TOLERANCE: i32 = 10;

/// Steps an axis must travel in an approach phase before a stall reading
/// is believed. Drivers report garbage while the motor is still spinning
/// up.
const MIN_STALL_TRAVEL: i32 = 50;

/// Home trigger source for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerKind {
    /// Physical endstop switch.
    Endstop,
    /// Sensorless stall detection; readings below `threshold` count as a
    /// stall (0 is a full stall, higher readings mean a freer motor).
    Stall {
        /// Stall metric threshold.
        threshold: u8,
    },
}

/// One trigger reading, matching the axis's [`TriggerKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerSample {
    /// Endstop switch state.
    Endstop(bool),
    /// Raw stall metric.
    Stall(u8),
}

/// Homing sequence phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingState {
    /// No sequence running.
    Idle,
    /// Driving toward the home trigger at fast speed.
    FastApproach,
    /// Backing away from the trigger.
    Backoff,
    /// Re-approaching slowly for a repeatable reference.
    SlowApproach,
    /// Every requested axis homed.
    Complete,
    /// An axis timed out; motion stopped, positions untrusted.
    Error,
}

/// Notification emitted by [`HomingSequence::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingEvent {
    /// Nothing of note this tick.
    None,
    /// An axis just found its home reference; its position should be
    /// zeroed now, at the trigger point.
    AxisHomed(Axis),
    /// The sequence aborted because this axis failed to home in time.
    TimedOut(Axis),
}

/// Per-axis homing parameters.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HomingParams {
    /// Trigger source.
    pub trigger: TriggerKind,
    /// Fast approach speed, steps/s.
    pub fast_velocity: f32,
    /// Slow re-approach speed, steps/s.
    pub slow_velocity: f32,
    /// Backoff distance, steps.
    pub backoff_steps: i32,
    /// Consecutive triggered samples required.
    pub debounce: u8,
    /// Time budget for the whole axis, seconds.
    pub timeout_s: f32,
}

impl HomingParams {
    fn from_config(config: &RigConfig, axis: Axis) -> Self {
        let homing = &config.axis(axis).homing;
        let trigger = match homing.trigger {
            TriggerConfig::Endstop => TriggerKind::Endstop,
            TriggerConfig::Stall => TriggerKind::Stall {
                threshold: homing.stall_threshold,
            },
        };
        Self {
            trigger,
            fast_velocity: homing.fast_velocity,
            slow_velocity: homing.slow_velocity,
            backoff_steps: homing.backoff_steps,
            debounce: homing.debounce,
            timeout_s: homing.timeout_s,
        }
    }
}

/// Sequential homing state machine.
///
/// Axes home one at a time in the order given to [`start`](Self::start).
/// Between [`update`](Self::update) calls the caller commands the current
/// axis at [`target_velocity`](Self::target_velocity) and holds the others
/// still.
#[derive(Debug)]
pub struct HomingSequence {
    params: [HomingParams; AXIS_COUNT],
    queue: Vec<Axis, AXIS_COUNT>,
    current: usize,
    state: HomingState,
    /// Time since the current axis started homing; spans all its phases.
    axis_elapsed: f32,
    phase_start_position: i32,
    /// Set by `start`; the first update latches the real start position.
    needs_phase_start: bool,
    backoff_target: i32,
    debounce_count: u8,
}

impl HomingSequence {
    /// Build a sequence from a validated config.
    pub fn new(config: &RigConfig) -> Self {
        let mut params = [HomingParams::from_config(config, Axis::Pan); AXIS_COUNT];
        for axis in Axis::ALL {
            params[axis.index()] = HomingParams::from_config(config, axis);
        }
        Self {
            params,
            queue: Vec::new(),
            current: 0,
            state: HomingState::Idle,
            axis_elapsed: 0.0,
            phase_start_position: 0,
            needs_phase_start: false,
            backoff_target: 0,
            debounce_count: 0,
        }
    }

    /// Start homing the given axes, in order.
    pub fn start(&mut self, axes: &[Axis]) -> Result<(), HomingError> {
        if self.is_active() {
            return Err(HomingError::AlreadyActive);
        }
        if axes.is_empty() {
            return Err(HomingError::NoAxes);
        }

        self.queue.clear();
        for &axis in axes {
            // Capacity is AXIS_COUNT; duplicates beyond that are dropped.
            let _ = self.queue.push(axis);
        }
        self.current = 0;
        self.state = HomingState::FastApproach;
        self.axis_elapsed = 0.0;
        self.debounce_count = 0;
        self.needs_phase_start = true;
        Ok(())
    }

    /// Abort the sequence. Positions keep whatever reference they had.
    pub fn abort(&mut self) {
        self.state = HomingState::Idle;
        self.queue.clear();
        self.current = 0;
    }

    /// Advance the state machine by `dt` seconds.
    ///
    /// `position` is the current axis's live step count and `sample` its
    /// trigger reading for this tick.
    pub fn update(&mut self, dt: f32, position: i32, sample: TriggerSample) -> HomingEvent {
        let Some(axis) = self.current_axis() else {
            return HomingEvent::None;
        };
        let params = self.params[axis.index()];

        if self.needs_phase_start {
            self.phase_start_position = position;
            self.needs_phase_start = false;
        }

        self.axis_elapsed += dt;
        if self.axis_elapsed > params.timeout_s {
            self.state = HomingState::Error;
            self.queue.clear();
            return HomingEvent::TimedOut(axis);
        }

        match self.state {
            HomingState::FastApproach => {
                if self.triggered(&params, position, sample) {
                    self.backoff_target = position + params.backoff_steps;
                    self.enter_phase(HomingState::Backoff, position);
                }
                HomingEvent::None
            }
            HomingState::Backoff => {
                if position >= self.backoff_target - BACKOFF_TOLERANCE {
                    self.enter_phase(HomingState::SlowApproach, position);
                }
                HomingEvent::None
            }
            HomingState::SlowApproach => {
                if self.triggered(&params, position, sample) {
                    self.current += 1;
                    if self.current >= self.queue.len() {
                        self.state = HomingState::Complete;
                        self.queue.clear();
                        self.current = 0;
                    } else {
                        self.enter_phase(HomingState::FastApproach, position);
                        // The timeout budget is per axis, and the travel
                        // guard must restart from the next axis's own
                        // position, not the trigger point just left behind.
                        self.axis_elapsed = 0.0;
                        self.needs_phase_start = true;
                    }
                    return HomingEvent::AxisHomed(axis);
                }
                HomingEvent::None
            }
            _ => HomingEvent::None,
        }
    }

    fn enter_phase(&mut self, state: HomingState, position: i32) {
        self.state = state;
        self.phase_start_position = position;
        self.needs_phase_start = false;
        self.debounce_count = 0;
    }

    /// Debounced trigger check for the current approach phase.
    fn triggered(&mut self, params: &HomingParams, position: i32, sample: TriggerSample) -> bool {
        let raw = match (params.trigger, sample) {
            (TriggerKind::Endstop, TriggerSample::Endstop(hit)) => hit,
            (TriggerKind::Stall { threshold }, TriggerSample::Stall(metric)) => {
                if metric == STALL_READ_INVALID {
                    false
                } else if (position - self.phase_start_position).abs() < MIN_STALL_TRAVEL {
                    // Too early in the phase for stall readings to mean
                    // anything.
                    false
                } else {
                    metric < threshold
                }
            }
            // Mismatched sample kind; treat as not triggered.
            _ => false,
        };

        if raw {
            self.debounce_count = self.debounce_count.saturating_add(1);
        } else {
            self.debounce_count = 0;
        }
        self.debounce_count >= params.debounce
    }

    /// Velocity the caller should command on the current axis, steps/s.
    /// Approaches run toward negative positions; backoff runs positive.
    pub fn target_velocity(&self) -> f32 {
        let Some(axis) = self.current_axis() else {
            return 0.0;
        };
        let params = &self.params[axis.index()];
        match self.state {
            HomingState::FastApproach => -params.fast_velocity,
            HomingState::Backoff => params.fast_velocity,
            HomingState::SlowApproach => -params.slow_velocity,
            _ => 0.0,
        }
    }

    /// Axis currently homing, if the sequence is active.
    pub fn current_axis(&self) -> Option<Axis> {
        if self.is_active() {
            self.queue.get(self.current).copied()
        } else {
            None
        }
    }

    /// Trigger kind configured for an axis.
    pub fn trigger_kind(&self, axis: Axis) -> TriggerKind {
        self.params[axis.index()].trigger
    }

    /// True while axes remain to home.
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            HomingState::FastApproach | HomingState::Backoff | HomingState::SlowApproach
        )
    }

    /// Current phase.
    pub fn state(&self) -> HomingState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence() -> HomingSequence {
        HomingSequence::new(&RigConfig::default())
    }

    fn stall_config() -> RigConfig {
        let mut config = RigConfig::default();
        config.pan.homing.trigger = TriggerConfig::Stall;
        config.pan.homing.stall_threshold = 150;
        config
    }

    /// Feed triggered endstop samples until the debounce accepts them.
    fn trigger_endstop(seq: &mut HomingSequence, position: i32) -> HomingEvent {
        let mut event = HomingEvent::None;
        for _ in 0..3 {
            event = seq.update(0.004, position, TriggerSample::Endstop(true));
        }
        event
    }

    #[test]
    fn test_full_phase_sequence_single_axis() {
        let mut seq = sequence();
        seq.start(&[Axis::Pan]).unwrap();
        assert_eq!(seq.state(), HomingState::FastApproach);
        assert_eq!(seq.current_axis(), Some(Axis::Pan));
        assert_eq!(seq.target_velocity(), -500.0);

        // No trigger yet: keep approaching.
        let e = seq.update(0.004, -100, TriggerSample::Endstop(false));
        assert_eq!(e, HomingEvent::None);
        assert_eq!(seq.state(), HomingState::FastApproach);

        // Debounced trigger at -400 enters backoff.
        trigger_endstop(&mut seq, -400);
        assert_eq!(seq.state(), HomingState::Backoff);
        assert_eq!(seq.target_velocity(), 500.0);

        // Backoff completes 200 steps away (within tolerance).
        seq.update(0.004, -300, TriggerSample::Endstop(false));
        assert_eq!(seq.state(), HomingState::Backoff);
        seq.update(0.004, -205, TriggerSample::Endstop(false));
        assert_eq!(seq.state(), HomingState::SlowApproach);
        assert_eq!(seq.target_velocity(), -50.0);

        // Slow trigger completes the axis and the sequence.
        let e = trigger_endstop(&mut seq, -398);
        assert_eq!(e, HomingEvent::AxisHomed(Axis::Pan));
        assert_eq!(seq.state(), HomingState::Complete);
        assert!(!seq.is_active());
        assert_eq!(seq.target_velocity(), 0.0);
    }

    #[test]
    fn test_axes_home_sequentially() {
        let mut seq = sequence();
        seq.start(&[Axis::Pan, Axis::Tilt]).unwrap();

        // Home pan.
        trigger_endstop(&mut seq, -400);
        seq.update(0.004, -200, TriggerSample::Endstop(false));
        let e = trigger_endstop(&mut seq, -400);
        assert_eq!(e, HomingEvent::AxisHomed(Axis::Pan));

        // Sequence continues on tilt from fast approach.
        assert!(seq.is_active());
        assert_eq!(seq.current_axis(), Some(Axis::Tilt));
        assert_eq!(seq.state(), HomingState::FastApproach);

        trigger_endstop(&mut seq, -600);
        seq.update(0.004, -400, TriggerSample::Endstop(false));
        let e = trigger_endstop(&mut seq, -600);
        assert_eq!(e, HomingEvent::AxisHomed(Axis::Tilt));
        assert_eq!(seq.state(), HomingState::Complete);
    }

    #[test]
    fn test_debounce_rejects_glitches() {
        let mut seq = sequence();
        seq.start(&[Axis::Pan]).unwrap();

        // Two triggered samples, then a gap: debounce (3) resets.
        seq.update(0.004, -100, TriggerSample::Endstop(true));
        seq.update(0.004, -101, TriggerSample::Endstop(true));
        seq.update(0.004, -102, TriggerSample::Endstop(false));
        seq.update(0.004, -103, TriggerSample::Endstop(true));
        seq.update(0.004, -104, TriggerSample::Endstop(true));
        assert_eq!(seq.state(), HomingState::FastApproach);

        seq.update(0.004, -105, TriggerSample::Endstop(true));
        assert_eq!(seq.state(), HomingState::Backoff);
    }

    #[test]
    fn test_timeout_aborts_sequence() {
        let mut seq = sequence();
        seq.start(&[Axis::Pan, Axis::Tilt]).unwrap();

        // Default timeout is 30 s per phase.
        let mut event = HomingEvent::None;
        for _ in 0..7501 {
            event = seq.update(0.004, -100, TriggerSample::Endstop(false));
            if event != HomingEvent::None {
                break;
            }
        }
        assert_eq!(event, HomingEvent::TimedOut(Axis::Pan));
        assert_eq!(seq.state(), HomingState::Error);
        assert!(!seq.is_active());
        assert_eq!(seq.target_velocity(), 0.0);
    }

    #[test]
    fn test_stall_trigger_with_threshold() {
        let mut seq = HomingSequence::new(&stall_config());
        seq.start(&[Axis::Pan]).unwrap();
        assert_eq!(
            seq.trigger_kind(Axis::Pan),
            TriggerKind::Stall { threshold: 150 }
        );

        // Free running reads above threshold: no trigger, even far past
        // the travel guard.
        for p in 0..100 {
            seq.update(0.004, -p, TriggerSample::Stall(200));
        }
        assert_eq!(seq.state(), HomingState::FastApproach);

        // A reading equal to the threshold is still a free motor.
        for _ in 0..5 {
            seq.update(0.004, -100, TriggerSample::Stall(150));
        }
        assert_eq!(seq.state(), HomingState::FastApproach);

        // The metric collapses below threshold with debounce satisfied.
        for _ in 0..3 {
            seq.update(0.004, -200, TriggerSample::Stall(100));
        }
        assert_eq!(seq.state(), HomingState::Backoff);
    }

    #[test]
    fn test_stall_invalid_reading_ignored() {
        let mut seq = HomingSequence::new(&stall_config());
        seq.start(&[Axis::Pan]).unwrap();

        for _ in 0..10 {
            seq.update(0.004, -200, TriggerSample::Stall(STALL_READ_INVALID));
        }
        assert_eq!(seq.state(), HomingState::FastApproach);
    }

    #[test]
    fn test_stall_ignored_before_min_travel() {
        let mut seq = HomingSequence::new(&stall_config());
        seq.start(&[Axis::Pan]).unwrap();

        // Hard-stall readings right at the start of the phase: the motor
        // has not traveled far enough for them to be trusted.
        for p in 0..10 {
            seq.update(0.004, -p, TriggerSample::Stall(0));
        }
        assert_eq!(seq.state(), HomingState::FastApproach);

        // Past the guard they count.
        for _ in 0..3 {
            seq.update(0.004, -80, TriggerSample::Stall(0));
        }
        assert_eq!(seq.state(), HomingState::Backoff);
    }

    #[test]
    fn test_stall_travel_guard_resets_between_axes() {
        let mut config = stall_config();
        config.tilt.homing.trigger = TriggerConfig::Stall;
        config.tilt.homing.stall_threshold = 150;
        let mut seq = HomingSequence::new(&config);
        seq.start(&[Axis::Pan, Axis::Tilt]).unwrap();

        // Home pan: fast approach, backoff, slow approach.
        for p in 0..60 {
            seq.update(0.004, -p, TriggerSample::Stall(200));
        }
        for _ in 0..3 {
            seq.update(0.004, -200, TriggerSample::Stall(10));
        }
        assert_eq!(seq.state(), HomingState::Backoff);
        seq.update(0.004, -5, TriggerSample::Stall(200));
        assert_eq!(seq.state(), HomingState::SlowApproach);
        for p in 5..80 {
            seq.update(0.004, -p, TriggerSample::Stall(200));
        }
        let mut event = HomingEvent::None;
        for _ in 0..3 {
            event = seq.update(0.004, -100, TriggerSample::Stall(10));
        }
        assert_eq!(event, HomingEvent::AxisHomed(Axis::Pan));
        assert_eq!(seq.current_axis(), Some(Axis::Tilt));
        assert_eq!(seq.state(), HomingState::FastApproach);

        // Stalled readings before tilt has moved at all: the travel guard
        // must measure from tilt's own start position, not pan's trigger
        // point, so these are ignored.
        for _ in 0..3 {
            seq.update(0.004, 0, TriggerSample::Stall(10));
        }
        assert_eq!(seq.state(), HomingState::FastApproach);

        // After tilt genuinely travels, a stall triggers as usual.
        for p in 0..60 {
            seq.update(0.004, -p, TriggerSample::Stall(200));
        }
        for _ in 0..3 {
            seq.update(0.004, -120, TriggerSample::Stall(10));
        }
        assert_eq!(seq.state(), HomingState::Backoff);
    }

    #[test]
    fn test_start_rejections() {
        let mut seq = sequence();
        assert_eq!(seq.start(&[]), Err(HomingError::NoAxes));

        seq.start(&[Axis::Pan]).unwrap();
        assert_eq!(seq.start(&[Axis::Tilt]), Err(HomingError::AlreadyActive));
    }

    #[test]
    fn test_abort_stops_sequence() {
        let mut seq = sequence();
        seq.start(&[Axis::Pan]).unwrap();
        seq.abort();
        assert!(!seq.is_active());
        assert_eq!(seq.state(), HomingState::Idle);
        assert_eq!(seq.current_axis(), None);

        // A new sequence can start after an abort.
        assert!(seq.start(&[Axis::Zoom]).is_ok());
    }
}
