//! Top-level motion controller.
//!
//! [`MotionController`] owns the planner, executor, segment queue, homing
//! sequence, hardware, and preset store, and sequences them per control
//! tick: homing drives the planner when active, driver enable is asserted
//! before new motion is generated, and completed waypoint moves re-baseline
//! the executor onto their exact targets.

use crate::axis::{Axis, AXIS_COUNT};
use crate::config::{RigConfig, TravelLimits};
use crate::error::{Error, HomingError, PresetError, Result};
use crate::hal::RigHardware;
use crate::homing::{HomingEvent, HomingSequence, HomingState, TriggerKind, TriggerSample};
use crate::motion::{MotionPlanner, StepExecutor, DEFAULT_TICK_PERIOD_US};
use crate::preset::{ApproachMode, Preset, PresetStore, MAX_PRESETS};
use crate::segment::SegmentQueue;
use crate::trajectory::Easing;

/// The complete motion core for one rig.
///
/// Call [`update`](Self::update) at control rate (50-250 Hz) and
/// [`tick`](Self::tick) from the step timer. Everything else is commands.
pub struct MotionController<H: RigHardware, P: PresetStore> {
    hw: H,
    presets: P,
    queue: SegmentQueue,
    planner: MotionPlanner,
    executor: StepExecutor,
    homing: HomingSequence,
    idle_timeout_s: f32,
    idle_elapsed: f32,
    drivers_enabled: bool,
    /// A completed move is waiting for the queue to drain before the
    /// executor is re-baselined onto the exact targets.
    pending_sync: bool,
    /// Precision mode to apply once the pending move lands.
    pending_precision: Option<bool>,
}

impl<H: RigHardware, P: PresetStore> MotionController<H, P> {
    /// Build a controller from a validated config.
    pub fn new(config: &RigConfig, mut hw: H, presets: P) -> Self {
        hw.set_driver_enable(false);
        let mut invert = [false; AXIS_COUNT];
        for axis in Axis::ALL {
            invert[axis.index()] = config.axis(axis).invert_direction;
        }
        Self {
            hw,
            presets,
            queue: SegmentQueue::new(),
            planner: MotionPlanner::new(config),
            executor: StepExecutor::new(DEFAULT_TICK_PERIOD_US, invert),
            homing: HomingSequence::new(config),
            idle_timeout_s: config.planner.idle_timeout_s,
            idle_elapsed: 0.0,
            drivers_enabled: false,
            pending_sync: false,
            pending_precision: None,
        }
    }

    /// Control tick: advance homing, manage driver enable, and generate
    /// segments for the elapsed interval `dt` (seconds).
    pub fn update(&mut self, dt: f32) {
        if self.homing.is_active() {
            self.update_homing(dt);
        }

        // Drivers come up before any new segment can reach the executor,
        // and drop only after a full idle timeout.
        let busy = self.homing.is_active()
            || self.planner.is_busy()
            || self.executor.is_busy(&self.queue);
        if busy {
            self.idle_elapsed = 0.0;
            if !self.drivers_enabled {
                self.hw.set_driver_enable(true);
                self.drivers_enabled = true;
            }
        } else {
            self.idle_elapsed += dt;
            if self.drivers_enabled && self.idle_elapsed >= self.idle_timeout_s {
                self.hw.set_driver_enable(false);
                self.drivers_enabled = false;
            }
        }

        if self.planner.update(&mut self.queue, dt) {
            self.pending_sync = true;
        }

        // Once the last segment of a completed move has executed, pin the
        // executor's integer positions to the move targets so sub-step
        // rounding residue cannot accumulate across moves.
        if self.pending_sync && !self.executor.is_busy(&self.queue) {
            let emitted = self.planner.emitted_steps();
            for axis in Axis::ALL {
                self.executor.set_position(axis, emitted[axis.index()]);
            }
            self.pending_sync = false;
            if let Some(precision) = self.pending_precision.take() {
                self.planner.set_precision_mode(precision);
            }
        }
    }

    fn update_homing(&mut self, dt: f32) {
        let Some(axis) = self.homing.current_axis() else {
            return;
        };

        let sample = match self.homing.trigger_kind(axis) {
            TriggerKind::Endstop => TriggerSample::Endstop(self.hw.endstop_triggered(axis)),
            TriggerKind::Stall { .. } => TriggerSample::Stall(self.hw.stall_metric(axis)),
        };

        let event = self.homing.update(dt, self.executor.position(axis), sample);
        match event {
            HomingEvent::AxisHomed(homed) => {
                // The trigger point is the new zero.
                self.queue.clear();
                self.executor.set_position(homed, 0);
                self.planner.stop();
                self.planner.sync_positions(self.executor.positions());
            }
            HomingEvent::TimedOut(_) => {
                self.queue.clear();
                self.planner.stop();
                self.planner.sync_positions(self.executor.positions());
            }
            HomingEvent::None => {}
        }

        if self.homing.is_active() {
            if let Some(axis) = self.homing.current_axis() {
                let mut velocities = [0.0; AXIS_COUNT];
                velocities[axis.index()] = self.homing.target_velocity();
                self.planner.set_velocities(velocities);
            }
        }
    }

    /// Timer tick: emit step pulses for the active segment.
    #[inline]
    pub fn tick(&mut self) {
        self.executor.tick(&mut self.queue, &mut self.hw);
    }

    /// Command axis velocities directly, steps/s. Ignored while homing.
    pub fn set_velocities(&mut self, velocities: [f32; AXIS_COUNT]) {
        if !self.homing.is_active() {
            self.planner.set_velocities(velocities);
        }
    }

    /// Command motion from normalized joystick deflections. Ignored while
    /// homing.
    pub fn set_joystick(&mut self, deflections: [f32; AXIS_COUNT]) {
        if !self.homing.is_active() {
            self.planner.set_joystick(deflections);
        }
    }

    /// Start an eased move to absolute targets (steps per axis). Returns
    /// the duration used.
    pub fn move_to(
        &mut self,
        targets: [f32; AXIS_COUNT],
        duration: Option<f32>,
        easing: Easing,
    ) -> Result<f32> {
        if self.homing.is_active() {
            return Err(Error::Homing(HomingError::AlreadyActive));
        }
        Ok(self.planner.plan_move(targets, duration, easing)?)
    }

    /// Recall a stored preset. Returns the move duration.
    pub fn goto_preset(&mut self, index: u8) -> Result<f32> {
        if self.homing.is_active() {
            return Err(Error::Homing(HomingError::AlreadyActive));
        }

        let preset = self
            .presets
            .load(index)
            .ok_or(Error::Preset(PresetError::NotFound(index)))?;
        if preset.approach != ApproachMode::Direct {
            return Err(Error::Preset(PresetError::UnsupportedApproach));
        }

        let duration = if preset.duration_s > 0.0 {
            let scale = if preset.speed_scale > 0.0 {
                preset.speed_scale
            } else {
                1.0
            };
            Some(preset.duration_s / scale)
        } else {
            None
        };

        let duration = self.planner.plan_move(preset.positions, duration, preset.easing)?;
        self.pending_precision = Some(preset.precision);
        Ok(duration)
    }

    /// Store a preset at `index`.
    pub fn save_preset(&mut self, index: u8, preset: &Preset) -> Result<()> {
        if index as usize >= MAX_PRESETS {
            return Err(Error::Preset(PresetError::IndexOutOfRange(index)));
        }
        if !self.presets.save(index, preset) {
            return Err(Error::Preset(PresetError::SaveFailed(index)));
        }
        Ok(())
    }

    /// Store the current pose at `index` with default motion style.
    pub fn capture_preset(&mut self, index: u8) -> Result<()> {
        let preset = Preset {
            positions: self.planner.positions(),
            precision: self.planner.precision_mode(),
            ..Preset::default()
        };
        self.save_preset(index, &preset)
    }

    /// Home the given axes, in order.
    pub fn home(&mut self, axes: &[Axis]) -> Result<()> {
        self.homing.start(axes)?;
        // Homing owns the planner from here; drop whatever was running.
        self.planner.stop();
        self.queue.clear();
        self.planner.sync_positions(self.executor.positions());
        Ok(())
    }

    /// Home every axis, pan first.
    pub fn home_all(&mut self) -> Result<()> {
        self.home(&Axis::ALL)
    }

    /// Drop all commanded motion and discard queued segments. The segment
    /// already in the executor finishes (a few milliseconds at most).
    pub fn stop(&mut self) {
        self.homing.abort();
        self.planner.stop();
        self.queue.clear();
        self.pending_sync = false;
        self.pending_precision = None;
        self.planner.sync_positions(self.executor.positions());
    }

    /// Scale manual velocity for fine framing.
    pub fn set_precision_mode(&mut self, enabled: bool) {
        self.planner.set_precision_mode(enabled);
    }

    /// Replace the soft limits for one axis.
    pub fn set_limits(&mut self, axis: Axis, limits: TravelLimits) {
        self.planner.set_limits(axis, limits);
    }

    /// Command position per axis, in steps.
    pub fn positions(&self) -> [f32; AXIS_COUNT] {
        self.planner.positions()
    }

    /// Executor's live step counts per axis.
    pub fn step_positions(&self) -> [i32; AXIS_COUNT] {
        self.executor.positions()
    }

    /// True while homing, moving, or draining queued motion.
    pub fn is_busy(&self) -> bool {
        self.homing.is_active() || self.planner.is_busy() || self.executor.is_busy(&self.queue)
    }

    /// True while a waypoint move is in flight.
    pub fn is_move_in_progress(&self) -> bool {
        self.planner.is_move_in_progress()
    }

    /// Current homing phase.
    pub fn homing_state(&self) -> HomingState {
        self.homing.state()
    }

    /// True while motor drivers are energized.
    pub fn drivers_enabled(&self) -> bool {
        self.drivers_enabled
    }

    /// Release the hardware and preset store.
    pub fn free(self) -> (H, P) {
        (self.hw, self.presets)
    }
}
