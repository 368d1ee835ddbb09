//! Control-rate motion planning.
//!
//! The planner turns velocity commands and waypoint moves into fixed-duration
//! [`Segment`]s. It runs at control rate (50-250 Hz), keeps float command
//! positions per axis, and feeds the segment queue with whatever headroom the
//! executor has left. Exactly one motion mode is active at a time.

use libm::{powf, roundf, sqrtf};

use crate::axis::{Axis, AXIS_COUNT};
use crate::config::{AxisConstraints, JoystickConfig, RigConfig, TravelLimits};
use crate::error::MotionError;
use crate::segment::{Segment, SegmentSink};
use crate::trajectory::{Easing, Quintic};

/// Minimum automatic move duration in seconds.
const MIN_AUTO_DURATION: f32 = 0.5;

/// Segment-queue headroom kept free while streaming a waypoint move.
const WAYPOINT_HEADROOM: usize = 4;

/// Peak acceleration ratio of the quintic S-curve: `10/√3` times the
/// average-velocity-per-second baseline `Δx/T²`.
const QUINTIC_PEAK_ACCEL_RATIO: f32 = 5.7735;

/// Manual (velocity) mode state.
#[derive(Debug, Clone, Copy)]
pub struct ManualState {
    /// Commanded velocity per axis, steps/s.
    target: [f32; AXIS_COUNT],
    /// Rate-limited velocity actually integrated last segment.
    slewed: [f32; AXIS_COUNT],
}

/// An in-flight waypoint move.
#[derive(Debug, Clone, Copy)]
pub struct WaypointMove {
    curves: [Quintic; AXIS_COUNT],
    targets: [f32; AXIS_COUNT],
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

/// Active motion mode. The modes are mutually exclusive by construction;
/// there is no state where both a velocity command and a trajectory drive
/// the same axis.
#[derive(Debug, Clone, Copy)]
pub enum PlannerMode {
    /// No motion commanded; the rig holds position.
    Idle,
    /// Velocity-driven motion from joystick or direct commands.
    Manual(ManualState),
    /// Eased quintic trajectory toward fixed targets.
    Waypoint(WaypointMove),
}

/// Control-rate planner: velocity commands and waypoint moves in, segments
/// out.
#[derive(Debug)]
pub struct MotionPlanner {
    constraints: [AxisConstraints; AXIS_COUNT],
    joystick: JoystickConfig,
    segment_duration_us: u32,
    soft_limit_zone: f32,
    precision_multiplier: f32,
    precision_mode: bool,
    mode: PlannerMode,
    /// Float command position per axis.
    positions: [f32; AXIS_COUNT],
    /// Integer steps already emitted into segments. The difference between
    /// this and `positions` is the fractional remainder carried across
    /// segments, so rounding never accumulates drift.
    emitted: [i32; AXIS_COUNT],
}

impl MotionPlanner {
    /// Build a planner from a validated config.
    pub fn new(config: &RigConfig) -> Self {
        let mut constraints = [AxisConstraints::default(); AXIS_COUNT];
        for axis in Axis::ALL {
            constraints[axis.index()] = config.constraints(axis);
        }

        Self {
            constraints,
            joystick: config.joystick,
            segment_duration_us: config.planner.segment_duration_us,
            soft_limit_zone: config.planner.soft_limit_zone,
            precision_multiplier: config.planner.precision_multiplier,
            precision_mode: false,
            mode: PlannerMode::Idle,
            positions: [0.0; AXIS_COUNT],
            emitted: [0; AXIS_COUNT],
        }
    }

    /// Command axis velocities directly, in steps/s.
    ///
    /// Cancels an active waypoint move only when some component is nonzero;
    /// a zero command during a move is ignored so a released joystick does
    /// not abort a recall.
    pub fn set_velocities(&mut self, velocities: [f32; AXIS_COUNT]) {
        let any_motion = velocities.iter().any(|&v| v != 0.0);
        if matches!(self.mode, PlannerMode::Waypoint(_)) && !any_motion {
            return;
        }

        let mut target = [0.0; AXIS_COUNT];
        for axis in Axis::ALL {
            let i = axis.index();
            let max = self.constraints[i].max_velocity;
            target[i] = velocities[i].clamp(-max, max);
        }

        let slewed = match self.mode {
            PlannerMode::Manual(m) => m.slewed,
            _ => [0.0; AXIS_COUNT],
        };
        self.mode = PlannerMode::Manual(ManualState { target, slewed });
    }

    /// Command motion from normalized joystick deflections in `[-1, 1]`.
    ///
    /// Applies the deadband and exponential response curve, then scales to
    /// each axis's maximum velocity.
    pub fn set_joystick(&mut self, deflections: [f32; AXIS_COUNT]) {
        let mut velocities = [0.0; AXIS_COUNT];
        for axis in Axis::ALL {
            let i = axis.index();
            let shaped = shape_deflection(deflections[i], &self.joystick);
            velocities[i] = shaped * self.constraints[i].max_velocity;
        }
        self.set_velocities(velocities);
    }

    /// Start a waypoint move to `targets` (steps per axis).
    ///
    /// `duration` of `None` (or a non-positive value) selects an automatic
    /// duration that respects each axis's move velocity and acceleration
    /// caps under the chosen easing. Returns the duration used.
    ///
    /// Rejected without state change if a move is already in progress or a
    /// target lies outside an axis's soft limits.
    pub fn plan_move(
        &mut self,
        targets: [f32; AXIS_COUNT],
        duration: Option<f32>,
        easing: Easing,
    ) -> Result<f32, MotionError> {
        if matches!(self.mode, PlannerMode::Waypoint(_)) {
            return Err(MotionError::MoveInProgress);
        }

        for axis in Axis::ALL {
            let limits = self.constraints[axis.index()].limits;
            let target = targets[axis.index()];
            if !limits.contains(target) {
                return Err(MotionError::TargetOutOfLimits {
                    axis,
                    target,
                    min: limits.min,
                    max: limits.max,
                });
            }
        }

        let duration = match duration {
            Some(d) if d > 0.0 => d,
            _ => self.auto_duration(targets, easing),
        };

        let mut curves = [Quintic::solve(0.0, 0.0, duration); AXIS_COUNT];
        for i in 0..AXIS_COUNT {
            curves[i] = Quintic::solve(self.positions[i], targets[i], duration);
        }

        self.mode = PlannerMode::Waypoint(WaypointMove {
            curves,
            targets,
            duration,
            elapsed: 0.0,
            easing,
        });
        Ok(duration)
    }

    /// Shortest duration that keeps every axis within its move velocity and
    /// acceleration caps, given the quintic's peak ratios and the easing's
    /// peak slope.
    fn auto_duration(&self, targets: [f32; AXIS_COUNT], easing: Easing) -> f32 {
        let stretch = easing.peak_slope();
        let mut duration = MIN_AUTO_DURATION;

        for i in 0..AXIS_COUNT {
            let dx = (targets[i] - self.positions[i]).abs();
            if dx == 0.0 {
                continue;
            }
            let c = &self.constraints[i];

            // Peak velocity of the eased quintic is 15/8 · stretch · Δx/T.
            let t_vel = 1.875 * stretch * dx / c.move_velocity;
            // Peak acceleration scales with 1/T², so the easing stretch
            // enters under the square root.
            let t_acc = sqrtf(QUINTIC_PEAK_ACCEL_RATIO * stretch * dx / c.move_acceleration);

            duration = duration.max(t_vel).max(t_acc);
        }
        duration
    }

    /// Generate segments for the elapsed control interval `dt` (seconds).
    ///
    /// A full queue is backpressure: generation stops for this tick and
    /// resumes on the next call. Returns `true` if a waypoint move completed
    /// during this update (command positions are snapped to the exact
    /// targets when it does).
    pub fn update(&mut self, sink: &mut impl SegmentSink, dt: f32) -> bool {
        let seg_dt = self.segment_duration_us as f32 * 1e-6;

        match self.mode {
            PlannerMode::Idle => false,
            PlannerMode::Manual(mut manual) => {
                let stopped =
                    manual.target.iter().all(|&v| v == 0.0) && manual.slewed.iter().all(|&v| v == 0.0);
                if !stopped {
                    let count = ((dt / seg_dt) as usize + 1).min(sink.free_slots());
                    for _ in 0..count {
                        let segment = self.manual_segment(&mut manual, seg_dt);
                        if !sink.push(segment) {
                            break;
                        }
                    }
                    self.mode = PlannerMode::Manual(manual);
                }
                false
            }
            PlannerMode::Waypoint(mut mv) => {
                while mv.elapsed < mv.duration && sink.free_slots() > WAYPOINT_HEADROOM {
                    let t_next = (mv.elapsed + seg_dt).min(mv.duration);
                    let mut steps = [0i32; AXIS_COUNT];
                    let mut pos = [0.0f32; AXIS_COUNT];
                    for i in 0..AXIS_COUNT {
                        pos[i] = mv.curves[i].evaluate_eased(t_next, mv.easing);
                        steps[i] = roundf(pos[i] - self.emitted[i] as f32) as i32;
                    }
                    // Commit only what actually entered the stream; a
                    // rejected push must not account its steps as emitted.
                    if !sink.push(Segment {
                        steps,
                        duration_us: self.segment_duration_us,
                    }) {
                        break;
                    }
                    for i in 0..AXIS_COUNT {
                        self.emitted[i] += steps[i];
                        self.positions[i] = pos[i];
                    }
                    mv.elapsed = t_next;
                }

                if mv.elapsed >= mv.duration {
                    // Land exactly on the targets. Any sub-step residue left
                    // by per-segment rounding goes out as one correction
                    // segment; the headroom check above guarantees a slot.
                    let mut residue = [0i32; AXIS_COUNT];
                    let mut any = false;
                    for i in 0..AXIS_COUNT {
                        self.positions[i] = mv.targets[i];
                        let target_steps = roundf(mv.targets[i]) as i32;
                        residue[i] = target_steps - self.emitted[i];
                        any |= residue[i] != 0;
                        self.emitted[i] = target_steps;
                    }
                    if any {
                        sink.push(Segment {
                            steps: residue,
                            duration_us: self.segment_duration_us,
                        });
                    }
                    self.mode = PlannerMode::Idle;
                    true
                } else {
                    self.mode = PlannerMode::Waypoint(mv);
                    false
                }
            }
        }
    }

    /// One manual-mode segment: shape the commanded velocity through the
    /// precision multiplier, soft-limit taper, and optional slew limit, then
    /// integrate it over one segment.
    fn manual_segment(&mut self, manual: &mut ManualState, seg_dt: f32) -> Segment {
        let mut steps = [0i32; AXIS_COUNT];

        for i in 0..AXIS_COUNT {
            let c = &self.constraints[i];
            let mut v = manual.target[i];
            if self.precision_mode {
                v *= self.precision_multiplier;
            }
            v *= c.limits.velocity_scale(self.positions[i], v, self.soft_limit_zone);
            v = v.clamp(-c.max_velocity, c.max_velocity);

            if self.joystick.slew_limited {
                let max_dv = c.max_acceleration * seg_dt;
                let dv = (v - manual.slewed[i]).clamp(-max_dv, max_dv);
                v = manual.slewed[i] + dv;
            }
            manual.slewed[i] = v;

            // Hard backstop: never integrate past a bound.
            let next = c.limits.clamp(self.positions[i] + v * seg_dt);
            self.positions[i] = next;

            steps[i] = roundf(next - self.emitted[i] as f32) as i32;
            self.emitted[i] += steps[i];
        }

        Segment {
            steps,
            duration_us: self.segment_duration_us,
        }
    }

    /// Drop any commanded motion. Queued segments must be cleared and the
    /// planner re-synced to the executor's position by the caller.
    pub fn stop(&mut self) {
        self.mode = PlannerMode::Idle;
    }

    /// Re-baseline command positions to the executor's step counts (after
    /// homing, an emergency stop, or an explicit position set).
    pub fn sync_positions(&mut self, steps: [i32; AXIS_COUNT]) {
        for i in 0..AXIS_COUNT {
            self.positions[i] = steps[i] as f32;
            self.emitted[i] = steps[i];
        }
    }

    /// Float command position per axis, in steps.
    #[inline]
    pub fn positions(&self) -> [f32; AXIS_COUNT] {
        self.positions
    }

    /// Integer steps emitted so far per axis.
    #[inline]
    pub fn emitted_steps(&self) -> [i32; AXIS_COUNT] {
        self.emitted
    }

    /// True while a waypoint move is in flight.
    pub fn is_move_in_progress(&self) -> bool {
        matches!(self.mode, PlannerMode::Waypoint(_))
    }

    /// True while the planner is producing motion: a waypoint move, or
    /// manual mode with nonzero commanded or slewed velocity.
    pub fn is_busy(&self) -> bool {
        match &self.mode {
            PlannerMode::Idle => false,
            PlannerMode::Manual(m) => {
                m.target.iter().any(|&v| v != 0.0) || m.slewed.iter().any(|&v| v != 0.0)
            }
            PlannerMode::Waypoint(_) => true,
        }
    }

    /// Scale manual velocity for fine framing.
    pub fn set_precision_mode(&mut self, enabled: bool) {
        self.precision_mode = enabled;
    }

    /// True when precision mode is engaged.
    pub fn precision_mode(&self) -> bool {
        self.precision_mode
    }

    /// Replace the soft limits for one axis.
    pub fn set_limits(&mut self, axis: Axis, limits: TravelLimits) {
        self.constraints[axis.index()].limits = limits;
    }

    /// Soft limits for one axis.
    pub fn limits(&self, axis: Axis) -> TravelLimits {
        self.constraints[axis.index()].limits
    }
}

/// Deadband and expo shaping for one normalized deflection.
fn shape_deflection(deflection: f32, joystick: &JoystickConfig) -> f32 {
    let x = deflection.clamp(-1.0, 1.0);
    let magnitude = x.abs();
    if magnitude < joystick.deadband {
        return 0.0;
    }

    // Renormalize so response starts from zero at the deadband edge.
    let m = (magnitude - joystick.deadband) / (1.0 - joystick.deadband);
    let shaped = powf(m, joystick.expo);
    if x < 0.0 {
        -shaped
    } else {
        shaped
    }
}
