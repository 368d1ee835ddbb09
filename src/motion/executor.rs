//! Tick-rate step pulse generation.
//!
//! [`StepExecutor::tick`] runs from a hardware timer (40 kHz typical). Each
//! tick it advances the active segment, spreading that segment's steps
//! evenly across its ticks with a per-axis integer accumulator, and emits
//! step pulses through [`RigHardware`]. No floating point, no allocation,
//! no locks.

use crate::axis::{Axis, AXIS_COUNT};
use crate::hal::RigHardware;
use crate::segment::{Segment, SegmentSource};

/// Default tick period in microseconds (40 kHz).
pub const DEFAULT_TICK_PERIOD_US: u32 = 25;

/// A segment being executed, with per-axis accumulator state.
#[derive(Debug, Clone, Copy)]
struct ActiveSegment {
    /// Total ticks in this segment (at least 1).
    ticks_total: u32,
    /// Ticks remaining, counted down to 0.
    ticks_left: u32,
    /// Per-axis step accumulators.
    accum: [u32; AXIS_COUNT],
    /// Unsigned step count per axis.
    step_count: [u32; AXIS_COUNT],
    /// Step direction per axis: +1, -1, or 0.
    dir: [i8; AXIS_COUNT],
}

impl ActiveSegment {
    fn new(segment: Segment, tick_period_us: u32) -> Self {
        let ticks_total = (segment.duration_us / tick_period_us).max(1);
        let mut step_count = [0u32; AXIS_COUNT];
        let mut dir = [0i8; AXIS_COUNT];

        for (i, &steps) in segment.steps.iter().enumerate() {
            step_count[i] = steps.unsigned_abs();
            dir[i] = match steps {
                s if s > 0 => 1,
                s if s < 0 => -1,
                _ => 0,
            };
        }

        Self {
            ticks_total,
            ticks_left: ticks_total,
            accum: [0; AXIS_COUNT],
            step_count,
            dir,
        }
    }
}

/// Converts queued segments into evenly spaced step pulses.
///
/// Owns the live step-count positions, updated one pulse at a time so they
/// are consistent at every instant. Accumulator state does not carry across
/// segments; each segment starts from zero. Direction inversion flips the
/// pin sense only; positions always count in logical coordinates.
#[derive(Debug)]
pub struct StepExecutor {
    tick_period_us: u32,
    active: Option<ActiveSegment>,
    positions: [i32; AXIS_COUNT],
    invert: [bool; AXIS_COUNT],
}

impl StepExecutor {
    /// Create an executor with the given tick period in microseconds.
    /// `invert` flips the direction pin sense per axis.
    pub const fn new(tick_period_us: u32, invert: [bool; AXIS_COUNT]) -> Self {
        Self {
            tick_period_us,
            active: None,
            positions: [0; AXIS_COUNT],
            invert,
        }
    }

    /// Advance one timer tick.
    ///
    /// Pops the next segment when idle and processes it on the same tick,
    /// so queued motion starts without a one-tick gap. With nothing queued
    /// the rig holds position.
    pub fn tick<H: RigHardware>(&mut self, source: &mut impl SegmentSource, hw: &mut H) {
        if self.active.is_none() {
            self.active = source.pop().map(|s| ActiveSegment::new(s, self.tick_period_us));
        }

        let Some(seg) = &mut self.active else {
            return;
        };

        // Bresenham-style spread: each axis steps when its accumulator
        // crosses the tick total, giving at most one pulse per tick and a
        // maximum gap of ceil(ticks_total / steps) ticks between pulses.
        for axis in Axis::ALL {
            let i = axis.index();
            if seg.step_count[i] == 0 {
                continue;
            }

            seg.accum[i] += seg.step_count[i];
            if seg.accum[i] >= seg.ticks_total {
                seg.accum[i] -= seg.ticks_total;

                let forward = (seg.dir[i] > 0) != self.invert[i];
                hw.set_direction(axis, forward);
                hw.set_step(axis, true);
                hw.set_step(axis, false);
                self.positions[i] += seg.dir[i] as i32;
            }
        }

        seg.ticks_left -= 1;
        if seg.ticks_left == 0 {
            self.active = None;
        }
    }

    /// Live position of one axis, in steps.
    #[inline]
    pub fn position(&self, axis: Axis) -> i32 {
        self.positions[axis.index()]
    }

    /// Live positions of all axes, in steps.
    #[inline]
    pub fn positions(&self) -> [i32; AXIS_COUNT] {
        self.positions
    }

    /// Re-baseline one axis position (after homing, or when syncing to the
    /// planner's float position at move completion).
    pub fn set_position(&mut self, axis: Axis, position: i32) {
        self.positions[axis.index()] = position;
    }

    /// True while a segment is mid-execution or more are queued.
    pub fn is_busy(&self, source: &impl SegmentSource) -> bool {
        self.active.is_some() || !source.is_empty()
    }
}
