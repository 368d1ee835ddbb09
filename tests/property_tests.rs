//! Property-based tests for the math and queue invariants.

use proptest::prelude::*;

use ptz_motion::{
    Axis, Easing, Quintic, RigHardware, Segment, SegmentQueue, SegmentSink, SegmentSource,
    StepExecutor, AXIS_COUNT, DEFAULT_TICK_PERIOD_US, SEGMENT_QUEUE_DEPTH, STALL_READ_INVALID,
};

// =============================================================================
// Quintic trajectories
// =============================================================================

proptest! {
    #[test]
    fn quintic_hits_both_endpoints(
        x0 in -50_000.0f32..50_000.0,
        x1 in -50_000.0f32..50_000.0,
        duration in 0.5f32..60.0,
    ) {
        let q = Quintic::solve(x0, x1, duration);
        let span = (x1 - x0).abs().max(1.0);
        prop_assert!((q.evaluate(0.0) - x0).abs() <= span * 1e-4 + 1e-2);
        prop_assert!((q.evaluate(duration) - x1).abs() <= span * 1e-4 + 1e-2);
    }

    #[test]
    fn quintic_boundary_velocity_is_zero(
        x0 in -10_000.0f32..10_000.0,
        x1 in -10_000.0f32..10_000.0,
        duration in 0.5f32..30.0,
    ) {
        let q = Quintic::solve(x0, x1, duration);
        // Tolerance scales with the move's average velocity.
        let tol = ((x1 - x0).abs() / duration).max(1.0) * 1e-3;
        prop_assert!(q.velocity(0.0).abs() <= tol);
        prop_assert!(q.velocity(duration).abs() <= tol);
    }

    #[test]
    fn quintic_stays_between_endpoints(
        x0 in -10_000.0f32..10_000.0,
        x1 in -10_000.0f32..10_000.0,
        duration in 0.5f32..30.0,
        samples in 2usize..50,
    ) {
        let q = Quintic::solve(x0, x1, duration);
        let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let slack = (hi - lo).abs() * 1e-4 + 1e-2;
        for i in 0..=samples {
            let t = duration * i as f32 / samples as f32;
            let x = q.evaluate(t);
            prop_assert!(x >= lo - slack && x <= hi + slack, "x = {} outside [{}, {}]", x, lo, hi);
        }
    }

    #[test]
    fn eased_endpoints_are_invariant(
        x0 in -10_000.0f32..10_000.0,
        x1 in -10_000.0f32..10_000.0,
        duration in 0.5f32..30.0,
        easing_idx in 0usize..3,
    ) {
        let easing = Easing::ALL[easing_idx];
        let q = Quintic::solve(x0, x1, duration);
        let span = (x1 - x0).abs().max(1.0);
        prop_assert!((q.evaluate_eased(0.0, easing) - x0).abs() <= span * 1e-4 + 1e-2);
        prop_assert!((q.evaluate_eased(duration, easing) - x1).abs() <= span * 1e-4 + 1e-2);
    }

    #[test]
    fn easing_is_monotonic_and_bounded(
        easing_idx in 0usize..3,
        u in -0.5f32..1.5,
        v in -0.5f32..1.5,
    ) {
        let easing = Easing::ALL[easing_idx];
        let (a, b) = if u <= v { (u, v) } else { (v, u) };
        let fa = easing.apply(a);
        let fb = easing.apply(b);
        prop_assert!(fa <= fb + 1e-6);
        prop_assert!((0.0..=1.0 + 1e-6).contains(&fa));
    }
}

// =============================================================================
// Step executor
// =============================================================================

struct CountingRig {
    dir: [bool; AXIS_COUNT],
    positions: [i32; AXIS_COUNT],
    pulse_ticks: Vec<u32>,
    tick: u32,
}

impl CountingRig {
    fn new() -> Self {
        Self {
            dir: [true; AXIS_COUNT],
            positions: [0; AXIS_COUNT],
            pulse_ticks: Vec::new(),
            tick: 0,
        }
    }
}

impl RigHardware for CountingRig {
    fn set_step(&mut self, axis: Axis, high: bool) {
        if high {
            let i = axis.index();
            self.positions[i] += if self.dir[i] { 1 } else { -1 };
            if i == 0 {
                self.pulse_ticks.push(self.tick);
            }
        }
    }

    fn set_direction(&mut self, axis: Axis, forward: bool) {
        self.dir[axis.index()] = forward;
    }

    fn endstop_triggered(&mut self, _axis: Axis) -> bool {
        false
    }

    fn stall_metric(&mut self, _axis: Axis) -> u8 {
        STALL_READ_INVALID
    }

    fn set_driver_enable(&mut self, _enabled: bool) {}
}

proptest! {
    #[test]
    fn executor_emits_exact_step_counts(
        pan in -160i32..=160,
        tilt in -160i32..=160,
        zoom in -160i32..=160,
    ) {
        let mut executor = StepExecutor::new(DEFAULT_TICK_PERIOD_US, [false; AXIS_COUNT]);
        let mut queue = SegmentQueue::new();
        let mut rig = CountingRig::new();

        queue.push(Segment { steps: [pan, tilt, zoom], duration_us: 4000 });
        for _ in 0..160 {
            executor.tick(&mut queue, &mut rig);
            rig.tick += 1;
        }

        prop_assert_eq!(rig.positions, [pan, tilt, zoom]);
        prop_assert_eq!(executor.positions(), [pan, tilt, zoom]);
    }

    #[test]
    fn executor_spreads_pulses_evenly(steps in 1u32..=160) {
        let mut executor = StepExecutor::new(DEFAULT_TICK_PERIOD_US, [false; AXIS_COUNT]);
        let mut queue = SegmentQueue::new();
        let mut rig = CountingRig::new();

        queue.push(Segment { steps: [steps as i32, 0, 0], duration_us: 4000 });
        for _ in 0..160 {
            executor.tick(&mut queue, &mut rig);
            rig.tick += 1;
        }

        prop_assert_eq!(rig.pulse_ticks.len() as u32, steps);
        // Max inter-pulse gap for n steps over 160 ticks is ceil(160 / n).
        let max_gap = (160 + steps - 1) / steps;
        for pair in rig.pulse_ticks.windows(2) {
            prop_assert!(pair[1] - pair[0] <= max_gap, "gap {} > {}", pair[1] - pair[0], max_gap);
        }
    }
}

// =============================================================================
// Segment queue
// =============================================================================

proptest! {
    #[test]
    fn queue_tracks_push_pop_balance(ops in proptest::collection::vec(any::<bool>(), 0..200)) {
        let mut queue = SegmentQueue::new();
        let mut model: std::collections::VecDeque<i32> = Default::default();
        let mut next = 0;

        for push in ops {
            if push {
                let seg = Segment { steps: [next, 0, 0], duration_us: 4000 };
                if queue.push(seg) {
                    model.push_back(next);
                } else {
                    // Push fails only at capacity.
                    prop_assert_eq!(model.len(), SEGMENT_QUEUE_DEPTH - 1);
                }
                next += 1;
            } else {
                let popped = queue.pop().map(|s| s.steps[0]);
                prop_assert_eq!(popped, model.pop_front());
            }
            prop_assert_eq!(queue.len(), model.len());
        }
    }
}
