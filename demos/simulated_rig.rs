//! Simulated rig walkthrough.
//!
//! Runs the full motion pipeline against an in-memory rig: homing the pan
//! axis against a simulated endstop, recalling a preset with easing, and
//! jogging with shaped joystick input. No hardware required.

use ptz_motion::{
    Axis, Easing, HomingState, MemoryPresetStore, MotionController, Preset, PresetStore,
    RigConfig, RigHardware, AXIS_COUNT, STALL_READ_INVALID,
};

/// Pin-level rig simulation. Positions integrate from step pulses; the pan
/// endstop asserts below -800 steps.
struct SimRig {
    dir: [bool; AXIS_COUNT],
    positions: [i32; AXIS_COUNT],
}

impl SimRig {
    fn new() -> Self {
        Self {
            dir: [true; AXIS_COUNT],
            positions: [0; AXIS_COUNT],
        }
    }
}

impl RigHardware for SimRig {
    fn set_step(&mut self, axis: Axis, high: bool) {
        if high {
            let i = axis.index();
            self.positions[i] += if self.dir[i] { 1 } else { -1 };
        }
    }

    fn set_direction(&mut self, axis: Axis, forward: bool) {
        self.dir[axis.index()] = forward;
    }

    fn endstop_triggered(&mut self, axis: Axis) -> bool {
        axis == Axis::Pan && self.positions[0] <= -800
    }

    fn stall_metric(&mut self, _axis: Axis) -> u8 {
        STALL_READ_INVALID
    }

    fn set_driver_enable(&mut self, _enabled: bool) {}
}

/// One 20 ms control interval: a planner update plus 800 timer ticks.
fn run_interval(c: &mut MotionController<SimRig, MemoryPresetStore>) {
    c.update(0.02);
    for _ in 0..800 {
        c.tick();
    }
}

fn main() {
    println!("=== Simulated PTZ Rig ===\n");

    let config = RigConfig::default();
    let mut presets = MemoryPresetStore::new();
    presets.save(
        1,
        &Preset {
            positions: [1500.0, 600.0, 120.0],
            easing: Easing::Sigmoid,
            duration_s: 2.5,
            ..Preset::default()
        },
    );

    let mut controller = MotionController::new(&config, SimRig::new(), presets);

    // Home the pan axis against the simulated endstop.
    println!("Homing pan axis...");
    controller.home(&[Axis::Pan]).unwrap();
    let mut intervals = 0u32;
    while controller.homing_state() != HomingState::Complete {
        run_interval(&mut controller);
        intervals += 1;
        assert!(intervals < 10_000, "homing did not complete");
    }
    println!(
        "  homed in {:.1} s, position now {:?}\n",
        intervals as f32 * 0.02,
        controller.step_positions()
    );

    // Recall the stored preset with sigmoid easing.
    println!("Recalling preset 1 (sigmoid easing, 2.5 s)...");
    let duration = controller.goto_preset(1).unwrap();
    let mut intervals = 0u32;
    while controller.is_busy() {
        run_interval(&mut controller);
        intervals += 1;
        if intervals % 25 == 0 {
            let p = controller.step_positions();
            println!(
                "  t={:.1}s  pan={:5}  tilt={:5}  zoom={:4}",
                intervals as f32 * 0.02,
                p[0],
                p[1],
                p[2]
            );
        }
    }
    println!(
        "  arrived at {:?} (planned duration {:.1} s)\n",
        controller.step_positions(),
        duration
    );

    // Jog with shaped joystick input, then precision mode.
    println!("Jogging with joystick (half deflection)...");
    controller.set_joystick([0.5, 0.0, 0.0]);
    for _ in 0..50 {
        run_interval(&mut controller);
    }
    controller.set_joystick([0.0, 0.0, 0.0]);
    println!("  after 1 s: {:?}", controller.step_positions());

    controller.set_precision_mode(true);
    controller.set_joystick([0.5, 0.0, 0.0]);
    for _ in 0..50 {
        run_interval(&mut controller);
    }
    controller.stop();
    println!("  after 1 s in precision mode: {:?}", controller.step_positions());

    println!("\nDone.");
}
