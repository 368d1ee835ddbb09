//! Hardware seam between the motion core and the board.
//!
//! The core drives steppers through the [`RigHardware`] trait. Firmware
//! implements it over real pins and driver registers; tests implement it
//! over a simulated rig. [`GpioRig`] is a ready-made implementation over
//! `embedded-hal` 1.0 digital pins for boards without a stall interface.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::axis::{Axis, AXIS_COUNT};

/// Stall metric value reserved for a failed or unavailable read.
///
/// A reading of this value never counts as a stall, so a flaky driver
/// interface cannot fake a home trigger.
pub const STALL_READ_INVALID: u8 = 255;

/// Everything the motion core needs from the board.
///
/// All methods are infallible; pin errors are handled (or ignored) below
/// this seam. The step and direction methods are called from the timer
/// tick and must be cheap.
pub trait RigHardware {
    /// Drive one axis step pin high or low.
    fn set_step(&mut self, axis: Axis, high: bool);

    /// Set one axis direction pin. `forward` means increasing position.
    fn set_direction(&mut self, axis: Axis, forward: bool);

    /// Sample the endstop for one axis. `true` means triggered.
    fn endstop_triggered(&mut self, axis: Axis) -> bool;

    /// Sample the driver's stall metric for one axis.
    ///
    /// Lower means more mechanical load; 0 is a full stall. Return
    /// [`STALL_READ_INVALID`] when the read fails or the driver has no
    /// stall interface.
    fn stall_metric(&mut self, axis: Axis) -> u8;

    /// Enable or disable all motor drivers.
    fn set_driver_enable(&mut self, enabled: bool);
}

/// [`RigHardware`] over `embedded-hal` digital pins.
///
/// Endstops are wired active-low (switch closes to ground). Axes without
/// an endstop take `None`; their endstop never reads triggered. This
/// implementation has no stall interface and always reports
/// [`STALL_READ_INVALID`], so stall-triggered homing requires a custom
/// [`RigHardware`] over the driver's registers.
pub struct GpioRig<STEP, DIR, STOP, EN> {
    step: [STEP; AXIS_COUNT],
    dir: [DIR; AXIS_COUNT],
    endstops: [Option<STOP>; AXIS_COUNT],
    enable: EN,
    invert: [bool; AXIS_COUNT],
}

impl<STEP, DIR, STOP, EN> GpioRig<STEP, DIR, STOP, EN>
where
    STEP: OutputPin,
    DIR: OutputPin,
    STOP: InputPin,
    EN: OutputPin,
{
    /// Build a rig from its pins. `invert` flips the direction sense per
    /// axis to match the mechanics.
    pub fn new(
        step: [STEP; AXIS_COUNT],
        dir: [DIR; AXIS_COUNT],
        endstops: [Option<STOP>; AXIS_COUNT],
        enable: EN,
        invert: [bool; AXIS_COUNT],
    ) -> Self {
        Self {
            step,
            dir,
            endstops,
            enable,
            invert,
        }
    }

    /// Release the pins.
    pub fn free(
        self,
    ) -> (
        [STEP; AXIS_COUNT],
        [DIR; AXIS_COUNT],
        [Option<STOP>; AXIS_COUNT],
        EN,
    ) {
        (self.step, self.dir, self.endstops, self.enable)
    }
}

impl<STEP, DIR, STOP, EN> RigHardware for GpioRig<STEP, DIR, STOP, EN>
where
    STEP: OutputPin,
    DIR: OutputPin,
    STOP: InputPin,
    EN: OutputPin,
{
    fn set_step(&mut self, axis: Axis, high: bool) {
        let pin = &mut self.step[axis.index()];
        let _ = if high { pin.set_high() } else { pin.set_low() };
    }

    fn set_direction(&mut self, axis: Axis, forward: bool) {
        let forward = forward != self.invert[axis.index()];
        let pin = &mut self.dir[axis.index()];
        let _ = if forward { pin.set_high() } else { pin.set_low() };
    }

    fn endstop_triggered(&mut self, axis: Axis) -> bool {
        match &mut self.endstops[axis.index()] {
            Some(pin) => pin.is_low().unwrap_or(false),
            None => false,
        }
    }

    fn stall_metric(&mut self, _axis: Axis) -> u8 {
        STALL_READ_INVALID
    }

    fn set_driver_enable(&mut self, enabled: bool) {
        // Enable pins on common stepper drivers are active-low.
        let _ = if enabled {
            self.enable.set_low()
        } else {
            self.enable.set_high()
        };
    }
}
