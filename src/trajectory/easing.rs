//! Easing curves: monotonic remaps of normalized time.
//!
//! Easing reshapes a trajectory's velocity profile without changing its
//! endpoints: `apply(0) == 0` and `apply(1) == 1` for every curve.

use libm::tanhf;

/// Sigmoid steepness. Larger values concentrate motion around the midpoint.
const SIGMOID_GAIN: f32 = 12.0;

/// Time-remap applied to waypoint trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Identity remap; the quintic's own S-curve is the only shaping.
    Linear,
    /// Quintic smootherstep `u³(6u² − 15u + 10)`.
    #[default]
    Smootherstep,
    /// Logistic curve approximated with tanh, normalized so the endpoints
    /// land exactly on 0 and 1.
    Sigmoid,
}

impl Easing {
    /// Remap normalized time `u` (clamped to `[0, 1]`).
    pub fn apply(self, u: f32) -> f32 {
        let u = if u < 0.0 {
            0.0
        } else if u > 1.0 {
            1.0
        } else {
            u
        };

        match self {
            Easing::Linear => u,
            Easing::Smootherstep => {
                let u3 = u * u * u;
                u3 * (u * (u * 6.0 - 15.0) + 10.0)
            }
            Easing::Sigmoid => {
                // Raw tanh leaves residuals of ~3e-6 at the ends; rescale so
                // the endpoint contract holds exactly.
                let edge = tanhf(SIGMOID_GAIN * 0.5);
                let raw = tanhf(SIGMOID_GAIN * (u - 0.5));
                (raw + edge) / (2.0 * edge)
            }
        }
    }

    /// Peak slope of the remap, used to stretch auto-calculated move
    /// durations so warped trajectories stay inside velocity limits.
    pub fn peak_slope(self) -> f32 {
        match self {
            Easing::Linear => 1.0,
            // Smootherstep slope peaks at 15/8 at the midpoint.
            Easing::Smootherstep => 1.875,
            // d/du 0.5·(1 + tanh(g(u − ½))) at the midpoint is g/2.
            Easing::Sigmoid => SIGMOID_GAIN / 2.0,
        }
    }

    /// All easing types.
    pub const ALL: [Easing; 3] = [Easing::Linear, Easing::Smootherstep, Easing::Sigmoid];
}
