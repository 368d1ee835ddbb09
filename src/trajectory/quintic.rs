//! Minimum-jerk quintic polynomial trajectories.
//!
//! A quintic solved with zero velocity and acceleration at both endpoints
//! gives the S-curve used for waypoint moves: no velocity or acceleration
//! discontinuity at start or stop.

use super::Easing;

/// Quintic polynomial coefficients for one axis, plus the move duration.
///
/// Immutable once solved; a new move solves a fresh set.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Quintic {
    a0: f32,
    a3: f32,
    a4: f32,
    a5: f32,
    duration: f32,
}

impl Quintic {
    /// Solve for a move from `x0` to `x1` over `duration` seconds with zero
    /// boundary velocity and acceleration.
    ///
    /// With those boundary conditions the linear and quadratic terms vanish
    /// and the remaining coefficients are closed-form:
    /// `a3 = 10·Δx/T³`, `a4 = −15·Δx/T⁴`, `a5 = 6·Δx/T⁵`.
    ///
    /// A non-positive `duration` yields a degenerate curve pinned at `x0`.
    pub fn solve(x0: f32, x1: f32, duration: f32) -> Self {
        if duration <= 0.0 {
            return Self {
                a0: x0,
                a3: 0.0,
                a4: 0.0,
                a5: 0.0,
                duration: 0.0,
            };
        }

        let dx = x1 - x0;
        let t3 = duration * duration * duration;
        let t4 = t3 * duration;
        let t5 = t4 * duration;

        Self {
            a0: x0,
            a3: 10.0 * dx / t3,
            a4: -15.0 * dx / t4,
            a5: 6.0 * dx / t5,
            duration,
        }
    }

    /// Move duration in seconds.
    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Position at time `t`, clamped to `[0, duration]`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = self.clamp_time(t);
        let t3 = t * t * t;
        let t4 = t3 * t;
        let t5 = t4 * t;

        self.a0 + self.a3 * t3 + self.a4 * t4 + self.a5 * t5
    }

    /// Velocity (analytic first derivative) at time `t`, clamped.
    pub fn velocity(&self, t: f32) -> f32 {
        let t = self.clamp_time(t);
        let t2 = t * t;
        let t3 = t2 * t;
        let t4 = t3 * t;

        3.0 * self.a3 * t2 + 4.0 * self.a4 * t3 + 5.0 * self.a5 * t4
    }

    /// Acceleration (analytic second derivative) at time `t`, clamped.
    pub fn acceleration(&self, t: f32) -> f32 {
        let t = self.clamp_time(t);
        let t2 = t * t;
        let t3 = t2 * t;

        6.0 * self.a3 * t + 12.0 * self.a4 * t2 + 20.0 * self.a5 * t3
    }

    /// Position at time `t` with an easing remap of normalized time.
    ///
    /// The remap warps *when* motion happens, never *where* it starts or
    /// ends: for every easing, `evaluate_eased(0)` is `x0` and
    /// `evaluate_eased(duration)` is `x1`.
    pub fn evaluate_eased(&self, t: f32, easing: Easing) -> f32 {
        if self.duration <= 0.0 {
            return self.a0;
        }
        let u = easing.apply(t / self.duration);
        self.evaluate(u * self.duration)
    }

    #[inline]
    fn clamp_time(&self, t: f32) -> f32 {
        if t < 0.0 {
            0.0
        } else if t > self.duration {
            self.duration
        } else {
            t
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_boundary_positions() {
        let q = Quintic::solve(100.0, -250.0, 2.5);
        assert!((q.evaluate(0.0) - 100.0).abs() < EPS);
        assert!((q.evaluate(2.5) - (-250.0)).abs() < EPS);
    }

    #[test]
    fn test_boundary_derivatives_zero() {
        let q = Quintic::solve(0.0, 1000.0, 1.5);
        assert!(q.velocity(0.0).abs() < EPS);
        assert!(q.velocity(1.5).abs() < EPS);
        assert!(q.acceleration(0.0).abs() < EPS);
        assert!(q.acceleration(1.5).abs() < 1e-2);
    }

    #[test]
    fn test_midpoint_is_halfway() {
        // The symmetric S-curve passes through the midpoint at T/2.
        let q = Quintic::solve(0.0, 200.0, 4.0);
        assert!((q.evaluate(2.0) - 100.0).abs() < EPS);
    }

    #[test]
    fn test_clamps_outside_range() {
        let q = Quintic::solve(10.0, 20.0, 1.0);
        assert_eq!(q.evaluate(-5.0), q.evaluate(0.0));
        assert_eq!(q.evaluate(5.0), q.evaluate(1.0));
    }

    #[test]
    fn test_eased_endpoints_invariant() {
        let q = Quintic::solve(-40.0, 360.0, 2.0);
        for easing in Easing::ALL {
            assert!((q.evaluate_eased(0.0, easing) - (-40.0)).abs() < EPS);
            assert!((q.evaluate_eased(2.0, easing) - 360.0).abs() < EPS);
        }
    }

    #[test]
    fn test_degenerate_duration() {
        let q = Quintic::solve(42.0, 99.0, 0.0);
        assert_eq!(q.evaluate(0.0), 42.0);
        assert_eq!(q.evaluate(1.0), 42.0);
        assert_eq!(q.evaluate_eased(1.0, Easing::Smootherstep), 42.0);
    }

    #[test]
    fn test_peak_velocity_ratio() {
        // Peak velocity of the quintic is 15/8 of the average velocity.
        let q = Quintic::solve(0.0, 800.0, 2.0);
        let avg = 800.0 / 2.0;
        let peak = q.velocity(1.0);
        assert!((peak / avg - 1.875).abs() < 1e-3);
    }
}
