//! Soft travel limits and the approach-zone velocity taper.

/// Velocity scale applied right at a soft limit bound.
const MIN_SCALE: f32 = 0.1;

/// Soft travel limits for one axis, in steps.
///
/// Positions are valid on the closed interval `[min, max]`. The defaults
/// are wide enough to be effectively unlimited for typical rigs.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TravelLimits {
    /// Minimum position in steps.
    pub min: f32,
    /// Maximum position in steps.
    pub max: f32,
}

impl Default for TravelLimits {
    fn default() -> Self {
        Self {
            min: -100_000.0,
            max: 100_000.0,
        }
    }
}

impl TravelLimits {
    /// True if `position` lies within the limits (inclusive).
    #[inline]
    pub fn contains(&self, position: f32) -> bool {
        position >= self.min && position <= self.max
    }

    /// Travel span in steps.
    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Clamp `position` into the limits.
    #[inline]
    pub fn clamp(&self, position: f32) -> f32 {
        position.clamp(self.min, self.max)
    }

    /// Velocity scale for manual motion near the limits.
    ///
    /// Inside the approach zone (a `zone_fraction` slice of the travel span
    /// next to each bound) velocity toward the bound tapers smoothly from
    /// 1.0 at the zone edge down to 0.1 at the bound itself, and drops to
    /// 0.0 once the bound is crossed. Motion away from a bound is never
    /// scaled, so an axis parked at a limit can always back out.
    pub fn velocity_scale(&self, position: f32, velocity: f32, zone_fraction: f32) -> f32 {
        let distance = if velocity > 0.0 {
            self.max - position
        } else if velocity < 0.0 {
            position - self.min
        } else {
            return 1.0;
        };

        if distance <= 0.0 {
            return 0.0;
        }

        let zone = self.span() * zone_fraction;
        if zone <= 0.0 || distance >= zone {
            return 1.0;
        }

        let u = distance / zone;
        let smooth = u * u * u * (u * (u * 6.0 - 15.0) + 10.0);
        MIN_SCALE + (1.0 - MIN_SCALE) * smooth
    }
}
