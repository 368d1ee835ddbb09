//! Rig axes.
//!
//! The rig has a fixed set of three axes. Per-axis state throughout the crate
//! is stored in `[T; AXIS_COUNT]` arrays indexed by [`Axis::index`].

/// Number of axes on the rig.
pub const AXIS_COUNT: usize = 3;

/// One axis of the pan/tilt/zoom rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Horizontal rotation.
    Pan,
    /// Vertical rotation.
    Tilt,
    /// Lens zoom ring.
    Zoom,
}

impl Axis {
    /// All axes in homing order (pan, tilt, zoom).
    pub const ALL: [Axis; AXIS_COUNT] = [Axis::Pan, Axis::Tilt, Axis::Zoom];

    /// Index into per-axis arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Axis for a raw index, if valid.
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Axis::Pan),
            1 => Some(Axis::Tilt),
            2 => Some(Axis::Zoom),
            _ => None,
        }
    }

    /// Short lowercase name for display.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Axis::Pan => "pan",
            Axis::Tilt => "tilt",
            Axis::Zoom => "zoom",
        }
    }
}

impl core::fmt::Display for Axis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
