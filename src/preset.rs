//! Camera position presets.
//!
//! A preset records a rig pose plus the motion style used to reach it.
//! Storage sits behind the [`PresetStore`] trait so firmware can back it
//! with flash or EEPROM while tests use [`MemoryPresetStore`].

use crate::axis::AXIS_COUNT;
use crate::trajectory::Easing;

/// Number of preset slots.
pub const MAX_PRESETS: usize = 16;

/// How a recalled preset is approached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum ApproachMode {
    /// All axes move together on one eased trajectory.
    #[default]
    Direct,
    /// Axes move one at a time, pan first. Reserved; recalling a preset
    /// with this mode is rejected.
    Sequenced,
}

/// A stored rig pose and the motion style used to recall it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Preset {
    /// Target position per axis, in steps.
    pub positions: [f32; AXIS_COUNT],
    /// Easing applied to the recall move.
    pub easing: Easing,
    /// Move duration in seconds; 0 selects automatic duration.
    pub duration_s: f32,
    /// Speed multiplier applied to a fixed duration (recall at half speed
    /// with 0.5). Ignored for automatic durations.
    pub speed_scale: f32,
    /// Approach style.
    pub approach: ApproachMode,
    /// Engage precision mode after the recall completes.
    pub precision: bool,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            positions: [0.0; AXIS_COUNT],
            easing: Easing::default(),
            duration_s: 0.0,
            speed_scale: 1.0,
            approach: ApproachMode::Direct,
            precision: false,
        }
    }
}

/// Preset storage backend.
pub trait PresetStore {
    /// Load the preset at `index`, if one is stored.
    fn load(&self, index: u8) -> Option<Preset>;

    /// Store a preset at `index`. Returns `false` if the write failed or
    /// the index is out of range.
    fn save(&mut self, index: u8, preset: &Preset) -> bool;
}

/// Volatile in-memory preset store.
#[derive(Debug, Default)]
pub struct MemoryPresetStore {
    slots: [Option<Preset>; MAX_PRESETS],
}

impl MemoryPresetStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            slots: [None; MAX_PRESETS],
        }
    }
}

impl PresetStore for MemoryPresetStore {
    fn load(&self, index: u8) -> Option<Preset> {
        self.slots.get(index as usize).copied().flatten()
    }

    fn save(&mut self, index: u8, preset: &Preset) -> bool {
        match self.slots.get_mut(index as usize) {
            Some(slot) => {
                *slot = Some(*preset);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_has_no_presets() {
        let store = MemoryPresetStore::new();
        for i in 0..MAX_PRESETS as u8 {
            assert!(store.load(i).is_none());
        }
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryPresetStore::new();
        let preset = Preset {
            positions: [100.0, -200.0, 50.0],
            duration_s: 3.0,
            ..Preset::default()
        };

        assert!(store.save(5, &preset));
        let loaded = store.load(5).unwrap();
        assert_eq!(loaded.positions, [100.0, -200.0, 50.0]);
        assert_eq!(loaded.duration_s, 3.0);
        assert_eq!(loaded.easing, Easing::Smootherstep);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut store = MemoryPresetStore::new();
        assert!(!store.save(MAX_PRESETS as u8, &Preset::default()));
        assert!(store.load(200).is_none());
    }

    #[test]
    fn test_overwrite() {
        let mut store = MemoryPresetStore::new();
        store.save(0, &Preset::default());
        let replacement = Preset {
            positions: [1.0, 2.0, 3.0],
            ..Preset::default()
        };
        store.save(0, &replacement);
        assert_eq!(store.load(0).unwrap().positions, [1.0, 2.0, 3.0]);
    }
}
