//! Thermal profile registry
//!
//! A small append-only table of heating regimens, filled once at startup.
//! One entry is "selected" at any time; the selection wraps around the end
//! of the table so a single-profile deployment cycles as a no-op.

use heapless::{String, Vec};

/// Maximum profile name length
pub const MAX_PROFILE_NAME_LEN: usize = 16;

/// Maximum profiles per registry
pub const MAX_PROFILES: usize = 8;

/// Errors raised while building profiles or the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileError {
    /// Name is empty
    EmptyName,
    /// Name longer than [`MAX_PROFILE_NAME_LEN`]
    NameTooLong,
    /// Hold duration must be positive
    ZeroDuration,
    /// Registry already holds [`MAX_PROFILES`] entries
    RegistryFull,
}

/// One heating regimen: heat to a temperature and hold it for a duration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermalProfile {
    name: String<MAX_PROFILE_NAME_LEN>,
    soak_temperature_c: i16,
    soak_duration_ms: u32,
}

impl ThermalProfile {
    /// Create a profile
    pub fn new(
        name: &str,
        soak_temperature_c: i16,
        soak_duration_ms: u32,
    ) -> Result<Self, ProfileError> {
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        if soak_duration_ms == 0 {
            return Err(ProfileError::ZeroDuration);
        }

        let mut label = String::new();
        label
            .push_str(name)
            .map_err(|_| ProfileError::NameTooLong)?;

        Ok(Self {
            name: label,
            soak_temperature_c,
            soak_duration_ms,
        })
    }

    /// Display name
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Hold temperature (°C)
    pub fn soak_temperature_c(&self) -> i16 {
        self.soak_temperature_c
    }

    /// Hold duration (ms)
    pub fn soak_duration_ms(&self) -> u32 {
        self.soak_duration_ms
    }
}

/// Append-only profile table with a wrapping selection cursor
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<ThermalProfile, MAX_PROFILES>,
    selected: usize,
}

impl ProfileRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a profile
    pub fn push(&mut self, profile: ThermalProfile) -> Result<(), ProfileError> {
        self.profiles
            .push(profile)
            .map_err(|_| ProfileError::RegistryFull)
    }

    /// Number of registered profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if no profiles are registered
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// All registered profiles in insertion order
    pub fn profiles(&self) -> &[ThermalProfile] {
        &self.profiles
    }

    /// Select a profile by index, wrapping modulo the table length
    pub fn select(&mut self, index: usize) {
        self.selected = if self.profiles.is_empty() {
            0
        } else {
            index % self.profiles.len()
        };
    }

    /// Advance the selection by one, wrapping to the first entry
    pub fn select_next(&mut self) {
        self.select(self.selected + 1);
    }

    /// Return the selection to the first entry
    pub fn reset(&mut self) {
        self.selected = 0;
    }

    /// Index of the selected profile
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The selected profile, `None` only for an empty registry
    pub fn current(&self) -> Option<&ThermalProfile> {
        self.profiles.get(self.selected)
    }
}
