//! Build-time configuration
//!
//! `build.rs` validates `oven.toml` and generates [`oven_config`] and
//! [`PROFILES`] from it.

use kiln_core::config::OvenConfig;
use kiln_core::control::PidGains;
use kiln_core::profile::{ProfileError, ProfileRegistry, ThermalProfile};

/// One `[[profile]]` entry
pub struct ProfileEntry {
    pub name: &'static str,
    pub soak_temperature_c: i16,
    pub soak_duration_ms: u32,
}

include!(concat!(env!("OUT_DIR"), "/oven_config.rs"));

/// Build the profile registry from the compiled-in table
pub fn profile_registry() -> Result<ProfileRegistry, ProfileError> {
    let mut registry = ProfileRegistry::new();
    for entry in PROFILES {
        registry.push(ThermalProfile::new(
            entry.name,
            entry.soak_temperature_c,
            entry.soak_duration_ms,
        )?)?;
    }
    Ok(registry)
}
