//! Thermal profiles

pub mod registry;

pub use registry::{
    ProfileError, ProfileRegistry, ThermalProfile, MAX_PROFILES, MAX_PROFILE_NAME_LEN,
};
