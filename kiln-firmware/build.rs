//! Build script for kiln-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates oven.toml at compile time
//! - Generates the configuration table compiled into the firmware

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Limits mirrored from kiln-core's profile registry
const MAX_PROFILES: usize = 8;
const MAX_PROFILE_NAME_LEN: usize = 16;
const MAX_SOAK_TEMPERATURE_C: i64 = 300;

fn main() {
    setup_linker();
    let config = load_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OvenFile {
    #[serde(default)]
    oven: OvenSection,
    #[serde(default)]
    profile: Vec<ProfileEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OvenSection {
    room_temperature_c: Option<i64>,
    cool_min_c: Option<i64>,
    sensor_period_ms: Option<i64>,
    fault_threshold: Option<i64>,
    debounce_ms: Option<i64>,
    long_press_ms: Option<i64>,
    window_ms: Option<i64>,
    pid_sample_ms: Option<i64>,
    complete_hold_ms: Option<i64>,
    preheat_gains: Option<Gains>,
    soak_gains: Option<Gains>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct Gains {
    kp: f64,
    ki: f64,
    kd: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileEntry {
    name: String,
    temperature_c: i64,
    duration_min: i64,
}

/// Read, parse and validate oven.toml
fn load_config() -> OvenFile {
    println!("cargo:rerun-if-changed=oven.toml");

    let config_path = Path::new("oven.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: oven.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires an oven.toml configuration file.          ║\n\
            ║  Please create one in the kiln-firmware directory.               ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read oven.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Syntax first, so a typo is reported as such and not as a schema error
    let raw: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail("Invalid TOML syntax in oven.toml", &lines(&e.to_string())),
    };

    validate_required_sections(&raw);

    let config: OvenFile = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => fail("Invalid oven.toml structure", &lines(&e.to_string())),
    };

    validate_oven(&config.oven);
    validate_profiles(&config.profile);

    println!("cargo:warning=oven.toml validated successfully");
    config
}

/// Panic with a boxed error listing
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Split an error message into box-sized lines
fn lines(msg: &str) -> Vec<String> {
    msg.lines()
        .map(|line| {
            if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.to_string()
            }
        })
        .collect()
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    match config.get("profile") {
        Some(toml::Value::Array(profiles)) if !profiles.is_empty() => {}
        Some(toml::Value::Array(_)) | None => fail(
            "Missing profiles in oven.toml",
            &["At least one [[profile]] entry is required".to_string()],
        ),
        Some(_) => fail(
            "Invalid profile configuration",
            &["Profiles must be [[profile]] array entries".to_string()],
        ),
    }
}

/// Validate the [oven] overrides
fn validate_oven(oven: &OvenSection) {
    let mut errors = Vec::new();

    let temperatures = [
        ("room_temperature_c", oven.room_temperature_c),
        ("cool_min_c", oven.cool_min_c),
    ];
    for (key, value) in temperatures {
        if let Some(v) = value {
            if !(0..=MAX_SOAK_TEMPERATURE_C).contains(&v) {
                errors.push(format!(
                    "[oven] {} must be 0-{}",
                    key, MAX_SOAK_TEMPERATURE_C
                ));
            }
        }
    }

    let periods = [
        ("sensor_period_ms", oven.sensor_period_ms),
        ("debounce_ms", oven.debounce_ms),
        ("long_press_ms", oven.long_press_ms),
        ("window_ms", oven.window_ms),
        ("pid_sample_ms", oven.pid_sample_ms),
        ("complete_hold_ms", oven.complete_hold_ms),
    ];
    for (key, value) in periods {
        if let Some(v) = value {
            if v < 0 || v > i64::from(u32::MAX) {
                errors.push(format!("[oven] {} out of range", key));
            }
        }
    }
    for (key, value) in [
        ("sensor_period_ms", oven.sensor_period_ms),
        ("window_ms", oven.window_ms),
        ("pid_sample_ms", oven.pid_sample_ms),
    ] {
        if value == Some(0) {
            errors.push(format!("[oven] {} must be greater than 0", key));
        }
    }

    if let Some(threshold) = oven.fault_threshold {
        if !(1..=255).contains(&threshold) {
            errors.push("[oven] fault_threshold must be 1-255".to_string());
        }
    }

    let debounce = oven.debounce_ms.unwrap_or(50);
    let long_press = oven.long_press_ms.unwrap_or(1000);
    if long_press <= debounce {
        errors.push("[oven] long_press_ms must exceed debounce_ms".to_string());
    }

    for (key, gains) in [
        ("preheat_gains", oven.preheat_gains),
        ("soak_gains", oven.soak_gains),
    ] {
        if let Some(g) = gains {
            if [g.kp, g.ki, g.kd].iter().any(|v| !v.is_finite() || *v < 0.0) {
                errors.push(format!("[oven.{}] gains must be finite and >= 0", key));
            }
        }
    }

    if !errors.is_empty() {
        fail("Invalid [oven] configuration", &errors);
    }
}

/// Validate profile entries
fn validate_profiles(profiles: &[ProfileEntry]) {
    let mut errors = Vec::new();

    if profiles.len() > MAX_PROFILES {
        errors.push(format!("At most {} profiles are supported", MAX_PROFILES));
    }

    for (i, profile) in profiles.iter().enumerate() {
        if profile.name.is_empty() {
            errors.push(format!("profile {} has an empty name", i));
        }
        if profile.name.len() > MAX_PROFILE_NAME_LEN {
            errors.push(format!(
                "profile '{}' name longer than {} bytes",
                profile.name, MAX_PROFILE_NAME_LEN
            ));
        }
        if profile.name.contains(['"', '\\']) {
            errors.push(format!("profile {} name has quotes or backslashes", i));
        }
        if !(1..=MAX_SOAK_TEMPERATURE_C).contains(&profile.temperature_c) {
            errors.push(format!(
                "profile '{}' temperature_c must be 1-{}",
                profile.name, MAX_SOAK_TEMPERATURE_C
            ));
        }
        // u32 milliseconds hold a little over 71 000 minutes
        if !(1..=71_000).contains(&profile.duration_min) {
            errors.push(format!(
                "profile '{}' duration_min must be 1-71000",
                profile.name
            ));
        }
    }

    if !errors.is_empty() {
        fail("Invalid profile configuration", &errors);
    }
}

/// Write the validated configuration as Rust source into OUT_DIR
fn generate_config(config: &OvenFile) {
    let mut out = String::new();
    out.push_str("// Generated by build.rs from oven.toml. Do not edit.\n\n");

    out.push_str("/// Oven settings from oven.toml, defaults for omitted keys\n");
    out.push_str("pub fn oven_config() -> OvenConfig {\n    OvenConfig {\n");
    let oven = &config.oven;
    let fields = [
        ("room_temperature_c", oven.room_temperature_c),
        ("cool_min_c", oven.cool_min_c),
        ("sensor_period_ms", oven.sensor_period_ms),
        ("fault_threshold", oven.fault_threshold),
        ("debounce_ms", oven.debounce_ms),
        ("long_press_ms", oven.long_press_ms),
        ("window_ms", oven.window_ms),
        ("pid_sample_ms", oven.pid_sample_ms),
        ("complete_hold_ms", oven.complete_hold_ms),
    ];
    for (key, value) in fields {
        if let Some(v) = value {
            writeln!(out, "        {}: {},", key, v).unwrap();
        }
    }
    for (key, gains) in [
        ("preheat_gains", oven.preheat_gains),
        ("soak_gains", oven.soak_gains),
    ] {
        if let Some(g) = gains {
            writeln!(
                out,
                "        {}: PidGains::new({:?}_f32, {:?}_f32, {:?}_f32),",
                key, g.kp, g.ki, g.kd
            )
            .unwrap();
        }
    }
    out.push_str("        ..OvenConfig::default()\n    }\n}\n\n");

    out.push_str("/// Profiles from oven.toml, in selection order\n");
    out.push_str("pub const PROFILES: &[ProfileEntry] = &[\n");
    for profile in &config.profile {
        writeln!(
            out,
            "    ProfileEntry {{ name: \"{}\", soak_temperature_c: {}, soak_duration_ms: {} }},",
            profile.name,
            profile.temperature_c,
            profile.duration_min * 60_000
        )
        .unwrap();
    }
    out.push_str("];\n");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("oven_config.rs"), out).unwrap();
}
