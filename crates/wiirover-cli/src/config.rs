//! Configuration vault – reads/writes `~/.wiirover/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use wiirover_hal::SPEED_OF_SOUND_MPS;
use wiirover_runtime::RoverConfig;

/// Persisted configuration stored in `~/.wiirover/config.toml`.
///
/// The rover sections (`drive`, `proximity`, `stick`, `actuation_range`,
/// `fault_policy`) sit at the top level of the file next to the CLI's own
/// settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub rover: RoverConfig,

    /// Speed of sound used to turn `/echo` round-trip times into meters.
    #[serde(default = "default_speed_of_sound")]
    pub speed_of_sound_mps: f64,
}

fn default_speed_of_sound() -> f64 {
    SPEED_OF_SOUND_MPS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rover: RoverConfig::default(),
            speed_of_sound_mps: default_speed_of_sound(),
        }
    }
}

/// Return the path to `~/.wiirover/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".wiirover").join("config.toml")
}

/// Load the config from disk and apply `WIIROVER_*` overrides.  Returns
/// `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `WIIROVER_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `WIIROVER_DEAD_ZONE` | `drive.dead_zone` |
/// | `WIIROVER_ACTUATION_RANGE` | `actuation_range` |
/// | `WIIROVER_SPEED_OF_SOUND` | `speed_of_sound_mps` |
///
/// Values that do not parse as numbers are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Some(v) = env_f64("WIIROVER_DEAD_ZONE") {
        cfg.rover.drive.dead_zone = v;
    }
    if let Some(v) = env_f64("WIIROVER_ACTUATION_RANGE") {
        cfg.rover.actuation_range = v;
    }
    if let Some(v) = env_f64("WIIROVER_SPEED_OF_SOUND") {
        cfg.speed_of_sound_mps = v;
    }
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Save the config to disk, creating `~/.wiirover/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
