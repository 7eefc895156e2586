//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Planet and LOD settings.
    pub planet: PlanetConfig,
    /// Demo camera settings.
    pub camera: CameraConfig,
    /// Frame-loop settings.
    pub frame_loop: LoopConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Planet and terrain-LOD configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetConfig {
    /// Planet radius in meters.
    pub radius_m: f64,
    /// Split-box inflation factor; must exceed 1.0.
    pub split_factor: f64,
    /// Maximum quadtree depth.
    pub max_depth: u8,
}

/// Demo camera configuration: a simple orbital descent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting latitude in degrees.
    pub start_lat_deg: f64,
    /// Starting longitude in degrees.
    pub start_lon_deg: f64,
    /// Starting altitude above the surface in meters.
    pub start_altitude_m: f64,
    /// Descent rate in meters per second (0 = hold altitude).
    pub descent_rate_m_s: f64,
}

/// Frame-loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoopConfig {
    /// Fixed simulation tick rate in Hz.
    pub tick_rate: u32,
    /// Frames to run before exiting (0 = run until interrupted).
    pub max_frames: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Emit logs as JSON instead of human-readable lines.
    pub log_json: bool,
}

// --- Default implementations ---

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            radius_m: 6_371_000.0,
            split_factor: 1.2,
            max_depth: 19,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_lat_deg: 0.0,
            start_lon_deg: -90.0,
            start_altitude_m: 1_000_000.0,
            descent_rate_m_s: 2_000.0,
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            max_frames: 600,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::Parse)?;
            info!("loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            info!("created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::Write)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::Write)?;
        Ok(())
    }

    /// Reject values the engine cannot run with. Called after CLI
    /// overrides are applied, so a bad flag is caught the same as a bad
    /// file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.planet.radius_m > 0.0) {
            return Err(ConfigError::Invalid {
                field: "planet.radius_m",
                reason: format!("must be positive, got {}", self.planet.radius_m),
            });
        }
        if !(self.planet.split_factor > 1.0) {
            return Err(ConfigError::Invalid {
                field: "planet.split_factor",
                reason: format!("must exceed 1.0, got {}", self.planet.split_factor),
            });
        }
        if self.frame_loop.tick_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "frame_loop.tick_rate",
                reason: "must be at least 1 Hz".to_string(),
            });
        }
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::Parse)?;

        if &new_config != self {
            info!("config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
