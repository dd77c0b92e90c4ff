//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`ARBOR_SECTION__KEY`)

use arbor_physics::KinematicConfig;
use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Frame loop configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`ARBOR_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Optional
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // ARBOR_PHYSICS__GRAVITY=500 -> physics.gravity = 500
        figment = figment.merge(Env::prefixed("ARBOR_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Fixed-step frame loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Physics step length in seconds
    pub fixed_timestep: f32,
    /// Maximum physics steps per frame
    pub max_substeps: u32,
    /// Longest frame time accepted before clamping (seconds)
    pub max_frame_time: f32,
    /// Number of frames the headless demo runs
    pub frames: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 5,
            max_frame_time: 0.25,
            frames: 600,
        }
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Floor probe distance and upward-floor tolerance (units)
    pub floor_tolerance: f32,
    /// Gravity (positive = downward)
    pub gravity: f32,
    /// Initial upward speed of a jump
    pub jump_velocity: f32,
    /// Horizontal walking speed
    pub walk_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            floor_tolerance: 1.0,
            gravity: 900.0,
            jump_velocity: 300.0,
            walk_speed: 90.0,
        }
    }
}

impl PhysicsConfig {
    /// Settings handed to the graph's kinematic kernel
    pub fn to_kinematic_config(&self) -> KinematicConfig {
        KinematicConfig::new(self.floor_tolerance)
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Log every draw request at debug level
    pub log_draw_requests: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_draw_requests: false,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
