//! Configuration loading and typed config structures for the Estate engine.
//!
//! The canonical configuration lives in `estate-config.yaml` at the project
//! root. Each section mirrors one struct below, and every field has a default
//! so a partial (or empty) file is valid. The engine sections reuse the
//! tuning structs of the crates that own them.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use estate_engines::{ExplorationConfig, MarketConfig, TenantConfig};
use estate_notify::NotificationConfig;
use estate_types::{Difficulty, GameTime};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `estate-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// New-game and tick settings.
    #[serde(default)]
    pub game: GameConfig,

    /// Tenant engine tuning.
    #[serde(default)]
    pub tenants: TenantConfig,

    /// Market engine tuning.
    #[serde(default)]
    pub market: MarketConfig,

    /// Exploration engine tuning.
    #[serde(default)]
    pub exploration: ExplorationConfig,

    /// Notification defaults for new players.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Save directory and autosave slot.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Run length and pacing of the tick loop.
    #[serde(default)]
    pub simulation: RunConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `ESTATE_SAVE_DIR` overrides `persistence.save_dir` when set.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.persistence.apply_env_overrides();
        Ok(config)
    }
}

/// New-game settings and per-tick behavior of the orchestrator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Name of the player created for a new game.
    #[serde(default = "default_player_name")]
    pub player_name: String,

    /// Seed for every random draw in the simulation.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated instant at which a new game begins.
    #[serde(default = "default_start_date")]
    pub start_date: DateTime<Utc>,

    /// Simulated hours covered by one tick.
    #[serde(default = "default_hours_per_tick")]
    pub hours_per_tick: u64,

    /// Difficulty of a new game.
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,

    /// Ticks between autosaves; 0 disables autosave.
    #[serde(default = "default_autosave_interval_ticks")]
    pub autosave_interval_ticks: u64,

    /// Seed a new game with a property, tenants, and a stocked market.
    #[serde(default = "default_true")]
    pub starter_world: bool,

    /// Upper bound on reaction rounds per tick.
    #[serde(default = "default_max_cascade_rounds")]
    pub max_cascade_rounds: u32,

    /// Ticks between notification archive sweeps.
    #[serde(default = "default_notification_sweep_interval_ticks")]
    pub notification_sweep_interval_ticks: u64,

    /// Energy restored to the player at every day rollover, up to the cap.
    #[serde(default = "default_energy_regen_per_day")]
    pub energy_regen_per_day: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_name: default_player_name(),
            seed: default_seed(),
            start_date: default_start_date(),
            hours_per_tick: default_hours_per_tick(),
            difficulty: default_difficulty(),
            autosave_interval_ticks: default_autosave_interval_ticks(),
            starter_world: true,
            max_cascade_rounds: default_max_cascade_rounds(),
            notification_sweep_interval_ticks: default_notification_sweep_interval_ticks(),
            energy_regen_per_day: default_energy_regen_per_day(),
        }
    }
}

/// Where saves go.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Directory holding one JSON file per save slot.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Slot written by autosave and read by `resume`.
    #[serde(default = "default_autosave_slot")]
    pub autosave_slot: String,

    /// Load the autosave slot on startup if it exists.
    #[serde(default)]
    pub resume: bool,
}

impl PersistenceConfig {
    /// Override the save directory with `ESTATE_SAVE_DIR` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ESTATE_SAVE_DIR") {
            self.save_dir = PathBuf::from(val);
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            autosave_slot: default_autosave_slot(),
            resume: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Run length and pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Stop after this many ticks; 0 runs until interrupted.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Real-time milliseconds between ticks; 0 runs as fast as possible.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_player_name() -> String {
    String::from("Landlord")
}

const fn default_seed() -> u64 {
    42
}

fn default_start_date() -> DateTime<Utc> {
    GameTime::default().start
}

const fn default_hours_per_tick() -> u64 {
    1
}

const fn default_difficulty() -> Difficulty {
    Difficulty::Normal
}

const fn default_autosave_interval_ticks() -> u64 {
    24
}

const fn default_true() -> bool {
    true
}

const fn default_max_cascade_rounds() -> u32 {
    8
}

const fn default_notification_sweep_interval_ticks() -> u64 {
    24
}

const fn default_energy_regen_per_day() -> u32 {
    25
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("saves")
}

fn default_autosave_slot() -> String {
    String::from("autosave")
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_max_ticks() -> u64 {
    720
}

const fn default_tick_interval_ms() -> u64 {
    0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.game.seed, 42);
        assert_eq!(config.game.hours_per_tick, 1);
        assert_eq!(config.game.autosave_interval_ticks, 24);
        assert!(config.game.starter_world);
        assert_eq!(config.persistence.autosave_slot, "autosave");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.tenants, TenantConfig::default());
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r#"
game:
  player_name: "Morgan"
  seed: 7
  start_date: "2030-06-01T09:00:00Z"
  hours_per_tick: 6
  difficulty: hard

exploration:
  target_available: 5

notifications:
  max_notifications: 20

simulation:
  max_ticks: 100
  tick_interval_ms: 250
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.game.player_name, "Morgan");
        assert_eq!(config.game.seed, 7);
        assert_eq!(config.game.hours_per_tick, 6);
        assert_eq!(config.game.difficulty, Difficulty::Hard);
        assert_eq!(config.game.start_date.to_rfc3339(), "2030-06-01T09:00:00+00:00");
        assert_eq!(config.exploration.target_available, 5);
        assert_eq!(config.notifications.max_notifications, 20);
        assert_eq!(config.simulation.max_ticks, 100);
        // Untouched sections keep their defaults.
        assert_eq!(config.market, MarketConfig::default());
        assert_eq!(config.game.max_cascade_rounds, 8);
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config.game, GameConfig::default());
        assert_eq!(config.simulation, RunConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = SimulationConfig::parse("game: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn load_repository_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../estate-config.yaml");
        let config = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(config.game.seed, 42);
        assert!(config.game.hours_per_tick > 0);
    }
}
