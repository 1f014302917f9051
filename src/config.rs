//! Configuration system for the flat world.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::senses::PopCode1D;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub agent: AgentConfig,
    pub body: BodyConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// World layout and materials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Grid width
    pub width: usize,
    /// Grid height
    pub height: usize,
    /// Material names; code 0 is always "Empty"
    pub materials: Vec<String>,
    /// Codes `1..=barrier_idx` block movement and peripheral vision
    pub barrier_idx: u8,
    /// Food cells placed by generation
    pub n_food: usize,
    /// Water cells placed by generation
    pub n_water: usize,
    /// Random interior wall segments placed by generation
    pub n_lines: usize,
    /// Maximum interior wall segment length
    pub max_line_len: usize,
    /// Pattern size `[y, x]` for material and action patterns
    pub pat_size: [usize; 2],
    /// Active units per generated pattern
    pub pat_on: usize,
    /// Optional saved world to load instead of generating one
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    /// Optional pattern dictionary (JSON) to load instead of generating one
    #[serde(default)]
    pub patterns: Option<PathBuf>,
}

/// Agent sensing and action set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Rotation step and peripheral ray spacing, degrees
    pub angle_inc: i32,
    /// Peripheral field of view, degrees (multiple of 2 * angle_inc)
    pub fov: i32,
    /// Foveal rays on each side of the center ray
    pub fovea_size: i32,
    /// Foveal ray spacing, degrees
    pub fovea_angle_inc: i32,
    /// Units per population code
    pub pop_size: usize,
    /// Population code for normalized depth
    pub depth_code: PopCode1D,
    /// Population code for drives, rotation and heading
    pub inter_code: PopCode1D,
    /// Interoceptive drives rendered into the `Inters` sense, in order
    pub inters: Vec<String>,
    /// Active action names; indices into this list are action indices
    pub actions: Vec<String>,
    /// Energy level at episode start
    pub init_energy: f32,
    /// Hydration level at episode start
    pub init_hydra: f32,
}

/// Time and action costs applied to the drives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyConfig {
    /// Energy and hydration lost every tick
    pub time_cost: f32,
    /// Cost of a move attempt
    pub move_cost: f32,
    /// Cost of a rotation
    pub rot_cost: f32,
    /// Extra cost of walking into a barrier
    pub bump_cost: f32,
    /// Energy gained by eating
    pub eat_value: f32,
    /// Hydration lost by eating
    pub eat_cost: f32,
    /// Hydration gained by drinking
    pub drink_value: f32,
    /// Energy lost by drinking
    pub drink_cost: f32,
}

/// Regrowth delays for consumed resources, in ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub food_refresh: u64,
    pub water_refresh: u64,
}

/// Reflex policy constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Urgency when facing a barrier
    pub wall_urgency: f32,
    /// Urgency when a wanted resource is directly in front
    pub eat_urgency: f32,
    /// Urgency when steering toward a close resource
    pub close_urgency: f32,
    /// Urgency when turning away from a close non-barrier object
    pub obstacle_urgency: f32,
    /// Drive level at or above which a resource is ignored in front
    pub satiety: f32,
    /// Normalized depth beyond which a target counts as far
    pub far_depth: f32,
    /// Normalized depth below which a foveal object counts as an obstacle
    pub near_depth: f32,
    /// Probability of a random turn while a target is far
    pub explore_turn_prob: f32,
    /// Probability of repeating the last action with no target
    pub repeat_prob: f32,
    /// Probability of turning with no target
    pub turn_prob: f32,
    /// Softmax gain for the left/right clearance choice
    pub softmax_gain: f32,
}

/// Trial/epoch/run structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Trials per epoch (0 = never wraps)
    pub trials_per_epoch: u64,
    /// Epochs per run (0 = never wraps)
    pub epochs_per_run: u64,
    /// Start a new episode when energy or hydration hits zero
    pub reset_on_depletion: bool,
}

/// Logging and statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Ticks between statistics snapshots
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            materials: ["Empty", "Wall", "Food", "Water", "FoodWas", "WaterWas"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            barrier_idx: 1,
            n_food: 50,
            n_water: 50,
            n_lines: 20,
            max_line_len: 20,
            pat_size: [5, 5],
            pat_on: 6,
            snapshot: None,
            patterns: None,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            angle_inc: 15,
            fov: 180,
            fovea_size: 1,
            fovea_angle_inc: 5,
            pop_size: 12,
            depth_code: PopCode1D::new(-0.2, 1.2),
            inter_code: PopCode1D::new(-0.2, 1.2),
            inters: ["Energy", "Hydra", "BumpPain", "FoodRew", "WaterRew"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            actions: ["Forward", "Left", "Right", "Eat", "Drink"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            init_energy: 1.0,
            init_hydra: 1.0,
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            time_cost: 0.001,
            move_cost: 0.002,
            rot_cost: 0.001,
            bump_cost: 0.01,
            eat_value: 0.9,
            eat_cost: 0.05,
            drink_value: 0.9,
            drink_cost: 0.05,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            food_refresh: 100,
            water_refresh: 100,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            wall_urgency: 1.0,
            eat_urgency: 1.0,
            close_urgency: 0.5,
            obstacle_urgency: 0.5,
            satiety: 0.9,
            far_depth: 0.7,
            near_depth: 0.25,
            explore_turn_prob: 0.1,
            repeat_prob: 0.5,
            turn_prob: 0.2,
            softmax_gain: 10.0,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            trials_per_epoch: 100,
            epochs_per_run: 100,
            reset_on_depletion: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 100,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        let a = &self.agent;
        if w.width < 2 || w.height < 2 {
            return Err(ConfigError::Invalid("world size must be at least 2x2".to_string()));
        }
        if w.materials.len() > u8::MAX as usize {
            return Err(ConfigError::Invalid("too many materials".to_string()));
        }
        if w.barrier_idx == 0 || w.barrier_idx as usize >= w.materials.len() {
            return Err(ConfigError::Invalid(
                "barrier_idx must name a material other than Empty".to_string(),
            ));
        }
        for required in ["Food", "Water", "FoodWas", "WaterWas"] {
            if !w.materials.iter().any(|m| m == required) {
                return Err(ConfigError::Invalid(format!("missing material {}", required)));
            }
        }
        if w.pat_size[0] == 0 || w.pat_size[1] == 0 {
            return Err(ConfigError::Invalid("pat_size must be non-zero".to_string()));
        }
        if w.pat_on > w.pat_size[0] * w.pat_size[1] {
            return Err(ConfigError::Invalid("pat_on exceeds pattern size".to_string()));
        }
        if a.angle_inc <= 0 || 360 % a.angle_inc != 0 {
            return Err(ConfigError::Invalid("angle_inc must divide 360".to_string()));
        }
        if a.fov <= 0 || a.fov > 360 || a.fov % (2 * a.angle_inc) != 0 {
            return Err(ConfigError::Invalid(
                "fov must be a positive multiple of 2 * angle_inc".to_string(),
            ));
        }
        if a.fovea_size < 0 || a.fovea_angle_inc <= 0 {
            return Err(ConfigError::Invalid("invalid fovea geometry".to_string()));
        }
        if a.pop_size < 2 {
            return Err(ConfigError::Invalid("pop_size must be at least 2".to_string()));
        }
        if a.actions.is_empty() {
            return Err(ConfigError::Invalid("at least one action is required".to_string()));
        }
        for name in &a.actions {
            if name.parse::<crate::body::Action>().is_err() {
                return Err(ConfigError::Invalid(format!("unknown action {}", name)));
            }
        }
        for name in &a.inters {
            if name.parse::<crate::body::Drive>().is_err() {
                return Err(ConfigError::Invalid(format!("unknown drive {}", name)));
            }
        }
        if self.logging.stats_interval == 0 {
            return Err(ConfigError::Invalid("stats_interval must be > 0".to_string()));
        }
        Ok(())
    }

    /// Number of peripheral rays
    pub fn n_rays(&self) -> usize {
        (self.agent.fov / self.agent.angle_inc) as usize + 1
    }

    /// Number of foveal rays
    pub fn n_fovea(&self) -> usize {
        (2 * self.agent.fovea_size + 1) as usize
    }
}

/// Errors that abort world setup
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
    Invalid(String),
    Snapshot(crate::snapshot::SnapshotError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::Snapshot(e) => write!(f, "World snapshot error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<crate::snapshot::SnapshotError> for ConfigError {
    fn from(e: crate::snapshot::SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}
