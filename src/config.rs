//! Configuration for the learning core.
//!
//! Policy constants (session streaks, retention delay, accuracy bands, review
//! intervals) are plain data with defaults, optionally overridden from a TOML
//! file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::MasteryLevel;

pub const CONFIG_ENV: &str = "JOHNY_CONFIG";
pub const DB_ENV: &str = "JOHNY_DB";

// Upper bounds keep every schedule date inside chrono's range.
const MAX_INTERVAL_DAYS: u32 = 36_500;
const MAX_RETENTION_WINDOW_DAYS: i64 = 3_650;
const MAX_SESSION_IDLE_MINUTES: i64 = 365 * 24 * 60;
const DEFAULT_CONFIG_NAME: &str = "config.toml";
const DEFAULT_DB_NAME: &str = "johny.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Student id used when none is given on the command line.
    pub student: String,
    /// Explicit database path; falls back to the platform config dir.
    pub database: Option<PathBuf>,
    pub mastery: MasteryPolicy,
    pub review: ReviewPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            student: "default".to_string(),
            database: None,
            mastery: MasteryPolicy::default(),
            review: ReviewPolicy::default(),
        }
    }
}

/// Rules governing level advancement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryPolicy {
    /// Number of most recent attempts in the rolling accuracy window.
    pub window_size: usize,
    /// Consecutive sessions at or above the next level's threshold.
    pub session_threshold: u32,
    /// Days between first meeting the streak criterion and the recall check.
    pub retention_window_days: i64,
    /// Idle time after which a new attempt starts a new session.
    pub session_idle_minutes: i64,
    /// Level at which a topic counts as learned for readiness and gap analysis.
    pub proficient_level: i32,
    pub thresholds: LevelThresholds,
}

impl Default for MasteryPolicy {
    fn default() -> Self {
        Self {
            window_size: 20,
            session_threshold: 3,
            retention_window_days: 7,
            session_idle_minutes: 60,
            proficient_level: MasteryLevel::Proficient.as_i32(),
            thresholds: LevelThresholds::default(),
        }
    }
}

impl MasteryPolicy {
    pub fn proficient(&self) -> MasteryLevel {
        MasteryLevel::from_i32(self.proficient_level)
    }
}

/// Lower accuracy bound of each level's band. Introduced has no bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelThresholds {
    pub developing: f64,
    pub proficient: f64,
    pub mastered: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            developing: 0.5,
            proficient: 0.7,
            mastered: 0.9,
        }
    }
}

impl LevelThresholds {
    /// Accuracy required to reach `level`.
    pub fn for_level(&self, level: MasteryLevel) -> f64 {
        match level {
            MasteryLevel::Unknown | MasteryLevel::Introduced => 0.0,
            MasteryLevel::Developing => self.developing,
            MasteryLevel::Proficient => self.proficient,
            MasteryLevel::Mastered => self.mastered,
        }
    }

    /// Descriptive band for an accuracy, ignoring advancement rules.
    pub fn classify(&self, accuracy: f64) -> MasteryLevel {
        if accuracy >= self.mastered {
            MasteryLevel::Mastered
        } else if accuracy >= self.proficient {
            MasteryLevel::Proficient
        } else if accuracy >= self.developing {
            MasteryLevel::Developing
        } else {
            MasteryLevel::Introduced
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewPolicy {
    /// Review interval per stage; the last entry repeats for all later stages.
    pub intervals_days: Vec<u32>,
    /// How many prerequisite steps a correct review credits; 0 turns it off.
    pub implicit_credit_depth: usize,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            intervals_days: vec![1, 3, 7, 14, 30],
            implicit_credit_depth: 2,
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Explicit path (flag or env) must exist; the default location is optional.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        if let Some(path) = default_config_path() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading default config");
                return Self::load(&path);
            }
        }
        Ok(Config::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.mastery;
        if m.window_size == 0 {
            return Err(ConfigError::Invalid("mastery.window_size must be at least 1".into()));
        }
        if m.session_threshold == 0 {
            return Err(ConfigError::Invalid(
                "mastery.session_threshold must be at least 1".into(),
            ));
        }
        if m.retention_window_days < 0 || m.session_idle_minutes < 0 {
            return Err(ConfigError::Invalid(
                "mastery durations must not be negative".into(),
            ));
        }
        if m.retention_window_days > MAX_RETENTION_WINDOW_DAYS {
            return Err(ConfigError::Invalid(format!(
                "mastery.retention_window_days must be at most {}",
                MAX_RETENTION_WINDOW_DAYS
            )));
        }
        if m.session_idle_minutes > MAX_SESSION_IDLE_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "mastery.session_idle_minutes must be at most {}",
                MAX_SESSION_IDLE_MINUTES
            )));
        }
        if !(1..=MasteryLevel::MAX.as_i32()).contains(&m.proficient_level) {
            return Err(ConfigError::Invalid(
                "mastery.proficient_level must be between 1 and 4".into(),
            ));
        }

        let t = &m.thresholds;
        let ascending = 0.0 < t.developing
            && t.developing < t.proficient
            && t.proficient < t.mastered
            && t.mastered <= 1.0;
        if !ascending {
            return Err(ConfigError::Invalid(format!(
                "mastery.thresholds must ascend within (0, 1], got {} / {} / {}",
                t.developing, t.proficient, t.mastered
            )));
        }

        if self.review.intervals_days.is_empty() {
            return Err(ConfigError::Invalid("review.intervals_days is empty".into()));
        }
        if self.review.intervals_days.contains(&0) {
            return Err(ConfigError::Invalid(
                "review.intervals_days entries must be at least one day".into(),
            ));
        }
        if self.review.intervals_days.iter().any(|&d| d > MAX_INTERVAL_DAYS) {
            return Err(ConfigError::Invalid(format!(
                "review.intervals_days entries must be at most {} days",
                MAX_INTERVAL_DAYS
            )));
        }

        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        if let Ok(path) = std::env::var(DB_ENV) {
            return PathBuf::from(path);
        }
        if let Some(path) = &self.database {
            return path.clone();
        }

        let dir = config_dir();
        std::fs::create_dir_all(&dir).ok();
        dir.join(DEFAULT_DB_NAME)
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("johny")
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("johny").join(DEFAULT_CONFIG_NAME))
}
