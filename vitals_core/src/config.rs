//! Configuration file support for Vitals.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/vitals/config.toml`.

use crate::history::DEFAULT_BMI_HISTORY_CAP;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the user database inside the data directory
pub const USERS_FILE: &str = "users.json";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub limits: Limits,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl DataConfig {
    /// Path of the user database file
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(USERS_FILE)
    }
}

/// Inclusive numeric range used for input validation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Validate `value`, naming the field in the error
    pub fn check(&self, field: &str, value: f64, unit: &str) -> Result<f64> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(Error::validation(format!(
                "{} must be between {}-{}{} (got {})",
                field, self.min, self.max, unit, value
            )))
        }
    }
}

/// Plausible ranges for user-entered values
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_height_cm")]
    pub height_cm: Bounds,

    #[serde(default = "default_weight_kg")]
    pub weight_kg: Bounds,

    #[serde(default = "default_age")]
    pub age: Bounds,

    #[serde(default = "default_sleep_hours")]
    pub sleep_hours: Bounds,

    #[serde(default = "default_water_cups")]
    pub water_cups: Bounds,

    #[serde(default = "default_mood")]
    pub mood: Bounds,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            height_cm: default_height_cm(),
            weight_kg: default_weight_kg(),
            age: default_age(),
            sleep_hours: default_sleep_hours(),
            water_cups: default_water_cups(),
            mood: default_mood(),
        }
    }
}

/// Account rules
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: default_min_password_len(),
        }
    }
}

/// Report and history parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_window_days")]
    pub window_days: usize,

    #[serde(default = "default_bmi_history_cap")]
    pub bmi_history_cap: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            bmi_history_cap: default_bmi_history_cap(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("vitals")
}

fn default_height_cm() -> Bounds {
    Bounds::new(50.0, 250.0)
}

fn default_weight_kg() -> Bounds {
    Bounds::new(20.0, 300.0)
}

fn default_age() -> Bounds {
    Bounds::new(1.0, 120.0)
}

fn default_sleep_hours() -> Bounds {
    Bounds::new(0.0, 24.0)
}

fn default_water_cups() -> Bounds {
    Bounds::new(0.0, 50.0)
}

fn default_mood() -> Bounds {
    Bounds::new(1.0, 5.0)
}

fn default_min_password_len() -> usize {
    6
}

fn default_window_days() -> usize {
    7
}

fn default_bmi_history_cap() -> usize {
    DEFAULT_BMI_HISTORY_CAP
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("vitals").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject settings no input could ever satisfy
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("height_cm", &self.limits.height_cm),
            ("weight_kg", &self.limits.weight_kg),
            ("age", &self.limits.age),
            ("sleep_hours", &self.limits.sleep_hours),
            ("water_cups", &self.limits.water_cups),
            ("mood", &self.limits.mood),
        ];
        for (name, bounds) in limits {
            if bounds.min.is_nan() || bounds.max.is_nan() || bounds.min > bounds.max {
                return Err(Error::Config(format!(
                    "limits.{}: min {} exceeds max {}",
                    name, bounds.min, bounds.max
                )));
            }
        }
        if self.limits.height_cm.min <= 0.0 {
            return Err(Error::Config("limits.height_cm.min must be positive".into()));
        }
        if self.reports.window_days == 0 {
            return Err(Error::Config("reports.window_days must be at least 1".into()));
        }
        if self.reports.bmi_history_cap == 0 {
            return Err(Error::Config(
                "reports.bmi_history_cap must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.height_cm, Bounds::new(50.0, 250.0));
        assert_eq!(config.limits.weight_kg, Bounds::new(20.0, 300.0));
        assert_eq!(config.auth.min_password_len, 6);
        assert_eq!(config.reports.window_days, 7);
        assert_eq!(config.reports.bmi_history_cap, 10);
        assert!(config.data.users_path().ends_with("vitals/users.json"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.reports.window_days = 14;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.reports.window_days, 14);
        assert_eq!(loaded.limits.water_cups, config.limits.water_cups);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[limits]
height_cm = { min = 100.0, max = 220.0 }
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.limits.height_cm, Bounds::new(100.0, 220.0));
        assert_eq!(config.limits.weight_kg, Bounds::new(20.0, 300.0)); // default
        assert_eq!(config.auth.min_password_len, 6); // default
        assert_eq!(config.reports.bmi_history_cap, DEFAULT_BMI_HISTORY_CAP); // default
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\nmood = { min = 5.0, max = 1.0 }\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_bounds_check() {
        let bounds = Bounds::new(0.0, 24.0);
        assert_eq!(bounds.check("Sleep hours", 8.0, "h").unwrap(), 8.0);
        assert!(bounds.check("Sleep hours", 24.5, "h").is_err());
        assert!(bounds.check("Sleep hours", f64::NAN, "h").is_err());
    }
}
