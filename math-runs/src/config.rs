//! JSON configuration for the runs estimator

use crate::error::{Result, RunsError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Experience needed to reach the maximum class level
pub const MAX_CLASS_EXPERIENCE: f64 = 569_809_640.0;

/// Experience gained per run by the class that was played
pub const OWN_CLASS_RATE: f64 = 362_000.0;

/// Experience gained per run by every class that was not played
pub const OTHER_CLASS_RATE: f64 = 89_000.0;

/// Classes in matrix order
pub const DEFAULT_CLASSES: [&str; 5] = ["mage", "tank", "healer", "berserker", "archer"];

/// Factorization used to solve the runs system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStrategy {
    /// Doolittle LU without pivoting
    #[default]
    Doolittle,
    /// LU with partial pivoting
    PartialPivoting,
}

/// Estimator configuration loaded from JSON
///
/// Every field is optional in the file; missing fields take the reference
/// values above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunsConfig {
    /// Experience cap every class should reach
    #[serde(default = "default_max_experience")]
    pub max_experience: f64,
    /// Experience per run for the played class
    #[serde(default = "default_own_class_rate")]
    pub own_class_rate: f64,
    /// Experience per run for each other class
    #[serde(default = "default_other_class_rate")]
    pub other_class_rate: f64,
    /// Class names, in matrix order
    #[serde(default = "default_classes")]
    pub classes: Vec<String>,
    /// Factorization to use
    #[serde(default)]
    pub strategy: SolverStrategy,
    /// Clamp negative per-class estimates to zero
    #[serde(default)]
    pub clamp_negative_runs: bool,
}

fn default_max_experience() -> f64 {
    MAX_CLASS_EXPERIENCE
}

fn default_own_class_rate() -> f64 {
    OWN_CLASS_RATE
}

fn default_other_class_rate() -> f64 {
    OTHER_CLASS_RATE
}

fn default_classes() -> Vec<String> {
    DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect()
}

impl Default for RunsConfig {
    fn default() -> Self {
        Self {
            max_experience: default_max_experience(),
            own_class_rate: default_own_class_rate(),
            other_class_rate: default_other_class_rate(),
            classes: default_classes(),
            strategy: SolverStrategy::default(),
            clamp_negative_runs: false,
        }
    }
}

impl RunsConfig {
    /// Parse and validate a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RunsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        log::debug!("Loaded runs configuration from {}", path.display());
        Self::from_json_str(&contents)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Check the cap, the rates and the class list
    pub fn validate(&self) -> Result<()> {
        if !self.max_experience.is_finite() || self.max_experience <= 0.0 {
            return Err(RunsError::InvalidConfig(format!(
                "max_experience must be finite and > 0, got {}",
                self.max_experience
            )));
        }
        check_rate("own_class_rate", self.own_class_rate)?;
        check_rate("other_class_rate", self.other_class_rate)?;

        if self.classes.is_empty() {
            return Err(RunsError::InvalidConfig("class list is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for class in &self.classes {
            if class.is_empty() {
                return Err(RunsError::InvalidConfig("empty class name".to_string()));
            }
            if !seen.insert(class.as_str()) {
                return Err(RunsError::InvalidConfig(format!(
                    "class '{}' is listed twice",
                    class
                )));
            }
        }
        Ok(())
    }
}

/// Rates must be strictly positive and finite
pub(crate) fn check_rate(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(RunsError::InvalidRate { name, value });
    }
    Ok(())
}
