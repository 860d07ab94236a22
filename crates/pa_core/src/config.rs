//! # Scan Configuration
//!
//! `ScanConfig` holds the tunables shared by every analysis: anchor modulus,
//! index range, search caps and predictor thresholds.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ScanConfig::load("runs/mod210.yaml")?;
//! let report = correction::scan(&table, &config)?;
//! ```
//!
//! Files ending in `.yaml`/`.yml` are parsed as YAML, everything else as
//! JSON. Missing fields take their defaults.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fs};

pub const CONFIG_PATH_ENV: &str = "PA_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Anchor modulus (default: 210)
    pub modulus: u64,
    /// First prime index examined; small primes are irregular (default: 10)
    pub start_index: usize,
    /// Number of indices to examine; `None` = as many as the table allows
    pub count: Option<usize>,
    /// Correction radius cap (default: 25)
    pub max_radius: usize,
    /// Nearest-prime search cap around an anchor (default: 2000)
    pub max_distance: u64,
    /// Lookahead candidates per prediction (default: 10)
    pub window: usize,
    /// Messiness below this is "clean" (default: 3.0)
    pub clean_threshold: f64,
    /// Messiness above this is "messy" (default: 20.0)
    pub messy_threshold: f64,
    /// Clean candidates considered by the pool tie-breaker (default: 4)
    pub depth_threshold: usize,
    /// Gap range searched by the pool generator (default: 210)
    pub pool_width: u64,
    /// Log progress every N items (default: 1,000,000)
    pub progress_interval: usize,
    /// Use rayon for whole-table scans (default: true)
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            modulus: 210,
            start_index: 10,
            count: None,
            max_radius: 25,
            max_distance: 2000,
            window: 10,
            clean_threshold: 3.0,
            messy_threshold: 20.0,
            depth_threshold: 4,
            pool_width: 210,
            progress_interval: 1_000_000,
            parallel: true,
        }
    }
}

impl ScanConfig {
    /// Load and validate a JSON or YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            Self::from_yaml(&content)?
        } else {
            Self::from_json(&content)?
        };
        log::debug!("Loaded scan config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScanConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ScanConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Config from `PA_CONFIG_PATH`, or defaults when the variable is unset.
    pub fn from_env() -> Result<Self> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };
        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }
        Self::load(path).map_err(|e| {
            CoreError::Config(format!("{CONFIG_PATH_ENV}='{path}': {e}"))
        })
    }

    /// Validate configuration bounds
    pub fn validate(&self) -> Result<()> {
        if self.modulus < 2 || self.modulus % 2 != 0 {
            return Err(CoreError::Config(format!(
                "modulus must be an even number >= 2, got {}",
                self.modulus
            )));
        }
        if self.max_radius == 0 || self.max_radius > 1000 {
            return Err(CoreError::Config(format!(
                "max_radius must be 1-1000, got {}",
                self.max_radius
            )));
        }
        if self.max_distance == 0 || self.max_distance > 100_000 {
            return Err(CoreError::Config(format!(
                "max_distance must be 1-100000, got {}",
                self.max_distance
            )));
        }
        if self.window == 0 || self.window > 64 {
            return Err(CoreError::Config(format!(
                "window must be 1-64, got {}",
                self.window
            )));
        }
        if self.clean_threshold >= self.messy_threshold {
            return Err(CoreError::Config(format!(
                "clean_threshold ({}) must be below messy_threshold ({})",
                self.clean_threshold, self.messy_threshold
            )));
        }
        if self.progress_interval == 0 {
            return Err(CoreError::Config(
                "progress_interval must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The mod-6 control run for the correction scan.
    pub fn mod6_control() -> Self {
        Self {
            modulus: 6,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_validate() {
        assert!(ScanConfig::default().validate().is_ok());
        assert!(ScanConfig::mod6_control().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<()> {
        let config = ScanConfig::from_json(r#"{"modulus": 30, "max_radius": 12}"#)?;
        assert_eq!(config.modulus, 30);
        assert_eq!(config.max_radius, 12);
        assert_eq!(config.window, 10);
        Ok(())
    }

    #[test]
    fn test_bounds() {
        assert!(ScanConfig::from_json(r#"{"modulus": 7}"#).is_err());
        assert!(ScanConfig::from_json(r#"{"max_radius": 0}"#).is_err());
        assert!(ScanConfig::from_json(r#"{"window": 65}"#).is_err());
        assert!(
            ScanConfig::from_json(r#"{"clean_threshold": 30.0, "messy_threshold": 20.0}"#)
                .is_err()
        );
    }

    #[test]
    fn test_load_yaml_by_extension() -> Result<()> {
        let mut file = Builder::new().suffix(".yaml").tempfile()?;
        writeln!(file, "modulus: 6\nparallel: false\ncount: 5000")?;
        let config = ScanConfig::load(file.path())?;
        assert_eq!(config.modulus, 6);
        assert!(!config.parallel);
        assert_eq!(config.count, Some(5000));
        Ok(())
    }
}
