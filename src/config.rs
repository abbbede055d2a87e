//! Batch settings.
//!
//! A config file is JSON; every field is optional:
//!
//! ```json
//! { "tolerances": [0.0001, 0.01], "max_cycles": 50000, "fail_fast": true }
//! ```
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simplification tolerances, in degrees. One output level each.
    pub tolerances: Vec<f64>,

    /// Most elementary cycles we'll enumerate in one component of an
    /// intersection graph before giving up on the country.
    pub max_cycles: usize,

    /// Abort the batch on the first country that fails, instead of skipping
    /// it.
    pub fail_fast: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            tolerances: vec![ 0.00001, 0.0001, 0.001, 0.01, 0.1 ],
            max_cycles: 100_000,
            fail_fast: false,
        }
    }
}

impl Config {
    /// Reads and validates a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerances.is_empty() {
            return Err(ConfigError::NoTolerances);
        }

        if let Some(&bad) = self.tolerances.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(ConfigError::InvalidTolerance(bad));
        }

        Ok(())
    }

    /// The smallest tolerance: the most detailed level.
    pub fn best_tolerance(&self) -> Option<f64> {
        self.tolerances.iter().cloned().reduce(f64::min)
    }

    /// Tolerances in ascending order, without duplicates.
    pub fn sorted_tolerances(&self) -> Vec<f64> {
        let mut ret = self.tolerances.clone();
        ret.sort_by(f64::total_cmp);
        ret.dedup();
        ret
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;

    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(5, config.tolerances.len());
        assert_eq!(Some(0.00001), config.best_tolerance());
        assert_eq!(100_000, config.max_cycles);
        assert!(!config.fail_fast);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{ "fail_fast": true }"#).unwrap();
        assert!(config.fail_fast);
        assert_eq!(Config::default().tolerances, config.tolerances);
    }

    #[test]
    fn sorted_tolerances_ascend() {
        let config = Config { tolerances: vec![ 0.1, 0.001, 0.1, 0.01 ], ..Config::default() };
        assert_eq!(vec![ 0.001, 0.01, 0.1 ], config.sorted_tolerances());
        assert_eq!(Some(0.001), config.best_tolerance());
    }

    #[test]
    fn rejects_negative_tolerance() {
        let config = Config { tolerances: vec![ 0.1, -1.0 ], ..Config::default() };
        match config.validate() {
            Err(ConfigError::InvalidTolerance(t)) => assert_eq!(-1.0, t),
            other => panic!("expected InvalidTolerance, got {:?}", other),
        }
    }

    #[test]
    fn rejects_empty_tolerances() {
        let config = Config { tolerances: vec![], ..Config::default() };
        match config.validate() {
            Err(ConfigError::NoTolerances) => {}
            other => panic!("expected NoTolerances, got {:?}", other),
        }
    }

    #[test]
    fn loads_file() {
        let mut path = env::temp_dir();
        path.push(format!("bordertopo-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "tolerances": [0.5], "max_cycles": 7 }"#).unwrap();

        let config = Config::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(vec![ 0.5 ], config.tolerances);
        assert_eq!(7, config.max_cycles);
        assert!(!config.fail_fast);
    }

    #[test]
    fn missing_file_names_path() {
        let err = Config::load("/nonexistent/bordertopo.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bordertopo.json"));
    }
}
