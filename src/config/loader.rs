//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! policy, and optionally a concept catalog and roster, from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::{Concept, Worker};

use super::types::{ConceptsFile, EngineConfig, WorkersFile};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml     # Multipliers, context defaults, parallel threshold
/// ├── concepts.yaml   # Optional concept catalog
/// └── workers.yaml    # Optional roster
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("{} concepts configured", loader.concepts().len());
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    engine: EngineConfig,
    concepts: Vec<Concept>,
    workers: Vec<Worker>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns `ConfigNotFound` if `engine.yaml` is missing and
    /// `ConfigParseError` if any present file is not valid.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine = Self::load_yaml::<EngineConfig>(&path.join("engine.yaml"))?;

        let concepts_path = path.join("concepts.yaml");
        let concepts = if concepts_path.exists() {
            Self::load_yaml::<ConceptsFile>(&concepts_path)?.concepts
        } else {
            Vec::new()
        };

        let workers_path = path.join("workers.yaml");
        let workers = if workers_path.exists() {
            Self::load_yaml::<WorkersFile>(&workers_path)?.workers
        } else {
            Vec::new()
        };

        tracing::debug!(
            path = %path.display(),
            concepts = concepts.len(),
            workers = workers.len(),
            "Loaded payroll configuration"
        );

        Ok(Self {
            engine,
            concepts,
            workers,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the engine policy.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Returns the configured concepts, active or not.
    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    /// Returns the configured workers, active or not.
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Splits the loader into its parts.
    pub fn into_parts(self) -> (EngineConfig, Vec<Concept>, Vec<Worker>) {
        (self.engine, self.concepts, self.workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalculationRule, ConceptType, PayrollType};
    use rust_decimal::Decimal;

    const CONFIG_DIR: &str = "./config/default";

    #[test]
    fn test_load_default_config() {
        let loader = ConfigLoader::load(CONFIG_DIR).expect("Failed to load config");
        assert_eq!(
            loader.engine().multiplier(PayrollType::SeveranceAccrual),
            Decimal::new(117, 2)
        );
        assert_eq!(loader.engine().defaults.worked_days, Decimal::from(30));
        assert!(!loader.concepts().is_empty());
        assert!(!loader.workers().is_empty());
    }

    #[test]
    fn test_default_catalog_contains_pension_deduction() {
        let loader = ConfigLoader::load(CONFIG_DIR).unwrap();
        let afp = loader
            .concepts()
            .iter()
            .find(|c| c.code == "AFP")
            .expect("AFP concept");
        assert_eq!(afp.concept_type, ConceptType::Deduction);
        assert_eq!(
            afp.rule,
            CalculationRule::Percentage {
                percentage_rate: Some(Decimal::from(10))
            }
        );
    }

    #[test]
    fn test_missing_directory_returns_config_not_found() {
        let result = ConfigLoader::load("./config/does-not-exist");
        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.ends_with("engine.yaml"));
            }
            other => panic!("Expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_into_parts() {
        let loader = ConfigLoader::load(CONFIG_DIR).unwrap();
        let concept_count = loader.concepts().len();
        let (engine, concepts, workers) = loader.into_parts();
        assert_eq!(concepts.len(), concept_count);
        assert!(engine.parallel_threshold > 0);
        assert!(!workers.is_empty());
    }
}
