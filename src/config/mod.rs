//! Configuration loading and management for the payroll engine.
//!
//! This module loads the engine policy (payroll-type multipliers, context
//! defaults, parallelism threshold) from YAML, and optionally a concept
//! catalog and roster used to seed the in-memory collaborators.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Parallel threshold: {}", config.engine().parallel_threshold);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ConceptsFile, ContextDefaults, DEFAULT_PARALLEL_THRESHOLD, EngineConfig, WorkersFile,
};
