//! Service Configuration Module
//!
//! Provides backend endpoints and retrieval tunables loaded from TOML files,
//! with environment overrides matching the deployment variables.
//!
//! ## Loading Order
//!
//! 1. `OILFIELD_CONFIG` environment variable (path to TOML file)
//! 2. `oilfield.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Environment overrides (`POSTGRES_*`, `DATABASE_URL`, `NEO4J_*`, `QDRANT_*`,
//! `OPENAI_API_KEY`, `LLM_*`) are applied on top of whichever source won.
//!
//! ## Usage
//!
//! The loaded config is an ordinary value. `main()` loads it once and hands
//! it to the constructors that need it:
//!
//! ```ignore
//! let config = AppConfig::load().with_env_overrides();
//! config.validate()?;
//! let retrievers = Retrievers::from_config(&config);
//! ```

mod app_config;
pub mod defaults;

pub use app_config::*;
