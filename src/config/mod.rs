//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! AppConfig.admin (raw backend tree)
//!     → manager.rs (lazy, resolved once)
//!         → normalizer.rs (shorthands → canonical tree)
//!         → defaults.rs (disabled_actions, per-view actions)
//!     → EntityConfig lookups by name / class
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Backend tree mistakes are fatal and surface at warm-up, before the listener binds

pub mod defaults;
pub mod loader;
pub mod manager;
pub mod normalizer;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use manager::{ConfigManager, ConfigPass, EntityConfig, FieldConfig, ResolveError, ViewConfig};
pub use normalizer::NormalizeError;
pub use schema::AppConfig;
pub use schema::CrudConfig;
pub use schema::DashboardConfig;
