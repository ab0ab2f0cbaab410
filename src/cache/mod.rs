//! Durable cache for derived routing data.
//!
//! # Data Flow
//! ```text
//! AdminRouteGenerator::generate_all
//!     → CacheStore::set(ROUTE_ATTRIBUTES_TO_NAME, ...)
//!     → CacheStore::set(ROUTE_NAME_TO_ATTRIBUTES, ...)   (written last)
//!
//! request path
//!     → CacheStore::get(...) → typed map → route name / attributes
//! ```
//!
//! # Design Decisions
//! - Values are `serde_json::Value`; typing happens at the call site
//! - A missing entry is a cache miss, never an error
//! - `MemoryCache` for a single process, `FileCache` to survive restarts

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use serde_json::Value;
use thiserror::Error;

/// Keys of the entries written by the route generator.
pub mod keys {
    /// route name → { dashboardControllerFqcn, crudControllerFqcn, crudAction }
    pub const ROUTE_NAME_TO_ATTRIBUTES: &str = "admin.routes.name_to_attributes";
    /// dashboard → crud controller ("" for none) → action ("" for none) → route name
    pub const ROUTE_ATTRIBUTES_TO_NAME: &str = "admin.routes.attributes_to_name";
    /// dashboard controller → dashboard route name
    pub const DASHBOARD_FQCN_TO_ROUTE: &str = "admin.routes.dashboard_to_route";
    /// crud controller → entity class
    pub const CRUD_FQCN_TO_ENTITY_FQCN: &str = "admin.controllers.crud_to_entity";
    /// entity class → [crud controller, ...]
    pub const ENTITY_FQCN_TO_CRUD_FQCN: &str = "admin.controllers.entity_to_crud";
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error for \"{key}\": {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cache entry \"{key}\" cannot be serialized: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value store shared by every request.
pub trait CacheStore: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value) -> Result<(), CacheError>;

    fn delete(&self, key: &str) -> Result<(), CacheError>;

    fn clear(&self) -> Result<(), CacheError>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
