//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Generation (at startup):
//!     ControllerRegistry (dashboards, CRUD controllers)
//!     → generator.rs (validate declarations, build routes)
//!     → RouteCollection + cached lookup maps
//!     → table.rs (compile path patterns, freeze as RouteTable)
//!
//! Incoming Request (host, method, path)
//!     → table.rs (route lookup)
//!     → matcher.rs (evaluate host / method / path conditions)
//!     → Return: RouteMatch or None
//!
//! URL Generation:
//!     url.rs (AdminUrlGenerator: dashboard / controller / action / entity id)
//!     → generator.rs (attributes → route name, from cache)
//!     → table.rs (route name + params → path and query)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (insertion order)

pub mod generator;
pub mod matcher;
pub mod route;
pub mod table;
pub mod url;

pub use generator::{AdminRouteGenerator, RouteError};
pub use route::{AdminRouteAttributes, ControllerRef, Route, RouteCollection};
pub use table::{
    RequestMatcher, RouteHint, RouteMatch, RouteTable, UrlGenerationError, UrlGenerator, UrlReference,
};
pub use url::AdminUrlGenerator;
