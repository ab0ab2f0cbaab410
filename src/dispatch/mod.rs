//! Request-time dispatch of admin routes.
//!
//! # Data Flow
//! ```text
//! Matched request (RequestAttributes with the admin marker)
//!     → AdminRouterSubscriber::on_request
//!         → self-heal the route cache if it is cold
//!         → resolve dashboard / CRUD controller / action
//!         → AdminContextFactory::create → Arc<AdminContext> extension
//!     → ControllerResolver (handler of the matched controller)
//!     → AdminRouterSubscriber::on_controller
//!         → `routeName` query? resolve_delegated_controller
//!         → handler of the delegated controller replaces the original
//! ```
//!
//! # Design Decisions
//! - Non-admin requests pass through untouched
//! - Context build failures propagate; delegation failures keep the original handler

mod delegate;
mod subscriber;

use thiserror::Error;

use crate::config::ResolveError;
use crate::routing::{RouteError, UrlGenerationError};

pub use delegate::resolve_delegated_controller;
pub use subscriber::AdminRouterSubscriber;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("the \"{0}\" dashboard controller is not registered")]
    UnknownDashboard(String),

    #[error("the \"{0}\" CRUD controller is not registered")]
    UnknownCrudController(String),

    #[error("the \"{controller}\" CRUD controller manages the \"{entity}\" entity, which has no metadata")]
    UnknownEntity { entity: String, controller: String },

    #[error(transparent)]
    Config(#[from] ResolveError),

    #[error(transparent)]
    Route(#[from] RouteError),
}

#[derive(Debug, Error)]
pub enum DelegateError {
    #[error(transparent)]
    UrlGeneration(#[from] UrlGenerationError),

    #[error("invalid delegated request: {0}")]
    InvalidRequest(String),

    #[error("no route matches the delegated URL \"{0}\"")]
    NotFound(String),
}
