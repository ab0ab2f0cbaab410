//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → user.rs (bearer key check, identity headers → AdminUser extension)
//!     → routing + dispatch
//!
//! While building a page:
//!     → authorization.rs (actions, menu items, entities filtered by role)
//!     → CsrfTokenManager (tokens embedded in batch action attributes)
//! ```
//!
//! # Design Decisions
//! - Authentication is delegated to the fronting proxy; its headers count only with its bearer key
//! - Denied actions and menu items are dropped silently, never reported as errors
//! - Token issuance stays behind a trait

pub mod authorization;
pub mod user;

pub use authorization::{
    permission, AuthSubject, AuthorizationChecker, RoleAuthorizationChecker, PUBLIC_ACCESS,
};
pub use user::{user_middleware, AdminUser, TrustedProxy};

/// Issues CSRF tokens for state-changing actions.
pub trait CsrfTokenManager: Send + Sync {
    fn token(&self, id: &str) -> String;
}
