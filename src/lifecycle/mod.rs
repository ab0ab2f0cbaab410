//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Warm up backend config → Register controllers
//!         → Generate routes → Wire kernel → (caller) bind listener
//!
//! Shutdown (http/server.rs):
//!     Ctrl+C → stop accepting → drain in-flight requests → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routes, then the request pipeline
//! - Configuration mistakes surface before the listener binds

pub mod startup;

pub use startup::{controllers_from_config, AdminApp, StartupError};
