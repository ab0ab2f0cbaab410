//! Administration panel generator.
//!
//! From entity descriptions and per-view field/action configuration this crate
//! produces CRUD routes, menus, actions and fields, and dispatches each
//! generated route to a CRUD controller action or an application action.

// Configuration and routing
pub mod cache;
pub mod config;
pub mod naming;
pub mod option;
pub mod routing;

// Request pipeline
pub mod context;
pub mod controller;
pub mod dispatch;
pub mod http;

// Page building blocks
pub mod action;
pub mod entity;
pub mod field;
pub mod i18n;
pub mod menu;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::AdminApp;
