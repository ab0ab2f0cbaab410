//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check uniqueness of controllers and application routes
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - The backend `admin` tree is checked later by the normalizer

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{AppConfig, MenuItemConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address \"{0}\"")]
    InvalidBindAddress(String),

    #[error("invalid base URL \"{0}\"")]
    InvalidBaseUrl(String),

    #[error("invalid metrics address \"{0}\"")]
    InvalidMetricsAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("at least one dashboard must be declared")]
    NoDashboards,

    #[error("controller \"{0}\" is declared more than once")]
    DuplicateController(String),

    #[error("CRUD controller \"{0}\" does not declare its entity")]
    MissingEntity(String),

    #[error("application route \"{0}\" is declared more than once")]
    DuplicateRoute(String),

    #[error("application route \"{name}\" has a path that does not start with '/': \"{path}\"")]
    InvalidRoutePath { name: String, path: String },

    #[error("menu item \"{label}\" has an unknown kind \"{kind}\"")]
    UnknownMenuItemKind { label: String, kind: String },
}

const MENU_ITEM_KINDS: [&str; 6] = ["dashboard", "crud", "route", "url", "section", "submenu"];

/// Validate the configuration, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if let Some(base_url) = &config.listener.base_url {
        if Url::parse(base_url).is_err() {
            errors.push(ValidationError::InvalidBaseUrl(base_url.clone()));
        }
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.dashboards.is_empty() {
        errors.push(ValidationError::NoDashboards);
    }

    let mut controllers = HashSet::new();
    for fqcn in config
        .dashboards
        .iter()
        .map(|d| &d.fqcn)
        .chain(config.cruds.iter().map(|c| &c.fqcn))
    {
        if !controllers.insert(fqcn) {
            errors.push(ValidationError::DuplicateController(fqcn.clone()));
        }
    }

    for crud in &config.cruds {
        if crud.entity.trim().is_empty() {
            errors.push(ValidationError::MissingEntity(crud.fqcn.clone()));
        }
    }

    let mut routes = HashSet::new();
    for route in &config.routes {
        if !routes.insert(&route.name) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        if !route.path.starts_with('/') {
            errors.push(ValidationError::InvalidRoutePath {
                name: route.name.clone(),
                path: route.path.clone(),
            });
        }
    }

    for dashboard in &config.dashboards {
        validate_menu(&dashboard.menu, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_menu(items: &[MenuItemConfig], errors: &mut Vec<ValidationError>) {
    for item in items {
        if !MENU_ITEM_KINDS.contains(&item.kind.as_str()) {
            errors.push(ValidationError::UnknownMenuItemKind {
                label: item.label.clone(),
                kind: item.kind.clone(),
            });
        }
        validate_menu(&item.items, errors);
    }
}
