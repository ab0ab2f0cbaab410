//! Request attributes and snapshots.
//!
//! # Responsibilities
//! - Carry the routing outcome (route, controller, params) as a request extension
//! - Mark requests routed through a generated admin route
//! - Capture the parts of a request the admin context needs
//!
//! # Design Decisions
//! - Attributes live in `Parts::extensions`, never in a global
//! - The admin marker is the presence of [`AdminRouteAttributes`], only set by generated routes
//! - Params merged later never overwrite existing ones

use axum::http::request::Parts;
use serde_json::{Map, Value};

use crate::http::query::{build_query, parse_query, scalar_to_string};
use crate::option;
use crate::routing::{AdminRouteAttributes, ControllerRef, RouteMatch};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Routing attributes attached to a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestAttributes {
    pub route: Option<String>,
    pub controller: Option<ControllerRef>,
    pub params: Map<String, Value>,
    pub admin: Option<AdminRouteAttributes>,
}

impl From<RouteMatch> for RequestAttributes {
    fn from(matched: RouteMatch) -> Self {
        Self {
            route: Some(matched.route),
            controller: Some(matched.controller),
            params: matched.params,
            admin: matched.admin,
        }
    }
}

impl RequestAttributes {
    /// True when the request was routed by a generated admin route.
    pub fn is_admin_route(&self) -> bool {
        self.admin.is_some()
    }

    pub fn dashboard(&self) -> Option<&str> {
        self.admin.as_ref().map(|a| a.dashboard.as_str())
    }

    pub fn crud_controller(&self) -> Option<&str> {
        self.admin.as_ref().and_then(|a| a.crud_controller.as_deref())
    }

    pub fn action(&self) -> Option<&str> {
        self.admin.as_ref().and_then(|a| a.action.as_deref())
    }

    pub fn entity_id(&self) -> Option<String> {
        self.params.get(option::ENTITY_ID).and_then(scalar_to_string)
    }

    pub fn locale(&self) -> Option<&str> {
        self.params.get(option::LOCALE).and_then(Value::as_str)
    }

    /// Adds `params`; existing keys keep their value.
    pub fn merge_params(&mut self, params: &Map<String, Value>) {
        for (key, value) in params {
            if !self.params.contains_key(key) {
                self.params.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Immutable copy of the request data used to build the admin context.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSnapshot {
    pub method: String,
    pub path: String,
    pub query: Map<String, Value>,
    pub attributes: RequestAttributes,
    pub request_id: Option<String>,
}

impl RequestSnapshot {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.as_str().to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(parse_query).unwrap_or_default(),
            attributes: parts
                .extensions
                .get::<RequestAttributes>()
                .cloned()
                .unwrap_or_default(),
            request_id: parts
                .headers
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    pub fn query_str(&self, key: &str) -> Option<&str> {
        self.query.get(key).and_then(Value::as_str)
    }

    /// Path and query string of the request.
    pub fn uri(&self) -> String {
        let query = build_query(&self.query);
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, query)
        }
    }
}
