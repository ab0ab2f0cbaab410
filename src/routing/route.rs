//! Route definitions shared by the generator and the route table.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::option;

/// Reference to a controller method, written `Class::method`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControllerRef(String);

impl ControllerRef {
    pub fn new(class: &str, method: &str) -> Self {
        Self(format!("{class}::{method}"))
    }

    pub fn parse(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn class(&self) -> &str {
        self.0
            .rsplit_once("::")
            .map_or(self.0.as_str(), |(class, _)| class)
    }

    pub fn method(&self) -> Option<&str> {
        self.0.rsplit_once("::").map(|(_, method)| method)
    }
}

impl fmt::Display for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Admin attributes carried by every generated route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdminRouteAttributes {
    #[serde(rename = "dashboardControllerFqcn")]
    pub dashboard: String,
    #[serde(rename = "crudControllerFqcn")]
    pub crud_controller: Option<String>,
    #[serde(rename = "crudAction")]
    pub action: Option<String>,
}

impl AdminRouteAttributes {
    pub fn dashboard(dashboard: impl Into<String>) -> Self {
        Self {
            dashboard: dashboard.into(),
            crud_controller: None,
            action: None,
        }
    }

    pub fn crud(dashboard: impl Into<String>, crud: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            dashboard: dashboard.into(),
            crud_controller: Some(crud.into()),
            action: Some(action.into()),
        }
    }

    /// The attributes as route parameters.
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert(
            option::DASHBOARD_CONTROLLER_FQCN.to_string(),
            Value::String(self.dashboard.clone()),
        );
        params.insert(
            option::CRUD_CONTROLLER_FQCN.to_string(),
            self.crud_controller.clone().map_or(Value::Null, Value::String),
        );
        params.insert(
            option::CRUD_ACTION.to_string(),
            self.action.clone().map_or(Value::Null, Value::String),
        );
        params
    }
}

/// A named path pattern bound to a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    /// Path with `{param}` placeholders.
    pub path: String,
    /// Upper-case method names; empty allows any method.
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub host: Option<String>,
    pub controller: ControllerRef,
    #[serde(default)]
    pub defaults: Map<String, Value>,
    /// Present only on routes created by the admin route generator.
    #[serde(default)]
    pub admin: Option<AdminRouteAttributes>,
}

impl Route {
    pub fn new(name: impl Into<String>, path: impl Into<String>, controller: ControllerRef) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            methods: Vec::new(),
            host: None,
            controller,
            defaults: Map::new(),
            admin: None,
        }
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| m.as_ref().to_ascii_uppercase())
            .collect();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn with_admin(mut self, attributes: AdminRouteAttributes) -> Self {
        self.admin = Some(attributes);
        self
    }

    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}

/// Ordered set of routes; adding a route with an existing name replaces it in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteCollection {
    routes: Vec<Route>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, route: Route) {
        match self.routes.iter_mut().find(|r| r.name == route.name) {
            Some(existing) => *existing = route,
            None => self.routes.push(route),
        }
    }

    pub fn extend(&mut self, other: RouteCollection) {
        for route in other.routes {
            self.add(route);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl IntoIterator for RouteCollection {
    type Item = Route;
    type IntoIter = std::vec::IntoIter<Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}

impl<'a> IntoIterator for &'a RouteCollection {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
