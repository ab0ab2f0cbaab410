//! Declarative routing attributes of dashboard and CRUD controllers.

use serde_json::{Map, Value};

/// Routing declaration of a dashboard controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminDashboard {
    pub route_path: Option<String>,
    pub route_name: Option<String>,
    pub route_options: RouteOptions,
    /// action → `{ "routePath": ..., "routeName": ... }`
    pub routes: Map<String, Value>,
    pub allowed_controllers: Option<Vec<String>>,
    pub denied_controllers: Option<Vec<String>>,
}

impl AdminDashboard {
    pub fn new(route_path: impl Into<String>, route_name: impl Into<String>) -> Self {
        Self {
            route_path: Some(route_path.into()),
            route_name: Some(route_name.into()),
            ..Self::default()
        }
    }

    /// Overrides the default route of `action` with a raw option mapping.
    pub fn with_route(mut self, action: impl Into<String>, options: Value) -> Self {
        self.routes.insert(action.into(), options);
        self
    }

    pub fn with_route_options(mut self, options: RouteOptions) -> Self {
        self.route_options = options;
        self
    }

    pub fn allow_controllers<I, S>(mut self, controllers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_controllers = Some(controllers.into_iter().map(Into::into).collect());
        self
    }

    pub fn deny_controllers<I, S>(mut self, controllers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denied_controllers = Some(controllers.into_iter().map(Into::into).collect());
        self
    }
}

/// Extra options of the dashboard route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteOptions {
    pub methods: Vec<String>,
    pub host: Option<String>,
    pub locale: Option<String>,
    pub defaults: Map<String, Value>,
}

/// Routing declaration of a CRUD controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminCrud {
    pub route_path: Option<String>,
    pub route_name: Option<String>,
}

impl AdminCrud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route_path(mut self, path: impl Into<String>) -> Self {
        self.route_path = Some(path.into());
        self
    }

    pub fn route_name(mut self, name: impl Into<String>) -> Self {
        self.route_name = Some(name.into());
        self
    }
}

/// Route declaration of one action of a CRUD controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAction {
    pub action: String,
    pub route_path: Option<String>,
    pub route_name: Option<String>,
    pub methods: Option<Vec<String>>,
}

impl AdminAction {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            route_path: None,
            route_name: None,
            methods: None,
        }
    }

    pub fn route_path(mut self, path: impl Into<String>) -> Self {
        self.route_path = Some(path.into());
        self
    }

    pub fn route_name(mut self, name: impl Into<String>) -> Self {
        self.route_name = Some(name.into());
        self
    }

    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }
}
