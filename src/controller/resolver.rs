//! Resolves the handler of a matched request.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::Request;
use axum::response::Response;

use super::ControllerRegistry;
use crate::http::request::RequestAttributes;
use crate::routing::ControllerRef;

/// Request handler; runs synchronously once the admin context is built.
pub type Handler = Arc<dyn Fn(Request<Body>) -> Response + Send + Sync>;

/// Host controller resolver: maps the controller attribute of a request to a handler.
pub trait ControllerResolver: Send + Sync {
    fn get_controller(&self, parts: &Parts) -> Option<Handler>;
}

/// Handlers keyed by controller reference.
///
/// Lookup order: the full `Class::method` reference, then the class alone,
/// then the default handler of registered CRUD or dashboard controllers.
#[derive(Clone)]
pub struct HandlerRegistry {
    controllers: Arc<ControllerRegistry>,
    handlers: HashMap<String, Handler>,
    crud_handler: Option<Handler>,
    dashboard_handler: Option<Handler>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut controllers: Vec<&String> = self.handlers.keys().collect();
        controllers.sort();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &controllers)
            .field("crud_handler", &self.crud_handler.is_some())
            .field("dashboard_handler", &self.dashboard_handler.is_some())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new(controllers: Arc<ControllerRegistry>) -> Self {
        Self {
            controllers,
            handlers: HashMap::new(),
            crud_handler: None,
            dashboard_handler: None,
        }
    }

    /// Registers `handler` for a `Class::method` reference or a whole class.
    pub fn register<F>(mut self, controller: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Request<Body>) -> Response + Send + Sync + 'static,
    {
        self.handlers.insert(controller.into(), Arc::new(handler));
        self
    }

    /// Handler of every action of the registered CRUD controllers.
    pub fn with_crud_handler(mut self, handler: Handler) -> Self {
        self.crud_handler = Some(handler);
        self
    }

    pub fn with_dashboard_handler(mut self, handler: Handler) -> Self {
        self.dashboard_handler = Some(handler);
        self
    }

    pub fn resolve(&self, controller: &ControllerRef) -> Option<Handler> {
        if let Some(handler) = self
            .handlers
            .get(controller.as_str())
            .or_else(|| self.handlers.get(controller.class()))
        {
            return Some(handler.clone());
        }

        let class = controller.class();
        if self.controllers.crud(class).is_some() {
            return self.crud_handler.clone();
        }
        if self.controllers.dashboard(class).is_some() {
            return self.dashboard_handler.clone();
        }
        None
    }
}

impl ControllerResolver for HandlerRegistry {
    fn get_controller(&self, parts: &Parts) -> Option<Handler> {
        let controller = parts
            .extensions
            .get::<RequestAttributes>()?
            .controller
            .as_ref()?;
        let handler = self.resolve(controller);
        if handler.is_none() {
            tracing::debug!(controller = %controller, "No handler for controller");
        }
        handler
    }
}
