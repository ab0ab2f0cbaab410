//! Request and controller hooks of admin routes.

use std::sync::Arc;

use axum::http::request::Parts;
use axum::http::Request;
use serde_json::{Map, Value};

use super::{resolve_delegated_controller, DispatchError};
use crate::action::INDEX;
use crate::context::{AdminContext, AdminContextFactory};
use crate::controller::{ControllerResolver, Handler};
use crate::http::query::parse_query;
use crate::http::request::RequestAttributes;
use crate::observability::metrics;
use crate::option;
use crate::routing::{AdminRouteAttributes, AdminRouteGenerator, RequestMatcher, UrlGenerator};

pub struct AdminRouterSubscriber {
    routes: Arc<AdminRouteGenerator>,
    context_factory: Arc<AdminContextFactory>,
    urls: Arc<dyn UrlGenerator>,
    matcher: Arc<dyn RequestMatcher>,
    resolver: Arc<dyn ControllerResolver>,
}

impl std::fmt::Debug for AdminRouterSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminRouterSubscriber")
            .field("routes", &self.routes)
            .field("context_factory", &self.context_factory)
            .finish_non_exhaustive()
    }
}

impl AdminRouterSubscriber {
    pub fn new(
        routes: Arc<AdminRouteGenerator>,
        context_factory: Arc<AdminContextFactory>,
        urls: Arc<dyn UrlGenerator>,
        matcher: Arc<dyn RequestMatcher>,
        resolver: Arc<dyn ControllerResolver>,
    ) -> Self {
        Self {
            routes,
            context_factory,
            urls,
            matcher,
            resolver,
        }
    }

    /// Builds the admin context of a matched admin request.
    ///
    /// Requests without the admin marker, and requests that already carry a
    /// context, are left untouched.
    pub fn on_request(&self, parts: &mut Parts) -> Result<(), DispatchError> {
        let Some(attributes) = parts.extensions.get::<RequestAttributes>() else {
            return Ok(());
        };
        let Some(matched) = attributes.admin.clone() else {
            return Ok(());
        };
        let route = attributes.route.clone();

        if !self.routes.is_cache_warm() {
            tracing::warn!(route = ?route, "Admin route cache is cold, regenerating");
            metrics::record_route_cache_regeneration();
            self.routes.generate_all()?;
        }

        if parts.extensions.get::<Arc<AdminContext>>().is_some() {
            return Ok(());
        }

        let mut admin = route
            .as_deref()
            .and_then(|route| self.routes.route_attributes(route))
            .unwrap_or(matched);
        if admin.crud_controller.is_none() {
            apply_query_attributes(&mut admin, parts);
        }

        let controllers = self.routes.controllers();
        let dashboard = controllers
            .dashboard(&admin.dashboard)
            .ok_or_else(|| DispatchError::UnknownDashboard(admin.dashboard.clone()))?;
        let crud = match &admin.crud_controller {
            Some(fqcn) => Some(
                controllers
                    .crud(fqcn)
                    .ok_or_else(|| DispatchError::UnknownCrudController(fqcn.clone()))?,
            ),
            None => None,
        };

        if let Some(attributes) = parts.extensions.get_mut::<RequestAttributes>() {
            attributes.admin = Some(admin.clone());
        }

        let context = self
            .context_factory
            .create(parts, dashboard, crud, admin.action.as_deref())?;
        parts.extensions.insert(Arc::new(context));
        Ok(())
    }

    /// Swaps `handler` for the controller of the `routeName` query parameter.
    ///
    /// Any failure to resolve the delegated controller keeps `handler`.
    pub fn on_controller(&self, parts: &mut Parts, handler: Handler) -> Handler {
        if parts.extensions.get::<Arc<AdminContext>>().is_none() {
            return handler;
        }
        let query = parts.uri.query().map(parse_query).unwrap_or_default();
        let Some(route_name) = query.get(option::ROUTE_NAME).and_then(Value::as_str) else {
            return handler;
        };
        let route_params = match query.get(option::ROUTE_PARAMS) {
            Some(Value::Object(params)) => params.clone(),
            _ => Map::new(),
        };

        let controller = match resolve_delegated_controller(
            parts,
            route_name,
            &route_params,
            self.urls.as_ref(),
            self.matcher.as_ref(),
        ) {
            Ok(controller) => controller,
            Err(e) => {
                tracing::warn!(route = %route_name, error = %e, "Cannot resolve delegated controller");
                return handler;
            }
        };

        let (mut synthetic, ()) = Request::new(()).into_parts();
        synthetic.extensions.insert(RequestAttributes {
            route: Some(route_name.to_string()),
            controller: Some(controller.clone()),
            params: route_params.clone(),
            admin: None,
        });
        let Some(delegated) = self.resolver.get_controller(&synthetic) else {
            tracing::warn!(route = %route_name, controller = %controller, "Delegated controller has no handler");
            return handler;
        };

        if let Some(attributes) = parts.extensions.get_mut::<RequestAttributes>() {
            attributes.controller = Some(controller.clone());
            attributes.merge_params(&route_params);
        }
        metrics::record_delegated_request(route_name);
        tracing::debug!(route = %route_name, controller = %controller, "Delegating admin request");
        delegated
    }
}

/// Dashboard URLs may address a CRUD action through the query string.
fn apply_query_attributes(admin: &mut AdminRouteAttributes, parts: &Parts) {
    let query = parts.uri.query().map(parse_query).unwrap_or_default();
    if let Some(crud) = query.get(option::CRUD_CONTROLLER_FQCN).and_then(Value::as_str) {
        admin.crud_controller = Some(crud.to_string());
        admin.action = Some(
            query
                .get(option::CRUD_ACTION)
                .and_then(Value::as_str)
                .unwrap_or(INDEX)
                .to_string(),
        );
    }
}
