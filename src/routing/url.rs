//! Fluent builder for admin URLs.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::generator::AdminRouteGenerator;
use super::table::{UrlGenerator, UrlReference};
use crate::http::query::{build_query, sorted};
use crate::http::request::RequestSnapshot;
use crate::option;

/// Builds URLs pointing at dashboards, CRUD actions or delegated application routes.
///
/// Builders start from the current request (its query, dashboard, controller,
/// action and entity id) and are consumed by each setter:
///
/// ```ignore
/// let url = context
///     .url_generator()
///     .set_controller("App\\Controller\\Admin\\PostCrudController")
///     .set_action("edit")
///     .set_entity_id("42")
///     .generate_url();
/// ```
#[derive(Clone)]
pub struct AdminUrlGenerator {
    routes: Arc<AdminRouteGenerator>,
    urls: Arc<dyn UrlGenerator>,
    params: Map<String, Value>,
    current_url: String,
    reference: UrlReference,
}

impl std::fmt::Debug for AdminUrlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminUrlGenerator")
            .field("params", &self.params)
            .field("current_url", &self.current_url)
            .field("reference", &self.reference)
            .finish()
    }
}

impl AdminUrlGenerator {
    /// A builder with no parameters.
    pub fn new(routes: Arc<AdminRouteGenerator>, urls: Arc<dyn UrlGenerator>) -> Self {
        Self {
            routes,
            urls,
            params: Map::new(),
            current_url: String::new(),
            reference: UrlReference::AbsolutePath,
        }
    }

    /// A builder seeded with the state of `request`.
    pub fn for_request(
        routes: Arc<AdminRouteGenerator>,
        urls: Arc<dyn UrlGenerator>,
        request: &RequestSnapshot,
    ) -> Self {
        let mut params = request.query.clone();
        if let Some(admin) = &request.attributes.admin {
            params.insert(
                option::DASHBOARD_CONTROLLER_FQCN.to_string(),
                Value::String(admin.dashboard.clone()),
            );
            if let Some(crud) = &admin.crud_controller {
                params.insert(option::CRUD_CONTROLLER_FQCN.to_string(), Value::String(crud.clone()));
            }
            if let Some(action) = &admin.action {
                params.insert(option::CRUD_ACTION.to_string(), Value::String(action.clone()));
            }
        }
        if let Some(entity_id) = request.attributes.entity_id() {
            params.insert(option::ENTITY_ID.to_string(), Value::String(entity_id));
        }

        Self {
            routes,
            urls,
            params,
            current_url: request.uri(),
            reference: UrlReference::AbsolutePath,
        }
    }

    pub fn absolute(mut self, absolute: bool) -> Self {
        self.reference = if absolute {
            UrlReference::AbsoluteUrl
        } else {
            UrlReference::AbsolutePath
        };
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merges `params` over the current ones.
    pub fn set_all(mut self, params: Map<String, Value>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn unset(mut self, key: &str) -> Self {
        self.params.shift_remove(key);
        self
    }

    pub fn unset_all(mut self) -> Self {
        self.params.clear();
        self
    }

    pub fn unset_all_except(mut self, keep: &[&str]) -> Self {
        self.params.retain(|key, _| keep.contains(&key.as_str()));
        self
    }

    pub fn set_dashboard(self, fqcn: impl Into<String>) -> Self {
        self.set(option::DASHBOARD_CONTROLLER_FQCN, fqcn.into())
    }

    pub fn set_controller(self, fqcn: impl Into<String>) -> Self {
        self.set(option::CRUD_CONTROLLER_FQCN, fqcn.into())
    }

    pub fn set_action(self, action: impl Into<String>) -> Self {
        self.set(option::CRUD_ACTION, action.into())
    }

    pub fn set_entity_id(self, entity_id: impl Into<String>) -> Self {
        self.set(option::ENTITY_ID, entity_id.into())
    }

    /// Points the URL at an application route rendered inside the dashboard.
    pub fn set_route(self, route_name: impl Into<String>, route_params: Map<String, Value>) -> Self {
        let builder = self
            .unset(option::CRUD_CONTROLLER_FQCN)
            .unset(option::CRUD_ACTION)
            .unset(option::ENTITY_ID)
            .set(option::ROUTE_NAME, route_name.into());
        if route_params.is_empty() {
            builder.unset(option::ROUTE_PARAMS)
        } else {
            builder.set(option::ROUTE_PARAMS, Value::Object(route_params))
        }
    }

    /// Adds the current request URL as `referrer`.
    pub fn include_referrer(self) -> Self {
        let current = self.current_url.clone();
        if current.is_empty() {
            return self;
        }
        self.set(option::REFERRER, current)
    }

    pub fn remove_referrer(self) -> Self {
        self.unset(option::REFERRER)
    }

    /// Generates the URL. Lookup misses fall back to the dashboard URL with
    /// every parameter in the query string; an empty string means no dashboard is routable.
    pub fn generate_url(&self) -> String {
        let mut params: Map<String, Value> = self
            .params
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let dashboard = match take_string(&mut params, option::DASHBOARD_CONTROLLER_FQCN) {
            Some(dashboard) => dashboard,
            None => match self.routes.default_dashboard() {
                Some(dashboard) => dashboard,
                None => return String::new(),
            },
        };

        let crud = take_string(&mut params, option::CRUD_CONTROLLER_FQCN);
        let action = take_string(&mut params, option::CRUD_ACTION);

        let route_name = if params.contains_key(option::ROUTE_NAME) {
            self.routes.find_route_name(Some(&dashboard), None, None)
        } else if let Some(crud) = &crud {
            self.routes.find_route_name(
                Some(&dashboard),
                Some(crud),
                Some(action.as_deref().unwrap_or("index")),
            )
        } else {
            self.routes.find_route_name(Some(&dashboard), None, None)
        };

        if let Some(route_name) = route_name {
            match self.urls.generate(&route_name, &sorted(&params), self.reference) {
                Ok(url) => return url,
                Err(e) => {
                    tracing::debug!(route = %route_name, error = %e, "Falling back to the dashboard URL");
                }
            }
        }

        // no dedicated route: keep the admin attributes in the query string
        if let Some(crud) = crud {
            params.insert(option::CRUD_CONTROLLER_FQCN.to_string(), Value::String(crud));
        }
        if let Some(action) = action {
            params.insert(option::CRUD_ACTION.to_string(), Value::String(action));
        }
        let Some(dashboard_route) = self.routes.find_route_name(Some(&dashboard), None, None) else {
            return String::new();
        };
        let params = sorted(&params);
        match self.urls.generate(&dashboard_route, &params, self.reference) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(route = %dashboard_route, error = %e, "Dashboard URL generation failed");
                let query = build_query(&params);
                if query.is_empty() {
                    String::new()
                } else {
                    format!("?{query}")
                }
            }
        }
    }
}

fn take_string(params: &mut Map<String, Value>, key: &str) -> Option<String> {
    match params.shift_remove(key)? {
        Value::String(s) => Some(s),
        other => crate::http::query::scalar_to_string(&other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::controller::{AdminDashboard, ConfiguredCrud, ConfiguredDashboard, ControllerRegistry};
    use crate::routing::RouteTable;
    use serde_json::json;

    const DASHBOARD: &str = "App\\Controller\\Admin\\DashboardController";
    const POST: &str = "App\\Controller\\Admin\\PostCrudController";

    fn builder() -> AdminUrlGenerator {
        let mut registry = ControllerRegistry::new();
        registry.add_dashboard(Arc::new(ConfiguredDashboard::new(
            DASHBOARD,
            AdminDashboard::new("/admin", "admin"),
        )));
        registry.add_crud(Arc::new(ConfiguredCrud::new(POST, "App\\Entity\\Post")));
        let routes = Arc::new(AdminRouteGenerator::new(
            Arc::new(registry),
            Arc::new(MemoryCache::new()),
            "en",
        ));
        let table = RouteTable::new(routes.generate_all().unwrap());
        AdminUrlGenerator::new(routes, Arc::new(table))
    }

    #[test]
    fn test_crud_action_urls() {
        let url = builder()
            .set_controller(POST)
            .set_action("edit")
            .set_entity_id("42")
            .generate_url();
        assert_eq!(url, "/admin/post/42/edit");

        let url = builder().set_controller(POST).set("page", 2).set("filters", json!({ "b": 1, "a": 2 })).generate_url();
        assert_eq!(url, "/admin/post?filters%5Ba%5D=2&filters%5Bb%5D=1&page=2");
    }

    #[test]
    fn test_dashboard_and_delegated_route_urls() {
        assert_eq!(builder().generate_url(), "/admin");

        let params = json!({ "format": "csv" }).as_object().cloned().unwrap();
        let url = builder().set_controller(POST).set_route("export", params).generate_url();
        assert_eq!(url, "/admin?routeName=export&routeParams%5Bformat%5D=csv");
    }

    #[test]
    fn test_null_params_are_dropped_and_unknown_actions_fall_back() {
        let url = builder()
            .set_controller(POST)
            .set("query", Value::Null)
            .set("sort", json!({ "title": "ASC" }))
            .unset("sort")
            .generate_url();
        assert_eq!(url, "/admin/post");

        let url = builder().set_controller(POST).set_action("publish").generate_url();
        assert_eq!(
            url,
            "/admin?crudAction=publish&crudControllerFqcn=App%5CController%5CAdmin%5CPostCrudController"
        );
    }

    #[test]
    fn test_unset_all_except() {
        let generator = builder().set("a", 1).set("b", 2).set("c", 3).unset_all_except(&["b"]);
        assert_eq!(generator.params().keys().collect::<Vec<_>>(), ["b"]);
    }
}
