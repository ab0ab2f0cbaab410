//! Admin route generation.
//!
//! # Responsibilities
//! - Produce one route per dashboard plus one route per (dashboard, CRUD controller, action)
//! - Validate dashboard overrides and CRUD/action route declarations
//! - Persist the lookup maps used at request time into the cache store
//!
//! # Route shape
//! ```text
//! name: {dashboard route name}_{crud route name}_{action route name}
//! path: {dashboard path}/{crud path}/{action path}
//!
//! admin_blog_post_edit   /admin/blog-post/{entityId}/edit   GET, POST, PATCH
//! ```
//!
//! # Design Decisions
//! - Every configuration mistake is fatal and names the controller involved
//! - `detail` (`/{entityId}`) is emitted after its siblings so it never shadows them
//! - The attributes → name map is written before the name → attributes map,
//!   which doubles as the freshness check

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::route::{AdminRouteAttributes, ControllerRef, Route, RouteCollection};
use crate::cache::{keys, CacheError, CacheStore};
use crate::controller::{
    AdminAction, AdminDashboard, ControllerRegistry, CrudController, DashboardController,
};
use crate::naming::{
    action_route_name, action_route_path, crud_route_name, crud_route_path, is_valid_route_name,
};
use crate::option;

/// route name → admin attributes
pub type RouteNameToAttributes = BTreeMap<String, AdminRouteAttributes>;

/// dashboard → crud controller (`""` for none) → action (`""` for none) → route name
pub type RouteAttributesToName = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// action, default path, default name, methods
const BUILT_IN_ROUTES: [(&str, &str, &str, &[&str]); 8] = [
    ("index", "/", "index", &["GET"]),
    ("new", "/new", "new", &["GET", "POST"]),
    ("batchDelete", "/batch-delete", "batch_delete", &["POST"]),
    ("autocomplete", "/autocomplete", "autocomplete", &["GET"]),
    ("renderFilters", "/render-filters", "render_filters", &["GET"]),
    ("edit", "/{entityId}/edit", "edit", &["GET", "POST", "PATCH"]),
    ("delete", "/{entityId}/delete", "delete", &["POST"]),
    ("detail", "/{entityId}", "detail", &["GET"]),
];

/// Actions whose path must carry the entity id.
const ENTITY_ACTIONS: [&str; 3] = ["edit", "detail", "delete"];

/// Built-in actions whose methods cannot be redefined.
const FIXED_METHOD_ACTIONS: [&str; 5] = ["index", "new", "edit", "detail", "delete"];

const ALLOWED_METHODS: [&str; 4] = ["GET", "POST", "PATCH", "PUT"];

const ROUTE_OVERRIDE_KEYS: [&str; 2] = ["routePath", "routeName"];

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("the \"{dashboard}\" dashboard must define both a route path and a route name")]
    MissingDashboardRoute { dashboard: String },

    #[error(
        "the \"{dashboard}\" dashboard defines both allowed and denied controllers; \
         use only one of the two options"
    )]
    ConflictingControllerLists { dashboard: String },

    #[error("the \"{action}\" route override of the \"{dashboard}\" dashboard must be a mapping")]
    InvalidRouteOverride { dashboard: String, action: String },

    #[error(
        "the \"{action}\" route override of the \"{dashboard}\" dashboard defines unsupported \
         options ({keys}); only \"routePath\" and \"routeName\" are allowed"
    )]
    UnsupportedRouteOptions {
        dashboard: String,
        action: String,
        keys: String,
    },

    #[error(
        "the route name \"{name}\" defined for the \"{action}\" action of \"{owner}\" is invalid; \
         it can only contain letters, numbers, dashes and underscores"
    )]
    InvalidActionRouteName {
        owner: String,
        action: String,
        name: String,
    },

    #[error(
        "the route name \"{name}\" of the \"{controller}\" CRUD controller is invalid; \
         it can only contain letters, numbers, dashes and underscores"
    )]
    InvalidCrudRouteName { controller: String, name: String },

    #[error(
        "the route path \"{path}\" defined for the \"{action}\" action of \"{owner}\" \
         must include the {{entityId}} placeholder"
    )]
    MissingEntityIdPlaceholder {
        owner: String,
        action: String,
        path: String,
    },

    #[error("the \"{action}\" action of the \"{controller}\" CRUD controller cannot change its HTTP methods")]
    FixedActionMethods { controller: String, action: String },

    #[error(
        "the \"{action}\" action of the \"{controller}\" CRUD controller uses the unsupported \
         HTTP method \"{method}\"; allowed methods are GET, POST, PATCH and PUT"
    )]
    UnsupportedHttpMethod {
        controller: String,
        action: String,
        method: String,
    },

    #[error(
        "the route name \"{route}\" generated for \"{controller}\" is already used by another \
         admin route; define a custom route name for the controller or its action"
    )]
    DuplicateRouteName { controller: String, route: String },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActionRoute {
    action: String,
    path: String,
    name: String,
    methods: Vec<String>,
}

fn built_in_routes() -> Vec<ActionRoute> {
    BUILT_IN_ROUTES
        .iter()
        .map(|(action, path, name, methods)| ActionRoute {
            action: action.to_string(),
            path: path.to_string(),
            name: name.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
        })
        .collect()
}

/// Generates the admin routes and answers route lookups from the cached maps.
pub struct AdminRouteGenerator {
    controllers: Arc<ControllerRegistry>,
    cache: Arc<dyn CacheStore>,
    default_locale: String,
}

impl std::fmt::Debug for AdminRouteGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminRouteGenerator")
            .field("controllers", &self.controllers)
            .field("default_locale", &self.default_locale)
            .finish()
    }
}

impl AdminRouteGenerator {
    pub fn new(
        controllers: Arc<ControllerRegistry>,
        cache: Arc<dyn CacheStore>,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            controllers,
            cache,
            default_locale: default_locale.into(),
        }
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// Builds every admin route and rewrites the cached lookup maps.
    pub fn generate_all(&self) -> Result<RouteCollection, RouteError> {
        let routes = self.generate_routes()?;

        self.store(keys::DASHBOARD_FQCN_TO_ROUTE, &self.dashboard_route_names()?)?;
        self.store(keys::CRUD_FQCN_TO_ENTITY_FQCN, &self.crud_to_entity())?;
        self.store(keys::ENTITY_FQCN_TO_CRUD_FQCN, &self.entity_to_cruds())?;

        let mut name_to_attributes = RouteNameToAttributes::new();
        let mut attributes_to_name = RouteAttributesToName::new();
        for route in &routes {
            let Some(admin) = &route.admin else {
                continue;
            };
            attributes_to_name
                .entry(admin.dashboard.clone())
                .or_default()
                .entry(admin.crud_controller.clone().unwrap_or_default())
                .or_default()
                .insert(admin.action.clone().unwrap_or_default(), route.name.clone());
            name_to_attributes.insert(route.name.clone(), admin.clone());
        }
        self.store(keys::ROUTE_ATTRIBUTES_TO_NAME, &attributes_to_name)?;
        self.store(keys::ROUTE_NAME_TO_ATTRIBUTES, &name_to_attributes)?;

        tracing::info!(
            routes = routes.len(),
            dashboards = self.controllers.dashboards().len(),
            cruds = self.controllers.cruds().len(),
            "Admin routes generated"
        );
        Ok(routes)
    }

    /// True when both route maps are present in the cache.
    pub fn is_cache_warm(&self) -> bool {
        self.cache.contains(keys::ROUTE_NAME_TO_ATTRIBUTES)
            && self.cache.contains(keys::ROUTE_ATTRIBUTES_TO_NAME)
    }

    /// Route name for the given attributes; the dashboard defaults to the first registered one.
    pub fn find_route_name(
        &self,
        dashboard: Option<&str>,
        crud_controller: Option<&str>,
        action: Option<&str>,
    ) -> Option<String> {
        let dashboard = match dashboard {
            Some(dashboard) => dashboard.to_string(),
            None => self.default_dashboard()?,
        };
        let map: RouteAttributesToName = self.load(keys::ROUTE_ATTRIBUTES_TO_NAME)?;
        map.get(&dashboard)?
            .get(crud_controller.unwrap_or_default())?
            .get(action.unwrap_or_default())
            .cloned()
    }

    pub fn route_attributes(&self, route_name: &str) -> Option<AdminRouteAttributes> {
        let mut map: RouteNameToAttributes = self.load(keys::ROUTE_NAME_TO_ATTRIBUTES)?;
        map.remove(route_name)
    }

    /// dashboard controller → dashboard route name
    pub fn dashboard_routes(&self) -> BTreeMap<String, String> {
        self.load(keys::DASHBOARD_FQCN_TO_ROUTE).unwrap_or_default()
    }

    pub fn entity_for_crud(&self, crud_controller: &str) -> Option<String> {
        let mut map: BTreeMap<String, String> = self.load(keys::CRUD_FQCN_TO_ENTITY_FQCN)?;
        map.remove(crud_controller)
    }

    /// CRUD controllers managing `entity`, in registration order.
    pub fn cruds_for_entity(&self, entity: &str) -> Vec<String> {
        self.load::<BTreeMap<String, Vec<String>>>(keys::ENTITY_FQCN_TO_CRUD_FQCN)
            .and_then(|mut map| map.remove(entity))
            .unwrap_or_default()
    }

    pub fn default_dashboard(&self) -> Option<String> {
        self.controllers
            .default_dashboard()
            .map(|d| d.fqcn().to_string())
    }

    fn generate_routes(&self) -> Result<RouteCollection, RouteError> {
        let mut collection = RouteCollection::new();
        let mut added: HashSet<String> = HashSet::new();

        for dashboard in self.controllers.dashboards() {
            let dashboard_fqcn = dashboard.fqcn();
            let attribute = dashboard.admin_dashboard();
            let (dashboard_path, dashboard_name) = dashboard_route(dashboard_fqcn, &attribute)?;
            if attribute.allowed_controllers.is_some() && attribute.denied_controllers.is_some() {
                return Err(RouteError::ConflictingControllerLists {
                    dashboard: dashboard_fqcn.to_string(),
                });
            }
            let defaults = dashboard_default_routes(dashboard_fqcn, &attribute)?;

            if !added.insert(dashboard_name.clone()) {
                return Err(RouteError::DuplicateRouteName {
                    controller: dashboard_fqcn.to_string(),
                    route: dashboard_name,
                });
            }
            collection.add(self.dashboard_index_route(
                dashboard.as_ref(),
                &attribute,
                &dashboard_path,
                &dashboard_name,
            ));

            for crud in self.controllers.cruds() {
                let crud_fqcn = crud.fqcn();
                if let Some(allowed) = &attribute.allowed_controllers {
                    if !allowed.iter().any(|c| c == crud_fqcn) {
                        continue;
                    }
                }
                if let Some(denied) = &attribute.denied_controllers {
                    if denied.iter().any(|c| c == crud_fqcn) {
                        continue;
                    }
                }

                let (crud_path, crud_name) = crud_route(crud.as_ref())?;
                let mut actions = merge_action_routes(defaults.clone(), custom_actions(crud.as_ref())?);
                let detail_is_catch_all = actions
                    .iter()
                    .any(|r| r.action == "detail" && r.path.trim_matches('/') == "{entityId}");
                if detail_is_catch_all {
                    actions.sort_by_key(|r| r.action == "detail");
                }

                for action in actions {
                    let name = format!("{dashboard_name}_{crud_name}_{}", action.name);
                    if !added.insert(name.clone()) {
                        return Err(RouteError::DuplicateRouteName {
                            controller: crud_fqcn.to_string(),
                            route: name,
                        });
                    }

                    let path = join_route_path(&dashboard_path, &crud_path, &action.path);
                    let route = Route::new(name, path, ControllerRef::new(crud_fqcn, &action.action))
                        .with_methods(&action.methods)
                        .with_default(option::LOCALE, self.default_locale.clone())
                        .with_admin(AdminRouteAttributes::crud(
                            dashboard_fqcn,
                            crud_fqcn,
                            action.action,
                        ));
                    collection.add(route);
                }
            }
        }

        Ok(collection)
    }

    fn dashboard_index_route(
        &self,
        dashboard: &dyn DashboardController,
        attribute: &AdminDashboard,
        path: &str,
        name: &str,
    ) -> Route {
        let options = &attribute.route_options;
        let path = if path.is_empty() { "/" } else { path };
        let mut route = Route::new(name, path, ControllerRef::new(dashboard.fqcn(), "index"))
            .with_methods(&options.methods)
            .with_admin(AdminRouteAttributes::dashboard(dashboard.fqcn()));
        if let Some(host) = &options.host {
            route = route.with_host(host.clone());
        }
        if let Some(locale) = &options.locale {
            route = route.with_default(option::LOCALE, locale.clone());
        }
        for (key, value) in &options.defaults {
            route = route.with_default(key.clone(), value.clone());
        }
        route
    }

    fn dashboard_route_names(&self) -> Result<BTreeMap<String, String>, RouteError> {
        self.controllers
            .dashboards()
            .iter()
            .map(|d| {
                let (_, name) = dashboard_route(d.fqcn(), &d.admin_dashboard())?;
                Ok((d.fqcn().to_string(), name))
            })
            .collect()
    }

    fn crud_to_entity(&self) -> BTreeMap<String, String> {
        self.controllers
            .cruds()
            .iter()
            .map(|c| (c.fqcn().to_string(), c.entity_fqcn().to_string()))
            .collect()
    }

    fn entity_to_cruds(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for crud in self.controllers.cruds() {
            map.entry(crud.entity_fqcn().to_string())
                .or_default()
                .push(crud.fqcn().to_string());
        }
        map
    }

    fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<(), RouteError> {
        let value = serde_json::to_value(value).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.cache.set(key, value)?;
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.cache.get(key)?;
        match serde_json::from_value(value) {
            Ok(map) => Some(map),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed route cache entry");
                None
            }
        }
    }
}

/// Dashboard path (trailing `/` removed) and route name.
fn dashboard_route(fqcn: &str, attribute: &AdminDashboard) -> Result<(String, String), RouteError> {
    match (&attribute.route_path, &attribute.route_name) {
        (Some(path), Some(name)) => Ok((path.trim_end_matches('/').to_string(), name.clone())),
        _ => Err(RouteError::MissingDashboardRoute {
            dashboard: fqcn.to_string(),
        }),
    }
}

/// Built-in routes with the dashboard's per-action overrides applied.
fn dashboard_default_routes(
    fqcn: &str,
    attribute: &AdminDashboard,
) -> Result<Vec<ActionRoute>, RouteError> {
    let mut routes = built_in_routes();

    for (action, raw) in &attribute.routes {
        let Value::Object(options) = raw else {
            return Err(RouteError::InvalidRouteOverride {
                dashboard: fqcn.to_string(),
                action: action.clone(),
            });
        };

        let unsupported: Vec<&str> = options
            .keys()
            .map(String::as_str)
            .filter(|key| !ROUTE_OVERRIDE_KEYS.contains(key))
            .collect();
        if !unsupported.is_empty() {
            return Err(RouteError::UnsupportedRouteOptions {
                dashboard: fqcn.to_string(),
                action: action.clone(),
                keys: unsupported.join(", "),
            });
        }

        let path = options.get("routePath").and_then(Value::as_str);
        let name = options.get("routeName").and_then(Value::as_str);

        if let Some(name) = name {
            if !is_valid_route_name(name) {
                return Err(RouteError::InvalidActionRouteName {
                    owner: fqcn.to_string(),
                    action: action.clone(),
                    name: name.to_string(),
                });
            }
        }
        if let Some(path) = path {
            if ENTITY_ACTIONS.contains(&action.as_str()) && !path.contains("{entityId}") {
                return Err(RouteError::MissingEntityIdPlaceholder {
                    owner: fqcn.to_string(),
                    action: action.clone(),
                    path: path.to_string(),
                });
            }
        }

        match routes.iter_mut().find(|r| &r.action == action) {
            Some(route) => {
                if let Some(path) = path {
                    route.path = path.to_string();
                }
                if let Some(name) = name {
                    route.name = name.to_string();
                }
            }
            None => routes.push(ActionRoute {
                action: action.clone(),
                path: path.map_or_else(|| action_route_path(action), str::to_string),
                name: name.map_or_else(|| action_route_name(action), str::to_string),
                methods: vec!["GET".to_string()],
            }),
        }
    }

    Ok(routes)
}

/// CRUD path (no surrounding `/`) and route name (no surrounding `_`).
fn crud_route(crud: &dyn CrudController) -> Result<(String, String), RouteError> {
    let attribute = crud.admin_crud();

    let path = match attribute.route_path {
        Some(path) => path.trim_matches('/').to_string(),
        None => crud_route_path(crud.fqcn()),
    };
    let name = match attribute.route_name {
        Some(name) => {
            if !is_valid_route_name(&name) {
                return Err(RouteError::InvalidCrudRouteName {
                    controller: crud.fqcn().to_string(),
                    name,
                });
            }
            name.trim_matches('_').to_string()
        }
        None => crud_route_name(crud.fqcn()),
    };

    Ok((path, name))
}

/// Validated and normalized action declarations of a CRUD controller.
fn custom_actions(crud: &dyn CrudController) -> Result<Vec<AdminAction>, RouteError> {
    let controller = crud.fqcn();
    let mut actions = Vec::new();

    for declared in crud.admin_actions() {
        let action = declared.action;

        let route_path = match declared.route_path {
            Some(path) => {
                if ENTITY_ACTIONS.contains(&action.as_str()) && !path.contains("{entityId}") {
                    return Err(RouteError::MissingEntityIdPlaceholder {
                        owner: controller.to_string(),
                        action,
                        path,
                    });
                }
                Some(path.trim_matches('/').to_string())
            }
            None => None,
        };

        let route_name = match declared.route_name {
            Some(name) => {
                if !is_valid_route_name(&name) {
                    return Err(RouteError::InvalidActionRouteName {
                        owner: controller.to_string(),
                        action,
                        name,
                    });
                }
                Some(name.trim_matches('_').to_string())
            }
            None => None,
        };

        let methods = match declared.methods {
            Some(methods) => {
                if FIXED_METHOD_ACTIONS.contains(&action.as_str()) {
                    return Err(RouteError::FixedActionMethods {
                        controller: controller.to_string(),
                        action,
                    });
                }
                let mut normalized = Vec::with_capacity(methods.len());
                for method in methods {
                    let upper = method.to_ascii_uppercase();
                    if !ALLOWED_METHODS.contains(&upper.as_str()) {
                        return Err(RouteError::UnsupportedHttpMethod {
                            controller: controller.to_string(),
                            action,
                            method,
                        });
                    }
                    normalized.push(upper);
                }
                Some(normalized)
            }
            None => None,
        };

        actions.push(AdminAction {
            action,
            route_path,
            route_name,
            methods,
        });
    }

    Ok(actions)
}

/// Custom declarations override matching defaults field by field; new actions are appended.
fn merge_action_routes(mut routes: Vec<ActionRoute>, custom: Vec<AdminAction>) -> Vec<ActionRoute> {
    for declared in custom {
        match routes.iter_mut().find(|r| r.action == declared.action) {
            Some(route) => {
                if let Some(path) = declared.route_path {
                    route.path = path;
                }
                if let Some(name) = declared.route_name {
                    route.name = name;
                }
                if let Some(methods) = declared.methods {
                    route.methods = methods;
                }
            }
            None => routes.push(ActionRoute {
                path: declared
                    .route_path
                    .unwrap_or_else(|| action_route_path(&declared.action)),
                name: declared
                    .route_name
                    .unwrap_or_else(|| action_route_name(&declared.action)),
                methods: declared.methods.unwrap_or_else(|| vec!["GET".to_string()]),
                action: declared.action,
            }),
        }
    }
    routes
}

fn join_route_path(dashboard: &str, crud: &str, action: &str) -> String {
    let joined = format!("{dashboard}/{crud}/{}", action.trim_start_matches('/'));
    let mut path = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '/' && path.ends_with('/') {
            continue;
        }
        path.push(c);
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
