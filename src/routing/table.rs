//! Route lookup and URL generation.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the matching route for a request
//! - Generate URLs from a route name and parameters
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) name lookup via HashMap, O(n) path scan in insertion order
//! - First match wins; a [`RouteHint`] is tried before the scan
//! - Explicit `None` on no-match rather than a silent default

use std::collections::HashMap;

use axum::http::request::Parts;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use super::matcher::{HostMatcher, Matcher, MethodMatcher, PathPattern};
use super::route::{AdminRouteAttributes, ControllerRef, Route, RouteCollection};
use crate::http::query::{build_query, scalar_to_string};

/// Result of matching a request against the route table.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub route: String,
    pub controller: ControllerRef,
    /// Route defaults overlaid with captured placeholders.
    pub params: Map<String, Value>,
    pub admin: Option<AdminRouteAttributes>,
}

/// Name of the route a synthetic request was generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteHint(pub String);

/// Matches a request to a route.
pub trait RequestMatcher: Send + Sync {
    fn match_request(&self, parts: &Parts) -> Option<RouteMatch>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlReference {
    #[default]
    AbsolutePath,
    AbsoluteUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlGenerationError {
    #[error("route \"{0}\" does not exist")]
    RouteNotFound(String),

    #[error("missing mandatory parameter \"{parameter}\" to generate a URL for route \"{route}\"")]
    MissingParameter { route: String, parameter: String },
}

/// Generates URLs for named routes. Parameters that are not placeholders become the query string.
pub trait UrlGenerator: Send + Sync {
    fn generate(
        &self,
        name: &str,
        params: &Map<String, Value>,
        reference: UrlReference,
    ) -> Result<String, UrlGenerationError>;
}

#[derive(Debug)]
struct CompiledRoute {
    route: Route,
    pattern: PathPattern,
    host: Option<HostMatcher>,
    methods: MethodMatcher,
}

impl CompiledRoute {
    fn compile(route: Route) -> Self {
        Self {
            pattern: PathPattern::parse(&route.path),
            host: route.host.as_ref().map(HostMatcher::new),
            methods: MethodMatcher::new(&route.methods),
            route,
        }
    }

    fn try_match(&self, parts: &Parts) -> Option<RouteMatch> {
        if let Some(host) = &self.host {
            if !host.matches(parts) {
                return None;
            }
        }
        if !self.methods.matches(parts) {
            return None;
        }
        let captured = self.pattern.captures(parts.uri.path())?;

        let mut params = self.route.defaults.clone();
        params.extend(captured);
        Some(RouteMatch {
            route: self.route.name.clone(),
            controller: self.route.controller.clone(),
            params,
            admin: self.route.admin.clone(),
        })
    }
}

/// The compiled route table.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
    by_name: HashMap<String, usize>,
    base_url: Option<Url>,
}

impl RouteTable {
    pub fn new(collection: RouteCollection) -> Self {
        let routes: Vec<CompiledRoute> = collection.into_iter().map(CompiledRoute::compile).collect();
        let by_name = routes
            .iter()
            .enumerate()
            .map(|(i, compiled)| (compiled.route.name.clone(), i))
            .collect();
        Self {
            routes,
            by_name,
            base_url: None,
        }
    }

    /// Base used for [`UrlReference::AbsoluteUrl`].
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&i| &self.routes[i].route)
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().map(|compiled| &compiled.route)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RequestMatcher for RouteTable {
    fn match_request(&self, parts: &Parts) -> Option<RouteMatch> {
        if let Some(RouteHint(name)) = parts.extensions.get::<RouteHint>() {
            if let Some(matched) = self
                .by_name
                .get(name)
                .and_then(|&i| self.routes[i].try_match(parts))
            {
                return Some(matched);
            }
        }
        self.routes.iter().find_map(|compiled| compiled.try_match(parts))
    }
}

impl UrlGenerator for RouteTable {
    fn generate(
        &self,
        name: &str,
        params: &Map<String, Value>,
        reference: UrlReference,
    ) -> Result<String, UrlGenerationError> {
        let compiled = self
            .by_name
            .get(name)
            .map(|&i| &self.routes[i])
            .ok_or_else(|| UrlGenerationError::RouteNotFound(name.to_string()))?;
        let route = &compiled.route;

        let path = compiled
            .pattern
            .expand(|placeholder| {
                params
                    .get(placeholder)
                    .or_else(|| route.defaults.get(placeholder))
                    .and_then(scalar_to_string)
            })
            .map_err(|parameter| UrlGenerationError::MissingParameter {
                route: name.to_string(),
                parameter,
            })?;

        let placeholders: Vec<&str> = compiled.pattern.placeholders().collect();
        let extra: Map<String, Value> = params
            .iter()
            .filter(|(key, value)| {
                !value.is_null()
                    && !placeholders.contains(&key.as_str())
                    && route.defaults.get(key.as_str()) != Some(*value)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let mut url = path;
        let query = build_query(&extra);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        match (reference, &self.base_url) {
            (UrlReference::AbsoluteUrl, Some(base)) => {
                Ok(format!("{}{}", base.as_str().trim_end_matches('/'), url))
            }
            _ => Ok(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};
    use serde_json::json;

    fn table() -> RouteTable {
        let mut routes = RouteCollection::new();
        routes.add(
            Route::new("admin", "/admin", ControllerRef::parse("App\\Dashboard::index"))
                .with_admin(AdminRouteAttributes::dashboard("App\\Dashboard")),
        );
        routes.add(
            Route::new("admin_post_edit", "/admin/post/{entityId}/edit", ControllerRef::parse("App\\Post::edit"))
                .with_methods(["GET", "POST"])
                .with_default("_locale", "en")
                .with_admin(AdminRouteAttributes::crud("App\\Dashboard", "App\\Post", "edit")),
        );
        routes.add(Route::new("report", "/report/{year}", ControllerRef::parse("App\\Report::show")));
        routes.add(Route::new("report_alias", "/report/{year}", ControllerRef::parse("App\\Report::alias")));
        RouteTable::new(routes)
    }

    fn parts(method: Method, uri: &str) -> Parts {
        Request::builder().method(method).uri(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_match_captures_and_defaults() {
        let table = table();
        let matched = table.match_request(&parts(Method::POST, "/admin/post/7/edit")).unwrap();

        assert_eq!(matched.route, "admin_post_edit");
        assert_eq!(matched.controller.as_str(), "App\\Post::edit");
        assert_eq!(matched.params["entityId"], "7");
        assert_eq!(matched.params["_locale"], "en");
        assert_eq!(matched.admin.unwrap().action.as_deref(), Some("edit"));

        assert!(table.match_request(&parts(Method::DELETE, "/admin/post/7/edit")).is_none());
        assert!(table.match_request(&parts(Method::GET, "/nowhere")).is_none());
    }

    #[test]
    fn test_first_match_wins_unless_hinted() {
        let table = table();
        let mut request = parts(Method::GET, "/report/2024");
        assert_eq!(table.match_request(&request).unwrap().route, "report");

        request.extensions.insert(RouteHint("report_alias".to_string()));
        assert_eq!(table.match_request(&request).unwrap().route, "report_alias");
    }

    #[test]
    fn test_generate() {
        let table = table();
        let params = json!({ "entityId": 7, "referrer": "/admin", "_locale": "en", "page": null });

        assert_eq!(
            table
                .generate("admin_post_edit", params.as_object().unwrap(), UrlReference::AbsolutePath)
                .unwrap(),
            "/admin/post/7/edit?referrer=%2Fadmin"
        );
        assert_eq!(
            table.generate("admin_post_edit", &Map::new(), UrlReference::AbsolutePath),
            Err(UrlGenerationError::MissingParameter {
                route: "admin_post_edit".into(),
                parameter: "entityId".into()
            })
        );
        assert_eq!(
            table.generate("nope", &Map::new(), UrlReference::AbsolutePath),
            Err(UrlGenerationError::RouteNotFound("nope".into()))
        );
    }

    #[test]
    fn test_generate_absolute_url() {
        let table = table().with_base_url(Url::parse("https://admin.example.com/").unwrap());

        assert_eq!(
            table.generate("admin", &Map::new(), UrlReference::AbsoluteUrl).unwrap(),
            "https://admin.example.com/admin"
        );
        assert_eq!(
            table.generate("admin", &Map::new(), UrlReference::AbsolutePath).unwrap(),
            "/admin"
        );
    }
}
