//! Shared fixtures for the integration tests: a small blog admin.

#![allow(dead_code)]

use std::sync::Arc;

use admin_panel::config::loader::parse_config;
use admin_panel::config::AppConfig;
use admin_panel::context::AdminContext;
use admin_panel::http::RequestAttributes;
use admin_panel::routing::RequestMatcher;
use admin_panel::AdminApp;
use axum::body::Body;
use axum::http::request::Parts;
use axum::http::Request;
use axum::response::Response;
use serde_json::Value;

pub const DASHBOARD: &str = "App\\Controller\\Admin\\DashboardController";
pub const POST_CRUD: &str = "App\\Controller\\Admin\\PostCrudController";
pub const CATEGORY_CRUD: &str = "App\\Controller\\Admin\\CategoryCrudController";
pub const POST: &str = "App\\Entity\\Post";
pub const CATEGORY: &str = "App\\Entity\\Category";
pub const STATS: &str = "App\\Controller\\StatsController::index";
/// Bearer key of the authenticating proxy in front of the blog admin.
pub const PROXY_KEY: &str = "blog-proxy-key";

pub const BLOG: &str = r#"
[security]
api_key = "blog-proxy-key"

[[dashboards]]
fqcn = "App\\Controller\\Admin\\DashboardController"
route_path = "/admin"
route_name = "admin"
title = "Blog Admin"

[[dashboards.menu]]
kind = "dashboard"
label = "Dashboard"
icon = "fa fa-home"

[[dashboards.menu]]
kind = "section"
label = "Content"

[[dashboards.menu]]
kind = "crud"
label = "Posts"
entity = "App\\Entity\\Post"

[[dashboards.menu]]
kind = "submenu"
label = "Taxonomy"

[[dashboards.menu.items]]
kind = "crud"
label = "Categories"
entity = "App\\Entity\\Category"

[[dashboards.menu]]
kind = "route"
label = "Statistics"
route = "blog_stats"

[[dashboards.menu]]
kind = "url"
label = "Users"
url = "/users"
permission = "ROLE_ADMIN"

[[cruds]]
fqcn = "App\\Controller\\Admin\\PostCrudController"
entity = "App\\Entity\\Post"

[[cruds.actions]]
name = "publish"
route_path = "/{entityId}/publish"
methods = ["POST"]

[[cruds]]
fqcn = "App\\Controller\\Admin\\CategoryCrudController"
entity = "App\\Entity\\Category"

[[routes]]
name = "blog_stats"
path = "/stats"
controller = "App\\Controller\\StatsController::index"
methods = ["GET"]

[admin.entities.Post]
class = "App\\Entity\\Post"
label = "Articles"

[admin.entities.Post.list]
fields = ["title", { property = "published_at", type = "datetime" }]

[admin.entities.Post.form]
fields = ["title", "body"]

[admin.entities.Category]
class = "App\\Entity\\Category"
disabled_actions = ["delete"]
"#;

pub fn blog_config() -> AppConfig {
    parse_config(BLOG).expect("blog config is valid")
}

pub fn app() -> AdminApp {
    AdminApp::from_config(&blog_config()).expect("blog app builds")
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

/// Request parts routed through the app's route table, as the kernel does.
pub fn routed_parts(app: &AdminApp, method: &str, uri: &str) -> Parts {
    let (mut parts, _) = request(method, uri).into_parts();
    let matched = app
        .route_table()
        .match_request(&parts)
        .unwrap_or_else(|| panic!("no route for {method} {uri}"));
    parts.extensions.insert(RequestAttributes::from(matched));
    parts
}

/// Admin context built for `method uri`.
pub fn admin_context(app: &AdminApp, method: &str, uri: &str) -> Arc<AdminContext> {
    let mut parts = routed_parts(app, method, uri);
    app.subscriber()
        .on_request(&mut parts)
        .expect("admin request dispatches");
    parts
        .extensions
        .get::<Arc<AdminContext>>()
        .cloned()
        .expect("admin context is attached")
}

pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
