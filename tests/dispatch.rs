//! Admin request dispatch: context creation and controller delegation.

use std::sync::Arc;

use admin_panel::action::Page;
use admin_panel::config::schema::CacheBackend;
use admin_panel::context::AdminContext;
use admin_panel::controller::Handler;
use admin_panel::dispatch::DispatchError;
use admin_panel::http::RequestAttributes;
use admin_panel::AdminApp;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;

mod common;

use common::{CATEGORY_CRUD, DASHBOARD, POST, POST_CRUD, STATS};

fn placeholder_handler() -> Handler {
    Arc::new(|_request: Request<Body>| StatusCode::NO_CONTENT.into_response())
}

#[test]
fn test_context_of_a_crud_request() {
    let app = common::app();
    let context = common::admin_context(&app, "GET", "/admin/post/7/edit");

    assert_eq!(context.dashboard_fqcn(), DASHBOARD);
    assert_eq!(context.dashboard_route_name(), Some("admin"));
    assert_eq!(context.dashboard().title, "Blog Admin");
    assert_eq!(context.current_action(), Some("edit"));

    let crud = context.crud().unwrap();
    assert_eq!(crud.controller_fqcn, POST_CRUD);
    assert_eq!(crud.entity_fqcn, POST);
    assert_eq!(crud.entity_label, "Articles");
    assert_eq!(crud.current_page, Some(Page::Edit));

    let entity = context.entity().unwrap();
    assert_eq!(entity.name, "Post");
    assert_eq!(entity.primary_key_value.as_deref(), Some("7"));

    let i18n = context.i18n();
    assert_eq!(i18n.locale, "en");
    assert_eq!(i18n.translation_parameters["%entity_label%"], "Articles");
    assert_eq!(i18n.translation_parameters["%entity_name%"], "Post");
}

#[test]
fn test_dashboard_request_has_no_crud() {
    let app = common::app();
    let context = common::admin_context(&app, "GET", "/admin");

    assert_eq!(context.dashboard_fqcn(), DASHBOARD);
    assert!(context.crud().is_none());
    assert!(context.entity().is_none());
    assert_eq!(context.current_action(), None);
}

#[test]
fn test_context_is_built_once_per_request() {
    let app = common::app();
    let mut parts = common::routed_parts(&app, "GET", "/admin/post");

    app.subscriber().on_request(&mut parts).unwrap();
    let first = parts.extensions.get::<Arc<AdminContext>>().cloned().unwrap();

    app.subscriber().on_request(&mut parts).unwrap();
    let second = parts.extensions.get::<Arc<AdminContext>>().cloned().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_non_admin_requests_are_ignored() {
    let app = common::app();
    let mut parts = common::routed_parts(&app, "GET", "/stats");

    app.subscriber().on_request(&mut parts).unwrap();
    assert!(parts.extensions.get::<Arc<AdminContext>>().is_none());

    let (mut bare, _) = common::request("GET", "/anything").into_parts();
    app.subscriber().on_request(&mut bare).unwrap();
    assert!(bare.extensions.get::<Arc<AdminContext>>().is_none());
}

#[test]
fn test_dashboard_url_with_crud_query() {
    let app = common::app();
    let uri = format!(
        "/admin?crudControllerFqcn={}&entityId=3",
        "App%5CController%5CAdmin%5CCategoryCrudController"
    );
    let context = common::admin_context(&app, "GET", &uri);

    let crud = context.crud().unwrap();
    assert_eq!(crud.controller_fqcn, CATEGORY_CRUD);
    assert_eq!(crud.current_action, "index");
    assert_eq!(context.entity().unwrap().primary_key_value.as_deref(), Some("3"));
}

#[test]
fn test_unknown_crud_controller_is_an_error() {
    let app = common::app();
    let mut parts = common::routed_parts(
        &app,
        "GET",
        "/admin?crudControllerFqcn=App%5CController%5CAdmin%5CTagCrudController",
    );

    let err = app.subscriber().on_request(&mut parts).unwrap_err();
    assert!(matches!(
        &err,
        DispatchError::UnknownCrudController(fqcn) if fqcn == "App\\Controller\\Admin\\TagCrudController"
    ));
    assert!(parts.extensions.get::<Arc<AdminContext>>().is_none());
}

#[test]
fn test_cold_route_cache_is_regenerated() {
    let cache_dir = tempfile::tempdir().unwrap();
    let mut config = common::blog_config();
    config.cache.backend = CacheBackend::File;
    config.cache.directory = cache_dir.path().join("routes").to_string_lossy().into_owned();
    let app = AdminApp::from_config(&config).unwrap();
    assert!(app.routes().is_cache_warm());

    std::fs::remove_dir_all(cache_dir.path().join("routes")).unwrap();
    assert!(!app.routes().is_cache_warm());

    let context = common::admin_context(&app, "GET", "/admin/category");
    assert_eq!(context.crud().unwrap().controller_fqcn, CATEGORY_CRUD);
    assert!(app.routes().is_cache_warm());
    assert_eq!(
        app.routes().find_route_name(None, Some(POST_CRUD), Some("index")).as_deref(),
        Some("admin_post_index")
    );
}

#[test]
fn test_delegates_to_the_requested_route() {
    let app = common::app();
    let mut parts = common::routed_parts(
        &app,
        "GET",
        "/admin?routeName=blog_stats&routeParams%5Bperiod%5D=week",
    );
    app.subscriber().on_request(&mut parts).unwrap();

    let original = placeholder_handler();
    let delegated = app.subscriber().on_controller(&mut parts, original.clone());
    assert!(!Arc::ptr_eq(&original, &delegated));

    let attributes = parts.extensions.get::<RequestAttributes>().unwrap();
    assert_eq!(attributes.route.as_deref(), Some("admin"));
    assert_eq!(attributes.controller.as_ref().unwrap().as_str(), STATS);
    assert_eq!(attributes.params["period"], "week");

    let response = delegated(Request::from_parts(parts, Body::empty()));
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn test_failed_delegation_keeps_the_handler() {
    let app = common::app();

    // unknown route
    let mut parts = common::routed_parts(&app, "GET", "/admin?routeName=missing_route");
    app.subscriber().on_request(&mut parts).unwrap();
    let original = placeholder_handler();
    let kept = app.subscriber().on_controller(&mut parts, original.clone());
    assert!(Arc::ptr_eq(&original, &kept));

    // route only answering GET
    let mut parts = common::routed_parts(&app, "POST", "/admin?routeName=blog_stats");
    app.subscriber().on_request(&mut parts).unwrap();
    let kept = app.subscriber().on_controller(&mut parts, original.clone());
    assert!(Arc::ptr_eq(&original, &kept));

    // no admin context
    let mut parts = common::routed_parts(&app, "GET", "/stats?routeName=blog_stats");
    let kept = app.subscriber().on_controller(&mut parts, original.clone());
    assert!(Arc::ptr_eq(&original, &kept));
}
