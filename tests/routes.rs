//! Route generation and matching for the blog admin.

use admin_panel::config::CrudConfig;
use admin_panel::lifecycle::StartupError;
use admin_panel::routing::{RequestMatcher, RouteError};
use admin_panel::AdminApp;

mod common;

use common::{CATEGORY_CRUD, DASHBOARD, POST_CRUD};

#[test]
fn test_generated_route_names_and_paths() {
    let app = common::app();
    let table = app.route_table();

    // dashboard + 9 Post routes + 8 Category routes + blog_stats
    assert_eq!(table.len(), 19);

    let expected = [
        ("admin", "/admin"),
        ("admin_post_index", "/admin/post"),
        ("admin_post_new", "/admin/post/new"),
        ("admin_post_batch_delete", "/admin/post/batch-delete"),
        ("admin_post_edit", "/admin/post/{entityId}/edit"),
        ("admin_post_publish", "/admin/post/{entityId}/publish"),
        ("admin_post_detail", "/admin/post/{entityId}"),
        ("admin_category_index", "/admin/category"),
        ("admin_category_delete", "/admin/category/{entityId}/delete"),
        ("blog_stats", "/stats"),
    ];
    for (name, path) in expected {
        let route = table.get(name).unwrap_or_else(|| panic!("missing route {name}"));
        assert_eq!(route.path, path, "path of {name}");
    }

    let edit = table.get("admin_post_edit").unwrap();
    assert_eq!(edit.methods, ["GET", "POST", "PATCH"]);
    assert_eq!(edit.defaults["_locale"], "en");
    assert_eq!(edit.controller.as_str(), format!("{POST_CRUD}::edit"));
}

#[test]
fn test_detail_comes_after_custom_actions() {
    let app = common::app();
    let names: Vec<&str> = app
        .route_table()
        .routes()
        .map(|route| route.name.as_str())
        .filter(|name| name.starts_with("admin_post_"))
        .collect();

    assert_eq!(names.last(), Some(&"admin_post_detail"));
    let publish = names.iter().position(|n| *n == "admin_post_publish").unwrap();
    let new = names.iter().position(|n| *n == "admin_post_new").unwrap();
    assert!(new < publish);
}

#[test]
fn test_matching() {
    let app = common::app();
    let table = app.route_table();
    let matched = |method: &str, uri: &str| {
        let (parts, _) = common::request(method, uri).into_parts();
        table.match_request(&parts)
    };

    let publish = matched("POST", "/admin/post/7/publish").unwrap();
    assert_eq!(publish.route, "admin_post_publish");
    assert_eq!(publish.params["entityId"], "7");
    assert_eq!(publish.params["_locale"], "en");
    let admin = publish.admin.unwrap();
    assert_eq!(admin.dashboard, DASHBOARD);
    assert_eq!(admin.crud_controller.as_deref(), Some(POST_CRUD));
    assert_eq!(admin.action.as_deref(), Some("publish"));

    assert_eq!(matched("GET", "/admin/post/new").unwrap().route, "admin_post_new");
    assert_eq!(matched("GET", "/admin/post/7").unwrap().route, "admin_post_detail");
    assert!(matched("GET", "/admin/post/7/publish").is_none());
    assert!(matched("DELETE", "/admin/post").is_none());

    let stats = matched("GET", "/stats").unwrap();
    assert!(stats.admin.is_none());
    assert_eq!(stats.controller.as_str(), common::STATS);
}

#[test]
fn test_cached_lookups() {
    let app = common::app();
    let routes = app.routes();

    assert!(routes.is_cache_warm());
    assert_eq!(
        routes.find_route_name(None, Some(POST_CRUD), Some("publish")).as_deref(),
        Some("admin_post_publish")
    );
    assert_eq!(routes.find_route_name(Some(DASHBOARD), None, None).as_deref(), Some("admin"));
    assert_eq!(routes.cruds_for_entity(common::CATEGORY), [CATEGORY_CRUD]);
    assert_eq!(routes.entity_for_crud(POST_CRUD).as_deref(), Some(common::POST));

    let attributes = routes.route_attributes("admin_category_edit").unwrap();
    assert_eq!(attributes.crud_controller.as_deref(), Some(CATEGORY_CRUD));
    assert_eq!(attributes.action.as_deref(), Some("edit"));
    assert!(routes.route_attributes("blog_stats").is_none());
}

#[test]
fn test_route_name_collision_is_fatal_until_renamed() {
    let mut config = common::blog_config();
    config.cruds.push(CrudConfig {
        fqcn: "App\\Controller\\Admin\\Legacy\\PostCrudController".to_string(),
        entity: common::POST.to_string(),
        route_path: Some("legacy-post".to_string()),
        route_name: None,
        actions: Vec::new(),
    });

    let err = AdminApp::from_config(&config).unwrap_err();
    assert!(matches!(
        &err,
        StartupError::Route(RouteError::DuplicateRouteName { route, .. }) if route == "admin_post_index"
    ));
    assert!(err.to_string().contains("define a custom route name"));

    config.cruds[2].route_name = Some("legacy_post".to_string());
    let app = AdminApp::from_config(&config).unwrap();
    assert_eq!(
        app.route_table().get("admin_legacy_post_index").unwrap().path,
        "/admin/legacy-post"
    );
    // the entity keeps its first controller for menus
    assert_eq!(app.routes().cruds_for_entity(common::POST)[0], POST_CRUD);
}

#[test]
fn test_absolute_urls_use_the_base_url() {
    let mut config = common::blog_config();
    config.listener.base_url = Some("https://admin.example.com".to_string());
    let app = AdminApp::from_config(&config).unwrap();

    let context = common::admin_context(&app, "GET", "/admin/post");
    let url = context
        .url_generator()
        .set_controller(CATEGORY_CRUD)
        .set_action("index")
        .absolute(true)
        .generate_url();
    assert_eq!(url, "https://admin.example.com/admin/category");

    let relative = context.url_generator().set_action("edit").set_entity_id("3").generate_url();
    assert_eq!(relative, "/admin/post/3/edit");
}
