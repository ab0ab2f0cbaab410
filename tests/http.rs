//! End-to-end requests through the axum router.

use admin_panel::http::X_REQUEST_ID;
use admin_panel::security::user::{X_ADMIN_ROLES, X_ADMIN_USER};
use axum::body::Body;
use axum::http::{header::AUTHORIZATION, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

mod common;

use common::{DASHBOARD, POST_CRUD, PROXY_KEY, STATS};

fn router() -> Router {
    let config = common::blog_config();
    let app = admin_panel::AdminApp::from_config(&config).unwrap();
    app.server(config).router()
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = router().oneshot(common::request("GET", uri)).await.unwrap();
    let status = response.status();
    (status, common::json_body(response).await)
}

#[tokio::test]
async fn test_crud_index_page() {
    let (status, page) = get("/admin/post").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(page["template"], "@Admin/crud/index.html");
    assert_eq!(page["title"], "Blog Admin");
    assert_eq!(page["crud"]["controllerFqcn"], POST_CRUD);
    assert_eq!(page["crud"]["currentAction"], "index");
    assert_eq!(page["crud"]["entityLabel"], "Articles");
    assert_eq!(page["i18n"]["locale"], "en");

    let fields: Vec<&str> = page["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["property"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["title", "published_at"]);

    let global: Vec<&str> = page["actions"]["global"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(global, ["new", "batchDelete"]);

    assert_eq!(page["mainMenu"]["items"][2]["label"], "Posts");
    assert_eq!(page["mainMenu"]["items"][2]["selected"], true);
    assert_eq!(page["userMenu"], Value::Null);
}

#[tokio::test]
async fn test_dashboard_page() {
    let (status, page) = get("/admin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["template"], "@Admin/dashboard.html");
    assert_eq!(page["dashboard"]["title"], "Blog Admin");
    assert_eq!(page["mainMenu"]["items"][0]["selected"], true);
}

#[tokio::test]
async fn test_application_route() {
    let (status, body) = get("/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "blog_stats");
    assert_eq!(body["controller"], STATS);
    assert_eq!(body["dashboard"], Value::Null);
}

#[tokio::test]
async fn test_delegated_application_route() {
    let (status, body) = get("/admin?routeName=blog_stats&routeParams%5Bperiod%5D=week").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "admin");
    assert_eq!(body["controller"], STATS);
    assert_eq!(body["params"]["period"], "week");
    assert_eq!(body["dashboard"], DASHBOARD);
}

#[tokio::test]
async fn test_unmatched_requests() {
    let (status, body) = get("/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No route found for \"GET /nowhere\"");

    let response = router()
        .oneshot(common::request("DELETE", "/admin/post"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dispatch_errors_are_server_errors() {
    let (status, body) = get("/admin?crudControllerFqcn=App%5CController%5CAdmin%5CTagCrudController").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("TagCrudController"));
}

#[tokio::test]
async fn test_request_id_is_set_and_propagated() {
    let response = router().oneshot(common::request("GET", "/admin")).await.unwrap();
    let generated = response.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
    assert!(!generated.is_empty());

    let request = Request::builder()
        .uri("/admin")
        .header(X_REQUEST_ID, "req-42")
        .body(Body::empty())
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.headers()[X_REQUEST_ID], "req-42");
}

async fn get_as_admin(authorization: Option<&str>) -> Value {
    let mut request = Request::builder()
        .uri("/admin/post")
        .header(X_ADMIN_USER, "alice")
        .header(X_ADMIN_ROLES, "ROLE_ADMIN");
    if let Some(value) = authorization {
        request = request.header(AUTHORIZATION, value);
    }
    let response = router()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    common::json_body(response).await
}

#[tokio::test]
async fn test_authenticated_user() {
    let page = get_as_admin(Some(&format!("Bearer {PROXY_KEY}"))).await;

    assert_eq!(page["userMenu"]["name"], "alice");
    let items = page["mainMenu"]["items"].as_array().unwrap();
    assert_eq!(items.last().unwrap()["label"], "Users");
}

#[tokio::test]
async fn test_identity_headers_without_the_proxy_key_are_ignored() {
    for authorization in [None, Some("Bearer guessed")] {
        let page = get_as_admin(authorization).await;

        assert_eq!(page["userMenu"], Value::Null);
        let items = page["mainMenu"]["items"].as_array().unwrap();
        assert_ne!(items.last().unwrap()["label"], "Users");
    }
}
