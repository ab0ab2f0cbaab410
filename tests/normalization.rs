//! Backend configuration resolution, starting from the TOML file.

use admin_panel::config::loader::parse_config;
use admin_panel::config::{ConfigManager, NormalizeError, ResolveError};
use serde_json::json;

mod common;

const USERS: &str = r#"
[[dashboards]]
fqcn = "App\\Controller\\Admin\\DashboardController"
route_path = "/admin"
route_name = "admin"

[admin]
entities = ["App\\Entity\\User", "App\\Security\\User", "App\\Entity\\Invoice"]
"#;

#[test]
fn test_class_list_gets_unique_names() {
    let config = parse_config(USERS).unwrap();
    let manager = ConfigManager::new(config.admin);

    let names: Vec<&str> = manager
        .entity_configs()
        .unwrap()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, ["User", "User2", "Invoice"]);

    let second = manager.entity_config("User2").unwrap();
    assert_eq!(second.class, "App\\Security\\User");
    assert_eq!(second.label, "User2");
    assert!(second.disabled_actions.is_empty());
}

#[test]
fn test_view_precedence() {
    let config = parse_config(
        r#"
        [[dashboards]]
        fqcn = "App\\Controller\\Admin\\DashboardController"
        route_path = "/admin"
        route_name = "admin"

        [admin.entities.Product]
        class = "App\\Entity\\Product"
        image_base_path = "/uploads/products"

        [admin.entities.Product.form]
        title = "Product form"
        fields = ["name", "price"]
        actions = ["-list"]

        [admin.entities.Product.edit]
        title = "Edit product"

        [admin.entities.Product.list]
        fields = ["name", { property = "photo", type = "image" }, { property = "name", label = "Product" }]
        actions = [{ name = "edit", label = "Modify" }, "export"]
        "#,
    )
    .unwrap();
    let manager = ConfigManager::new(config.admin);
    let product = manager.entity_config("Product").unwrap();

    // explicit view keys beat the shared form view
    assert_eq!(product.edit.title.as_deref(), Some("Edit product"));
    assert_eq!(product.new.title.as_deref(), Some("Product form"));
    let new_fields: Vec<&str> = product.new.fields.iter().map(|f| f.property.as_str()).collect();
    assert_eq!(new_fields, ["name", "price"]);
    assert!(product.new.form_options.is_some());
    assert!(!product.new.actions.contains_key("list"));

    // the last declaration of a property wins, in the position of the first
    let list: Vec<(&str, Option<&str>)> = product
        .list
        .fields
        .iter()
        .map(|f| (f.property.as_str(), f.label.as_deref()))
        .collect();
    assert_eq!(list, [("name", Some("Product")), ("photo", None)]);
    assert_eq!(product.list.fields[1].base_path.as_deref(), Some("/uploads/products"));

    assert_eq!(product.list.actions["edit"], json!({ "name": "edit", "label": "Modify" }));
    let list_actions: Vec<&str> = product.list.actions.keys().map(String::as_str).collect();
    assert_eq!(list_actions, ["edit", "delete", "search", "new", "export"]);
    assert!(product.show.fields.is_empty());
}

#[test]
fn test_resolution_is_idempotent() {
    let config = common::blog_config();
    let manager = ConfigManager::new(config.admin);
    let resolved = manager.resolved_config(None).unwrap().unwrap().clone();

    let again = ConfigManager::new(resolved.clone());
    assert_eq!(again.resolved_config(None).unwrap(), Some(&resolved));
}

#[test]
fn test_errors_name_the_entity() {
    let manager = ConfigManager::new(json!({
        "entities": { "Bad Name": { "class": "App\\Entity\\Thing" } }
    }));
    let err = manager.warm_up().unwrap_err();
    assert_eq!(
        err,
        ResolveError::Normalize(NormalizeError::InvalidEntityName {
            entity: "Bad Name".to_string()
        })
    );
    assert!(err.to_string().contains("Bad Name"));

    let manager = ConfigManager::new(json!({
        "entities": { "Post": { "class": "App\\Entity\\Post", "list": { "fields": [{ "label": "Title" }] } } }
    }));
    assert_eq!(
        manager.warm_up().unwrap_err(),
        ResolveError::Normalize(NormalizeError::MissingProperty {
            entity: "Post".to_string(),
            view: "list".to_string(),
            position: 0,
        })
    );
}
