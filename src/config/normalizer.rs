//! Backend configuration normalizer.
//!
//! # Responsibilities
//! - Expand the three entity declaration formats into the canonical shape
//! - Merge the shared `form` view into `new` and `edit`
//! - Guarantee `fields` (and `form_options` for form views) on every view
//! - Expand field shorthands and key fields by property name
//!
//! # Accepted entity formats
//! ```text
//! # 1: class name at a numeric index (name derived from the class)
//! entities = ["App\\Entity\\User"]
//!
//! # 2: name -> class name
//! [admin.entities]
//! User = "App\\Entity\\User"
//!
//! # 3: name -> mapping with a mandatory `class`
//! [admin.entities.User]
//! class = "App\\Entity\\User"
//! label = "Clients"
//! ```
//!
//! # Design Decisions
//! - Pure function over `serde_json::Value`; each pass takes and returns the whole tree
//! - Running the normalizer on its own output returns the same tree
//! - Duplicate field properties: the last declaration wins

use serde_json::{Map, Value};
use thiserror::Error;

use crate::naming::short_class_name;

/// The five views every entity exposes.
pub const VIEWS: [&str; 5] = ["edit", "list", "new", "search", "show"];

/// Views backed by a form.
pub const FORM_VIEWS: [&str; 2] = ["edit", "new"];

/// Fatal configuration mistakes detected while normalizing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("the backend configuration must be a mapping")]
    InvalidRoot,

    #[error("the \"entities\" option must be a sequence or a mapping")]
    InvalidEntities,

    #[error("the \"{entity}\" entity must be declared as a class name or as a mapping")]
    InvalidEntityDeclaration { entity: String },

    #[error("the \"{entity}\" entity must define its associated entity class using the \"class\" option")]
    MissingClass { entity: String },

    #[error(
        "the name of the \"{entity}\" entity contains invalid characters \
         (allowed: letters, numbers, underscores; the first character cannot be a number)"
    )]
    InvalidEntityName { entity: String },

    #[error("the \"{view}\" view of the \"{entity}\" entity must be a mapping")]
    InvalidView { entity: String, view: String },

    #[error(
        "the value at position {position} of the \"fields\" option for the \"{view}\" view \
         of the \"{entity}\" entity can only be a string or a mapping (found {found})"
    )]
    InvalidField {
        entity: String,
        view: String,
        position: usize,
        found: &'static str,
    },

    #[error(
        "the value at position {position} of the \"fields\" option for the \"{view}\" view \
         of the \"{entity}\" entity does not define the \"property\" option"
    )]
    MissingProperty {
        entity: String,
        view: String,
        position: usize,
    },

    #[error(
        "the value at position {position} of the \"actions\" option for the \"{view}\" view \
         of the \"{entity}\" entity must be an action name or a mapping with a \"name\""
    )]
    InvalidAction {
        entity: String,
        view: String,
        position: usize,
    },

    #[error("the \"disabled_actions\" option of the \"{entity}\" entity must be a list of action names")]
    InvalidDisabledActions { entity: String },
}

/// Runs every normalization step in order.
pub fn normalize(config: Value) -> Result<Value, NormalizeError> {
    let config = normalize_entities(config)?;
    let config = normalize_form_views(config)?;
    let config = normalize_views(config)?;
    normalize_fields(config)
}

/// Reduces formats #1 and #2 to format #3 and assigns `name` and `label`.
pub fn normalize_entities(config: Value) -> Result<Value, NormalizeError> {
    let mut root = into_root(config)?;
    let declarations: Vec<(Option<String>, Value)> = match root.get_mut("entities").map(Value::take) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().map(|item| (None, item)).collect(),
        Some(Value::Object(map)) => map
            .into_iter()
            .map(|(key, item)| {
                if is_numeric_key(&key) {
                    (None, item)
                } else {
                    (Some(key), item)
                }
            })
            .collect(),
        Some(_) => return Err(NormalizeError::InvalidEntities),
    };

    let mut normalized = Map::new();
    for (position, (declared_name, declaration)) in declarations.into_iter().enumerate() {
        let display_name = declared_name
            .clone()
            .unwrap_or_else(|| position.to_string());

        let mut entity = match declaration {
            Value::String(class) => {
                let mut entity = Map::new();
                entity.insert("class".to_string(), Value::String(class));
                entity
            }
            Value::Object(entity) => entity,
            _ => {
                return Err(NormalizeError::InvalidEntityDeclaration {
                    entity: display_name,
                })
            }
        };

        let class = match entity.get("class") {
            Some(Value::String(class)) if !class.is_empty() => class.clone(),
            _ => {
                return Err(NormalizeError::MissingClass {
                    entity: display_name,
                })
            }
        };

        let name = match declared_name {
            Some(name) => {
                if !is_valid_entity_name(&name) {
                    return Err(NormalizeError::InvalidEntityName { entity: name });
                }
                name
            }
            None => unique_entity_name(short_class_name(&class), &normalized),
        };

        if !entity.contains_key("label") {
            entity.insert("label".to_string(), Value::String(name.clone()));
        }
        entity.insert("name".to_string(), Value::String(name.clone()));
        normalized.insert(name, Value::Object(entity));
    }

    root.insert("entities".to_string(), Value::Object(normalized));
    Ok(Value::Object(root))
}

/// Shallow-merges the shared `form` view into `new` and `edit`; explicit keys win.
pub fn normalize_form_views(config: Value) -> Result<Value, NormalizeError> {
    map_entities(config, |name, entity| {
        let form = match entity.get("form") {
            None => return Ok(()),
            Some(Value::Object(form)) => form.clone(),
            Some(_) => {
                return Err(NormalizeError::InvalidView {
                    entity: name.to_string(),
                    view: "form".to_string(),
                })
            }
        };

        for view in FORM_VIEWS {
            let merged = match entity.get_mut(view).map(Value::take) {
                None | Some(Value::Null) => form.clone(),
                Some(Value::Object(explicit)) => {
                    let mut merged = form.clone();
                    for (key, value) in explicit {
                        merged.insert(key, value);
                    }
                    merged
                }
                Some(_) => {
                    return Err(NormalizeError::InvalidView {
                        entity: name.to_string(),
                        view: view.to_string(),
                    })
                }
            };
            entity.insert(view.to_string(), Value::Object(merged));
        }
        Ok(())
    })
}

/// Makes sure every view has `fields`, and form views also have `form_options`.
pub fn normalize_views(config: Value) -> Result<Value, NormalizeError> {
    map_entities(config, |name, entity| {
        for view in VIEWS {
            let slot = entity
                .entry(view.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(view_config) = slot else {
                return Err(NormalizeError::InvalidView {
                    entity: name.to_string(),
                    view: view.to_string(),
                });
            };

            view_config
                .entry("fields".to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if FORM_VIEWS.contains(&view) {
                view_config
                    .entry("form_options".to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
            }
        }
        Ok(())
    })
}

/// Expands field shorthands and keys every view's fields by property name.
pub fn normalize_fields(config: Value) -> Result<Value, NormalizeError> {
    map_entities(config, |name, entity| {
        let image_base_path = entity.get("image_base_path").cloned();

        for view in VIEWS {
            let Some(Value::Object(view_config)) = entity.get_mut(view) else {
                continue;
            };

            let declared: Vec<Value> = match view_config.get_mut("fields").map(Value::take) {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items,
                Some(Value::Object(map)) => map.into_iter().map(|(_, field)| field).collect(),
                Some(other) => {
                    return Err(NormalizeError::InvalidField {
                        entity: name.to_string(),
                        view: view.to_string(),
                        position: 0,
                        found: json_type(&other),
                    })
                }
            };

            let mut fields = Map::new();
            for (position, field) in declared.into_iter().enumerate() {
                let mut field = match field {
                    Value::String(property) => {
                        let mut field = Map::new();
                        field.insert("property".to_string(), Value::String(property));
                        field
                    }
                    Value::Object(field) => field,
                    other => {
                        return Err(NormalizeError::InvalidField {
                            entity: name.to_string(),
                            view: view.to_string(),
                            position,
                            found: json_type(&other),
                        })
                    }
                };

                let property = match field.get("property") {
                    Some(Value::String(property)) => property.clone(),
                    Some(Value::Number(number)) => number.to_string(),
                    _ => {
                        return Err(NormalizeError::MissingProperty {
                            entity: name.to_string(),
                            view: view.to_string(),
                            position,
                        })
                    }
                };

                let is_image = field.get("type").and_then(Value::as_str) == Some("image");
                if is_image && !field.contains_key("base_path") {
                    if let Some(base_path) = &image_base_path {
                        field.insert("base_path".to_string(), base_path.clone());
                    }
                }

                // same property declared twice: the last one silently replaces the first
                fields.insert(property, Value::Object(field));
            }

            view_config.insert("fields".to_string(), Value::Object(fields));
        }
        Ok(())
    })
}

/// Applies `f` to every entity mapping of an entity-normalized tree.
pub(crate) fn map_entities<F>(config: Value, mut f: F) -> Result<Value, NormalizeError>
where
    F: FnMut(&str, &mut Map<String, Value>) -> Result<(), NormalizeError>,
{
    let mut root = into_root(config)?;
    if let Some(Value::Object(entities)) = root.get_mut("entities") {
        for (name, entity) in entities.iter_mut() {
            let Value::Object(entity) = entity else {
                return Err(NormalizeError::InvalidEntityDeclaration {
                    entity: name.clone(),
                });
            };
            f(name, entity)?;
        }
    }
    Ok(Value::Object(root))
}

fn into_root(config: Value) -> Result<Map<String, Value>, NormalizeError> {
    match config {
        Value::Object(root) => Ok(root),
        Value::Null => Ok(Map::new()),
        _ => Err(NormalizeError::InvalidRoot),
    }
}

fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Entity names end up in URLs and handler names, so they must look like identifiers.
pub fn is_valid_entity_name(name: &str) -> bool {
    let name = name.strip_prefix('-').unwrap_or(name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || !first.is_ascii() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii())
}

/// Appends `2`, `3`, ... to `base` until it doesn't clash with an existing entity.
fn unique_entity_name(base: &str, existing: &Map<String, Value>) -> String {
    let mut candidate = base.to_string();
    let mut suffix = 2;
    while existing.contains_key(&candidate) {
        candidate = format!("{base}{suffix}");
        suffix += 1;
    }
    candidate
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_one_derives_unique_names() {
        let config = json!({ "entities": ["App\\Entity\\User", "App\\Entity\\User", "App\\Entity\\User"] });
        let normalized = normalize(config).unwrap();
        let entities = normalized["entities"].as_object().unwrap();

        let names: Vec<&String> = entities.keys().collect();
        assert_eq!(names, ["User", "User2", "User3"]);
        for (name, entity) in entities {
            assert_eq!(entity["class"], "App\\Entity\\User");
            assert_eq!(entity["label"], name.as_str());
            assert_eq!(entity["name"], name.as_str());
        }
    }

    #[test]
    fn test_format_two_and_three() {
        let config = json!({
            "entities": {
                "Customer": "App\\Entity\\User",
                "Product": { "class": "App\\Entity\\Product", "label": "Inventory" },
            }
        });
        let normalized = normalize(config).unwrap();

        assert_eq!(normalized["entities"]["Customer"]["class"], "App\\Entity\\User");
        assert_eq!(normalized["entities"]["Customer"]["label"], "Customer");
        assert_eq!(normalized["entities"]["Product"]["label"], "Inventory");
        assert_eq!(normalized["entities"]["Product"]["name"], "Product");
    }

    #[test]
    fn test_numeric_keys_in_mapping_behave_like_format_one() {
        let config = json!({
            "entities": {
                "User": "App\\Entity\\Admin",
                "0": "App\\Entity\\User",
            }
        });
        let normalized = normalize(config).unwrap();
        let names: Vec<&String> = normalized["entities"].as_object().unwrap().keys().collect();
        assert_eq!(names, ["User", "User2"]);
    }

    #[test]
    fn test_missing_class_is_fatal() {
        let config = json!({ "entities": { "User": { "label": "Users" } } });
        assert_eq!(
            normalize(config).unwrap_err(),
            NormalizeError::MissingClass { entity: "User".into() }
        );
    }

    #[test]
    fn test_invalid_entity_name_is_fatal() {
        let config = json!({ "entities": { "1User": "App\\Entity\\User" } });
        assert!(matches!(
            normalize(config),
            Err(NormalizeError::InvalidEntityName { entity }) if entity == "1User"
        ));

        let config = json!({ "entities": { "User Admin": "App\\Entity\\User" } });
        assert!(normalize(config).is_err());
    }

    #[test]
    fn test_entity_name_rules() {
        assert!(is_valid_entity_name("User"));
        assert!(is_valid_entity_name("_user_2"));
        assert!(is_valid_entity_name("-User"));
        assert!(is_valid_entity_name("Usuário"));
        assert!(!is_valid_entity_name("2User"));
        assert!(!is_valid_entity_name("Us-er"));
        assert!(!is_valid_entity_name(""));
    }

    #[test]
    fn test_form_view_merge_keeps_explicit_values() {
        let config = json!({
            "entities": {
                "User": {
                    "class": "App\\Entity\\User",
                    "form": { "title": "Shared", "help": "Shared help" },
                    "edit": { "title": "Edit user" },
                }
            }
        });
        let normalized = normalize(config).unwrap();
        let user = &normalized["entities"]["User"];

        assert_eq!(user["edit"]["title"], "Edit user");
        assert_eq!(user["edit"]["help"], "Shared help");
        assert_eq!(user["new"]["title"], "Shared");
    }

    #[test]
    fn test_every_view_is_complete() {
        let normalized = normalize(json!({ "entities": ["App\\Entity\\User"] })).unwrap();
        let user = &normalized["entities"]["User"];

        for view in VIEWS {
            assert!(user[view]["fields"].is_object(), "{view} has no fields");
        }
        for view in FORM_VIEWS {
            assert!(user[view]["form_options"].is_object(), "{view} has no form_options");
        }
        assert!(user["list"].get("form_options").is_none());
    }

    #[test]
    fn test_field_shorthand_and_image_base_path() {
        let config = json!({
            "entities": {
                "Product": {
                    "class": "App\\Entity\\Product",
                    "image_base_path": "/uploads/images",
                    "list": {
                        "fields": [
                            "id",
                            { "property": "image", "type": "image" },
                            { "property": "thumbnail", "type": "image", "base_path": "/thumbs" },
                        ]
                    }
                }
            }
        });
        let normalized = normalize(config).unwrap();
        let fields = &normalized["entities"]["Product"]["list"]["fields"];

        assert_eq!(fields["id"], json!({ "property": "id" }));
        assert_eq!(fields["image"]["base_path"], "/uploads/images");
        assert_eq!(fields["thumbnail"]["base_path"], "/thumbs");
    }

    #[test]
    fn test_duplicate_field_last_one_wins() {
        let config = json!({
            "entities": {
                "User": {
                    "class": "App\\Entity\\User",
                    "list": { "fields": ["name", "email", { "property": "name", "label": "Full name" }] }
                }
            }
        });
        let normalized = normalize(config).unwrap();
        let fields = normalized["entities"]["User"]["list"]["fields"].as_object().unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["name"]["label"], "Full name");
    }

    #[test]
    fn test_invalid_fields_name_the_offender() {
        let config = json!({
            "entities": { "User": { "class": "App\\Entity\\User", "show": { "fields": ["id", 42] } } }
        });
        let err = normalize(config).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::InvalidField {
                entity: "User".into(),
                view: "show".into(),
                position: 1,
                found: "a number",
            }
        );
        assert!(err.to_string().contains("\"show\" view of the \"User\" entity"));

        let config = json!({
            "entities": { "User": { "class": "App\\Entity\\User", "edit": { "fields": [{ "label": "x" }] } } }
        });
        assert!(matches!(
            normalize(config),
            Err(NormalizeError::MissingProperty { view, .. }) if view == "edit"
        ));
    }

    #[test]
    fn test_normalizing_twice_is_stable() {
        let config = json!({
            "entities": [
                "App\\Entity\\User",
                { "class": "App\\Entity\\Post", "form": { "fields": ["title", "body"] }, "new": { "title": "Write" } },
                "App\\Entity\\User",
            ]
        });
        let once = normalize(config).unwrap();
        let twice = normalize(once.clone()).unwrap();

        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }
}
