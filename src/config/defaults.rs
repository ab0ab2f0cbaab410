//! Default values injected after normalization.
//!
//! Every entity gets `disabled_actions`, and every view an `actions` mapping
//! keyed by action name. Declared actions are merged over the view defaults:
//!
//! ```text
//! actions = ["export", { name = "edit", label = "Modify" }, "-delete"]
//!     -> edit (label overridden), search, new, export   (delete removed)
//! ```
//!
//! A view whose `actions` is already a mapping has been through this pass and
//! is left untouched.

use serde_json::{Map, Value};

use super::normalizer::{map_entities, NormalizeError, VIEWS};

/// Actions available in each view when nothing else is configured.
pub fn default_view_actions(view: &str) -> &'static [&'static str] {
    match view {
        "list" => &["edit", "delete", "search", "new"],
        "search" => &["edit", "delete"],
        "show" => &["edit", "delete", "list"],
        "edit" => &["delete", "list"],
        "new" => &["list"],
        _ => &[],
    }
}

/// Injects defaults into an already normalized tree.
pub fn apply_defaults(config: Value) -> Result<Value, NormalizeError> {
    map_entities(config, |name, entity| {
        match entity.get_mut("disabled_actions") {
            None => {
                entity.insert("disabled_actions".to_string(), Value::Array(Vec::new()));
            }
            Some(slot @ Value::Null) => *slot = Value::Array(Vec::new()),
            Some(Value::String(action)) => {
                let action = std::mem::take(action);
                entity.insert(
                    "disabled_actions".to_string(),
                    Value::Array(vec![Value::String(action)]),
                );
            }
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
            Some(_) => {
                return Err(NormalizeError::InvalidDisabledActions {
                    entity: name.to_string(),
                })
            }
        }

        for view in VIEWS {
            let Some(Value::Object(view_config)) = entity.get_mut(view) else {
                continue;
            };
            let declared = view_config.get_mut("actions").map(Value::take);
            let actions = match declared {
                Some(Value::Object(actions)) => actions,
                None | Some(Value::Null) => default_actions(view),
                Some(Value::Array(items)) => merge_actions(name, view, items)?,
                Some(_) => {
                    return Err(NormalizeError::InvalidAction {
                        entity: name.to_string(),
                        view: view.to_string(),
                        position: 0,
                    })
                }
            };
            view_config.insert("actions".to_string(), Value::Object(actions));
        }
        Ok(())
    })
}

fn default_actions(view: &str) -> Map<String, Value> {
    default_view_actions(view)
        .iter()
        .map(|name| (name.to_string(), action_entry(name)))
        .collect()
}

fn action_entry(name: &str) -> Value {
    let mut action = Map::new();
    action.insert("name".to_string(), Value::String(name.to_string()));
    Value::Object(action)
}

fn merge_actions(
    entity: &str,
    view: &str,
    declared: Vec<Value>,
) -> Result<Map<String, Value>, NormalizeError> {
    let mut actions = default_actions(view);

    for (position, item) in declared.into_iter().enumerate() {
        let invalid = || NormalizeError::InvalidAction {
            entity: entity.to_string(),
            view: view.to_string(),
            position,
        };

        match item {
            Value::String(name) => {
                if let Some(removed) = name.strip_prefix('-') {
                    actions.shift_remove(removed);
                } else if name.is_empty() {
                    return Err(invalid());
                } else if !actions.contains_key(&name) {
                    actions.insert(name.clone(), action_entry(&name));
                }
            }
            Value::Object(config) => {
                let name = match config.get("name") {
                    Some(Value::String(name)) if !name.is_empty() => name.clone(),
                    _ => return Err(invalid()),
                };
                let slot = actions
                    .entry(name)
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(existing) = slot {
                    for (key, value) in config {
                        existing.insert(key, value);
                    }
                }
            }
            _ => return Err(invalid()),
        }
    }

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::normalizer::normalize;
    use serde_json::json;

    fn resolved(config: Value) -> Value {
        apply_defaults(normalize(config).unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_are_injected() {
        let config = resolved(json!({ "entities": ["App\\Entity\\User"] }));
        let user = &config["entities"]["User"];

        assert_eq!(user["disabled_actions"], json!([]));
        let list: Vec<&String> = user["list"]["actions"].as_object().unwrap().keys().collect();
        assert_eq!(list, ["edit", "delete", "search", "new"]);
        assert_eq!(user["new"]["actions"]["list"], json!({ "name": "list" }));
    }

    #[test]
    fn test_declared_actions_merge_over_defaults() {
        let config = resolved(json!({
            "entities": {
                "User": {
                    "class": "App\\Entity\\User",
                    "list": { "actions": ["export", { "name": "edit", "label": "Modify" }, "-delete"] }
                }
            }
        }));
        let actions = config["entities"]["User"]["list"]["actions"].as_object().unwrap();

        let names: Vec<&String> = actions.keys().collect();
        assert_eq!(names, ["edit", "search", "new", "export"]);
        assert_eq!(actions["edit"]["label"], "Modify");
    }

    #[test]
    fn test_action_mapping_requires_a_name() {
        let config = normalize(json!({
            "entities": { "User": { "class": "App\\Entity\\User", "show": { "actions": [{ "label": "x" }] } } }
        }))
        .unwrap();
        assert!(matches!(
            apply_defaults(config),
            Err(NormalizeError::InvalidAction { view, position: 0, .. }) if view == "show"
        ));
    }

    #[test]
    fn test_disabled_actions_shorthand() {
        let config = resolved(json!({
            "entities": { "User": { "class": "App\\Entity\\User", "disabled_actions": "delete" } }
        }));
        assert_eq!(config["entities"]["User"]["disabled_actions"], json!(["delete"]));
    }

    #[test]
    fn test_applying_defaults_twice_is_stable() {
        let once = resolved(json!({
            "entities": { "User": { "class": "App\\Entity\\User", "list": { "actions": ["-delete"] } } }
        }));
        let twice = apply_defaults(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert!(twice["entities"]["User"]["list"]["actions"].get("delete").is_none());
    }
}
