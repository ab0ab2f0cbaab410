//! Lazily resolved backend configuration.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

use super::defaults::apply_defaults;
use super::normalizer::{normalize, NormalizeError};

/// One step of the configuration pipeline.
pub trait ConfigPass: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, config: Value) -> Result<Value, NormalizeError>;
}

/// Expands shorthands into the canonical tree.
#[derive(Debug, Default)]
pub struct NormalizerConfigPass;

impl ConfigPass for NormalizerConfigPass {
    fn name(&self) -> &'static str {
        "normalizer"
    }

    fn process(&self, config: Value) -> Result<Value, NormalizeError> {
        normalize(config)
    }
}

/// Injects default values into the canonical tree.
#[derive(Debug, Default)]
pub struct DefaultConfigPass;

impl ConfigPass for DefaultConfigPass {
    fn name(&self) -> &'static str {
        "defaults"
    }

    fn process(&self, config: Value) -> Result<Value, NormalizeError> {
        apply_defaults(config)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("invalid backend configuration: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("the \"{entity}\" entity configuration cannot be read: {message}")]
    InvalidEntity { entity: String, message: String },

    #[error("undefined entity \"{0}\"")]
    UndefinedEntity(String),
}

/// Typed view of one normalized entity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub class: String,
    pub label: String,
    #[serde(default)]
    pub disabled_actions: Vec<String>,
    #[serde(default)]
    pub image_base_path: Option<String>,
    pub edit: ViewConfig,
    pub list: ViewConfig,
    pub new: ViewConfig,
    pub search: ViewConfig,
    pub show: ViewConfig,
}

impl EntityConfig {
    pub fn view(&self, view: &str) -> Option<&ViewConfig> {
        match view {
            "edit" => Some(&self.edit),
            "list" => Some(&self.list),
            "new" => Some(&self.new),
            "search" => Some(&self.search),
            "show" => Some(&self.show),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ViewConfig {
    #[serde(default, deserialize_with = "fields_in_order")]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub form_options: Option<Map<String, Value>>,
    #[serde(default)]
    pub actions: Map<String, Value>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldConfig {
    pub property: String,
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

fn fields_in_order<'de, D>(deserializer: D) -> Result<Vec<FieldConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = Map::<String, Value>::deserialize(deserializer)?;
    fields
        .into_iter()
        .map(|(_, field)| FieldConfig::deserialize(field).map_err(serde::de::Error::custom))
        .collect()
}

#[derive(Debug)]
struct Resolved {
    tree: Value,
    entities: Vec<EntityConfig>,
    by_name: HashMap<String, usize>,
}

/// Runs the registered passes once, on first access, and serves lookups from the result.
///
/// # Example
/// ```
/// use admin_panel::config::ConfigManager;
/// use serde_json::json;
///
/// let manager = ConfigManager::new(json!({ "entities": ["App\\Entity\\User"] }));
/// let user = manager.entity_config("User").unwrap();
/// assert_eq!(user.class, "App\\Entity\\User");
/// ```
pub struct ConfigManager {
    original: Value,
    passes: Vec<Box<dyn ConfigPass>>,
    resolved: OnceLock<Resolved>,
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("passes", &self.passes.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}

impl ConfigManager {
    /// Creates a manager with the normalizer and defaults passes.
    pub fn new(original: Value) -> Self {
        Self::with_passes(
            original,
            vec![Box::new(NormalizerConfigPass), Box::new(DefaultConfigPass)],
        )
    }

    pub fn with_passes(original: Value, passes: Vec<Box<dyn ConfigPass>>) -> Self {
        Self {
            original,
            passes,
            resolved: OnceLock::new(),
        }
    }

    /// Forces resolution so configuration mistakes surface at startup.
    pub fn warm_up(&self) -> Result<(), ResolveError> {
        self.resolved().map(|_| ())
    }

    /// Returns the whole resolved tree, or the value at `path`.
    ///
    /// Paths use dots (`entities.User.list`) or brackets (`[entities][User][list]`).
    pub fn resolved_config(&self, path: Option<&str>) -> Result<Option<&Value>, ResolveError> {
        let resolved = self.resolved()?;
        let Some(path) = path else {
            return Ok(Some(&resolved.tree));
        };

        let mut current = &resolved.tree;
        for segment in path
            .split(|c| c == '.' || c == '[' || c == ']')
            .filter(|s| !s.is_empty())
        {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    pub fn entity_configs(&self) -> Result<&[EntityConfig], ResolveError> {
        Ok(&self.resolved()?.entities)
    }

    pub fn entity_config(&self, name: &str) -> Result<&EntityConfig, ResolveError> {
        let resolved = self.resolved()?;
        resolved
            .by_name
            .get(name)
            .map(|&index| &resolved.entities[index])
            .ok_or_else(|| ResolveError::UndefinedEntity(name.to_string()))
    }

    /// First entity, in declaration order, managing `class`.
    pub fn entity_config_by_class(&self, class: &str) -> Result<Option<&EntityConfig>, ResolveError> {
        Ok(self
            .resolved()?
            .entities
            .iter()
            .find(|entity| entity.class == class))
    }

    /// Configuration of `action` in `view`, or an empty mapping.
    pub fn action_config(
        &self,
        entity: &str,
        view: &str,
        action: &str,
    ) -> Result<Map<String, Value>, ResolveError> {
        let Some(config) = self.defined_entity(entity)? else {
            return Ok(Map::new());
        };
        Ok(config
            .view(view)
            .and_then(|view| view.actions.get(action))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default())
    }

    /// True when `action` is not disabled for the entity and is configured for `view`.
    pub fn is_action_enabled(&self, entity: &str, view: &str, action: &str) -> Result<bool, ResolveError> {
        let Some(config) = self.defined_entity(entity)? else {
            return Ok(false);
        };
        if config.disabled_actions.iter().any(|disabled| disabled == action) {
            return Ok(false);
        }
        Ok(config
            .view(view)
            .is_some_and(|view| view.actions.contains_key(action)))
    }

    /// Like [`entity_config`](Self::entity_config), with an unknown entity as `None`.
    fn defined_entity(&self, name: &str) -> Result<Option<&EntityConfig>, ResolveError> {
        match self.entity_config(name) {
            Ok(config) => Ok(Some(config)),
            Err(ResolveError::UndefinedEntity(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn resolved(&self) -> Result<&Resolved, ResolveError> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(resolved);
        }
        let resolved = self.resolve()?;
        // a racing thread may have won; its result is identical
        Ok(self.resolved.get_or_init(|| resolved))
    }

    fn resolve(&self) -> Result<Resolved, ResolveError> {
        let mut tree = self.original.clone();
        for pass in &self.passes {
            tree = pass.process(tree)?;
            tracing::trace!(pass = pass.name(), "Backend configuration pass applied");
        }

        let mut entities = Vec::new();
        let mut by_name = HashMap::new();
        if let Some(Value::Object(declared)) = tree.get("entities") {
            for (name, entity) in declared {
                let config = EntityConfig::deserialize(entity).map_err(|e| ResolveError::InvalidEntity {
                    entity: name.clone(),
                    message: e.to_string(),
                })?;
                by_name.insert(name.clone(), entities.len());
                entities.push(config);
            }
        }

        tracing::debug!(entities = entities.len(), "Backend configuration resolved");
        Ok(Resolved {
            tree,
            entities,
            by_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn manager() -> ConfigManager {
        ConfigManager::new(json!({
            "entities": {
                "Customer": {
                    "class": "App\\Entity\\User",
                    "disabled_actions": ["delete"],
                    "list": { "fields": ["id", { "property": "email", "label": "E-mail" }] }
                },
                "Admin": "App\\Entity\\User",
                "Product": "App\\Entity\\Product",
            }
        }))
    }

    #[test]
    fn test_resolved_config_paths() {
        let manager = manager();
        let by_dots = manager.resolved_config(Some("entities.Customer.list.fields.email.label")).unwrap();
        let by_brackets = manager
            .resolved_config(Some("[entities][Customer][list][fields][email][label]"))
            .unwrap();

        assert_eq!(by_dots, Some(&json!("E-mail")));
        assert_eq!(by_dots, by_brackets);
        assert_eq!(manager.resolved_config(Some("entities.Nope")).unwrap(), None);
        assert!(manager.resolved_config(None).unwrap().unwrap()["entities"].is_object());
    }

    #[test]
    fn test_entity_lookups() {
        let manager = manager();

        let customer = manager.entity_config("Customer").unwrap();
        assert_eq!(customer.list.fields.len(), 2);
        assert_eq!(customer.list.fields[1].label.as_deref(), Some("E-mail"));

        assert_eq!(
            manager.entity_config("Missing").unwrap_err(),
            ResolveError::UndefinedEntity("Missing".into())
        );

        // first declared entity wins when two share a class
        let by_class = manager.entity_config_by_class("App\\Entity\\User").unwrap().unwrap();
        assert_eq!(by_class.name, "Customer");
        assert!(manager.entity_config_by_class("App\\Entity\\Nope").unwrap().is_none());
    }

    #[test]
    fn test_action_lookups() {
        let manager = manager();

        assert_eq!(
            manager.action_config("Customer", "list", "edit").unwrap(),
            json!({ "name": "edit" }).as_object().cloned().unwrap()
        );
        assert!(manager.action_config("Customer", "list", "export").unwrap().is_empty());

        assert!(manager.is_action_enabled("Customer", "list", "edit").unwrap());
        assert!(!manager.is_action_enabled("Customer", "list", "delete").unwrap());
        assert!(manager.is_action_enabled("Admin", "list", "delete").unwrap());
        assert!(!manager.is_action_enabled("Admin", "new", "delete").unwrap());
    }

    #[test]
    fn test_action_lookups_on_unknown_entity() {
        let manager = ConfigManager::new(json!({ "entities": ["App\\Entity\\User"] }));

        assert!(manager.action_config("Missing", "list", "edit").unwrap().is_empty());
        assert!(manager.action_config("User", "nope", "edit").unwrap().is_empty());
        assert!(!manager.is_action_enabled("Missing", "list", "edit").unwrap());
    }

    #[test]
    fn test_passes_run_once() {
        struct Counting(Arc<AtomicUsize>);

        impl ConfigPass for Counting {
            fn name(&self) -> &'static str {
                "counting"
            }

            fn process(&self, config: Value) -> Result<Value, NormalizeError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(config)
            }
        }

        let runs = Arc::new(AtomicUsize::new(0));
        let manager = ConfigManager::with_passes(
            json!({ "entities": [] }),
            vec![Box::new(NormalizerConfigPass), Box::new(Counting(runs.clone()))],
        );

        manager.warm_up().unwrap();
        manager.resolved_config(None).unwrap();
        manager.entity_configs().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_normalization_errors_surface_on_warm_up() {
        let manager = ConfigManager::new(json!({ "entities": { "User": { "label": "x" } } }));
        assert!(matches!(
            manager.warm_up(),
            Err(ResolveError::Normalize(NormalizeError::MissingClass { .. }))
        ));
    }
}
