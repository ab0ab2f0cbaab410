//! Entity metadata and the per-request entity DTO.
//!
//! Persistence is out of scope: metadata and instances come from an
//! [`EntityMetadataProvider`], usually the static one built from configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::ActionDto;
use crate::config::{ConfigManager, ResolveError};
use crate::naming::short_class_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub fqcn: String,
    /// Name of the primary key property.
    pub identifier: String,
    pub properties: Vec<PropertyMetadata>,
}

impl EntityMetadata {
    pub fn new(fqcn: impl Into<String>) -> Self {
        Self {
            fqcn: fqcn.into(),
            identifier: "id".to_string(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, property_type: impl Into<String>) -> Self {
        let name = name.into();
        if self.property(&name).is_none() {
            self.properties.push(PropertyMetadata {
                name,
                property_type: property_type.into(),
                nullable: false,
            });
        }
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.iter().find(|p| p.name == name)
    }
}

pub trait EntityMetadataProvider: Send + Sync {
    fn metadata(&self, fqcn: &str) -> Option<EntityMetadata>;

    /// Loads the instance with the given primary key.
    fn find(&self, _fqcn: &str, _id: &str) -> Option<Value> {
        None
    }
}

/// Metadata and instances registered up front.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataProvider {
    entities: HashMap<String, EntityMetadata>,
    instances: HashMap<(String, String), Value>,
}

impl StaticMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per configured entity; properties are the union of the fields of every view.
    pub fn from_config(config: &ConfigManager) -> Result<Self, ResolveError> {
        let mut provider = Self::new();
        for entity in config.entity_configs()? {
            let mut metadata = EntityMetadata::new(&entity.class);
            for view in ["list", "show", "edit", "new", "search"] {
                let Some(view) = entity.view(view) else {
                    continue;
                };
                for field in &view.fields {
                    let property_type = field.field_type.as_deref().unwrap_or("text");
                    metadata = metadata.with_property(&field.property, property_type);
                }
            }
            provider.register(metadata);
        }
        Ok(provider)
    }

    pub fn register(&mut self, metadata: EntityMetadata) -> &mut Self {
        self.entities.insert(metadata.fqcn.clone(), metadata);
        self
    }

    pub fn contains(&self, fqcn: &str) -> bool {
        self.entities.contains_key(fqcn)
    }

    pub fn add_instance(&mut self, fqcn: impl Into<String>, id: impl Into<String>, instance: Value) -> &mut Self {
        self.instances.insert((fqcn.into(), id.into()), instance);
        self
    }
}

impl EntityMetadataProvider for StaticMetadataProvider {
    fn metadata(&self, fqcn: &str) -> Option<EntityMetadata> {
        self.entities.get(fqcn).cloned()
    }

    fn find(&self, fqcn: &str, id: &str) -> Option<Value> {
        self.instances
            .get(&(fqcn.to_string(), id.to_string()))
            .cloned()
    }
}

/// The entity managed by the current CRUD request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDto {
    pub fqcn: String,
    pub name: String,
    pub primary_key_name: String,
    pub primary_key_value: Option<String>,
    pub instance: Option<Value>,
    /// Role required to access the entity.
    pub permission: Option<String>,
    #[serde(skip)]
    pub metadata: EntityMetadata,
    pub actions: Vec<ActionDto>,
}

impl EntityDto {
    pub fn new(metadata: EntityMetadata, primary_key_value: Option<String>, instance: Option<Value>) -> Self {
        Self {
            fqcn: metadata.fqcn.clone(),
            name: short_class_name(&metadata.fqcn).to_string(),
            primary_key_name: metadata.identifier.clone(),
            primary_key_value,
            instance,
            permission: None,
            metadata,
            actions: Vec::new(),
        }
    }

    /// Copy of this entity bound to another instance, e.g. one row of an index page.
    pub fn with_instance(&self, instance: Value) -> Self {
        let primary_key_value = instance
            .get(&self.primary_key_name)
            .and_then(crate::http::query::scalar_to_string);
        Self {
            primary_key_value,
            instance: Some(instance),
            actions: Vec::new(),
            ..self.clone()
        }
    }

    /// Value of `property` on the instance; dotted paths walk nested objects.
    pub fn property_value(&self, property: &str) -> Value {
        let mut current = match &self.instance {
            Some(instance) => instance,
            None => return Value::Null,
        };
        for segment in property.split('.') {
            match current.get(segment) {
                Some(value) => current = value,
                None => return Value::Null,
            }
        }
        current.clone()
    }
}
