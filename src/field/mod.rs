//! Field configuration chain.
//!
//! # Data Flow
//! ```text
//! ViewConfig.fields (backend configuration)
//!     → FieldDto::from_config
//!     → FieldFactory: every configurator whose `supports` holds, in registration order
//!         CommonPreConfigurator  (value, label)
//!         ImageConfigurator      (image URL from base_path)
//!         CommonPostConfigurator (CSS class, template, formatted value)
//!     → FieldDto rendered with the page
//! ```

mod configurators;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::FieldConfig;
use crate::context::AdminContext;
use crate::entity::EntityDto;

pub use configurators::{CommonPostConfigurator, CommonPreConfigurator, ImageConfigurator};

/// A field of the current page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDto {
    pub property: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub label: Option<String>,
    pub value: Value,
    pub formatted_value: Value,
    pub css_class: String,
    pub template_path: Option<String>,
    pub base_path: Option<String>,
    /// Remaining keys of the field configuration.
    pub custom_options: Map<String, Value>,
}

impl FieldDto {
    pub fn new(property: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            field_type: field_type.into(),
            label: None,
            value: Value::Null,
            formatted_value: Value::Null,
            css_class: String::new(),
            template_path: None,
            base_path: None,
            custom_options: Map::new(),
        }
    }

    /// Untyped fields take the type of the entity property, or `text`.
    pub fn from_config(config: &FieldConfig, entity: &EntityDto) -> Self {
        let field_type = config
            .field_type
            .clone()
            .or_else(|| {
                entity
                    .metadata
                    .property(&config.property)
                    .map(|p| p.property_type.clone())
            })
            .unwrap_or_else(|| "text".to_string());

        Self {
            label: config.label.clone(),
            base_path: config.base_path.clone(),
            custom_options: config.options.clone(),
            ..Self::new(config.property.clone(), field_type)
        }
    }
}

pub trait FieldConfigurator: Send + Sync {
    fn supports(&self, field: &FieldDto, entity: &EntityDto) -> bool;

    fn configure(&self, field: &mut FieldDto, entity: &EntityDto, context: &AdminContext);
}

type Supports = dyn Fn(&FieldDto, &EntityDto) -> bool + Send + Sync;
type Configure = dyn Fn(&mut FieldDto, &EntityDto, &AdminContext) + Send + Sync;

/// Configurator made of two closures.
pub struct FnConfigurator {
    supports: Box<Supports>,
    configure: Box<Configure>,
}

impl FnConfigurator {
    pub fn new<S, C>(supports: S, configure: C) -> Self
    where
        S: Fn(&FieldDto, &EntityDto) -> bool + Send + Sync + 'static,
        C: Fn(&mut FieldDto, &EntityDto, &AdminContext) + Send + Sync + 'static,
    {
        Self {
            supports: Box::new(supports),
            configure: Box::new(configure),
        }
    }
}

impl FieldConfigurator for FnConfigurator {
    fn supports(&self, field: &FieldDto, entity: &EntityDto) -> bool {
        (self.supports)(field, entity)
    }

    fn configure(&self, field: &mut FieldDto, entity: &EntityDto, context: &AdminContext) {
        (self.configure)(field, entity, context)
    }
}

/// Runs every supporting configurator on each field.
#[derive(Clone)]
pub struct FieldFactory {
    configurators: Vec<Arc<dyn FieldConfigurator>>,
}

impl Default for FieldFactory {
    fn default() -> Self {
        Self::new(vec![
            Arc::new(CommonPreConfigurator),
            Arc::new(ImageConfigurator),
            Arc::new(CommonPostConfigurator),
        ])
    }
}

impl FieldFactory {
    pub fn new(configurators: Vec<Arc<dyn FieldConfigurator>>) -> Self {
        Self { configurators }
    }

    /// Inserts `configurator` right before the last one, so common post-processing still runs last.
    pub fn with_configurator(mut self, configurator: Arc<dyn FieldConfigurator>) -> Self {
        let position = self.configurators.len().saturating_sub(1);
        self.configurators.insert(position, configurator);
        self
    }

    pub fn len(&self) -> usize {
        self.configurators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurators.is_empty()
    }

    pub fn process_fields(&self, context: &AdminContext, entity: &EntityDto, fields: &[FieldConfig]) -> Vec<FieldDto> {
        fields
            .iter()
            .map(|config| {
                let mut field = FieldDto::from_config(config, entity);
                for configurator in &self.configurators {
                    if configurator.supports(&field, entity) {
                        configurator.configure(&mut field, entity, context);
                    }
                }
                field
            })
            .collect()
    }
}
