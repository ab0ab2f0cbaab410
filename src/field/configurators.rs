//! Built-in field configurators.

use serde_json::Value;

use super::{FieldConfigurator, FieldDto};
use crate::context::AdminContext;
use crate::entity::EntityDto;
use crate::naming::humanize;

/// Reads the value and sets the label; runs on every field.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommonPreConfigurator;

impl FieldConfigurator for CommonPreConfigurator {
    fn supports(&self, _field: &FieldDto, _entity: &EntityDto) -> bool {
        true
    }

    fn configure(&self, field: &mut FieldDto, entity: &EntityDto, context: &AdminContext) {
        field.value = entity.property_value(&field.property);
        let label = field
            .label
            .clone()
            .unwrap_or_else(|| humanize(&field.property));
        field.label = Some(context.trans(&label));
    }
}

/// Turns an image file name into a URL below the field base path.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageConfigurator;

impl FieldConfigurator for ImageConfigurator {
    fn supports(&self, field: &FieldDto, _entity: &EntityDto) -> bool {
        field.field_type == "image"
    }

    fn configure(&self, field: &mut FieldDto, _entity: &EntityDto, _context: &AdminContext) {
        let file = match &field.value {
            Value::String(file) if !file.is_empty() => file.as_str(),
            _ => {
                field.formatted_value = Value::Null;
                return;
            }
        };
        let url = if file.contains("://") || file.starts_with('/') {
            file.to_string()
        } else {
            match field.base_path.as_deref() {
                Some(base) => format!("{}/{}", base.trim_end_matches('/'), file),
                None => file.to_string(),
            }
        };
        field.formatted_value = Value::String(url);
    }
}

/// CSS class, template path and formatted value defaults; runs on every field.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommonPostConfigurator;

impl FieldConfigurator for CommonPostConfigurator {
    fn supports(&self, _field: &FieldDto, _entity: &EntityDto) -> bool {
        true
    }

    fn configure(&self, field: &mut FieldDto, _entity: &EntityDto, context: &AdminContext) {
        let type_class = format!("field-{}", field.field_type);
        field.css_class = format!("{} {}", type_class, field.css_class).trim().to_string();
        if field.template_path.is_none() {
            field.template_path = Some(context.template_path(&format!("crud/field/{}", field.field_type)));
        }
        if field.formatted_value.is_null() {
            field.formatted_value = field.value.clone();
        }
    }
}
