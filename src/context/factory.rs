//! Builds the [`AdminContext`] of an admin request.

use std::sync::{Arc, OnceLock};

use axum::http::request::Parts;
use serde_json::Value;

use super::{AdminContext, CrudDto, TemplateRegistry};
use crate::action::{Page, INDEX};
use crate::config::ConfigManager;
use crate::controller::{CrudController, DashboardController};
use crate::dispatch::DispatchError;
use crate::entity::{EntityDto, EntityMetadataProvider};
use crate::http::request::RequestSnapshot;
use crate::i18n::{I18n, Translator};
use crate::menu::MenuFactory;
use crate::naming::short_class_name;
use crate::option;
use crate::routing::{AdminRouteGenerator, UrlGenerator};
use crate::security::AdminUser;

pub struct AdminContextFactory {
    routes: Arc<AdminRouteGenerator>,
    urls: Arc<dyn UrlGenerator>,
    metadata: Arc<dyn EntityMetadataProvider>,
    menu_factory: Arc<MenuFactory>,
    translator: Arc<dyn Translator>,
    config: Option<Arc<ConfigManager>>,
    templates: TemplateRegistry,
    default_locale: String,
}

impl std::fmt::Debug for AdminContextFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminContextFactory")
            .field("templates", &self.templates)
            .field("default_locale", &self.default_locale)
            .finish_non_exhaustive()
    }
}

impl AdminContextFactory {
    pub fn new(
        routes: Arc<AdminRouteGenerator>,
        urls: Arc<dyn UrlGenerator>,
        metadata: Arc<dyn EntityMetadataProvider>,
        menu_factory: Arc<MenuFactory>,
        translator: Arc<dyn Translator>,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            routes,
            urls,
            metadata,
            menu_factory,
            translator,
            config: None,
            templates: TemplateRegistry::default(),
            default_locale: default_locale.into(),
        }
    }

    /// Entity labels are read from the backend configuration when given.
    pub fn with_config(mut self, config: Arc<ConfigManager>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    pub fn create(
        &self,
        parts: &Parts,
        dashboard: Arc<dyn DashboardController>,
        crud: Option<Arc<dyn CrudController>>,
        action: Option<&str>,
    ) -> Result<AdminContext, DispatchError> {
        let request = RequestSnapshot::from_parts(parts);
        let user = parts.extensions.get::<AdminUser>().cloned();
        let settings = dashboard.configure_dashboard();

        let locale = request
            .attributes
            .locale()
            .or_else(|| request.query_str(option::LOCALE))
            .unwrap_or(self.default_locale.as_str())
            .to_string();
        let mut i18n = I18n::new(locale);
        if let Some(direction) = settings.text_direction {
            i18n.text_direction = direction;
        }
        i18n.translation_domain = settings.translation_domain.clone();

        let (crud_dto, entity) = match crud {
            Some(crud) => {
                let entity_fqcn = crud.entity_fqcn().to_string();
                let metadata = self.metadata.metadata(&entity_fqcn).ok_or_else(|| {
                    DispatchError::UnknownEntity {
                        entity: entity_fqcn.clone(),
                        controller: crud.fqcn().to_string(),
                    }
                })?;
                let entity_label = self.entity_label(&entity_fqcn)?;
                i18n.translation_parameters
                    .insert("%entity_label%".into(), Value::from(entity_label.clone()));
                i18n.translation_parameters.insert(
                    "%entity_name%".into(),
                    Value::from(short_class_name(&entity_fqcn)),
                );

                let entity_id = request
                    .attributes
                    .entity_id()
                    .or_else(|| request.query_str(option::ENTITY_ID).map(str::to_string));
                let instance = entity_id
                    .as_deref()
                    .and_then(|id| self.metadata.find(&entity_fqcn, id));

                let current_action = action.unwrap_or(INDEX).to_string();
                let crud_dto = CrudDto {
                    controller_fqcn: crud.fqcn().to_string(),
                    entity_label,
                    current_page: Page::from_action(&current_action),
                    current_action,
                    actions: crud.configure_actions(dashboard.configure_actions()),
                    entity_fqcn,
                };
                (Some(crud_dto), Some(EntityDto::new(metadata, entity_id, instance)))
            }
            None => (None, None),
        };

        tracing::debug!(
            route = ?request.attributes.route,
            dashboard = %dashboard.fqcn(),
            crud = ?crud_dto.as_ref().map(|c| &c.controller_fqcn),
            action = ?crud_dto.as_ref().map(|c| &c.current_action),
            locale = %i18n.locale,
            "Admin context created"
        );

        Ok(AdminContext {
            dashboard_route_name: self.routes.find_route_name(Some(dashboard.fqcn()), None, None),
            dashboard_fqcn: dashboard.fqcn().to_string(),
            dashboard: settings,
            request,
            user,
            crud: crud_dto,
            entity,
            i18n,
            templates: self.templates.clone(),
            routes: self.routes.clone(),
            urls: self.urls.clone(),
            translator: self.translator.clone(),
            menu_factory: self.menu_factory.clone(),
            dashboard_controller: dashboard,
            main_menu: OnceLock::new(),
            user_menu: OnceLock::new(),
        })
    }

    fn entity_label(&self, entity_fqcn: &str) -> Result<String, DispatchError> {
        let configured = match &self.config {
            Some(config) => config
                .entity_config_by_class(entity_fqcn)?
                .map(|entity| entity.label.clone()),
            None => None,
        };
        Ok(configured.unwrap_or_else(|| short_class_name(entity_fqcn).to_string()))
    }
}
