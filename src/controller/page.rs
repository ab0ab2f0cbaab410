//! Default handlers of dashboard and CRUD routes.
//!
//! Pages are JSON documents carrying what a template would receive: the layout
//! (dashboard, i18n, menus), the processed fields and the processed actions.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use super::Handler;
use crate::action::{ActionDto, ActionError, ActionFactory, Page};
use crate::config::{ConfigManager, ResolveError};
use crate::context::{AdminContext, CrudDto, Dashboard};
use crate::entity::EntityDto;
use crate::field::{FieldDto, FieldFactory};
use crate::http::response::error_response;
use crate::i18n::I18n;
use crate::menu::{MainMenu, UserMenu};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("the request has no admin context")]
    MissingContext,

    #[error("the \"{0}\" dashboard has no CRUD controller for this request")]
    NotCrudRequest(String),

    #[error(transparent)]
    Config(#[from] ResolveError),

    #[error(transparent)]
    Action(#[from] ActionError),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout<'a> {
    pub title: String,
    pub template: String,
    pub dashboard: &'a Dashboard,
    pub i18n: &'a I18n,
    pub main_menu: &'a MainMenu,
    pub user_menu: Option<&'a UserMenu>,
}

impl<'a> Layout<'a> {
    pub fn new(context: &'a AdminContext, template: &str) -> Self {
        Self {
            title: context.trans(&context.dashboard().title),
            template: context.template_path(template),
            dashboard: context.dashboard(),
            i18n: context.i18n(),
            main_menu: context.main_menu(),
            user_menu: context.user_menu(),
        }
    }
}

#[derive(Serialize)]
pub struct PageActions {
    pub global: Vec<ActionDto>,
    pub entity: Vec<ActionDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrudPage<'a> {
    #[serde(flatten)]
    pub layout: Layout<'a>,
    pub crud: &'a CrudDto,
    pub entity: Option<&'a EntityDto>,
    pub fields: Vec<FieldDto>,
    pub actions: PageActions,
}

/// Renders CRUD pages from the admin context of the request.
pub struct CrudPageRenderer {
    action_factory: Arc<ActionFactory>,
    field_factory: Arc<FieldFactory>,
    config: Arc<ConfigManager>,
}

impl std::fmt::Debug for CrudPageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudPageRenderer")
            .field("action_factory", &self.action_factory)
            .field("configurators", &self.field_factory.len())
            .finish_non_exhaustive()
    }
}

impl CrudPageRenderer {
    pub fn new(action_factory: Arc<ActionFactory>, field_factory: Arc<FieldFactory>, config: Arc<ConfigManager>) -> Self {
        Self {
            action_factory,
            field_factory,
            config,
        }
    }

    pub fn render<'a>(&self, context: &'a AdminContext) -> Result<CrudPage<'a>, PageError> {
        let crud = context
            .crud()
            .ok_or_else(|| PageError::NotCrudRequest(context.dashboard_fqcn().to_string()))?;
        let entity = context.entity();

        let fields = match (crud.current_page, entity) {
            (Some(page), Some(entity)) => self.fields(context, &crud.entity_fqcn, page, entity)?,
            _ => Vec::new(),
        };

        let actions = match crud.current_page {
            Some(page) => {
                let configured = crud.actions.get_actions(page);
                PageActions {
                    global: self.action_factory.process_global_actions(context, &configured)?,
                    entity: entity
                        .map(|entity| self.action_factory.process_entity_actions(context, entity, &configured))
                        .unwrap_or_default(),
                }
            }
            None => PageActions {
                global: Vec::new(),
                entity: Vec::new(),
            },
        };

        Ok(CrudPage {
            layout: Layout::new(context, &format!("crud/{}", crud.current_action)),
            crud,
            entity,
            fields,
            actions,
        })
    }

    fn fields(
        &self,
        context: &AdminContext,
        entity_fqcn: &str,
        page: Page,
        entity: &EntityDto,
    ) -> Result<Vec<FieldDto>, PageError> {
        let Some(config) = self.config.entity_config_by_class(entity_fqcn)? else {
            return Ok(Vec::new());
        };
        Ok(config
            .view(page.view())
            .map(|view| self.field_factory.process_fields(context, entity, &view.fields))
            .unwrap_or_default())
    }
}

/// Handler rendering every action of the registered CRUD controllers.
pub fn crud_handler(renderer: Arc<CrudPageRenderer>) -> Handler {
    Arc::new(move |request: Request<Body>| {
        let Some(context) = request.extensions().get::<Arc<AdminContext>>() else {
            return page_error(&PageError::MissingContext);
        };
        match renderer.render(context) {
            Ok(page) => Json(page).into_response(),
            Err(e) => page_error(&e),
        }
    })
}

pub fn dashboard_handler() -> Handler {
    Arc::new(|request: Request<Body>| match request.extensions().get::<Arc<AdminContext>>() {
        Some(context) => Json(Layout::new(context, "dashboard")).into_response(),
        None => page_error(&PageError::MissingContext),
    })
}

fn page_error(error: &PageError) -> Response {
    tracing::error!(error = %error, "Failed to render admin page");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}
