//! Turns configured actions into rendered actions for the current request.

use std::sync::Arc;

use axum::http::Request;
use serde_json::Value;
use thiserror::Error;

use super::{ActionDto, Page, DELETE, DETAIL, EDIT, INDEX, NEW, SAVE_AND_ADD_ANOTHER, SAVE_AND_RETURN};
use crate::context::AdminContext;
use crate::entity::EntityDto;
use crate::http::query::parse_query;
use crate::i18n::Translator;
use crate::option;
use crate::routing::RequestMatcher;
use crate::security::{permission, AuthSubject, AuthorizationChecker, CsrfTokenManager};

/// Actions whose URL never carries an entity id.
const ENTITY_LESS_ACTIONS: [&str; 4] = [INDEX, NEW, SAVE_AND_ADD_ANOTHER, SAVE_AND_RETURN];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(
        "batch actions can be added only to the \"index\" page, but the \"{action}\" batch action is defined in the \"{page}\" page"
    )]
    BatchActionOutsideIndex { action: String, page: String },
}

pub struct ActionFactory {
    authorization: Arc<dyn AuthorizationChecker>,
    translator: Arc<dyn Translator>,
    matcher: Arc<dyn RequestMatcher>,
    csrf: Option<Arc<dyn CsrfTokenManager>>,
}

impl std::fmt::Debug for ActionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionFactory")
            .field("csrf", &self.csrf.is_some())
            .finish_non_exhaustive()
    }
}

impl ActionFactory {
    pub fn new(
        authorization: Arc<dyn AuthorizationChecker>,
        translator: Arc<dyn Translator>,
        matcher: Arc<dyn RequestMatcher>,
    ) -> Self {
        Self {
            authorization,
            translator,
            matcher,
            csrf: None,
        }
    }

    pub fn with_csrf_token_manager(mut self, csrf: Arc<dyn CsrfTokenManager>) -> Self {
        self.csrf = Some(csrf);
        self
    }

    /// Entity actions of `actions` that the user may run on `entity`, ready to render.
    pub fn process_entity_actions(
        &self,
        context: &AdminContext,
        entity: &EntityDto,
        actions: &[ActionDto],
    ) -> Vec<ActionDto> {
        let on_index = current_page(context) == Some(Page::Index);

        actions
            .iter()
            .filter(|action| action.is_entity_action())
            .filter(|action| {
                let subject = AuthSubject::Action {
                    action,
                    entity: Some(entity),
                };
                self.authorization
                    .is_granted(context.user(), permission::EXECUTE_ACTION, subject)
            })
            .filter(|action| action.should_be_displayed_for(entity))
            .map(|action| {
                let mut action = action.clone();
                if action.css_class.is_empty() {
                    action.css_class = format!("action-{}", action.name);
                    if !on_index {
                        action.css_class.push_str(" btn");
                    }
                }
                append_added_css(&mut action);
                self.process_action(context, action, Some(entity))
            })
            .collect()
    }

    /// Global and batch actions of the current page.
    pub fn process_global_actions(
        &self,
        context: &AdminContext,
        actions: &[ActionDto],
    ) -> Result<Vec<ActionDto>, ActionError> {
        let page = current_page(context);
        let mut processed = Vec::new();

        for action in actions {
            if !action.is_global_action() && !action.is_batch_action() {
                continue;
            }
            let subject = AuthSubject::Action { action, entity: None };
            if !self
                .authorization
                .is_granted(context.user(), permission::EXECUTE_ACTION, subject)
            {
                continue;
            }
            if action.is_batch_action() && page != Some(Page::Index) {
                return Err(ActionError::BatchActionOutsideIndex {
                    action: action.name.clone(),
                    page: context.current_action().unwrap_or_default().to_string(),
                });
            }

            let mut action = action.clone();
            if action.css_class.is_empty() {
                action.css_class = format!("btn action-{}", action.name);
            }
            append_added_css(&mut action);
            processed.push(self.process_action(context, action, None));
        }

        Ok(processed)
    }

    fn process_action(&self, context: &AdminContext, mut action: ActionDto, entity: Option<&EntityDto>) -> ActionDto {
        match action.label.take() {
            Some(label) => {
                let mut params = action.translation_parameters.clone();
                if let Some(entity) = entity {
                    params
                        .entry("%entity_id%")
                        .or_insert_with(|| Value::from(entity.primary_key_value.clone().unwrap_or_default()));
                }
                action.label = Some(context.i18n().trans(self.translator.as_ref(), &label, &params));
            }
            None => {
                action
                    .html_attributes
                    .entry("title")
                    .or_insert_with(|| Value::from(action.name.clone()));
            }
        }

        action.link_url = self.generate_action_url(context, &action, entity);
        if action.template_path.is_none() {
            action.template_path = Some(context.template_path("crud/action"));
        }

        let is_global = action.is_global_action();
        let is_batch = action.is_batch_action();
        let form_action = (action.name == DELETE).then(|| delete_form_action(context, entity, &action.link_url));
        let attributes = &mut action.html_attributes;
        attributes.insert("data-action-name".into(), Value::from(action.name.clone()));

        if let Some(entity) = entity.filter(|_| !is_global) {
            if let Some(page @ (Page::Edit | Page::New)) = current_page(context) {
                attributes.insert("form".into(), Value::from(format!("{page}-{}-form", entity.name)));
            }
        }

        if let Some(form_action) = form_action {
            attributes.insert("formaction".into(), Value::from(form_action));
            attributes.insert("data-bs-toggle".into(), Value::from("modal"));
            attributes.insert("data-bs-target".into(), Value::from("#modal-delete"));
        }

        if is_batch {
            attributes.insert("data-bs-toggle".into(), Value::from("modal"));
            attributes.insert("data-bs-target".into(), Value::from("#modal-batch-action"));
            attributes.insert("data-action-batch".into(), Value::from("true"));
            attributes.insert("data-action-url".into(), Value::from(action.link_url.clone()));
            if let Some(crud) = context.crud() {
                attributes.insert("data-entity-fqcn".into(), Value::from(crud.entity_fqcn.clone()));
            }
            if let Some(csrf) = &self.csrf {
                let token = csrf.token(&format!("ea-batch-action-{}", action.name));
                attributes.insert("data-action-csrf-token".into(), Value::from(token));
            }
        }

        action
    }

    fn generate_action_url(&self, context: &AdminContext, action: &ActionDto, entity: Option<&EntityDto>) -> String {
        if let Some(callback) = &action.url_callback {
            return callback(entity);
        }
        if let Some(url) = &action.url {
            return url.clone();
        }

        if let Some(route_name) = &action.route_name {
            return context
                .url_generator()
                .unset_all()
                .set_dashboard(context.dashboard_fqcn())
                .include_referrer()
                .set_route(route_name.clone(), action.route_parameters.clone())
                .generate_url();
        }

        let crud_action = action.crud_action_name.as_deref().unwrap_or(&action.name);
        let mut generator = context
            .url_generator()
            .unset_all_except(&[option::DASHBOARD_CONTROLLER_FQCN, option::FILTERS, option::PAGE])
            .set_action(crud_action);
        if let Some(crud) = context.crud() {
            generator = generator.set_controller(crud.controller_fqcn.clone());
        }
        if let Some(referrer) = self.referrer_url(context) {
            generator = generator.set(option::REFERRER, referrer);
        }
        if !ENTITY_LESS_ACTIONS.contains(&action.name.as_str()) {
            if let Some(id) = entity.and_then(|e| e.primary_key_value.clone()) {
                generator = generator.set_entity_id(id);
            }
        }
        generator.generate_url()
    }

    /// Where the target page sends the user back to.
    fn referrer_url(&self, context: &AdminContext) -> Option<String> {
        let current_without_referrer = || context.url_generator().remove_referrer().generate_url();

        match context.current_action() {
            Some(NEW) => None,
            Some(EDIT) => {
                // keep pointing at the listing or detail page the user came from
                let forwarded = context
                    .request()
                    .query_str(option::REFERRER)
                    .filter(|referrer| matches!(self.referrer_action(referrer).as_deref(), Some(INDEX | DETAIL)));
                Some(forwarded.map_or_else(current_without_referrer, str::to_string))
            }
            _ => Some(current_without_referrer()),
        }
    }

    /// CRUD action targeted by a referrer URL, from its query string or its route.
    fn referrer_action(&self, referrer: &str) -> Option<String> {
        let query = referrer.split_once('?').map(|(_, q)| q).unwrap_or_default();
        if let Some(action) = parse_query(query).get(option::CRUD_ACTION).and_then(Value::as_str) {
            return Some(action.to_string());
        }

        let (parts, ()) = Request::builder().uri(referrer).body(()).ok()?.into_parts();
        self.matcher.match_request(&parts)?.admin?.action
    }
}

/// Target of the delete form: the delete action of `entity`, without referrer.
fn delete_form_action(context: &AdminContext, entity: Option<&EntityDto>, link_url: &str) -> String {
    let Some(id) = entity.and_then(|e| e.primary_key_value.clone()) else {
        return link_url.to_string();
    };
    let mut generator = context
        .url_generator()
        .set_action(DELETE)
        .set_entity_id(id)
        .remove_referrer();
    if let Some(crud) = context.crud() {
        generator = generator.set_controller(crud.controller_fqcn.clone());
    }
    generator.generate_url()
}

fn current_page(context: &AdminContext) -> Option<Page> {
    context.crud().and_then(|crud| crud.current_page)
}

fn append_added_css(action: &mut ActionDto) {
    if !action.added_css_class.is_empty() {
        action.css_class = format!("{} {}", action.css_class, action.added_css_class)
            .trim()
            .to_string();
    }
}
