//! CRUD actions.
//!
//! # Data Flow
//! ```text
//! DashboardController::configure_actions()
//!     → CrudController::configure_actions(actions)   (per-page Actions)
//!     → Actions::get_actions(page)                    (disabled removed, permissions set)
//!     → ActionFactory                                 (authorization, CSS, labels, URLs, HTML attributes)
//!     → ActionDto list rendered with the page
//! ```
//!
//! # Design Decisions
//! - `Action` is a consuming builder around the serializable `ActionDto`
//! - Entity actions are processed once per entity, global and batch actions once per page
//! - Batch actions outside the index page are a configuration error

mod actions;
mod factory;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::entity::EntityDto;
use crate::naming::humanize;

pub use actions::Actions;
pub use factory::{ActionError, ActionFactory};

pub const INDEX: &str = "index";
pub const DETAIL: &str = "detail";
pub const EDIT: &str = "edit";
pub const NEW: &str = "new";
pub const DELETE: &str = "delete";
pub const BATCH_DELETE: &str = "batchDelete";
pub const SAVE_AND_RETURN: &str = "saveAndReturn";
pub const SAVE_AND_CONTINUE: &str = "saveAndContinue";
pub const SAVE_AND_ADD_ANOTHER: &str = "saveAndAddAnother";

/// CRUD pages that display actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Index,
    Detail,
    Edit,
    New,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Index => INDEX,
            Page::Detail => DETAIL,
            Page::Edit => EDIT,
            Page::New => NEW,
        }
    }

    /// The page rendered by a CRUD action, if any.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            INDEX => Some(Page::Index),
            DETAIL => Some(Page::Detail),
            EDIT => Some(Page::Edit),
            NEW => Some(Page::New),
            _ => None,
        }
    }

    /// Backend configuration view holding the fields of this page.
    pub fn view(&self) -> &'static str {
        match self {
            Page::Index => "list",
            Page::Detail => "show",
            Page::Edit => "edit",
            Page::New => "new",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Applies to one entity (a table row, the edited entity).
    Entity,
    /// Applies to the whole page.
    Global,
    /// Applies to the entities selected on the index page.
    Batch,
}

pub type UrlCallback = Arc<dyn Fn(Option<&EntityDto>) -> String + Send + Sync>;
pub type DisplayCallback = Arc<dyn Fn(&EntityDto) -> bool + Send + Sync>;

/// A configured action; becomes a rendered action once processed by [`ActionFactory`].
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDto {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub name: String,
    /// `None` hides the label; the name is then used as `title`.
    pub label: Option<String>,
    pub icon: Option<String>,
    pub css_class: String,
    pub added_css_class: String,
    /// `a`, `button` or `form`.
    pub html_element: String,
    pub html_attributes: Map<String, Value>,
    pub link_url: String,
    pub template_path: Option<String>,
    pub crud_action_name: Option<String>,
    pub route_name: Option<String>,
    pub route_parameters: Map<String, Value>,
    pub url: Option<String>,
    #[serde(skip)]
    pub url_callback: Option<UrlCallback>,
    #[serde(skip)]
    pub display_callback: Option<DisplayCallback>,
    pub translation_parameters: Map<String, Value>,
    pub permission: Option<String>,
}

impl fmt::Debug for ActionDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDto")
            .field("action_type", &self.action_type)
            .field("name", &self.name)
            .field("label", &self.label)
            .field("css_class", &self.css_class)
            .field("link_url", &self.link_url)
            .field("html_attributes", &self.html_attributes)
            .field("crud_action_name", &self.crud_action_name)
            .field("route_name", &self.route_name)
            .field("url", &self.url)
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

impl ActionDto {
    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    pub fn is_entity_action(&self) -> bool {
        self.action_type == ActionType::Entity
    }

    pub fn is_global_action(&self) -> bool {
        self.action_type == ActionType::Global
    }

    pub fn is_batch_action(&self) -> bool {
        self.action_type == ActionType::Batch
    }

    pub fn should_be_displayed_for(&self, entity: &EntityDto) -> bool {
        self.display_callback
            .as_ref()
            .map_or(true, |display| display(entity))
    }
}

/// Fluent builder for [`ActionDto`].
///
/// ```
/// use admin_panel::action::{Action, ActionDto};
///
/// let publish: ActionDto = Action::new("publish")
///     .set_icon("fa fa-upload")
///     .link_to_crud_action("publish")
///     .add_css_class("text-success")
///     .into();
/// assert_eq!(publish.label.as_deref(), Some("Publish"));
/// ```
#[derive(Debug, Clone)]
pub struct Action {
    dto: ActionDto,
}

impl Action {
    /// An entity action linking to the CRUD action of the same name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            dto: ActionDto {
                action_type: ActionType::Entity,
                label: Some(humanize(&name)),
                icon: None,
                css_class: String::new(),
                added_css_class: String::new(),
                html_element: "a".to_string(),
                html_attributes: Map::new(),
                link_url: String::new(),
                template_path: None,
                crud_action_name: Some(name.clone()),
                route_name: None,
                route_parameters: Map::new(),
                url: None,
                url_callback: None,
                display_callback: None,
                translation_parameters: Map::new(),
                permission: None,
                name,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.dto.name
    }

    pub fn set_label(mut self, label: impl Into<String>) -> Self {
        self.dto.label = Some(label.into());
        self
    }

    pub fn hide_label(mut self) -> Self {
        self.dto.label = None;
        self
    }

    pub fn set_icon(mut self, icon: impl Into<String>) -> Self {
        self.dto.icon = Some(icon.into());
        self
    }

    /// Replaces the default CSS class.
    pub fn set_css_class(mut self, css_class: impl Into<String>) -> Self {
        self.dto.css_class = css_class.into();
        self
    }

    /// Appended to the default or explicit CSS class.
    pub fn add_css_class(mut self, css_class: &str) -> Self {
        self.dto.added_css_class = format!("{} {}", self.dto.added_css_class, css_class)
            .trim()
            .to_string();
        self
    }

    pub fn set_html_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.dto.html_attributes.insert(name.into(), value.into());
        self
    }

    pub fn render_as_link(mut self) -> Self {
        self.dto.html_element = "a".to_string();
        self
    }

    pub fn render_as_button(mut self) -> Self {
        self.dto.html_element = "button".to_string();
        self
    }

    pub fn render_as_form(mut self) -> Self {
        self.dto.html_element = "form".to_string();
        self
    }

    pub fn set_template_path(mut self, path: impl Into<String>) -> Self {
        self.dto.template_path = Some(path.into());
        self
    }

    pub fn create_as_global_action(mut self) -> Self {
        self.dto.action_type = ActionType::Global;
        self
    }

    pub fn create_as_batch_action(mut self) -> Self {
        self.dto.action_type = ActionType::Batch;
        self
    }

    pub fn link_to_crud_action(mut self, crud_action: impl Into<String>) -> Self {
        self.dto.crud_action_name = Some(crud_action.into());
        self.dto.route_name = None;
        self.dto.url = None;
        self.dto.url_callback = None;
        self
    }

    /// Links to an application route rendered inside the dashboard.
    pub fn link_to_route(mut self, route_name: impl Into<String>, params: Map<String, Value>) -> Self {
        self.dto.route_name = Some(route_name.into());
        self.dto.route_parameters = params;
        self.dto.crud_action_name = None;
        self.dto.url = None;
        self.dto.url_callback = None;
        self
    }

    pub fn link_to_url(mut self, url: impl Into<String>) -> Self {
        self.dto.url = Some(url.into());
        self.dto.url_callback = None;
        self.dto.crud_action_name = None;
        self.dto.route_name = None;
        self
    }

    /// URL computed from the entity (absent for global actions).
    pub fn link_to_url_with<F>(mut self, callback: F) -> Self
    where
        F: Fn(Option<&EntityDto>) -> String + Send + Sync + 'static,
    {
        self.dto.url_callback = Some(Arc::new(callback));
        self.dto.url = None;
        self.dto.crud_action_name = None;
        self.dto.route_name = None;
        self
    }

    pub fn display_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&EntityDto) -> bool + Send + Sync + 'static,
    {
        self.dto.display_callback = Some(Arc::new(predicate));
        self
    }

    pub fn set_translation_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.dto.translation_parameters = parameters;
        self
    }

    pub fn set_permission(mut self, role: impl Into<String>) -> Self {
        self.dto.permission = Some(role.into());
        self
    }

    pub fn into_dto(self) -> ActionDto {
        self.dto
    }
}

impl From<Action> for ActionDto {
    fn from(action: Action) -> Self {
        action.into_dto()
    }
}

impl From<ActionDto> for Action {
    fn from(dto: ActionDto) -> Self {
        Self { dto }
    }
}
