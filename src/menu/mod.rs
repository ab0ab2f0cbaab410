//! Main menu and user menu.
//!
//! # Data Flow
//! ```text
//! DashboardController::configure_menu_items()   (MenuItemBuilder → MenuItem)
//!     → MenuFactory
//!         permission filter (AuthorizationChecker)
//!         label translation
//!         link URL per item type (AdminUrlGenerator)
//!     → MenuItemMatcher (selected + expanded flags)
//!     → MainMenu, memoized by AdminContext
//! ```
//!
//! # Design Decisions
//! - One DTO for every item type; the type only changes how the URL is resolved
//! - CRUD targets live in `route_parameters` until the URL is generated
//! - Menus are rebuilt per request, never shared

mod factory;
mod matcher;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::option;
use crate::security::AdminUser;

pub use factory::MenuFactory;
pub use matcher::MenuItemMatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuItemType {
    #[default]
    Dashboard,
    Crud,
    Route,
    Url,
    Section,
    Submenu,
    AccessImpersonation,
    ExitImpersonation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuBadge {
    pub content: Value,
    pub style: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "type")]
    pub item_type: MenuItemType,
    pub label: String,
    pub icon: Option<String>,
    pub link_url: String,
    pub css_class: String,
    pub permission: Option<String>,
    pub badge: Option<MenuBadge>,
    pub link_rel: Option<String>,
    pub link_target: Option<String>,
    pub route_name: Option<String>,
    pub route_parameters: Map<String, Value>,
    pub translation_parameters: Map<String, Value>,
    pub sub_items: Vec<MenuItem>,
    pub selected: bool,
    pub expanded: bool,
}

impl MenuItem {
    fn builder(item_type: MenuItemType, label: &str, icon: Option<&str>) -> MenuItemBuilder {
        MenuItemBuilder {
            item: MenuItem {
                item_type,
                label: label.to_string(),
                icon: icon.map(str::to_string),
                ..MenuItem::default()
            },
        }
    }

    pub fn link_to_dashboard(label: &str, icon: Option<&str>) -> MenuItemBuilder {
        Self::builder(MenuItemType::Dashboard, label, icon)
    }

    /// Links to the index page of the CRUD controller managing `entity_fqcn`.
    pub fn link_to_crud(label: &str, icon: Option<&str>, entity_fqcn: &str) -> MenuItemBuilder {
        let mut builder = Self::builder(MenuItemType::Crud, label, icon);
        let params = &mut builder.item.route_parameters;
        params.insert(option::CRUD_CONTROLLER_FQCN.into(), Value::Null);
        params.insert(option::CRUD_ACTION.into(), Value::from(crate::action::INDEX));
        params.insert(option::ENTITY_FQCN.into(), Value::from(entity_fqcn));
        params.insert(option::ENTITY_ID.into(), Value::Null);
        builder
    }

    /// Links to an application route rendered inside the dashboard.
    pub fn link_to_route(label: &str, icon: Option<&str>, route_name: &str, params: Map<String, Value>) -> MenuItemBuilder {
        let mut builder = Self::builder(MenuItemType::Route, label, icon);
        builder.item.route_name = Some(route_name.to_string());
        builder.item.route_parameters = params;
        builder
    }

    pub fn link_to_url(label: &str, icon: Option<&str>, url: &str) -> MenuItemBuilder {
        let mut builder = Self::builder(MenuItemType::Url, label, icon);
        builder.item.link_url = url.to_string();
        builder
    }

    pub fn section(label: &str, icon: Option<&str>) -> MenuItemBuilder {
        Self::builder(MenuItemType::Section, label, icon)
    }

    pub fn sub_menu(label: &str, icon: Option<&str>) -> MenuItemBuilder {
        Self::builder(MenuItemType::Submenu, label, icon)
    }

    /// Switches to the user `identifier`.
    pub fn link_to_impersonation(label: &str, icon: Option<&str>, identifier: &str) -> MenuItemBuilder {
        let mut builder = Self::builder(MenuItemType::AccessImpersonation, label, icon);
        builder
            .item
            .route_parameters
            .insert(option::SWITCH_USER.into(), Value::from(identifier));
        builder
    }

    pub fn link_to_exit_impersonation(label: &str, icon: Option<&str>) -> MenuItemBuilder {
        let mut builder = Self::builder(MenuItemType::ExitImpersonation, label, icon);
        builder
            .item
            .route_parameters
            .insert(option::SWITCH_USER.into(), Value::from("_exit"));
        builder
    }

    pub fn is_section(&self) -> bool {
        self.item_type == MenuItemType::Section
    }

    pub fn has_sub_items(&self) -> bool {
        !self.sub_items.is_empty()
    }
}

/// Fluent builder returned by the `MenuItem::link_to_*` constructors.
#[derive(Debug, Clone)]
pub struct MenuItemBuilder {
    item: MenuItem,
}

impl MenuItemBuilder {
    /// CRUD controller to use when several manage the same entity.
    pub fn set_controller(mut self, controller: &str) -> Self {
        self.item
            .route_parameters
            .insert(option::CRUD_CONTROLLER_FQCN.into(), Value::from(controller));
        self
    }

    pub fn set_action(mut self, action: &str) -> Self {
        self.item
            .route_parameters
            .insert(option::CRUD_ACTION.into(), Value::from(action));
        self
    }

    pub fn set_entity_id(mut self, entity_id: &str) -> Self {
        self.item
            .route_parameters
            .insert(option::ENTITY_ID.into(), Value::from(entity_id));
        self
    }

    /// Extra query parameter of CRUD and dashboard links.
    pub fn set_query_parameter(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.item.route_parameters.insert(name.into(), value.into());
        self
    }

    pub fn set_permission(mut self, role: &str) -> Self {
        self.item.permission = Some(role.to_string());
        self
    }

    pub fn set_css_class(mut self, css_class: &str) -> Self {
        self.item.css_class = css_class.to_string();
        self
    }

    pub fn set_badge(mut self, content: impl Into<Value>, style: &str) -> Self {
        self.item.badge = Some(MenuBadge {
            content: content.into(),
            style: style.to_string(),
        });
        self
    }

    pub fn set_link_rel(mut self, rel: &str) -> Self {
        self.item.link_rel = Some(rel.to_string());
        self
    }

    pub fn set_link_target(mut self, target: &str) -> Self {
        self.item.link_target = Some(target.to_string());
        self
    }

    pub fn set_translation_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.item.translation_parameters = parameters;
        self
    }

    pub fn set_sub_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = MenuItemBuilder>,
    {
        self.item.sub_items = items.into_iter().map(MenuItemBuilder::build).collect();
        self
    }

    pub fn build(self) -> MenuItem {
        self.item
    }
}

impl From<MenuItemBuilder> for MenuItem {
    fn from(builder: MenuItemBuilder) -> Self {
        builder.build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MainMenu {
    pub items: Vec<MenuItem>,
}

impl MainMenu {
    /// Selected item, searched depth-first.
    pub fn selected(&self) -> Option<&MenuItem> {
        fn find(items: &[MenuItem]) -> Option<&MenuItem> {
            items
                .iter()
                .find_map(|item| find(&item.sub_items).or(item.selected.then_some(item)))
        }
        find(&self.items)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMenu {
    pub name: String,
    pub display_name: bool,
    pub avatar_url: Option<String>,
    pub display_avatar: bool,
    pub items: Vec<MenuItem>,
}

impl UserMenu {
    /// Name and avatar of `user`, plus an exit link while impersonating.
    pub fn for_user(user: &AdminUser) -> Self {
        let mut items = Vec::new();
        if user.is_impersonated() {
            items.push(
                MenuItem::link_to_exit_impersonation("Exit impersonation", Some("fa fa-user-lock")).build(),
            );
        }
        Self {
            name: user.name().to_string(),
            display_name: true,
            avatar_url: user.avatar_url.clone(),
            display_avatar: user.avatar_url.is_some(),
            items,
        }
    }

    pub fn add_item(mut self, item: impl Into<MenuItem>) -> Self {
        self.items.push(item.into());
        self
    }
}
