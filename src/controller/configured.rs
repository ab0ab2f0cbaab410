//! Controllers declared in the application configuration.

use crate::action::{Action, ActionDto, Actions, Page};
use crate::config::schema::{CrudConfig, DashboardConfig, MenuItemConfig};
use crate::context::Dashboard;
use crate::menu::{MenuItem, MenuItemBuilder};

use super::{AdminAction, AdminCrud, AdminDashboard, CrudController, DashboardController, RouteOptions};

#[derive(Debug, Clone)]
pub struct ConfiguredDashboard {
    fqcn: String,
    attribute: AdminDashboard,
    dashboard: Dashboard,
    menu: Vec<MenuItem>,
    actions: Actions,
}

impl ConfiguredDashboard {
    pub fn new(fqcn: impl Into<String>, attribute: AdminDashboard) -> Self {
        Self {
            fqcn: fqcn.into(),
            attribute,
            dashboard: Dashboard::new(),
            menu: Vec::new(),
            actions: Actions::default_config(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        let attribute = AdminDashboard {
            route_path: config.route_path.clone(),
            route_name: config.route_name.clone(),
            route_options: RouteOptions {
                methods: config.route_options.methods.clone(),
                host: config.route_options.host.clone(),
                locale: config.route_options.locale.clone(),
                defaults: config.route_options.defaults.clone(),
            },
            routes: config.routes.clone(),
            allowed_controllers: config.allowed_controllers.clone(),
            denied_controllers: config.denied_controllers.clone(),
        };

        let mut dashboard = Dashboard::new().set_locales(config.locales.clone());
        if let Some(title) = &config.title {
            dashboard = dashboard.set_title(title.clone());
        }
        if let Some(favicon) = &config.favicon_path {
            dashboard = dashboard.set_favicon_path(favicon.clone());
        }
        if let Some(domain) = &config.translation_domain {
            dashboard = dashboard.set_translation_domain(domain.clone());
        }

        let menu = config
            .menu
            .iter()
            .filter_map(menu_item_from_config)
            .map(MenuItemBuilder::build)
            .collect();

        Self::new(config.fqcn.clone(), attribute)
            .with_dashboard(dashboard)
            .with_menu(menu)
    }

    pub fn with_dashboard(mut self, dashboard: Dashboard) -> Self {
        self.dashboard = dashboard;
        self
    }

    /// Replaces the default menu (a single dashboard link).
    pub fn with_menu(mut self, menu: Vec<MenuItem>) -> Self {
        self.menu = menu;
        self
    }

    pub fn with_actions(mut self, actions: Actions) -> Self {
        self.actions = actions;
        self
    }
}

impl DashboardController for ConfiguredDashboard {
    fn fqcn(&self) -> &str {
        &self.fqcn
    }

    fn admin_dashboard(&self) -> AdminDashboard {
        self.attribute.clone()
    }

    fn configure_dashboard(&self) -> Dashboard {
        self.dashboard.clone()
    }

    fn configure_menu_items(&self) -> Vec<MenuItem> {
        if self.menu.is_empty() {
            vec![MenuItem::link_to_dashboard("Dashboard", Some("fa fa-home")).build()]
        } else {
            self.menu.clone()
        }
    }

    fn configure_actions(&self) -> Actions {
        self.actions.clone()
    }
}

#[derive(Debug, Clone)]
pub struct ConfiguredCrud {
    fqcn: String,
    entity: String,
    attribute: AdminCrud,
    actions: Vec<AdminAction>,
    disabled_actions: Vec<String>,
    page_actions: Vec<(Page, ActionDto)>,
}

impl ConfiguredCrud {
    pub fn new(fqcn: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            fqcn: fqcn.into(),
            entity: entity.into(),
            attribute: AdminCrud::default(),
            actions: Vec::new(),
            disabled_actions: Vec::new(),
            page_actions: Vec::new(),
        }
    }

    pub fn from_config(config: &CrudConfig) -> Self {
        let mut crud = Self::new(config.fqcn.clone(), config.entity.clone()).with_admin_crud(AdminCrud {
            route_path: config.route_path.clone(),
            route_name: config.route_name.clone(),
        });
        for action in &config.actions {
            crud = crud.with_action(AdminAction {
                action: action.name.clone(),
                route_path: action.route_path.clone(),
                route_name: action.route_name.clone(),
                methods: action.methods.clone(),
            });
        }
        crud
    }

    pub fn with_admin_crud(mut self, attribute: AdminCrud) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn with_action(mut self, action: AdminAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_disabled_actions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled_actions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Displays `action` on `page`.
    pub fn with_page_action(mut self, page: Page, action: Action) -> Self {
        self.page_actions.push((page, action.into_dto()));
        self
    }
}

impl CrudController for ConfiguredCrud {
    fn fqcn(&self) -> &str {
        &self.fqcn
    }

    fn entity_fqcn(&self) -> &str {
        &self.entity
    }

    fn admin_crud(&self) -> AdminCrud {
        self.attribute.clone()
    }

    fn admin_actions(&self) -> Vec<AdminAction> {
        self.actions.clone()
    }

    fn configure_actions(&self, actions: Actions) -> Actions {
        let actions = self
            .page_actions
            .iter()
            .fold(actions, |actions, (page, action)| actions.add(*page, action.clone()));
        actions.disable(self.disabled_actions.iter().cloned())
    }
}

/// Menu item declared in the configuration; `None` for unknown kinds.
pub fn menu_item_from_config(config: &MenuItemConfig) -> Option<MenuItemBuilder> {
    let label = config.label.as_str();
    let icon = config.icon.as_deref();

    let mut builder = match config.kind.as_str() {
        "dashboard" => MenuItem::link_to_dashboard(label, icon),
        "crud" => {
            let mut builder = MenuItem::link_to_crud(label, icon, config.entity.as_deref().unwrap_or_default());
            if let Some(controller) = &config.controller {
                builder = builder.set_controller(controller);
            }
            if let Some(action) = &config.action {
                builder = builder.set_action(action);
            }
            if let Some(entity_id) = &config.entity_id {
                builder = builder.set_entity_id(entity_id);
            }
            for (name, value) in &config.params {
                builder = builder.set_query_parameter(name, value.clone());
            }
            builder
        }
        "route" => MenuItem::link_to_route(
            label,
            icon,
            config.route.as_deref().unwrap_or_default(),
            config.params.clone(),
        ),
        "url" => MenuItem::link_to_url(label, icon, config.url.as_deref().unwrap_or_default()),
        "section" => MenuItem::section(label, icon),
        "submenu" => MenuItem::sub_menu(label, icon)
            .set_sub_items(config.items.iter().filter_map(menu_item_from_config)),
        other => {
            tracing::warn!(kind = %other, label = %label, "Ignoring menu item of unknown kind");
            return None;
        }
    };

    if let Some(permission) = &config.permission {
        builder = builder.set_permission(permission);
    }
    if let Some(css_class) = &config.css_class {
        builder = builder.set_css_class(css_class);
    }
    Some(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{BATCH_DELETE, DELETE};
    use crate::menu::MenuItemType;
    use crate::option;

    fn dashboard_config() -> DashboardConfig {
        toml::from_str(
            r#"
            fqcn = "App\\Controller\\Admin\\DashboardController"
            route_path = "/admin"
            route_name = "admin"
            title = "Blog admin"
            locales = ["en", "fr"]

            [route_options]
            host = "admin.example.com"

            [[menu]]
            kind = "dashboard"
            label = "Home"

            [[menu]]
            kind = "submenu"
            label = "Blog"

            [[menu.items]]
            kind = "crud"
            label = "Posts"
            entity = "App\\Entity\\Post"
            permission = "ROLE_EDITOR"

            [[menu.items]]
            kind = "route"
            label = "Export"
            route = "export"
            params = { format = "csv" }
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_dashboard_from_config() {
        let dashboard = ConfiguredDashboard::from_config(&dashboard_config());

        assert_eq!(dashboard.fqcn(), "App\\Controller\\Admin\\DashboardController");
        let attribute = dashboard.admin_dashboard();
        assert_eq!(attribute.route_name.as_deref(), Some("admin"));
        assert_eq!(attribute.route_options.host.as_deref(), Some("admin.example.com"));
        assert_eq!(dashboard.configure_dashboard().title, "Blog admin");

        let menu = dashboard.configure_menu_items();
        assert_eq!(menu.len(), 2);
        let posts = &menu[1].sub_items[0];
        assert_eq!(posts.item_type, MenuItemType::Crud);
        assert_eq!(posts.permission.as_deref(), Some("ROLE_EDITOR"));
        assert_eq!(posts.route_parameters[option::ENTITY_FQCN], "App\\Entity\\Post");
        let export = &menu[1].sub_items[1];
        assert_eq!(export.route_name.as_deref(), Some("export"));
        assert_eq!(export.route_parameters["format"], "csv");
    }

    #[test]
    fn test_default_menu() {
        let dashboard = ConfiguredDashboard::new("App\\Dashboard", AdminDashboard::new("/admin", "admin"));
        let menu = dashboard.configure_menu_items();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].item_type, MenuItemType::Dashboard);
    }

    #[test]
    fn test_crud_actions() {
        let crud = ConfiguredCrud::new("App\\PostCrudController", "App\\Entity\\Post")
            .with_disabled_actions([DELETE, BATCH_DELETE])
            .with_page_action(Page::Index, Action::new("publish"));

        let actions = crud.configure_actions(Actions::default_config());
        let names: Vec<String> = actions
            .get_actions(Page::Index)
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, ["new", "edit", "publish"]);
    }
}
