//! Per-request admin context.
//!
//! # Data Flow
//! ```text
//! AdminRouterSubscriber::on_request
//!     → AdminContextFactory::create (request snapshot, dashboard, CRUD, entity, i18n)
//!     → Arc<AdminContext> stored in the request extensions
//!     → handlers, actions, fields and menus read it
//! ```
//!
//! # Design Decisions
//! - Immutable once built; menus are the only lazily computed parts, each at most once
//! - Travels as a request extension, never as global state
//! - Building it twice for the same request is a no-op

mod dashboard;
mod factory;
mod templates;

use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::action::{Actions, Page};
use crate::controller::DashboardController;
use crate::entity::EntityDto;
use crate::http::request::RequestSnapshot;
use crate::i18n::{I18n, Translator};
use crate::menu::{MainMenu, MenuFactory, UserMenu};
use crate::routing::{AdminRouteGenerator, AdminUrlGenerator, UrlGenerator};
use crate::security::AdminUser;

pub use dashboard::Dashboard;
pub use factory::AdminContextFactory;
pub use templates::TemplateRegistry;

/// The CRUD controller handling the request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrudDto {
    pub controller_fqcn: String,
    pub entity_fqcn: String,
    pub entity_label: String,
    pub current_action: String,
    pub current_page: Option<Page>,
    #[serde(skip)]
    pub actions: Actions,
}

pub struct AdminContext {
    request: RequestSnapshot,
    user: Option<AdminUser>,
    dashboard_fqcn: String,
    dashboard_route_name: Option<String>,
    dashboard: Dashboard,
    crud: Option<CrudDto>,
    entity: Option<EntityDto>,
    i18n: I18n,
    templates: TemplateRegistry,
    routes: Arc<AdminRouteGenerator>,
    urls: Arc<dyn UrlGenerator>,
    translator: Arc<dyn Translator>,
    menu_factory: Arc<MenuFactory>,
    dashboard_controller: Arc<dyn DashboardController>,
    main_menu: OnceLock<MainMenu>,
    user_menu: OnceLock<Option<UserMenu>>,
}

impl std::fmt::Debug for AdminContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminContext")
            .field("request", &self.request)
            .field("user", &self.user)
            .field("dashboard_fqcn", &self.dashboard_fqcn)
            .field("crud", &self.crud)
            .field("entity", &self.entity)
            .field("i18n", &self.i18n)
            .finish_non_exhaustive()
    }
}

impl AdminContext {
    pub fn request(&self) -> &RequestSnapshot {
        &self.request
    }

    pub fn user(&self) -> Option<&AdminUser> {
        self.user.as_ref()
    }

    pub fn dashboard_fqcn(&self) -> &str {
        &self.dashboard_fqcn
    }

    pub fn dashboard_route_name(&self) -> Option<&str> {
        self.dashboard_route_name.as_deref()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn crud(&self) -> Option<&CrudDto> {
        self.crud.as_ref()
    }

    pub fn entity(&self) -> Option<&EntityDto> {
        self.entity.as_ref()
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    /// CRUD action being run; `None` on dashboard pages.
    pub fn current_action(&self) -> Option<&str> {
        self.crud.as_ref().map(|crud| crud.current_action.as_str())
    }

    pub fn routes(&self) -> &AdminRouteGenerator {
        &self.routes
    }

    /// A URL builder seeded with the current request.
    pub fn url_generator(&self) -> AdminUrlGenerator {
        AdminUrlGenerator::for_request(self.routes.clone(), self.urls.clone(), &self.request)
    }

    pub fn template_path(&self, name: &str) -> String {
        self.templates.path(name)
    }

    /// Translates `id` with the request locale, domain and parameters.
    pub fn trans(&self, id: &str) -> String {
        self.i18n
            .trans(self.translator.as_ref(), id, &serde_json::Map::new())
    }

    /// Built on first access.
    pub fn main_menu(&self) -> &MainMenu {
        self.main_menu.get_or_init(|| {
            let items = self.dashboard_controller.configure_menu_items();
            self.menu_factory.create_main_menu(self, items)
        })
    }

    /// Built on first access; `None` for anonymous requests.
    pub fn user_menu(&self) -> Option<&UserMenu> {
        self.user_menu
            .get_or_init(|| {
                let user = self.user.as_ref()?;
                let menu = self.dashboard_controller.configure_user_menu(user);
                Some(self.menu_factory.create_user_menu(self, menu))
            })
            .as_ref()
    }
}
