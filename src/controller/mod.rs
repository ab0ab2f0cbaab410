//! Dashboard and CRUD controllers.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     AppConfig.dashboards / AppConfig.cruds
//!         → ConfiguredDashboard / ConfiguredCrud
//!         → ControllerRegistry (registration order; first dashboard is the default)
//!         → AdminRouteGenerator
//!
//! Request:
//!     RequestAttributes.controller ("Class::method")
//!         → HandlerRegistry (ControllerResolver)
//!         → Handler (explicit handler, or the default CRUD / dashboard page)
//! ```
//!
//! # Design Decisions
//! - Controllers are trait objects so applications can implement them directly
//! - Routing attributes (`AdminDashboard`, `AdminCrud`, `AdminAction`) are plain data
//! - Every configure hook has a default

mod attributes;
mod configured;
mod page;
mod registry;
mod resolver;

use crate::action::Actions;
use crate::context::Dashboard;
use crate::menu::{MenuItem, UserMenu};
use crate::security::AdminUser;

pub use attributes::{AdminAction, AdminCrud, AdminDashboard, RouteOptions};
pub use configured::{menu_item_from_config, ConfiguredCrud, ConfiguredDashboard};
pub use page::{crud_handler, dashboard_handler, CrudPageRenderer, PageError};
pub use registry::ControllerRegistry;
pub use resolver::{ControllerResolver, Handler, HandlerRegistry};

pub trait DashboardController: Send + Sync {
    fn fqcn(&self) -> &str;

    fn admin_dashboard(&self) -> AdminDashboard;

    fn configure_dashboard(&self) -> Dashboard {
        Dashboard::new()
    }

    fn configure_menu_items(&self) -> Vec<MenuItem> {
        vec![MenuItem::link_to_dashboard("Dashboard", Some("fa fa-home")).build()]
    }

    fn configure_user_menu(&self, user: &AdminUser) -> UserMenu {
        UserMenu::for_user(user)
    }

    /// Actions shared by every CRUD controller of the dashboard.
    fn configure_actions(&self) -> Actions {
        Actions::default_config()
    }
}

pub trait CrudController: Send + Sync {
    fn fqcn(&self) -> &str;

    fn entity_fqcn(&self) -> &str;

    fn admin_crud(&self) -> AdminCrud {
        AdminCrud::default()
    }

    /// Route declarations of custom actions, or overrides of built-in ones.
    fn admin_actions(&self) -> Vec<AdminAction> {
        Vec::new()
    }

    /// Adjusts the dashboard actions for this controller.
    fn configure_actions(&self, actions: Actions) -> Actions {
        actions
    }
}
