//! Registered dashboard and CRUD controllers.

use std::sync::Arc;

use super::{CrudController, DashboardController};

/// Controllers known to the admin, in registration order.
#[derive(Default, Clone)]
pub struct ControllerRegistry {
    dashboards: Vec<Arc<dyn DashboardController>>,
    cruds: Vec<Arc<dyn CrudController>>,
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("dashboards", &self.dashboards.iter().map(|d| d.fqcn()).collect::<Vec<_>>())
            .field("cruds", &self.cruds.iter().map(|c| c.fqcn()).collect::<Vec<_>>())
            .finish()
    }
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dashboard(&mut self, dashboard: Arc<dyn DashboardController>) -> &mut Self {
        self.dashboards.push(dashboard);
        self
    }

    pub fn add_crud(&mut self, crud: Arc<dyn CrudController>) -> &mut Self {
        self.cruds.push(crud);
        self
    }

    pub fn dashboards(&self) -> &[Arc<dyn DashboardController>] {
        &self.dashboards
    }

    pub fn cruds(&self) -> &[Arc<dyn CrudController>] {
        &self.cruds
    }

    /// The first registered dashboard is the default one.
    pub fn default_dashboard(&self) -> Option<&Arc<dyn DashboardController>> {
        self.dashboards.first()
    }

    pub fn dashboard(&self, fqcn: &str) -> Option<Arc<dyn DashboardController>> {
        self.dashboards.iter().find(|d| d.fqcn() == fqcn).cloned()
    }

    pub fn crud(&self, fqcn: &str) -> Option<Arc<dyn CrudController>> {
        self.cruds.iter().find(|c| c.fqcn() == fqcn).cloned()
    }
}
