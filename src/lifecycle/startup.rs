//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the backend configuration (warm-up)
//! - Register controllers and generate the admin routes
//! - Wire the request pipeline (context factory, subscriber, resolver, kernel)
//!
//! # Design Decisions
//! - Fail fast: any configuration or route error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The listener is bound by the caller, after everything here succeeded

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::action::ActionFactory;
use crate::cache::{CacheStore, FileCache, MemoryCache};
use crate::config::schema::CacheBackend;
use crate::config::{AppConfig, ConfigManager, ResolveError};
use crate::context::{AdminContext, AdminContextFactory};
use crate::controller::{
    crud_handler, dashboard_handler, ConfiguredCrud, ConfiguredDashboard, ControllerRegistry, CrudPageRenderer,
    Handler, HandlerRegistry,
};
use crate::dispatch::AdminRouterSubscriber;
use crate::entity::{EntityMetadata, StaticMetadataProvider};
use crate::field::FieldFactory;
use crate::http::{AdminKernel, HttpServer, RequestAttributes};
use crate::i18n::CatalogTranslator;
use crate::menu::MenuFactory;
use crate::routing::{AdminRouteGenerator, ControllerRef, Route, RouteError, RouteTable};
use crate::security::RoleAuthorizationChecker;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ResolveError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("invalid base URL \"{url}\": {source}")]
    InvalidBaseUrl { url: String, source: url::ParseError },
}

/// A fully wired admin panel.
#[derive(Debug)]
pub struct AdminApp {
    config: Arc<ConfigManager>,
    routes: Arc<AdminRouteGenerator>,
    table: Arc<RouteTable>,
    subscriber: Arc<AdminRouterSubscriber>,
    kernel: Arc<AdminKernel>,
}

impl AdminApp {
    /// Wires the dashboards and CRUD controllers declared in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let manager = Arc::new(ConfigManager::new(config.admin.clone()));
        manager.warm_up()?;
        let controllers = controllers_from_config(config, &manager)?;
        Self::build(config, manager, controllers)
    }

    /// Wires `controllers` with the rest of `config`.
    pub fn build(
        config: &AppConfig,
        manager: Arc<ConfigManager>,
        controllers: ControllerRegistry,
    ) -> Result<Self, StartupError> {
        manager.warm_up()?;
        let controllers = Arc::new(controllers);

        let cache: Arc<dyn CacheStore> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(MemoryCache::new()),
            CacheBackend::File => Arc::new(FileCache::new(&config.cache.directory)),
        };
        let routes = Arc::new(AdminRouteGenerator::new(
            controllers.clone(),
            cache,
            config.i18n.default_locale.clone(),
        ));

        let mut collection = routes.generate_all()?;
        for app_route in &config.routes {
            if collection.get(&app_route.name).is_some() {
                tracing::warn!(route = %app_route.name, "Application route replaces an admin route");
            }
            collection.add(
                Route::new(&app_route.name, &app_route.path, ControllerRef::parse(&app_route.controller))
                    .with_methods(&app_route.methods),
            );
        }
        let mut table = RouteTable::new(collection);
        if let Some(base_url) = &config.listener.base_url {
            let parsed = Url::parse(base_url).map_err(|source| StartupError::InvalidBaseUrl {
                url: base_url.clone(),
                source,
            })?;
            table = table.with_base_url(parsed);
        }
        let table = Arc::new(table);
        tracing::info!(routes = table.len(), "Route table compiled");

        let mut metadata = StaticMetadataProvider::from_config(&manager)?;
        for crud in controllers.cruds() {
            if !metadata.contains(crud.entity_fqcn()) {
                metadata.register(EntityMetadata::new(crud.entity_fqcn()));
            }
        }

        let translator = Arc::new(CatalogTranslator::from_config(&config.i18n.catalogs));
        let authorization = Arc::new(RoleAuthorizationChecker);
        let menu_factory = Arc::new(MenuFactory::new(authorization.clone(), translator.clone()));
        let action_factory = Arc::new(ActionFactory::new(authorization, translator.clone(), table.clone()));
        let renderer = Arc::new(CrudPageRenderer::new(
            action_factory,
            Arc::new(FieldFactory::default()),
            manager.clone(),
        ));

        let context_factory = Arc::new(
            AdminContextFactory::new(
                routes.clone(),
                table.clone(),
                Arc::new(metadata),
                menu_factory,
                translator,
                config.i18n.default_locale.clone(),
            )
            .with_config(manager.clone()),
        );

        let mut resolver = HandlerRegistry::new(controllers)
            .with_crud_handler(crud_handler(renderer))
            .with_dashboard_handler(dashboard_handler());
        for app_route in &config.routes {
            let handler = app_route_handler();
            resolver = resolver.register(app_route.controller.clone(), move |request| handler(request));
        }
        let resolver = Arc::new(resolver);

        let subscriber = Arc::new(AdminRouterSubscriber::new(
            routes.clone(),
            context_factory,
            table.clone(),
            table.clone(),
            resolver.clone(),
        ));
        let kernel = Arc::new(AdminKernel::new(table.clone(), resolver, subscriber.clone()));

        Ok(Self {
            config: manager,
            routes,
            table,
            subscriber,
            kernel,
        })
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn routes(&self) -> &Arc<AdminRouteGenerator> {
        &self.routes
    }

    pub fn route_table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    pub fn subscriber(&self) -> &AdminRouterSubscriber {
        &self.subscriber
    }

    pub fn kernel(&self) -> Arc<AdminKernel> {
        self.kernel.clone()
    }

    pub fn server(&self, config: AppConfig) -> HttpServer {
        HttpServer::new(config, self.kernel.clone())
    }
}

/// Registry of the controllers declared in `config`.
///
/// CRUD controllers inherit the `disabled_actions` of their entity.
pub fn controllers_from_config(
    config: &AppConfig,
    manager: &ConfigManager,
) -> Result<ControllerRegistry, ResolveError> {
    let mut controllers = ControllerRegistry::new();
    for dashboard in &config.dashboards {
        controllers.add_dashboard(Arc::new(ConfiguredDashboard::from_config(dashboard)));
    }
    for crud in &config.cruds {
        let disabled = manager
            .entity_config_by_class(&crud.entity)?
            .map(|entity| entity.disabled_actions.clone())
            .unwrap_or_default();
        controllers.add_crud(Arc::new(ConfiguredCrud::from_config(crud).with_disabled_actions(disabled)));
    }
    Ok(controllers)
}

#[derive(Serialize)]
struct AppRoutePage {
    route: Option<String>,
    controller: Option<String>,
    params: Map<String, Value>,
    dashboard: Option<String>,
}

/// Default handler of application routes: echoes the routing outcome.
fn app_route_handler() -> Handler {
    Arc::new(|request: Request<Body>| {
        let attributes = request
            .extensions()
            .get::<RequestAttributes>()
            .cloned()
            .unwrap_or_default();
        let dashboard = request
            .extensions()
            .get::<Arc<AdminContext>>()
            .map(|context| context.dashboard_fqcn().to_string());
        Json(AppRoutePage {
            route: attributes.route,
            controller: attributes.controller.map(|c| c.to_string()),
            params: attributes.params,
            dashboard,
        })
        .into_response()
    })
}
