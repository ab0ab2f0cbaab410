//! Configuration schema definitions.
//!
//! This module defines the application file read at startup. All types derive
//! Serde traits for deserialization from TOML. The `admin` table is the raw
//! backend configuration fed to the normalizer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root configuration for the admin panel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Durable cache backing the generated route maps.
    pub cache: CacheConfig,

    /// Locale and translation defaults.
    pub i18n: I18nConfig,

    /// Trust settings for the identity headers.
    pub security: SecurityConfig,

    /// Dashboard declarations; the first one is the default dashboard.
    pub dashboards: Vec<DashboardConfig>,

    /// CRUD controller declarations.
    pub cruds: Vec<CrudConfig>,

    /// Application routes living next to the admin routes.
    pub routes: Vec<AppRouteConfig>,

    /// Raw backend configuration (entities, views, fields).
    pub admin: Value,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut admin = Map::new();
        admin.insert("entities".to_string(), Value::Object(Map::new()));
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            cache: CacheConfig::default(),
            i18n: I18nConfig::default(),
            security: SecurityConfig::default(),
            dashboards: Vec::new(),
            cruds: Vec::new(),
            routes: Vec::new(),
            admin: Value::Object(admin),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Public base URL used for absolute URLs (e.g., "https://admin.example.com").
    pub base_url: Option<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            base_url: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "debug".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Cache backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Directory holding one JSON file per cache key (file backend only).
    pub directory: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            directory: "var/cache/admin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Locale used when neither the route nor the dashboard sets one.
    pub default_locale: String,

    /// Message catalogs: locale -> domain -> id -> translation.
    pub catalogs: Map<String, Value>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            catalogs: Map::new(),
        }
    }
}

/// Identity headers are honored only on requests carrying
/// `Authorization: Bearer <api_key>`; without a key every request is anonymous.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Shared secret of the authenticating proxy.
    pub api_key: Option<String>,
}

/// Dashboard declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Fully qualified controller name (e.g., "App\\Controller\\Admin\\DashboardController").
    pub fqcn: String,

    /// Route path of the dashboard (e.g., "/admin").
    pub route_path: Option<String>,

    /// Route name of the dashboard (e.g., "admin").
    pub route_name: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub favicon_path: Option<String>,

    #[serde(default)]
    pub translation_domain: Option<String>,

    #[serde(default)]
    pub locales: Vec<String>,

    /// Extra options of the dashboard route.
    #[serde(default)]
    pub route_options: RouteOptionsConfig,

    /// Per-action route overrides: action -> { routePath, routeName }.
    #[serde(default)]
    pub routes: Map<String, Value>,

    #[serde(default)]
    pub allowed_controllers: Option<Vec<String>>,

    #[serde(default)]
    pub denied_controllers: Option<Vec<String>>,

    /// Main menu.
    #[serde(default)]
    pub menu: Vec<MenuItemConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouteOptionsConfig {
    pub methods: Vec<String>,
    pub host: Option<String>,
    pub locale: Option<String>,
    pub defaults: Map<String, Value>,
}

/// Main menu entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuItemConfig {
    /// dashboard, crud, route, url, section or submenu.
    pub kind: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub icon: Option<String>,

    /// Entity class (crud items).
    #[serde(default)]
    pub entity: Option<String>,

    /// Explicit CRUD controller (crud items).
    #[serde(default)]
    pub controller: Option<String>,

    #[serde(default)]
    pub action: Option<String>,

    #[serde(default)]
    pub entity_id: Option<String>,

    /// Route name (route items).
    #[serde(default)]
    pub route: Option<String>,

    #[serde(default)]
    pub params: Map<String, Value>,

    /// Target (url items).
    #[serde(default)]
    pub url: Option<String>,

    /// Role required to see the item.
    #[serde(default)]
    pub permission: Option<String>,

    #[serde(default)]
    pub css_class: Option<String>,

    /// Children (submenu items).
    #[serde(default)]
    pub items: Vec<MenuItemConfig>,
}

/// CRUD controller declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrudConfig {
    /// Fully qualified controller name.
    pub fqcn: String,

    /// Fully qualified class of the managed entity.
    pub entity: String,

    #[serde(default)]
    pub route_path: Option<String>,

    #[serde(default)]
    pub route_name: Option<String>,

    /// Custom action routes.
    #[serde(default)]
    pub actions: Vec<CrudActionConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrudActionConfig {
    pub name: String,

    #[serde(default)]
    pub route_path: Option<String>,

    #[serde(default)]
    pub route_name: Option<String>,

    #[serde(default)]
    pub methods: Option<Vec<String>>,
}

/// Application route served next to the admin (delegation target).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppRouteConfig {
    /// Route name, unique across the whole route table.
    pub name: String,

    /// Path pattern with `{param}` placeholders.
    pub path: String,

    /// Controller reference ("Class::method").
    pub controller: String,

    #[serde(default)]
    pub methods: Vec<String>,
}
