//! Well-known request attribute and query parameter names.

pub const DASHBOARD_CONTROLLER_FQCN: &str = "dashboardControllerFqcn";
pub const CRUD_CONTROLLER_FQCN: &str = "crudControllerFqcn";
pub const CRUD_ACTION: &str = "crudAction";
pub const ENTITY_FQCN: &str = "entityFqcn";
pub const ENTITY_ID: &str = "entityId";

/// Application route to delegate to, and its parameters (`routeParams[..]`).
pub const ROUTE_NAME: &str = "routeName";
pub const ROUTE_PARAMS: &str = "routeParams";

pub const REFERRER: &str = "referrer";

/// Index page state, ignored when matching menu items.
pub const SORT: &str = "sort";
pub const PAGE: &str = "page";
pub const QUERY: &str = "query";
pub const FILTERS: &str = "filters";

pub const LOCALE: &str = "_locale";
pub const SWITCH_USER: &str = "_switch_user";
