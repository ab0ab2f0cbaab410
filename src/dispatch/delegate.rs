//! Resolution of the application controller behind a `routeName` query.

use axum::http::request::Parts;
use axum::http::Request;
use serde_json::{Map, Value};

use super::DelegateError;
use crate::routing::{ControllerRef, RequestMatcher, RouteHint, UrlGenerator, UrlReference};

/// Controller of `route_name` as the matcher sees it.
///
/// The URL of the route is generated with `params`, then matched again as a
/// synthetic request carrying the method and headers of `original`.
pub fn resolve_delegated_controller(
    original: &Parts,
    route_name: &str,
    params: &Map<String, Value>,
    urls: &dyn UrlGenerator,
    matcher: &dyn RequestMatcher,
) -> Result<ControllerRef, DelegateError> {
    let url = urls.generate(route_name, params, UrlReference::AbsolutePath)?;

    let mut builder = Request::builder().method(original.method.clone()).uri(url.as_str());
    if let Some(headers) = builder.headers_mut() {
        headers.extend(original.headers.clone());
    }
    let (mut parts, ()) = builder
        .body(())
        .map_err(|e| DelegateError::InvalidRequest(e.to_string()))?
        .into_parts();
    parts.extensions.insert(RouteHint(route_name.to_string()));

    let matched = matcher
        .match_request(&parts)
        .ok_or(DelegateError::NotFound(url))?;
    Ok(matched.controller)
}
