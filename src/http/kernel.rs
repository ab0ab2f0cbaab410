//! Request kernel: match, dispatch, resolve, run.
//!
//! # Responsibilities
//! - Match the request against the route table and attach [`RequestAttributes`]
//! - Run the admin request hook (context build)
//! - Resolve the handler and run the admin controller hook (delegation)
//! - Map failures to JSON error responses

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;

use super::request::RequestAttributes;
use super::response::error_response;
use crate::controller::ControllerResolver;
use crate::dispatch::AdminRouterSubscriber;
use crate::observability::metrics;
use crate::routing::RequestMatcher;

pub struct AdminKernel {
    matcher: Arc<dyn RequestMatcher>,
    resolver: Arc<dyn ControllerResolver>,
    subscriber: Arc<AdminRouterSubscriber>,
}

impl std::fmt::Debug for AdminKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminKernel")
            .field("subscriber", &self.subscriber)
            .finish_non_exhaustive()
    }
}

impl AdminKernel {
    pub fn new(
        matcher: Arc<dyn RequestMatcher>,
        resolver: Arc<dyn ControllerResolver>,
        subscriber: Arc<AdminRouterSubscriber>,
    ) -> Self {
        Self {
            matcher,
            resolver,
            subscriber,
        }
    }

    pub fn handle(&self, request: Request<Body>) -> Response {
        let (mut parts, body) = request.into_parts();

        let Some(matched) = self.matcher.match_request(&parts) else {
            tracing::debug!(method = %parts.method, path = %parts.uri.path(), "No route matched");
            metrics::record_request("not_found");
            return error_response(
                StatusCode::NOT_FOUND,
                format!("No route found for \"{} {}\"", parts.method, parts.uri.path()),
            );
        };
        let outcome = if matched.admin.is_some() { "admin" } else { "app" };
        tracing::debug!(route = %matched.route, controller = %matched.controller, "Route matched");
        parts.extensions.insert(RequestAttributes::from(matched));

        if let Err(e) = self.subscriber.on_request(&mut parts) {
            tracing::error!(path = %parts.uri.path(), error = %e, "Admin dispatch failed");
            metrics::record_request("error");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }

        let Some(handler) = self.resolver.get_controller(&parts) else {
            metrics::record_request("not_found");
            return error_response(
                StatusCode::NOT_FOUND,
                format!("No handler for \"{}\"", parts.uri.path()),
            );
        };
        let handler = self.subscriber.on_controller(&mut parts, handler);

        metrics::record_request(outcome);
        handler(Request::from_parts(parts, body))
    }
}
