//! User extraction middleware.
//! Attaches the authenticated admin user to the request.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

/// Header naming the authenticated user.
pub const X_ADMIN_USER: &str = "x-admin-user";
/// Comma separated roles of the authenticated user.
pub const X_ADMIN_ROLES: &str = "x-admin-roles";
/// Set by the authenticating proxy when the user is impersonated.
pub const X_ADMIN_IMPERSONATOR: &str = "x-admin-impersonator";

/// The user behind a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminUser {
    pub identifier: String,
    pub roles: Vec<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Identifier of the real user when impersonating.
    pub impersonator: Option<String>,
}

impl AdminUser {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            roles: Vec::new(),
            display_name: None,
            avatar_url: None,
            impersonator: None,
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_impersonated(&self) -> bool {
        self.impersonator.is_some()
    }

    /// Name shown in the user menu.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    /// Reads the user from the authentication headers, if any.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let identifier = header(X_ADMIN_USER)?;
        let roles = header(X_ADMIN_ROLES)
            .map(|roles| {
                roles
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            identifier: identifier.to_string(),
            roles,
            display_name: None,
            avatar_url: None,
            impersonator: header(X_ADMIN_IMPERSONATOR).map(str::to_string),
        })
    }
}

/// Shared secret the authenticating proxy presents as a bearer token.
#[derive(Clone, Debug, Default)]
pub struct TrustedProxy {
    api_key: Option<Arc<str>>,
}

impl TrustedProxy {
    pub fn new(api_key: Option<&str>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()).map(Arc::from),
        }
    }

    /// True when `headers` carry `Authorization: Bearer <api_key>`.
    pub fn is_trusted(&self, headers: &HeaderMap) -> bool {
        let Some(key) = &self.api_key else {
            return false;
        };
        headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| token == &**key)
    }

    /// The user of a trusted request; `None` (anonymous) otherwise.
    pub fn user(&self, headers: &HeaderMap) -> Option<AdminUser> {
        let user = AdminUser::from_headers(headers)?;
        if self.is_trusted(headers) {
            Some(user)
        } else {
            tracing::warn!(user = %user.identifier, "Ignoring identity headers without a valid bearer token");
            None
        }
    }
}

/// Inserts the [`AdminUser`] of a trusted request into the request extensions.
/// Anonymous requests pass through untouched; authorization happens per action and menu item.
pub async fn user_middleware(State(proxy): State<TrustedProxy>, mut req: Request<Body>, next: Next) -> Response {
    if let Some(user) = proxy.user(req.headers()) {
        tracing::trace!(user = %user.identifier, roles = ?user.roles, "Admin user attached");
        req.extensions_mut().insert(user);
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(AdminUser::from_headers(&headers).is_none());

        headers.insert(X_ADMIN_USER, HeaderValue::from_static("alice"));
        headers.insert(X_ADMIN_ROLES, HeaderValue::from_static("ROLE_ADMIN, ROLE_EDITOR,"));
        let user = AdminUser::from_headers(&headers).unwrap();

        assert_eq!(user.identifier, "alice");
        assert_eq!(user.roles, ["ROLE_ADMIN", "ROLE_EDITOR"]);
        assert!(user.has_role("ROLE_EDITOR"));
        assert!(!user.is_impersonated());
        assert_eq!(user.name(), "alice");
    }

    fn spoofed_admin(authorization: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_ADMIN_USER, HeaderValue::from_static("mallory"));
        headers.insert(X_ADMIN_ROLES, HeaderValue::from_static("ROLE_ADMIN"));
        headers.insert(X_ADMIN_IMPERSONATOR, HeaderValue::from_static("root"));
        if let Some(value) = authorization {
            headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_identity_headers_need_the_bearer_key() {
        let proxy = TrustedProxy::new(Some("s3cret"));

        assert!(proxy.user(&spoofed_admin(None)).is_none());
        assert!(proxy.user(&spoofed_admin(Some("Bearer wrong"))).is_none());
        assert!(proxy.user(&spoofed_admin(Some("s3cret"))).is_none());

        let user = proxy.user(&spoofed_admin(Some("Bearer s3cret"))).unwrap();
        assert!(user.has_role("ROLE_ADMIN"));
        assert_eq!(user.impersonator.as_deref(), Some("root"));
    }

    #[test]
    fn test_without_a_key_everyone_is_anonymous() {
        assert!(TrustedProxy::new(None).user(&spoofed_admin(Some("Bearer "))).is_none());
        assert!(TrustedProxy::new(Some("")).user(&spoofed_admin(Some("Bearer "))).is_none());
    }
}
